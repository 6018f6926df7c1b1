use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::collections::HashSet;
use std::path::PathBuf;
use wbgapi_rs::coder::{CoderOutput, format_table};
use wbgapi_rs::series::SeriesQuery;
use wbgapi_rs::{Client, Session, storage};

#[derive(Parser, Debug)]
#[command(
    name = "wbgapi",
    version,
    about = "Query World Bank API metadata and code country names to ISO3"
)]
struct Cli {
    /// API language (en, fr, es, ...)
    #[arg(long, global = true, default_value = "en")]
    lang: String,
    /// Database id (2 = World Development Indicators)
    #[arg(long, global = true, default_value_t = 2)]
    db: u32,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Translate country names into ISO3 codes.
    Code(CodeArgs),
    /// List economies (countries; add --aggregates for regions and groups).
    Economies {
        #[arg(long, default_value_t = false)]
        aggregates: bool,
    },
    /// List the concepts (dimensions) of the database.
    Concepts,
    /// List series, optionally filtered by name and topic.
    Series {
        /// Case-insensitive substring of the series name
        #[arg(short, long)]
        q: Option<String>,
        /// Topic id
        #[arg(short, long)]
        topic: Option<String>,
    },
    /// List time periods of the database.
    Periods,
}

#[derive(ValueEnum, Clone, Debug)]
enum OutFormat {
    Csv,
    Json,
}

#[derive(Args, Debug)]
struct CodeArgs {
    /// Country names (quote names containing spaces)
    #[arg(required = true)]
    names: Vec<String>,
    /// Only show names that failed or do not match the WBG name
    #[arg(long, default_value_t = false)]
    summary: bool,
    /// ISO3 codes whose rule evaluations are logged (comma or semicolon separated)
    #[arg(long)]
    debug: Option<String>,
    /// Override catalog (YAML) replacing the built-in one
    #[arg(long)]
    catalog: Option<PathBuf>,
    /// Save results to file (format inferred by --format or extension).
    #[arg(long)]
    out: Option<PathBuf>,
    /// Output format (csv or json). If omitted, inferred from --out extension.
    #[arg(long, value_enum)]
    format: Option<OutFormat>,
}

fn parse_list(s: &str) -> Vec<String> {
    s.split([',', ';'])
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

fn main() -> Result<()> {
    // coder traces are only emitted for codes passed with --debug
    let filter = env_logger::Env::default().default_filter_or("warn,wbgapi_rs::coder=info");
    env_logger::Builder::from_env(filter).init();
    let cli = Cli::parse();
    let session = Session::new(Client::default())
        .with_lang(&cli.lang)
        .with_db(cli.db);
    match cli.cmd {
        Command::Code(args) => cmd_code(session, args),
        Command::Economies { aggregates } => cmd_economies(&session, aggregates),
        Command::Concepts => {
            for (id, c) in session.concepts(None)?.iter() {
                println!("{:<12} {:<24} {}", id, c.key, c.value);
            }
            Ok(())
        }
        Command::Series { q, topic } => {
            let query = SeriesQuery {
                q,
                topic,
                ..Default::default()
            };
            let rows = session.series(&query)?;
            for s in &rows {
                println!("{:<24} {}", s.id, s.value);
            }
            eprintln!("{} elements", rows.len());
            Ok(())
        }
        Command::Periods => {
            let mut periods: Vec<_> = session
                .periods(None)?
                .iter()
                .map(|(value, id)| (id.clone(), value.clone()))
                .collect();
            periods.sort();
            for (id, value) in periods {
                println!("{:<10} {}", id, value);
            }
            Ok(())
        }
    }
}

fn cmd_economies(session: &Session, aggregates: bool) -> Result<()> {
    let table = session.economies()?;
    for e in table.entities().iter().filter(|e| e.is_aggregate == aggregates) {
        let region = table
            .classification(&e.code)
            .and_then(|c| c.region.as_ref())
            .map(|r| r.id.as_str())
            .unwrap_or_default();
        println!("{:<5} {:<50} {}", e.code, e.display_name, region);
    }
    Ok(())
}

fn cmd_code(session: Session, args: CodeArgs) -> Result<()> {
    let session = match &args.catalog {
        Some(path) => session.with_catalog_file(path),
        None => session,
    };
    let debug: Option<HashSet<String>> = args
        .debug
        .as_deref()
        .map(|s| parse_list(s).into_iter().map(|c| c.to_uppercase()).collect());

    let single = args.names.len() == 1 && !args.summary;
    let output = if single {
        session.coder(args.names[0].as_str(), false, debug.as_ref())?
    } else {
        session.coder(args.names.clone(), args.summary, debug.as_ref())?
    };

    if let CoderOutput::One(code) = &output
        && args.out.is_none()
    {
        println!("{}", code.as_deref().unwrap_or("None"));
        return Ok(());
    }

    let result = output.into_map(&args.names[0]);
    let rows = session.coder_report(&result)?;

    if let Some(path) = args.out.as_ref() {
        let fmt = match args.format {
            Some(OutFormat::Csv) => "csv",
            Some(OutFormat::Json) => "json",
            None => path.extension().and_then(|e| e.to_str()).unwrap_or("csv"),
        }
        .to_ascii_lowercase();
        match fmt.as_str() {
            "csv" => storage::save_report_csv(&rows, path)?,
            "json" => storage::save_coder_json(&result, path)?,
            other => anyhow::bail!("unsupported format: {}", other),
        }
        eprintln!("Saved {} rows to {}", result.len(), path.display());
        return Ok(());
    }

    println!("{}", format_table(&rows));
    Ok(())
}
