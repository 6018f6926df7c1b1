//! Coder debug traces. Kept in its own test binary: the logger is process-global.

use serde_json::Value;
use std::collections::HashSet;
use std::sync::Mutex;
use wbgapi_rs::coder::{OverrideCatalog, compile};
use wbgapi_rs::economy::EconomyTable;

/// Keeps the formatted messages of coder records.
struct Capture(Mutex<Vec<String>>);

impl log::Log for Capture {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.target().starts_with("wbgapi_rs::coder") && metadata.level() <= log::Level::Info
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            self.0.lock().unwrap().push(record.args().to_string());
        }
    }

    fn flush(&self) {}
}

static CAPTURE: Capture = Capture(Mutex::new(Vec::new()));

fn take() -> Vec<String> {
    std::mem::take(&mut *CAPTURE.0.lock().unwrap())
}

fn codes(list: &[&str]) -> HashSet<String> {
    list.iter().map(|c| c.to_string()).collect()
}

#[test]
fn debug_traces_only_listed_codes() {
    log::set_logger(&CAPTURE).unwrap();
    log::set_max_level(log::LevelFilter::Info);

    let rows: Vec<Value> = serde_json::from_str(include_str!("fixtures/countries.json")).unwrap();
    let eco = EconomyTable::from_records(&rows).unwrap();
    let table = compile(eco.entities(), &OverrideCatalog::builtin().unwrap()).unwrap();
    take();

    let debug = codes(&["COG", "COD"]);
    let code = table.resolve_traced("Congo, Dem. Rep.", Some(&debug));
    assert_eq!(code, Some("COD"));

    let lines = take();
    assert!(!lines.is_empty());
    assert!(
        lines.iter().all(|l| l.starts_with("COG ") || l.starts_with("COD ")),
        "{lines:#?}"
    );
    // raw and cleaned input on every line
    assert!(
        lines
            .iter()
            .all(|l| l.contains(r#""Congo, Dem. Rep.""#) && l.contains(r#""congo  dem  rep""#)),
        "{lines:#?}"
    );
    // the exclusion that rules COG out, with its pattern
    assert!(
        lines
            .iter()
            .any(|l| l.starts_with("COG exclude") && l.contains(r#""\\bdem\\b""#) && l.ends_with("hit")),
        "{lines:#?}"
    );
    // COG is not evaluated any further once excluded
    let cog_after_exclusion = lines
        .iter()
        .skip_while(|l| !(l.starts_with("COG exclude") && l.ends_with("hit")))
        .skip(1)
        .filter(|l| l.starts_with("COG "))
        .count();
    assert_eq!(cog_after_exclusion, 0, "{lines:#?}");
    assert!(lines.last().unwrap().starts_with("COD match"), "{lines:#?}");
    assert!(lines.last().unwrap().ends_with("hit"));

    // codes that are never evaluated or not listed leave no trace
    table.resolve_traced("France", Some(&codes(&["COG"])));
    let lines = take();
    assert!(!lines.is_empty());
    assert!(lines.iter().all(|l| l.starts_with("COG ")), "{lines:#?}");
    assert!(lines.iter().all(|l| l.ends_with("miss")), "{lines:#?}");

    assert_eq!(table.resolve_traced("France", None), Some("FRA"));
    assert_eq!(table.resolve("Congo, Dem. Rep."), Some("COD"));
    assert!(take().is_empty());
}
