//! A [`Session`] binds a fetch collaborator to a language and a default database,
//! and owns every lazily loaded reference table.
//!
//! Tables are populated on first use and then shared read-only. Each cache is keyed
//! explicitly (language for economies and coder rules, database id for concepts and
//! time periods) so switching language never serves stale names.

use crate::api::{Client, Fetch};
use crate::cache::KeyedCache;
use crate::coder::{
    CoderInput, CoderMap, CoderOutput, OverrideCatalog, ReportRow, RuleTable, compile,
    match_names, report, summarize,
};
use crate::economy::EconomyTable;
use crate::error::{Error, Result};
use crate::models::Concept;
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

/// Where the coder override catalog comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    Builtin,
    Yaml(String),
    File(PathBuf),
}

impl CatalogSource {
    pub fn load(&self) -> Result<OverrideCatalog> {
        match self {
            CatalogSource::Builtin => OverrideCatalog::builtin(),
            CatalogSource::Yaml(text) => OverrideCatalog::from_yaml(text),
            CatalogSource::File(path) => OverrideCatalog::from_file(path),
        }
    }
}

/// Concept id (`economy`, `series`, `time`, ...) -> concept.
pub type Concepts = IndexMap<String, Concept>;

#[derive(Debug)]
pub struct Session<F = Client> {
    fetcher: F,
    lang: String,
    db: u32,
    catalog: CatalogSource,
    economies: KeyedCache<String, EconomyTable>,
    rules: KeyedCache<String, RuleTable>,
    pub(crate) concepts: KeyedCache<u32, Concepts>,
    pub(crate) periods: KeyedCache<u32, HashMap<String, String>>,
}

impl Default for Session<Client> {
    fn default() -> Self {
        Session::new(Client::default())
    }
}

impl<F: Fetch> Session<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            lang: "en".into(),
            db: 2,
            catalog: CatalogSource::Builtin,
            economies: KeyedCache::new(),
            rules: KeyedCache::new(),
            concepts: KeyedCache::new(),
            periods: KeyedCache::new(),
        }
    }

    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into().trim().to_lowercase();
        self
    }

    /// Default database (2 = World Development Indicators).
    pub fn with_db(mut self, db: u32) -> Self {
        self.db = db;
        self
    }

    pub fn with_catalog(mut self, catalog: CatalogSource) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_catalog_yaml(self, text: impl Into<String>) -> Self {
        self.with_catalog(CatalogSource::Yaml(text.into()))
    }

    pub fn with_catalog_file(self, path: impl Into<PathBuf>) -> Self {
        self.with_catalog(CatalogSource::File(path.into()))
    }

    pub fn lang(&self) -> &str {
        &self.lang
    }

    pub fn db(&self) -> u32 {
        self.db
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub(crate) fn resolve_db(&self, db: Option<u32>) -> u32 {
        db.unwrap_or(self.db)
    }

    /// Populate the economy table for `lang` unless it is already there.
    ///
    /// Concurrent callers for the same language wait for a single fetch. On failure
    /// nothing is cached and the error is returned as [`Error::Upstream`].
    pub fn ensure_loaded(&self, lang: &str) -> Result<()> {
        self.economies_for(lang).map(|_| ())
    }

    /// `true` once the economy table for `lang` was populated (even if empty).
    pub fn is_loaded(&self, lang: &str) -> bool {
        self.economies.is_loaded(&lang.to_string())
    }

    pub fn economies(&self) -> Result<Arc<EconomyTable>> {
        self.economies_for(&self.lang)
    }

    pub fn economies_for(&self, lang: &str) -> Result<Arc<EconomyTable>> {
        self.economies.get_or_try_load(&lang.to_string(), || {
            log::debug!("loading economies ({lang})");
            let table = self
                .fetcher
                .fetch_all("country", &[], lang, false)
                .and_then(|recs| EconomyTable::from_records(&recs))
                .map_err(|e| Error::upstream(format!("economies ({lang})"), e))?;
            log::debug!("loaded {} economies ({lang})", table.len());
            Ok(table)
        })
    }

    /// The coder rule table for the session language, compiled on first use.
    pub fn rule_table(&self) -> Result<Arc<RuleTable>> {
        let economies = self.economies()?;
        self.rules.get_or_try_load(&self.lang, || {
            let overrides = self.catalog.load()?;
            compile(economies.entities(), &overrides)
        })
    }

    /// Code names into ISO3 codes.
    ///
    /// - a single name returns [`CoderOutput::One`] with the code or `None`;
    /// - several names return [`CoderOutput::Many`], keyed by name in input order;
    /// - `summary` keeps only unresolved or renamed entries and always returns a mapping;
    /// - `debug` lists codes whose rule evaluations are logged.
    ///
    /// ```no_run
    /// # use wbgapi_rs::Session;
    /// # use wbgapi_rs::coder::CoderOutput;
    /// let wb = Session::default();
    /// assert_eq!(wb.coder("Swaziland", false, None)?, CoderOutput::One(Some("SWZ".into())));
    /// # Ok::<(), wbgapi_rs::Error>(())
    /// ```
    pub fn coder(
        &self,
        input: impl Into<CoderInput>,
        summary: bool,
        debug: Option<&HashSet<String>>,
    ) -> Result<CoderOutput> {
        let table = self.rule_table()?;
        let input = input.into();

        if !summary && let CoderInput::One(name) = &input {
            let code = table.resolve_traced(name, debug).map(str::to_string);
            return Ok(CoderOutput::One(code));
        }

        let names = match input {
            CoderInput::One(name) => vec![name],
            CoderInput::Many(names) => names,
        };
        let result = match_names(&table, &names, debug);
        if summary {
            let economies = self.economies()?;
            return Ok(CoderOutput::Many(summarize(&result, &economies.names())));
        }
        Ok(CoderOutput::Many(result))
    }

    /// Report rows (header first) comparing each name with its canonical name.
    pub fn coder_report(&self, result: &CoderMap) -> Result<Vec<ReportRow>> {
        let economies = self.economies()?;
        Ok(report(result, &economies.names()))
    }
}
