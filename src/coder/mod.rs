//! Economy coder: translate free-text country names into ISO3 codes.
//!
//! The rule engine here is pure: give it canonical entities and an override
//! catalog, get a [`RuleTable`], resolve names against it. [`crate::Session`]
//! wires it to the API with per-language caching.
//!
//! ```
//! use wbgapi_rs::coder::{OverrideCatalog, compile};
//! use wbgapi_rs::models::CanonicalEntity;
//!
//! let entities = vec![CanonicalEntity::new("SWZ", "Eswatini")];
//! let overrides = OverrideCatalog::from_yaml("SWZ: [swaziland]")?;
//! let table = compile(&entities, &overrides)?;
//! assert_eq!(table.resolve("Kingdom of Swaziland"), Some("SWZ"));
//! assert_eq!(table.resolve("Toronto"), None);
//! # Ok::<(), wbgapi_rs::Error>(())
//! ```

pub mod matcher;
pub mod normalize;
pub mod report;
pub mod rules;

pub use matcher::{CoderMap, match_names};
pub use report::{REPORT_HEADER, ReportRow, format_table, report, summarize};
pub use rules::{
    DEFAULT_ORDER, MatchMode, MatchRule, OverrideCatalog, OverrideEntry, RuleTable, compile,
};

/// One name or many.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoderInput {
    One(String),
    Many(Vec<String>),
}

impl From<&str> for CoderInput {
    fn from(s: &str) -> Self {
        CoderInput::One(s.to_string())
    }
}

impl From<String> for CoderInput {
    fn from(s: String) -> Self {
        CoderInput::One(s)
    }
}

impl From<&String> for CoderInput {
    fn from(s: &String) -> Self {
        CoderInput::One(s.clone())
    }
}

impl From<Vec<String>> for CoderInput {
    fn from(v: Vec<String>) -> Self {
        CoderInput::Many(v)
    }
}

impl From<Vec<&str>> for CoderInput {
    fn from(v: Vec<&str>) -> Self {
        CoderInput::Many(v.into_iter().map(String::from).collect())
    }
}

impl From<&[&str]> for CoderInput {
    fn from(v: &[&str]) -> Self {
        CoderInput::Many(v.iter().map(|s| s.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for CoderInput {
    fn from(v: [&str; N]) -> Self {
        CoderInput::Many(v.iter().map(|s| s.to_string()).collect())
    }
}

impl From<&[String]> for CoderInput {
    fn from(v: &[String]) -> Self {
        CoderInput::Many(v.to_vec())
    }
}

/// A bare result for a single name, a keyed mapping otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoderOutput {
    One(Option<String>),
    Many(CoderMap),
}

impl CoderOutput {
    pub fn as_one(&self) -> Option<&Option<String>> {
        match self {
            CoderOutput::One(code) => Some(code),
            CoderOutput::Many(_) => None,
        }
    }

    pub fn as_many(&self) -> Option<&CoderMap> {
        match self {
            CoderOutput::One(_) => None,
            CoderOutput::Many(map) => Some(map),
        }
    }

    /// Flatten into a mapping; a single result is keyed by `name`.
    pub fn into_map(self, name: &str) -> CoderMap {
        match self {
            CoderOutput::One(code) => CoderMap::from([(name.to_string(), code)]),
            CoderOutput::Many(map) => map,
        }
    }
}
