//! Rule compilation: canonical entities + override catalog -> ordered [`RuleTable`].
//!
//! Every entity contributes an exact rule for its lowercased code and a regex rule
//! built from its canonical name. The override catalog adds more patterns per code,
//! each tagged by a leading sigil:
//!
//! | sigil | mode            | normalization                      |
//! |-------|-----------------|------------------------------------|
//! | `:`   | `Exact`         | clean                              |
//! | `~`   | `RegexExclude`  | lowercase + magic (author-cleaned) |
//! | none  | `RegexMatch`    | clean + magic                      |
//!
//! ```yaml
//! SWZ: [swaziland]
//! COG:
//!   order: 5
//!   patterns: ['~democratic', 'congo']
//! ```

use super::normalize;
use crate::error::{Error, Result};
use crate::models::CanonicalEntity;
use regex::{Regex, RegexBuilder};
use serde_yaml::Value as Yaml;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Order used when the catalog does not give one.
pub const DEFAULT_ORDER: i32 = 10;

/// Catalog shipped with the crate.
pub const BUILTIN_CATALOG: &str = include_str!("lookup-data.yaml");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchMode {
    /// Cleaned input must equal the pattern.
    Exact,
    /// Pattern found in the cleaned input resolves to the target.
    RegexMatch,
    /// Pattern found in the cleaned input disqualifies the target for that input.
    RegexExclude,
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MatchMode::Exact => "exact",
            MatchMode::RegexMatch => "match",
            MatchMode::RegexExclude => "exclude",
        })
    }
}

#[derive(Debug, Clone)]
pub struct MatchRule {
    pub pattern: String,
    pub target: String,
    pub mode: MatchMode,
    pub priority: i32,
    pub(crate) regex: Option<Regex>,
}

impl PartialEq for MatchRule {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
            && self.target == other.target
            && self.mode == other.mode
            && self.priority == other.priority
    }
}

impl MatchRule {
    pub fn exact(pattern: impl Into<String>, target: impl Into<String>, priority: i32) -> Self {
        Self {
            pattern: pattern.into(),
            target: target.into(),
            mode: MatchMode::Exact,
            priority,
            regex: None,
        }
    }

    /// Wrap `body` in word boundaries and compile it case-insensitively.
    pub fn regex(
        body: &str,
        target: impl Into<String>,
        mode: MatchMode,
        priority: i32,
    ) -> std::result::Result<Self, regex::Error> {
        let pattern = format!(r"\b{}\b", body);
        let regex = RegexBuilder::new(&pattern).case_insensitive(true).build()?;
        Ok(Self {
            pattern,
            target: target.into(),
            mode,
            priority,
            regex: Some(regex),
        })
    }

    /// Does this rule fire for an already cleaned input?
    pub fn is_match(&self, cleaned: &str) -> bool {
        match (&self.mode, &self.regex) {
            (MatchMode::Exact, _) => self.pattern == cleaned,
            (_, Some(re)) => re.is_match(cleaned),
            (_, None) => false,
        }
    }
}

/// Rules sorted ascending by priority; ties keep generation order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleTable {
    rules: Vec<MatchRule>,
}

impl RuleTable {
    pub fn from_rules(mut rules: Vec<MatchRule>) -> Self {
        // stable: code rule, name rule, then overrides for equal priorities
        rules.sort_by_key(|r| r.priority);
        Self { rules }
    }

    pub fn rules(&self) -> &[MatchRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Extra patterns for one code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideEntry {
    pub patterns: Vec<String>,
    pub order: i32,
}

/// Human-edited override table, code -> patterns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideCatalog {
    entries: BTreeMap<String, OverrideEntry>,
}

impl OverrideCatalog {
    pub fn builtin() -> Result<Self> {
        Self::from_yaml(BUILTIN_CATALOG)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&text)
    }

    /// Parse a catalog. Every entry must be a pattern list or a mapping with a
    /// `patterns` list and an optional integer `order`.
    pub fn from_yaml(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let doc: Option<BTreeMap<String, Yaml>> = serde_yaml::from_str(text)?;
        let mut entries = BTreeMap::new();
        for (code, value) in doc.unwrap_or_default() {
            let entry = parse_entry(&code, &value)?;
            entries.insert(code.trim().to_uppercase(), entry);
        }
        Ok(Self { entries })
    }

    pub fn insert(&mut self, code: impl Into<String>, entry: OverrideEntry) {
        self.entries.insert(code.into().to_uppercase(), entry);
    }

    pub fn get(&self, code: &str) -> Option<&OverrideEntry> {
        self.entries.get(&code.to_uppercase())
    }

    /// Entries by code, in code order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &OverrideEntry)> {
        self.entries.iter().map(|(code, entry)| (code.as_str(), entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn parse_entry(code: &str, value: &Yaml) -> Result<OverrideEntry> {
    let (patterns, order) = match value {
        Yaml::Sequence(_) => (value, DEFAULT_ORDER),
        Yaml::Mapping(m) => {
            let patterns = m
                .get("patterns")
                .ok_or_else(|| Error::configuration(code, "mapping without 'patterns'"))?;
            let order = match m.get("order") {
                None | Some(Yaml::Null) => DEFAULT_ORDER,
                Some(o) => o
                    .as_i64()
                    .and_then(|o| i32::try_from(o).ok())
                    .ok_or_else(|| Error::configuration(code, "'order' must be an integer"))?,
            };
            (patterns, order)
        }
        _ => {
            return Err(Error::configuration(
                code,
                "expected a pattern list or a mapping with 'patterns'",
            ));
        }
    };

    let patterns = patterns
        .as_sequence()
        .ok_or_else(|| Error::configuration(code, "'patterns' must be a list"))?
        .iter()
        .map(|p| match p {
            Yaml::String(s) => Ok(s.clone()),
            // bare words like `no` or `1` come through as other scalars
            Yaml::Bool(_) | Yaml::Number(_) => Ok(serde_yaml::to_string(p)?.trim().to_string()),
            _ => Err(Error::configuration(code, "patterns must be strings")),
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(OverrideEntry { patterns, order })
}

/// Parse one override pattern into a rule by its sigil.
pub fn override_rule(code: &str, pattern: &str, order: i32) -> Result<MatchRule> {
    let built = if let Some(rest) = pattern.strip_prefix(':') {
        Ok(MatchRule::exact(normalize::clean(rest), code, order))
    } else if let Some(rest) = pattern.strip_prefix('~') {
        MatchRule::regex(
            &normalize::exclude_pattern(rest),
            code,
            MatchMode::RegexExclude,
            order,
        )
    } else {
        MatchRule::regex(
            &normalize::name_pattern(pattern),
            code,
            MatchMode::RegexMatch,
            order,
        )
    };
    built.map_err(|e| Error::configuration(code, format!("pattern {:?}: {}", pattern, e)))
}

/// Build the rule table for `entities` (aggregates are skipped) and `overrides`.
pub fn compile(entities: &[CanonicalEntity], overrides: &OverrideCatalog) -> Result<RuleTable> {
    let mut rules = Vec::new();
    for entity in entities.iter().filter(|e| !e.is_aggregate) {
        let code = entity.code.as_str();
        let entry = overrides.get(code);
        let order = entry.map_or(DEFAULT_ORDER, |e| e.order);

        rules.push(MatchRule::exact(code.to_lowercase(), code, order));
        let body = normalize::name_pattern(&entity.display_name);
        if !body.is_empty() {
            let rule = MatchRule::regex(&body, code, MatchMode::RegexMatch, order).map_err(|e| {
                Error::configuration(code, format!("name {:?}: {}", entity.display_name, e))
            })?;
            rules.push(rule);
        }

        for pattern in entry.map(|e| e.patterns.as_slice()).unwrap_or_default() {
            rules.push(override_rule(code, pattern, order)?);
        }
    }

    let table = RuleTable::from_rules(rules);
    log::debug!(
        "compiled {} rules for {} entities ({} override entries)",
        table.len(),
        entities.len(),
        overrides.len()
    );
    Ok(table)
}
