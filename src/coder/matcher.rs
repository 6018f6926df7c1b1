use super::normalize;
use super::rules::{MatchMode, RuleTable};
use indexmap::IndexMap;
use std::collections::HashSet;

/// Input name -> resolved code, in input order. `None` means no rule matched.
pub type CoderMap = IndexMap<String, Option<String>>;

impl RuleTable {
    /// Resolve one free-text name to a code.
    ///
    /// Rules are tried in table order. An exclusion rule that fires rules its target
    /// out for the rest of this name; the first match or exact rule that fires for a
    /// target still in play wins.
    pub fn resolve(&self, name: &str) -> Option<&str> {
        self.resolve_traced(name, None)
    }

    /// Same as [`resolve`](Self::resolve), logging every rule evaluated for a code
    /// in `debug`.
    pub fn resolve_traced(&self, name: &str, debug: Option<&HashSet<String>>) -> Option<&str> {
        let cleaned = normalize::clean(name);
        let mut excluded: HashSet<&str> = HashSet::new();

        for rule in self.rules() {
            let target = rule.target.as_str();
            if excluded.contains(target) {
                continue;
            }
            let hit = rule.is_match(&cleaned);
            if debug.is_some_and(|codes| codes.contains(target)) {
                log::info!(
                    "{} {} [{}] {:?} vs {:?} ({:?}): {}",
                    target,
                    rule.mode,
                    rule.priority,
                    rule.pattern,
                    name,
                    cleaned,
                    if hit { "hit" } else { "miss" }
                );
            }
            if !hit {
                continue;
            }
            match rule.mode {
                MatchMode::RegexExclude => {
                    excluded.insert(target);
                }
                MatchMode::RegexMatch | MatchMode::Exact => return Some(target),
            }
        }
        None
    }
}

/// Resolve every name, keyed by the name itself. Repeated names collapse into one
/// entry (resolution is deterministic, so the value is the same either way).
pub fn match_names<I, S>(table: &RuleTable, names: I, debug: Option<&HashSet<String>>) -> CoderMap
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = CoderMap::new();
    for name in names {
        let name = name.as_ref();
        let code = table.resolve_traced(name, debug).map(str::to_string);
        out.insert(name.to_string(), code);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coder::rules::{MatchRule, OverrideCatalog, compile};
    use crate::models::CanonicalEntity;

    fn table() -> RuleTable {
        let entities = vec![
            CanonicalEntity::new("CAN", "Canada"),
            CanonicalEntity::new("FRA", "France"),
        ];
        compile(&entities, &OverrideCatalog::default()).unwrap()
    }

    #[test]
    fn exact_code_and_name() {
        let t = table();
        assert_eq!(t.resolve("fra"), Some("FRA"));
        assert_eq!(t.resolve("FRA"), Some("FRA"));
        assert_eq!(t.resolve("Republic of France"), Some("FRA"));
        assert_eq!(t.resolve("Toronto"), None);
        // exact rules do not match substrings
        assert_eq!(t.resolve("can opener"), None);
    }

    #[test]
    fn exclusion_is_sticky_for_one_name_only() {
        let t = RuleTable::from_rules(vec![
            MatchRule::regex("north", "AAA", MatchMode::RegexExclude, 1).unwrap(),
            MatchRule::regex("land", "AAA", MatchMode::RegexMatch, 2).unwrap(),
            MatchRule::regex("land", "BBB", MatchMode::RegexMatch, 3).unwrap(),
        ]);
        let m = match_names(&t, ["North Land", "Land"], None);
        assert_eq!(m["North Land"].as_deref(), Some("BBB"));
        assert_eq!(m["Land"].as_deref(), Some("AAA"));
    }

    #[test]
    fn duplicates_collapse_keeping_first_position() {
        let m = match_names(&table(), ["France", "Canada", "France"], None);
        assert_eq!(m.len(), 2);
        assert_eq!(m.keys().collect::<Vec<_>>(), ["France", "Canada"]);
    }
}
