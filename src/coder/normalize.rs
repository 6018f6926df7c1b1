//! String preparation shared by rule compilation and matching.

use regex::{NoExpand, Regex};
use std::sync::LazyLock;

// "(U.S.)" / "(UK)" qualifiers are unwrapped before parenthetical text is dropped
static QUALIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((u\.?s\.?|u\.?k\.?)\)").expect("qualifier regex"));
static PARENTHETICAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\(.*\)").expect("parenthetical regex"));
static NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w&]").expect("non-word regex"));
static AND: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\band\b").expect("and regex"));
static ST: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bst\b").expect("st regex"));
static SPACES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("spaces regex"));

/// Lowercase, drop parenthetical text (keeping US/UK qualifiers), drop apostrophes
/// and turn any other punctuation into spaces.
///
/// ```
/// use wbgapi_rs::coder::normalize::clean;
/// assert_eq!(clean("Virgin Islands (U.S.)"), "virgin islands us");
/// assert_eq!(clean("Côte d'Ivoire"), "côte divoire");
/// assert_eq!(clean("St. Martin (French part)"), "st  martin");
/// ```
pub fn clean(s: &str) -> String {
    let s = s.to_lowercase();
    let s = QUALIFIER.replace_all(&s, |caps: &regex::Captures| caps[1].replace('.', ""));
    let s = PARENTHETICAL.replace_all(&s, "");
    let s = s.replace('\'', "");
    let s = NON_WORD.replace_all(&s, " ");
    s.trim().to_string()
}

/// Rewrite a prepared string into a regex body: `and` also accepts `&`, `st` also
/// accepts `saint`, and any whitespace run accepts any whitespace run.
pub fn magic(s: &str) -> String {
    let s = AND.replace_all(s, NoExpand(r"(and|\&)"));
    let s = ST.replace_all(&s, NoExpand("(st|saint)"));
    SPACES.replace_all(&s, NoExpand(r"\s+")).into_owned()
}

/// Body of a name rule: full clean pass, then magic substitutions.
pub fn name_pattern(s: &str) -> String {
    magic(&clean(s))
}

/// Body of an exclusion rule: authors pre-clean these, so only case and padding
/// are normalized before the magic substitutions.
pub fn exclude_pattern(s: &str) -> String {
    magic(s.to_lowercase().trim())
}
