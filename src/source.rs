//! Databases (sources) and their concepts.
//!
//! Every database has at least series, economy and time dimensions, but their
//! concept names vary ("Country", "Admin Region", "Year", "Indicator", ...). The
//! concept map normalizes those to `economy`, `time` and `series` so callers can
//! ask for the same dimension everywhere.

use crate::api::{Fetch, query_param};
use crate::error::{Error, Result};
use crate::models::{CodeName, Concept};
use crate::session::{Concepts, Session};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};
use regex::Regex;
use serde_json::Value;
use std::sync::{Arc, LazyLock};

// Same unreserved set as a URL path segment quote
const QUOTE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'~')
    .remove(b'/');

static SPECIAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\-\.,:!]").expect("special regex"));

/// Key used in request paths for a raw concept id.
pub fn concept_key(raw_id: &str) -> String {
    percent_encoding::utf8_percent_encode(raw_id, QUOTE)
        .to_string()
        .to_lowercase()
}

/// Stable dimension id for a concept key.
pub fn concept_id(key: &str) -> String {
    let id = match key {
        // "receiving countries" has carried a trailing space for a while
        "country" | "admin%20region" | "states" | "provinces" | "receiving%20countries%20"
        | "receiving%20countries" => "economy",
        "year" => "time",
        "indicator" => "series",
        other => other,
    };
    SPECIAL.replace_all(id, "_").into_owned()
}

/// Build the concept map from `sources/{db}/concepts` records.
pub fn concepts_from_records(records: &[Value]) -> Concepts {
    let mut out = Concepts::new();
    for row in records {
        let Some(raw) = row.get("id").and_then(Value::as_str) else {
            log::warn!("skipping concept without id: {}", row);
            continue;
        };
        let key = concept_key(raw);
        let value = row
            .get("value")
            .and_then(Value::as_str)
            .unwrap_or(raw)
            .to_string();
        out.insert(concept_id(&key), Concept { key, value });
    }
    out
}

impl<F: Fetch> Session<F> {
    /// Concepts of database `db` (session default when `None`), cached per database.
    ///
    /// ```no_run
    /// # use wbgapi_rs::Session;
    /// let wb = Session::default();
    /// for (id, c) in wb.concepts(Some(2))?.iter() {
    ///     println!("{id} {} {}", c.key, c.value);
    /// }
    /// # Ok::<(), wbgapi_rs::Error>(())
    /// ```
    pub fn concepts(&self, db: Option<u32>) -> Result<Arc<Concepts>> {
        let db = self.resolve_db(db);
        self.concepts.get_or_try_load(&db, || {
            let path = format!("sources/{db}/concepts");
            let records = self
                .fetcher()
                .fetch_all(&path, &[], self.lang(), true)
                .map_err(|e| Error::upstream(format!("concepts of database {db}"), e))?;
            Ok(concepts_from_records(&records))
        })
    }

    /// Elements of `concept` in `db`; `ids` restricts the result (`None` = all).
    pub fn features(
        &self,
        concept: &str,
        ids: Option<&[String]>,
        db: Option<u32>,
    ) -> Result<Vec<CodeName>> {
        let db = self.resolve_db(db);
        let concepts = self.concepts(Some(db))?;
        let key = concepts
            .get(concept)
            .map(|c| c.key.clone())
            .ok_or_else(|| Error::UnknownConcept {
                concept: concept.to_string(),
                db,
            })?;

        let ids = match ids {
            Some(ids) if !ids.is_empty() => query_param(ids.iter().map(String::as_str)),
            _ => "all".to_string(),
        };
        let path = format!("sources/{db}/{key}/{ids}");
        self.fetcher()
            .fetch_all(&path, &[], self.lang(), false)?
            .into_iter()
            .map(|row| {
                serde_json::from_value::<CodeName>(row).map_err(|e| Error::Response {
                    url: path.clone(),
                    message: format!("parse feature: {e}"),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn aliases_and_special_characters() {
        assert_eq!(concept_key("Admin Region"), "admin%20region");
        assert_eq!(concept_id(&concept_key("Country")), "economy");
        assert_eq!(concept_id(&concept_key("Admin Region")), "economy");
        assert_eq!(concept_id(&concept_key("Receiving countries ")), "economy");
        assert_eq!(concept_id("year"), "time");
        assert_eq!(concept_id("indicator"), "series");
        assert_eq!(concept_id("version.1"), "version_1");
    }

    #[test]
    fn concept_map_from_records() {
        let recs = vec![
            json!({"id": "Country", "value": "Country"}),
            json!({"id": "Series", "value": "Series"}),
            json!({"id": "Time", "value": "Time"}),
            json!({"value": "orphan"}),
        ];
        let c = concepts_from_records(&recs);
        assert_eq!(c.keys().collect::<Vec<_>>(), ["economy", "series", "time"]);
        assert_eq!(c["economy"].key, "country");
    }
}
