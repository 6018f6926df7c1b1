//! Topics group series by subject. Works best with WDI (source 2).

use crate::api::{Fetch, query_param};
use crate::error::Result;
use crate::models::CodeName;
use crate::session::Session;
use serde_json::Value;
use std::collections::BTreeSet;

impl<F: Fetch> Session<F> {
    /// Series ids belonging to topic `id`, for the session database.
    pub fn topic_members(&self, id: &str) -> Result<BTreeSet<String>> {
        let path = format!("topic/{}/indicator", query_param([id]));
        let rows = self
            .fetcher()
            .fetch_all(&path, &[("source", self.db().to_string())], self.lang(), false)?;
        Ok(rows
            .iter()
            .filter_map(|r| r.get("id").and_then(Value::as_str))
            .map(str::to_string)
            .collect())
    }

    /// All topics (`{id, value}`).
    pub fn topics(&self) -> Result<Vec<CodeName>> {
        let rows = self.fetcher().fetch_all("topic", &[], self.lang(), false)?;
        Ok(rows
            .iter()
            .filter_map(|r| {
                let id = r.get("id").and_then(Value::as_str)?;
                let value = r.get("value").and_then(Value::as_str).unwrap_or_default();
                Some(CodeName {
                    id: id.to_string(),
                    value: value.trim().to_string(),
                })
            })
            .collect())
    }
}
