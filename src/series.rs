//! Series (indicators) of a database.

use crate::api::Fetch;
use crate::error::Result;
use crate::models::CodeName;
use crate::session::Session;

/// Filter for [`Session::series`].
#[derive(Debug, Clone, Default)]
pub struct SeriesQuery {
    /// Restrict to these series ids.
    pub ids: Option<Vec<String>>,
    /// Case-insensitive substring of the series name.
    pub q: Option<String>,
    /// Only series that belong to this topic.
    pub topic: Option<String>,
    /// Database; session default when `None`.
    pub db: Option<u32>,
}

/// Does `name` contain `q`, ignoring case? An empty query matches everything.
pub fn name_matches(q: Option<&str>, name: &str) -> bool {
    match q.map(str::trim) {
        None | Some("") => true,
        Some(q) => name.to_lowercase().contains(&q.to_lowercase()),
    }
}

impl<F: Fetch> Session<F> {
    /// Series elements matching `query`.
    ///
    /// ```no_run
    /// # use wbgapi_rs::{Session, series::SeriesQuery};
    /// let wb = Session::default();
    /// let q = SeriesQuery { q: Some("population".into()), topic: Some("8".into()), ..Default::default() };
    /// for s in wb.series(&q)? {
    ///     println!("{} {}", s.id, s.value);
    /// }
    /// # Ok::<(), wbgapi_rs::Error>(())
    /// ```
    pub fn series(&self, query: &SeriesQuery) -> Result<Vec<CodeName>> {
        let mut ids = query.ids.clone();
        if let Some(topic) = &query.topic {
            let members = self.topic_members(topic)?;
            ids = Some(match ids {
                Some(ids) => ids.into_iter().filter(|id| members.contains(id)).collect(),
                None => members.into_iter().collect(),
            });
            if ids.as_ref().is_some_and(Vec::is_empty) {
                return Ok(vec![]);
            }
        }

        let rows = self.features("series", ids.as_deref(), query.db)?;
        Ok(rows
            .into_iter()
            .filter(|r| name_matches(query.q.as_deref(), &r.value))
            .collect())
    }
}
