//! The time dimension.
//!
//! Time element keys differ between databases (`YR2015` in WDI, other forms
//! elsewhere), so both the key and the displayed value are accepted wherever a
//! period is expected.

use crate::api::Fetch;
use crate::error::Result;
use crate::session::Session;
use std::collections::HashMap;
use std::sync::Arc;

impl<F: Fetch> Session<F> {
    /// Displayed value -> time element id for `db`, cached per database.
    pub fn periods(&self, db: Option<u32>) -> Result<Arc<HashMap<String, String>>> {
        let db = self.resolve_db(db);
        self.periods.get_or_try_load(&db, || {
            Ok(self
                .features("time", None, Some(db))?
                .into_iter()
                .map(|f| (f.value, f.id))
                .collect())
        })
    }

    /// Time element id for a year or key (`2015`, `"2015"` or `"YR2015"`).
    pub fn period_id(&self, period: &str, db: Option<u32>) -> Result<Option<String>> {
        let periods = self.periods(db)?;
        let period = period.trim();
        if let Some(id) = periods.get(period) {
            return Ok(Some(id.clone()));
        }
        Ok(periods
            .values()
            .find(|id| id.eq_ignore_ascii_case(period))
            .cloned())
    }
}
