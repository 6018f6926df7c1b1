//! Economies of the country-based databases.
//!
//! Economies include countries and aggregates (regions, income groups, ...). The
//! `country` endpoint lists both; aggregates are told apart by `region.id == "NA"`
//! and are never offered to the coder.

use crate::error::{Error, Result};
use crate::models::{CanonicalEntity, Classification, EconomyRecord};
use serde_json::Value;
use std::collections::HashMap;

/// Canonical economies with their classifications, for one language.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EconomyTable {
    entities: Vec<CanonicalEntity>,
    classifications: HashMap<String, Classification>,
}

impl EconomyTable {
    /// Build the table from raw `country` records.
    ///
    /// A record without `id`/`name` means the API changed shape under us: that is
    /// an error rather than a silently shorter table.
    pub fn from_records(records: &[Value]) -> Result<Self> {
        let mut table = Self::default();
        for raw in records {
            let rec: EconomyRecord =
                serde_json::from_value(raw.clone()).map_err(|e| Error::Response {
                    url: "country".into(),
                    message: format!("parse economy record: {e}"),
                })?;
            if rec.id.trim().is_empty() {
                log::warn!("skipping economy record without id: {}", raw);
                continue;
            }
            table
                .classifications
                .insert(rec.id.clone(), Classification::from(&rec));
            table.entities.push(CanonicalEntity::from(&rec));
        }
        Ok(table)
    }

    /// Every economy, aggregates included, in API order.
    pub fn entities(&self) -> &[CanonicalEntity] {
        &self.entities
    }

    /// Economies the coder may resolve to.
    pub fn countries(&self) -> impl Iterator<Item = &CanonicalEntity> {
        self.entities.iter().filter(|e| !e.is_aggregate)
    }

    pub fn aggregates(&self) -> impl Iterator<Item = &CanonicalEntity> {
        self.entities.iter().filter(|e| e.is_aggregate)
    }

    pub fn get(&self, code: &str) -> Option<&CanonicalEntity> {
        self.entities.iter().find(|e| e.code.eq_ignore_ascii_case(code))
    }

    pub fn classification(&self, code: &str) -> Option<&Classification> {
        self.classifications.get(&code.to_uppercase())
    }

    /// Code -> canonical display name of every country (no aggregates).
    pub fn names(&self) -> HashMap<String, String> {
        self.countries()
            .map(|e| (e.code.clone(), e.display_name.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn aggregates_are_flagged_and_classified() {
        let recs = vec![
            json!({"id": "WLD", "iso2Code": "1W", "name": "World",
                   "region": {"id": "NA", "iso2code": "NA", "value": "Aggregates"},
                   "incomeLevel": {"id": "NA", "value": "Aggregates"}}),
            json!({"id": "CAN", "iso2Code": "CA", "name": "Canada",
                   "region": {"id": "NAC", "iso2code": "XU", "value": "North America"},
                   "adminregion": {"id": "", "iso2code": "", "value": ""},
                   "incomeLevel": {"id": "HIC", "value": "High income"},
                   "lendingType": {"id": "LNX", "value": "Not classified"},
                   "capitalCity": "Ottawa"}),
        ];
        let t = EconomyTable::from_records(&recs).unwrap();
        assert_eq!(t.len(), 2);
        assert_eq!(t.countries().count(), 1);
        assert_eq!(t.aggregates().next().unwrap().code, "WLD");
        assert!(!t.names().contains_key("WLD"));

        let c = t.classification("can").unwrap();
        assert_eq!(c.region.as_ref().unwrap().id, "NAC");
        assert!(c.admin_region.is_none());
        assert_eq!(t.get("can").unwrap().display_name, "Canada");
    }

    #[test]
    fn bad_record_is_a_response_error() {
        let err = EconomyTable::from_records(&[json!({"id": 3})]).unwrap_err();
        assert!(matches!(err, Error::Response { .. }));
    }
}
