use serde::{Deserialize, Serialize};

/// Paging header returned by the API (position 0 of a v2 response, or the
/// top-level object of the beta endpoints).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meta {
    #[serde(default, deserialize_with = "de_u32_from_string_or_number")]
    pub page: u32,
    #[serde(default, deserialize_with = "de_u32_from_string_or_number")]
    pub pages: u32,
    /// Some responses encode `per_page` as a string, others as a number.
    /// Accept both and normalize to `u32`.
    #[serde(deserialize_with = "de_u32_from_string_or_number")]
    pub per_page: u32,
    #[serde(deserialize_with = "de_u32_from_string_or_number")]
    pub total: u32,
}

/// Serde helper: parse `u32` from either a JSON number or a string.
fn de_u32_from_string_or_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    struct U32Visitor;

    impl<'de> Visitor<'de> for U32Visitor {
        type Value = u32;

        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            write!(f, "a string or integer representing a non-negative number")
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(v as u32)
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v < 0 {
                return Err(E::custom("negative value for u32"));
            }
            Ok(v as u32)
        }

        fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            s.trim().parse::<u32>().map_err(E::custom)
        }
    }

    deserializer.deserialize_any(U32Visitor)
}

/// `{ "id": ..., "value": ... }` pair used all over the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeName {
    pub id: String,
    #[serde(default)]
    pub value: String,
}

/// One record of the `country` endpoint. Aggregates carry `region.id == "NA"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EconomyRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub region: Option<CodeName>,
    #[serde(default)]
    pub adminregion: Option<CodeName>,
    #[serde(default, rename = "incomeLevel")]
    pub income_level: Option<CodeName>,
    #[serde(default, rename = "lendingType")]
    pub lending_type: Option<CodeName>,
    #[serde(default, rename = "capitalCity")]
    pub capital_city: Option<String>,
}

/// Region id the API uses for aggregate economies.
pub const AGGREGATE_REGION: &str = "NA";

impl EconomyRecord {
    pub fn is_aggregate(&self) -> bool {
        self.region
            .as_ref()
            .is_some_and(|r| r.id.trim() == AGGREGATE_REGION)
    }
}

/// An authoritative economy record with a stable code and official name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalEntity {
    pub code: String,
    pub display_name: String,
    pub is_aggregate: bool,
}

impl CanonicalEntity {
    pub fn new(code: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            display_name: display_name.into(),
            is_aggregate: false,
        }
    }
}

impl From<&EconomyRecord> for CanonicalEntity {
    fn from(r: &EconomyRecord) -> Self {
        Self {
            code: r.id.clone(),
            display_name: r.name.trim().to_string(),
            is_aggregate: r.is_aggregate(),
        }
    }
}

/// Classification groups attached to a country record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub region: Option<CodeName>,
    pub admin_region: Option<CodeName>,
    pub income_level: Option<CodeName>,
    pub lending_type: Option<CodeName>,
}

impl From<&EconomyRecord> for Classification {
    fn from(r: &EconomyRecord) -> Self {
        // The API fills unused groups with empty ids
        let keep = |c: &Option<CodeName>| c.clone().filter(|c| !c.id.trim().is_empty());
        Self {
            region: keep(&r.region),
            admin_region: keep(&r.adminregion),
            income_level: keep(&r.income_level),
            lending_type: keep(&r.lending_type),
        }
    }
}

/// Database concept (dimension) as exposed by `sources/{db}/concepts`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Concept {
    /// URL-ready key used in requests, e.g. `country` or `admin%20region`.
    pub key: String,
    pub value: String,
}
