//! Vehicle records as published by the SDIP feed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Accepts a JSON string, number or boolean and keeps it as text.
///
/// The feed is not consistent about whether line identifiers are quoted, and a
/// label such as `"M1"` must never be read as a number.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        Some(other) => {
            return Err(serde::de::Error::custom(format!(
                "expected a string or number, got {other}"
            )));
        }
    })
}

fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    string_or_number(deserializer).map(Option::unwrap_or_default)
}

/// A single vehicle from the feed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleRecord {
    #[serde(default, deserialize_with = "string_or_number")]
    pub line_id: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub line_label: Option<String>,
    /// Brigade and course number joined by `/`, e.g. `"12/3AB"`.
    #[serde(default, deserialize_with = "string_or_empty")]
    pub trip: String,
    /// Fleet number with `_` separators, e.g. `"123_45"`.
    #[serde(default, deserialize_with = "string_or_empty")]
    pub id: String,
}

impl VehicleRecord {
    /// The line this vehicle is grouped and filtered under.
    ///
    /// Prefers the public label and falls back to the internal id.
    pub fn line(&self) -> &str {
        self.line_label
            .as_deref()
            .filter(|l| !l.is_empty())
            .or(self.line_id.as_deref())
            .unwrap_or("")
    }
}

/// One fetched copy of the feed.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub fetched_at: DateTime<Utc>,
    pub vehicles: Vec<VehicleRecord>,
}

impl Snapshot {
    pub fn new(vehicles: Vec<VehicleRecord>) -> Self {
        Self {
            fetched_at: Utc::now(),
            vehicles,
        }
    }
}
