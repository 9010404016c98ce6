//! Raw feed rows, kept exactly as the upstream feeds carry them.
//!
//! Numeric fields stay as text here. Validation (and the `MalformedInput`
//! error) belongs to the normalizer, so a snapshot can always be loaded and
//! only the region actually requested has to be well-formed.

use std::collections::BTreeMap;

use chrono::{DateTime, Local};
use serde::Deserialize;

/// One immutable snapshot of all three feeds.
#[derive(Debug, Clone)]
pub struct RawSnapshot {
    pub national: Vec<NationalRow>,
    pub states: Vec<StateRow>,
    pub districts: Vec<DistrictRow>,
    pub fetched_at: DateTime<Local>,
    /// Where the snapshot came from (URL base or directory).
    pub origin: String,
}

impl RawSnapshot {
    pub fn empty(origin: impl Into<String>) -> Self {
        Self {
            national: Vec::new(),
            states: Vec::new(),
            districts: Vec::new(),
            fetched_at: Local::now(),
            origin: origin.into(),
        }
    }
}

/// `data.json -> cases_time_series[]`: daily deltas with a year-less date.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NationalRow {
    /// e.g. `"30 January "` (no year).
    pub date: RawField,
    /// Later revisions of the feed also carry an ISO date.
    #[serde(default)]
    pub dateymd: Option<RawField>,
    #[serde(rename = "dailyconfirmed")]
    pub daily_confirmed: RawField,
    #[serde(rename = "dailyrecovered")]
    pub daily_recovered: RawField,
    #[serde(rename = "dailydeceased")]
    pub daily_deceased: RawField,
}

/// `states_daily.json -> states_daily[]`: one row per (date, status), one
/// column per state code.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StateRow {
    /// e.g. `"14-Mar-20"`.
    pub date: RawField,
    #[serde(default)]
    pub dateymd: Option<RawField>,
    /// `Confirmed`, `Recovered` or `Deceased`.
    pub status: RawField,
    /// State code -> that day's delta.
    #[serde(flatten)]
    pub values: BTreeMap<String, RawField>,
}

/// `districts.csv`: cumulative totals per district per day.
///
/// Field names match the CSV headers after ingest lowercases them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DistrictRow {
    pub date: String,
    #[serde(default)]
    pub state: String,
    pub district: String,
    pub confirmed: String,
    #[serde(default)]
    pub recovered: String,
    #[serde(default)]
    pub deceased: String,
}

/// A JSON scalar kept as text. The feeds quote numbers, but a bare number or
/// `null` is accepted too.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawFieldRepr")]
pub struct RawField(pub String);

impl RawField {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RawField {
    fn from(value: &str) -> Self {
        RawField(value.to_string())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawFieldRepr {
    Text(String),
    Number(serde_json::Number),
    Null(Option<()>),
}

impl From<RawFieldRepr> for RawField {
    fn from(value: RawFieldRepr) -> Self {
        match value {
            RawFieldRepr::Text(s) => RawField(s),
            RawFieldRepr::Number(n) => RawField(n.to_string()),
            RawFieldRepr::Null(_) => RawField(String::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_row_collects_codes_and_accepts_bare_numbers() {
        let json = r#"{"date":"14-Mar-20","dateymd":"2020-03-14","status":"Confirmed","mh":"14","kl":3,"tt":null}"#;
        let row: StateRow = serde_json::from_str(json).unwrap();
        assert_eq!(row.status.as_str(), "Confirmed");
        assert_eq!(row.dateymd.as_ref().map(RawField::as_str), Some("2020-03-14"));
        assert_eq!(row.values.get("mh").map(RawField::as_str), Some("14"));
        assert_eq!(row.values.get("kl").map(RawField::as_str), Some("3"));
        assert_eq!(row.values.get("tt").map(RawField::as_str), Some(""));
        assert!(!row.values.contains_key("status"));
        assert!(!row.values.contains_key("date"));
    }

    #[test]
    fn national_row_without_iso_date() {
        let json = r#"{"date":"30 January ","dailyconfirmed":"1","dailyrecovered":"0","dailydeceased":"0","totalconfirmed":"1"}"#;
        let row: NationalRow = serde_json::from_str(json).unwrap();
        assert_eq!(row.date.as_str(), "30 January ");
        assert!(row.dateymd.is_none());
        assert_eq!(row.daily_confirmed.as_str(), "1");
    }
}
