//! TimeSeriesNormalizer: raw feed rows -> `CanonicalSeries`.
//!
//! Each region kind has its own raw shape and its own strategy:
//!
//! - `national`: daily deltas, year-less dates
//! - `state`: long-format table, one row per (date, status)
//! - `district`: cumulative totals only
//!
//! `normalize` dispatches once on the `Region` variant; everything downstream
//! (the Levitt engine) is region-agnostic.

use chrono::NaiveDate;
use tracing::debug;

use crate::data::raw::RawSnapshot;
use crate::domain::{CanonicalSeries, DailyRecord, Region};
use crate::error::CoreError;

pub mod district;
pub mod national;
pub mod state;

/// Knobs that resolve ambiguities in the raw feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Year assumed for the national feed's year-less dates.
    pub national_year: i32,
}

/// Build the canonical series for one region from a raw snapshot.
pub fn normalize(
    region: &Region,
    snapshot: &RawSnapshot,
    options: &NormalizeOptions,
) -> Result<CanonicalSeries, CoreError> {
    let records = match region {
        Region::National => national::normalize_national(&snapshot.national, options.national_year)?,
        Region::State { code } => state::normalize_state(&snapshot.states, code)?,
        Region::District { name, state } => {
            district::normalize_district(&snapshot.districts, name, state.as_deref())?
        }
    };

    debug!(region = %region.label(), records = records.len(), "normalized series");
    CanonicalSeries::new(region.clone(), records)
}

/// One day's deltas before accumulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DailyDelta {
    pub date: NaiveDate,
    pub confirmed: i64,
    pub recovered: i64,
    pub deceased: i64,
}

/// Running sums over daily deltas (national and state feeds).
pub(crate) fn accumulate(deltas: &[DailyDelta]) -> Vec<DailyRecord> {
    let mut cum_confirmed = 0i64;
    let mut cum_recovered = 0i64;
    let mut cum_deceased = 0i64;

    deltas
        .iter()
        .map(|d| {
            cum_confirmed += d.confirmed;
            cum_recovered += d.recovered;
            cum_deceased += d.deceased;
            DailyRecord {
                date: d.date,
                cumulative_confirmed: cum_confirmed,
                cumulative_recovered: cum_recovered,
                cumulative_deceased: cum_deceased,
                daily_new: d.confirmed,
                daily_recovered: d.recovered,
                daily_deceased: d.deceased,
                active: cum_confirmed - (cum_recovered + cum_deceased),
            }
        })
        .collect()
}

/// Parse a case count. Accepts integers and integral decimals (`"12.0"`).
pub(crate) fn parse_count(raw: &str, context: &str, field: &str) -> Result<i64, CoreError> {
    let s = raw.trim();
    if let Ok(v) = s.parse::<i64>() {
        return Ok(v);
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < 9.0e15 => Ok(v as i64),
        _ => Err(CoreError::malformed(
            context,
            format!("`{field}` is not a whole number: '{s}'"),
        )),
    }
}

pub(crate) fn parse_iso_date(raw: &str, context: &str) -> Result<NaiveDate, CoreError> {
    let s = raw.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| CoreError::malformed(context, format!("invalid date '{s}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::raw::{NationalRow, RawField};

    #[test]
    fn parse_count_accepts_integral_values_only() {
        assert_eq!(parse_count(" 42 ", "ctx", "n").unwrap(), 42);
        assert_eq!(parse_count("-3", "ctx", "n").unwrap(), -3);
        assert_eq!(parse_count("12.0", "ctx", "n").unwrap(), 12);
        assert!(matches!(parse_count("12.5", "ctx", "n"), Err(CoreError::MalformedInput { .. })));
        assert!(matches!(parse_count("", "ctx", "n"), Err(CoreError::MalformedInput { .. })));
        assert!(matches!(parse_count("NaN", "ctx", "n"), Err(CoreError::MalformedInput { .. })));
    }

    #[test]
    fn accumulate_derives_active_from_running_sums() {
        let d = |day| NaiveDate::from_ymd_opt(2020, 4, day).unwrap();
        let deltas = [
            DailyDelta { date: d(1), confirmed: 10, recovered: 0, deceased: 0 },
            DailyDelta { date: d(2), confirmed: 5, recovered: 3, deceased: 1 },
            DailyDelta { date: d(3), confirmed: -2, recovered: 4, deceased: 0 },
        ];
        let records = accumulate(&deltas);
        let cum: Vec<i64> = records.iter().map(|r| r.cumulative_confirmed).collect();
        assert_eq!(cum, vec![10, 15, 13]);
        assert_eq!(records[2].daily_new, -2);
        for r in &records {
            assert_eq!(r.active, r.cumulative_confirmed - r.cumulative_recovered - r.cumulative_deceased);
        }
        assert_eq!(records[2].active, 13 - 7 - 1);
    }

    #[test]
    fn normalize_dispatches_on_region() {
        let mut snapshot = RawSnapshot::empty("test");
        snapshot.national = vec![NationalRow {
            date: RawField::from("30 January "),
            dateymd: None,
            daily_confirmed: RawField::from("1"),
            daily_recovered: RawField::from("0"),
            daily_deceased: RawField::from("0"),
        }];
        let options = NormalizeOptions { national_year: 2020 };

        let series = normalize(&Region::National, &snapshot, &options).unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series.first_date(), NaiveDate::from_ymd_opt(2020, 1, 30));

        let err = normalize(&Region::State { code: "mh".into() }, &snapshot, &options).unwrap_err();
        assert!(matches!(err, CoreError::UnknownRegion(_)));
    }
}
