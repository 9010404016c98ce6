//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - built fresh per analysis request (nothing here is cached or mutated in place)
//! - exported to JSON/CSV
//! - reloaded later for plotting

use std::path::PathBuf;

use chrono::{DateTime, Local, NaiveDate};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Which raw feed shape a region is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RegionKind {
    /// Country-wide series with daily deltas and year-less dates.
    National,
    /// One state/UT from the long-format status table.
    State,
    /// One district from the cumulative-only district table.
    District,
}

impl RegionKind {
    pub fn display_name(self) -> &'static str {
        match self {
            RegionKind::National => "National",
            RegionKind::State => "State",
            RegionKind::District => "District",
        }
    }
}

/// A concrete region selection: the kind plus its selector.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Region {
    National,
    State {
        /// Lowercase state code as used by the states feed (e.g. `mh`).
        code: String,
    },
    District {
        name: String,
        /// Optional state name, needed when a district name exists in more than one state.
        state: Option<String>,
    },
}

impl Region {
    pub fn kind(&self) -> RegionKind {
        match self {
            Region::National => RegionKind::National,
            Region::State { .. } => RegionKind::State,
            Region::District { .. } => RegionKind::District,
        }
    }

    /// Human-readable label for terminal output and file names.
    pub fn label(&self) -> String {
        match self {
            Region::National => "India".to_string(),
            Region::State { code } => crate::data::catalog::state_name(code)
                .map(str::to_string)
                .unwrap_or_else(|| code.to_uppercase()),
            Region::District { name, state: Some(state) } => format!("{name} ({state})"),
            Region::District { name, state: None } => name.clone(),
        }
    }
}

/// One calendar day for one region.
///
/// `active = cumulative_confirmed - cumulative_recovered - cumulative_deceased`
/// is passed through even when negative (inconsistent upstream data is not corrected).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub cumulative_confirmed: i64,
    pub cumulative_recovered: i64,
    pub cumulative_deceased: i64,
    /// Negative only when the upstream feed applied a correction.
    pub daily_new: i64,
    pub daily_recovered: i64,
    pub daily_deceased: i64,
    pub active: i64,
}

/// Ordered daily records for exactly one region.
///
/// Invariant: dates are unique and strictly ascending. Gaps are allowed.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalSeries {
    region: Region,
    records: Vec<DailyRecord>,
}

impl CanonicalSeries {
    /// Build a series, rejecting out-of-order or duplicated dates.
    pub fn new(region: Region, records: Vec<DailyRecord>) -> Result<Self, CoreError> {
        for pair in records.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(CoreError::malformed(
                    region.label(),
                    format!(
                        "records must be strictly ascending by date ({} followed by {})",
                        pair[0].date, pair[1].date
                    ),
                ));
            }
        }
        Ok(Self { region, records })
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    pub fn records(&self) -> &[DailyRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.records.first().map(|r| r.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.records.last().map(|r| r.date)
    }
}

/// H(t) for one day of the start-date-bounded window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevittPoint {
    pub date: NaiveDate,
    /// Dense 0-based position within the filtered window (not date-derived).
    pub day_index: usize,
    /// `None` when the prior day's cumulative count is not positive.
    pub measure: Option<f64>,
}

/// One point on the fitted (and possibly extrapolated) line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TailPoint {
    pub date: NaiveDate,
    pub day_index: usize,
    pub predicted: f64,
}

/// Output of one Levitt regression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    pub slope: f64,
    pub intercept: f64,
    /// Coefficient of determination over the defined pairs. Not clamped; NaN
    /// when fewer than two pairs were fitted.
    #[serde(with = "nan_as_null")]
    pub r_squared: f64,
    /// Day index where the line reaches the plateau threshold; `None` for a flat
    /// or non-finite line.
    pub crossing_day: Option<f64>,
    pub extrapolate: bool,
    /// The projected tail stopped short of the crossing day (horizon cap).
    pub truncated: bool,
    /// Number of `(day_index, measure)` pairs used by the fit.
    pub n_pairs: usize,
    /// Number of records in the filtered window (`N`).
    pub observed_days: usize,
    pub last_observed_date: NaiveDate,
    /// Per-day measures for day indices `1..N`.
    pub measures: Vec<LevittPoint>,
    pub projected_tail: Vec<TailPoint>,
}

impl FitResult {
    /// Evaluate the fitted line at a day index.
    pub fn predict(&self, day_index: f64) -> f64 {
        self.slope * day_index + self.intercept
    }

    /// Date of the last projected day, when the trend was extrapolated.
    pub fn crossing_date(&self) -> Option<NaiveDate> {
        if !self.extrapolate {
            return None;
        }
        self.projected_tail.last().map(|p| p.date)
    }

    /// Number of tail points beyond the observed window.
    pub fn projected_days(&self) -> usize {
        self.projected_tail
            .iter()
            .filter(|p| p.day_index >= self.observed_days)
            .count()
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub region: Region,
    /// Records strictly after this date are analysed.
    pub start_date: NaiveDate,
    /// Year assumed for year-less national dates.
    pub national_year: i32,
    /// Local snapshot directory; `None` fetches from the network.
    pub data_dir: Option<PathBuf>,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
    /// Rows shown in the recent-days table.
    pub recent_days: usize,

    pub export_series: Option<PathBuf>,
    pub export_fit: Option<PathBuf>,
}

/// A saved fit file (JSON).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitFile {
    pub tool: String,
    pub region: Region,
    pub region_label: String,
    pub start_date: NaiveDate,
    pub generated_at: DateTime<Local>,
    pub fit: FitResult,
}

/// Serialize NaN as `null` so fit files stay valid JSON and reload losslessly.
mod nan_as_null {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(v: &f64, s: S) -> Result<S::Ok, S::Error> {
        if v.is_nan() {
            s.serialize_none()
        } else {
            s.serialize_some(v)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(d)?.unwrap_or(f64::NAN))
    }
}
