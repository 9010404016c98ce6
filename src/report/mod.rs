//! Reporting utilities: scan rankings and formatted terminal output.

pub mod format;

pub use format::*;

use chrono::NaiveDate;

use crate::domain::{FitResult, Region};

/// One successfully analysed region in a scan.
#[derive(Debug, Clone)]
pub struct ScanRow {
    pub region: Region,
    pub label: String,
    pub fit: FitResult,
}

impl ScanRow {
    pub fn crossing_date(&self) -> Option<NaiveDate> {
        self.fit.crossing_date()
    }

    /// Most recent defined H(t).
    pub fn latest_measure(&self) -> Option<f64> {
        self.fit.measures.iter().rev().find_map(|p| p.measure)
    }
}

/// Scan output: ranked successes plus the regions that could not be analysed.
#[derive(Debug, Clone, Default)]
pub struct ScanRankings {
    /// Extrapolated regions first (earliest projected plateau first), then the rest by slope.
    pub ranked: Vec<ScanRow>,
    pub failures: Vec<(String, String)>,
}

/// Order scan rows: projected plateau dates ascending, then non-projected rows
/// with the steepest decline first.
pub fn rank_by_crossing(mut rows: Vec<ScanRow>, failures: Vec<(String, String)>) -> ScanRankings {
    rows.sort_by(|a, b| {
        match (a.crossing_date(), b.crossing_date()) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a
                .fit
                .slope
                .partial_cmp(&b.fit.slope)
                .unwrap_or(std::cmp::Ordering::Equal),
        }
        .then_with(|| a.label.cmp(&b.label))
    });

    let mut failures = failures;
    failures.sort();
    ScanRankings { ranked: rows, failures }
}
