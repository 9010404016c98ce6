//! Shared analysis pipeline used by `fit`, `watch` and `scan`.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! raw snapshot -> normalize -> Levitt's measure -> fit/gate -> tail
//!
//! The front-ends can then focus on presentation (printing vs exports).

use chrono::{DateTime, Local, NaiveDate};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::data::RawSnapshot;
use crate::data::catalog::{district_entries, selectable_states};
use crate::domain::{AnalysisConfig, CanonicalSeries, FitResult, Region, RegionKind};
use crate::error::{AppError, CoreError};
use crate::levitt::compute_levitt;
use crate::normalize::{NormalizeOptions, normalize};
use crate::report::{ScanRankings, ScanRow, rank_by_crossing};

/// All computed outputs of a single `levitt fit` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub series: CanonicalSeries,
    pub fit: FitResult,
    /// Where the snapshot came from and when it was taken.
    pub origin: String,
    pub fetched_at: DateTime<Local>,
}

/// Normalize and fit one region against a snapshot the caller holds.
pub fn run_analysis(snapshot: &RawSnapshot, config: &AnalysisConfig) -> Result<RunOutput, AppError> {
    let options = NormalizeOptions {
        national_year: config.national_year,
    };
    let series = normalize(&config.region, snapshot, &options)?;
    let fit = compute_levitt(&series, config.start_date)?;

    info!(
        region = %config.region.label(),
        records = series.len(),
        extrapolate = fit.extrapolate,
        "analysis complete"
    );

    Ok(RunOutput {
        series,
        fit,
        origin: snapshot.origin.clone(),
        fetched_at: snapshot.fetched_at,
    })
}

/// Every region of `kind` that a scan covers.
pub fn scan_regions(snapshot: &RawSnapshot, kind: RegionKind) -> Result<Vec<Region>, AppError> {
    match kind {
        RegionKind::State => Ok(selectable_states()
            .map(|(code, _)| Region::State { code: code.to_string() })
            .collect()),
        RegionKind::District => Ok(district_entries(snapshot)
            .into_iter()
            .map(|(name, state)| Region::District {
                name,
                state: Some(state).filter(|s| !s.is_empty()),
            })
            .collect()),
        RegionKind::National => Err(AppError::new(
            2,
            "scan covers states or districts; use `levitt fit` for the national series",
        )),
    }
}

/// Analyse every region of `kind` in parallel and rank the results.
///
/// Per-region failures do not abort the scan; they are collected with their reason.
pub fn run_scan(
    snapshot: &RawSnapshot,
    kind: RegionKind,
    start_date: NaiveDate,
    national_year: i32,
) -> Result<ScanRankings, AppError> {
    let regions = scan_regions(snapshot, kind)?;
    let options = NormalizeOptions { national_year };

    let outcomes: Vec<Result<ScanRow, (String, String)>> = regions
        .par_iter()
        .map(|region| {
            let label = region.label();
            normalize(region, snapshot, &options)
                .and_then(|series| compute_levitt(&series, start_date))
                .map(|fit| ScanRow {
                    region: region.clone(),
                    label: label.clone(),
                    fit,
                })
                .map_err(|e: CoreError| (label, e.to_string()))
        })
        .collect();

    let mut rows = Vec::new();
    let mut failures = Vec::new();
    for outcome in outcomes {
        match outcome {
            Ok(row) => rows.push(row),
            Err(failure) => failures.push(failure),
        }
    }

    debug!(regions = regions.len(), ok = rows.len(), failed = failures.len(), "scan finished");
    Ok(rank_by_crossing(rows, failures))
}
