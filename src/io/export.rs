//! Export the analysed series to CSV.
//!
//! One row per canonical record, followed by one row per projected day. Cells
//! that do not apply to a row (no measure, outside the window) are left empty.

use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::NaiveDate;

use crate::domain::{CanonicalSeries, FitResult};
use crate::error::AppError;

const HEADER: &str = "date,cumulative_confirmed,daily_new,daily_recovered,daily_deceased,active,day_index,measure,fitted";

/// Write the series, its measures and the fitted line to a CSV file.
pub fn write_series_csv(path: &Path, series: &CanonicalSeries, fit: &FitResult) -> Result<(), AppError> {
    let mut file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_series(&mut file, series, fit)
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV: {e}")))
}

fn write_series<W: Write>(out: &mut W, series: &CanonicalSeries, fit: &FitResult) -> std::io::Result<()> {
    let measures: HashMap<NaiveDate, Option<f64>> =
        fit.measures.iter().map(|p| (p.date, p.measure)).collect();
    let fitted: HashMap<NaiveDate, (usize, f64)> = fit
        .projected_tail
        .iter()
        .map(|p| (p.date, (p.day_index, p.predicted)))
        .collect();

    writeln!(out, "{HEADER}")?;

    for r in series.records() {
        let (day_index, fitted_value) = match fitted.get(&r.date) {
            Some((idx, y)) => (idx.to_string(), format!("{y:.6}")),
            None => (String::new(), String::new()),
        };
        let measure = measures
            .get(&r.date)
            .copied()
            .flatten()
            .map(|m| format!("{m:.6}"))
            .unwrap_or_default();
        writeln!(
            out,
            "{},{},{},{},{},{},{},{},{}",
            r.date,
            r.cumulative_confirmed,
            r.daily_new,
            r.daily_recovered,
            r.daily_deceased,
            r.active,
            day_index,
            measure,
            fitted_value,
        )?;
    }

    for p in fit.projected_tail.iter().filter(|p| p.date > fit.last_observed_date) {
        writeln!(out, "{},,,,,,{},,{:.6}", p.date, p.day_index, p.predicted)?;
    }

    Ok(())
}
