//! Read/write fit JSON files.
//!
//! A fit file is the portable representation of one analysis:
//! - region + start date
//! - the fitted line, gate decision and projected tail
//! - the per-day measures, so `levitt plot` can redraw without the feeds
//!
//! The schema is defined by `domain::FitFile`.

use std::fs::File;
use std::path::Path;

use chrono::{Local, NaiveDate};

use crate::domain::{FitFile, FitResult, Region};
use crate::error::AppError;

pub fn build_fit_file(region: &Region, start_date: NaiveDate, fit: &FitResult) -> FitFile {
    FitFile {
        tool: "levitt".to_string(),
        region: region.clone(),
        region_label: region.label(),
        start_date,
        generated_at: Local::now(),
        fit: fit.clone(),
    }
}

/// Write a fit JSON file.
pub fn write_fit_json(path: &Path, region: &Region, start_date: NaiveDate, fit: &FitResult) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create fit JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, &build_fit_file(region, start_date, fit))
        .map_err(|e| AppError::new(2, format!("Failed to write fit JSON: {e}")))?;

    Ok(())
}

/// Read a fit JSON file.
pub fn read_fit_json(path: &Path) -> Result<FitFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open fit JSON '{}': {e}", path.display())))?;
    let fit: FitFile =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid fit JSON: {e}")))?;
    Ok(fit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CanonicalSeries, DailyRecord};
    use crate::levitt::compute_levitt;
    use tempfile::NamedTempFile;

    #[test]
    fn fit_file_reloads() {
        let records: Vec<DailyRecord> = [40, 52, 61, 67, 71]
            .iter()
            .enumerate()
            .map(|(i, &c)| DailyRecord {
                date: NaiveDate::from_ymd_opt(2020, 5, 1 + i as u32).unwrap(),
                cumulative_confirmed: c,
                cumulative_recovered: 0,
                cumulative_deceased: 0,
                daily_new: 0,
                daily_recovered: 0,
                daily_deceased: 0,
                active: c,
            })
            .collect();
        let region = Region::State { code: "kl".into() };
        let series = CanonicalSeries::new(region.clone(), records).unwrap();
        let start = NaiveDate::from_ymd_opt(2020, 4, 30).unwrap();
        let fit = compute_levitt(&series, start).unwrap();

        let file = NamedTempFile::new().unwrap();
        write_fit_json(file.path(), &region, start, &fit).unwrap();
        let loaded = read_fit_json(file.path()).unwrap();

        assert_eq!(loaded.tool, "levitt");
        assert_eq!(loaded.region, region);
        assert_eq!(loaded.region_label, "Kerala");
        assert_eq!(loaded.start_date, start);
        assert_eq!(loaded.fit.measures.len(), fit.measures.len());
        for (a, b) in loaded.fit.measures.iter().zip(&fit.measures) {
            assert_eq!(a.date, b.date);
            match (a.measure, b.measure) {
                (Some(x), Some(y)) => assert!((x - y).abs() < 1e-12),
                (x, y) => assert_eq!(x, y),
            }
        }
        assert_eq!(loaded.fit.projected_tail.len(), fit.projected_tail.len());
        assert_eq!(loaded.fit.extrapolate, fit.extrapolate);
    }

    #[test]
    fn missing_file_is_an_input_error() {
        let err = read_fit_json(Path::new("/definitely/not/here.json")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
