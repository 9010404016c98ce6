//! Raw feed ingest.
//!
//! This module is responsible for turning the three upstream payloads into
//! raw row vectors (`data::raw`), whether they arrive over HTTP or from files
//! in a snapshot directory.
//!
//! Design goals:
//! - **Structural validation only** (the payload shape); numeric validation
//!   is the normalizer's job
//! - **Tolerant headers** (BOM + case) for the district CSV
//! - **Separation of concerns**: no normalization or fitting logic here

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::Local;
use csv::StringRecord;
use serde::Deserialize;
use tracing::{debug, info};

use crate::data::raw::{DistrictRow, NationalRow, RawSnapshot, StateRow};
use crate::error::AppError;

/// File names used inside a snapshot directory (same names as the upstream feeds).
pub const NATIONAL_FILE: &str = "data.json";
pub const STATES_FILE: &str = "states_daily.json";
pub const DISTRICTS_FILE: &str = "districts.csv";

#[derive(Debug, Deserialize)]
struct NationalFeed {
    cases_time_series: Vec<NationalRow>,
}

#[derive(Debug, Deserialize)]
struct StatesFeed {
    states_daily: Vec<StateRow>,
}

/// Parse `data.json` (only `cases_time_series` is used).
pub fn parse_national_json<R: Read>(reader: R) -> Result<Vec<NationalRow>, AppError> {
    let feed: NationalFeed = serde_json::from_reader(reader)
        .map_err(|e| AppError::new(2, format!("Invalid national feed JSON: {e}")))?;
    Ok(feed.cases_time_series)
}

/// Parse `states_daily.json`.
pub fn parse_states_json<R: Read>(reader: R) -> Result<Vec<StateRow>, AppError> {
    let feed: StatesFeed = serde_json::from_reader(reader)
        .map_err(|e| AppError::new(2, format!("Invalid states feed JSON: {e}")))?;
    Ok(feed.states_daily)
}

/// Parse `districts.csv`.
pub fn parse_districts_csv<R: Read>(reader: R) -> Result<Vec<DistrictRow>, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read district CSV headers: {e}")))?
        .clone();
    reader.set_headers(normalize_headers(&headers));

    let mut rows = Vec::new();
    for (idx, result) in reader.deserialize::<DistrictRow>().enumerate() {
        // +2: header line plus 1-based numbering.
        let line = idx + 2;
        let row = result.map_err(|e| AppError::new(2, format!("District CSV line {line}: {e}")))?;
        rows.push(row);
    }
    Ok(rows)
}

/// Load a snapshot from a directory holding any subset of the three feed files.
pub fn load_snapshot_dir(dir: &Path) -> Result<RawSnapshot, AppError> {
    if !dir.is_dir() {
        return Err(AppError::new(
            2,
            format!("Snapshot directory '{}' does not exist.", dir.display()),
        ));
    }

    let mut snapshot = RawSnapshot::empty(dir.display().to_string());
    let mut found = 0usize;

    if let Some(file) = open_optional(&dir.join(NATIONAL_FILE))? {
        snapshot.national = parse_national_json(file)?;
        found += 1;
    }
    if let Some(file) = open_optional(&dir.join(STATES_FILE))? {
        snapshot.states = parse_states_json(file)?;
        found += 1;
    }
    if let Some(file) = open_optional(&dir.join(DISTRICTS_FILE))? {
        snapshot.districts = parse_districts_csv(file)?;
        found += 1;
    }

    if found == 0 {
        return Err(AppError::new(
            2,
            format!(
                "No feed files in '{}'. Expected at least one of {NATIONAL_FILE}, {STATES_FILE}, {DISTRICTS_FILE}.",
                dir.display()
            ),
        ));
    }

    snapshot.fetched_at = Local::now();
    info!(
        dir = %dir.display(),
        national = snapshot.national.len(),
        states = snapshot.states.len(),
        districts = snapshot.districts.len(),
        "loaded snapshot from directory"
    );
    Ok(snapshot)
}

fn open_optional(path: &Path) -> Result<Option<File>, AppError> {
    if !path.exists() {
        debug!(path = %path.display(), "feed file not present");
        return Ok(None);
    }
    File::open(path)
        .map(Some)
        .map_err(|e| AppError::new(2, format!("Failed to open '{}': {e}", path.display())))
}

fn normalize_headers(headers: &StringRecord) -> StringRecord {
    headers.iter().map(normalize_header_name).collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const DISTRICT_CSV: &str = "\u{feff}Date,State,District,Confirmed,Recovered,Deceased,Other,Tested\n\
2020-04-26,Maharashtra,Pune,1000,100,50,0,\n\
2020-04-27,Maharashtra,Pune,1100,,55,0,\n";

    #[test]
    fn district_csv_handles_bom_and_empty_cells() {
        let rows = parse_districts_csv(DISTRICT_CSV.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date, "2020-04-26");
        assert_eq!(rows[0].district, "Pune");
        assert_eq!(rows[1].recovered, "");
        assert_eq!(rows[1].deceased, "55");
    }

    #[test]
    fn national_json_reads_time_series() {
        let json = r#"{"cases_time_series":[
            {"date":"30 January ","dailyconfirmed":"1","dailyrecovered":"0","dailydeceased":"0"}
        ],"statewise":[]}"#;
        let rows = parse_national_json(json.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].daily_confirmed.as_str(), "1");
    }

    #[test]
    fn states_json_missing_key_is_an_input_error() {
        let err = parse_states_json(r#"{"rows":[]}"#.as_bytes()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn snapshot_dir_loads_available_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(DISTRICTS_FILE), DISTRICT_CSV).unwrap();

        let snapshot = load_snapshot_dir(dir.path()).unwrap();
        assert!(snapshot.national.is_empty());
        assert!(snapshot.states.is_empty());
        assert_eq!(snapshot.districts.len(), 2);
        assert_eq!(snapshot.origin, dir.path().display().to_string());
    }

    #[test]
    fn snapshot_dir_without_feeds_is_rejected() {
        let dir = TempDir::new().unwrap();
        let err = load_snapshot_dir(dir.path()).unwrap_err();
        assert_eq!(err.exit_code(), 2);

        let missing = dir.path().join("not-there");
        assert_eq!(load_snapshot_dir(&missing).unwrap_err().exit_code(), 2);
    }
}
