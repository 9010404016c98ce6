//! District feed: cumulative totals only.
//!
//! Daily deltas are first differences of the totals. Day 0 has no prior day,
//! so its "delta" is the total itself; that record and the feed's trailing
//! (partial) day are both dropped before returning.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::data::raw::DistrictRow;
use crate::domain::DailyRecord;
use crate::error::CoreError;
use crate::normalize::{parse_count, parse_iso_date};

#[derive(Debug, Clone, Copy)]
struct Totals {
    confirmed: i64,
    recovered: i64,
    deceased: i64,
}

pub fn normalize_district(
    rows: &[DistrictRow],
    name: &str,
    state: Option<&str>,
) -> Result<Vec<DailyRecord>, CoreError> {
    let name = name.trim();
    let state = state.map(str::trim).filter(|s| !s.is_empty());

    let mut by_date: BTreeMap<NaiveDate, Totals> = BTreeMap::new();
    for (idx, row) in rows.iter().enumerate() {
        if !row.district.trim().eq_ignore_ascii_case(name) {
            continue;
        }
        if let Some(state) = state {
            if !row.state.trim().eq_ignore_ascii_case(state) {
                continue;
            }
        }

        let context = format!("districts row {} ({name})", idx + 1);
        let date = parse_iso_date(&row.date, &context)?;
        let totals = Totals {
            confirmed: parse_count(&row.confirmed, &context, "Confirmed")?,
            recovered: parse_optional_count(&row.recovered, &context, "Recovered")?,
            deceased: parse_optional_count(&row.deceased, &context, "Deceased")?,
        };

        if by_date.insert(date, totals).is_some() {
            let hint = if state.is_none() {
                "; the name may exist in several states, qualify it with a state"
            } else {
                ""
            };
            return Err(CoreError::malformed(context, format!("duplicate row for {date}{hint}")));
        }
    }

    if by_date.is_empty() {
        let label = match state {
            Some(state) => format!("district '{name}' in '{state}'"),
            None => format!("district '{name}'"),
        };
        return Err(CoreError::UnknownRegion(format!("{label} is not present in the districts feed")));
    }

    let mut records = Vec::with_capacity(by_date.len());
    let mut prev: Option<Totals> = None;
    for (date, t) in by_date {
        let base = prev.unwrap_or(Totals {
            confirmed: 0,
            recovered: 0,
            deceased: 0,
        });
        records.push(DailyRecord {
            date,
            cumulative_confirmed: t.confirmed,
            cumulative_recovered: t.recovered,
            cumulative_deceased: t.deceased,
            daily_new: t.confirmed - base.confirmed,
            daily_recovered: t.recovered - base.recovered,
            daily_deceased: t.deceased - base.deceased,
            active: t.confirmed - (t.recovered + t.deceased),
        });
        prev = Some(t);
    }

    Ok(trim_edges(records))
}

/// Empty cells in the optional columns mean zero.
fn parse_optional_count(raw: &str, context: &str, field: &str) -> Result<i64, CoreError> {
    if raw.trim().is_empty() {
        return Ok(0);
    }
    parse_count(raw, context, field)
}

fn trim_edges(records: Vec<DailyRecord>) -> Vec<DailyRecord> {
    if records.len() <= 2 {
        return Vec::new();
    }
    let last = records.len() - 1;
    records[1..last].to_vec()
}
