//! National feed: per-day deltas with dates like `"30 January "`.
//!
//! The year is not part of the date string. It is supplied by the caller and
//! rolls forward whenever the month goes backwards between consecutive rows
//! (December -> January). Rows that carry `dateymd` use it directly.

use chrono::{Datelike, NaiveDate};

use crate::data::raw::NationalRow;
use crate::domain::DailyRecord;
use crate::error::CoreError;
use crate::normalize::{DailyDelta, accumulate, parse_count, parse_iso_date};

pub fn normalize_national(rows: &[NationalRow], assumed_year: i32) -> Result<Vec<DailyRecord>, CoreError> {
    let mut deltas = Vec::with_capacity(rows.len());
    let mut year = assumed_year;
    let mut prev_month: Option<u32> = None;

    for (idx, row) in rows.iter().enumerate() {
        let context = format!("national row {}", idx + 1);

        let iso = row
            .dateymd
            .as_ref()
            .map(|f| f.as_str().trim())
            .filter(|s| !s.is_empty());
        let date = match iso {
            Some(s) => parse_iso_date(s, &context)?,
            None => {
                // Leap year probe so `29 February` resolves its month regardless of `year`.
                let month = parse_yearless(row.date.as_str(), 2000, &context)?.month();
                if prev_month.is_some_and(|m| month < m) {
                    year += 1;
                }
                parse_yearless(row.date.as_str(), year, &context)?
            }
        };
        prev_month = Some(date.month());
        year = year.max(date.year());

        deltas.push(DailyDelta {
            date,
            confirmed: parse_count(row.daily_confirmed.as_str(), &context, "dailyconfirmed")?,
            recovered: parse_count(row.daily_recovered.as_str(), &context, "dailyrecovered")?,
            deceased: parse_count(row.daily_deceased.as_str(), &context, "dailydeceased")?,
        });
    }

    Ok(accumulate(&deltas))
}

fn parse_yearless(raw: &str, year: i32, context: &str) -> Result<NaiveDate, CoreError> {
    let s = raw.trim();
    NaiveDate::parse_from_str(&format!("{s} {year}"), "%d %B %Y")
        .map_err(|e| CoreError::malformed(context, format!("invalid date '{s}': {e}")))
}
