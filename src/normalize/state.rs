//! State feed: a long-format table with three rows per date (`Confirmed`,
//! `Recovered`, `Deceased`) and one delta column per state code.
//!
//! Rows are joined on their date, not on their position, so the three status
//! blocks may arrive in any order.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::data::raw::StateRow;
use crate::domain::DailyRecord;
use crate::error::CoreError;
use crate::normalize::{DailyDelta, accumulate, parse_count, parse_iso_date};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Confirmed,
    Recovered,
    Deceased,
}

impl Status {
    const ALL: [Status; 3] = [Status::Confirmed, Status::Recovered, Status::Deceased];

    fn parse(raw: &str) -> Option<Self> {
        let s = raw.trim();
        Status::ALL
            .into_iter()
            .find(|status| status.label().eq_ignore_ascii_case(s))
    }

    fn label(self) -> &'static str {
        match self {
            Status::Confirmed => "Confirmed",
            Status::Recovered => "Recovered",
            Status::Deceased => "Deceased",
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

pub fn normalize_state(rows: &[StateRow], code: &str) -> Result<Vec<DailyRecord>, CoreError> {
    let code = code.trim().to_ascii_lowercase();
    if !rows.iter().any(|row| row.values.contains_key(&code)) {
        return Err(CoreError::UnknownRegion(format!(
            "state code '{code}' is not present in the states feed"
        )));
    }

    let mut by_date: BTreeMap<NaiveDate, [Option<i64>; 3]> = BTreeMap::new();

    for (idx, row) in rows.iter().enumerate() {
        let context = format!("states row {} ({code})", idx + 1);

        let status = Status::parse(row.status.as_str()).ok_or_else(|| {
            CoreError::malformed(&context, format!("unknown status '{}'", row.status.as_str()))
        })?;
        let date = parse_state_date(row, &context)?;
        let raw = row
            .values
            .get(&code)
            .ok_or_else(|| CoreError::malformed(&context, format!("missing column `{code}`")))?;
        let value = parse_count(raw.as_str(), &context, &code)?;

        let slots = by_date.entry(date).or_default();
        if slots[status.slot()].replace(value).is_some() {
            return Err(CoreError::malformed(
                context,
                format!("duplicate {} row for {date}", status.label()),
            ));
        }
    }

    let mut deltas = Vec::with_capacity(by_date.len());
    for (date, slots) in by_date {
        let value = |status: Status| {
            slots[status.slot()].ok_or_else(|| {
                CoreError::malformed(
                    format!("states feed ({code})"),
                    format!("{date} has no {} row", status.label()),
                )
            })
        };
        deltas.push(DailyDelta {
            date,
            confirmed: value(Status::Confirmed)?,
            recovered: value(Status::Recovered)?,
            deceased: value(Status::Deceased)?,
        });
    }

    Ok(accumulate(&deltas))
}

fn parse_state_date(row: &StateRow, context: &str) -> Result<NaiveDate, CoreError> {
    if let Some(iso) = row.dateymd.as_ref().map(|f| f.as_str().trim()).filter(|s| !s.is_empty()) {
        return parse_iso_date(iso, context);
    }
    let s = row.date.as_str().trim();
    NaiveDate::parse_from_str(s, "%d-%b-%y")
        .map_err(|e| CoreError::malformed(context, format!("invalid date '{s}': {e}")))
}
