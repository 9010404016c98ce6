//! LevittMeasureEngine.
//!
//! Given a canonical series and a start date:
//!
//! 1. keep records strictly after the start date and index them densely `0..N`
//! 2. compute `H(i) = cum(i) / cum(i-1)` where the prior day is positive
//! 3. fit a least squares line over the defined `(i, H(i))` pairs
//! 4. solve for the day where the line reaches `PLATEAU_THRESHOLD`
//! 5. extrapolate only when that day is non-negative and `r² > MIN_R_SQUARED`

use chrono::{Days, NaiveDate};
use tracing::debug;

use crate::domain::{CanonicalSeries, DailyRecord, FitResult, LevittPoint, TailPoint};
use crate::error::CoreError;
use crate::math::{LineFit, fit_line, r_squared};

/// H(t) value treated as "growth has effectively stopped".
pub const PLATEAU_THRESHOLD: f64 = 1.0001;

/// Fits explaining this much variance or less are never extrapolated.
pub const MIN_R_SQUARED: f64 = 0.1;

/// Upper bound on projected days past the observed window. A nearly flat
/// line can put the crossing centuries away; the tail stops here.
pub const MAX_PROJECTION_DAYS: usize = 3650;

/// Records strictly after `start_date` (the series is sorted by date).
pub fn window(series: &CanonicalSeries, start_date: NaiveDate) -> &[DailyRecord] {
    let records = series.records();
    let first = records.partition_point(|r| r.date <= start_date);
    &records[first..]
}

/// Levitt's measure for day indices `1..N` of a window.
pub fn compute_measures(window: &[DailyRecord]) -> Vec<LevittPoint> {
    window
        .windows(2)
        .enumerate()
        .map(|(i, pair)| {
            let prior = pair[0].cumulative_confirmed;
            let measure = if prior > 0 {
                Some(pair[1].cumulative_confirmed as f64 / prior as f64).filter(|v| v.is_finite())
            } else {
                None
            };
            LevittPoint {
                date: pair[1].date,
                day_index: i + 1,
                measure,
            }
        })
        .collect()
}

/// Day index where the fitted line reaches the plateau threshold.
///
/// `None` for a flat line or a non-finite quotient.
pub fn crossing_day(line: &LineFit) -> Option<f64> {
    if line.slope == 0.0 {
        return None;
    }
    let day = (PLATEAU_THRESHOLD - line.intercept) / line.slope;
    day.is_finite().then_some(day)
}

/// The extrapolation gate: crossing day `>= 0` (inclusive) and `r² > 0.1` (strict).
pub fn should_extrapolate(crossing_day: Option<f64>, r_squared: f64) -> bool {
    matches!(crossing_day, Some(day) if day >= 0.0) && r_squared > MIN_R_SQUARED
}

/// Dated points of the fitted line.
///
/// Without extrapolation the tail covers the observed indices `0..N`. With it,
/// the tail covers `0..ceil(crossing_day)`; indices past the window get dates
/// counted forward from the last observed date.
///
/// Returns the tail and whether it was cut at `MAX_PROJECTION_DAYS`.
pub fn project_tail(
    line: &LineFit,
    window: &[DailyRecord],
    crossing_day: Option<f64>,
    extrapolate: bool,
) -> (Vec<TailPoint>, bool) {
    let Some(last) = window.last() else {
        return (Vec::new(), false);
    };
    let observed = window.len();
    let last_index = observed - 1;

    let wanted = match crossing_day {
        // Float-to-int `as` saturates, so absurd crossings stay bounded here.
        Some(day) if extrapolate => day.ceil() as usize,
        _ => observed,
    };
    let cap = observed.saturating_add(MAX_PROJECTION_DAYS);
    let end = wanted.min(cap);
    let mut truncated = wanted > cap;

    let mut tail = Vec::with_capacity(end);
    for day_index in 0..end {
        let date = if day_index < observed {
            window[day_index].date
        } else {
            let ahead = (day_index - last_index) as u64;
            match last.date.checked_add_days(Days::new(ahead)) {
                Some(date) => date,
                None => {
                    truncated = true;
                    break;
                }
            }
        };
        tail.push(TailPoint {
            date,
            day_index,
            predicted: line.predict(day_index as f64),
        });
    }

    (tail, truncated)
}

/// Compute H(t), fit the trend, and conditionally extrapolate it.
pub fn compute_levitt(series: &CanonicalSeries, start_date: NaiveDate) -> Result<FitResult, CoreError> {
    let window = window(series, start_date);
    if window.len() < 2 {
        return Err(CoreError::InsufficientData(format!(
            "{} has {} record(s) after {start_date}; at least 2 are needed",
            series.region().label(),
            window.len()
        )));
    }

    let measures = compute_measures(window);
    let (xs, ys): (Vec<f64>, Vec<f64>) = measures
        .iter()
        .filter_map(|p| p.measure.map(|m| (p.day_index as f64, m)))
        .unzip();

    if xs.is_empty() {
        return Err(CoreError::InsufficientData(format!(
            "{} has no day after {start_date} with a positive prior cumulative count",
            series.region().label()
        )));
    }

    let line = fit_line(&xs, &ys).ok_or_else(|| {
        CoreError::InsufficientData(format!(
            "least squares fit failed for {}",
            series.region().label()
        ))
    })?;

    let predicted: Vec<f64> = xs.iter().map(|&x| line.predict(x)).collect();
    let r2 = r_squared(&ys, &predicted);
    let crossing = crossing_day(&line);
    let extrapolate = should_extrapolate(crossing, r2);
    let (projected_tail, truncated) = project_tail(&line, window, crossing, extrapolate);

    debug!(
        region = %series.region().label(),
        n_pairs = xs.len(),
        slope = line.slope,
        intercept = line.intercept,
        r_squared = r2,
        crossing_day = ?crossing,
        extrapolate,
        truncated,
        "fitted Levitt trend"
    );

    Ok(FitResult {
        slope: line.slope,
        intercept: line.intercept,
        r_squared: r2,
        crossing_day: crossing,
        extrapolate,
        truncated,
        n_pairs: xs.len(),
        observed_days: window.len(),
        last_observed_date: window[window.len() - 1].date,
        measures,
        projected_tail,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Region;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, m, d).unwrap()
    }

    /// Consecutive days from `start` with the given cumulative counts.
    fn series_from(start: NaiveDate, cumulative: &[i64]) -> CanonicalSeries {
        let mut prev = 0;
        let records = cumulative
            .iter()
            .enumerate()
            .map(|(i, &cum)| {
                let rec = DailyRecord {
                    date: start + Days::new(i as u64),
                    cumulative_confirmed: cum,
                    cumulative_recovered: 0,
                    cumulative_deceased: 0,
                    daily_new: cum - prev,
                    daily_recovered: 0,
                    daily_deceased: 0,
                    active: cum,
                };
                prev = cum;
                rec
            })
            .collect();
        CanonicalSeries::new(Region::National, records).unwrap()
    }

    #[test]
    fn start_date_is_exclusive() {
        let s = series_from(date(4, 1), &[1, 2, 3, 4]);
        assert_eq!(window(&s, date(3, 31)).len(), 4);
        assert_eq!(window(&s, date(4, 1)).len(), 3);
        assert_eq!(window(&s, date(4, 1))[0].date, date(4, 2));
        assert!(window(&s, date(4, 4)).is_empty());
    }

    #[test]
    fn measures_defined_only_after_positive_prior_day() {
        let s = series_from(date(4, 1), &[0, 0, 10, 20, 15]);
        let m = compute_measures(window(&s, date(3, 31)));
        assert_eq!(m.len(), 4);
        assert_eq!(m[0].day_index, 1);
        assert_eq!(m[0].measure, None);
        assert_eq!(m[1].measure, None);
        assert_eq!(m[2].day_index, 3);
        assert_eq!(m[2].measure, Some(2.0));
        assert_eq!(m[3].measure, Some(0.75));
    }

    #[test]
    fn end_to_end_extrapolates_to_plateau() {
        let s = series_from(date(4, 1), &[100, 110, 118, 124]);
        let fit = compute_levitt(&s, date(3, 31)).unwrap();

        let m: Vec<Option<f64>> = fit.measures.iter().map(|p| p.measure).collect();
        assert!((m[0].unwrap() - 1.10).abs() < 1e-4);
        assert!((m[1].unwrap() - 1.0727).abs() < 1e-4);
        assert!((m[2].unwrap() - 1.0508).abs() < 1e-4);

        assert_eq!(fit.n_pairs, 3);
        assert_eq!(fit.observed_days, 4);
        assert!(fit.slope < 0.0);
        assert!(fit.r_squared > 0.99, "r² = {}", fit.r_squared);
        assert!(fit.extrapolate);

        let crossing = fit.crossing_day.unwrap();
        assert!((crossing - 5.028).abs() < 1e-2, "crossing = {crossing}");
        assert!(!fit.truncated);

        // ceil(5.03) = 6 points: 4 observed dates then two synthesized ones.
        assert_eq!(fit.projected_tail.len(), 6);
        assert_eq!(fit.projected_tail[3].date, date(4, 4));
        assert_eq!(fit.projected_tail[4].date, date(4, 5));
        assert_eq!(fit.projected_tail[5].date, date(4, 6));
        assert_eq!(fit.crossing_date(), Some(date(4, 6)));
        assert_eq!(fit.projected_days(), 2);

        let last = fit.projected_tail[5].predicted;
        assert!(last > PLATEAU_THRESHOLD);
        assert!(fit.predict(6.0) < PLATEAU_THRESHOLD);
    }

    #[test]
    fn fit_is_deterministic() {
        let s = series_from(date(4, 1), &[50, 70, 90, 104, 117, 125, 131]);
        let a = compute_levitt(&s, date(3, 31)).unwrap();
        let b = compute_levitt(&s, date(3, 31)).unwrap();
        assert_eq!(a.slope.to_bits(), b.slope.to_bits());
        assert_eq!(a.intercept.to_bits(), b.intercept.to_bits());
        assert_eq!(a.r_squared.to_bits(), b.r_squared.to_bits());
    }

    #[test]
    fn gate_boundaries() {
        // r² must be strictly above 0.1.
        assert!(!should_extrapolate(Some(5.0), 0.1));
        assert!(should_extrapolate(Some(5.0), 0.1000001));
        // Crossing day 0 is inclusive.
        assert!(should_extrapolate(Some(0.0), 0.5));
        assert!(!should_extrapolate(Some(-0.5), 0.5));
        // Flat line or undefined fit quality never extrapolates.
        assert!(!should_extrapolate(None, 0.9));
        assert!(!should_extrapolate(Some(3.0), f64::NAN));
    }

    #[test]
    fn flat_line_has_no_crossing() {
        let flat = LineFit { slope: 0.0, intercept: 1.2 };
        assert_eq!(crossing_day(&flat), None);

        let rising = LineFit { slope: 0.01, intercept: 1.2 };
        assert!(crossing_day(&rising).unwrap() < 0.0);
    }

    #[test]
    fn tail_without_extrapolation_covers_observed_days() {
        // H(t) rising from above the threshold: the crossing lies in the past.
        let s = series_from(date(4, 1), &[100, 110, 122, 137, 155]);
        let fit = compute_levitt(&s, date(3, 31)).unwrap();
        assert!(fit.slope > 0.0);
        assert!(!fit.extrapolate);
        assert_eq!(fit.projected_tail.len(), 5);
        assert_eq!(fit.projected_tail[4].date, date(4, 5));
        assert_eq!(fit.crossing_date(), None);
        assert_eq!(fit.projected_days(), 0);
    }

    #[test]
    fn tail_can_end_inside_observed_window() {
        let line = LineFit { slope: -1.25, intercept: 5.75 };
        let s = series_from(date(4, 1), &[0, 0, 10, 20, 15]);
        let w = window(&s, date(3, 31));
        let crossing = crossing_day(&line);
        let (tail, truncated) = project_tail(&line, w, crossing, true);
        // (1.0001 - 5.75) / -1.25 = 3.79992 -> ceil 4
        assert_eq!(tail.len(), 4);
        assert_eq!(tail[3].date, date(4, 4));
        assert!(!truncated);
    }

    #[test]
    fn distant_crossing_is_capped() {
        let line = LineFit { slope: -1e-9, intercept: 1.5 };
        let s = series_from(date(4, 1), &[10, 20, 30]);
        let w = window(&s, date(3, 31));
        let (tail, truncated) = project_tail(&line, w, crossing_day(&line), true);
        assert!(truncated);
        assert_eq!(tail.len(), 3 + MAX_PROJECTION_DAYS);
    }

    #[test]
    fn insufficient_data_cases() {
        let s = series_from(date(4, 1), &[100, 110, 118, 124]);
        // Start on or after the last date leaves nothing.
        assert!(matches!(compute_levitt(&s, date(4, 4)), Err(CoreError::InsufficientData(_))));
        assert!(matches!(compute_levitt(&s, date(5, 1)), Err(CoreError::InsufficientData(_))));
        // One remaining record is not enough.
        assert!(matches!(compute_levitt(&s, date(4, 3)), Err(CoreError::InsufficientData(_))));

        // No positive prior day anywhere.
        let zeros = series_from(date(4, 1), &[0, 0, 0, 5]);
        assert!(matches!(compute_levitt(&zeros, date(3, 31)), Err(CoreError::InsufficientData(_))));
    }

    #[test]
    fn single_pair_fit_does_not_extrapolate() {
        let s = series_from(date(4, 1), &[10, 20]);
        let fit = compute_levitt(&s, date(3, 31)).unwrap();
        assert_eq!(fit.n_pairs, 1);
        assert!(fit.r_squared.is_nan());
        assert!(!fit.extrapolate);
        assert_eq!(fit.projected_tail.len(), 2);
    }

    #[test]
    fn start_date_filter_reindexes_densely() {
        let s = series_from(date(4, 1), &[100, 110, 118, 124, 128]);
        let fit = compute_levitt(&s, date(4, 2)).unwrap();
        assert_eq!(fit.observed_days, 3);
        assert_eq!(fit.measures[0].date, date(4, 4));
        assert_eq!(fit.measures[0].day_index, 1);
        assert!((fit.measures[0].measure.unwrap() - 124.0 / 118.0).abs() < 1e-12);
    }
}
