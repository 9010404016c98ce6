//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the normalizer/engine code stays clean and testable
//! - output changes are localized

use crate::app::pipeline::RunOutput;
use crate::domain::{AnalysisConfig, CanonicalSeries, FitResult};
use crate::levitt::{MIN_R_SQUARED, PLATEAU_THRESHOLD};
use crate::report::ScanRankings;

/// Format the run summary (snapshot, window, fit, projection).
pub fn format_run_summary(run: &RunOutput, config: &AnalysisConfig) -> String {
    let mut out = String::new();
    let fit = &run.fit;

    out.push_str("=== levitt - Levitt's Measure H(t) ===\n");
    out.push_str(&format!(
        "Region: {} ({})\n",
        run.series.region().label(),
        run.series.region().kind().display_name()
    ));
    out.push_str(&format!(
        "Snapshot: {} @ {}\n",
        run.origin,
        run.fetched_at.format("%Y-%m-%d %H:%M")
    ));
    if let (Some(first), Some(last)) = (run.series.first_date(), run.series.last_date()) {
        out.push_str(&format!("Series: n={} | {first}..{last}\n", run.series.len()));
    }
    out.push_str(&format!(
        "Window: after {} | days={} | defined H(t)={}\n",
        config.start_date, fit.observed_days, fit.n_pairs
    ));

    out.push_str(&format!(
        "\nFit: H = {:.6} * day + {:.6} | R² = {}\n",
        fit.slope,
        fit.intercept,
        fmt_r_squared(fit.r_squared)
    ));

    if fit.extrapolate {
        let day = fit.crossing_day.unwrap_or_default();
        match fit.crossing_date() {
            Some(date) => out.push_str(&format!(
                "Plateau (H = {PLATEAU_THRESHOLD}): day {day:.1} -> {date} ({} projected day(s))\n",
                fit.projected_days()
            )),
            None => out.push_str(&format!(
                "Plateau (H = {PLATEAU_THRESHOLD}): day {day:.1}, trend already at the threshold\n"
            )),
        }
        if fit.truncated {
            out.push_str("  (projection cut at the horizon limit; the crossing lies further out)\n");
        }
    } else {
        out.push_str(&format!("Plateau: not projected ({})\n", gate_reason(fit)));
    }
    out.push('\n');

    out
}

/// Why the extrapolation gate stayed closed.
pub fn gate_reason(fit: &FitResult) -> String {
    match fit.crossing_day {
        None => "flat trend line".to_string(),
        Some(day) if day < 0.0 => format!("trend already below H = {PLATEAU_THRESHOLD} or rising (day {day:.1})"),
        Some(_) if fit.r_squared.is_nan() => "too few points to judge fit quality".to_string(),
        Some(_) => format!(
            "R² = {} does not exceed {MIN_R_SQUARED}",
            fmt_r_squared(fit.r_squared)
        ),
    }
}

/// Table of the most recent days: new cases, active cases, cumulative.
pub fn format_recent_days(series: &CanonicalSeries, rows: usize) -> String {
    let mut out = String::new();
    out.push_str("Recent days:\n");
    out.push_str(&format!(
        "{:<10} {:>10} {:>10} {:>12}\n",
        "date", "new", "active", "cumulative"
    ));
    out.push_str(&format!("{:-<10} {:-<10} {:-<10} {:-<12}\n", "", "", "", ""));

    let records = series.records();
    let skip = records.len().saturating_sub(rows);
    for r in &records[skip..] {
        out.push_str(&format!(
            "{:<10} {:>10} {:>10} {:>12}\n",
            r.date, r.daily_new, r.active, r.cumulative_confirmed
        ));
    }
    out
}

/// Table of H(t) against the fitted line for the last `rows` days of the window.
pub fn format_measures(fit: &FitResult, rows: usize) -> String {
    let mut out = String::new();
    out.push_str("Levitt's measure:\n");
    out.push_str(&format!("{:<10} {:>5} {:>10} {:>10}\n", "date", "day", "H(t)", "fitted"));
    out.push_str(&format!("{:-<10} {:-<5} {:-<10} {:-<10}\n", "", "", "", ""));

    let skip = fit.measures.len().saturating_sub(rows);
    for p in &fit.measures[skip..] {
        let measure = p.measure.map(|m| format!("{m:.4}")).unwrap_or_else(|| "-".to_string());
        out.push_str(&format!(
            "{:<10} {:>5} {:>10} {:>10.4}\n",
            p.date,
            p.day_index,
            measure,
            fit.predict(p.day_index as f64)
        ));
    }
    out
}

/// Format scan results (top-N ranked rows, then failures).
pub fn format_scan(rankings: &ScanRankings, top_n: usize) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<28} {:>10} {:>6} {:>10} {:>8}\n",
            "region", "plateau", "R²", "slope", "H(t)"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(format!("{:-<28} {:-<10} {:-<6} {:-<10} {:-<8}\n", "", "", "", "", "").trim_end());
    out.push('\n');

    for row in rankings.ranked.iter().take(top_n) {
        let plateau = row
            .crossing_date()
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string());
        let latest = row
            .latest_measure()
            .map(|m| format!("{m:.4}"))
            .unwrap_or_else(|| "-".to_string());
        out.push_str(
            format!(
                "{:<28} {:>10} {:>6} {:>10.6} {:>8}\n",
                truncate(&row.label, 28),
                plateau,
                fmt_r_squared(row.fit.r_squared),
                row.fit.slope,
                latest
            )
            .trim_end(),
        );
        out.push('\n');
    }

    if !rankings.failures.is_empty() {
        out.push_str(&format!("\nSkipped {} region(s):\n", rankings.failures.len()));
        for (label, reason) in &rankings.failures {
            out.push_str(&format!("  {label}: {reason}\n"));
        }
    }

    out
}

/// R² is shown to two decimals, or `n/a` when undefined.
fn fmt_r_squared(v: f64) -> String {
    if v.is_nan() { "n/a".to_string() } else { format!("{v:.2}") }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
