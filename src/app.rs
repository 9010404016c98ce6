//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and sets up logging
//! - picks a snapshot source (directory or network)
//! - runs normalization + the Levitt engine
//! - prints reports/plots
//! - writes optional exports

use std::thread;
use std::time::Duration;

use chrono::{Days, Local, NaiveDate};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, FitArgs, PlotArgs, RegionsArgs, ScanArgs, WatchArgs};
use crate::data::{SnapshotSource, SnapshotStore, catalog, source_for};
use crate::domain::{AnalysisConfig, Region, RegionKind};
use crate::error::AppError;

pub mod pipeline;

use pipeline::RunOutput;

/// Default analysis window: days strictly after `today - DEFAULT_LOOKBACK_DAYS`.
pub const DEFAULT_LOOKBACK_DAYS: u64 = 40;

/// Start dates on or before this day are rejected (the feeds begin in early 2020).
pub fn earliest_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 3, 1).unwrap_or(NaiveDate::MIN)
}

/// Entry point for the `levitt` binary.
pub fn run() -> Result<(), AppError> {
    // We want `levitt` and `levitt -r state -s mh` to behave like `levitt fit ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);
    init_tracing(cli.verbose);

    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::Scan(args) => handle_scan(args),
        Command::Plot(args) => handle_plot(args),
        Command::Regions(args) => handle_regions(args),
        Command::Watch(args) => handle_watch(args),
    }
}

/// stderr logging; `RUST_LOG` wins over `-v`.
fn init_tracing(verbosity: u8) {
    let default = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let config = config_from_args(&args)?;
    let source = source_for(config.data_dir.clone());
    let snapshot = source.fetch()?;

    let run = pipeline::run_analysis(&snapshot, &config)?;
    print_run(&run, &config);

    // Optional exports.
    if let Some(path) = &config.export_series {
        crate::io::export::write_series_csv(path, &run.series, &run.fit)?;
        info!(path = %path.display(), "wrote series CSV");
    }
    if let Some(path) = &config.export_fit {
        crate::io::fit_file::write_fit_json(path, &config.region, config.start_date, &run.fit)?;
        info!(path = %path.display(), "wrote fit JSON");
    }

    Ok(())
}

fn print_run(run: &RunOutput, config: &AnalysisConfig) {
    println!("{}", crate::report::format_run_summary(run, config));
    println!("{}", crate::report::format_recent_days(&run.series, config.recent_days));
    println!("{}", crate::report::format_measures(&run.fit, config.recent_days));

    if config.plot {
        let plot = crate::plot::render_levitt_plot(&run.fit, config.plot_width, config.plot_height);
        println!("{plot}");
    }
}

fn handle_scan(args: ScanArgs) -> Result<(), AppError> {
    let start_date = resolve_start_date(args.start_date)?;
    let source = source_for(args.source.data_dir.clone());
    let snapshot = source.fetch()?;

    let rankings = pipeline::run_scan(&snapshot, args.region, start_date, args.source.national_year)?;
    if rankings.ranked.is_empty() {
        return Err(AppError::new(
            3,
            format!("No {} could be analysed after {start_date}.", args.region.display_name().to_lowercase()),
        ));
    }

    println!(
        "Scan: {} region(s) after {start_date} | {} @ {}\n",
        rankings.ranked.len(),
        snapshot.origin,
        snapshot.fetched_at.format("%Y-%m-%d %H:%M")
    );
    println!("{}", crate::report::format_scan(&rankings, args.top));
    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let file = crate::io::fit_file::read_fit_json(&args.fit)?;

    println!(
        "{} | after {} | generated {}",
        file.region_label,
        file.start_date,
        file.generated_at.format("%Y-%m-%d %H:%M")
    );
    let plot = crate::plot::render_levitt_plot(&file.fit, args.width, args.height);
    println!("{plot}");
    Ok(())
}

fn handle_regions(args: RegionsArgs) -> Result<(), AppError> {
    println!("{:<6} {}", "code", "state / UT");
    for (code, name) in catalog::selectable_states() {
        println!("{code:<6} {name}");
    }

    if args.districts {
        let source = source_for(args.data_dir);
        let snapshot = source.fetch()?;
        let entries = catalog::district_entries(&snapshot);
        println!("\n{} district(s):", entries.len());
        for (name, state) in entries {
            println!("  {name} ({state})");
        }
    }
    Ok(())
}

fn handle_watch(args: WatchArgs) -> Result<(), AppError> {
    let config = config_from_args(&args.fit)?;
    let interval = Duration::from_secs(args.interval_secs.max(1));

    let source = source_for(config.data_dir.clone());
    let store = SnapshotStore::load(&*source)?;
    let refresh = store.spawn_refresh(source, interval);

    let mut reports = 0usize;
    loop {
        // One snapshot per report, even if a refresh lands mid-way.
        let snapshot = store.current();
        match pipeline::run_analysis(&snapshot, &config) {
            Ok(run) => print_run(&run, &config),
            Err(err) => warn!(error = %err, generation = store.generation(), "analysis failed"),
        }

        reports += 1;
        if args.iterations.is_some_and(|n| reports >= n) {
            break;
        }
        thread::sleep(interval);
    }

    refresh.stop();
    Ok(())
}

/// Build the single configuration value the pipeline sees.
pub fn config_from_args(args: &FitArgs) -> Result<AnalysisConfig, AppError> {
    Ok(AnalysisConfig {
        region: region_from_args(args)?,
        start_date: resolve_start_date(args.start_date)?,
        national_year: args.source.national_year,
        data_dir: args.source.data_dir.clone(),
        plot: args.plot && !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        recent_days: args.recent,
        export_series: args.export.clone(),
        export_fit: args.export_fit.clone(),
    })
}

fn region_from_args(args: &FitArgs) -> Result<Region, AppError> {
    match args.region {
        RegionKind::National => Ok(Region::National),
        RegionKind::State => {
            let input = args
                .state
                .as_deref()
                .ok_or_else(|| AppError::new(2, "--region state requires --state <CODE|NAME>"))?;
            let code = catalog::resolve_state(input)
                .ok_or_else(|| AppError::new(2, format!("Unknown state '{input}'. See `levitt regions`.")))?;
            Ok(Region::State { code: code.to_string() })
        }
        RegionKind::District => {
            let name = args
                .district
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .ok_or_else(|| AppError::new(2, "--region district requires --district <NAME>"))?;
            Ok(Region::District {
                name: name.to_string(),
                state: args.district_state.clone(),
            })
        }
    }
}

/// Apply the default lookback and reject dates before the feeds begin.
fn resolve_start_date(explicit: Option<NaiveDate>) -> Result<NaiveDate, AppError> {
    let start = match explicit {
        Some(date) => date,
        None => Local::now()
            .date_naive()
            .checked_sub_days(Days::new(DEFAULT_LOOKBACK_DAYS))
            .ok_or_else(|| AppError::new(2, "Could not compute the default start date."))?,
    };

    if start <= earliest_start_date() {
        return Err(AppError::new(
            2,
            format!("Start date {start} is too early; choose a date after {}.", earliest_start_date()),
        ));
    }
    Ok(start)
}

/// Rewrite argv so `levitt` defaults to `levitt fit`.
///
/// Rules:
/// - `levitt`                          -> `levitt fit`
/// - `levitt -r state -s mh ...`       -> `levitt fit -r state -s mh ...`
/// - `levitt --help/--version/-h`      -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("fit".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "fit" | "scan" | "plot" | "regions" | "watch");
    if is_subcommand {
        return argv;
    }

    // Verbosity flags are global; look past them for a subcommand.
    let is_verbosity = arg1 == "--verbose" || (arg1.len() > 1 && arg1.starts_with('-') && arg1[1..].chars().all(|c| c == 'v'));
    if is_verbosity {
        let rest = rewrite_args(std::iter::once(argv[0].clone()).chain(argv[2..].iter().cloned()).collect());
        let mut out = vec![argv[0].clone(), arg1];
        out.extend(rest.into_iter().skip(1));
        return out;
    }

    // If the first token is a flag, treat it as "fit flags".
    if arg1.starts_with('-') {
        argv.insert(1, "fit".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;

    fn args(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    fn fit_args(v: &[&str]) -> FitArgs {
        let cli = Cli::parse_from(rewrite_args(args(v)));
        match cli.command {
            Command::Fit(a) => a,
            other => panic!("expected fit, got {other:?}"),
        }
    }

    #[test]
    fn bare_and_flag_first_invocations_become_fit() {
        assert_eq!(rewrite_args(args(&["levitt"])), args(&["levitt", "fit"]));
        assert_eq!(
            rewrite_args(args(&["levitt", "-r", "state"])),
            args(&["levitt", "fit", "-r", "state"])
        );
        assert_eq!(rewrite_args(args(&["levitt", "scan"])), args(&["levitt", "scan"]));
        assert_eq!(rewrite_args(args(&["levitt", "--help"])), args(&["levitt", "--help"]));
        assert_eq!(rewrite_args(args(&["levitt", "-vv"])), args(&["levitt", "-vv", "fit"]));
        assert_eq!(
            rewrite_args(args(&["levitt", "-v", "scan", "--top", "5"])),
            args(&["levitt", "-v", "scan", "--top", "5"])
        );
    }

    #[test]
    fn config_resolves_state_names_and_plot_flags() {
        let a = fit_args(&["levitt", "-r", "state", "-s", "Kerala", "--start-date", "2020-05-01", "--no-plot"]);
        let config = config_from_args(&a).unwrap();
        assert_eq!(config.region, Region::State { code: "kl".into() });
        assert_eq!(config.start_date, NaiveDate::from_ymd_opt(2020, 5, 1).unwrap());
        assert!(!config.plot);
    }

    #[test]
    fn config_rejects_bad_selectors() {
        let missing = fit_args(&["levitt", "-r", "state"]);
        assert_eq!(config_from_args(&missing).unwrap_err().exit_code(), 2);

        let unknown = fit_args(&["levitt", "-r", "state", "-s", "Atlantis"]);
        assert_eq!(config_from_args(&unknown).unwrap_err().exit_code(), 2);

        let no_district = fit_args(&["levitt", "-r", "district"]);
        assert_eq!(config_from_args(&no_district).unwrap_err().exit_code(), 2);
    }

    #[test]
    fn start_date_guard_and_default() {
        assert_eq!(resolve_start_date(NaiveDate::from_ymd_opt(2020, 3, 1)).unwrap_err().exit_code(), 2);
        assert!(resolve_start_date(NaiveDate::from_ymd_opt(2020, 3, 2)).is_ok());

        let expected = Local::now().date_naive() - Days::new(DEFAULT_LOOKBACK_DAYS);
        assert_eq!(resolve_start_date(None).unwrap(), expected);
    }

    #[test]
    fn district_selector_carries_state() {
        let a = fit_args(&["levitt", "-r", "district", "-d", " Pune ", "--district-state", "Maharashtra"]);
        let config = config_from_args(&a).unwrap();
        assert_eq!(
            config.region,
            Region::District {
                name: "Pune".into(),
                state: Some("Maharashtra".into())
            }
        );
    }
}
