//! Command-line parsing for the Levitt's Measure analyser.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the normalizer/engine code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{ArgAction, Args, Parser, Subcommand};

use crate::domain::RegionKind;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "levitt", version, about = "Levitt's Measure plateau estimates for covid19india feeds")]
pub struct Cli {
    /// Increase log verbosity (`-v` info, `-vv` debug). `RUST_LOG` takes precedence.
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Analyse one region: summary, tables, plot, and optional exports.
    Fit(FitArgs),
    /// Analyse every state (or every district) and rank by projected plateau date.
    Scan(ScanArgs),
    /// Plot a previously exported fit JSON.
    Plot(PlotArgs),
    /// List state codes and names (and optionally district names).
    Regions(RegionsArgs),
    /// Re-run `fit` on an interval against a background-refreshed snapshot.
    Watch(WatchArgs),
}

/// Where the raw feeds are read from and how year-less dates are resolved.
#[derive(Debug, Args, Clone)]
pub struct SourceArgs {
    /// Directory containing data.json, states_daily.json and/or districts.csv.
    ///
    /// Falls back to `LEVITT_DATA_DIR`, then to the network feeds.
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Year assumed for the national feed's year-less dates.
    #[arg(long, default_value_t = 2020)]
    pub national_year: i32,
}

/// Options for analysing a single region.
#[derive(Debug, Args, Clone)]
pub struct FitArgs {
    /// Region kind to analyse.
    #[arg(short = 'r', long, value_enum, default_value_t = RegionKind::National)]
    pub region: RegionKind,

    /// State code or name (with `--region state`).
    #[arg(short = 's', long)]
    pub state: Option<String>,

    /// District name (with `--region district`).
    #[arg(short = 'd', long)]
    pub district: Option<String>,

    /// State name disambiguating `--district`.
    #[arg(long)]
    pub district_state: Option<String>,

    /// Only days strictly after this date are analysed (YYYY-MM-DD).
    ///
    /// Defaults to 40 days before today.
    #[arg(long, value_name = "DATE")]
    pub start_date: Option<NaiveDate>,

    #[command(flatten)]
    pub source: SourceArgs,

    /// Render an ASCII plot in the terminal (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Rows shown in the recent-days and measure tables.
    #[arg(long, default_value_t = 14)]
    pub recent: usize,

    /// Export the series with H(t) and the fitted line to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export the fit (line, gate decision, tail) to JSON.
    #[arg(long = "export-fit")]
    pub export_fit: Option<PathBuf>,
}

/// Options for ranking many regions.
#[derive(Debug, Args, Clone)]
pub struct ScanArgs {
    /// Scan states or districts.
    #[arg(short = 'r', long, value_enum, default_value_t = RegionKind::State)]
    pub region: RegionKind,

    /// Only days strictly after this date are analysed (YYYY-MM-DD).
    #[arg(long, value_name = "DATE")]
    pub start_date: Option<NaiveDate>,

    #[command(flatten)]
    pub source: SourceArgs,

    /// Show the top-N ranked regions.
    #[arg(long, default_value_t = 40)]
    pub top: usize,
}

/// Options for plotting a saved fit.
#[derive(Debug, Args)]
pub struct PlotArgs {
    /// Fit JSON file produced by `levitt fit --export-fit`.
    #[arg(long, value_name = "JSON")]
    pub fit: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

/// Options for listing regions.
#[derive(Debug, Args)]
pub struct RegionsArgs {
    /// Also list district names from the districts feed.
    #[arg(long)]
    pub districts: bool,

    /// Directory containing the feed files (see `fit --data-dir`).
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,
}

/// Options for repeated analysis.
#[derive(Debug, Args)]
pub struct WatchArgs {
    #[command(flatten)]
    pub fit: FitArgs,

    /// Seconds between snapshot refreshes (and reports).
    #[arg(long, default_value_t = 900)]
    pub interval_secs: u64,

    /// Stop after this many reports (runs until interrupted when absent).
    #[arg(long)]
    pub iterations: Option<usize>,
}
