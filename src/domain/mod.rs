//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - region selection (`RegionKind`, `Region`)
//! - the canonical daily series (`DailyRecord`, `CanonicalSeries`)
//! - fit outputs (`LevittPoint`, `TailPoint`, `FitResult`, `FitFile`)
//! - run configuration (`AnalysisConfig`)

pub mod types;

pub use types::*;
