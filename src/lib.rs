//! `levitt-curves` library crate.
//!
//! The binary (`levitt`) is a thin wrapper around this library so that:
//!
//! - the normalizer and engine are testable without spawning processes
//! - analyses can be embedded elsewhere (a dashboard, a notebook bridge)
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod levitt;
pub mod math;
pub mod normalize;
pub mod plot;
pub mod report;
