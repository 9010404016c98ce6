//! Levitt's measure: daily growth ratio, trend fit and plateau projection.

pub mod engine;

pub use engine::*;
