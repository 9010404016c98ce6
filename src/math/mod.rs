//! Mathematical utilities: least squares line fitting and fit quality.

pub mod ols;

pub use ols::*;
