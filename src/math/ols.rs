//! Least squares line fitting.
//!
//! The Levitt engine fits a degree-1 polynomial `y = slope * x + intercept`
//! over a handful of `(day_index, measure)` pairs.
//!
//! Implementation choices:
//! - We build a `[1, x]` design matrix and solve with SVD, which also copes
//!   with the rank-deficient single-point case (minimum-norm solution).
//! - Goodness of fit is the plain coefficient of determination, not clamped.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Fitted line coefficients.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LineFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Fit `y = slope * x + intercept` by ordinary least squares.
///
/// Returns `None` for empty input or when the solver fails.
pub fn fit_line(xs: &[f64], ys: &[f64]) -> Option<LineFit> {
    if xs.is_empty() || xs.len() != ys.len() {
        return None;
    }

    let n = xs.len();
    let mut design = DMatrix::<f64>::zeros(n, 2);
    for (i, &x) in xs.iter().enumerate() {
        design[(i, 0)] = 1.0;
        design[(i, 1)] = x;
    }
    let y = DVector::from_column_slice(ys);

    let beta = solve_least_squares(&design, &y)?;
    Some(LineFit {
        slope: beta[1],
        intercept: beta[0],
    })
}

/// Coefficient of determination `1 - SS_res / SS_tot`.
///
/// - fewer than two observations: NaN (undefined)
/// - zero total variance: `1.0` for a perfect prediction, else `0.0`
pub fn r_squared(ys: &[f64], predicted: &[f64]) -> f64 {
    if ys.len() < 2 || ys.len() != predicted.len() {
        return f64::NAN;
    }

    let n = ys.len() as f64;
    let mean = ys.iter().sum::<f64>() / n;
    let ss_tot: f64 = ys.iter().map(|y| (y - mean).powi(2)).sum();
    let ss_res: f64 = ys
        .iter()
        .zip(predicted)
        .map(|(y, p)| (y - p).powi(2))
        .sum();

    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}
