//! Descriptive statistics and least-squares fitting shared by the analyzers.
//!
//! Every helper returns a finite value: empty inputs give zero, and degenerate regressions
//! give `None`.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

/// Two-sided 95% normal quantile.
pub const Z_95: f64 = 1.96;

const EPS: f64 = 1e-12;

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Unbiased sample variance (n - 1 denominator); zero below two observations.
pub fn sample_variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64
}

pub fn sample_std_dev(values: &[f64]) -> f64 {
    sample_variance(values).sqrt()
}

/// Population standard deviation (n denominator), as used for z-scores.
pub fn population_std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    (values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64).sqrt()
}

/// Median of an already sorted slice.
pub fn median_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

pub fn sort_floats(values: &mut [f64]) {
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
}

/// Ordinary least-squares line `y = intercept + slope * x`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    pub n: usize,
    pub x_mean: f64,
    /// Sum of squared deviations of x from its mean.
    pub sxx: f64,
    /// Residual standard error with n - 2 degrees of freedom (zero when n <= 2).
    pub rmse: f64,
}

impl LinearFit {
    /// Fits the line by solving the normal equations. Returns `None` when fewer than two
    /// points are given, the lengths differ, or every x is identical.
    pub fn fit(xs: &[f64], ys: &[f64]) -> Option<Self> {
        let n = xs.len();
        if n < 2 || ys.len() != n {
            return None;
        }
        let x_mean = mean(xs);
        let sxx: f64 = xs.iter().map(|x| (x - x_mean).powi(2)).sum();
        if sxx < EPS {
            return None;
        }

        let design = DMatrix::from_fn(n, 2, |i, j| if j == 0 { 1.0 } else { xs[i] });
        let rhs = DVector::from_column_slice(ys);
        let normal = design.transpose() * &design;
        let coeffs = normal.lu().solve(&(design.transpose() * rhs))?;
        let intercept = coeffs[0];
        let slope = coeffs[1];
        if !intercept.is_finite() || !slope.is_finite() {
            return None;
        }

        let y_mean = mean(ys);
        let ss_tot: f64 = ys.iter().map(|y| (y - y_mean).powi(2)).sum();
        let ss_res: f64 = xs
            .iter()
            .zip(ys)
            .map(|(x, y)| (y - (intercept + slope * x)).powi(2))
            .sum();
        let r_squared = if ss_tot > EPS {
            (1.0 - ss_res / ss_tot).clamp(0.0, 1.0)
        } else {
            1.0
        };
        let rmse = if n > 2 {
            (ss_res / (n - 2) as f64).sqrt()
        } else {
            0.0
        };

        Some(Self {
            slope,
            intercept,
            r_squared,
            n,
            x_mean,
            sxx,
            rmse,
        })
    }

    /// Fits against the sequence index 0..n-1.
    pub fn fit_index(ys: &[f64]) -> Option<Self> {
        let xs: Vec<f64> = (0..ys.len()).map(|i| i as f64).collect();
        Self::fit(&xs, ys)
    }

    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }

    /// Half-width of the 95% prediction interval at `x`.
    pub fn prediction_margin(&self, x: f64) -> f64 {
        let n = self.n as f64;
        Z_95 * self.rmse * (1.0 + 1.0 / n + (x - self.x_mean).powi(2) / self.sxx).sqrt()
    }
}

/// Pearson correlation coefficient, clamped to [-1, 1]; zero when undefined.
pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len();
    if n < 2 || ys.len() != n {
        return 0.0;
    }
    let x = DVector::from_column_slice(xs).add_scalar(-mean(xs));
    let y = DVector::from_column_slice(ys).add_scalar(-mean(ys));
    let denom = x.norm() * y.norm();
    if denom < EPS {
        return 0.0;
    }
    (x.dot(&y) / denom).clamp(-1.0, 1.0)
}

/// Percent change implied by a fitted index trend over `n` points, relative to the series
/// mean. Zero when the mean is not positive.
pub fn trend_change_percent(fit: &LinearFit, values: &[f64]) -> f64 {
    let base = mean(values);
    if base <= EPS || values.len() < 2 {
        return 0.0;
    }
    fit.slope * (values.len() - 1) as f64 / base * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_statistics_handle_empty_and_small_inputs() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(sample_variance(&[4.0]), 0.0);
        assert_eq!(median_sorted(&[]), 0.0);
        assert_eq!(median_sorted(&[1.0, 3.0]), 2.0);
        assert_eq!(median_sorted(&[1.0, 2.0, 9.0]), 2.0);
        assert!((sample_variance(&[1.0, 2.0, 3.0, 4.0]) - 5.0 / 3.0).abs() < 1e-12);
        assert!((population_std_dev(&[2.0, 4.0]) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn linear_fit_recovers_exact_line() {
        let xs = [0.0, 1.0, 2.0, 3.0];
        let ys = [1.0, 3.0, 5.0, 7.0];
        let fit = LinearFit::fit(&xs, &ys).expect("fit");
        assert!((fit.slope - 2.0).abs() < 1e-9);
        assert!((fit.intercept - 1.0).abs() < 1e-9);
        assert!((fit.r_squared - 1.0).abs() < 1e-9);
        assert!(fit.rmse < 1e-9);
        assert!((fit.predict(10.0) - 21.0).abs() < 1e-9);
    }

    #[test]
    fn linear_fit_rejects_degenerate_x() {
        assert!(LinearFit::fit(&[2.0, 2.0, 2.0], &[1.0, 2.0, 3.0]).is_none());
        assert!(LinearFit::fit(&[1.0], &[1.0]).is_none());
        assert!(LinearFit::fit(&[1.0, 2.0], &[1.0]).is_none());
    }

    #[test]
    fn prediction_margin_grows_away_from_mean() {
        let ys = [1.0, 2.5, 2.0, 4.5, 4.0, 6.5];
        let fit = LinearFit::fit_index(&ys).expect("fit");
        let near = fit.prediction_margin(fit.x_mean);
        let far = fit.prediction_margin(fit.x_mean + 10.0);
        assert!(far > near);
        assert!(near > 0.0);
    }

    #[test]
    fn pearson_is_bounded_and_handles_constants() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        assert!((pearson(&xs, &xs) - 1.0).abs() < 1e-12);
        assert!((pearson(&xs, &[8.0, 6.0, 4.0, 2.0]) + 1.0).abs() < 1e-12);
        assert_eq!(pearson(&xs, &[5.0; 4]), 0.0);
    }
}
