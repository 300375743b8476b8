//! Simple linear regression (ordinary least squares, one predictor).

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::{check_alpha, Significance};
use crate::distribution::{Distribution, FisherF};
use crate::error::{check_paired, check_sample, Result, TestError};

use super::anova::f_ratio;

/// Result of a simple linear regression y = intercept + slope·x.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RegressionResult {
    /// Intercept (β₀).
    pub intercept: f64,
    /// Slope (β₁).
    pub slope: f64,
    /// Coefficient of determination, SSR/SST.
    pub r_squared: f64,
    /// F = SSR / (SSE/(n−2)).
    pub f: f64,
    /// Upper-tail p-value of F with (1, n−2) df.
    pub p_value: f64,
    /// Critical F at 1 − α.
    pub critical: f64,
    /// Residual degrees of freedom (n − 2).
    pub df_residual: f64,
    /// Total sum of squares Σ(y − ȳ)².
    pub ss_total: f64,
    /// Residual sum of squares.
    pub ss_error: f64,
}

impl Significance for RegressionResult {
    fn p_value(&self) -> f64 {
        self.p_value
    }
}

impl RegressionResult {
    /// Fitted value at `x`.
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }

    /// Fitted values for several `x`.
    pub fn predict_all(&self, xs: &[f64]) -> Vec<f64> {
        xs.iter().map(|&x| self.predict(x)).collect()
    }
}

/// Fits y = a + b·x by least squares and tests the slope with an F-test.
///
/// # Algorithm
///
/// On centred data dx = x − x̄, dy = y − ȳ:
///
/// ```text
/// b   = Σdx·dy / Σdx²
/// a   = ȳ − b·x̄
/// SST = Σdy²
/// SSE = Σ(dy − b·dx)²
/// R²  = 1 − SSE/SST
/// F   = (SST − SSE) / (SSE/(n−2)),  df = (1, n−2)
/// ```
///
/// # Errors
///
/// `SampleSizeMismatch` for different lengths, `InvalidInput` for fewer
/// than 3 points or a constant `x`.
///
/// # Examples
///
/// ```
/// use u_hypothesis::parametric::linear_regression;
///
/// let x = [1.0, 2.0, 3.0, 4.0, 5.0];
/// let y = [3.1, 4.9, 7.2, 8.8, 11.1];
/// let fit = linear_regression(&x, &y, 0.05).unwrap();
/// assert!((fit.slope - 1.99).abs() < 0.01);
/// assert!(fit.r_squared > 0.99);
/// assert!((fit.predict(6.0) - 13.0).abs() < 0.1);
/// ```
pub fn linear_regression(x: &[f64], y: &[f64], alpha: f64) -> Result<RegressionResult> {
    check_alpha(alpha)?;
    check_paired(x, y)?;
    check_sample(x, 3, "x")?;
    check_sample(y, 3, "y")?;

    let n = x.len() as f64;
    let x_mean = x.iter().sum::<f64>() / n;
    let y_mean = y.iter().sum::<f64>() / n;
    let (mut sxx, mut sxy, mut syy) = (0.0, 0.0, 0.0);
    for (&xi, &yi) in x.iter().zip(y) {
        let dx = xi - x_mean;
        let dy = yi - y_mean;
        sxx += dx * dx;
        sxy += dx * dy;
        syy += dy * dy;
    }
    if sxx < 1e-300 {
        return Err(TestError::invalid_input("regression requires a non-constant x"));
    }
    let slope = sxy / sxx;
    let intercept = y_mean - slope * x_mean;

    let ss_error: f64 = x
        .iter()
        .zip(y)
        .map(|(&xi, &yi)| ((yi - y_mean) - slope * (xi - x_mean)).powi(2))
        .sum();
    let ss_total = syy;
    let ss_regression = (ss_total - ss_error).max(0.0);
    let r_squared = if ss_total > 1e-300 {
        1.0 - ss_error / ss_total
    } else {
        1.0
    };

    let df_residual = n - 2.0;
    let f = f_ratio(ss_regression, ss_error / df_residual);
    let dist = FisherF::new(1.0, df_residual)?;
    let p_value = if f.is_infinite() {
        0.0
    } else {
        dist.sf(f).clamp(0.0, 1.0)
    };

    Ok(RegressionResult {
        intercept,
        slope,
        r_squared,
        f,
        p_value,
        critical: dist.inverse_cdf(1.0 - alpha),
        df_residual,
        ss_total,
        ss_error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_line() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [3.0, 5.0, 7.0, 9.0, 11.0];
        let fit = linear_regression(&x, &y, 0.05).expect("should compute");
        assert!((fit.slope - 2.0).abs() < 1e-10);
        assert!((fit.intercept - 1.0).abs() < 1e-10);
        assert!((fit.r_squared - 1.0).abs() < 1e-10);
        assert!(fit.p_value < 1e-6, "p = {}", fit.p_value);
    }

    #[test]
    fn r_squared_matches_residuals() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        let y = [2.3, 2.9, 4.1, 4.4, 5.9, 6.1, 7.4];
        let fit = linear_regression(&x, &y, 0.05).expect("should compute");
        let y_mean = y.iter().sum::<f64>() / y.len() as f64;
        let sse: f64 = x
            .iter()
            .zip(&y)
            .map(|(&xi, &yi)| (yi - fit.predict(xi)).powi(2))
            .sum();
        let sst: f64 = y.iter().map(|&yi| (yi - y_mean).powi(2)).sum();
        assert!((fit.r_squared - (1.0 - sse / sst)).abs() < 1e-9);
        assert!((fit.ss_error - sse).abs() < 1e-9);
    }

    #[test]
    fn large_offsets_keep_precision() {
        let base: [f64; 5] = [3.1, 4.9, 7.2, 8.8, 11.1];
        let x: Vec<f64> = (0..5).map(|i| 1e7 + i as f64).collect();
        let fit = linear_regression(&x, &base, 0.05).expect("offset x should fit");
        assert!((fit.slope - 1.99).abs() < 1e-9, "slope = {}", fit.slope);
        assert!((fit.ss_error - 0.107).abs() < 1e-9 * 0.107, "SSE = {}", fit.ss_error);
        assert!((fit.ss_total - 39.708).abs() < 1e-9 * 39.708, "SST = {}", fit.ss_total);
        let expected_r2 = 1.0 - 0.107 / 39.708;
        assert!((fit.r_squared - expected_r2).abs() < 1e-9, "R² = {}", fit.r_squared);

        let x: Vec<f64> = (0..5).map(|i| 1e5 + i as f64).collect();
        let y: Vec<f64> = base.iter().map(|v| v + 1e6).collect();
        let fit = linear_regression(&x, &y, 0.05).expect("offset x and y should fit");
        assert!((fit.slope - 1.99).abs() < 1e-9, "slope = {}", fit.slope);
        assert!((fit.r_squared - expected_r2).abs() < 1e-9, "R² = {}", fit.r_squared);
        let sse: f64 = x
            .iter()
            .zip(&y)
            .map(|(&xi, &yi)| (yi - fit.predict(xi)).powi(2))
            .sum();
        assert!((fit.ss_error - sse).abs() < 1e-6 * sse, "SSE = {} vs {sse}", fit.ss_error);
    }

    #[test]
    fn no_relationship() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let y = [5.0, 3.0, 6.0, 2.0, 5.0, 3.0];
        let fit = linear_regression(&x, &y, 0.05).expect("should compute");
        assert!(fit.p_value > 0.3, "p = {}", fit.p_value);
        assert!(fit.f < fit.critical);
    }

    #[test]
    fn constant_x_rejected() {
        assert!(matches!(
            linear_regression(&[2.0, 2.0, 2.0], &[1.0, 2.0, 3.0], 0.05),
            Err(TestError::InvalidInput(_))
        ));
    }

    #[test]
    fn predict_all_maps_inputs() {
        let x = [0.0, 1.0, 2.0];
        let y = [1.0, 3.0, 5.0];
        let fit = linear_regression(&x, &y, 0.05).expect("should compute");
        let p = fit.predict_all(&[10.0, -1.0]);
        assert!((p[0] - 21.0).abs() < 1e-9);
        assert!((p[1] + 1.0).abs() < 1e-9);
    }
}
