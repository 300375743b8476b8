//! Normality diagnostics: the expanded Shapiro-Wilk test with sample
//! skewness and excess kurtosis.
//!
//! # Examples
//!
//! ```
//! use u_hypothesis::normality::shapiro_wilk;
//!
//! let data = [2.1, 3.4, 1.9, 5.6, 4.4, 3.3, 2.8, 4.1, 3.9, 3.0];
//! let r = shapiro_wilk(&data, 0.05).unwrap();
//! assert!(r.w > 0.9);
//! assert!(r.p_value > 0.05); // cannot reject normality
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::{check_alpha, Significance};
use crate::descriptive::sorted_copy;
use crate::distribution::{norm_cdf, norm_inv};
use crate::error::{check_sample, Result};

/// Result of the Shapiro-Wilk test.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ShapiroWilkResult {
    /// Upper-tail p-value of `z`. Small values reject normality.
    pub p_value: f64,
    /// Normalized statistic (ln(1 − W) − μ)/σ.
    pub z: f64,
    /// Critical z at α.
    pub critical: f64,
    /// Sample skewness (adjusted Fisher-Pearson).
    pub skewness: f64,
    /// Sample excess kurtosis.
    pub kurtosis: f64,
    /// The W statistic; values close to 1 suggest normality.
    pub w: f64,
}

impl Significance for ShapiroWilkResult {
    fn p_value(&self) -> f64 {
        self.p_value
    }
}

// Royston polynomial coefficients (AS R94), lowest order first
const SW_C1: [f64; 6] = [0.0, 0.221157, -0.147981, -2.07119, 4.434685, -2.706056];
const SW_C2: [f64; 6] = [0.0, 0.042981, -0.293762, -1.752461, 5.682633, -3.582633];
const SW_MU: [f64; 4] = [-1.5861, -0.31082, -0.083751, 0.0038915];
const SW_LN_SIGMA: [f64; 3] = [-0.4803, -0.082676, 0.0030302];

// Evaluate polynomial: c[0] + c[1]*x + c[2]*x^2 + ... (Horner's method)
fn sw_poly(c: &[f64], x: f64) -> f64 {
    c.iter().rev().fold(0.0, |acc, &ci| acc * x + ci)
}

/// Shapiro-Wilk coefficients aᵢ for a sample of size `n` (n ≥ 4).
fn sw_coefficients(n: usize) -> Vec<f64> {
    let nf = n as f64;
    let m: Vec<f64> = (1..=n)
        .map(|i| norm_inv((i as f64 - 0.375) / (nf + 0.25)))
        .collect();
    let m_sq: f64 = m.iter().map(|v| v * v).sum();
    let rsn = 1.0 / nf.sqrt();

    let an = sw_poly(&SW_C1, rsn) + m[n - 1] / m_sq.sqrt();
    let an1 = sw_poly(&SW_C2, rsn) + m[n - 2] / m_sq.sqrt();
    let eps = (m_sq - 2.0 * m[n - 1].powi(2) - 2.0 * m[n - 2].powi(2))
        / (1.0 - 2.0 * an.powi(2) - 2.0 * an1.powi(2));

    let mut a: Vec<f64> = m.iter().map(|mi| mi / eps.sqrt()).collect();
    a[0] = -an;
    a[1] = -an1;
    a[n - 2] = an1;
    a[n - 1] = an;
    a
}

/// Expanded Shapiro-Wilk test of H₀: the sample is normally distributed.
///
/// # Algorithm
///
/// 1. Sort a copy; mᵢ = Φ⁻¹((i − 0.375)/(n + 0.25)).
/// 2. aₙ and aₙ₋₁ from Royston's polynomials in 1/√n, a₁ = −aₙ,
///    a₂ = −aₙ₋₁, the rest mᵢ/√ε.
/// 3. W = (Σ aᵢx₍ᵢ₎)² / max(Σ(xᵢ − x̄)², 1e−7).
/// 4. z = (ln(1 − W) − μ)/σ with μ and ln σ polynomials in ln n;
///    P = 1 − Φ(z), critical z = −Φ⁻¹(α).
///
/// W ≥ 1 gives P = 1. Skewness and kurtosis are 0 for a constant sample.
///
/// # Errors
///
/// `InvalidInput` for fewer than 4 values or a non-finite value,
/// `InvalidParameter` for α outside (0, 1).
///
/// # References
///
/// - Shapiro & Wilk (1965). "An analysis of variance test for normality".
///   Biometrika, 52(3–4), 591–611.
/// - Royston (1992). "Approximating the Shapiro-Wilk W-test for
///   non-normality". Statistics and Computing, 2, 117–119.
pub fn shapiro_wilk(sample: &[f64], alpha: f64) -> Result<ShapiroWilkResult> {
    check_alpha(alpha)?;
    check_sample(sample, 4, "Shapiro-Wilk sample")?;

    let x = sorted_copy(sample);
    let n = x.len();
    let nf = n as f64;
    let a = sw_coefficients(n);

    let mean = x.iter().sum::<f64>() / nf;
    let numerator: f64 = a.iter().zip(&x).map(|(ai, xi)| ai * xi).sum();
    let (mut m2, mut m3, mut m4) = (0.0, 0.0, 0.0);
    for &xi in &x {
        let d = xi - mean;
        let d2 = d * d;
        m2 += d2;
        m3 += d2 * d;
        m4 += d2 * d2;
    }
    let w = numerator * numerator / m2.max(1e-7);

    let ln_n = nf.ln();
    let mu = sw_poly(&SW_MU, ln_n);
    let sigma = sw_poly(&SW_LN_SIGMA, ln_n).exp();
    let (z, p_value) = if w >= 1.0 {
        (f64::NEG_INFINITY, 1.0)
    } else {
        let z = ((1.0 - w).ln() - mu) / sigma;
        (z, (1.0 - norm_cdf(z)).clamp(0.0, 1.0))
    };

    let s = (m2 / (nf - 1.0)).sqrt();
    let (skewness, kurtosis) = if s > 1e-300 {
        let skew = nf * m3 / ((nf - 1.0) * (nf - 2.0) * s.powi(3));
        let kurt = nf * (nf + 1.0) * m4 / ((nf - 1.0) * (nf - 2.0) * (nf - 3.0) * s.powi(4))
            - 3.0 * (nf - 1.0).powi(2) / ((nf - 2.0) * (nf - 3.0));
        (skew, kurt)
    } else {
        (0.0, 0.0)
    };

    Ok(ShapiroWilkResult {
        p_value,
        z,
        critical: -norm_inv(alpha),
        skewness,
        kurtosis,
        w,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn near_normal_sample() {
        let data = [2.1, 3.4, 1.9, 5.6, 4.4, 3.3, 2.8, 4.1, 3.9, 3.0];
        let r = shapiro_wilk(&data, 0.05).expect("should compute");
        assert!((r.w - 0.971391).abs() < 1e-4, "W = {}", r.w);
        assert!((r.z + 1.646688).abs() < 1e-3, "z = {}", r.z);
        assert!((r.p_value - 0.950189).abs() < 1e-3, "p = {}", r.p_value);
        assert!((r.skewness - 0.472037).abs() < 1e-5, "S = {}", r.skewness);
        assert!((r.kurtosis - 0.273418).abs() < 1e-5, "K = {}", r.kurtosis);
        assert!((r.critical - 1.644854).abs() < 1e-5);
    }

    #[test]
    fn skewed_sample_rejected() {
        let data = [1.0, 1.0, 1.0, 2.0, 2.0, 3.0, 5.0, 9.0, 17.0, 40.0];
        let r = shapiro_wilk(&data, 0.05).expect("should compute");
        assert!((r.w - 0.651818).abs() < 1e-4, "W = {}", r.w);
        assert!(r.p_value < 0.01, "p = {}", r.p_value);
        assert!(r.z > r.critical);
        assert!(r.skewness > 2.0, "S = {}", r.skewness);
    }

    #[test]
    fn symmetric_sample_has_zero_skew() {
        let data = [-1.5, -1.0, -0.5, 0.0, 0.5, 1.0, 1.5];
        let r = shapiro_wilk(&data, 0.05).expect("should compute");
        assert!(r.skewness.abs() < 1e-12);
        assert!((r.kurtosis + 1.2).abs() < 1e-10, "K = {}", r.kurtosis);
        assert!(r.p_value > 0.05);
    }

    #[test]
    fn order_does_not_matter() {
        let a = [3.0, 1.0, 4.0, 1.5, 5.0, 9.0, 2.0, 6.0];
        let mut b = a;
        b.reverse();
        let ra = shapiro_wilk(&a, 0.05).expect("a");
        let rb = shapiro_wilk(&b, 0.05).expect("b");
        assert!((ra.w - rb.w).abs() < 1e-12);
    }

    #[test]
    fn constant_sample_is_finite() {
        let r = shapiro_wilk(&[2.0; 6], 0.05).expect("should compute");
        assert!(r.p_value.is_finite());
        assert_eq!(r.skewness, 0.0);
        assert_eq!(r.kurtosis, 0.0);
    }

    #[test]
    fn too_small_rejected() {
        assert!(shapiro_wilk(&[1.0, 2.0, 3.0], 0.05).is_err());
        assert!(shapiro_wilk(&[1.0, 2.0, 3.0, 4.0], 0.0).is_err());
    }
}
