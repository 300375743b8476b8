//! Tests for equality of variances: two-sample F-test and Bartlett's test.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::{check_alpha, Significance};
use crate::descriptive::mean_var;
use crate::distribution::{ChiSquare, Distribution, FisherF};
use crate::error::{check_groups, check_sample, Result};

/// Result of a two-sample F-test.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FTestResult {
    /// F = s²_larger / s²_smaller (≥ 1).
    pub f: f64,
    /// Numerator degrees of freedom.
    pub df_numerator: f64,
    /// Denominator degrees of freedom.
    pub df_denominator: f64,
    /// Two-tailed p-value.
    pub p_value: f64,
    /// Critical F at 1 − α/2.
    pub critical: f64,
    /// `true` when the second sample supplied the numerator.
    pub swapped: bool,
}

impl Significance for FTestResult {
    fn p_value(&self) -> f64 {
        self.p_value
    }
}

/// Two-sample F-test for equal variances.
///
/// # Algorithm
///
/// The sample with the larger variance is always the numerator:
/// F = s²_big / s²_small, df = (n_big − 1, n_small − 1),
/// critical = F⁻¹(1 − α/2), P = 2·(1 − cdf(F)) clamped to [0, 1].
///
/// # Examples
///
/// ```
/// use u_hypothesis::parametric::f_test;
///
/// let a = [1.0, 2.0, 3.0, 4.0, 5.0];
/// let b = [1.0, 5.0, 9.0, 13.0, 17.0];
/// let r = f_test(&a, &b, 0.05).unwrap();
/// assert!(r.swapped);
/// assert!((r.f - 16.0).abs() < 1e-10);
/// assert!(r.p_value < 0.05);
/// ```
pub fn f_test(a: &[f64], b: &[f64], alpha: f64) -> Result<FTestResult> {
    check_alpha(alpha)?;
    check_sample(a, 2, "first sample")?;
    check_sample(b, 2, "second sample")?;

    let (_, v1) = mean_var(a);
    let (_, v2) = mean_var(b);
    let swapped = v2 > v1;
    let (var_big, n_big, var_small, n_small) = if swapped {
        (v2, b.len(), v1, a.len())
    } else {
        (v1, a.len(), v2, b.len())
    };

    let df_numerator = (n_big - 1) as f64;
    let df_denominator = (n_small - 1) as f64;
    let dist = FisherF::new(df_numerator, df_denominator)?;
    let critical = dist.inverse_cdf(1.0 - alpha / 2.0);

    let (f, p_value) = if var_small > 1e-300 {
        let f = var_big / var_small;
        (f, (2.0 * dist.sf(f)).clamp(0.0, 1.0))
    } else if var_big > 1e-300 {
        (f64::INFINITY, 0.0)
    } else {
        // Both samples constant: no evidence of different variances.
        (1.0, 1.0)
    };

    Ok(FTestResult {
        f,
        df_numerator,
        df_denominator,
        p_value,
        critical,
        swapped,
    })
}

/// Result of Bartlett's test.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BartlettResult {
    /// Corrected chi-square statistic.
    pub statistic: f64,
    /// Degrees of freedom (k − 1).
    pub df: f64,
    /// Upper-tail p-value.
    pub p_value: f64,
    /// Critical chi-square at 1 − α.
    pub critical: f64,
}

impl Significance for BartlettResult {
    fn p_value(&self) -> f64 {
        self.p_value
    }
}

/// Bartlett's test for homogeneity of variances across 3 or more groups.
///
/// # Algorithm
///
/// ```text
/// s²_p = Σ(nᵢ−1)s²ᵢ / (N−k)
/// M    = (N−k)·ln s²_p − Σ(nᵢ−1)·ln s²ᵢ
/// C    = 1 + (Σ 1/(nᵢ−1) − 1/(N−k)) / (3(k−1))
/// χ²   = M / C,  df = k − 1
/// ```
///
/// Variances are floored at 1e-300 before taking logarithms.
///
/// # References
///
/// Bartlett (1937). "Properties of sufficiency and statistical tests".
/// Proceedings of the Royal Society A, 160(901), 268–282.
///
/// # Examples
///
/// ```
/// use u_hypothesis::parametric::bartlett_test;
///
/// let g1 = [4.1, 5.2, 3.8, 4.9, 5.0];
/// let g2 = [5.5, 4.3, 4.8, 5.1, 4.6];
/// let g3 = [4.7, 5.3, 4.2, 4.4, 5.6];
/// let r = bartlett_test(&[&g1, &g2, &g3], 0.05).unwrap();
/// assert!(r.p_value > 0.05);
/// ```
pub fn bartlett_test(groups: &[&[f64]], alpha: f64) -> Result<BartlettResult> {
    check_alpha(alpha)?;
    check_groups(groups, 3, 2)?;

    let k = groups.len() as f64;
    let n_total: usize = groups.iter().map(|g| g.len()).sum();
    let df_pooled = n_total as f64 - k;

    let mut pooled = 0.0;
    let mut sum_log = 0.0;
    let mut sum_inv = 0.0;
    for g in groups {
        let (_, var) = mean_var(g);
        let dfi = (g.len() - 1) as f64;
        pooled += dfi * var;
        sum_log += dfi * var.max(1e-300).ln();
        sum_inv += 1.0 / dfi;
    }
    pooled /= df_pooled;

    let m = df_pooled * pooled.max(1e-300).ln() - sum_log;
    let c = 1.0 + (sum_inv - 1.0 / df_pooled) / (3.0 * (k - 1.0));
    let statistic = (m / c).max(0.0);
    let df = k - 1.0;

    let dist = ChiSquare::new(df)?;
    Ok(BartlettResult {
        statistic,
        df,
        p_value: dist.sf(statistic).clamp(0.0, 1.0),
        critical: dist.inverse_cdf(1.0 - alpha),
    })
}
