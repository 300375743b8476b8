//! Pearson product-moment correlation with a t-test on r.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::{check_alpha, Alternative, Significance};
use crate::distribution::{tail_critical, tail_p_value, StudentT};
use crate::error::{check_paired, check_sample, Result, TestError};

/// Result of a correlation test.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CorrelationResult {
    /// Pearson r in [-1, 1].
    pub r: f64,
    /// t = r·√((n−2)/(1−r²)).
    pub t: f64,
    /// Degrees of freedom (n − 2).
    pub df: f64,
    /// Two-tailed p-value.
    pub p_value: f64,
    /// Critical t at 1 − α/2.
    pub critical: f64,
}

impl Significance for CorrelationResult {
    fn p_value(&self) -> f64 {
        self.p_value
    }
}

/// Pearson correlation between paired observations `x` and `y`.
///
/// # Algorithm
///
/// r = (nΣxy − ΣxΣy) / √((nΣx² − (Σx)²)(nΣy² − (Σy)²)), computed from
/// mean-centred values for stability. Significance: t = r·√((n−2)/(1−r²))
/// with n − 2 df, two-sided.
///
/// # Errors
///
/// `SampleSizeMismatch` for different lengths, `InvalidInput` for fewer than
/// 3 pairs or a constant variable.
///
/// # References
///
/// Pearson (1895). "Notes on regression and inheritance in the case of two
/// parents". Proceedings of the Royal Society of London, 58, 240–242.
///
/// # Examples
///
/// ```
/// use u_hypothesis::parametric::pearson_correlation;
///
/// let x = [1.0, 2.0, 3.0, 4.0, 5.0];
/// let y = [2.0, 4.0, 6.0, 8.0, 10.0];
/// let r = pearson_correlation(&x, &y, 0.05).unwrap();
/// assert!((r.r - 1.0).abs() < 1e-10);
/// assert!(r.p_value < 1e-6);
/// ```
pub fn pearson_correlation(x: &[f64], y: &[f64], alpha: f64) -> Result<CorrelationResult> {
    check_alpha(alpha)?;
    check_paired(x, y)?;
    check_sample(x, 3, "x")?;
    check_sample(y, 3, "y")?;

    let n = x.len() as f64;
    let mx = x.iter().sum::<f64>() / n;
    let my = y.iter().sum::<f64>() / n;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (&xi, &yi) in x.iter().zip(y) {
        let dx = xi - mx;
        let dy = yi - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx < 1e-300 || syy < 1e-300 {
        return Err(TestError::invalid_input(
            "correlation is undefined for a constant variable",
        ));
    }
    let r = (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0);

    let df = n - 2.0;
    let denom = 1.0 - r * r;
    let t = if denom > 1e-300 {
        r * (df / denom).sqrt()
    } else {
        f64::INFINITY.copysign(r)
    };

    let dist = StudentT::new(df)?;
    Ok(CorrelationResult {
        r,
        t,
        df,
        p_value: tail_p_value(&dist, t, Alternative::TwoSided),
        critical: tail_critical(&dist, alpha, Alternative::TwoSided),
    })
}
