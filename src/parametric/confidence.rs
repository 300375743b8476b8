//! Confidence interval for a sample mean.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::descriptive::mean_var;
use crate::distribution::{norm_inv, Distribution, StudentT};
use crate::error::{check_sample, Result, TestError};

/// Supported confidence levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ConfidenceLevel {
    /// 90 %.
    P90,
    /// 95 %.
    #[default]
    P95,
    /// 98 %.
    P98,
}

impl ConfidenceLevel {
    /// Confidence as a fraction (0.90, 0.95, 0.98).
    pub fn level(self) -> f64 {
        match self {
            Self::P90 => 0.90,
            Self::P95 => 0.95,
            Self::P98 => 0.98,
        }
    }

    /// Upper-tail probability used for the quantile: (1 − level) / 2.
    pub fn one_tailed_alpha(self) -> f64 {
        match self {
            Self::P90 => 0.05,
            Self::P95 => 0.025,
            Self::P98 => 0.01,
        }
    }
}

impl TryFrom<f64> for ConfidenceLevel {
    type Error = TestError;

    fn try_from(level: f64) -> Result<Self> {
        [Self::P90, Self::P95, Self::P98]
            .into_iter()
            .find(|l| (l.level() - level).abs() < 1e-9)
            .ok_or_else(|| {
                TestError::invalid_parameter(
                    "level",
                    format!("confidence level must be 0.90, 0.95 or 0.98 (got {level})"),
                )
            })
    }
}

/// Two-sided confidence interval around the sample mean.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ConfidenceInterval {
    /// Sample mean (interval centre).
    pub mean: f64,
    /// Half-width of the interval.
    pub half_width: f64,
    /// `mean − half_width`.
    pub lower: f64,
    /// `mean + half_width`.
    pub upper: f64,
    /// One-tailed α behind the quantile.
    pub alpha: f64,
}

/// Confidence interval for the mean of `sample`.
///
/// # Algorithm
///
/// half-width = q · s / √n, with q the normal quantile Φ⁻¹(1 − α) when
/// n ≥ 30 and the Student-t quantile with n − 1 df otherwise.
///
/// # Examples
///
/// ```
/// use u_hypothesis::parametric::{confidence_interval, ConfidenceLevel};
///
/// let data = [4.8, 5.1, 5.0, 4.9, 5.2, 5.0];
/// let ci = confidence_interval(&data, ConfidenceLevel::P95).unwrap();
/// assert!(ci.lower < 5.0 && ci.upper > 5.0);
/// assert!((ci.mean - ci.lower - ci.half_width).abs() < 1e-12);
/// ```
pub fn confidence_interval(sample: &[f64], level: ConfidenceLevel) -> Result<ConfidenceInterval> {
    check_sample(sample, 2, "confidence interval")?;
    let n = sample.len();
    let (mean, var) = mean_var(sample);
    let alpha = level.one_tailed_alpha();

    let q = if n >= 30 {
        norm_inv(1.0 - alpha)
    } else {
        StudentT::new((n - 1) as f64)?.inverse_cdf(1.0 - alpha)
    };
    let half_width = q * (var / n as f64).sqrt();

    Ok(ConfidenceInterval {
        mean,
        half_width,
        lower: mean - half_width,
        upper: mean + half_width,
        alpha,
    })
}
