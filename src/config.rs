//! Test options: significance level, alternative hypothesis, multiple
//! comparison correction and power-analysis design.
//!
//! # Examples
//!
//! ```
//! use u_hypothesis::config::{Alternative, Correction, TestOptions};
//!
//! let opts = TestOptions::default();
//! assert_eq!(opts.alpha, 0.05);
//! assert_eq!(opts.alternative, Alternative::TwoSided);
//!
//! // 4 groups → 6 pairwise comparisons
//! let a = Correction::Bonferroni.apply(0.05, 4);
//! assert!((a - 0.05 / 6.0).abs() < 1e-15);
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Result, TestError};

/// Alternative hypothesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Alternative {
    /// H₁: the parameters differ.
    #[default]
    TwoSided,
    /// H₁: the first parameter is smaller (left tail).
    Less,
    /// H₁: the first parameter is greater (right tail).
    Greater,
}

impl Alternative {
    /// Number of tails: 2 for two-sided, 1 otherwise.
    pub fn sides(self) -> u8 {
        match self {
            Self::TwoSided => 2,
            Self::Less | Self::Greater => 1,
        }
    }

    /// Builds an alternative from a `(sides, tail)` pair.
    ///
    /// `sides` must be 1 or 2. For one-sided tests `tail` 1 is the left tail
    /// and anything else the right tail; `tail` is ignored when `sides` is 2.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_hypothesis::config::Alternative;
    ///
    /// assert_eq!(Alternative::from_sides(2, 0).unwrap(), Alternative::TwoSided);
    /// assert_eq!(Alternative::from_sides(1, 1).unwrap(), Alternative::Less);
    /// assert_eq!(Alternative::from_sides(1, 2).unwrap(), Alternative::Greater);
    /// assert!(Alternative::from_sides(3, 1).is_err());
    /// ```
    pub fn from_sides(sides: u8, tail: u8) -> Result<Self> {
        match (sides, tail) {
            (2, _) => Ok(Self::TwoSided),
            (1, 1) => Ok(Self::Less),
            (1, _) => Ok(Self::Greater),
            _ => Err(TestError::invalid_parameter(
                "sides",
                format!("must be 1 or 2 (got {sides})"),
            )),
        }
    }
}

/// Significance level and alternative shared by the two-sample tests.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TestOptions {
    /// Significance level α, in (0, 1).
    pub alpha: f64,
    /// Alternative hypothesis.
    pub alternative: Alternative,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            alpha: 0.05,
            alternative: Alternative::TwoSided,
        }
    }
}

impl TestOptions {
    /// Options with the given α and a two-sided alternative.
    pub fn with_alpha(alpha: f64) -> Self {
        Self {
            alpha,
            ..Self::default()
        }
    }

    /// Replaces the alternative hypothesis.
    pub fn alternative(mut self, alternative: Alternative) -> Self {
        self.alternative = alternative;
        self
    }

    /// Rejects α outside (0, 1).
    pub fn validate(&self) -> Result<()> {
        check_alpha(self.alpha)
    }
}

pub(crate) fn check_alpha(alpha: f64) -> Result<()> {
    if alpha.is_finite() && alpha > 0.0 && alpha < 1.0 {
        Ok(())
    } else {
        Err(TestError::invalid_parameter(
            "alpha",
            format!("must lie in (0, 1) (got {alpha})"),
        ))
    }
}

/// Multiple comparison correction for post-hoc tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Correction {
    /// Every pair is tested at α.
    #[default]
    None,
    /// Every pair is tested at α / m with m = k(k−1)/2.
    Bonferroni,
}

impl Correction {
    /// Per-comparison α for `k` groups.
    pub fn apply(self, alpha: f64, k: usize) -> f64 {
        match self {
            Self::None => alpha,
            Self::Bonferroni => {
                let m = k * k.saturating_sub(1) / 2;
                if m == 0 {
                    alpha
                } else {
                    alpha / m as f64
                }
            }
        }
    }
}

/// Design parameters for sample-size and power computations.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PowerDesign {
    /// 1 or 2 tails.
    pub sides: u8,
    /// Significance level α.
    pub alpha: f64,
    /// Target power (1 − β), in (0, 1).
    pub power: f64,
    /// Paired (dependent) samples.
    pub paired: bool,
    /// Parametric test; `false` inflates sizes by 15 % for rank tests.
    pub parametric: bool,
}

impl Default for PowerDesign {
    fn default() -> Self {
        Self {
            sides: 2,
            alpha: 0.05,
            power: 0.8,
            paired: false,
            parametric: true,
        }
    }
}

impl PowerDesign {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.sides != 1 && self.sides != 2 {
            return Err(TestError::invalid_parameter(
                "sides",
                format!("must be 1 or 2 (got {})", self.sides),
            ));
        }
        check_alpha(self.alpha)?;
        if !(self.power.is_finite() && self.power > 0.0 && self.power < 1.0) {
            return Err(TestError::invalid_parameter(
                "power",
                format!("must lie in (0, 1) (got {})", self.power),
            ));
        }
        Ok(())
    }
}

/// P-value carrying results.
pub trait Significance {
    /// P-value of the test.
    fn p_value(&self) -> f64;

    /// `true` when P ≤ α.
    fn is_significant(&self, alpha: f64) -> bool {
        self.p_value() <= alpha
    }
}
