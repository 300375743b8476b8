//! Probability distributions used by the tests.
//!
//! [`Normal`], [`StudentT`], [`FisherF`] and [`ChiSquare`] wrap the `statrs`
//! implementations. [`StudentizedRange`] is computed natively by Gauss-Legendre
//! quadrature (see [`tukey`]).
//!
//! All types implement [`Distribution`]. `inverse_cdf` returns `NaN` for a
//! probability outside `[0, 1]` instead of panicking.
//!
//! # Examples
//!
//! ```
//! use u_hypothesis::distribution::{Distribution, Normal, StudentT};
//!
//! let z = Normal::standard();
//! assert!((z.inverse_cdf(0.975) - 1.959964).abs() < 1e-5);
//!
//! let t = StudentT::new(10.0).unwrap();
//! assert!((t.inverse_cdf(0.975) - 2.228139).abs() < 1e-5);
//! ```

pub mod tukey;

use statrs::distribution::{self as sd, Continuous, ContinuousCDF};

use crate::config::Alternative;
use crate::error::{Result, TestError};

pub use tukey::StudentizedRange;

/// A continuous univariate distribution.
pub trait Distribution {
    /// Probability density at `x`.
    fn pdf(&self, x: f64) -> f64;

    /// Cumulative probability P(X ≤ x).
    fn cdf(&self, x: f64) -> f64;

    /// Quantile: the `x` with `cdf(x) = p`. `NaN` for `p` outside `[0, 1]`.
    fn inverse_cdf(&self, p: f64) -> f64;

    /// Upper-tail probability P(X > x).
    fn sf(&self, x: f64) -> f64 {
        1.0 - self.cdf(x)
    }
}

fn valid_probability(p: f64) -> bool {
    (0.0..=1.0).contains(&p)
}

fn check_df(name: &'static str, df: f64) -> Result<()> {
    if df.is_finite() && df > 0.0 {
        Ok(())
    } else {
        Err(TestError::invalid_parameter(
            name,
            format!("degrees of freedom must be positive and finite (got {df})"),
        ))
    }
}

// ---------------------------------------------------------------------------
// Normal
// ---------------------------------------------------------------------------

/// Normal distribution N(μ, σ²).
#[derive(Debug, Clone, Copy)]
pub struct Normal {
    inner: sd::Normal,
}

impl Normal {
    /// Standard normal N(0, 1).
    pub fn standard() -> Self {
        Self {
            inner: sd::Normal::standard(),
        }
    }

    /// Normal with the given mean and standard deviation.
    ///
    /// Fails with [`TestError::InvalidParameter`] unless `std_dev > 0`.
    pub fn new(mean: f64, std_dev: f64) -> Result<Self> {
        sd::Normal::new(mean, std_dev)
            .map(|inner| Self { inner })
            .map_err(|e| TestError::invalid_parameter("std_dev", e.to_string()))
    }
}

impl Distribution for Normal {
    fn pdf(&self, x: f64) -> f64 {
        self.inner.pdf(x)
    }

    fn cdf(&self, x: f64) -> f64 {
        self.inner.cdf(x)
    }

    fn inverse_cdf(&self, p: f64) -> f64 {
        if !valid_probability(p) {
            return f64::NAN;
        }
        self.inner.inverse_cdf(p)
    }

    fn sf(&self, x: f64) -> f64 {
        self.inner.sf(x)
    }
}

// ---------------------------------------------------------------------------
// Student's t
// ---------------------------------------------------------------------------

/// Student's t distribution with `df` degrees of freedom.
#[derive(Debug, Clone, Copy)]
pub struct StudentT {
    inner: sd::StudentsT,
    df: f64,
}

impl StudentT {
    /// Fails with [`TestError::InvalidParameter`] unless `df > 0` and finite.
    pub fn new(df: f64) -> Result<Self> {
        check_df("df", df)?;
        sd::StudentsT::new(0.0, 1.0, df)
            .map(|inner| Self { inner, df })
            .map_err(|e| TestError::invalid_parameter("df", e.to_string()))
    }

    /// Degrees of freedom.
    pub fn df(&self) -> f64 {
        self.df
    }
}

impl Distribution for StudentT {
    fn pdf(&self, x: f64) -> f64 {
        self.inner.pdf(x)
    }

    fn cdf(&self, x: f64) -> f64 {
        self.inner.cdf(x)
    }

    fn inverse_cdf(&self, p: f64) -> f64 {
        if !valid_probability(p) {
            return f64::NAN;
        }
        self.inner.inverse_cdf(p)
    }

    fn sf(&self, x: f64) -> f64 {
        self.inner.sf(x)
    }
}

// ---------------------------------------------------------------------------
// Fisher-Snedecor F
// ---------------------------------------------------------------------------

/// F distribution with `(df1, df2)` degrees of freedom.
#[derive(Debug, Clone, Copy)]
pub struct FisherF {
    inner: sd::FisherSnedecor,
}

impl FisherF {
    /// Fails with [`TestError::InvalidParameter`] unless both df are
    /// positive and finite.
    pub fn new(df1: f64, df2: f64) -> Result<Self> {
        check_df("df1", df1)?;
        check_df("df2", df2)?;
        sd::FisherSnedecor::new(df1, df2)
            .map(|inner| Self { inner })
            .map_err(|e| TestError::invalid_parameter("df", e.to_string()))
    }
}

impl Distribution for FisherF {
    fn pdf(&self, x: f64) -> f64 {
        if x < 0.0 {
            return 0.0;
        }
        self.inner.pdf(x)
    }

    fn cdf(&self, x: f64) -> f64 {
        if x <= 0.0 {
            return 0.0;
        }
        self.inner.cdf(x)
    }

    fn inverse_cdf(&self, p: f64) -> f64 {
        if !valid_probability(p) {
            return f64::NAN;
        }
        if p == 1.0 {
            return f64::INFINITY;
        }
        self.inner.inverse_cdf(p)
    }

    fn sf(&self, x: f64) -> f64 {
        if x <= 0.0 {
            return 1.0;
        }
        self.inner.sf(x)
    }
}

// ---------------------------------------------------------------------------
// Chi-square
// ---------------------------------------------------------------------------

/// Chi-square distribution with `df` degrees of freedom.
#[derive(Debug, Clone, Copy)]
pub struct ChiSquare {
    inner: sd::ChiSquared,
}

impl ChiSquare {
    /// Fails with [`TestError::InvalidParameter`] unless `df > 0` and finite.
    pub fn new(df: f64) -> Result<Self> {
        check_df("df", df)?;
        sd::ChiSquared::new(df)
            .map(|inner| Self { inner })
            .map_err(|e| TestError::invalid_parameter("df", e.to_string()))
    }
}

impl Distribution for ChiSquare {
    fn pdf(&self, x: f64) -> f64 {
        if x < 0.0 {
            return 0.0;
        }
        self.inner.pdf(x)
    }

    fn cdf(&self, x: f64) -> f64 {
        if x <= 0.0 {
            return 0.0;
        }
        self.inner.cdf(x)
    }

    fn inverse_cdf(&self, p: f64) -> f64 {
        if !valid_probability(p) {
            return f64::NAN;
        }
        self.inner.inverse_cdf(p)
    }

    fn sf(&self, x: f64) -> f64 {
        if x <= 0.0 {
            return 1.0;
        }
        self.inner.sf(x)
    }
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Φ(z) for the standard normal.
pub(crate) fn norm_cdf(z: f64) -> f64 {
    Normal::standard().cdf(z)
}

/// Φ⁻¹(p) for the standard normal.
pub(crate) fn norm_inv(p: f64) -> f64 {
    Normal::standard().inverse_cdf(p)
}

/// P-value of a statistic under the given alternative, clamped to [0, 1].
///
/// Two-sided tests double the tail on the side the statistic falls.
pub(crate) fn tail_p_value<D: Distribution>(dist: &D, stat: f64, alternative: Alternative) -> f64 {
    let p = match alternative {
        Alternative::TwoSided => {
            if stat <= 0.0 {
                2.0 * dist.cdf(stat)
            } else {
                2.0 * dist.sf(stat)
            }
        }
        Alternative::Less => dist.cdf(stat),
        Alternative::Greater => dist.sf(stat),
    };
    p.clamp(0.0, 1.0)
}

/// Critical value of a statistic under the given alternative.
///
/// Two-sided returns the upper bound `inverse_cdf(1 − α/2)`; left returns
/// `inverse_cdf(α)`; right returns `inverse_cdf(1 − α)`.
pub(crate) fn tail_critical<D: Distribution>(dist: &D, alpha: f64, alternative: Alternative) -> f64 {
    match alternative {
        Alternative::TwoSided => dist.inverse_cdf(1.0 - alpha / 2.0),
        Alternative::Less => dist.inverse_cdf(alpha),
        Alternative::Greater => dist.inverse_cdf(1.0 - alpha),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_quantiles() {
        let z = Normal::standard();
        assert!((z.inverse_cdf(0.95) - 1.644854).abs() < 1e-5);
        assert!((z.inverse_cdf(0.99) - 2.326348).abs() < 1e-5);
        assert!((z.cdf(0.0) - 0.5).abs() < 1e-12);
        assert!((z.pdf(0.0) - 0.398942).abs() < 1e-5);
    }

    #[test]
    fn inverse_cdf_out_of_range_is_nan() {
        assert!(Normal::standard().inverse_cdf(1.5).is_nan());
        let t = StudentT::new(5.0).expect("valid df");
        assert!(t.inverse_cdf(-0.1).is_nan());
        let f = FisherF::new(2.0, 10.0).expect("valid df");
        assert!(f.inverse_cdf(f64::NAN).is_nan());
        let c = ChiSquare::new(3.0).expect("valid df");
        assert!(c.inverse_cdf(2.0).is_nan());
    }

    #[test]
    fn t_quantiles() {
        let t = StudentT::new(5.0).expect("valid df");
        assert!((t.inverse_cdf(0.975) - 2.570582).abs() < 1e-4);
        assert!((t.inverse_cdf(0.025) + 2.570582).abs() < 1e-4);
        assert!((t.cdf(0.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn f_quantile_and_cdf() {
        let f = FisherF::new(2.0, 12.0).expect("valid df");
        let q = f.inverse_cdf(0.95);
        assert!((q - 3.885294).abs() < 1e-3, "F crit = {q}");
        assert!((f.cdf(q) - 0.95).abs() < 1e-6);
        assert_eq!(f.cdf(-1.0), 0.0);
    }

    #[test]
    fn chi_square_quantile() {
        let c = ChiSquare::new(2.0).expect("valid df");
        assert!((c.inverse_cdf(0.95) - 5.991465).abs() < 1e-3);
        // chi-square(2) cdf is 1 - exp(-x/2)
        assert!((c.cdf(3.0) - (1.0 - (-1.5_f64).exp())).abs() < 1e-10);
    }

    #[test]
    fn tail_helpers_follow_alternative() {
        let z = Normal::standard();
        let two = tail_p_value(&z, -1.959964, Alternative::TwoSided);
        assert!((two - 0.05).abs() < 1e-5, "p = {two}");
        let two = tail_p_value(&z, 1.959964, Alternative::TwoSided);
        assert!((two - 0.05).abs() < 1e-5, "p = {two}");
        assert!((tail_p_value(&z, -1.644854, Alternative::Less) - 0.05).abs() < 1e-5);
        assert!((tail_p_value(&z, 1.644854, Alternative::Greater) - 0.05).abs() < 1e-5);
        assert_eq!(tail_p_value(&z, 0.0, Alternative::TwoSided), 1.0);

        assert!((tail_critical(&z, 0.05, Alternative::TwoSided) - 1.959964).abs() < 1e-5);
        assert!((tail_critical(&z, 0.05, Alternative::Less) + 1.644854).abs() < 1e-5);
        assert!((tail_critical(&z, 0.05, Alternative::Greater) - 1.644854).abs() < 1e-5);
    }

    #[test]
    fn invalid_df_rejected() {
        assert!(StudentT::new(0.0).is_err());
        assert!(StudentT::new(f64::NAN).is_err());
        assert!(FisherF::new(1.0, -2.0).is_err());
        assert!(ChiSquare::new(f64::INFINITY).is_err());
        assert!(Normal::new(0.0, 0.0).is_err());
    }
}
