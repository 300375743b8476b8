//! Student's t-tests: pooled, Welch, paired and single-sample.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::{Alternative, Significance, TestOptions};
use crate::descriptive::mean_var;
use crate::distribution::{tail_critical, tail_p_value, StudentT};
use crate::error::{check_paired, check_sample, Result, TestError};

/// Two-sample t-test variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TTestKind {
    /// Independent samples, equal variances (pooled variance).
    Pooled,
    /// Independent samples, unequal variances (Welch).
    Welch,
    /// Dependent (paired) samples.
    Paired,
}

impl TryFrom<u8> for TTestKind {
    type Error = TestError;

    /// 1 = pooled, 2 = Welch, 3 = paired.
    fn try_from(kind: u8) -> Result<Self> {
        match kind {
            1 => Ok(Self::Pooled),
            2 => Ok(Self::Welch),
            3 => Ok(Self::Paired),
            _ => Err(TestError::invalid_parameter(
                "kind",
                format!("t-test kind must be 1, 2 or 3 (got {kind})"),
            )),
        }
    }
}

/// Result of a t-test.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TTestResult {
    /// t statistic.
    pub statistic: f64,
    /// Degrees of freedom (fractional for Welch).
    pub df: f64,
    /// P-value under the chosen alternative.
    pub p_value: f64,
    /// Critical t at α (upper bound for two-sided tests).
    pub critical: f64,
    /// Observed mean difference (a − b, or sample mean − target).
    pub mean_difference: f64,
    /// Standard error of the difference.
    pub std_error: f64,
    /// Alternative the p-value refers to.
    pub alternative: Alternative,
}

impl Significance for TTestResult {
    fn p_value(&self) -> f64 {
        self.p_value
    }
}

/// t = numerator / se, with a zero standard error mapped to 0 (no
/// difference) or ±∞.
fn t_ratio(numerator: f64, se: f64) -> f64 {
    if se > 1e-300 {
        numerator / se
    } else if numerator == 0.0 {
        0.0
    } else {
        f64::INFINITY.copysign(numerator)
    }
}

fn finish(
    statistic: f64,
    df: f64,
    mean_difference: f64,
    std_error: f64,
    options: &TestOptions,
) -> Result<TTestResult> {
    let dist = StudentT::new(df)?;
    Ok(TTestResult {
        statistic,
        df,
        p_value: tail_p_value(&dist, statistic, options.alternative),
        critical: tail_critical(&dist, options.alpha, options.alternative),
        mean_difference,
        std_error,
        alternative: options.alternative,
    })
}

/// Two-sample t-test of H₀: μ_a − μ_b = 0.
///
/// See [`t_test_with_difference`] for a nonzero hypothesized difference.
///
/// # Examples
///
/// ```
/// use u_hypothesis::config::TestOptions;
/// use u_hypothesis::parametric::{t_test, TTestKind};
///
/// let a = [5.1, 4.9, 5.2, 5.0, 4.8];
/// let b = [7.1, 6.9, 7.2, 7.0, 6.8];
/// let r = t_test(&a, &b, TTestKind::Welch, &TestOptions::default()).unwrap();
/// assert!(r.p_value < 0.01);
/// assert!(r.statistic < 0.0);
/// ```
pub fn t_test(a: &[f64], b: &[f64], kind: TTestKind, options: &TestOptions) -> Result<TTestResult> {
    t_test_with_difference(a, b, kind, 0.0, options)
}

/// Two-sample t-test of H₀: μ_a − μ_b = `difference`.
///
/// # Algorithm
///
/// - Pooled: s²_p = ((n₁−1)s₁² + (n₂−1)s₂²)/(n₁+n₂−2), se = s_p·√(1/n₁ + 1/n₂),
///   df = n₁ + n₂ − 2.
/// - Welch: se = √(s₁²/n₁ + s₂²/n₂), Welch-Satterthwaite df (n₁ + n₂ − 2
///   when both variances are zero).
/// - Paired: differences dᵢ = aᵢ − bᵢ, se = s_d/√n, df = n − 1.
///
/// t = (mean difference − `difference`) / se.
///
/// # Errors
///
/// `InvalidInput` for samples with fewer than 2 values, `SampleSizeMismatch`
/// for paired samples of different lengths, `InvalidParameter` for α outside
/// (0, 1) or a non-finite `difference`.
///
/// # References
///
/// Welch (1947). "The generalization of Student's problem when several
/// different population variances are involved". Biometrika, 34, 28–35.
pub fn t_test_with_difference(
    a: &[f64],
    b: &[f64],
    kind: TTestKind,
    difference: f64,
    options: &TestOptions,
) -> Result<TTestResult> {
    options.validate()?;
    if !difference.is_finite() {
        return Err(TestError::invalid_parameter(
            "difference",
            format!("must be finite (got {difference})"),
        ));
    }
    if kind == TTestKind::Paired {
        check_paired(a, b)?;
    }
    check_sample(a, 2, "first sample")?;
    check_sample(b, 2, "second sample")?;

    match kind {
        TTestKind::Paired => {
            let d: Vec<f64> = a.iter().zip(b).map(|(x, y)| x - y).collect();
            let n = d.len() as f64;
            let (d_mean, d_var) = mean_var(&d);
            let se = (d_var / n).sqrt();
            let t = t_ratio(d_mean - difference, se);
            finish(t, n - 1.0, d_mean, se, options)
        }
        TTestKind::Pooled | TTestKind::Welch => {
            let (m1, v1) = mean_var(a);
            let (m2, v2) = mean_var(b);
            let n1 = a.len() as f64;
            let n2 = b.len() as f64;

            let (se, df) = if kind == TTestKind::Pooled {
                let df = n1 + n2 - 2.0;
                let sp2 = ((n1 - 1.0) * v1 + (n2 - 1.0) * v2) / df;
                ((sp2 * (1.0 / n1 + 1.0 / n2)).sqrt(), df)
            } else {
                let q1 = v1 / n1;
                let q2 = v2 / n2;
                let df = (q1 + q2).powi(2) / (q1 * q1 / (n1 - 1.0) + q2 * q2 / (n2 - 1.0));
                let df = if df.is_finite() { df } else { n1 + n2 - 2.0 };
                ((q1 + q2).sqrt(), df)
            };

            let t = t_ratio(m1 - m2 - difference, se);
            finish(t, df, m1 - m2, se, options)
        }
    }
}

/// One-sample t-test of H₀: μ = `target_mean`.
///
/// t = (x̄ − μ₀) / (s/√n), df = n − 1.
///
/// # Examples
///
/// ```
/// use u_hypothesis::config::TestOptions;
/// use u_hypothesis::parametric::one_sample_t_test;
///
/// let data = [2.0, 4.0, 6.0, 8.0, 10.0];
/// let r = one_sample_t_test(&data, 6.0, &TestOptions::default()).unwrap();
/// assert!(r.p_value > 0.5); // mean is 6.0
/// ```
pub fn one_sample_t_test(
    sample: &[f64],
    target_mean: f64,
    options: &TestOptions,
) -> Result<TTestResult> {
    options.validate()?;
    check_sample(sample, 2, "sample")?;
    if !target_mean.is_finite() {
        return Err(TestError::invalid_parameter(
            "target_mean",
            format!("must be finite (got {target_mean})"),
        ));
    }
    let n = sample.len() as f64;
    let (mean, var) = mean_var(sample);
    let se = (var / n).sqrt();
    let t = t_ratio(mean - target_mean, se);
    finish(t, n - 1.0, mean - target_mean, se, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts() -> TestOptions {
        TestOptions::default()
    }

    // -----------------------------------------------------------------------
    // Two-sample
    // -----------------------------------------------------------------------

    #[test]
    fn pooled_reference_value() {
        // s²_p = 19.4, se = 2.7857, t = -7.4 / se
        let a = [19.0, 22.0, 16.0, 29.0, 24.0];
        let b = [20.0, 11.0, 17.0, 12.0, 13.0];
        let r = t_test(&b, &a, TTestKind::Pooled, &opts()).expect("should compute");
        assert_eq!(r.df, 8.0);
        assert!((r.statistic + 2.6564).abs() < 1e-3, "t = {}", r.statistic);
        assert!(r.p_value < 0.05 && r.p_value > 0.02, "p = {}", r.p_value);
    }

    #[test]
    fn pooled_p_symmetric_in_order() {
        let a = [1.0, 2.0, 3.0, 2.0, 1.5, 2.5];
        let b = [2.0, 3.5, 4.0, 3.0, 2.5];
        let r1 = t_test(&a, &b, TTestKind::Pooled, &opts()).expect("should compute");
        let r2 = t_test(&b, &a, TTestKind::Pooled, &opts()).expect("should compute");
        assert!((r1.p_value - r2.p_value).abs() < 1e-12);
        assert!((r1.statistic + r2.statistic).abs() < 1e-12);
    }

    #[test]
    fn welch_df_between_bounds() {
        let a = [1.0, 2.0, 3.0];
        let b = [4.0, 9.0, 16.0, 25.0, 36.0];
        let r = t_test(&a, &b, TTestKind::Welch, &opts()).expect("should compute");
        assert!(r.df >= 2.0 && r.df <= 6.0, "df = {}", r.df);
        assert!(r.p_value < 0.1);
    }

    #[test]
    fn welch_zero_variance_falls_back() {
        let a = [3.0, 3.0, 3.0];
        let b = [3.0, 3.0, 3.0, 3.0];
        let r = t_test(&a, &b, TTestKind::Welch, &opts()).expect("should compute");
        assert_eq!(r.statistic, 0.0);
        assert_eq!(r.p_value, 1.0);
        assert_eq!(r.df, 5.0);
    }

    #[test]
    fn one_sided_alternatives() {
        let a = [1.0, 2.0, 3.0, 2.0, 1.5, 2.5];
        let b = [10.0, 11.0, 12.0, 10.5, 11.5, 10.5];
        let less = opts().alternative(Alternative::Less);
        let greater = opts().alternative(Alternative::Greater);
        let rl = t_test(&a, &b, TTestKind::Pooled, &less).expect("should compute");
        let rg = t_test(&a, &b, TTestKind::Pooled, &greater).expect("should compute");
        assert!(rl.p_value < 0.001, "p = {}", rl.p_value);
        assert!(rg.p_value > 0.999, "p = {}", rg.p_value);
        assert!(rl.critical < 0.0 && rg.critical > 0.0);
    }

    // -----------------------------------------------------------------------
    // Paired
    // -----------------------------------------------------------------------

    #[test]
    fn paired_identical_samples() {
        let x = [5.0, 6.0, 7.0, 8.0, 9.0];
        let r = t_test(&x, &x, TTestKind::Paired, &opts()).expect("should compute");
        assert_eq!(r.statistic, 0.0);
        assert_eq!(r.p_value, 1.0);
    }

    #[test]
    fn paired_sign_positive_when_first_larger() {
        let before = [6.2, 7.1, 8.3, 9.0, 10.4, 11.1, 12.2, 13.3];
        let after = [5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0];
        let r = t_test(&before, &after, TTestKind::Paired, &opts()).expect("should compute");
        assert!(r.statistic > 0.0);
        assert!(r.p_value < 0.001, "p = {}", r.p_value);
        assert_eq!(r.df, 7.0);
    }

    #[test]
    fn paired_hypothesized_difference() {
        let before = [6.2, 7.1, 8.3, 9.0, 10.4, 11.1, 12.2, 13.3];
        let after = [5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0];
        let r = t_test_with_difference(&before, &after, TTestKind::Paired, 1.2, &opts())
            .expect("should compute");
        assert!(r.p_value > 0.5, "p = {}", r.p_value);
    }

    #[test]
    fn paired_length_mismatch() {
        let err = t_test(&[1.0, 2.0, 3.0], &[1.0, 2.0], TTestKind::Paired, &opts()).unwrap_err();
        assert_eq!(err, TestError::SampleSizeMismatch { left: 3, right: 2 });
    }

    // -----------------------------------------------------------------------
    // Single sample
    // -----------------------------------------------------------------------

    #[test]
    fn one_sample_null_true() {
        let data = [5.0, 5.1, 4.9, 5.0, 5.1, 4.9, 5.0, 5.0];
        let r = one_sample_t_test(&data, 5.0, &opts()).expect("should compute");
        assert!(r.p_value > 0.3, "p = {}", r.p_value);
    }

    #[test]
    fn one_sample_null_false() {
        let data = [5.0, 5.1, 4.9, 5.0, 5.1, 4.9, 5.0, 5.0];
        let r = one_sample_t_test(&data, 10.0, &opts()).expect("should compute");
        assert!(r.p_value < 0.001, "p = {}", r.p_value);
    }

    #[test]
    fn one_sample_constant_sample() {
        let r = one_sample_t_test(&[5.0, 5.0, 5.0], 4.0, &opts()).expect("should compute");
        assert!(r.statistic.is_infinite() && r.statistic > 0.0);
        assert_eq!(r.p_value, 0.0);
    }

    #[test]
    fn edge_cases() {
        assert!(one_sample_t_test(&[1.0], 0.0, &opts()).is_err());
        assert!(one_sample_t_test(&[1.0, f64::NAN, 3.0], 2.0, &opts()).is_err());
        assert!(t_test(&[1.0], &[2.0, 3.0], TTestKind::Pooled, &opts()).is_err());
        assert!(TTestKind::try_from(4).is_err());
        assert_eq!(TTestKind::try_from(3).expect("valid"), TTestKind::Paired);
        let bad = TestOptions::with_alpha(1.5);
        assert!(t_test(&[1.0, 2.0], &[2.0, 3.0], TTestKind::Pooled, &bad).is_err());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn two_sample_p_bounded(
            a in proptest::collection::vec(-1e3_f64..1e3, 2..=20),
            b in proptest::collection::vec(-1e3_f64..1e3, 2..=20),
        ) {
            for kind in [TTestKind::Pooled, TTestKind::Welch] {
                let r = t_test(&a, &b, kind, &TestOptions::default()).unwrap();
                prop_assert!(r.p_value >= 0.0 && r.p_value <= 1.0, "p = {}", r.p_value);
            }
        }

        #[test]
        fn pooled_symmetric(
            a in proptest::collection::vec(-1e3_f64..1e3, 2..=15),
            b in proptest::collection::vec(-1e3_f64..1e3, 2..=15),
        ) {
            let opts = TestOptions::default();
            let r1 = t_test(&a, &b, TTestKind::Pooled, &opts).unwrap();
            let r2 = t_test(&b, &a, TTestKind::Pooled, &opts).unwrap();
            prop_assert!((r1.p_value - r2.p_value).abs() < 1e-9);
        }
    }
}
