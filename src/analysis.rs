//! End-to-end analysis workflows.
//!
//! Each workflow runs the main test together with its companions:
//! descriptive summaries, post-hoc comparisons (only when the omnibus test
//! is significant), power analysis, a variance-equality check and a
//! Shapiro-Wilk check per sample. Normality is only checked for samples of
//! at least [`NORMALITY_MIN_N`] values; smaller samples report `None`.
//!
//! # Examples
//!
//! ```
//! use u_hypothesis::analysis::{anova_analysis, AnovaPostHoc};
//! use u_hypothesis::config::Correction;
//!
//! let g1 = [2.0, 3.0, 4.0, 3.5, 2.5];
//! let g2 = [2.2, 3.1, 3.9, 3.4, 2.6];
//! let g3 = [10.0, 11.0, 12.0, 11.5, 10.5];
//! let report = anova_analysis(&[&g1, &g2, &g3], AnovaPostHoc::Tukey, 0.05, Correction::None).unwrap();
//! assert!(report.anova.p_value < 0.05);
//! let rows = report.posthoc.unwrap();
//! assert!(rows[1].significant()); // g1 vs g3
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::{check_alpha, Correction, PowerDesign, Significance, TestOptions};
use crate::descriptive::{summarize, summarize_all, Summary};
use crate::error::Result;
use crate::nonparametric::{
    dunn_posttest, friedman, kruskal_wallis, wilcoxon, wilcoxon_rank_sum_posttest,
    wilcoxon_signed_rank_posttest, wilcoxon_signed_rank_single, FriedmanResult,
    KruskalWallisResult, SignedRankResult, WilcoxonKind, WilcoxonResult,
};
use crate::normality::{shapiro_wilk, ShapiroWilkResult};
use crate::parametric::{
    bartlett_test, f_test, one_sample_t_test, one_way_anova, repeated_measures_anova,
    scheffe_posttest, t_test, tukey_posttest, tukey_rm_posttest, AnovaResult, BartlettResult,
    FTestResult, RmAnovaResult, TTestKind, TTestResult,
};
use crate::posthoc::PostHocComparison;
use crate::power::{power_k_sample, power_one_sample, power_two_sample, PowerReport};

/// Smallest sample checked for normality.
pub const NORMALITY_MIN_N: usize = 10;

fn normality(sample: &[f64], alpha: f64) -> Result<Option<ShapiroWilkResult>> {
    if sample.len() < NORMALITY_MIN_N {
        return Ok(None);
    }
    shapiro_wilk(sample, alpha).map(Some)
}

fn normality_all(groups: &[&[f64]], alpha: f64) -> Result<Vec<Option<ShapiroWilkResult>>> {
    groups.iter().map(|g| normality(g, alpha)).collect()
}

// ---------------------------------------------------------------------------
// One and two samples
// ---------------------------------------------------------------------------

/// Test used by [`two_sample_analysis`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TwoSampleTest {
    /// Student's t-test of the given kind.
    T(TTestKind),
    /// Wilcoxon rank-sum or signed-rank test.
    Wilcoxon(WilcoxonKind),
}

impl TwoSampleTest {
    fn paired(self) -> bool {
        matches!(
            self,
            Self::T(TTestKind::Paired) | Self::Wilcoxon(WilcoxonKind::SignedRank)
        )
    }

    fn parametric(self) -> bool {
        matches!(self, Self::T(_))
    }
}

/// Main-test outcome of [`two_sample_analysis`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TwoSampleOutcome {
    /// t-test result.
    T(TTestResult),
    /// Wilcoxon result.
    Wilcoxon(WilcoxonResult),
}

impl Significance for TwoSampleOutcome {
    fn p_value(&self) -> f64 {
        match self {
            Self::T(r) => r.p_value,
            Self::Wilcoxon(r) => r.p_value(),
        }
    }
}

/// Report of a two-sample comparison.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TwoSampleReport {
    /// Summary of each sample.
    pub summaries: [Summary; 2],
    /// x̄_a − x̄_b.
    pub mean_difference: f64,
    /// Main test.
    pub test: TwoSampleOutcome,
    /// Sample sizes and achieved power; `None` when the means are equal.
    pub power: Option<PowerReport>,
    /// F-test of equal variances, for independent t-tests only.
    pub variance_test: Option<FTestResult>,
    /// Shapiro-Wilk per sample.
    pub normality: [Option<ShapiroWilkResult>; 2],
}

/// Compares two samples with a t-test or a Wilcoxon test.
///
/// Power is computed for the same sides, α and pairing as the test, with
/// the nonparametric inflation for Wilcoxon tests.
///
/// # Errors
///
/// Any error of the underlying tests. Both samples need at least 2 values.
pub fn two_sample_analysis(
    a: &[f64],
    b: &[f64],
    test: TwoSampleTest,
    options: &TestOptions,
) -> Result<TwoSampleReport> {
    options.validate()?;
    let summaries = [summarize(a)?, summarize(b)?];
    let outcome = match test {
        TwoSampleTest::T(kind) => TwoSampleOutcome::T(t_test(a, b, kind, options)?),
        TwoSampleTest::Wilcoxon(kind) => TwoSampleOutcome::Wilcoxon(wilcoxon(a, b, kind, options)?),
    };
    tracing::debug!(?test, p_value = outcome.p_value(), "two-sample analysis");

    let design = PowerDesign {
        sides: options.alternative.sides(),
        alpha: options.alpha,
        paired: test.paired(),
        parametric: test.parametric(),
        ..PowerDesign::default()
    };
    let variance_test = match test {
        TwoSampleTest::T(TTestKind::Pooled | TTestKind::Welch) => Some(f_test(a, b, options.alpha)?),
        _ => None,
    };

    Ok(TwoSampleReport {
        mean_difference: summaries[0].mean - summaries[1].mean,
        summaries,
        test: outcome,
        power: power_two_sample(a, b, &design)?,
        variance_test,
        normality: [normality(a, options.alpha)?, normality(b, options.alpha)?],
    })
}

/// Test used by [`one_sample_analysis`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OneSampleTest {
    /// One-sample t-test.
    T,
    /// Wilcoxon signed-rank test against the target.
    Wilcoxon,
}

/// Main-test outcome of [`one_sample_analysis`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OneSampleOutcome {
    /// t-test result.
    T(TTestResult),
    /// Signed-rank result.
    Wilcoxon(SignedRankResult),
}

impl Significance for OneSampleOutcome {
    fn p_value(&self) -> f64 {
        match self {
            Self::T(r) => r.p_value,
            Self::Wilcoxon(r) => r.p_value,
        }
    }
}

/// Report of a one-sample comparison against a target mean.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OneSampleReport {
    /// Summary of the sample.
    pub summary: Summary,
    /// x̄ − target.
    pub mean_difference: f64,
    /// Main test.
    pub test: OneSampleOutcome,
    /// Sample sizes and achieved power; `None` when x̄ equals the target.
    pub power: Option<PowerReport>,
    /// Shapiro-Wilk of the sample.
    pub normality: Option<ShapiroWilkResult>,
}

/// Compares a sample mean with `target`.
///
/// # Errors
///
/// Any error of the underlying tests. The sample needs at least 2 values.
pub fn one_sample_analysis(
    sample: &[f64],
    target: f64,
    test: OneSampleTest,
    options: &TestOptions,
) -> Result<OneSampleReport> {
    options.validate()?;
    let summary = summarize(sample)?;
    let outcome = match test {
        OneSampleTest::T => OneSampleOutcome::T(one_sample_t_test(sample, target, options)?),
        OneSampleTest::Wilcoxon => {
            OneSampleOutcome::Wilcoxon(wilcoxon_signed_rank_single(sample, target, options)?)
        }
    };
    let design = PowerDesign {
        sides: options.alternative.sides(),
        alpha: options.alpha,
        parametric: test == OneSampleTest::T,
        ..PowerDesign::default()
    };

    Ok(OneSampleReport {
        mean_difference: summary.mean - target,
        summary,
        test: outcome,
        power: power_one_sample(sample, target, &design)?,
        normality: normality(sample, options.alpha)?,
    })
}

// ---------------------------------------------------------------------------
// k samples
// ---------------------------------------------------------------------------

/// Post-hoc method after a one-way ANOVA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AnovaPostHoc {
    /// Scheffé's method.
    Scheffe,
    /// Tukey's HSD.
    #[default]
    Tukey,
}

/// Post-hoc method after a Kruskal-Wallis test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RankPostHoc {
    /// Dunn's test on joint mean ranks.
    #[default]
    Dunn,
    /// Pairwise Wilcoxon rank-sum tests.
    Wilcoxon,
}

/// Report of a one-way ANOVA.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AnovaReport {
    /// Summary of each group.
    pub summaries: Vec<Summary>,
    /// Omnibus test.
    pub anova: AnovaResult,
    /// Pairwise comparisons, present when the ANOVA is significant.
    pub posthoc: Option<Vec<PostHocComparison>>,
    /// Power for the closest pair of means.
    pub power: Option<PowerReport>,
    /// Bartlett's test of equal variances.
    pub variance_test: BartlettResult,
    /// Shapiro-Wilk per group.
    pub normality: Vec<Option<ShapiroWilkResult>>,
}

/// One-way ANOVA with post-hoc, power, Bartlett and normality checks.
pub fn anova_analysis(
    groups: &[&[f64]],
    method: AnovaPostHoc,
    alpha: f64,
    correction: Correction,
) -> Result<AnovaReport> {
    check_alpha(alpha)?;
    let anova = one_way_anova(groups, alpha)?;
    let posthoc = if anova.is_significant(alpha) {
        Some(match method {
            AnovaPostHoc::Scheffe => scheffe_posttest(groups, &anova, alpha, correction)?,
            AnovaPostHoc::Tukey => tukey_posttest(groups, &anova, alpha, correction)?,
        })
    } else {
        None
    };
    tracing::debug!(p_value = anova.p_value, posthoc = posthoc.is_some(), "anova analysis");

    let design = PowerDesign {
        alpha,
        ..PowerDesign::default()
    };
    Ok(AnovaReport {
        summaries: summarize_all(groups)?,
        power: power_k_sample(groups, &design, correction)?,
        variance_test: bartlett_test(groups, alpha)?,
        normality: normality_all(groups, alpha)?,
        anova,
        posthoc,
    })
}

/// Report of a repeated-measures ANOVA.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RmAnovaReport {
    /// Summary of each condition.
    pub summaries: Vec<Summary>,
    /// Omnibus test.
    pub anova: RmAnovaResult,
    /// Tukey comparisons, present when the ANOVA is significant.
    pub posthoc: Option<Vec<PostHocComparison>>,
    /// Shapiro-Wilk per condition.
    pub normality: Vec<Option<ShapiroWilkResult>>,
}

/// Repeated-measures ANOVA with Tukey post-hoc and normality checks.
pub fn rm_anova_analysis(groups: &[&[f64]], alpha: f64, correction: Correction) -> Result<RmAnovaReport> {
    check_alpha(alpha)?;
    let anova = repeated_measures_anova(groups, alpha)?;
    let posthoc = if anova.is_significant(alpha) {
        Some(tukey_rm_posttest(groups, &anova, alpha, correction)?)
    } else {
        None
    };
    Ok(RmAnovaReport {
        summaries: summarize_all(groups)?,
        normality: normality_all(groups, alpha)?,
        anova,
        posthoc,
    })
}

/// Report of a Kruskal-Wallis test.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct KruskalWallisReport {
    /// Summary of each group.
    pub summaries: Vec<Summary>,
    /// Omnibus test.
    pub test: KruskalWallisResult,
    /// Pairwise comparisons, present when the test is significant.
    pub posthoc: Option<Vec<PostHocComparison>>,
    /// Nonparametric power for the closest pair of means.
    pub power: Option<PowerReport>,
    /// Shapiro-Wilk per group.
    pub normality: Vec<Option<ShapiroWilkResult>>,
}

/// Kruskal-Wallis test with post-hoc, power and normality checks.
///
/// Every group needs at least 2 values for the power analysis.
pub fn kruskal_wallis_analysis(
    groups: &[&[f64]],
    method: RankPostHoc,
    alpha: f64,
    correction: Correction,
) -> Result<KruskalWallisReport> {
    check_alpha(alpha)?;
    let test = kruskal_wallis(groups, alpha)?;
    let posthoc = if test.is_significant(alpha) {
        Some(match method {
            RankPostHoc::Dunn => dunn_posttest(groups, alpha, correction)?,
            RankPostHoc::Wilcoxon => wilcoxon_rank_sum_posttest(groups, alpha, correction)?,
        })
    } else {
        None
    };
    let design = PowerDesign {
        alpha,
        parametric: false,
        ..PowerDesign::default()
    };
    Ok(KruskalWallisReport {
        summaries: summarize_all(groups)?,
        power: power_k_sample(groups, &design, correction)?,
        normality: normality_all(groups, alpha)?,
        test,
        posthoc,
    })
}

/// Report of a Friedman test.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FriedmanReport {
    /// Summary of each condition.
    pub summaries: Vec<Summary>,
    /// Omnibus test.
    pub test: FriedmanResult,
    /// Pairwise signed-rank comparisons, present when the test is significant.
    pub posthoc: Option<Vec<PostHocComparison>>,
    /// Shapiro-Wilk per condition.
    pub normality: Vec<Option<ShapiroWilkResult>>,
}

/// Friedman test with signed-rank post-hoc and normality checks.
pub fn friedman_analysis(groups: &[&[f64]], alpha: f64, correction: Correction) -> Result<FriedmanReport> {
    check_alpha(alpha)?;
    let test = friedman(groups, alpha)?;
    let posthoc = if test.is_significant(alpha) {
        Some(wilcoxon_signed_rank_posttest(groups, alpha, correction)?)
    } else {
        None
    };
    Ok(FriedmanReport {
        summaries: summarize_all(groups)?,
        normality: normality_all(groups, alpha)?,
        test,
        posthoc,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Alternative;

    const A: [f64; 10] = [5.1, 4.9, 5.6, 5.8, 6.0, 5.2, 5.5, 5.3, 4.8, 5.7];
    const B: [f64; 10] = [6.2, 6.0, 6.8, 6.9, 7.1, 6.1, 6.6, 6.3, 5.9, 6.7];

    #[test]
    fn welch_report_has_variance_test() {
        let r = two_sample_analysis(&A, &B, TwoSampleTest::T(TTestKind::Welch), &TestOptions::default())
            .expect("should compute");
        assert!(r.test.is_significant(0.05));
        assert!(r.variance_test.is_some());
        assert!(r.power.is_some());
        assert!(r.normality.iter().all(Option::is_some));
        assert!((r.mean_difference - (r.summaries[0].mean - r.summaries[1].mean)).abs() < 1e-12);
    }

    #[test]
    fn paired_and_rank_tests_skip_variance_test() {
        let opts = TestOptions::default();
        for test in [
            TwoSampleTest::T(TTestKind::Paired),
            TwoSampleTest::Wilcoxon(WilcoxonKind::RankSum),
            TwoSampleTest::Wilcoxon(WilcoxonKind::SignedRank),
        ] {
            let r = two_sample_analysis(&A, &B, test, &opts).expect("should compute");
            assert!(r.variance_test.is_none(), "{test:?}");
        }
    }

    #[test]
    fn nonparametric_power_needs_more_samples() {
        let opts = TestOptions::default();
        let t = two_sample_analysis(&A, &B, TwoSampleTest::T(TTestKind::Pooled), &opts)
            .expect("t");
        let w = two_sample_analysis(&A, &B, TwoSampleTest::Wilcoxon(WilcoxonKind::RankSum), &opts)
            .expect("w");
        let (pt, pw) = (t.power.expect("t power"), w.power.expect("w power"));
        assert!(pw.n_at_80 >= pt.n_at_80);
    }

    #[test]
    fn small_samples_skip_normality() {
        let r = two_sample_analysis(
            &A[..6],
            &B[..6],
            TwoSampleTest::T(TTestKind::Pooled),
            &TestOptions::default(),
        )
        .expect("should compute");
        assert_eq!(r.normality, [None, None]);
    }

    #[test]
    fn one_sample_workflow() {
        let opts = TestOptions::default().alternative(Alternative::Greater);
        let r = one_sample_analysis(&A, 5.0, OneSampleTest::T, &opts).expect("should compute");
        assert!((r.mean_difference - (r.summary.mean - 5.0)).abs() < 1e-12);
        assert!(r.test.is_significant(0.05));
        assert!(r.normality.is_some());

        let w = one_sample_analysis(&A, 5.0, OneSampleTest::Wilcoxon, &opts).expect("should compute");
        assert!(matches!(w.test, OneSampleOutcome::Wilcoxon(_)));
    }

    #[test]
    fn anova_posthoc_only_when_significant() {
        let g1 = [2.0, 3.0, 4.0, 3.5, 2.5];
        let g2 = [2.2, 3.1, 3.9, 3.4, 2.6];
        let g3 = [10.0, 11.0, 12.0, 11.5, 10.5];
        let r = anova_analysis(&[&g1, &g2, &g3], AnovaPostHoc::Scheffe, 0.05, Correction::None)
            .expect("should compute");
        assert_eq!(r.posthoc.as_ref().map(Vec::len), Some(3));
        assert_eq!(r.summaries.len(), 3);
        assert!(r.normality.iter().all(Option::is_none));
        assert!(r.power.is_some());

        let r = anova_analysis(&[&g1, &g2, &g1], AnovaPostHoc::Tukey, 0.05, Correction::None)
            .expect("should compute");
        assert!(r.posthoc.is_none());
    }

    #[test]
    fn rm_anova_workflow() {
        let t1 = [45.0, 42.0, 36.0, 39.0, 51.0, 44.0];
        let t2 = [50.0, 42.0, 41.0, 35.0, 55.0, 49.0];
        let t3 = [55.0, 45.0, 43.0, 40.0, 59.0, 56.0];
        let r = rm_anova_analysis(&[&t1, &t2, &t3], 0.05, Correction::Bonferroni).expect("should compute");
        let rows = r.posthoc.expect("significant");
        assert!(rows.iter().all(|c| (c.alpha - 0.05 / 3.0).abs() < 1e-15));
    }

    #[test]
    fn rank_workflows() {
        let g1 = [1.0, 2.0, 3.0, 4.0, 5.0];
        let g2 = [6.0, 7.0, 8.0, 9.0, 10.0];
        let g3 = [11.0, 12.0, 13.0, 14.0, 15.0];
        let gs: [&[f64]; 3] = [&g1, &g2, &g3];

        let kw = kruskal_wallis_analysis(&gs, RankPostHoc::Wilcoxon, 0.05, Correction::None)
            .expect("should compute");
        assert_eq!(kw.posthoc.as_ref().map(Vec::len), Some(3));
        assert!(kw.power.is_some());

        let fr = friedman_analysis(&gs, 0.05, Correction::None).expect("should compute");
        assert!(fr.test.is_significant(0.05));
        assert!(fr.posthoc.is_some());
    }
}
