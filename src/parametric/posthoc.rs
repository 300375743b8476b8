//! Post-hoc pairwise comparisons after a significant ANOVA: Scheffé,
//! Tukey HSD, and Tukey for repeated measures.
//!
//! All three use the harmonic mean group size n_h = 2/(1/nᵢ + 1/nⱼ) and
//! Q = |x̄ᵢ − x̄ⱼ| / √(MS_error / n_h), with MS_error taken from the ANOVA.

use crate::config::{check_alpha, Correction};
use crate::distribution::{Distribution, FisherF, StudentizedRange};
use crate::error::{check_groups, Result, TestError};
use crate::posthoc::{harmonic_size, pairs, PostHocComparison, StatisticLabel};

use super::anova::{AnovaResult, RmAnovaResult};

/// Error term of a prior ANOVA that post-hoc tests build on.
trait ErrorTerm {
    fn ms_error(&self) -> f64;
    fn df_error(&self) -> f64;
    fn group_count(&self) -> usize;
}

impl ErrorTerm for AnovaResult {
    fn ms_error(&self) -> f64 {
        self.ms_within
    }
    fn df_error(&self) -> f64 {
        self.df_within
    }
    fn group_count(&self) -> usize {
        self.group_means.len()
    }
}

impl ErrorTerm for RmAnovaResult {
    fn ms_error(&self) -> f64 {
        self.ms_error
    }
    fn df_error(&self) -> f64 {
        self.df_error
    }
    fn group_count(&self) -> usize {
        self.group_means.len()
    }
}

fn check_inputs<E: ErrorTerm>(groups: &[&[f64]], anova: &E, alpha: f64) -> Result<()> {
    check_alpha(alpha)?;
    check_groups(groups, 3, 2)?;
    if anova.group_count() != groups.len() {
        return Err(TestError::invalid_parameter(
            "anova",
            format!(
                "result covers {} groups but {} were given",
                anova.group_count(),
                groups.len()
            ),
        ));
    }
    Ok(())
}

fn group_mean(g: &[f64]) -> f64 {
    g.iter().sum::<f64>() / g.len() as f64
}

/// Q = |Δ| / √(MS/n_h); a zero error term gives 0 for equal means, ∞ otherwise.
fn q_statistic(a: &[f64], b: &[f64], ms_error: f64) -> f64 {
    let diff = (group_mean(a) - group_mean(b)).abs();
    let se = (ms_error / harmonic_size(a.len(), b.len())).sqrt();
    if se > 1e-300 {
        diff / se
    } else if diff == 0.0 {
        0.0
    } else {
        f64::INFINITY
    }
}

fn tukey_rows<E: ErrorTerm>(
    groups: &[&[f64]],
    anova: &E,
    alpha: f64,
    correction: Correction,
) -> Result<Vec<PostHocComparison>> {
    check_inputs(groups, anova, alpha)?;
    let k = groups.len();
    let alpha = correction.apply(alpha, k);
    let dist = StudentizedRange::new(k as f64, anova.df_error())?;
    let critical = dist.inverse_cdf(1.0 - alpha);
    tracing::debug!(k, alpha, critical, "tukey post-hoc");

    Ok(pairs(k)
        .map(|(i, j)| {
            let q = q_statistic(groups[i], groups[j], anova.ms_error());
            let p_value = (1.0 - dist.cdf(q)).clamp(0.0, 1.0);
            tracing::trace!(i, j, q, p_value, "tukey pair");
            PostHocComparison {
                group_a: i,
                group_b: j,
                p_value,
                alpha,
                statistic: q,
                critical,
                label: StatisticLabel::Q,
            }
        })
        .collect())
}

/// Scheffé's method for all pairs after a one-way ANOVA.
///
/// # Algorithm
///
/// F = (Q/√2)² / df₁ compared with F(df₁, df₂), where df₁ and df₂ are the
/// between- and within-group degrees of freedom of the ANOVA.
///
/// # References
///
/// Scheffé (1953). "A method for judging all contrasts in the analysis of
/// variance". Biometrika, 40, 87–104.
///
/// # Examples
///
/// ```
/// use u_hypothesis::config::Correction;
/// use u_hypothesis::parametric::{one_way_anova, scheffe_posttest};
///
/// let g1 = [2.0, 3.0, 4.0, 3.5, 2.5];
/// let g2 = [2.2, 3.1, 3.9, 3.4, 2.6];
/// let g3 = [10.0, 11.0, 12.0, 11.5, 10.5];
/// let groups: [&[f64]; 3] = [&g1, &g2, &g3];
/// let anova = one_way_anova(&groups, 0.05).unwrap();
/// let rows = scheffe_posttest(&groups, &anova, 0.05, Correction::None).unwrap();
/// assert_eq!(rows.len(), 3);
/// assert!(!rows[0].significant()); // g1 vs g2
/// assert!(rows[1].significant()); // g1 vs g3
/// ```
pub fn scheffe_posttest(
    groups: &[&[f64]],
    anova: &AnovaResult,
    alpha: f64,
    correction: Correction,
) -> Result<Vec<PostHocComparison>> {
    check_inputs(groups, anova, alpha)?;
    let k = groups.len();
    let alpha = correction.apply(alpha, k);
    let df1 = anova.df_between;
    let dist = FisherF::new(df1, anova.df_within)?;
    let critical = dist.inverse_cdf(1.0 - alpha);
    tracing::debug!(k, alpha, critical, "scheffe post-hoc");

    Ok(pairs(k)
        .map(|(i, j)| {
            let q = q_statistic(groups[i], groups[j], anova.ms_within);
            let f = (q / std::f64::consts::SQRT_2).powi(2) / df1;
            let p_value = if f.is_infinite() {
                0.0
            } else {
                dist.sf(f).clamp(0.0, 1.0)
            };
            tracing::trace!(i, j, f, p_value, "scheffe pair");
            PostHocComparison {
                group_a: i,
                group_b: j,
                p_value,
                alpha,
                statistic: f,
                critical,
                label: StatisticLabel::F,
            }
        })
        .collect())
}

/// Tukey's honestly significant difference after a one-way ANOVA.
///
/// Q is compared with the studentized range distribution for k means and
/// the ANOVA's within-group degrees of freedom.
///
/// # References
///
/// Tukey (1949). "Comparing individual means in the analysis of variance".
/// Biometrics, 5(2), 99–114.
pub fn tukey_posttest(
    groups: &[&[f64]],
    anova: &AnovaResult,
    alpha: f64,
    correction: Correction,
) -> Result<Vec<PostHocComparison>> {
    tukey_rows(groups, anova, alpha, correction)
}

/// Tukey's HSD after a repeated-measures ANOVA, using MS_error and the
/// error degrees of freedom.
pub fn tukey_rm_posttest(
    groups: &[&[f64]],
    anova: &RmAnovaResult,
    alpha: f64,
    correction: Correction,
) -> Result<Vec<PostHocComparison>> {
    tukey_rows(groups, anova, alpha, correction)
}
