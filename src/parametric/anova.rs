//! One-way and repeated-measures analysis of variance.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::{check_alpha, Significance};
use crate::descriptive::kahan_sum;
use crate::distribution::{Distribution, FisherF};
use crate::error::{check_equal_sizes, check_groups, Result};

/// Result of a one-way ANOVA.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AnovaResult {
    /// Upper-tail p-value of F.
    pub p_value: f64,
    /// F = MS_between / MS_within.
    pub f: f64,
    /// Critical F at 1 − α.
    pub critical: f64,
    /// Between-group degrees of freedom (k − 1).
    pub df_between: f64,
    /// Within-group degrees of freedom (N − k).
    pub df_within: f64,
    /// Between-group sum of squares.
    pub ss_between: f64,
    /// Within-group sum of squares.
    pub ss_within: f64,
    /// Between-group mean square.
    pub ms_between: f64,
    /// Within-group mean square (error term for post-hoc tests).
    pub ms_within: f64,
    /// Mean of each group.
    pub group_means: Vec<f64>,
    /// Mean of all observations.
    pub grand_mean: f64,
}

impl Significance for AnovaResult {
    fn p_value(&self) -> f64 {
        self.p_value
    }
}

/// Result of a repeated-measures ANOVA.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RmAnovaResult {
    /// Upper-tail p-value of F.
    pub p_value: f64,
    /// F = MS_time / MS_error.
    pub f: f64,
    /// Critical F at 1 − α.
    pub critical: f64,
    /// Condition degrees of freedom (k − 1).
    pub df_time: f64,
    /// Error degrees of freedom ((n − 1)(k − 1)).
    pub df_error: f64,
    /// Between-condition sum of squares.
    pub ss_time: f64,
    /// Between-subject sum of squares.
    pub ss_subjects: f64,
    /// Residual sum of squares (SS_within − SS_subjects).
    pub ss_error: f64,
    /// Within-condition sum of squares.
    pub ss_within: f64,
    /// Condition mean square.
    pub ms_time: f64,
    /// Error mean square (error term for post-hoc tests).
    pub ms_error: f64,
    /// Mean of each condition.
    pub group_means: Vec<f64>,
    /// Mean of all observations.
    pub grand_mean: f64,
}

impl Significance for RmAnovaResult {
    fn p_value(&self) -> f64 {
        self.p_value
    }
}

/// F ratio with 0/0 → 0 and x/0 → ∞.
pub(crate) fn f_ratio(ms_effect: f64, ms_error: f64) -> f64 {
    if ms_error > 1e-300 {
        ms_effect / ms_error
    } else if ms_effect > 1e-300 {
        f64::INFINITY
    } else {
        0.0
    }
}

fn f_upper_tail(dist: &FisherF, f: f64) -> f64 {
    if f.is_infinite() {
        0.0
    } else {
        dist.sf(f).clamp(0.0, 1.0)
    }
}

struct Partition {
    n_total: usize,
    ss_total: f64,
    ss_between: f64,
    group_means: Vec<f64>,
    grand_mean: f64,
}

/// SST = Σx² − (Σx)²/N, SSB = Σ nᵢ(x̄ᵢ − x̄)².
fn partition(groups: &[&[f64]]) -> Partition {
    let mut n_total = 0;
    let mut sum = 0.0;
    let mut sum_sq = 0.0;
    let mut group_means = Vec::with_capacity(groups.len());
    for g in groups {
        let s = kahan_sum(g);
        n_total += g.len();
        sum += s;
        sum_sq += g.iter().map(|x| x * x).sum::<f64>();
        group_means.push(s / g.len() as f64);
    }
    let nf = n_total as f64;
    let grand_mean = sum / nf;
    let ss_total = (sum_sq - sum * sum / nf).max(0.0);
    let ss_between: f64 = groups
        .iter()
        .zip(&group_means)
        .map(|(g, m)| g.len() as f64 * (m - grand_mean).powi(2))
        .sum();
    Partition {
        n_total,
        ss_total,
        ss_between,
        group_means,
        grand_mean,
    }
}

/// One-way ANOVA: H₀: all group means are equal.
///
/// # Algorithm
///
/// SST = Σx² − (Σx)²/N, SSB = Σ nᵢ(x̄ᵢ − x̄)², SSW = SST − SSB.
/// F = (SSB/(k−1)) / (SSW/(N−k)).
///
/// # Errors
///
/// `InsufficientGroups` for fewer than 3 groups; `InvalidInput` for a group
/// with fewer than 2 values or a non-finite value.
///
/// # References
///
/// Fisher (1925). "Statistical Methods for Research Workers".
///
/// # Examples
///
/// ```
/// use u_hypothesis::parametric::one_way_anova;
///
/// let g1 = [2.0, 3.0, 4.0, 3.5, 2.5];
/// let g2 = [6.0, 7.0, 8.0, 7.5, 6.5];
/// let g3 = [10.0, 11.0, 12.0, 11.5, 10.5];
/// let r = one_way_anova(&[&g1, &g2, &g3], 0.05).unwrap();
/// assert!(r.p_value < 0.001);
/// assert!(r.f > r.critical);
/// ```
pub fn one_way_anova(groups: &[&[f64]], alpha: f64) -> Result<AnovaResult> {
    check_alpha(alpha)?;
    check_groups(groups, 3, 2)?;

    let k = groups.len();
    let part = partition(groups);
    let ss_within = (part.ss_total - part.ss_between).max(0.0);

    let df_between = (k - 1) as f64;
    let df_within = (part.n_total - k) as f64;
    let ms_between = part.ss_between / df_between;
    let ms_within = ss_within / df_within;
    let f = f_ratio(ms_between, ms_within);

    let dist = FisherF::new(df_between, df_within)?;
    Ok(AnovaResult {
        p_value: f_upper_tail(&dist, f),
        f,
        critical: dist.inverse_cdf(1.0 - alpha),
        df_between,
        df_within,
        ss_between: part.ss_between,
        ss_within,
        ms_between,
        ms_within,
        group_means: part.group_means,
        grand_mean: part.grand_mean,
    })
}

/// Repeated-measures ANOVA: `groups[j][i]` is subject `i` under condition `j`.
///
/// # Algorithm
///
/// ```text
/// SS_time     = Σⱼ n(x̄ⱼ − x̄)²
/// SS_within   = SST − SS_time
/// SS_subjects = k·Σᵢ(subject meanᵢ − x̄)²
/// SS_error    = SS_within − SS_subjects
/// F = (SS_time/(k−1)) / (SS_error/((n−1)(k−1)))
/// ```
///
/// # Errors
///
/// `InsufficientGroups` for fewer than 3 conditions, `UnequalSampleSizes`
/// when conditions differ in length, `InvalidInput` for fewer than 2 subjects.
///
/// # Examples
///
/// ```
/// use u_hypothesis::parametric::repeated_measures_anova;
///
/// let t1 = [45.0, 42.0, 36.0, 39.0, 51.0, 44.0];
/// let t2 = [50.0, 42.0, 41.0, 35.0, 55.0, 49.0];
/// let t3 = [55.0, 45.0, 43.0, 40.0, 59.0, 56.0];
/// let r = repeated_measures_anova(&[&t1, &t2, &t3], 0.05).unwrap();
/// assert_eq!(r.df_time, 2.0);
/// assert_eq!(r.df_error, 10.0);
/// assert!(r.p_value < 0.05);
/// ```
pub fn repeated_measures_anova(groups: &[&[f64]], alpha: f64) -> Result<RmAnovaResult> {
    check_alpha(alpha)?;
    check_groups(groups, 3, 1)?;
    let n = check_equal_sizes(groups)?;
    check_groups(groups, 3, 2)?;

    let k = groups.len();
    let part = partition(groups);
    let ss_time = part.ss_between;
    let ss_within = (part.ss_total - ss_time).max(0.0);

    let ss_subjects = k as f64
        * (0..n)
            .map(|i| {
                let subject_mean = groups.iter().map(|g| g[i]).sum::<f64>() / k as f64;
                (subject_mean - part.grand_mean).powi(2)
            })
            .sum::<f64>();
    let ss_error = (ss_within - ss_subjects).max(0.0);

    let df_time = (k - 1) as f64;
    let df_error = ((n - 1) * (k - 1)) as f64;
    let ms_time = ss_time / df_time;
    let ms_error = ss_error / df_error;
    let f = f_ratio(ms_time, ms_error);

    let dist = FisherF::new(df_time, df_error)?;
    Ok(RmAnovaResult {
        p_value: f_upper_tail(&dist, f),
        f,
        critical: dist.inverse_cdf(1.0 - alpha),
        df_time,
        df_error,
        ss_time,
        ss_subjects,
        ss_error,
        ss_within,
        ms_time,
        ms_error,
        group_means: part.group_means,
        grand_mean: part.grand_mean,
    })
}
