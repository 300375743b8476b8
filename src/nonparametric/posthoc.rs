//! Rank-based post-hoc comparisons: Dunn's test and pairwise Wilcoxon
//! tests after Kruskal-Wallis or Friedman.

use crate::config::{check_alpha, Alternative, Correction};
use crate::distribution::{norm_cdf, norm_inv, tail_p_value, Normal};
use crate::error::{check_equal_sizes, check_groups, Result};
use crate::posthoc::{pairs, PostHocComparison, StatisticLabel};
use crate::ranking::{rank_independent, rank_signed, rank_sums, tie_run_lengths, SignedRankSums};

use super::wilcoxon::{rank_sum_core, signed_rank_w};

fn z_row(i: usize, j: usize, p_value: f64, alpha: f64, z: f64, critical: f64) -> PostHocComparison {
    tracing::trace!(i, j, z, p_value, "rank post-hoc pair");
    PostHocComparison {
        group_a: i,
        group_b: j,
        p_value,
        alpha,
        statistic: z,
        critical,
        label: StatisticLabel::Z,
    }
}

/// Dunn's test of all pairs after a Kruskal-Wallis test.
///
/// # Algorithm
///
/// Mean ranks R̄ come from the joint ranking of all groups. For each pair
///
/// ```text
/// Z = |R̄ᵢ − R̄ⱼ| / √(((N(N+1) − T)/12)(1/nᵢ + 1/nⱼ))
/// T = Σ(t³ − t)/(N − 1)     over runs of t tied values
/// P = 2(1 − Φ(Z)),  Z_c = Φ⁻¹(1 − α/2)
/// ```
///
/// # Errors
///
/// `InsufficientGroups` for fewer than 3 groups, `InvalidInput` for an empty
/// or non-finite group, `InvalidParameter` for α outside (0, 1).
///
/// # References
///
/// Dunn (1964). "Multiple comparisons using rank sums". Technometrics,
/// 6(3), 241–252.
///
/// # Examples
///
/// ```
/// use u_hypothesis::config::Correction;
/// use u_hypothesis::nonparametric::dunn_posttest;
///
/// let g1 = [1.0, 2.0, 3.0, 4.0, 5.0];
/// let g2 = [6.0, 7.0, 8.0, 9.0, 10.0];
/// let g3 = [11.0, 12.0, 13.0, 14.0, 15.0];
/// let rows = dunn_posttest(&[&g1, &g2, &g3], 0.05, Correction::None).unwrap();
/// assert!(!rows[0].significant());
/// assert!(rows[1].significant());
/// ```
pub fn dunn_posttest(
    groups: &[&[f64]],
    alpha: f64,
    correction: Correction,
) -> Result<Vec<PostHocComparison>> {
    check_alpha(alpha)?;
    check_groups(groups, 3, 1)?;
    let k = groups.len();
    let alpha = correction.apply(alpha, k);
    let critical = norm_inv(1.0 - alpha / 2.0);

    let entries = rank_independent(groups)?;
    let total = entries.len() as f64;
    let mean_ranks: Vec<f64> = rank_sums(&entries, k)
        .iter()
        .zip(groups)
        .map(|(r, g)| r / g.len() as f64)
        .collect();

    let values: Vec<f64> = entries.iter().map(|e| e.value).collect();
    let ties: f64 = tie_run_lengths(&values)
        .into_iter()
        .filter(|&t| t > 1)
        .map(|t| {
            let t = t as f64;
            t * t * t - t
        })
        .sum::<f64>()
        / (total - 1.0).max(1.0);
    let variance = (total * (total + 1.0) - ties) / 12.0;
    tracing::debug!(k, alpha, ties, "dunn post-hoc");

    Ok(pairs(k)
        .map(|(i, j)| {
            let diff = (mean_ranks[i] - mean_ranks[j]).abs();
            let se = (variance * (1.0 / groups[i].len() as f64 + 1.0 / groups[j].len() as f64)).sqrt();
            let z = if se > 1e-300 {
                diff / se
            } else if diff == 0.0 {
                0.0
            } else {
                f64::INFINITY
            };
            let p_value = (2.0 * (1.0 - norm_cdf(z))).clamp(0.0, 1.0);
            z_row(i, j, p_value, alpha, z, critical)
        })
        .collect())
}

/// Pairwise Wilcoxon rank-sum tests after a Kruskal-Wallis test.
///
/// Each pair is ranked on its own; Z is the standardized rank sum of the
/// smaller sample (see [`super::wilcoxon_rank_sum`]) with a two-sided
/// normal p-value and Z_c = Φ⁻¹(1 − α/2).
///
/// # Errors
///
/// As [`dunn_posttest`].
pub fn wilcoxon_rank_sum_posttest(
    groups: &[&[f64]],
    alpha: f64,
    correction: Correction,
) -> Result<Vec<PostHocComparison>> {
    check_alpha(alpha)?;
    check_groups(groups, 3, 1)?;
    let k = groups.len();
    let alpha = correction.apply(alpha, k);
    let critical = norm_inv(1.0 - alpha / 2.0);
    let normal = Normal::standard();
    tracing::debug!(k, alpha, "wilcoxon rank-sum post-hoc");

    pairs(k)
        .map(|(i, j)| {
            let core = rank_sum_core(groups[i], groups[j])?;
            let p_value = tail_p_value(&normal, core.z, Alternative::TwoSided);
            Ok(z_row(i, j, p_value, alpha, core.z, critical))
        })
        .collect()
}

/// Pairwise Wilcoxon signed-rank tests after a Friedman test.
///
/// For each pair W = min(T⁺, |T⁻|), Z as in [`super::wilcoxon_signed_rank`],
/// Z_c = −Φ⁻¹(1 − α/2) and P = 2Φ(Z). A pair with no nonzero differences
/// reports Z = 0 and P = 1.
///
/// # Errors
///
/// As [`dunn_posttest`], plus `UnequalSampleSizes` when the groups differ in
/// length.
pub fn wilcoxon_signed_rank_posttest(
    groups: &[&[f64]],
    alpha: f64,
    correction: Correction,
) -> Result<Vec<PostHocComparison>> {
    check_alpha(alpha)?;
    check_groups(groups, 3, 1)?;
    check_equal_sizes(groups)?;
    let k = groups.len();
    let alpha = correction.apply(alpha, k);
    let critical = -norm_inv(1.0 - alpha / 2.0);
    tracing::debug!(k, alpha, "wilcoxon signed-rank post-hoc");

    pairs(k)
        .map(|(i, j)| {
            let sums = SignedRankSums::from_entries(&rank_signed(groups[i], groups[j])?);
            let (z, p_value) = if sums.n == 0 {
                (0.0, 1.0)
            } else {
                let (_, z) = signed_rank_w(&sums, Alternative::TwoSided);
                (z, (2.0 * norm_cdf(z)).clamp(0.0, 1.0))
            };
            Ok(z_row(i, j, p_value, alpha, z, critical))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dunn_without_ties() {
        let g1 = [1.0, 2.0, 3.0, 4.0, 5.0];
        let g2 = [6.0, 7.0, 8.0, 9.0, 10.0];
        let g3 = [11.0, 12.0, 13.0, 14.0, 15.0];
        let rows = dunn_posttest(&[&g1, &g2, &g3], 0.05, Correction::None).expect("should compute");
        // variance term 15·16/12 = 20, se = √(20·0.4) = √8
        let se = 8.0_f64.sqrt();
        assert!((rows[0].statistic - 5.0 / se).abs() < 1e-10);
        assert!((rows[1].statistic - 10.0 / se).abs() < 1e-10);
        assert!((rows[1].p_value - 0.000407).abs() < 1e-5, "p = {}", rows[1].p_value);
        assert!((rows[0].critical - 1.959964).abs() < 1e-5);
        assert!(rows.iter().all(|r| r.label == StatisticLabel::Z));
    }

    #[test]
    fn dunn_tie_correction() {
        let g1 = [1.0, 1.0, 2.0];
        let g2 = [2.0, 3.0, 3.0];
        let g3 = [4.0, 4.0, 5.0];
        let rows = dunn_posttest(&[&g1, &g2, &g3], 0.05, Correction::None).expect("should compute");
        // four tie pairs: T = 4·6/8 = 3; mean ranks 13/6 and 8
        let se = ((90.0 - 3.0) / 12.0 * (2.0 / 3.0_f64)).sqrt();
        let expected = (8.0 - 13.0 / 6.0) / se;
        assert!((rows[1].statistic - expected).abs() < 1e-10, "Z = {}", rows[1].statistic);
    }

    #[test]
    fn dunn_bonferroni() {
        let g1 = [1.0, 2.0, 3.0];
        let g2 = [4.0, 5.0, 6.0];
        let g3 = [7.0, 8.0, 9.0];
        let gs: [&[f64]; 3] = [&g1, &g2, &g3];
        let rows = dunn_posttest(&gs, 0.05, Correction::Bonferroni).expect("should compute");
        for r in &rows {
            assert!((r.alpha - 0.05 / 3.0).abs() < 1e-15);
            assert!((r.critical - 2.393980).abs() < 1e-5, "Zc = {}", r.critical);
        }
    }

    #[test]
    fn rank_sum_pairs() {
        let g1 = [1.1, 2.2, 3.3, 4.4];
        let g2 = [5.5, 6.6, 7.7, 8.8, 9.9];
        let g3 = [1.5, 2.5, 3.5, 4.5];
        let rows = wilcoxon_rank_sum_posttest(&[&g1, &g2, &g3], 0.05, Correction::None)
            .expect("should compute");
        assert_eq!(rows.len(), 3);
        assert!((rows[0].statistic + 2.449490).abs() < 1e-5, "Z = {}", rows[0].statistic);
        assert!((rows[0].p_value - 0.014306).abs() < 1e-4);
        assert!(rows[1].p_value > 0.3, "p = {}", rows[1].p_value);
    }

    #[test]
    fn signed_rank_pairs() {
        let g1 = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let g2 = [2.0, 4.0, 6.0, 8.0, 10.0, 12.0, 14.0, 16.0];
        let g3 = g1;
        let rows = wilcoxon_signed_rank_posttest(&[&g1, &g2, &g3], 0.05, Correction::None)
            .expect("should compute");
        // g1 − g2 all negative: W = 0, Z = −18/√51
        assert!((rows[0].statistic + 2.520504).abs() < 1e-5, "Z = {}", rows[0].statistic);
        assert!(rows[0].significant());
        assert!((rows[0].critical + 1.959964).abs() < 1e-5);
        // g1 vs g3 identical
        assert_eq!(rows[1].p_value, 1.0);
        assert_eq!(rows[1].statistic, 0.0);
    }

    #[test]
    fn signed_rank_requires_equal_sizes() {
        let a = [1.0, 2.0, 3.0];
        let b = [1.0, 2.0];
        assert!(wilcoxon_signed_rank_posttest(&[&a, &a, &b], 0.05, Correction::None).is_err());
    }
}
