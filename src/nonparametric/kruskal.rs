//! Kruskal-Wallis H test for k independent samples.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::{check_alpha, Significance};
use crate::distribution::{ChiSquare, Distribution};
use crate::error::{check_groups, Result};
use crate::ranking::{rank_independent, rank_sums};

/// Result of a Kruskal-Wallis test.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct KruskalWallisResult {
    /// Upper-tail chi-square p-value.
    pub p_value: f64,
    /// H statistic.
    pub h: f64,
    /// Critical chi-square at 1 − α.
    pub critical: f64,
    /// Degrees of freedom (k − 1).
    pub df: f64,
    /// Mean joint rank of each group.
    pub mean_ranks: Vec<f64>,
}

impl Significance for KruskalWallisResult {
    fn p_value(&self) -> f64 {
        self.p_value
    }
}

/// Kruskal-Wallis one-way analysis of variance on ranks.
///
/// # Algorithm
///
/// All N observations are ranked jointly; with Rᵢ the rank sum of group i,
///
/// ```text
/// H = 12/(N(N+1)) · Σ Rᵢ²/nᵢ − 3(N+1)
/// ```
///
/// compared with chi-square on k − 1 degrees of freedom. No tie correction
/// is applied.
///
/// # Errors
///
/// `InsufficientGroups` for fewer than 3 groups, `InvalidInput` for an empty
/// or non-finite group, `InvalidParameter` for α outside (0, 1).
///
/// # References
///
/// Kruskal & Wallis (1952). "Use of ranks in one-criterion variance
/// analysis". JASA, 47(260), 583–621.
///
/// # Examples
///
/// ```
/// use u_hypothesis::nonparametric::kruskal_wallis;
///
/// let g1 = [1.0, 2.0, 3.0, 4.0, 5.0];
/// let g2 = [6.0, 7.0, 8.0, 9.0, 10.0];
/// let g3 = [11.0, 12.0, 13.0, 14.0, 15.0];
/// let r = kruskal_wallis(&[&g1, &g2, &g3], 0.05).unwrap();
/// assert!((r.h - 12.5).abs() < 1e-10);
/// assert!(r.p_value < 0.01);
/// ```
pub fn kruskal_wallis(groups: &[&[f64]], alpha: f64) -> Result<KruskalWallisResult> {
    check_alpha(alpha)?;
    check_groups(groups, 3, 1)?;

    let k = groups.len();
    let entries = rank_independent(groups)?;
    let total = entries.len() as f64;
    let sums = rank_sums(&entries, k);

    let weighted: f64 = sums
        .iter()
        .zip(groups)
        .map(|(r, g)| r * r / g.len() as f64)
        .sum();
    let h = 12.0 / (total * (total + 1.0)) * weighted - 3.0 * (total + 1.0);

    let df = (k - 1) as f64;
    let dist = ChiSquare::new(df)?;
    tracing::debug!(k, n = entries.len(), h, "kruskal-wallis");

    Ok(KruskalWallisResult {
        p_value: dist.sf(h).clamp(0.0, 1.0),
        h,
        critical: dist.inverse_cdf(1.0 - alpha),
        df,
        mean_ranks: sums
            .iter()
            .zip(groups)
            .map(|(r, g)| r / g.len() as f64)
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TestError;

    #[test]
    fn separated_groups() {
        let g1 = [1.0, 2.0, 3.0, 4.0, 5.0];
        let g2 = [6.0, 7.0, 8.0, 9.0, 10.0];
        let g3 = [11.0, 12.0, 13.0, 14.0, 15.0];
        let r = kruskal_wallis(&[&g1, &g2, &g3], 0.05).expect("should compute");
        assert!((r.h - 12.5).abs() < 1e-10, "H = {}", r.h);
        assert_eq!(r.df, 2.0);
        // chi-square(2) upper tail is exp(−x/2)
        assert!((r.p_value - (-6.25_f64).exp()).abs() < 1e-8, "p = {}", r.p_value);
        assert!((r.critical - 5.991465).abs() < 1e-5, "Hc = {}", r.critical);
        assert_eq!(r.mean_ranks, vec![3.0, 8.0, 13.0]);
    }

    #[test]
    fn interleaved_groups_not_significant() {
        let g1 = [1.0, 4.0, 7.0, 10.0];
        let g2 = [2.0, 5.0, 8.0, 11.0];
        let g3 = [3.0, 6.0, 9.0, 12.0];
        let r = kruskal_wallis(&[&g1, &g2, &g3], 0.05).expect("should compute");
        assert!(r.h < r.critical);
        assert!(r.p_value > 0.5, "p = {}", r.p_value);
    }

    #[test]
    fn unequal_sizes_allowed() {
        let g1 = [2.1, 3.4, 1.9];
        let g2 = [5.6, 6.1, 5.9, 6.3, 5.2];
        let g3 = [9.0, 8.7];
        let r = kruskal_wallis(&[&g1, &g2, &g3], 0.05).expect("should compute");
        assert!(r.h > 0.0);
        assert_eq!(r.mean_ranks.len(), 3);
    }

    #[test]
    fn two_groups_rejected() {
        let g = [1.0, 2.0, 3.0];
        assert!(matches!(
            kruskal_wallis(&[&g, &g], 0.05),
            Err(TestError::InsufficientGroups { required: 3, got: 2 })
        ));
    }
}
