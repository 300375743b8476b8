//! Friedman test for k related samples (repeated measures on ranks).

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::{check_alpha, Significance};
use crate::distribution::{ChiSquare, Distribution};
use crate::error::{check_equal_sizes, check_groups, Result};
use crate::ranking::rank_within_rows;

/// Result of a Friedman test.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FriedmanResult {
    /// Upper-tail chi-square p-value.
    pub p_value: f64,
    /// Q statistic.
    pub q: f64,
    /// Critical chi-square at 1 − α.
    pub critical: f64,
    /// Degrees of freedom (k − 1).
    pub df: f64,
    /// Sum of within-subject ranks per condition.
    pub rank_sums: Vec<f64>,
}

impl Significance for FriedmanResult {
    fn p_value(&self) -> f64 {
        self.p_value
    }
}

/// Friedman two-way analysis of variance by ranks.
///
/// `groups[j][i]` is subject i under condition j. Each subject's k values
/// are ranked (mid-ranks for ties) and, with Rⱼ the rank sum of condition j
/// over n subjects,
///
/// ```text
/// Q = 12/(n·k(k+1)) · Σ Rⱼ² − 3n(k+1)
/// ```
///
/// is compared with chi-square on k − 1 degrees of freedom.
///
/// # Errors
///
/// `InsufficientGroups` for fewer than 3 conditions, `UnequalSampleSizes`
/// when the conditions differ in length, `InvalidInput` for an empty or
/// non-finite sample, `InvalidParameter` for α outside (0, 1).
///
/// # References
///
/// Friedman (1937). "The use of ranks to avoid the assumption of normality
/// implicit in the analysis of variance". JASA, 32(200), 675–701.
pub fn friedman(groups: &[&[f64]], alpha: f64) -> Result<FriedmanResult> {
    check_alpha(alpha)?;
    check_groups(groups, 3, 1)?;
    let n = check_equal_sizes(groups)? as f64;
    let k = groups.len() as f64;

    let ranks = rank_within_rows(groups)?;
    let rank_sums: Vec<f64> = ranks.iter().map(|col| col.iter().sum()).collect();
    let squares: f64 = rank_sums.iter().map(|r| r * r).sum();
    let q = 12.0 / (n * k * (k + 1.0)) * squares - 3.0 * n * (k + 1.0);

    let df = k - 1.0;
    let dist = ChiSquare::new(df)?;
    tracing::debug!(k = groups.len(), n, q, "friedman");

    Ok(FriedmanResult {
        p_value: dist.sf(q).clamp(0.0, 1.0),
        q,
        critical: dist.inverse_cdf(1.0 - alpha),
        df,
        rank_sums,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TestError;

    #[test]
    fn consistent_ordering() {
        let g1 = [1.0, 2.0, 3.0, 4.0];
        let g2 = [5.0, 6.0, 7.0, 8.0];
        let g3 = [9.0, 10.0, 11.0, 12.0];
        let r = friedman(&[&g1, &g2, &g3], 0.05).expect("should compute");
        assert_eq!(r.rank_sums, vec![4.0, 8.0, 12.0]);
        assert!((r.q - 8.0).abs() < 1e-10, "Q = {}", r.q);
        assert!((r.p_value - (-4.0_f64).exp()).abs() < 1e-8, "p = {}", r.p_value);
    }

    #[test]
    fn all_ties_give_zero() {
        let g = [3.0, 1.0, 4.0, 1.5];
        let r = friedman(&[&g, &g, &g], 0.05).expect("should compute");
        assert!(r.q.abs() < 1e-10, "Q = {}", r.q);
        assert_eq!(r.p_value, 1.0);
    }

    #[test]
    fn unequal_sizes_rejected() {
        let a = [1.0, 2.0, 3.0];
        let b = [1.0, 2.0];
        assert!(matches!(
            friedman(&[&a, &a, &b], 0.05),
            Err(TestError::UnequalSampleSizes { group: 2, .. })
        ));
    }
}
