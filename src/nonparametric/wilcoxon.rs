//! Wilcoxon rank-sum (independent) and signed-rank (paired, single-sample)
//! tests.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::{Alternative, Significance, TestOptions};
use crate::distribution::{norm_cdf, norm_inv, tail_critical, tail_p_value, Normal};
use crate::error::{check_paired, check_sample, Result, TestError};
use crate::ranking::{rank_independent, rank_signed, rank_signed_single, rank_sums, SignedRankSums};

use super::tables::{rank_sum_bounds, signed_rank_critical, SIGNED_RANK_EXACT};

/// Which Wilcoxon test [`wilcoxon`] runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum WilcoxonKind {
    /// Independent samples (Mann-Whitney).
    RankSum,
    /// Paired samples.
    SignedRank,
}

impl TryFrom<u8> for WilcoxonKind {
    type Error = TestError;

    /// 1 = rank-sum, 2 = signed-rank.
    fn try_from(kind: u8) -> Result<Self> {
        match kind {
            1 => Ok(Self::RankSum),
            2 => Ok(Self::SignedRank),
            _ => Err(TestError::invalid_parameter(
                "kind",
                format!("Wilcoxon kind must be 1 or 2 (got {kind})"),
            )),
        }
    }
}

/// Result of a Wilcoxon rank-sum test.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RankSumResult {
    /// Normal-approximation p-value.
    pub p_value: f64,
    /// R when `exact_table`, otherwise Z.
    pub statistic: f64,
    /// Lower critical bound for `statistic`.
    pub lower_critical: f64,
    /// Upper critical bound for `statistic`.
    pub upper_critical: f64,
    /// Whether the bounds come from the exact critical-value table.
    pub exact_table: bool,
    /// Rank sum of the smaller sample (the first when sizes are equal).
    pub rank_sum: f64,
    /// Standardized rank sum.
    pub z: f64,
    /// Alternative the p-value refers to.
    pub alternative: Alternative,
}

impl Significance for RankSumResult {
    fn p_value(&self) -> f64 {
        self.p_value
    }
}

/// Result of a Wilcoxon signed-rank test.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SignedRankResult {
    /// Normal-approximation p-value.
    pub p_value: f64,
    /// W when `exact_table`, otherwise Z.
    pub statistic: f64,
    /// Critical W (exact) or Z; the test rejects when `statistic` ≤ this.
    pub critical: f64,
    /// Whether `critical` comes from the exact table.
    pub exact_table: bool,
    /// Signed-rank statistic W.
    pub w: f64,
    /// Standardized W.
    pub z: f64,
    /// Number of nonzero differences.
    pub n: usize,
    /// Alternative the p-value refers to.
    pub alternative: Alternative,
}

impl Significance for SignedRankResult {
    fn p_value(&self) -> f64 {
        self.p_value
    }
}

/// Result of [`wilcoxon`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum WilcoxonResult {
    /// Independent samples.
    RankSum(RankSumResult),
    /// Paired samples.
    SignedRank(SignedRankResult),
}

impl Significance for WilcoxonResult {
    fn p_value(&self) -> f64 {
        match self {
            Self::RankSum(r) => r.p_value,
            Self::SignedRank(r) => r.p_value,
        }
    }
}

/// Runs the rank-sum or signed-rank test on `a` and `b`.
///
/// # Errors
///
/// As [`wilcoxon_rank_sum`] or [`wilcoxon_signed_rank`].
pub fn wilcoxon(a: &[f64], b: &[f64], kind: WilcoxonKind, options: &TestOptions) -> Result<WilcoxonResult> {
    match kind {
        WilcoxonKind::RankSum => wilcoxon_rank_sum(a, b, options).map(WilcoxonResult::RankSum),
        WilcoxonKind::SignedRank => wilcoxon_signed_rank(a, b, options).map(WilcoxonResult::SignedRank),
    }
}

// ---------------------------------------------------------------------------
// Rank-sum
// ---------------------------------------------------------------------------

/// Rank sum of the smaller sample and its standardized value.
pub(crate) struct RankSumCore {
    pub rank_sum: f64,
    pub z: f64,
    pub n_min: usize,
    pub n_other: usize,
}

pub(crate) fn rank_sum_core(a: &[f64], b: &[f64]) -> Result<RankSumCore> {
    let entries = rank_independent(&[a, b])?;
    let sums = rank_sums(&entries, 2);
    let (rank_sum, n_min, n_other) = if b.len() < a.len() {
        (sums[1], b.len(), a.len())
    } else {
        (sums[0], a.len(), b.len())
    };
    let (n1, n2) = (n_min as f64, n_other as f64);
    let expected = n1 * (n1 + n2 + 1.0) / 2.0;
    let sd = (n1 * n2 * (n1 + n2 + 1.0) / 12.0).sqrt();
    Ok(RankSumCore {
        rank_sum,
        z: (rank_sum - expected) / sd,
        n_min,
        n_other,
    })
}

/// Wilcoxon rank-sum test for two independent samples.
///
/// # Algorithm
///
/// Both samples are ranked jointly (mid-ranks for ties). R is the rank sum
/// of the smaller sample, or of `a` when the sizes are equal, and
///
/// ```text
/// Z = (R − n_min(N+1)/2) / √(n_min·n_other(N+1)/12)
/// ```
///
/// The p-value always comes from the normal approximation. One-sided
/// alternatives refer to the sample R is taken from: `Less` means its values
/// tend to be smaller.
///
/// When both sizes lie in 3..=10 the statistic is R itself and the bounds
/// are the exact α = 0.05 table values (`exact_table = true`); otherwise
/// the statistic is Z with bounds ±Z_c. A sample of 1 or 2 values has no
/// table entry, so it falls back to Z even when the other sample is small.
///
/// # Errors
///
/// `InvalidInput` for an empty or non-finite sample, `InvalidParameter` for
/// α outside (0, 1).
///
/// # References
///
/// Wilcoxon (1945). "Individual comparisons by ranking methods".
/// Biometrics Bulletin, 1(6), 80–83.
///
/// # Examples
///
/// ```
/// use u_hypothesis::config::TestOptions;
/// use u_hypothesis::nonparametric::wilcoxon_rank_sum;
///
/// let a = [1.1, 2.2, 3.3, 4.4];
/// let b = [5.5, 6.6, 7.7, 8.8, 9.9];
/// let r = wilcoxon_rank_sum(&a, &b, &TestOptions::default()).unwrap();
/// assert!(r.exact_table);
/// assert_eq!(r.statistic, 10.0);
/// assert!(r.statistic < r.lower_critical);
/// ```
pub fn wilcoxon_rank_sum(a: &[f64], b: &[f64], options: &TestOptions) -> Result<RankSumResult> {
    options.validate()?;
    check_sample(a, 1, "first sample")?;
    check_sample(b, 1, "second sample")?;

    let core = rank_sum_core(a, b)?;
    let normal = Normal::standard();
    let p_value = tail_p_value(&normal, core.z, options.alternative);

    let (statistic, lower_critical, upper_critical, exact_table) =
        match rank_sum_bounds(core.n_min, core.n_other, options.alternative) {
            Some((lo, hi)) => (core.rank_sum, lo, hi, true),
            None => {
                let zc = tail_critical(&normal, options.alpha, options.alternative).abs();
                (core.z, -zc, zc, false)
            }
        };
    tracing::debug!(
        n_min = core.n_min,
        n_other = core.n_other,
        exact_table,
        "wilcoxon rank-sum"
    );

    Ok(RankSumResult {
        p_value,
        statistic,
        lower_critical,
        upper_critical,
        exact_table,
        rank_sum: core.rank_sum,
        z: core.z,
        alternative: options.alternative,
    })
}

// ---------------------------------------------------------------------------
// Signed-rank
// ---------------------------------------------------------------------------

/// W for the alternative and its standardized value; `z` is 0 when `n` is 0.
pub(crate) fn signed_rank_w(sums: &SignedRankSums, alternative: Alternative) -> (f64, f64) {
    let w = match alternative {
        Alternative::TwoSided => sums.positive.min(sums.negative.abs()),
        Alternative::Less => sums.positive,
        Alternative::Greater => sums.negative.abs(),
    };
    if sums.n == 0 {
        return (w, 0.0);
    }
    let n = sums.n as f64;
    let mean = n * (n + 1.0) / 4.0;
    let sd = (n * (n + 1.0) * (2.0 * n + 1.0) / 24.0).sqrt();
    (w, (w - mean) / sd)
}

fn signed_rank_from_sums(sums: SignedRankSums, options: &TestOptions) -> SignedRankResult {
    let alternative = options.alternative;
    let sides = f64::from(alternative.sides());
    let z_critical = -norm_inv(1.0 - options.alpha / sides);

    if sums.n == 0 {
        tracing::debug!("signed-rank: all differences are zero");
        return SignedRankResult {
            p_value: 1.0,
            statistic: 0.0,
            critical: z_critical,
            exact_table: false,
            w: 0.0,
            z: 0.0,
            n: 0,
            alternative,
        };
    }

    let (w, z) = signed_rank_w(&sums, alternative);
    let p_value = (sides * norm_cdf(z)).clamp(0.0, 1.0);
    let table = SIGNED_RANK_EXACT
        .contains(&sums.n)
        .then(|| signed_rank_critical(sums.n, alternative))
        .flatten();
    let (statistic, critical, exact_table) = match table {
        Some(wc) => (w, wc, true),
        None => (z, z_critical, false),
    };
    tracing::debug!(n = sums.n, exact_table, "wilcoxon signed-rank");

    SignedRankResult {
        p_value,
        statistic,
        critical,
        exact_table,
        w,
        z,
        n: sums.n,
        alternative,
    }
}

/// Wilcoxon signed-rank test for paired samples.
///
/// # Algorithm
///
/// Differences dᵢ = aᵢ − bᵢ are ranked by |dᵢ|, zeros dropped. With T⁺ and
/// T⁻ the positive and negative signed-rank sums over n nonzero
/// differences, W is min(T⁺, |T⁻|) for a two-sided test, T⁺ for `Less`
/// (a tends to be smaller than b) and |T⁻| for `Greater`.
///
/// ```text
/// Z   = (W − n(n+1)/4) / √(n(n+1)(2n+1)/24)
/// Z_c = −Φ⁻¹(1 − α/sides)
/// P   = sides·Φ(Z)
/// ```
///
/// For 6 ≤ n ≤ 25 the statistic is W and the critical value comes from the
/// exact table. When every difference is zero the result is P = 1 with a
/// zero statistic.
///
/// # Errors
///
/// `SampleSizeMismatch` for different lengths, `InvalidInput` for an empty
/// or non-finite sample, `InvalidParameter` for α outside (0, 1).
///
/// # Examples
///
/// ```
/// use u_hypothesis::config::TestOptions;
/// use u_hypothesis::nonparametric::wilcoxon_signed_rank;
///
/// let before = [12.0, 14.0, 11.0, 15.0, 13.0, 16.0, 12.5, 14.5];
/// let after = [11.0, 12.0, 8.0, 11.0, 8.0, 10.0, 5.5, 6.5];
/// let r = wilcoxon_signed_rank(&before, &after, &TestOptions::default()).unwrap();
/// assert!(r.exact_table);
/// assert_eq!(r.w, 0.0);
/// assert!(r.statistic <= r.critical);
/// ```
pub fn wilcoxon_signed_rank(a: &[f64], b: &[f64], options: &TestOptions) -> Result<SignedRankResult> {
    options.validate()?;
    check_paired(a, b)?;
    let table = rank_signed(a, b)?;
    Ok(signed_rank_from_sums(SignedRankSums::from_entries(&table), options))
}

/// Wilcoxon signed-rank test of a single sample against a reference value.
///
/// Identical to [`wilcoxon_signed_rank`] with every bᵢ = `reference`.
pub fn wilcoxon_signed_rank_single(
    sample: &[f64],
    reference: f64,
    options: &TestOptions,
) -> Result<SignedRankResult> {
    options.validate()?;
    let table = rank_signed_single(sample, reference)?;
    Ok(signed_rank_from_sums(SignedRankSums::from_entries(&table), options))
}
