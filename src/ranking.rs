//! Rank tables for the nonparametric tests.
//!
//! - [`rank_independent`]: joint mid-ranks over several independent samples.
//! - [`rank_signed`] / [`rank_signed_single`]: signed ranks of paired
//!   differences (or differences from a reference value).
//! - [`rank_within_rows`]: within-subject ranks across conditions.
//!
//! Ties receive the mean of the ranks they occupy. None of the functions
//! mutate their input; sorting happens on private copies.
//!
//! # Examples
//!
//! ```
//! use u_hypothesis::ranking::{rank_independent, rank_sums};
//!
//! let a = [1.0, 1.0, 1.0];
//! let b = [1.0, 1.0, 1.0];
//! let table = rank_independent(&[&a, &b]).unwrap();
//! assert!(table.iter().all(|e| e.rank == 3.5));
//! assert_eq!(rank_sums(&table, 2), vec![10.5, 10.5]);
//! ```

use std::cmp::Ordering;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{check_equal_sizes, check_paired, check_sample, Result, TestError};

/// One observation in a joint ranking of independent samples.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RankEntry {
    /// Observed value.
    pub value: f64,
    /// Mid-rank in the joint ordering (1-based).
    pub rank: f64,
    /// Index of the sample the value came from.
    pub group: usize,
}

/// One pair in a signed-rank table.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SignedRankEntry {
    /// |a − b|.
    pub abs_diff: f64,
    /// a − b.
    pub diff: f64,
    /// First value of the pair.
    pub a: f64,
    /// Second value of the pair (the reference for single-sample tables).
    pub b: f64,
    /// Mid-rank among nonzero differences; 0 for a zero difference.
    pub rank: f64,
    /// `rank` carrying the sign of `diff`.
    pub signed_rank: f64,
}

/// Positive and negative signed-rank sums.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SignedRankSums {
    /// T⁺: sum of positive signed ranks.
    pub positive: f64,
    /// T⁻: sum of negative signed ranks (≤ 0).
    pub negative: f64,
    /// Number of nonzero differences.
    pub n: usize,
}

impl SignedRankSums {
    /// Sums a signed-rank table.
    pub fn from_entries(entries: &[SignedRankEntry]) -> Self {
        let mut sums = Self {
            positive: 0.0,
            negative: 0.0,
            n: 0,
        };
        for e in entries {
            if e.signed_rank > 0.0 {
                sums.positive += e.signed_rank;
                sums.n += 1;
            } else if e.signed_rank < 0.0 {
                sums.negative += e.signed_rank;
                sums.n += 1;
            }
        }
        sums
    }
}

fn cmp_f64(a: &f64, b: &f64) -> Ordering {
    a.partial_cmp(b).unwrap_or(Ordering::Equal)
}

/// Mid-ranks of an ascending slice: each run of equal values gets the mean
/// of the 1-based positions it spans.
pub(crate) fn average_ranks(sorted: &[f64]) -> Vec<f64> {
    let n = sorted.len();
    let mut ranks = vec![0.0; n];
    let mut i = 0;
    while i < n {
        let mut j = i + 1;
        while j < n && sorted[j] == sorted[i] {
            j += 1;
        }
        // Positions i..j are tied; average rank = (i+1 + j) / 2
        let avg_rank = (i + 1 + j) as f64 / 2.0;
        for rank in ranks.iter_mut().take(j).skip(i) {
            *rank = avg_rank;
        }
        i = j;
    }
    ranks
}

/// Sizes of the runs of tied values in an ascending slice (runs of 1 included).
pub(crate) fn tie_run_lengths(sorted: &[f64]) -> Vec<usize> {
    let mut runs = Vec::new();
    let mut i = 0;
    while i < sorted.len() {
        let mut j = i + 1;
        while j < sorted.len() && sorted[j] == sorted[i] {
            j += 1;
        }
        runs.push(j - i);
        i = j;
    }
    runs
}

// ---------------------------------------------------------------------------
// Independent samples
// ---------------------------------------------------------------------------

/// Joint mid-rank table over independent samples, sorted by value.
///
/// # Errors
///
/// `InvalidInput` if no samples are given, or any sample is empty or
/// contains a non-finite value.
pub fn rank_independent(samples: &[&[f64]]) -> Result<Vec<RankEntry>> {
    if samples.is_empty() {
        return Err(TestError::invalid_input("no samples to rank"));
    }
    for (i, s) in samples.iter().enumerate() {
        check_sample(s, 1, &format!("sample {i}"))?;
    }

    let mut table: Vec<RankEntry> = samples
        .iter()
        .enumerate()
        .flat_map(|(group, s)| {
            s.iter().map(move |&value| RankEntry {
                value,
                rank: 0.0,
                group,
            })
        })
        .collect();
    table.sort_by(|x, y| cmp_f64(&x.value, &y.value));

    let values: Vec<f64> = table.iter().map(|e| e.value).collect();
    for (entry, rank) in table.iter_mut().zip(average_ranks(&values)) {
        entry.rank = rank;
    }
    Ok(table)
}

/// Rank sum per group for groups `0..k`.
pub fn rank_sums(entries: &[RankEntry], k: usize) -> Vec<f64> {
    let mut sums = vec![0.0; k];
    for e in entries {
        if let Some(s) = sums.get_mut(e.group) {
            *s += e.rank;
        }
    }
    sums
}

// ---------------------------------------------------------------------------
// Signed ranks
// ---------------------------------------------------------------------------

fn signed_table(pairs: impl Iterator<Item = (f64, f64)>) -> Vec<SignedRankEntry> {
    let mut table: Vec<SignedRankEntry> = pairs
        .map(|(a, b)| {
            let diff = a - b;
            SignedRankEntry {
                abs_diff: diff.abs(),
                diff,
                a,
                b,
                rank: 0.0,
                signed_rank: 0.0,
            }
        })
        .collect();
    table.sort_by(|x, y| cmp_f64(&x.abs_diff, &y.abs_diff));

    // Zero differences sort first and keep rank 0.
    let zeros = table.iter().take_while(|e| e.abs_diff == 0.0).count();
    let nonzero: Vec<f64> = table[zeros..].iter().map(|e| e.abs_diff).collect();
    for (entry, rank) in table[zeros..].iter_mut().zip(average_ranks(&nonzero)) {
        entry.rank = rank;
        entry.signed_rank = rank.copysign(entry.diff);
    }
    table
}

/// Signed-rank table of the paired differences `a[i] − b[i]`, sorted by
/// absolute difference.
///
/// # Errors
///
/// `SampleSizeMismatch` for unequal lengths, `InvalidInput` for empty or
/// non-finite samples.
///
/// # Examples
///
/// ```
/// use u_hypothesis::ranking::{rank_signed, SignedRankSums};
///
/// let before = [10.0, 12.0, 9.0, 11.0];
/// let after = [12.0, 11.0, 9.0, 14.0];
/// let table = rank_signed(&before, &after).unwrap();
/// let sums = SignedRankSums::from_entries(&table);
/// assert_eq!(sums.n, 3); // the zero difference is dropped
/// assert_eq!(sums.positive, 1.0);
/// assert_eq!(sums.negative, -5.0);
/// ```
pub fn rank_signed(a: &[f64], b: &[f64]) -> Result<Vec<SignedRankEntry>> {
    check_paired(a, b)?;
    check_sample(a, 1, "first sample")?;
    check_sample(b, 1, "second sample")?;
    Ok(signed_table(a.iter().copied().zip(b.iter().copied())))
}

/// Signed-rank table of `sample[i] − reference`.
pub fn rank_signed_single(sample: &[f64], reference: f64) -> Result<Vec<SignedRankEntry>> {
    check_sample(sample, 1, "sample")?;
    if !reference.is_finite() {
        return Err(TestError::invalid_parameter(
            "reference",
            format!("must be finite (got {reference})"),
        ));
    }
    Ok(signed_table(sample.iter().map(|&x| (x, reference))))
}

// ---------------------------------------------------------------------------
// Within-subject ranks
// ---------------------------------------------------------------------------

/// Ranks each subject (row `i` across all samples) over the `k` conditions.
///
/// Returns `ranks[j][i]`: the rank of `samples[j][i]` within row `i`.
///
/// # Errors
///
/// `UnequalSampleSizes` when the samples differ in length.
pub fn rank_within_rows(samples: &[&[f64]]) -> Result<Vec<Vec<f64>>> {
    if samples.is_empty() {
        return Err(TestError::invalid_input("no samples to rank"));
    }
    for (i, s) in samples.iter().enumerate() {
        check_sample(s, 1, &format!("sample {i}"))?;
    }
    let n = check_equal_sizes(samples)?;
    let k = samples.len();

    let mut ranks = vec![vec![0.0; n]; k];
    let mut row: Vec<(f64, usize)> = Vec::with_capacity(k);
    for i in 0..n {
        row.clear();
        row.extend(samples.iter().enumerate().map(|(j, s)| (s[i], j)));
        row.sort_by(|x, y| cmp_f64(&x.0, &y.0));
        let values: Vec<f64> = row.iter().map(|&(v, _)| v).collect();
        for (&(_, j), rank) in row.iter().zip(average_ranks(&values)) {
            ranks[j][i] = rank;
        }
    }
    Ok(ranks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn independent_ranks_with_ties() {
        let a = [3.0, 1.0];
        let b = [2.0, 3.0, 5.0];
        let table = rank_independent(&[&a, &b]).expect("should rank");
        let ranks: Vec<(f64, f64)> = table.iter().map(|e| (e.value, e.rank)).collect();
        assert_eq!(
            ranks,
            vec![(1.0, 1.0), (2.0, 2.0), (3.0, 3.5), (3.0, 3.5), (5.0, 5.0)]
        );
        assert_eq!(rank_sums(&table, 2), vec![4.5, 10.5]);
    }

    #[test]
    fn all_tied_gets_mean_rank() {
        let a = [1.0, 1.0, 1.0];
        let b = [1.0, 1.0, 1.0];
        let table = rank_independent(&[&a, &b]).expect("should rank");
        assert_eq!(table.len(), 6);
        for e in &table {
            assert_eq!(e.rank, 3.5);
        }
    }

    #[test]
    fn signed_ranks_skip_zeros_and_share_ties() {
        let a = [5.0, 7.0, 4.0, 6.0, 6.0];
        let b = [5.0, 5.0, 6.0, 3.0, 7.0];
        // diffs: 0, 2, -2, 3, -1
        let table = rank_signed(&a, &b).expect("should rank");
        assert_eq!(table[0].rank, 0.0);
        assert_eq!(table[0].signed_rank, 0.0);
        let by_diff = |d: f64| {
            table
                .iter()
                .find(|e| e.diff == d)
                .map(|e| e.signed_rank)
                .expect("present")
        };
        assert_eq!(by_diff(-1.0), -1.0);
        assert_eq!(by_diff(2.0), 2.5);
        assert_eq!(by_diff(-2.0), -2.5);
        assert_eq!(by_diff(3.0), 4.0);

        let sums = SignedRankSums::from_entries(&table);
        assert_eq!(sums.n, 4);
        assert_eq!(sums.positive, 6.5);
        assert_eq!(sums.negative, -3.5);
    }

    #[test]
    fn signed_rank_mismatch() {
        let err = rank_signed(&[1.0, 2.0], &[1.0]).unwrap_err();
        assert_eq!(err, TestError::SampleSizeMismatch { left: 2, right: 1 });
    }

    #[test]
    fn single_sample_against_reference() {
        let table = rank_signed_single(&[1.0, 4.0, 2.0], 2.0).expect("should rank");
        let sums = SignedRankSums::from_entries(&table);
        assert_eq!(sums.n, 2);
        // diffs -1 and +2
        assert_eq!(sums.positive, 2.0);
        assert_eq!(sums.negative, -1.0);
        assert!(rank_signed_single(&[1.0], f64::NAN).is_err());
    }

    #[test]
    fn within_row_ranks() {
        let a = [1.0, 5.0];
        let b = [2.0, 5.0];
        let c = [3.0, 1.0];
        let r = rank_within_rows(&[&a, &b, &c]).expect("should rank");
        assert_eq!(r[0], vec![1.0, 2.5]);
        assert_eq!(r[1], vec![2.0, 2.5]);
        assert_eq!(r[2], vec![3.0, 1.0]);
    }

    #[test]
    fn within_rows_requires_equal_sizes() {
        let a = [1.0, 2.0];
        let b = [1.0];
        assert!(matches!(
            rank_within_rows(&[&a, &b]),
            Err(TestError::UnequalSampleSizes { .. })
        ));
    }

    #[test]
    fn input_not_mutated() {
        let a = [3.0, 1.0, 2.0];
        let b = [0.5, 4.0, 2.5];
        let _ = rank_independent(&[&a, &b]).expect("should rank");
        let _ = rank_signed(&a, &b).expect("should rank");
        assert_eq!(a, [3.0, 1.0, 2.0]);
        assert_eq!(b, [0.5, 4.0, 2.5]);
    }
}
