//! Critical-value tables for the Wilcoxon tests at α = 0.05.
//!
//! Rank-sum tables hold `[lower, upper]` bounds for the rank sum of the
//! smaller sample, indexed by `[n_min − 3][n_other − 3]` for sizes 3..=10.
//! Signed-rank tables hold the critical W, indexed by `n − 5` for n in
//! 5..=30.

use crate::config::Alternative;

/// Smallest sample size covered by the rank-sum tables.
pub(crate) const RANK_SUM_MIN: usize = 3;
/// Largest sample size covered by the rank-sum tables.
pub(crate) const RANK_SUM_MAX: usize = 10;

/// Signed-rank sizes for which the exact table is used.
pub(crate) const SIGNED_RANK_EXACT: std::ops::RangeInclusive<usize> = 6..=25;

#[rustfmt::skip]
const RANK_SUM_TWO_TAILED: [[[u16; 2]; 8]; 8] = [
    [[5, 16], [6, 18],  [6, 21],  [7, 23],  [7, 26],  [8, 28],  [8, 31],   [9, 33]],
    [[6, 18], [11, 25], [12, 28], [12, 32], [13, 35], [14, 38], [15, 41],  [16, 44]],
    [[6, 21], [12, 28], [18, 37], [19, 41], [20, 45], [21, 49], [22, 53],  [24, 56]],
    [[7, 23], [12, 32], [19, 41], [26, 52], [28, 56], [29, 61], [31, 65],  [32, 70]],
    [[7, 26], [13, 35], [20, 45], [28, 56], [37, 68], [39, 73], [41, 78],  [43, 83]],
    [[8, 28], [14, 38], [21, 49], [29, 61], [39, 73], [49, 87], [51, 93],  [54, 98]],
    [[8, 31], [15, 41], [22, 53], [31, 65], [41, 78], [51, 93], [63, 108], [66, 114]],
    [[9, 33], [16, 44], [24, 56], [32, 70], [43, 83], [54, 98], [66, 114], [79, 131]],
];

#[rustfmt::skip]
const RANK_SUM_ONE_TAILED: [[[u16; 2]; 8]; 8] = [
    [[6, 15],  [7, 17],  [7, 20],  [8, 22],  [9, 24],  [9, 27],  [10, 29],  [11, 31]],
    [[7, 17],  [12, 24], [13, 27], [14, 30], [15, 33], [16, 36], [17, 39],  [18, 42]],
    [[7, 20],  [13, 27], [19, 36], [20, 40], [22, 43], [24, 46], [25, 50],  [26, 54]],
    [[8, 22],  [14, 30], [20, 40], [28, 50], [30, 54], [32, 58], [33, 63],  [35, 67]],
    [[9, 24],  [15, 33], [22, 43], [30, 54], [39, 66], [41, 71], [43, 76],  [46, 80]],
    [[9, 27],  [16, 36], [24, 46], [32, 58], [41, 71], [52, 84], [54, 90],  [57, 95]],
    [[10, 29], [17, 39], [25, 50], [33, 63], [43, 76], [54, 90], [66, 105], [69, 111]],
    [[11, 31], [18, 42], [26, 54], [35, 67], [46, 80], [57, 95], [69, 111], [83, 127]],
];

#[rustfmt::skip]
const SIGNED_RANK_TWO_TAILED: [i16; 26] = [
    -1, 0, 2, 3, 5, 8, 10, 13, 17, 21, 25, 29, 34,
    40, 46, 52, 58, 65, 73, 81, 89, 98, 107, 116, 126, 137,
];

#[rustfmt::skip]
const SIGNED_RANK_ONE_TAILED: [i16; 26] = [
    0, 2, 3, 5, 8, 10, 13, 17, 21, 25, 30, 35, 41,
    47, 53, 60, 67, 75, 83, 91, 100, 110, 119, 130, 140, 151,
];

/// `true` when both sizes fall inside the rank-sum tables (3..=10 each).
pub(crate) fn rank_sum_covered(n1: usize, n2: usize) -> bool {
    let range = RANK_SUM_MIN..=RANK_SUM_MAX;
    range.contains(&n1) && range.contains(&n2)
}

/// `(lower, upper)` critical rank sums, or `None` outside the table.
pub(crate) fn rank_sum_bounds(n_min: usize, n_other: usize, alternative: Alternative) -> Option<(f64, f64)> {
    if !rank_sum_covered(n_min, n_other) {
        return None;
    }
    let table = match alternative {
        Alternative::TwoSided => &RANK_SUM_TWO_TAILED,
        Alternative::Less | Alternative::Greater => &RANK_SUM_ONE_TAILED,
    };
    let [lo, hi] = table[n_min - RANK_SUM_MIN][n_other - RANK_SUM_MIN];
    Some((f64::from(lo), f64::from(hi)))
}

/// Critical W for `n` nonzero differences, or `None` outside 5..=30.
pub(crate) fn signed_rank_critical(n: usize, alternative: Alternative) -> Option<f64> {
    let table = match alternative {
        Alternative::TwoSided => &SIGNED_RANK_TWO_TAILED,
        Alternative::Less | Alternative::Greater => &SIGNED_RANK_ONE_TAILED,
    };
    n.checked_sub(5)
        .and_then(|i| table.get(i))
        .map(|&w| f64::from(w))
}
