//! Pairwise post-hoc comparison rows shared by the parametric and rank-based
//! follow-up tests.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::Significance;

/// Statistic reported by a post-hoc row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum StatisticLabel {
    /// Scheffé F.
    F,
    /// Studentized range Q.
    Q,
    /// Standard normal Z.
    Z,
}

impl fmt::Display for StatisticLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::F => "F",
            Self::Q => "Q",
            Self::Z => "Z",
        };
        f.write_str(s)
    }
}

/// One pairwise comparison between groups `group_a < group_b` (0-based).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PostHocComparison {
    /// Index of the first group.
    pub group_a: usize,
    /// Index of the second group.
    pub group_b: usize,
    /// P-value of the comparison.
    pub p_value: f64,
    /// Per-comparison α after correction.
    pub alpha: f64,
    /// Test statistic.
    pub statistic: f64,
    /// Critical value at `alpha`.
    pub critical: f64,
    /// Which statistic `statistic` is.
    pub label: StatisticLabel,
}

impl Significance for PostHocComparison {
    fn p_value(&self) -> f64 {
        self.p_value
    }
}

impl PostHocComparison {
    /// `true` when the pair differs at the corrected α.
    pub fn significant(&self) -> bool {
        self.p_value <= self.alpha
    }
}

/// Unordered pairs `(i, j)` with `i < j < k`, in row-major order.
pub(crate) fn pairs(k: usize) -> impl Iterator<Item = (usize, usize)> {
    (0..k).flat_map(move |i| ((i + 1)..k).map(move |j| (i, j)))
}

/// Harmonic mean of two sample sizes.
pub(crate) fn harmonic_size(n1: usize, n2: usize) -> f64 {
    2.0 / (1.0 / n1 as f64 + 1.0 / n2 as f64)
}
