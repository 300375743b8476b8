//! Generalized extreme studentized deviate (ESD) outlier detection.
//!
//! # Examples
//!
//! ```
//! use u_hypothesis::outliers::esd_outliers;
//!
//! let data = [10.0, 11.0, 9.0, 10.0, 12.0, 11.0, 1000.0];
//! let r = esd_outliers(&data, 0.05).unwrap();
//! assert_eq!(r.outlier_indices(), vec![6]);
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::check_alpha;
use crate::distribution::{Distribution, StudentT};
use crate::error::{check_sample, Result};
use crate::normality::shapiro_wilk;

/// One removal step of the ESD procedure.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EsdTrial {
    /// Candidate value (largest deviation from the working mean).
    pub value: f64,
    /// Position of the candidate in the caller's sample.
    pub index: usize,
    /// Whether G exceeds the critical value.
    pub significant: bool,
    /// G = max|xᵢ − x̄| / s over the working set.
    pub g: f64,
    /// Critical G for the working set size.
    pub critical: f64,
}

/// Result of [`esd_outliers`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EsdResult {
    /// Trials up to the last significant one.
    pub trials: Vec<EsdTrial>,
    /// `flags[i]` is `true` when `sample[i]` was removed by a retained trial.
    pub flags: Vec<bool>,
}

impl EsdResult {
    /// Positions of the flagged values, ascending.
    pub fn outlier_indices(&self) -> Vec<usize> {
        self.flags
            .iter()
            .enumerate()
            .filter_map(|(i, &f)| f.then_some(i))
            .collect()
    }
}

/// Index into `work` of the first value with the strictly greatest
/// deviation from the working mean.
fn find_candidate(work: &[(f64, usize)]) -> (usize, f64) {
    let mean = work.iter().map(|&(v, _)| v).sum::<f64>() / work.len() as f64;
    let mut best = (0, 0.0);
    for (pos, &(v, _)) in work.iter().enumerate() {
        let d = (v - mean).abs();
        if d > best.1 {
            best = (pos, d);
        }
    }
    best
}

/// Number of trials: remove the most extreme value until the working set
/// has at most 4 values or passes Shapiro-Wilk; at least 2, at most n − 2.
fn count_trials(sample: &[f64], alpha: f64) -> Result<usize> {
    let mut work: Vec<(f64, usize)> = sample.iter().copied().zip(0..).collect();
    let mut trials = 0;
    loop {
        trials += 1;
        if work.len() <= 4 || shapiro_wilk(&values(&work), alpha)?.p_value > alpha {
            break;
        }
        let (pos, _) = find_candidate(&work);
        work.remove(pos);
    }
    Ok(trials.max(2).min(sample.len() - 2))
}

fn values(work: &[(f64, usize)]) -> Vec<f64> {
    work.iter().map(|&(v, _)| v).collect()
}

/// Grubbs statistic and critical value for the working set.
fn check_significance(work: &[(f64, usize)], deviation: f64, alpha: f64) -> Result<(f64, f64)> {
    let n = work.len() as f64;
    let mean = work.iter().map(|&(v, _)| v).sum::<f64>() / n;
    let ss: f64 = work.iter().map(|&(v, _)| (v - mean).powi(2)).sum();
    let s = (ss / (n - 1.0)).sqrt();
    let g = if s > 1e-300 { deviation / s } else { 0.0 };

    let df = n - 2.0;
    let tc = StudentT::new(df)?.inverse_cdf(1.0 - alpha / (2.0 * n));
    let gc = (n - 1.0) * tc / (n * (df + tc * tc)).sqrt();
    Ok((g, gc))
}

/// Generalized ESD test for one or more outliers.
///
/// # Algorithm
///
/// The number of trials comes from a pre-pass on a copy: the most extreme
/// value is removed until at most 4 values remain or Shapiro-Wilk no longer
/// rejects normality (at least 2 trials, at most n − 2). Each trial then
/// removes the value farthest from the working mean and compares
///
/// ```text
/// G   = max|xᵢ − x̄| / s
/// G_c = (n−1)·t_c / √(n(n − 2 + t_c²)),   t_c = t⁻¹(1 − α/(2n), n − 2)
/// ```
///
/// where n is the working set size. Trailing non-significant trials are
/// dropped; every value removed by a remaining trial is an outlier.
///
/// # Errors
///
/// `InvalidInput` for fewer than 3 values or a non-finite value,
/// `InvalidParameter` for α outside (0, 1).
///
/// # References
///
/// Rosner (1983). "Percentage points for a generalized ESD many-outlier
/// procedure". Technometrics, 25(2), 165–172.
pub fn esd_outliers(sample: &[f64], alpha: f64) -> Result<EsdResult> {
    check_alpha(alpha)?;
    check_sample(sample, 3, "ESD sample")?;

    let count = count_trials(sample, alpha)?;
    tracing::debug!(n = sample.len(), trials = count, "esd trial count");

    let mut work: Vec<(f64, usize)> = sample.iter().copied().zip(0..).collect();
    let mut trials = Vec::with_capacity(count);
    for _ in 0..count {
        let (pos, deviation) = find_candidate(&work);
        let (g, critical) = check_significance(&work, deviation, alpha)?;
        let (value, index) = work.remove(pos);
        trials.push(EsdTrial {
            value,
            index,
            significant: g > critical,
            g,
            critical,
        });
    }

    while trials.last().is_some_and(|t| !t.significant) {
        trials.pop();
    }

    let mut flags = vec![false; sample.len()];
    for t in &trials {
        flags[t.index] = true;
    }
    Ok(EsdResult { trials, flags })
}
