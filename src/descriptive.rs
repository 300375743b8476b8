//! Descriptive statistics with numerical stability guarantees.
//!
//! # Algorithms
//!
//! - **Mean**: Kahan compensated summation.
//! - **Variance/StdDev**: Welford's online algorithm, sample (n − 1)
//!   denominator.
//!   Reference: Welford (1962), "Note on a Method for Calculating
//!   Corrected Sums of Squares and Products", *Technometrics* 4(3).
//!
//! Every function rejects empty or non-finite input with
//! [`TestError::InvalidInput`].

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{check_sample, Result, TestError};

/// Per-sample summary row: size, mean and sample standard deviation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Summary {
    /// Number of observations.
    pub n: usize,
    /// Arithmetic mean.
    pub mean: f64,
    /// Sample standard deviation (0 for a single observation).
    pub std_dev: f64,
}

/// Kahan-compensated sum of an already validated slice.
pub(crate) fn kahan_sum(data: &[f64]) -> f64 {
    let mut sum = 0.0;
    let mut c = 0.0;
    for &x in data {
        let y = x - c;
        let t = sum + y;
        c = (t - sum) - y;
        sum = t;
    }
    sum
}

/// Welford pass returning `(mean, M2)`.
fn welford(data: &[f64]) -> (f64, f64) {
    let mut mean = 0.0;
    let mut m2 = 0.0;
    for (i, &x) in data.iter().enumerate() {
        let delta = x - mean;
        mean += delta / (i + 1) as f64;
        m2 += delta * (x - mean);
    }
    (mean, m2)
}

/// Sum of the values.
///
/// # Examples
/// ```
/// use u_hypothesis::descriptive::sum;
/// assert_eq!(sum(&[1.0, 2.0, 3.5]).unwrap(), 6.5);
/// ```
pub fn sum(data: &[f64]) -> Result<f64> {
    check_sample(data, 1, "sum")?;
    Ok(kahan_sum(data))
}

/// Sum of squared values Σx².
pub fn sum_of_squares(data: &[f64]) -> Result<f64> {
    check_sample(data, 1, "sum of squares")?;
    let mut sum = 0.0;
    let mut c = 0.0;
    for &x in data {
        let y = x * x - c;
        let t = sum + y;
        c = (t - sum) - y;
        sum = t;
    }
    Ok(sum)
}

/// Arithmetic mean using Kahan compensated summation.
///
/// # Examples
/// ```
/// use u_hypothesis::descriptive::mean;
/// let v = [1.0, 2.0, 3.0, 4.0, 5.0];
/// assert!((mean(&v).unwrap() - 3.0).abs() < 1e-15);
/// assert!(mean(&[]).is_err());
/// ```
pub fn mean(data: &[f64]) -> Result<f64> {
    check_sample(data, 1, "mean")?;
    Ok(kahan_sum(data) / data.len() as f64)
}

/// Sample variance (denominator n − 1) using Welford's algorithm.
///
/// # Returns
/// `InvalidInput` if fewer than 2 observations.
///
/// # Examples
/// ```
/// use u_hypothesis::descriptive::variance;
/// let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
/// assert!((variance(&v).unwrap() - 4.571428571428571).abs() < 1e-10);
/// ```
pub fn variance(data: &[f64]) -> Result<f64> {
    check_sample(data, 2, "variance")?;
    let (_, m2) = welford(data);
    Ok((m2 / (data.len() - 1) as f64).max(0.0))
}

/// Sample standard deviation, `sqrt(variance)`.
pub fn std_dev(data: &[f64]) -> Result<f64> {
    variance(data).map(f64::sqrt)
}

/// Smallest value.
pub fn min(data: &[f64]) -> Result<f64> {
    check_sample(data, 1, "min")?;
    Ok(data.iter().copied().fold(f64::INFINITY, f64::min))
}

/// Largest value.
pub fn max(data: &[f64]) -> Result<f64> {
    check_sample(data, 1, "max")?;
    Ok(data.iter().copied().fold(f64::NEG_INFINITY, f64::max))
}

/// Median of a private sorted copy (mean of the two middle values for even n).
///
/// # Examples
/// ```
/// use u_hypothesis::descriptive::median;
/// assert_eq!(median(&[3.0, 1.0, 2.0]).unwrap(), 2.0);
/// assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]).unwrap(), 2.5);
/// ```
pub fn median(data: &[f64]) -> Result<f64> {
    check_sample(data, 1, "median")?;
    let sorted = sorted_copy(data);
    let n = sorted.len();
    if n % 2 == 1 {
        Ok(sorted[n / 2])
    } else {
        Ok((sorted[n / 2 - 1] + sorted[n / 2]) / 2.0)
    }
}

/// Summary row for one sample.
///
/// # Examples
/// ```
/// use u_hypothesis::descriptive::summarize;
/// let s = summarize(&[2.0, 4.0, 6.0]).unwrap();
/// assert_eq!(s.n, 3);
/// assert!((s.mean - 4.0).abs() < 1e-15);
/// assert!((s.std_dev - 2.0).abs() < 1e-12);
///
/// let one = summarize(&[7.0]).unwrap();
/// assert_eq!(one.std_dev, 0.0);
/// ```
pub fn summarize(data: &[f64]) -> Result<Summary> {
    check_sample(data, 1, "summary")?;
    let (_, m2) = welford(data);
    let n = data.len();
    let std_dev = if n < 2 {
        0.0
    } else {
        (m2 / (n - 1) as f64).max(0.0).sqrt()
    };
    Ok(Summary {
        n,
        mean: kahan_sum(data) / n as f64,
        std_dev,
    })
}

/// Summary rows for several samples.
pub fn summarize_all(samples: &[&[f64]]) -> Result<Vec<Summary>> {
    if samples.is_empty() {
        return Err(TestError::invalid_input("no samples given"));
    }
    samples.iter().map(|s| summarize(s)).collect()
}

pub(crate) fn sorted_copy(data: &[f64]) -> Vec<f64> {
    let mut sorted = data.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    sorted
}

/// Mean and variance of a validated slice with at least 2 values.
pub(crate) fn mean_var(data: &[f64]) -> (f64, f64) {
    let (_, m2) = welford(data);
    let mean = kahan_sum(data) / data.len() as f64;
    (mean, (m2 / (data.len() - 1) as f64).max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_values() {
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((mean(&v).expect("mean") - 5.0).abs() < 1e-15);
        assert!((std_dev(&v).expect("sd") - 2.138089935299395).abs() < 1e-10);
        assert_eq!(sum(&v).expect("sum"), 40.0);
        assert_eq!(sum_of_squares(&v).expect("ss"), 232.0);
        assert_eq!(min(&v).expect("min"), 2.0);
        assert_eq!(max(&v).expect("max"), 9.0);
        assert_eq!(median(&v).expect("median"), 4.5);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(mean(&[]), Err(TestError::InvalidInput(_))));
        assert!(matches!(variance(&[1.0]), Err(TestError::InvalidInput(_))));
        assert!(matches!(
            std_dev(&[1.0, f64::INFINITY]),
            Err(TestError::InvalidInput(_))
        ));
        assert!(summarize_all(&[]).is_err());
    }

    #[test]
    fn kahan_recovers_small_terms() {
        let mut v = vec![1.0e16];
        v.extend(std::iter::repeat(1.0).take(1000));
        v.push(-1.0e16);
        assert_eq!(sum(&v).expect("sum"), 1000.0);
    }

    #[test]
    fn input_not_mutated() {
        let v = [3.0, 1.0, 2.0];
        let _ = median(&v).expect("median");
        assert_eq!(v, [3.0, 1.0, 2.0]);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn finite_vec(min_len: usize, max_len: usize) -> impl Strategy<Value = Vec<f64>> {
        proptest::collection::vec(-1e6_f64..1e6, min_len..=max_len)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        #[test]
        fn std_dev_is_sqrt_of_variance(data in finite_vec(2, 100)) {
            let var = variance(&data).unwrap();
            let sd = std_dev(&data).unwrap();
            prop_assert!((sd * sd - var).abs() <= 1e-9 * var.max(1.0), "sd² = {}, var = {}", sd * sd, var);
        }

        #[test]
        fn variance_non_negative(data in finite_vec(2, 100)) {
            prop_assert!(variance(&data).unwrap() >= 0.0);
        }

        #[test]
        fn mean_within_bounds(data in finite_vec(1, 100)) {
            let m = mean(&data).unwrap();
            let lo = min(&data).unwrap();
            let hi = max(&data).unwrap();
            prop_assert!(m >= lo - 1e-9 && m <= hi + 1e-9, "mean {} outside [{}, {}]", m, lo, hi);
        }

        #[test]
        fn summary_matches_functions(data in finite_vec(2, 50)) {
            let s = summarize(&data).unwrap();
            prop_assert_eq!(s.n, data.len());
            prop_assert!((s.mean - mean(&data).unwrap()).abs() < 1e-9);
            prop_assert!((s.std_dev - std_dev(&data).unwrap()).abs() < 1e-9);
        }
    }
}
