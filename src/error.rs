//! Error types for hypothesis tests.
//!
//! Every public operation validates its inputs up front and fails with one
//! of the variants below before any computation starts.

use thiserror::Error;

/// Result type for all operations in this crate.
pub type Result<T> = std::result::Result<T, TestError>;

/// Errors raised by test, diagnostic and power functions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TestError {
    /// A sample is empty, too small, or contains NaN/Inf.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A scalar parameter is outside its domain (α, sides, test kind,
    /// confidence level, degrees of freedom).
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// Paired operation given samples of different lengths.
    #[error("sample sizes must be equal (got {left} and {right})")]
    SampleSizeMismatch {
        /// Length of the first sample.
        left: usize,
        /// Length of the second sample.
        right: usize,
    },

    /// Fewer groups than the test requires.
    #[error("requires {required} or more samples (got {got})")]
    InsufficientGroups {
        /// Minimum number of groups.
        required: usize,
        /// Number of groups supplied.
        got: usize,
    },

    /// Repeated-measures design given groups of different sizes.
    #[error("requires equal sample sizes (group {group} has {got}, expected {expected})")]
    UnequalSampleSizes {
        /// Index of the first offending group.
        group: usize,
        /// Size of the offending group.
        got: usize,
        /// Size of the first group.
        expected: usize,
    },
}

impl TestError {
    pub(crate) fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub(crate) fn invalid_parameter(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// Rejects samples with fewer than `min_len` values or any non-finite value.
pub(crate) fn check_sample(data: &[f64], min_len: usize, what: &str) -> Result<()> {
    if data.len() < min_len {
        return Err(TestError::invalid_input(format!(
            "{what} requires at least {min_len} observations (got {})",
            data.len()
        )));
    }
    if let Some(pos) = data.iter().position(|v| !v.is_finite()) {
        return Err(TestError::invalid_input(format!(
            "{what} contains a non-finite value at position {pos}"
        )));
    }
    Ok(())
}

/// Validates a set of independent groups for the k-sample tests.
pub(crate) fn check_groups(groups: &[&[f64]], min_groups: usize, min_len: usize) -> Result<()> {
    if groups.len() < min_groups {
        return Err(TestError::InsufficientGroups {
            required: min_groups,
            got: groups.len(),
        });
    }
    for (i, g) in groups.iter().enumerate() {
        check_sample(g, min_len, &format!("group {i}"))?;
    }
    Ok(())
}

/// Validates that all groups share the first group's length.
pub(crate) fn check_equal_sizes(groups: &[&[f64]]) -> Result<usize> {
    let expected = groups.first().map_or(0, |g| g.len());
    for (group, g) in groups.iter().enumerate() {
        if g.len() != expected {
            return Err(TestError::UnequalSampleSizes {
                group,
                got: g.len(),
                expected,
            });
        }
    }
    Ok(expected)
}

/// Validates that two paired samples have the same length.
pub(crate) fn check_paired(a: &[f64], b: &[f64]) -> Result<()> {
    if a.len() != b.len() {
        return Err(TestError::SampleSizeMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    Ok(())
}
