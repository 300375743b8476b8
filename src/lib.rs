//! # u-hypothesis
//!
//! Hypothesis tests, post-hoc comparisons, normality and outlier
//! diagnostics, and sample-size/power analysis.
//!
//! Every function operates on raw `f64` samples and returns a plain result
//! struct carrying the statistic, its critical value at the requested α and
//! the p-value. Nothing is printed or formatted; presentation is left to the
//! caller.
//!
//! ## Modules
//!
//! - [`parametric`]: t-tests, one-way and repeated-measures ANOVA, Scheffé
//!   and Tukey post-hoc, F and Bartlett variance tests, confidence
//!   intervals, Pearson correlation, simple linear regression
//! - [`nonparametric`]: Wilcoxon rank-sum and signed-rank, Kruskal-Wallis,
//!   Friedman, Dunn and pairwise Wilcoxon post-hoc
//! - [`normality`]: Shapiro-Wilk with skewness and kurtosis
//! - [`outliers`]: generalized ESD outlier detection
//! - [`power`]: minimum sample sizes and achieved power
//! - [`analysis`]: end-to-end workflows combining the above
//! - [`descriptive`], [`ranking`], [`distribution`]: shared building blocks
//!
//! ## Design Philosophy
//!
//! - **Errors, not panics**: invalid input yields a [`TestError`]
//! - **Inputs are borrowed**: callers' slices are never reordered
//! - **Research-backed**: algorithms reference the statistical literature

pub mod analysis;
pub mod config;
pub mod descriptive;
pub mod distribution;
pub mod error;
pub mod nonparametric;
pub mod normality;
pub mod outliers;
pub mod parametric;
pub mod posthoc;
pub mod power;
pub mod ranking;

pub use config::{Alternative, Correction, PowerDesign, Significance, TestOptions};
pub use error::{Result, TestError};
