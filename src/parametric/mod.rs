//! Parametric tests.
//!
//! - [`confidence_interval`]: interval for a sample mean
//! - [`t_test`], [`one_sample_t_test`]: pooled, Welch, paired and
//!   single-sample t-tests
//! - [`f_test`], [`bartlett_test`]: equality of variances
//! - [`one_way_anova`], [`repeated_measures_anova`]: analysis of variance
//! - [`pearson_correlation`], [`linear_regression`]: association
//! - [`scheffe_posttest`], [`tukey_posttest`], [`tukey_rm_posttest`]:
//!   pairwise follow-up after ANOVA
//!
//! # Examples
//!
//! ```
//! use u_hypothesis::config::TestOptions;
//! use u_hypothesis::parametric::{t_test, TTestKind};
//!
//! let a = [5.1, 4.9, 5.2, 5.0, 4.8];
//! let b = [5.0, 5.1, 4.9, 5.2, 4.9];
//! let r = t_test(&a, &b, TTestKind::Pooled, &TestOptions::default()).unwrap();
//! assert!(r.p_value > 0.05); // cannot reject H₀: μ_a = μ_b
//! ```

mod anova;
mod confidence;
mod correlation;
mod posthoc;
mod regression;
mod ttest;
mod variance;

pub use anova::{one_way_anova, repeated_measures_anova, AnovaResult, RmAnovaResult};
pub use confidence::{confidence_interval, ConfidenceInterval, ConfidenceLevel};
pub use correlation::{pearson_correlation, CorrelationResult};
pub use posthoc::{scheffe_posttest, tukey_posttest, tukey_rm_posttest};
pub use regression::{linear_regression, RegressionResult};
pub use ttest::{one_sample_t_test, t_test, t_test_with_difference, TTestKind, TTestResult};
pub use variance::{bartlett_test, f_test, BartlettResult, FTestResult};
