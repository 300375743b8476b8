//! Sample-size and power estimation for mean comparisons.
//!
//! Sizes follow the normal-approximation formula
//! n ∝ σ²(Z_α + Z_β)²/Δ², inflated by 15 % for rank-based tests. Achieved
//! power is found by a grid search over power 0.000, 0.001, …, 1.000 for
//! the value whose implied size best matches the observed one.
//!
//! # Examples
//!
//! ```
//! use u_hypothesis::config::PowerDesign;
//! use u_hypothesis::power::power_two_sample;
//!
//! let a = [12.1, 13.4, 11.8, 12.9, 13.0, 12.5, 11.9, 12.7];
//! let b = [13.0, 14.1, 12.2, 13.8, 13.1, 13.9, 12.8, 13.5];
//! let report = power_two_sample(&a, &b, &PowerDesign::default()).unwrap().unwrap();
//! assert_eq!(report.n_at_80, 10.0);
//! assert!(report.achieved_power > 70.0 && report.achieved_power < 72.0);
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::{Correction, PowerDesign};
use crate::descriptive::mean_var;
use crate::distribution::norm_inv;
use crate::error::{check_groups, check_paired, check_sample, Result, TestError};
use crate::posthoc::pairs;

/// Floor for the squared mean difference.
const MIN_DIFF_SQ: f64 = 1e-300;

/// Inflation applied for nonparametric tests.
const NONPARAMETRIC_FACTOR: f64 = 1.15;

/// Step of the achieved-power grid.
const GRID_STEP: f64 = 0.001;

/// Sample sizes at three reference powers plus the achieved power.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PowerReport {
    /// Minimum sample size for 20 % power, rounded up.
    pub n_at_20: f64,
    /// Minimum sample size for 50 % power, rounded up.
    pub n_at_50: f64,
    /// Minimum sample size for 80 % power, rounded up.
    pub n_at_80: f64,
    /// Power achieved with the observed sample sizes, in percent.
    pub achieved_power: f64,
}

/// Effect size and variance of a design; `size` maps a power to a sample size.
struct Effect {
    z_alpha: f64,
    /// σ² times the allocation factor, divided by Δ².
    scale: f64,
    parametric: bool,
}

impl Effect {
    fn size(&self, power: f64) -> f64 {
        let n = self.scale * (self.z_alpha + norm_inv(power)).powi(2);
        if self.parametric {
            n
        } else {
            n * NONPARAMETRIC_FACTOR
        }
    }

    /// First grid power minimizing `mismatch(size(power))`, in percent.
    fn achieved(&self, mismatch: impl Fn(f64) -> f64) -> f64 {
        let mut best_diff = 100_000.0;
        let mut best = 0.0;
        for step in 0..=1000_u32 {
            let power = f64::from(step) * GRID_STEP;
            let diff = mismatch(self.size(power));
            if diff < best_diff {
                best_diff = diff;
                best = power;
            }
        }
        best * 100.0
    }

    fn report(&self, mismatch: impl Fn(f64) -> f64) -> PowerReport {
        let report = PowerReport {
            n_at_20: self.size(0.2).ceil(),
            n_at_50: self.size(0.5).ceil(),
            n_at_80: self.size(0.8).ceil(),
            achieved_power: self.achieved(mismatch),
        };
        tracing::debug!(
            n_at_80 = report.n_at_80,
            achieved_power = report.achieved_power,
            "power report"
        );
        report
    }
}

fn z_alpha(design: &PowerDesign) -> f64 {
    norm_inv(1.0 - design.alpha / f64::from(design.sides))
}

fn two_sample_effect(a: &[f64], b: &[f64], design: &PowerDesign) -> Result<(Effect, f64)> {
    design.validate()?;
    check_sample(a, 2, "first sample")?;
    check_sample(b, 2, "second sample")?;
    let (mean_a, var_a) = mean_var(a);
    let (mean_b, var_b) = mean_var(b);
    let diff = mean_a - mean_b;

    let scale = if design.paired {
        check_paired(a, b)?;
        let d: Vec<f64> = a.iter().zip(b).map(|(x, y)| y - x).collect();
        let (_, var_d) = mean_var(&d);
        2.0 * var_d
    } else {
        let (n1, n2) = (a.len() as f64, b.len() as f64);
        let r = n1.max(n2) / n1.min(n2);
        (r + 1.0) / r * (var_a + var_b) / 2.0
    };

    let effect = Effect {
        z_alpha: z_alpha(design),
        scale: scale / (diff * diff).max(MIN_DIFF_SQ),
        parametric: design.parametric,
    };
    Ok((effect, diff))
}

fn one_sample_effect(sample: &[f64], target: f64, design: &PowerDesign) -> Result<(Effect, f64)> {
    design.validate()?;
    check_sample(sample, 2, "sample")?;
    if !target.is_finite() {
        return Err(TestError::invalid_parameter(
            "target",
            format!("must be finite (got {target})"),
        ));
    }
    let (mean, var) = mean_var(sample);
    let diff = target - mean;
    let effect = Effect {
        z_alpha: z_alpha(design),
        scale: var / (diff * diff).max(MIN_DIFF_SQ),
        parametric: design.parametric,
    };
    Ok((effect, diff))
}

// ---------------------------------------------------------------------------
// Two samples
// ---------------------------------------------------------------------------

/// Minimum per-group sample size to detect the observed mean difference
/// between `a` and `b` with `design.power`.
///
/// # Algorithm
///
/// Z_α = Φ⁻¹(1 − α/sides), Z_β = Φ⁻¹(power), Δ = x̄_a − x̄_b.
///
/// - Independent: n = ((r+1)/r)·σ²(Z_α + Z_β)²/Δ², σ² = (s_a² + s_b²)/2,
///   r = n_max/n_min.
/// - Paired: n = 2σ_d²(Z_α + Z_β)²/Δ², σ_d the SD of the differences.
///
/// Multiplied by 1.15 for nonparametric designs. The result is not rounded.
///
/// # Errors
///
/// `InvalidInput` for samples with fewer than 2 values,
/// `SampleSizeMismatch` for paired samples of different lengths,
/// `InvalidParameter` for an invalid design.
pub fn min_sample_size_two_sample(a: &[f64], b: &[f64], design: &PowerDesign) -> Result<f64> {
    let (effect, _) = two_sample_effect(a, b, design)?;
    Ok(effect.size(design.power))
}

/// Power (percent) at which the implied total size 2n best matches
/// n_a + n_b. `design.power` is ignored.
pub fn achieved_power_two_sample(a: &[f64], b: &[f64], design: &PowerDesign) -> Result<f64> {
    let (effect, _) = two_sample_effect(a, b, design)?;
    let total = (a.len() + b.len()) as f64;
    Ok(effect.achieved(|n| (2.0 * n - total).abs()))
}

/// Sample sizes at 20/50/80 % power and the achieved power for two samples.
///
/// Returns `Ok(None)` when the sample means are exactly equal.
pub fn power_two_sample(a: &[f64], b: &[f64], design: &PowerDesign) -> Result<Option<PowerReport>> {
    let (effect, diff) = two_sample_effect(a, b, design)?;
    if diff == 0.0 {
        return Ok(None);
    }
    let total = (a.len() + b.len()) as f64;
    Ok(Some(effect.report(|n| (2.0 * n - total).abs())))
}

// ---------------------------------------------------------------------------
// One sample
// ---------------------------------------------------------------------------

/// Minimum sample size to detect the difference between the sample mean and
/// `target`: n = (Z_α + Z_β)²·s²/Δ² (×1.15 nonparametric). `design.paired`
/// is ignored.
///
/// # Examples
///
/// ```
/// use u_hypothesis::config::PowerDesign;
/// use u_hypothesis::power::min_sample_size_one_sample;
///
/// let s = [5.3, 4.8, 6.1, 5.9, 6.4, 5.7, 6.8, 5.2, 6.0];
/// let n = min_sample_size_one_sample(&s, 5.0, &PowerDesign::default()).unwrap();
/// assert!((n - 4.783).abs() < 1e-3);
/// ```
pub fn min_sample_size_one_sample(sample: &[f64], target: f64, design: &PowerDesign) -> Result<f64> {
    let (effect, _) = one_sample_effect(sample, target, design)?;
    Ok(effect.size(design.power))
}

/// Power (percent) at which the implied size best matches the sample size.
pub fn achieved_power_one_sample(sample: &[f64], target: f64, design: &PowerDesign) -> Result<f64> {
    let (effect, _) = one_sample_effect(sample, target, design)?;
    let n1 = sample.len() as f64;
    Ok(effect.achieved(|n| (n - n1).abs()))
}

/// Sample sizes at 20/50/80 % power and the achieved power for one sample.
///
/// Returns `Ok(None)` when the sample mean equals `target`.
pub fn power_one_sample(sample: &[f64], target: f64, design: &PowerDesign) -> Result<Option<PowerReport>> {
    let (effect, diff) = one_sample_effect(sample, target, design)?;
    if diff == 0.0 {
        return Ok(None);
    }
    let n1 = sample.len() as f64;
    Ok(Some(effect.report(|n| (n - n1).abs())))
}

// ---------------------------------------------------------------------------
// k samples
// ---------------------------------------------------------------------------

/// Power report for a k-sample design, based on the pair of groups whose
/// means are closest (the hardest difference to detect).
///
/// The test is two-sided regardless of `design.sides`; α is divided by the
/// number of pairs under [`Correction::Bonferroni`].
///
/// # Errors
///
/// `InsufficientGroups` for fewer than 2 groups, plus the two-sample errors.
pub fn power_k_sample(
    groups: &[&[f64]],
    design: &PowerDesign,
    correction: Correction,
) -> Result<Option<PowerReport>> {
    check_groups(groups, 2, 2)?;
    let means: Vec<f64> = groups.iter().map(|g| mean_var(g).0).collect();

    let mut closest = (0, 1);
    let mut smallest = f64::INFINITY;
    for (i, j) in pairs(groups.len()) {
        let d = (means[i] - means[j]).abs();
        if d < smallest {
            smallest = d;
            closest = (i, j);
        }
    }
    tracing::debug!(pair = ?closest, diff = smallest, "k-sample power pair");

    let pair_design = PowerDesign {
        sides: 2,
        alpha: correction.apply(design.alpha, groups.len()),
        ..*design
    };
    power_two_sample(groups[closest.0], groups[closest.1], &pair_design)
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: [f64; 8] = [12.1, 13.4, 11.8, 12.9, 13.0, 12.5, 11.9, 12.7];
    const B: [f64; 8] = [13.0, 14.1, 12.2, 13.8, 13.1, 13.9, 12.8, 13.5];

    #[test]
    fn independent_sizes() {
        let design = PowerDesign::default();
        let n = min_sample_size_two_sample(&A, &B, &design).expect("should compute");
        assert!((n - 9.910314).abs() < 1e-4, "n = {n}");
        let r = power_two_sample(&A, &B, &design).expect("should compute").expect("means differ");
        assert_eq!((r.n_at_20, r.n_at_50, r.n_at_80), (2.0, 5.0, 10.0));
        assert!((r.achieved_power - 71.1).abs() < 1e-9, "power = {}", r.achieved_power);
    }

    #[test]
    fn nonparametric_inflates() {
        let design = PowerDesign {
            parametric: false,
            ..PowerDesign::default()
        };
        let n = min_sample_size_two_sample(&A, &B, &design).expect("should compute");
        assert!((n - 11.396861).abs() < 1e-4, "n = {n}");
        let p = achieved_power_two_sample(&A, &B, &design).expect("should compute");
        assert!((p - 65.1).abs() < 1e-9, "power = {p}");
    }

    #[test]
    fn paired_uses_difference_sd() {
        let design = PowerDesign {
            paired: true,
            ..PowerDesign::default()
        };
        let n = min_sample_size_two_sample(&A, &B, &design).expect("should compute");
        assert!((n - 4.006554).abs() < 1e-4, "n = {n}");
        let r = power_two_sample(&A, &B, &design).expect("should compute").expect("means differ");
        assert_eq!((r.n_at_20, r.n_at_50, r.n_at_80), (1.0, 2.0, 5.0));
        assert!((r.achieved_power - 97.7).abs() < 1e-9);
    }

    #[test]
    fn one_sided_needs_fewer() {
        let design = PowerDesign {
            sides: 1,
            ..PowerDesign::default()
        };
        let n = min_sample_size_two_sample(&A, &B, &design).expect("should compute");
        assert!((n - 7.806348).abs() < 1e-4, "n = {n}");
    }

    #[test]
    fn one_sample_report() {
        let s = [5.3, 4.8, 6.1, 5.9, 6.4, 5.7, 6.8, 5.2, 6.0];
        let r = power_one_sample(&s, 5.0, &PowerDesign::default())
            .expect("should compute")
            .expect("means differ");
        assert_eq!((r.n_at_20, r.n_at_50, r.n_at_80), (1.0, 3.0, 5.0));
        assert!((r.achieved_power - 97.0).abs() < 1e-9, "power = {}", r.achieved_power);
    }

    #[test]
    fn equal_means_give_none() {
        let a = [1.0, 2.0, 3.0];
        let b = [3.0, 2.0, 1.0];
        assert_eq!(power_two_sample(&a, &b, &PowerDesign::default()), Ok(None));
        assert_eq!(power_one_sample(&a, 2.0, &PowerDesign::default()), Ok(None));
        // sizes stay finite thanks to the Δ² floor
        let n = min_sample_size_two_sample(&a, &b, &PowerDesign::default()).expect("finite");
        assert!(n.is_finite());
    }

    #[test]
    fn k_sample_uses_closest_pair() {
        let c = [15.0, 16.1, 14.8, 15.5, 16.0, 15.2, 14.9, 15.7];
        let groups: [&[f64]; 3] = [&A, &c, &B];
        let k = power_k_sample(&groups, &PowerDesign::default(), Correction::None)
            .expect("should compute");
        let two = power_two_sample(&A, &B, &PowerDesign::default()).expect("should compute");
        assert_eq!(k, two);

        let corrected = power_k_sample(&groups, &PowerDesign::default(), Correction::Bonferroni)
            .expect("should compute")
            .expect("means differ");
        assert!(corrected.n_at_80 > 10.0);
    }

    #[test]
    fn invalid_design_rejected() {
        let bad = PowerDesign {
            sides: 3,
            ..PowerDesign::default()
        };
        assert!(min_sample_size_two_sample(&A, &B, &bad).is_err());
        let paired = PowerDesign {
            paired: true,
            ..PowerDesign::default()
        };
        assert!(matches!(
            min_sample_size_two_sample(&A, &B[..5], &paired),
            Err(TestError::SampleSizeMismatch { .. })
        ));
    }
}
