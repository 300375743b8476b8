//! Rank-based nonparametric tests.
//!
//! - [`wilcoxon_rank_sum`]: two independent samples
//! - [`wilcoxon_signed_rank`], [`wilcoxon_signed_rank_single`]: paired
//!   samples, or one sample against a reference value
//! - [`kruskal_wallis`]: k independent samples
//! - [`friedman`]: k related samples
//! - [`dunn_posttest`], [`wilcoxon_rank_sum_posttest`],
//!   [`wilcoxon_signed_rank_posttest`]: pairwise follow-up
//!
//! Small samples are judged against exact α = 0.05 critical-value tables;
//! p-values always come from the normal approximation.

mod friedman;
mod kruskal;
mod posthoc;
mod tables;
mod wilcoxon;

pub use friedman::{friedman, FriedmanResult};
pub use kruskal::{kruskal_wallis, KruskalWallisResult};
pub use posthoc::{dunn_posttest, wilcoxon_rank_sum_posttest, wilcoxon_signed_rank_posttest};
pub use wilcoxon::{
    wilcoxon, wilcoxon_rank_sum, wilcoxon_signed_rank, wilcoxon_signed_rank_single, RankSumResult,
    SignedRankResult, WilcoxonKind, WilcoxonResult,
};
