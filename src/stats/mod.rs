//! Rank and correlation statistics for comparing samples.

pub mod correlation;
pub mod rank;

pub use correlation::{pearson, spearman, CorrelationFn, CorrelationType};
pub use rank::{rank, Ranks};
