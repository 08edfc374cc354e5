//! Comparison of two taxa summaries.

mod runner;

pub use runner::{
    compare_taxa_summaries, compute_all_to_expected_correlations, compute_paired_correlations,
    Comparer, Comparison, ComparisonConfig, ComparisonMode,
};
