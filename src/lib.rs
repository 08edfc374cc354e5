//! Taxa Summary Comparison Library
//!
//! This library compares taxa summaries (taxon-by-sample relative abundance
//! tables), such as the output of different taxonomy assigners run on the
//! same sequences, or observed communities against a known mock community.
//!
//! # Overview
//!
//! The library is organized into composable modules:
//!
//! - **data**: Core data structures (TaxaSummary, SampleIdMap, CorrelationReport)
//! - **stats**: Correlation coefficients (Pearson, Spearman) and ranking
//! - **align**: Sorting/filling taxa and pairing samples between tables
//! - **compare**: Paired and expected comparisons of two taxa summaries
//! - **workflow**: Multiple taxonomy assignment command generation and execution
//! - **compare_table**: Batch comparison of assignment runs against key tables
//!
//! # Example
//!
//! ```no_run
//! use taxa_compare::prelude::*;
//!
//! let observed = TaxaSummary::from_tsv("observed.txt").unwrap();
//! let expected = TaxaSummary::from_tsv("expected.txt").unwrap();
//!
//! let comparison = Comparer::new(ComparisonMode::Expected)
//!     .correlation(CorrelationType::Spearman)
//!     .run(&observed, &expected)
//!     .unwrap();
//!
//! println!("{}", comparison.report);
//! ```

pub mod align;
pub mod compare;
pub mod compare_table;
pub mod data;
pub mod error;
pub mod stats;
pub mod util;
pub mod workflow;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::align::{ensure_same_taxa, make_compatible, sort_and_fill};
    pub use crate::compare::{
        compare_taxa_summaries, compute_all_to_expected_correlations, compute_paired_correlations,
        Comparer, Comparison, ComparisonConfig, ComparisonMode,
    };
    pub use crate::compare_table::{format_output, generate_taxa_compare_table, CompareTable};
    pub use crate::data::{CorrelationRecord, CorrelationReport, SampleIdMap, TaxaSummary};
    pub use crate::error::{Result, TaxCompareError};
    pub use crate::stats::{pearson, spearman, CorrelationType};
    pub use crate::workflow::{
        assign_taxonomy_multiple_times, AssignConfig, AssignmentMethod, CommandHandler,
        PrintCommands, SerialRunner,
    };
}
