//! Alignment of taxa summaries before comparison.
//!
//! - **sort_fill**: unify the taxa (rows) of several tables
//! - **compatible**: pair up sample columns between two aligned tables

pub mod compatible;
pub mod sort_fill;

pub use compatible::{ensure_same_taxa, make_compatible};
pub use sort_fill::{fill_taxa, master_taxa, sort_and_fill};
