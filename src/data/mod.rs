//! Data structures for comparing taxa summaries.

mod report;
mod sample_id_map;
mod taxa_summary;

pub use report::{CorrelationRecord, CorrelationReport};
pub use sample_id_map::SampleIdMap;
pub use taxa_summary::{TaxaSummary, TAXON_HEADER};
