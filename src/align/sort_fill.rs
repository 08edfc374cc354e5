//! Sorting and filling taxa summaries over a shared set of taxa.

use crate::data::TaxaSummary;
use crate::error::Result;
use nalgebra::DMatrix;
use std::collections::{BTreeSet, HashMap};

/// Sorted, de-duplicated union of the taxa in all tables.
pub fn master_taxa<'a, I>(tables: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a TaxaSummary>,
{
    tables
        .into_iter()
        .flat_map(|ts| ts.taxa().iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Re-express every table over the sorted union of all taxa.
///
/// Rows for taxa a table already has are copied verbatim; taxa it lacks get
/// an all-zero row. Sample IDs and their column order are never changed.
///
/// # Arguments
/// * `tables` - Taxa summaries to align (borrowed, never copied)
///
/// # Returns
/// One new table per input, in input order, all sharing the same taxa.
pub fn sort_and_fill<'a, I>(tables: I) -> Result<Vec<TaxaSummary>>
where
    I: IntoIterator<Item = &'a TaxaSummary>,
{
    let tables: Vec<&TaxaSummary> = tables.into_iter().collect();
    let taxa = master_taxa(tables.iter().copied());
    log::debug!(
        "Aligning {} taxa summaries over {} taxa",
        tables.len(),
        taxa.len()
    );

    tables.into_iter().map(|ts| fill_taxa(ts, &taxa)).collect()
}

/// Re-express a single table over `taxa`, zero-filling taxa it lacks.
pub fn fill_taxa(ts: &TaxaSummary, taxa: &[String]) -> Result<TaxaSummary> {
    let row_lookup: HashMap<&str, usize> = ts
        .taxa()
        .iter()
        .enumerate()
        .map(|(idx, t)| (t.as_str(), idx))
        .collect();
    let source_rows: Vec<Option<usize>> = taxa
        .iter()
        .map(|t| row_lookup.get(t.as_str()).copied())
        .collect();

    let n_missing = source_rows.iter().filter(|r| r.is_none()).count();
    if n_missing > 0 {
        log::debug!(
            "Zero-filling {} taxa absent from table with samples {:?}",
            n_missing,
            ts.sample_ids()
        );
    }

    let data = DMatrix::from_fn(taxa.len(), ts.n_samples(), |r, c| match source_rows[r] {
        Some(src) => ts.get(src, c),
        None => 0.0,
    });
    TaxaSummary::new(data, taxa.to_vec(), ts.sample_ids().to_vec())
}
