//! Matching sample columns between two aligned taxa summaries.

use crate::data::{SampleIdMap, TaxaSummary};
use crate::error::{Result, TaxCompareError};
use std::collections::HashMap;

/// Check that two tables share the exact same taxa in the same order.
pub fn ensure_same_taxa(ts1: &TaxaSummary, ts2: &TaxaSummary) -> Result<()> {
    if ts1.taxa() != ts2.taxa() {
        return Err(TaxCompareError::TaxaMismatch(
            "The taxa do not match exactly between the two taxa summaries. \
             The taxa must be sorted and filled before comparing them."
                .to_string(),
        ));
    }
    Ok(())
}

/// Select matching sample columns from two taxa-aligned summaries.
///
/// Samples are visited in the first table's order. Without a map a sample
/// is kept when the second table has a sample with the same ID. With a map,
/// the mapped ID is used instead and must exist in the second table; first
/// table samples without a map entry are skipped.
///
/// # Returns
/// Two tables with the same number of samples, where column `i` of the first
/// is paired with column `i` of the second.
///
/// # Errors
/// - taxa differ between the two tables
/// - a map key is not a sample in the first table
/// - a mapped ID is not a sample in the second table
/// - no samples could be paired
pub fn make_compatible(
    ts1: &TaxaSummary,
    ts2: &TaxaSummary,
    sample_id_map: Option<&SampleIdMap>,
) -> Result<(TaxaSummary, TaxaSummary)> {
    ensure_same_taxa(ts1, ts2)?;

    if let Some(map) = sample_id_map {
        if let Some(missing) = map.keys().find(|k| ts1.sample_index(k).is_none()) {
            return Err(TaxCompareError::SampleIdMap(format!(
                "sample ID '{}' in the sample ID map is not in the first taxa summary",
                missing
            )));
        }
    }

    let ts2_index: HashMap<&str, usize> = ts2
        .sample_ids()
        .iter()
        .enumerate()
        .map(|(idx, s)| (s.as_str(), idx))
        .collect();

    let mut cols1 = Vec::new();
    let mut cols2 = Vec::new();
    for (idx1, sample_id) in ts1.sample_ids().iter().enumerate() {
        let matching_id = match sample_id_map {
            Some(map) => match map.get(sample_id) {
                Some(target) => target,
                None => continue,
            },
            None => sample_id.as_str(),
        };

        match ts2_index.get(matching_id) {
            Some(&idx2) => {
                cols1.push(idx1);
                cols2.push(idx2);
            }
            None if sample_id_map.is_some() => {
                return Err(TaxCompareError::SampleIdMap(format!(
                    "sample ID '{}' (mapped from '{}') is not in the second taxa summary",
                    matching_id, sample_id
                )));
            }
            None => {}
        }
    }

    if cols1.is_empty() {
        return Err(TaxCompareError::NoOverlap(
            "No sample IDs could be matched between the taxa summaries. \
             Check the sample IDs or provide a sample ID map."
                .to_string(),
        ));
    }
    log::debug!("Matched {} sample pairs", cols1.len());

    Ok((ts1.select_samples(&cols1)?, ts2.select_samples(&cols2)?))
}
