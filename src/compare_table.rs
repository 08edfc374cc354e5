//! Batch comparison of taxonomy assignment runs against expected "key" tables.
//!
//! A root directory produced by the assignment workflow is walked for
//! per-level taxa summaries (`otu_table_mc2_w_taxa_L<level>.txt`). Each one is
//! compared with the key table of its study and the Pearson and Spearman
//! coefficients are collected into one table per level.

use crate::compare::{compare_taxa_summaries, ComparisonMode};
use crate::data::TaxaSummary;
use crate::error::{Result, TaxCompareError};
use crate::stats::CorrelationType;
use crate::util::capitalize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

/// Directory-name fragments identifying taxonomy assignment run directories.
pub const ASSIGNMENT_METHOD_CHOICES: [&str; 5] = ["rdp", "blast", "rtax", "mothur", "tax2tree"];

/// Taxonomy levels that can be compared.
pub const DEFAULT_LEVELS: [u8; 5] = [2, 3, 4, 5, 6];

const RUN_TABLE_PREFIX: &str = "otu_table_mc2_w_taxa_L";

/// Placeholder recorded when a run shares no samples with its key.
pub const NO_MATCH: &str = "X";

/// Formatted (Pearson, Spearman) coefficients.
pub type Coefficients = (String, String);

/// Results for one level: dataset name -> run id -> coefficients.
pub type CompareTable = BTreeMap<String, BTreeMap<String, Coefficients>>;

/// Find key files in `directory`, keyed by study name.
///
/// The study name is the file name up to the first `_`, capitalized, so
/// `L18S_key.txt` belongs to study `L18s`.
pub fn get_key_files<P: AsRef<Path>>(directory: P) -> Result<BTreeMap<String, PathBuf>> {
    let directory = directory.as_ref();
    if !directory.is_dir() {
        return Err(TaxCompareError::Workflow(format!(
            "The key directory '{}' does not exist.",
            directory.display()
        )));
    }

    let mut key_fps = BTreeMap::new();
    for entry in fs::read_dir(directory)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy().into_owned();
        let study = file_name.split('_').next().unwrap_or_default();
        key_fps.insert(capitalize(study), entry.path());
    }

    if key_fps.is_empty() {
        return Err(TaxCompareError::Workflow(format!(
            "There are no key files in '{}'.",
            directory.display()
        )));
    }
    Ok(key_fps)
}

/// Paired Pearson and Spearman coefficients of `run` against `key`.
///
/// Coefficients are taken from the last compared sample pair and formatted
/// with four decimals.
pub fn get_coefficients(run: &TaxaSummary, key: &TaxaSummary) -> Result<Coefficients> {
    let coefficient = |correlation_type: CorrelationType| -> Result<String> {
        let comparison =
            compare_taxa_summaries(run, key, ComparisonMode::Paired, correlation_type, None)?;
        let last = comparison.report.records.last().ok_or_else(|| {
            TaxCompareError::EmptyData("Comparison produced no correlations".to_string())
        })?;
        Ok(format!("{:.4}", last.coefficient))
    };

    Ok((
        coefficient(CorrelationType::Pearson)?,
        coefficient(CorrelationType::Spearman)?,
    ))
}

/// Compare every run table under `root` with its study's key table.
///
/// Run directories are those whose path below `root` contains one of
/// [`ASSIGNMENT_METHOD_CHOICES`]. A run table at `<root>/.../<dataset>/<run_id>/`
/// is matched to the key of study `<dataset>` with trailing `-`, `1`, `2` and
/// `3` characters removed.
///
/// # Returns
/// One table per entry of `levels`, in the same order.
///
/// # Errors
/// - a level outside 2..=6
/// - `root` or `key_directory` does not exist, or there are no key files
/// - no key file for a run's study
/// - a run or key table cannot be parsed
pub fn generate_taxa_compare_table<P: AsRef<Path>, Q: AsRef<Path>>(
    root: P,
    key_directory: Q,
    levels: &[u8],
) -> Result<Vec<CompareTable>> {
    let root = root.as_ref();
    if let Some(bad) = levels.iter().find(|l| !DEFAULT_LEVELS.contains(l)) {
        return Err(TaxCompareError::Workflow(format!(
            "Invalid level {}: levels must be between 2 and 6 inclusive.",
            bad
        )));
    }
    if !root.is_dir() {
        return Err(TaxCompareError::Workflow(format!(
            "The root directory '{}' does not exist.",
            root.display()
        )));
    }
    let key_fps = get_key_files(key_directory)?;

    let mut results = vec![CompareTable::new(); levels.len()];
    let mut keys: BTreeMap<PathBuf, TaxaSummary> = BTreeMap::new();

    for dir in walk_dirs(root)? {
        let relative = dir.strip_prefix(root).unwrap_or(&dir).to_string_lossy().into_owned();
        if !ASSIGNMENT_METHOD_CHOICES.iter().any(|m| relative.contains(m)) {
            continue;
        }

        let run_id = file_name_of(&dir);
        let dataset_dir = match dir.parent() {
            Some(parent) => file_name_of(parent),
            None => continue,
        };
        let dataset = capitalize(&dataset_dir);
        let study = capitalize(dataset_dir.trim_end_matches(['-', '1', '2', '3']));

        for (level, run_fp) in run_tables(&dir)? {
            let slot = match levels.iter().position(|&l| l == level) {
                Some(slot) => slot,
                None => continue,
            };
            let key_fp = key_fps.get(&study).ok_or_else(|| {
                TaxCompareError::Workflow(format!(
                    "No key file found for study '{}' (run '{}').",
                    study,
                    run_fp.display()
                ))
            })?;
            if !keys.contains_key(key_fp) {
                keys.insert(key_fp.clone(), TaxaSummary::from_tsv(key_fp)?);
            }
            let key = &keys[key_fp];
            let run = TaxaSummary::from_tsv(&run_fp)?;

            let coefficients = match get_coefficients(&run, key) {
                Ok(c) => c,
                Err(TaxCompareError::NoOverlap(_)) => {
                    log::warn!(
                        "No samples shared between {} and {}",
                        run_fp.display(),
                        key_fp.display()
                    );
                    (NO_MATCH.to_string(), NO_MATCH.to_string())
                }
                Err(e) => return Err(e),
            };
            log::debug!(
                "L{} {} {}: {:?}",
                level,
                dataset,
                run_id,
                coefficients
            );
            results[slot]
                .entry(dataset.clone())
                .or_default()
                .insert(run_id.clone(), coefficients);
        }
    }
    Ok(results)
}

/// Render compare tables as lines ready to write.
///
/// Each non-empty table gets a header `P<sep>S\t<run ids...>` and one line
/// per dataset with `pearson<sep>spearman` (or `N/A`) per run id. Empty
/// tables render as no lines.
pub fn format_output(tables: &[CompareTable], separator: &str) -> Vec<Vec<String>> {
    tables
        .iter()
        .map(|table| {
            if table.is_empty() {
                return Vec::new();
            }
            let methods: BTreeSet<&String> = table.values().flat_map(|runs| runs.keys()).collect();

            let mut lines = Vec::with_capacity(table.len() + 1);
            let header: Vec<&str> = methods.iter().map(|m| m.as_str()).collect();
            lines.push(format!("P{}S\t{}\n", separator, header.join("\t")));

            for (dataset, runs) in table {
                let mut line = format!("{}\t", dataset);
                for method in &methods {
                    match runs.get(*method) {
                        Some((pearson, spearman)) => {
                            line.push_str(&format!("{}{}{}\t", pearson, separator, spearman))
                        }
                        None => line.push_str("N/A\t"),
                    }
                }
                line.push('\n');
                lines.push(line);
            }
            lines
        })
        .collect()
}

/// All directories under `root` (including `root`), sorted.
fn walk_dirs(root: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs = vec![root.to_path_buf()];
    let mut i = 0;
    while i < dirs.len() {
        let mut children = Vec::new();
        for entry in fs::read_dir(&dirs[i])? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                children.push(entry.path());
            }
        }
        children.sort();
        dirs.extend(children);
        i += 1;
    }
    Ok(dirs)
}

/// Per-level run tables directly inside `dir`, as (level, path).
fn run_tables(dir: &Path) -> Result<Vec<(u8, PathBuf)>> {
    let mut tables = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        let level = name
            .strip_prefix(RUN_TABLE_PREFIX)
            .and_then(|rest| rest.strip_suffix(".txt"))
            .and_then(|l| l.parse::<u8>().ok());
        if let Some(level) = level {
            tables.push((level, entry.path()));
        }
    }
    tables.sort();
    Ok(tables)
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
