//! Taxa summary tables: relative abundances of taxa across samples.

use crate::error::{Result, TaxCompareError};
use crate::util::format_float;
use nalgebra::DMatrix;
use std::collections::HashSet;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Header label of the first column in a taxa summary file.
pub const TAXON_HEADER: &str = "Taxon";

/// A taxa summary table storing abundances of taxa across samples.
///
/// Rows represent taxa (lineage strings, treated as opaque labels), columns
/// represent samples. The table is an immutable value: alignment and sample
/// matching always produce new tables.
#[derive(Debug, Clone, PartialEq)]
pub struct TaxaSummary {
    /// Dense matrix (taxa × samples)
    data: DMatrix<f64>,
    /// Taxon labels (row names)
    taxa: Vec<String>,
    /// Sample identifiers (column names)
    sample_ids: Vec<String>,
}

impl TaxaSummary {
    /// Create a new TaxaSummary from a matrix and its labels.
    pub fn new(data: DMatrix<f64>, taxa: Vec<String>, sample_ids: Vec<String>) -> Result<Self> {
        let (nrows, ncols) = data.shape();
        if nrows != taxa.len() {
            return Err(TaxCompareError::DimensionMismatch {
                expected: nrows,
                actual: taxa.len(),
            });
        }
        if ncols != sample_ids.len() {
            return Err(TaxCompareError::DimensionMismatch {
                expected: ncols,
                actual: sample_ids.len(),
            });
        }
        Ok(Self {
            data,
            taxa,
            sample_ids,
        })
    }

    /// Create a table from row-major values (one inner vector per taxon).
    pub fn from_rows<S: AsRef<str>>(
        sample_ids: &[S],
        taxa: &[S],
        rows: &[Vec<f64>],
    ) -> Result<Self> {
        if rows.len() != taxa.len() {
            return Err(TaxCompareError::DimensionMismatch {
                expected: taxa.len(),
                actual: rows.len(),
            });
        }
        let n_samples = sample_ids.len();
        if let Some(bad) = rows.iter().find(|row| row.len() != n_samples) {
            return Err(TaxCompareError::DimensionMismatch {
                expected: n_samples,
                actual: bad.len(),
            });
        }
        let data = DMatrix::from_fn(taxa.len(), n_samples, |r, c| rows[r][c]);
        Self::new(
            data,
            taxa.iter().map(|t| t.as_ref().to_string()).collect(),
            sample_ids.iter().map(|s| s.as_ref().to_string()).collect(),
        )
    }

    /// Load a taxa summary table from a TSV file.
    pub fn from_tsv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Parse a taxa summary table.
    ///
    /// Expected format:
    /// - First row: `Taxon` followed by tab-separated sample IDs
    /// - Subsequent rows: taxon label followed by one abundance per sample
    ///
    /// Blank lines and `#` comment lines are skipped.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut lines = reader
            .lines()
            .map(|l| l.map(|s| s.trim_end_matches('\r').to_string()))
            .filter(|l| match l {
                Ok(s) => !s.trim().is_empty() && !s.starts_with('#'),
                Err(_) => true,
            });

        let header_line = lines
            .next()
            .ok_or_else(|| TaxCompareError::EmptyData("Empty taxa summary file".to_string()))??;
        if !header_line.starts_with(&format!("{}\t", TAXON_HEADER)) {
            return Err(TaxCompareError::MalformedTable(format!(
                "header must start with '{}\\t', found '{}'",
                TAXON_HEADER, header_line
            )));
        }
        let sample_ids: Vec<String> = header_line
            .split('\t')
            .skip(1)
            .map(|s| s.to_string())
            .collect();
        check_unique(&sample_ids, "sample ID")?;
        let n_samples = sample_ids.len();

        let mut taxa: Vec<String> = Vec::new();
        let mut values: Vec<f64> = Vec::new();

        for (row_idx, line_result) in lines.enumerate() {
            let line = line_result?;
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() != n_samples + 1 {
                return Err(TaxCompareError::MalformedTable(format!(
                    "row {} ('{}') has {} values, expected {}",
                    row_idx,
                    fields[0],
                    fields.len() - 1,
                    n_samples
                )));
            }
            taxa.push(fields[0].to_string());

            for (col_idx, value_str) in fields[1..].iter().enumerate() {
                let value: f64 = value_str
                    .trim()
                    .parse()
                    .ok()
                    .filter(|v: &f64| v.is_finite() && *v >= 0.0)
                    .ok_or_else(|| TaxCompareError::InvalidValue {
                        value: value_str.to_string(),
                        row: row_idx,
                        col: col_idx,
                    })?;
                values.push(value);
            }
        }

        if taxa.is_empty() {
            return Err(TaxCompareError::EmptyData(
                "No taxa in taxa summary file".to_string(),
            ));
        }
        check_unique(&taxa, "taxon")?;

        let data = DMatrix::from_row_slice(taxa.len(), n_samples, &values);
        Self::new(data, taxa, sample_ids)
    }

    /// Write the table to a TSV file.
    pub fn to_tsv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        write!(writer, "{}", self)?;
        writer.flush()?;
        Ok(())
    }

    /// Get the value at (row, col).
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[(row, col)]
    }

    /// Number of taxa (rows).
    #[inline]
    pub fn n_taxa(&self) -> usize {
        self.data.nrows()
    }

    /// Number of samples (columns).
    #[inline]
    pub fn n_samples(&self) -> usize {
        self.data.ncols()
    }

    /// Taxon labels.
    #[inline]
    pub fn taxa(&self) -> &[String] {
        &self.taxa
    }

    /// Sample identifiers.
    #[inline]
    pub fn sample_ids(&self) -> &[String] {
        &self.sample_ids
    }

    /// Get the underlying matrix.
    #[inline]
    pub fn data(&self) -> &DMatrix<f64> {
        &self.data
    }

    /// Position of a sample ID.
    pub fn sample_index(&self, sample_id: &str) -> Option<usize> {
        self.sample_ids.iter().position(|s| s == sample_id)
    }

    /// Position of a taxon label.
    pub fn taxon_index(&self, taxon: &str) -> Option<usize> {
        self.taxa.iter().position(|t| t == taxon)
    }

    /// Abundances of one taxon across all samples.
    pub fn row(&self, row: usize) -> Vec<f64> {
        self.data.row(row).iter().copied().collect()
    }

    /// Abundances of all taxa in one sample.
    pub fn column(&self, col: usize) -> Vec<f64> {
        self.data.column(col).iter().copied().collect()
    }

    /// Row for a taxon label, if present.
    pub fn row_by_taxon(&self, taxon: &str) -> Option<Vec<f64>> {
        self.taxon_index(taxon).map(|i| self.row(i))
    }

    /// Column for a sample ID, if present.
    pub fn column_by_id(&self, sample_id: &str) -> Option<Vec<f64>> {
        self.sample_index(sample_id).map(|j| self.column(j))
    }

    /// Build a new table from the given sample columns (by index), in order.
    ///
    /// The same column may be selected more than once.
    pub fn select_samples(&self, indices: &[usize]) -> Result<Self> {
        if let Some(&bad) = indices.iter().find(|&&i| i >= self.n_samples()) {
            return Err(TaxCompareError::InvalidConfiguration(format!(
                "Sample index {} out of bounds",
                bad
            )));
        }
        let data = DMatrix::from_fn(self.n_taxa(), indices.len(), |r, c| {
            self.data[(r, indices[c])]
        });
        let sample_ids = indices.iter().map(|&i| self.sample_ids[i].clone()).collect();
        Self::new(data, self.taxa.clone(), sample_ids)
    }
}

/// Renders the table in taxa summary file format.
impl fmt::Display for TaxaSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", TAXON_HEADER)?;
        for sample_id in &self.sample_ids {
            write!(f, "\t{}", sample_id)?;
        }
        writeln!(f)?;

        for (row_idx, taxon) in self.taxa.iter().enumerate() {
            write!(f, "{}", taxon)?;
            for col_idx in 0..self.n_samples() {
                write!(f, "\t{}", format_float(self.get(row_idx, col_idx)))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

fn check_unique(labels: &[String], what: &str) -> Result<()> {
    let mut seen = HashSet::with_capacity(labels.len());
    for label in labels {
        if !seen.insert(label.as_str()) {
            return Err(TaxCompareError::MalformedTable(format!(
                "duplicate {} '{}'",
                what, label
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::NamedTempFile;

    fn create_test_summary() -> TaxaSummary {
        TaxaSummary::from_rows(
            &["Even1", "Even2", "Even3"],
            &["Bacteria;Firmicutes", "Bacteria;Proteobacteria", "No blast hit;Other"],
            &[
                vec![0.5, 0.25, 0.0],
                vec![0.45, 0.7, 0.9],
                vec![0.05, 0.05, 0.1],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_dimensions() {
        let ts = create_test_summary();
        assert_eq!(ts.n_taxa(), 3);
        assert_eq!(ts.n_samples(), 3);
        assert_eq!(ts.get(1, 2), 0.9);
    }

    #[test]
    fn test_data_matrix() {
        let ts = create_test_summary();
        let data = ts.data();
        assert_eq!(data.shape(), (ts.n_taxa(), ts.n_samples()));
        assert_eq!(data[(1, 2)], ts.get(1, 2));
        assert_eq!(data.column(0).iter().copied().collect::<Vec<_>>(), ts.column(0));
    }

    #[test]
    fn test_dimension_mismatch() {
        let result = TaxaSummary::from_rows(&["S1", "S2"], &["A"], &[vec![0.1]]);
        assert!(matches!(
            result,
            Err(TaxCompareError::DimensionMismatch { expected: 2, actual: 1 })
        ));

        let data = DMatrix::zeros(2, 2);
        let result = TaxaSummary::new(data, vec!["A".to_string()], vec!["S1".to_string(), "S2".to_string()]);
        assert!(result.is_err());
    }

    #[test]
    fn test_accessors_by_label() {
        let ts = create_test_summary();
        assert_eq!(ts.column_by_id("Even2"), Some(vec![0.25, 0.7, 0.05]));
        assert_eq!(ts.row_by_taxon("No blast hit;Other"), Some(vec![0.05, 0.05, 0.1]));
        assert_eq!(ts.column_by_id("Missing"), None);
        assert_eq!(ts.taxon_index("Bacteria;Proteobacteria"), Some(1));
    }

    #[test]
    fn test_select_samples() {
        let ts = create_test_summary();
        let subset = ts.select_samples(&[2, 0, 0]).unwrap();
        assert_eq!(subset.sample_ids(), &["Even3", "Even1", "Even1"]);
        assert_eq!(subset.column(0), vec![0.0, 0.9, 0.1]);
        assert_eq!(subset.column(2), ts.column(0));
        assert!(ts.select_samples(&[3]).is_err());
    }

    #[test]
    fn test_format() {
        let ts = TaxaSummary::from_rows(&["Even7", "Even8"], &["Eukarya"], &[vec![1.0, 1.0]]).unwrap();
        assert_eq!(ts.to_string(), "Taxon\tEven7\tEven8\nEukarya\t1.0\t1.0\n");

        let ts = TaxaSummary::from_rows(
            &["Expected"],
            &["Eukarya", "Bacteria", "Archaea"],
            &[vec![0.5], vec![0.6], vec![0.4]],
        )
        .unwrap();
        assert_eq!(
            ts.to_string(),
            "Taxon\tExpected\nEukarya\t0.5\nBacteria\t0.6\nArchaea\t0.4\n"
        );
    }

    #[test]
    fn test_parse() {
        let text = "Taxon\tS1\tS2\r\nA;B\t0.4\t0.5\n\n# comment\nC\t1.88144984525e-05\t0\n";
        let ts = TaxaSummary::from_reader(Cursor::new(text)).unwrap();
        assert_eq!(ts.sample_ids(), &["S1", "S2"]);
        assert_eq!(ts.taxa(), &["A;B", "C"]);
        assert_eq!(ts.get(1, 0), 1.88144984525e-05);
        assert_eq!(ts.get(1, 1), 0.0);
    }

    #[test]
    fn test_parse_missing_header() {
        let result = TaxaSummary::from_reader(Cursor::new("Feature\tS1\nA\t0.1\n"));
        assert!(matches!(result, Err(TaxCompareError::MalformedTable(_))));
    }

    #[test]
    fn test_parse_ragged_row() {
        let result = TaxaSummary::from_reader(Cursor::new("Taxon\tS1\tS2\nA\t0.1\n"));
        assert!(matches!(result, Err(TaxCompareError::MalformedTable(_))));
    }

    #[test]
    fn test_parse_invalid_values() {
        let result = TaxaSummary::from_reader(Cursor::new("Taxon\tS1\nA\tabc\n"));
        assert!(matches!(
            result,
            Err(TaxCompareError::InvalidValue { row: 0, col: 0, .. })
        ));
        let result = TaxaSummary::from_reader(Cursor::new("Taxon\tS1\nA\t-0.2\n"));
        assert!(matches!(result, Err(TaxCompareError::InvalidValue { .. })));
    }

    #[test]
    fn test_parse_duplicates() {
        let result = TaxaSummary::from_reader(Cursor::new("Taxon\tS1\tS1\nA\t0.1\t0.2\n"));
        assert!(matches!(result, Err(TaxCompareError::MalformedTable(_))));
        let result = TaxaSummary::from_reader(Cursor::new("Taxon\tS1\nA\t0.1\nA\t0.2\n"));
        assert!(matches!(result, Err(TaxCompareError::MalformedTable(_))));
    }

    #[test]
    fn test_parse_empty() {
        assert!(matches!(
            TaxaSummary::from_reader(Cursor::new("")),
            Err(TaxCompareError::EmptyData(_))
        ));
        assert!(matches!(
            TaxaSummary::from_reader(Cursor::new("Taxon\tS1\n")),
            Err(TaxCompareError::EmptyData(_))
        ));
    }

    #[test]
    fn test_tsv_roundtrip() {
        let ts = create_test_summary();

        let temp_file = NamedTempFile::new().unwrap();
        ts.to_tsv(temp_file.path()).unwrap();

        let loaded = TaxaSummary::from_tsv(temp_file.path()).unwrap();
        assert_eq!(loaded, ts);
    }
}
