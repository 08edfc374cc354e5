//! Correlation results from comparing two taxa summaries.

use crate::compare::ComparisonMode;
use crate::error::Result;
use crate::stats::CorrelationType;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Correlation between one pair of samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationRecord {
    /// Sample ID in the first taxa summary.
    pub sample_id_1: String,
    /// Sample ID in the second taxa summary.
    pub sample_id_2: String,
    /// Correlation coefficient.
    pub coefficient: f64,
}

impl CorrelationRecord {
    /// Create a new record.
    pub fn new(sample_id_1: &str, sample_id_2: &str, coefficient: f64) -> Self {
        Self {
            sample_id_1: sample_id_1.to_string(),
            sample_id_2: sample_id_2.to_string(),
            coefficient,
        }
    }
}

/// All sample-pair correlations from one comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationReport {
    /// How samples were paired.
    pub mode: ComparisonMode,
    /// Correlation coefficient that was computed.
    pub correlation_type: CorrelationType,
    /// Comment written above the records (without the leading `#`).
    pub header: Option<String>,
    /// One record per compared sample pair.
    pub records: Vec<CorrelationRecord>,
}

impl CorrelationReport {
    /// Number of compared sample pairs.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Coefficient for a sample pair, if it was compared.
    pub fn coefficient(&self, sample_id_1: &str, sample_id_2: &str) -> Option<f64> {
        self.records
            .iter()
            .find(|r| r.sample_id_1 == sample_id_1 && r.sample_id_2 == sample_id_2)
            .map(|r| r.coefficient)
    }

    /// Write the report to a TSV file.
    pub fn to_tsv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        write!(writer, "{}", self)?;
        writer.flush()?;
        Ok(())
    }

    /// Serialize the report as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Renders the header comment followed by `id1<TAB>id2<TAB>coefficient` lines.
impl fmt::Display for CorrelationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(header) = &self.header {
            writeln!(f, "# {}", header)?;
        }
        for r in &self.records {
            writeln!(f, "{}\t{}\t{:.4}", r.sample_id_1, r.sample_id_2, r.coefficient)?;
        }
        Ok(())
    }
}
