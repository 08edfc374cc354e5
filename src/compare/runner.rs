//! Comparing two taxa summaries sample by sample.

use crate::align::{ensure_same_taxa, make_compatible, sort_and_fill};
use crate::data::{CorrelationRecord, CorrelationReport, SampleIdMap, TaxaSummary};
use crate::error::{Result, TaxCompareError};
use crate::stats::CorrelationType;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// How samples of the two taxa summaries are paired for comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComparisonMode {
    /// Samples with matching (or mapped) IDs are compared.
    Paired,
    /// Every sample in the first table is compared to the single sample in
    /// the second table.
    Expected,
}

impl ComparisonMode {
    /// All supported comparison modes.
    pub const ALL: [ComparisonMode; 2] = [ComparisonMode::Paired, ComparisonMode::Expected];

    /// Get the descriptive name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Paired => "paired",
            Self::Expected => "expected",
        }
    }
}

impl fmt::Display for ComparisonMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ComparisonMode {
    type Err = TaxCompareError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "paired" => Ok(Self::Paired),
            "expected" => Ok(Self::Expected),
            _ => Err(TaxCompareError::InvalidConfiguration(format!(
                "Invalid comparison mode '{}'. Must be one of: {}",
                s,
                Self::ALL.map(|m| m.name()).join(", ")
            ))),
        }
    }
}

/// Comparison configuration for serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonConfig {
    /// How samples are paired.
    pub mode: ComparisonMode,
    /// Correlation coefficient to compute.
    #[serde(default)]
    pub correlation_type: CorrelationType,
    /// Optional sample ID map file (paired mode only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_id_map: Option<PathBuf>,
}

impl ComparisonConfig {
    /// Load from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(TaxCompareError::from)
    }

    /// Save to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(TaxCompareError::from)
    }
}

/// Result of comparing two taxa summaries.
#[derive(Debug, Clone)]
pub struct Comparison {
    /// First taxa summary, sorted and filled.
    pub aligned1: TaxaSummary,
    /// Second taxa summary, sorted and filled.
    pub aligned2: TaxaSummary,
    /// Per-sample-pair correlations.
    pub report: CorrelationReport,
}

/// Builder for configuring and running a taxa summary comparison.
#[derive(Debug, Clone)]
pub struct Comparer {
    mode: ComparisonMode,
    correlation_type: CorrelationType,
    sample_id_map: Option<SampleIdMap>,
}

impl Comparer {
    /// Create a comparer using Pearson correlation and no sample ID map.
    pub fn new(mode: ComparisonMode) -> Self {
        Self {
            mode,
            correlation_type: CorrelationType::default(),
            sample_id_map: None,
        }
    }

    /// Create from a config, loading the sample ID map file if one is named.
    pub fn from_config(config: &ComparisonConfig) -> Result<Self> {
        let sample_id_map = config
            .sample_id_map
            .as_ref()
            .map(SampleIdMap::from_tsv)
            .transpose()?;
        Ok(Self {
            mode: config.mode,
            correlation_type: config.correlation_type,
            sample_id_map,
        })
    }

    /// Set the correlation coefficient.
    pub fn correlation(mut self, correlation_type: CorrelationType) -> Self {
        self.correlation_type = correlation_type;
        self
    }

    /// Pair samples through a sample ID map (paired mode only).
    pub fn sample_id_map(mut self, map: SampleIdMap) -> Self {
        self.sample_id_map = Some(map);
        self
    }

    /// Run the comparison.
    pub fn run(&self, ts1: &TaxaSummary, ts2: &TaxaSummary) -> Result<Comparison> {
        compare_taxa_summaries(
            ts1,
            ts2,
            self.mode,
            self.correlation_type,
            self.sample_id_map.as_ref(),
        )
    }
}

/// Compare two taxa summaries by correlating their samples.
///
/// Both tables are first sorted and filled so they share the same taxa. In
/// paired mode samples are matched by ID (or through `sample_id_map`); in
/// expected mode every sample of `ts1` is compared to the single sample of
/// `ts2`.
///
/// # Returns
/// The two sorted-and-filled tables and the correlation report.
pub fn compare_taxa_summaries(
    ts1: &TaxaSummary,
    ts2: &TaxaSummary,
    mode: ComparisonMode,
    correlation_type: CorrelationType,
    sample_id_map: Option<&SampleIdMap>,
) -> Result<Comparison> {
    let mut aligned = sort_and_fill([ts1, ts2])?;
    let aligned2 = aligned.pop().ok_or_else(|| {
        TaxCompareError::EmptyData("Alignment returned no taxa summaries".to_string())
    })?;
    let aligned1 = aligned.pop().ok_or_else(|| {
        TaxCompareError::EmptyData("Alignment returned no taxa summaries".to_string())
    })?;

    let (records, header) = match mode {
        ComparisonMode::Paired => {
            let (compat1, compat2) = make_compatible(&aligned1, &aligned2, sample_id_map)?;
            let records = compute_paired_correlations(&compat1, &compat2, correlation_type)?;
            let header = format!(
                "Samples that match between the two taxa summary files are compared using {} correlation.",
                correlation_type
            );
            (records, header)
        }
        ComparisonMode::Expected => {
            if sample_id_map.is_some() {
                log::warn!("Ignoring sample ID map: it only applies to paired comparisons");
            }
            let records =
                compute_all_to_expected_correlations(&aligned1, &aligned2, correlation_type)?;
            let header = format!(
                "All samples in the first taxa summary file are compared to the single sample \"{}\" \
                 in the second taxa summary file using {} correlation.",
                aligned2.sample_ids()[0],
                correlation_type
            );
            (records, header)
        }
    };

    log::info!(
        "Computed {} {} correlations ({} mode)",
        records.len(),
        correlation_type,
        mode
    );

    Ok(Comparison {
        aligned1,
        aligned2,
        report: CorrelationReport {
            mode,
            correlation_type,
            header: Some(header),
            records,
        },
    })
}

/// Correlate column `i` of `ts1` with column `i` of `ts2` for every `i`.
///
/// Both tables must share the same taxa and have the same number of samples,
/// as produced by [`make_compatible`].
pub fn compute_paired_correlations(
    ts1: &TaxaSummary,
    ts2: &TaxaSummary,
    correlation_type: CorrelationType,
) -> Result<Vec<CorrelationRecord>> {
    ensure_same_taxa(ts1, ts2)?;
    if ts1.n_samples() != ts2.n_samples() {
        return Err(TaxCompareError::Cardinality(format!(
            "Paired taxa summaries must have the same number of samples ({} vs {})",
            ts1.n_samples(),
            ts2.n_samples()
        )));
    }

    (0..ts1.n_samples())
        .map(|i| {
            let coefficient = correlation_type.correlate(&ts1.column(i), &ts2.column(i))?;
            Ok(CorrelationRecord::new(
                &ts1.sample_ids()[i],
                &ts2.sample_ids()[i],
                coefficient,
            ))
        })
        .collect()
}

/// Correlate every sample of `observed` with the single sample of `expected`.
///
/// # Errors
/// Fails if `expected` does not hold exactly one sample or if the taxa of the
/// two tables differ.
pub fn compute_all_to_expected_correlations(
    observed: &TaxaSummary,
    expected: &TaxaSummary,
    correlation_type: CorrelationType,
) -> Result<Vec<CorrelationRecord>> {
    if expected.n_samples() != 1 {
        return Err(TaxCompareError::Cardinality(format!(
            "The second taxa summary must contain exactly one (expected) sample, found {}",
            expected.n_samples()
        )));
    }
    ensure_same_taxa(observed, expected)?;

    let expected_id = &expected.sample_ids()[0];
    let expected_column = expected.column(0);
    (0..observed.n_samples())
        .map(|i| {
            let coefficient = correlation_type.correlate(&observed.column(i), &expected_column)?;
            Ok(CorrelationRecord::new(
                &observed.sample_ids()[i],
                expected_id,
                coefficient,
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn summary(samples: &[&str], taxa: &[&str], rows: &[Vec<f64>]) -> TaxaSummary {
        TaxaSummary::from_rows(samples, taxa, rows).unwrap()
    }

    fn expected1() -> TaxaSummary {
        summary(&["Expected"], &["Eukarya", "Bacteria"], &[vec![0.5], vec![0.6]])
    }

    fn observed1() -> TaxaSummary {
        summary(
            &["S1", "S2"],
            &["Eukarya", "Bacteria"],
            &[vec![0.4, 0.5], vec![0.5, 0.7]],
        )
    }

    fn expected2() -> TaxaSummary {
        summary(
            &["Expected"],
            &["Eukarya", "Bacteria", "Archaea"],
            &[vec![0.5], vec![0.6], vec![0.4]],
        )
    }

    fn observed2() -> TaxaSummary {
        summary(
            &["S1", "S2"],
            &["Eukarya", "Bacteria", "Archaea"],
            &[vec![0.4, 0.5], vec![0.5, 0.7], vec![0.4, 0.4]],
        )
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!("paired".parse::<ComparisonMode>().unwrap(), ComparisonMode::Paired);
        assert_eq!("EXPECTED".parse::<ComparisonMode>().unwrap(), ComparisonMode::Expected);
        match "foo".parse::<ComparisonMode>() {
            Err(TaxCompareError::InvalidConfiguration(msg)) => {
                assert!(msg.ends_with("Must be one of: paired, expected"))
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_compare_expected_pearson() {
        let result = compare_taxa_summaries(
            &observed1(),
            &expected1(),
            ComparisonMode::Expected,
            CorrelationType::Pearson,
            None,
        )
        .unwrap();

        assert_eq!(
            result.aligned1,
            summary(&["S1", "S2"], &["Bacteria", "Eukarya"], &[vec![0.5, 0.7], vec![0.4, 0.5]])
        );
        assert_eq!(
            result.aligned2,
            summary(&["Expected"], &["Bacteria", "Eukarya"], &[vec![0.6], vec![0.5]])
        );

        let records = &result.report.records;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].sample_id_1, "S1");
        assert_eq!(records[0].sample_id_2, "Expected");
        assert_relative_eq!(records[0].coefficient, 1.0, epsilon = 1e-12);
        assert_eq!(records[1].sample_id_1, "S2");
        assert_relative_eq!(records[1].coefficient, 1.0, epsilon = 1e-12);

        assert_eq!(
            result.report.to_string(),
            "# All samples in the first taxa summary file are compared to the single sample \
             \"Expected\" in the second taxa summary file using pearson correlation.\n\
             S1\tExpected\t1.0000\nS2\tExpected\t1.0000\n"
        );
    }

    #[test]
    fn test_compare_expected_spearman() {
        let result = compare_taxa_summaries(
            &observed1(),
            &expected1(),
            ComparisonMode::Expected,
            CorrelationType::Spearman,
            None,
        )
        .unwrap();
        assert_eq!(result.report.correlation_type, CorrelationType::Spearman);
        for r in &result.report.records {
            assert_relative_eq!(r.coefficient, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_all_to_expected_spearman_with_ties() {
        let records = compute_all_to_expected_correlations(
            &observed2(),
            &expected2(),
            CorrelationType::Spearman,
        )
        .unwrap();
        assert_relative_eq!(records[0].coefficient, 0.866025, epsilon = 1e-6);
        assert_relative_eq!(records[1].coefficient, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_all_to_expected_invalid_sample_count() {
        let result =
            compute_all_to_expected_correlations(&observed1(), &observed1(), CorrelationType::Pearson);
        assert!(matches!(result, Err(TaxCompareError::Cardinality(_))));

        let result = compare_taxa_summaries(
            &expected1(),
            &observed1(),
            ComparisonMode::Expected,
            CorrelationType::Pearson,
            None,
        );
        assert!(matches!(result, Err(TaxCompareError::Cardinality(_))));
    }

    #[test]
    fn test_all_to_expected_requires_aligned_taxa() {
        let result =
            compute_all_to_expected_correlations(&observed1(), &expected2(), CorrelationType::Pearson);
        assert!(matches!(result, Err(TaxCompareError::TaxaMismatch(_))));
    }

    #[test]
    fn test_compare_paired() {
        let ts1 = summary(
            &["Even3", "Even1", "S7"],
            &["foo", "bar", "baz"],
            &[vec![0.2, 0.77, 0.001], vec![0.45, 0.9, 0.0], vec![0.35, 0.1, 0.999]],
        );
        let ts2 = summary(
            &["Even1", "Even3"],
            &["bar", "foo", "qux"],
            &[vec![0.9, 0.45], vec![0.77, 0.2], vec![0.0, 0.01]],
        );

        let result = compare_taxa_summaries(
            &ts1,
            &ts2,
            ComparisonMode::Paired,
            CorrelationType::Pearson,
            None,
        )
        .unwrap();

        // Aligned tables keep every sample; only the report is filtered.
        assert_eq!(result.aligned1.sample_ids(), ts1.sample_ids());
        assert_eq!(result.aligned1.taxa(), &["bar", "baz", "foo", "qux"]);
        assert_eq!(result.aligned2.sample_ids(), ts2.sample_ids());

        let records = &result.report.records;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].sample_id_1, "Even3");
        assert_eq!(records[0].sample_id_2, "Even3");
        assert_eq!(records[1].sample_id_1, "Even1");
        assert_eq!(records[1].sample_id_2, "Even1");
        assert_eq!(
            result.report.header.as_deref(),
            Some("Samples that match between the two taxa summary files are compared using pearson correlation.")
        );
        assert!(result.report.to_string().starts_with(
            "# Samples that match between the two taxa summary files are compared using pearson correlation.\nEven3\tEven3\t"
        ));

        let expected = crate::stats::pearson(&[0.45, 0.35, 0.2, 0.0], &[0.45, 0.0, 0.2, 0.01]).unwrap();
        assert_relative_eq!(records[0].coefficient, expected, epsilon = 1e-12);
    }

    #[test]
    fn test_compare_paired_with_map() {
        let ts1 = summary(&["A", "B"], &["x", "y", "z"], &[vec![0.1, 0.3], vec![0.2, 0.3], vec![0.7, 0.4]]);
        let ts2 = summary(&["Ref"], &["x", "y", "z"], &[vec![0.15], vec![0.25], vec![0.6]]);
        let map = SampleIdMap::from_pairs([("A", "Ref"), ("B", "Ref")]).unwrap();

        let result = Comparer::new(ComparisonMode::Paired)
            .correlation(CorrelationType::Spearman)
            .sample_id_map(map)
            .run(&ts1, &ts2)
            .unwrap();

        let records = &result.report.records;
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].sample_id_1, "B");
        assert_eq!(records[1].sample_id_2, "Ref");
        assert_relative_eq!(records[0].coefficient, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_compare_paired_no_overlap() {
        let ts1 = summary(&["Even7", "Even8"], &["Eukarya"], &[vec![1.0, 1.0]]);
        let ts2 = summary(&["Even1", "Even2"], &["Eukarya"], &[vec![0.5, 0.6]]);
        let result = compare_taxa_summaries(
            &ts1,
            &ts2,
            ComparisonMode::Paired,
            CorrelationType::Pearson,
            None,
        );
        assert!(matches!(result, Err(TaxCompareError::NoOverlap(_))));
    }

    #[test]
    fn test_paired_correlations_length_mismatch() {
        let ts1 = observed1();
        let ts2 = summary(&["S1"], &["Eukarya", "Bacteria"], &[vec![0.4], vec![0.5]]);
        let result = compute_paired_correlations(&ts1, &ts2, CorrelationType::Pearson);
        assert!(matches!(result, Err(TaxCompareError::Cardinality(_))));
    }

    #[test]
    fn test_config_yaml() {
        let yaml = "mode: expected\ncorrelation_type: spearman\n";
        let config = ComparisonConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.mode, ComparisonMode::Expected);
        assert_eq!(config.correlation_type, CorrelationType::Spearman);
        assert!(config.sample_id_map.is_none());

        let config = ComparisonConfig::from_yaml("mode: paired\n").unwrap();
        assert_eq!(config.correlation_type, CorrelationType::Pearson);

        let roundtrip = ComparisonConfig::from_yaml(&config.to_yaml().unwrap()).unwrap();
        assert_eq!(roundtrip, config);

        assert!(ComparisonConfig::from_yaml("mode: sideways\n").is_err());
    }

    #[test]
    fn test_comparer_from_config() {
        let config = ComparisonConfig {
            mode: ComparisonMode::Expected,
            correlation_type: CorrelationType::Pearson,
            sample_id_map: None,
        };
        let result = Comparer::from_config(&config)
            .unwrap()
            .run(&observed1(), &expected1())
            .unwrap();
        assert_eq!(result.report.mode, ComparisonMode::Expected);
        assert_eq!(result.report.len(), 2);
    }
}
