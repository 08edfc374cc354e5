//! Assigning taxonomy to several datasets with several methods and thresholds.

use super::commands::{generate_blast_commands, generate_rdp_commands, AssignmentMethod};
use super::handler::{CommandHandler, WorkflowLogger};
use crate::error::{Result, TaxCompareError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

fn default_input_fasta_filename() -> String {
    "rep_set.fna".to_string()
}

fn default_clean_otu_table_filename() -> String {
    "otu_table_mc2.biom".to_string()
}

/// Configuration for a multiple taxonomy assignment run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignConfig {
    /// Dataset directories, each holding the input FASTA and OTU table.
    pub input_dirs: Vec<PathBuf>,
    /// Directory receiving one subdirectory per dataset.
    pub output_dir: PathBuf,
    pub assignment_methods: Vec<AssignmentMethod>,
    /// Reference sequences used by every method.
    pub reference_seqs: PathBuf,
    #[serde(default = "default_input_fasta_filename")]
    pub input_fasta_filename: String,
    #[serde(default = "default_clean_otu_table_filename")]
    pub clean_otu_table_filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rdp_id_to_taxonomy: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blast_id_to_taxonomy: Option<PathBuf>,
    /// RDP minimum confidences.
    #[serde(default)]
    pub confidences: Vec<f64>,
    /// BLAST maximum e-values.
    #[serde(default)]
    pub e_values: Vec<f64>,
    /// Reuse an existing output directory.
    #[serde(default)]
    pub force: bool,
}

impl AssignConfig {
    /// Create a config with default file names and no method parameters.
    pub fn new(
        input_dirs: Vec<PathBuf>,
        output_dir: impl Into<PathBuf>,
        assignment_methods: Vec<AssignmentMethod>,
        reference_seqs: impl Into<PathBuf>,
    ) -> Self {
        Self {
            input_dirs,
            output_dir: output_dir.into(),
            assignment_methods,
            reference_seqs: reference_seqs.into(),
            input_fasta_filename: default_input_fasta_filename(),
            clean_otu_table_filename: default_clean_otu_table_filename(),
            rdp_id_to_taxonomy: None,
            blast_id_to_taxonomy: None,
            confidences: Vec::new(),
            e_values: Vec::new(),
            force: false,
        }
    }

    /// Load from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(TaxCompareError::from)
    }

    /// Save to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(TaxCompareError::from)
    }

    /// Check that every requested method has the parameters it needs.
    pub fn validate(&self) -> Result<()> {
        if self.assignment_methods.is_empty() {
            return Err(TaxCompareError::Workflow(
                "You must specify at least one taxonomy assignment method.".to_string(),
            ));
        }
        for method in &self.assignment_methods {
            match method {
                AssignmentMethod::Rdp => {
                    required(&self.rdp_id_to_taxonomy, "RDP")?;
                    if self.confidences.is_empty() {
                        return Err(TaxCompareError::Workflow(
                            "You must specify at least one confidence level.".to_string(),
                        ));
                    }
                }
                AssignmentMethod::Blast => {
                    required(&self.blast_id_to_taxonomy, "BLAST")?;
                    if self.e_values.is_empty() {
                        return Err(TaxCompareError::Workflow(
                            "You must provide a maximum E-value for assignment using BLAST."
                                .to_string(),
                        ));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Run every requested assignment method on every input dataset.
///
/// Creates `output_dir` (which must not exist unless `force` is set) and one
/// subdirectory per dataset, named after the dataset directory. Commands are
/// passed to `handler` one method at a time; the workflow log is written to
/// the output directory.
pub fn assign_taxonomy_multiple_times<H: CommandHandler>(
    config: &AssignConfig,
    handler: &mut H,
) -> Result<()> {
    config.validate()?;
    if let Some(missing) = config.input_dirs.iter().find(|d| !d.is_dir()) {
        return Err(TaxCompareError::Workflow(format!(
            "The input directory '{}' does not exist.",
            missing.display()
        )));
    }

    if config.output_dir.exists() && !config.force {
        return Err(TaxCompareError::Workflow(format!(
            "Output directory '{}' already exists. Please choose a different directory, \
             or force overwrite with -f.",
            config.output_dir.display()
        )));
    }
    fs::create_dir_all(&config.output_dir)?;

    let mut logger = WorkflowLogger::create(&config.output_dir)?;
    log::info!("Writing workflow log to {}", logger.path().display());

    for input_dir in &config.input_dirs {
        let dataset_dir = config.output_dir.join(dataset_name(input_dir));
        let input_fasta = input_dir.join(&config.input_fasta_filename);
        let clean_otu_table = input_dir.join(&config.clean_otu_table_filename);

        logger.write(&format!(
            "\nCreating output subdirectory '{}' if it doesn't already exist.\n",
            dataset_dir.display()
        ))?;
        fs::create_dir_all(&dataset_dir)?;

        for method in &config.assignment_methods {
            let groups = match method {
                AssignmentMethod::Rdp => generate_rdp_commands(
                    &dataset_dir,
                    &input_fasta,
                    &config.reference_seqs,
                    required(&config.rdp_id_to_taxonomy, "RDP")?,
                    &clean_otu_table,
                    &config.confidences,
                ),
                AssignmentMethod::Blast => generate_blast_commands(
                    &dataset_dir,
                    &input_fasta,
                    &config.reference_seqs,
                    required(&config.blast_id_to_taxonomy, "BLAST")?,
                    &clean_otu_table,
                    &config.e_values,
                ),
            };
            log::debug!(
                "Generated {} command groups for {} on {}",
                groups.len(),
                method,
                input_dir.display()
            );
            handler.handle(&groups, &mut logger)?;
        }
    }
    logger.flush()
}

fn required<'a>(id_to_taxonomy: &'a Option<PathBuf>, method: &str) -> Result<&'a Path> {
    id_to_taxonomy.as_deref().ok_or_else(|| {
        TaxCompareError::Workflow(format!(
            "You must provide an ID to taxonomy map (formatted for {}) filepath.",
            method
        ))
    })
}

/// Last component of a dataset directory, ignoring trailing separators.
fn dataset_name(input_dir: &Path) -> PathBuf {
    input_dir
        .components()
        .next_back()
        .map(|c| PathBuf::from(c.as_os_str()))
        .unwrap_or_default()
}
