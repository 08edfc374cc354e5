//! Shell command generation for taxonomy assignment runs.

use crate::error::{Result, TaxCompareError};
use crate::util::{add_filename_suffix, basename, format_float, split_extension};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// A single shell command with a human-readable description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub description: String,
    pub command: String,
}

impl Command {
    pub fn new(description: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            command: command.into(),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "# {} command\n{}", self.description, self.command)
    }
}

/// Commands run as ordered groups; every group finishes before the next starts.
pub type CommandGroups = Vec<Vec<Command>>;

/// Supported taxonomy assignment methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentMethod {
    /// RDP classifier, run once per confidence threshold.
    Rdp,
    /// BLAST, run once per maximum e-value.
    Blast,
}

impl AssignmentMethod {
    /// Get the descriptive name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Rdp => "rdp",
            Self::Blast => "blast",
        }
    }
}

impl fmt::Display for AssignmentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AssignmentMethod {
    type Err = TaxCompareError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "rdp" => Ok(Self::Rdp),
            "blast" => Ok(Self::Blast),
            _ => Err(TaxCompareError::Workflow(format!(
                "Unrecognized or unsupported taxonomy assignment method '{}'.",
                s
            ))),
        }
    }
}

/// Generate RDP assignment commands, one run per confidence.
///
/// Each run writes to `<output_dir>/rdp_<confidence>` and is followed by the
/// taxa processing commands for that directory.
pub fn generate_rdp_commands(
    output_dir: &Path,
    input_fasta: &Path,
    reference_seqs: &Path,
    id_to_taxonomy: &Path,
    clean_otu_table: &Path,
    confidences: &[f64],
) -> CommandGroups {
    let mut groups = Vec::new();
    for &confidence in confidences {
        let confidence = format_float(confidence);
        let run_id = format!("RDP, {} confidence", confidence);
        let assigned_dir = output_dir.join(format!("rdp_{}", confidence));
        let assign = format!(
            "assign_taxonomy.py -i {} -o {} -c {} -m rdp -r {} -t {}",
            input_fasta.display(),
            assigned_dir.display(),
            confidence,
            reference_seqs.display(),
            id_to_taxonomy.display()
        );
        groups.push(vec![Command::new(
            format!("Assigning taxonomy ({})", run_id),
            assign,
        )]);
        groups.extend(generate_taxa_processing_commands(
            &assigned_dir,
            input_fasta,
            clean_otu_table,
            &run_id,
        ));
    }
    groups
}

/// Generate BLAST assignment commands, one run per maximum e-value.
///
/// Each run writes to `<output_dir>/blast_<e_value>` and is followed by the
/// taxa processing commands for that directory.
pub fn generate_blast_commands(
    output_dir: &Path,
    input_fasta: &Path,
    reference_seqs: &Path,
    id_to_taxonomy: &Path,
    clean_otu_table: &Path,
    e_values: &[f64],
) -> CommandGroups {
    let mut groups = Vec::new();
    for &e_value in e_values {
        let e_value = format_float(e_value);
        let run_id = format!("BLAST, {} E", e_value);
        let assigned_dir = output_dir.join(format!("blast_{}", e_value));
        let assign = format!(
            "assign_taxonomy.py -i {} -o {} -t {} -m blast -r {} -e {}",
            input_fasta.display(),
            assigned_dir.display(),
            id_to_taxonomy.display(),
            reference_seqs.display(),
            e_value
        );
        groups.push(vec![Command::new(
            format!("Assigning taxonomy ({})", run_id),
            assign,
        )]);
        groups.extend(generate_taxa_processing_commands(
            &assigned_dir,
            input_fasta,
            clean_otu_table,
            &run_id,
        ));
    }
    groups
}

/// Commands that attach assignments to the OTU table and summarize it.
///
/// Returns two groups: `add_taxa.py` then `summarize_taxa.py`.
pub fn generate_taxa_processing_commands(
    assigned_dir: &Path,
    input_fasta: &Path,
    clean_otu_table: &Path,
    run_id: &str,
) -> CommandGroups {
    let fasta = input_fasta.to_string_lossy();
    let (fasta_stem, _) = split_extension(basename(&fasta));
    let assignments = assigned_dir.join(format!("{}_tax_assignments.txt", fasta_stem));
    let otu_table_w_taxa = assigned_dir.join(add_filename_suffix(
        &clean_otu_table.to_string_lossy(),
        "_w_taxa",
    ));

    let add_taxa = Command::new(
        format!("Adding taxa ({})", run_id),
        format!(
            "add_taxa.py -i {} -o {} -t {}",
            clean_otu_table.display(),
            otu_table_w_taxa.display(),
            assignments.display()
        ),
    );
    let summarize_taxa = Command::new(
        format!("Summarizing taxa ({})", run_id),
        format!(
            "summarize_taxa.py -i {} -o {}",
            otu_table_w_taxa.display(),
            assigned_dir.display()
        ),
    );
    vec![vec![add_taxa], vec![summarize_taxa]]
}
