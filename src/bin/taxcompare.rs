//! taxcompare - Taxa Summary Comparison CLI
//!
//! Command-line interface for comparing taxa summaries and for running and
//! evaluating multiple taxonomy assignments.

use clap::{Parser, Subcommand, ValueEnum};
use taxa_compare::align::sort_and_fill;
use taxa_compare::compare::{Comparer, ComparisonConfig, ComparisonMode};
use taxa_compare::compare_table::{format_output, generate_taxa_compare_table, DEFAULT_LEVELS};
use taxa_compare::data::TaxaSummary;
use taxa_compare::error::{Result, TaxCompareError};
use taxa_compare::stats::CorrelationType;
use taxa_compare::util::sorted_and_filled_filenames;
use taxa_compare::workflow::{
    assign_taxonomy_multiple_times, AssignConfig, AssignmentMethod, PrintCommands, SerialRunner,
};
use std::path::{Path, PathBuf};

/// CLI-friendly comparison mode enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliMode {
    /// Compare samples with matching (or mapped) IDs
    Paired,
    /// Compare every sample to the single sample of the second file
    Expected,
}

impl From<CliMode> for ComparisonMode {
    fn from(mode: CliMode) -> Self {
        match mode {
            CliMode::Paired => ComparisonMode::Paired,
            CliMode::Expected => ComparisonMode::Expected,
        }
    }
}

/// CLI-friendly correlation type enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliCorrelation {
    Pearson,
    Spearman,
}

impl From<CliCorrelation> for CorrelationType {
    fn from(c: CliCorrelation) -> Self {
        match c {
            CliCorrelation::Pearson => CorrelationType::Pearson,
            CliCorrelation::Spearman => CorrelationType::Spearman,
        }
    }
}

/// Taxa Summary Comparison
#[derive(Parser)]
#[command(name = "taxcompare")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Show debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two taxa summaries using correlation coefficients
    Compare {
        /// First taxa summary TSV
        #[arg(short = 'i', long)]
        input1: PathBuf,

        /// Second taxa summary TSV
        #[arg(short = 'I', long)]
        input2: PathBuf,

        /// Output directory (created if missing)
        #[arg(short, long)]
        output_dir: PathBuf,

        /// Comparison mode (required unless --config is given)
        #[arg(short, long, value_enum)]
        mode: Option<CliMode>,

        /// Correlation coefficient
        #[arg(short = 'c', long, value_enum, default_value = "pearson")]
        correlation: CliCorrelation,

        /// Sample ID map TSV (paired mode only)
        #[arg(short, long)]
        sample_id_map: Option<PathBuf>,

        /// Comparison configuration YAML (overrides mode, correlation and map)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Sort and fill taxa summaries so they share the same taxa
    SortFill {
        /// Taxa summary TSVs (comma-separated or repeated)
        #[arg(short, long, required = true, value_delimiter = ',')]
        input: Vec<PathBuf>,

        /// Output directory (created if missing)
        #[arg(short, long)]
        output_dir: PathBuf,
    },

    /// Assign taxonomy with multiple methods and thresholds
    Assign {
        /// Assignment configuration YAML (replaces all other options)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Dataset directories (comma-separated or repeated)
        #[arg(short, long, value_delimiter = ',')]
        input_dirs: Vec<PathBuf>,

        /// Output directory
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Assignment methods: rdp, blast (comma-separated)
        #[arg(short = 'm', long, value_delimiter = ',')]
        assignment_methods: Vec<String>,

        /// Reference sequences FASTA
        #[arg(short, long)]
        reference_seqs: Option<PathBuf>,

        /// ID to taxonomy map formatted for RDP
        #[arg(long)]
        rdp_id_to_taxonomy: Option<PathBuf>,

        /// ID to taxonomy map formatted for BLAST
        #[arg(long)]
        blast_id_to_taxonomy: Option<PathBuf>,

        /// RDP minimum confidences (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        confidences: Vec<f64>,

        /// BLAST maximum e-values (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        e_values: Vec<f64>,

        /// Representative set FASTA name inside each dataset directory
        #[arg(long, default_value = "rep_set.fna")]
        rep_set_filename: String,

        /// OTU table name inside each dataset directory
        #[arg(long, default_value = "otu_table_mc2.biom")]
        clean_otu_table_filename: String,

        /// Print the commands without running them
        #[arg(short = 'w', long)]
        print_only: bool,

        /// Reuse an existing output directory
        #[arg(short, long)]
        force: bool,
    },

    /// Compare assignment runs under a root directory against key tables
    CompareTable {
        /// Root of the multiple assignment output
        #[arg(short, long)]
        root: PathBuf,

        /// Directory holding one expected (key) table per study
        #[arg(short, long)]
        keys: PathBuf,

        /// Levels to compare, between 2 and 6 (comma-separated) [default: 2,3,4,5,6]
        #[arg(long, value_delimiter = ',')]
        levels: Vec<u8>,

        /// Prefix for per-level output files; prints to stdout if omitted
        #[arg(long)]
        output_prefix: Option<String>,
    },

    /// Generate an example comparison configuration
    Example {
        /// Output path for configuration YAML
        #[arg(short, long, default_value = "comparison.yaml")]
        output: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .format_timestamp(None)
        .format_target(false)
        .init();

    let result = match cli.command {
        Commands::Compare {
            input1,
            input2,
            output_dir,
            mode,
            correlation,
            sample_id_map,
            config,
            format,
        } => cmd_compare(
            &input1,
            &input2,
            &output_dir,
            mode,
            correlation,
            sample_id_map,
            config.as_ref(),
            &format,
        ),

        Commands::SortFill { input, output_dir } => cmd_sort_fill(&input, &output_dir),

        Commands::Assign {
            config,
            input_dirs,
            output_dir,
            assignment_methods,
            reference_seqs,
            rdp_id_to_taxonomy,
            blast_id_to_taxonomy,
            confidences,
            e_values,
            rep_set_filename,
            clean_otu_table_filename,
            print_only,
            force,
        } => {
            let assign_config = match config {
                Some(path) => load_assign_config(&path),
                None => build_assign_config(
                    input_dirs,
                    output_dir,
                    &assignment_methods,
                    reference_seqs,
                    rdp_id_to_taxonomy,
                    blast_id_to_taxonomy,
                    confidences,
                    e_values,
                    rep_set_filename,
                    clean_otu_table_filename,
                    force,
                ),
            };
            assign_config.and_then(|c| cmd_assign(&c, print_only))
        }

        Commands::CompareTable {
            root,
            keys,
            levels,
            output_prefix,
        } => cmd_compare_table(&root, &keys, &levels, output_prefix.as_deref()),

        Commands::Example { output } => cmd_example(&output),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Compare two taxa summary files
#[allow(clippy::too_many_arguments)]
fn cmd_compare(
    input1: &PathBuf,
    input2: &PathBuf,
    output_dir: &PathBuf,
    mode: Option<CliMode>,
    correlation: CliCorrelation,
    sample_id_map: Option<PathBuf>,
    config_path: Option<&PathBuf>,
    format: &str,
) -> Result<()> {
    let config = match config_path {
        Some(path) => {
            eprintln!("Loading comparison configuration from {:?}...", path);
            ComparisonConfig::from_yaml(&std::fs::read_to_string(path)?)?
        }
        None => ComparisonConfig {
            mode: mode
                .ok_or_else(|| {
                    TaxCompareError::InvalidConfiguration(
                        "A comparison mode (--mode) or --config is required".to_string(),
                    )
                })?
                .into(),
            correlation_type: correlation.into(),
            sample_id_map,
        },
    };

    eprintln!("Loading taxa summaries...");
    let ts1 = TaxaSummary::from_tsv(input1)?;
    let ts2 = TaxaSummary::from_tsv(input2)?;
    eprintln!(
        "Loaded {} taxa x {} samples and {} taxa x {} samples",
        ts1.n_taxa(),
        ts1.n_samples(),
        ts2.n_taxa(),
        ts2.n_samples()
    );

    eprintln!(
        "Running {} comparison using {} correlation...",
        config.mode, config.correlation_type
    );
    let comparison = Comparer::from_config(&config)?.run(&ts1, &ts2)?;

    std::fs::create_dir_all(output_dir)?;
    let inputs = [input1.to_string_lossy(), input2.to_string_lossy()];
    let names = sorted_and_filled_filenames(&inputs);
    comparison.aligned1.to_tsv(output_dir.join(&names[0]))?;
    comparison.aligned2.to_tsv(output_dir.join(&names[1]))?;

    let report_path = match format {
        "json" => {
            let path = output_dir.join("taxa_summary_comparison.json");
            std::fs::write(&path, comparison.report.to_json()?)?;
            path
        }
        _ => {
            let path = output_dir.join("taxa_summary_comparison.txt");
            comparison.report.to_tsv(&path)?;
            path
        }
    };

    eprintln!("Wrote results to {:?}", output_dir);
    eprintln!("  {} sample pairs compared ({:?})", comparison.report.len(), report_path);
    Ok(())
}

/// Sort and fill any number of taxa summary files
fn cmd_sort_fill(inputs: &[PathBuf], output_dir: &PathBuf) -> Result<()> {
    eprintln!("Loading {} taxa summaries...", inputs.len());
    let tables = inputs
        .iter()
        .map(TaxaSummary::from_tsv)
        .collect::<Result<Vec<_>>>()?;

    let aligned = sort_and_fill(&tables)?;

    std::fs::create_dir_all(output_dir)?;
    let input_names: Vec<_> = inputs.iter().map(|p| p.to_string_lossy()).collect();
    let names = sorted_and_filled_filenames(&input_names);
    for (ts, name) in aligned.iter().zip(&names) {
        ts.to_tsv(output_dir.join(name))?;
    }

    if let Some(first) = aligned.first() {
        eprintln!("Done! {} tables now share {} taxa", aligned.len(), first.n_taxa());
    }
    Ok(())
}

fn load_assign_config(path: &Path) -> Result<AssignConfig> {
    eprintln!("Loading assignment configuration from {:?}...", path);
    AssignConfig::from_yaml(&std::fs::read_to_string(path)?)
}

#[allow(clippy::too_many_arguments)]
fn build_assign_config(
    input_dirs: Vec<PathBuf>,
    output_dir: Option<PathBuf>,
    assignment_methods: &[String],
    reference_seqs: Option<PathBuf>,
    rdp_id_to_taxonomy: Option<PathBuf>,
    blast_id_to_taxonomy: Option<PathBuf>,
    confidences: Vec<f64>,
    e_values: Vec<f64>,
    rep_set_filename: String,
    clean_otu_table_filename: String,
    force: bool,
) -> Result<AssignConfig> {
    let missing = |option: &str| {
        TaxCompareError::InvalidConfiguration(format!("{} is required without --config", option))
    };
    if input_dirs.is_empty() {
        return Err(missing("--input-dirs"));
    }
    let methods = assignment_methods
        .iter()
        .map(|m| m.parse::<AssignmentMethod>())
        .collect::<Result<Vec<_>>>()?;

    let mut config = AssignConfig::new(
        input_dirs,
        output_dir.ok_or_else(|| missing("--output-dir"))?,
        methods,
        reference_seqs.ok_or_else(|| missing("--reference-seqs"))?,
    );
    config.rdp_id_to_taxonomy = rdp_id_to_taxonomy;
    config.blast_id_to_taxonomy = blast_id_to_taxonomy;
    config.confidences = confidences;
    config.e_values = e_values;
    config.input_fasta_filename = rep_set_filename;
    config.clean_otu_table_filename = clean_otu_table_filename;
    config.force = force;
    Ok(config)
}

/// Run (or print) the multiple assignment workflow
fn cmd_assign(config: &AssignConfig, print_only: bool) -> Result<()> {
    eprintln!(
        "Assigning taxonomy for {} datasets with {} methods...",
        config.input_dirs.len(),
        config.assignment_methods.len()
    );

    if print_only {
        assign_taxonomy_multiple_times(config, &mut PrintCommands::stdout())?;
    } else {
        assign_taxonomy_multiple_times(config, &mut SerialRunner)?;
    }

    eprintln!("Done! Output written to {:?}", config.output_dir);
    Ok(())
}

/// Build per-level comparison tables for assignment runs
fn cmd_compare_table(
    root: &PathBuf,
    keys: &PathBuf,
    levels: &[u8],
    output_prefix: Option<&str>,
) -> Result<()> {
    let levels = if levels.is_empty() { &DEFAULT_LEVELS[..] } else { levels };

    eprintln!("Comparing runs under {:?} against keys in {:?}...", root, keys);
    let tables = generate_taxa_compare_table(root, keys, levels)?;
    let outputs = format_output(&tables, ",");

    for (level, lines) in levels.iter().zip(&outputs) {
        match output_prefix {
            Some(prefix) => {
                let path = format!("{}_L{}.txt", prefix, level);
                std::fs::write(&path, lines.concat())?;
                eprintln!("Wrote level {} table to {}", level, path);
            }
            None => {
                println!("Level {}", level);
                for line in lines {
                    print!("{}", line);
                }
            }
        }
    }
    Ok(())
}

/// Write an example comparison configuration
fn cmd_example(output_path: &PathBuf) -> Result<()> {
    let config = ComparisonConfig {
        mode: ComparisonMode::Paired,
        correlation_type: CorrelationType::Spearman,
        sample_id_map: Some(PathBuf::from("sample_id_map.txt")),
    };

    std::fs::write(output_path, config.to_yaml()?)?;
    eprintln!("Wrote example configuration to {:?}", output_path);
    Ok(())
}
