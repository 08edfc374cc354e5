//! Error types for the taxa-compare library.

use thiserror::Error;

/// Main error type for the library.
#[derive(Error, Debug)]
pub enum TaxCompareError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed taxa summary table: {0}")]
    MalformedTable(String),

    #[error("Invalid abundance value '{value}' at row {row}, column {col}")]
    InvalidValue {
        value: String,
        row: usize,
        col: usize,
    },

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Empty data: {0}")]
    EmptyData(String),

    #[error("Numerical error: {0}")]
    Numerical(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Cardinality violation: {0}")]
    Cardinality(String),

    #[error("No overlapping samples: {0}")]
    NoOverlap(String),

    #[error("Sample ID map error: {0}")]
    SampleIdMap(String),

    #[error("Taxa mismatch: {0}")]
    TaxaMismatch(String),

    #[error("Workflow error: {0}")]
    Workflow(String),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, TaxCompareError>;
