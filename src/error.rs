//! Error handling for Circular 030 conversion
//!
//! Pipeline stages return the typed [`CircularError`] so callers can tell
//! fatal conditions apart; application glue (config, CLI, writers) uses the
//! anyhow-based [`Result`] alias for context chaining.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors: any of these aborts the whole run
#[derive(Error, Debug)]
pub enum CircularError {
    #[error("failed to load ERP reference table from {path}")]
    ReferenceLoad {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("missing required columns: {}", .missing.join(", "))]
    Schema { missing: Vec<String> },

    #[error("no records left after {stage}")]
    EmptyResult { stage: EmptyStage },

    #[error("malformed row")]
    MalformedRow(#[from] RowError),

    #[error("csv error")]
    Csv(#[from] csv::Error),

    #[error("io error")]
    Io(#[from] std::io::Error),
}

impl CircularError {
    pub fn reference_load(path: impl Into<PathBuf>, source: impl Into<anyhow::Error>) -> Self {
        let source: anyhow::Error = source.into();
        CircularError::ReferenceLoad {
            path: path.into(),
            source: source.into(),
        }
    }
}

/// Stage after which the record set became empty
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyStage {
    /// Plan filtering dropped every row (or the input had no data rows)
    PlanFilter,
    /// Every remaining row was rejected or lacked a filing date
    Normalization,
}

impl std::fmt::Display for EmptyStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmptyStage::PlanFilter => write!(f, "plan filtering"),
            EmptyStage::Normalization => write!(f, "normalization"),
        }
    }
}

/// Row-level errors: the row is excluded (or the run aborted under fail-fast)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RowError {
    #[error("row {row}: invoice '{value}' has no '-' separator")]
    MalformedInvoice { row: usize, value: String },

    #[error("row {row}: {column} value '{value}' is not a valid amount ({reason})")]
    MalformedAmount {
        row: usize,
        column: String,
        value: String,
        reason: String,
    },
}

impl RowError {
    pub fn row(&self) -> usize {
        match self {
            RowError::MalformedInvoice { row, .. } | RowError::MalformedAmount { row, .. } => *row,
        }
    }

    /// Field the error refers to, used for summaries
    pub fn field(&self) -> &str {
        match self {
            RowError::MalformedInvoice { .. } => "Factura",
            RowError::MalformedAmount { column, .. } => column,
        }
    }
}

/// Result type alias for application-level operations
pub type Result<T> = anyhow::Result<T>;

/// Result type alias for pipeline stages
pub type PipelineResult<T> = std::result::Result<T, CircularError>;
