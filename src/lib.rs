//! Circular030 - receivables export to Circular 030 report converter
//!
//! This library turns a locale-formatted accounts-receivable CSV export into
//! the fixed-layout Circular 030 spreadsheet, enriching each record with the
//! ERP identification type from a reference table.

pub mod columns;
pub mod config;
pub mod error;
pub mod importers;
pub mod pipeline;
pub mod reports;
pub mod utils;

pub use config::PipelineConfig;
pub use error::{CircularError, RowError};
pub use pipeline::{run, RunOutcome, RunSummary};
