use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod formatters;
pub mod runner;

#[derive(Parser)]
#[command(name = "circular030")]
#[command(
    version,
    about = "Convert receivables CSV exports into the Circular 030 spreadsheet"
)]
#[command(
    long_about = "Reads an accounts-receivable CSV export (Colombian number and date formats), drops state-plan records, enriches each invoice with the ERP identification type and writes the Circular 030 regulatory sheet as .xlsx."
)]
pub struct Cli {
    /// Disable colorized/ANSI output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Output results in JSON format
    #[arg(long = "json", global = true)]
    pub json: bool,

    /// Configuration file (TOML); defaults to the user config directory
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert one or more receivables CSV files (each into its own report)
    Convert {
        /// Path to the receivables CSV export(s)
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output .xlsx file (only with a single input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// ERP reference table (.xlsx, .xls, .ods or .csv)
        #[arg(short, long)]
        reference: Option<PathBuf>,

        /// Abort on the first malformed invoice or amount instead of skipping the row
        #[arg(long)]
        strict: bool,

        /// Preview only, don't write the spreadsheet
        #[arg(short, long)]
        dry_run: bool,

        /// Number of records shown in the preview
        #[arg(long, default_value_t = 10)]
        preview: usize,
    },

    /// Show the ERP reference table
    Reference {
        /// ERP reference table (.xlsx, .xls, .ods or .csv)
        #[arg(short, long)]
        reference: Option<PathBuf>,
    },
}
