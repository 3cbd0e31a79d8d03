//! Circular 030 report assembly
//!
//! Turns enriched records into an ordered table of typed cells and hands
//! it to a [`SpreadsheetWriter`]. No values are computed here; this is a
//! pure reprojection into the configured column order.

pub mod xlsx;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::path::Path;
use tracing::info;

use crate::columns::ReportColumn;
use crate::config::OutputSchema;
use crate::pipeline::{EnrichedTable, ReportRecord};

pub use xlsx::XlsxReportWriter;

/// A single output cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Text(String),
    Integer(i64),
    Date(NaiveDate),
}

impl Cell {
    /// Text cell; an empty string becomes a blank cell
    pub fn text(value: &str) -> Self {
        if value.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(value.to_string())
        }
    }

    /// Identification numbers are written as numbers when they are plain
    /// digits, so leading zeros and check-digit suffixes stay as text.
    pub fn identifier(value: &str) -> Self {
        let is_plain_number = !value.is_empty()
            && value.len() <= 15
            && value.bytes().all(|b| b.is_ascii_digit())
            && (value == "0" || !value.starts_with('0'));
        match value.parse::<i64>() {
            Ok(number) if is_plain_number => Cell::Integer(number),
            _ => Cell::text(value),
        }
    }

    pub fn date(value: Option<NaiveDate>) -> Self {
        value.map(Cell::Date).unwrap_or(Cell::Empty)
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(s) => write!(f, "{}", s),
            Cell::Integer(n) => write!(f, "{}", n),
            Cell::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

/// Report rows in final column order, ready for a writer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedReport {
    pub sheet_name: String,
    pub columns: Vec<ReportColumn>,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl OrderedReport {
    pub fn column_index(&self, column: ReportColumn) -> Option<usize> {
        self.columns.iter().position(|c| *c == column)
    }
}

/// Value of one report column for a record
pub fn cell_for(record: &ReportRecord, column: ReportColumn) -> Cell {
    match column {
        ReportColumn::RecordType => Cell::Integer(record.record_type),
        ReportColumn::Sequence => Cell::Integer(record.sequence as i64),
        ReportColumn::ErpIdType => Cell::text(record.erp_id_type.as_deref().unwrap_or("")),
        ReportColumn::ErpIdNumber => Cell::identifier(&record.erp_id_number),
        ReportColumn::ErpName => Cell::text(&record.erp_name),
        ReportColumn::IpsIdType => Cell::text(&record.ips_id_type),
        ReportColumn::IpsIdNumber => Cell::identifier(&record.ips_id_number),
        ReportColumn::ClaimType => Cell::text(&record.claim_type),
        ReportColumn::InvoicePrefix => Cell::text(&record.invoice_prefix),
        ReportColumn::InvoiceNumber => Cell::text(&record.invoice_number),
        ReportColumn::UpdateIndicator => Cell::text(&record.update_indicator),
        ReportColumn::InvoiceValue => Cell::Integer(record.invoice_value),
        ReportColumn::IssueDate => Cell::date(record.issue_date),
        ReportColumn::FilingDate => Cell::Date(record.filing_date),
        ReportColumn::ReturnDate => Cell::date(record.return_date),
        ReportColumn::TotalPaymentsApplied => Cell::Integer(record.total_payments_applied),
        ReportColumn::AcceptedClaimValue => Cell::Integer(record.accepted_claim_value),
        ReportColumn::ClaimAnswered => Cell::text(&record.claim_answered),
        ReportColumn::InvoiceBalance => Cell::Integer(record.invoice_balance),
        ReportColumn::LegalCollection => Cell::text(&record.legal_collection),
        ReportColumn::ProcessStage => Cell::Integer(record.process_stage),
    }
}

/// Select and order the output columns
pub fn assemble(table: &EnrichedTable, schema: &OutputSchema) -> OrderedReport {
    let headers = schema
        .columns
        .iter()
        .map(|c| c.header().to_string())
        .collect();

    let rows = table
        .records
        .iter()
        .map(|record| {
            schema
                .columns
                .iter()
                .map(|column| cell_for(record, *column))
                .collect()
        })
        .collect();

    OrderedReport {
        sheet_name: schema.sheet_name.clone(),
        columns: schema.columns.clone(),
        headers,
        rows,
    }
}

/// Writes an ordered report to a binary spreadsheet
pub trait SpreadsheetWriter {
    fn to_bytes(&self, report: &OrderedReport) -> Result<Vec<u8>>;

    fn write(&self, report: &OrderedReport, path: &Path) -> Result<()> {
        let bytes = self.to_bytes(report)?;
        std::fs::write(path, bytes).with_context(|| format!("Failed to write {:?}", path))?;
        info!(
            "Wrote {} records to {:?} (sheet '{}')",
            report.rows.len(),
            path,
            report.sheet_name
        );
        Ok(())
    }
}
