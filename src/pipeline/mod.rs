//! Receivables → Circular 030 transformation pipeline
//!
//! Each stage takes the previous stage's table by reference (or by value
//! when it only adds fields) and returns a new table:
//!
//! ```text
//! ingest → normalize → project → enrich → assemble
//! ```

pub mod enrichment;
pub mod normalize;
pub mod projection;

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

use crate::config::PipelineConfig;
use crate::error::PipelineResult;
use crate::importers::{self, ReferenceTable, ValidationReport};
use crate::reports::{self, OrderedReport};

pub use enrichment::{enrich, EnrichedTable};
pub use normalize::{normalize, NormalizedRecord, NormalizedTable};
pub use projection::{project, ReportRecord};

/// Stage counters for one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub rows_read: usize,
    pub excluded_by_plan: usize,
    pub rejected_rows: usize,
    pub missing_filing_date: usize,
    pub invalid_emission_date: usize,
    pub matched_reference: usize,
    pub unmatched_reference: usize,
    pub unmatched_erp_names: Vec<String>,
    pub records_written: usize,
    pub total_invoice_value: i64,
    pub total_balance: i64,
    pub issues_by_field: BTreeMap<String, usize>,
}

/// Everything a run produces
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub report: OrderedReport,
    pub records: Vec<ReportRecord>,
    pub validation: ValidationReport,
    pub summary: RunSummary,
}

/// Run the whole transformation on one decoded receivables export
pub fn run(
    text: &str,
    reference: &ReferenceTable,
    config: &PipelineConfig,
) -> PipelineResult<RunOutcome> {
    let validated = importers::ingest(text, &config.input)?;
    let normalized = normalize(&validated, &config.input, config.row_errors)?;
    let projected = project(&normalized, &config.constants);
    let enriched = enrich(projected, reference);
    let report = reports::assemble(&enriched, &config.output);

    let summary = RunSummary {
        rows_read: validated.rows_read,
        excluded_by_plan: validated.excluded_by_plan,
        rejected_rows: normalized.report.rejected_rows(),
        missing_filing_date: normalized.report.dropped_missing_filing_date(),
        invalid_emission_date: normalized.report.invalid_emission_dates(),
        matched_reference: enriched.matched,
        unmatched_reference: enriched.unmatched(),
        unmatched_erp_names: enriched.unmatched_names.iter().cloned().collect(),
        records_written: report.rows.len(),
        total_invoice_value: saturating_total(enriched.records.iter().map(|r| r.invoice_value)),
        total_balance: saturating_total(enriched.records.iter().map(|r| r.invoice_balance)),
        issues_by_field: normalized.report.issue_summary(),
    };

    info!(
        "Pipeline complete: {} of {} rows reported",
        summary.records_written, summary.rows_read
    );

    Ok(RunOutcome {
        report,
        records: enriched.records,
        validation: normalized.report,
        summary,
    })
}

fn saturating_total(values: impl Iterator<Item = i64>) -> i64 {
    values.fold(0i64, |acc, v| acc.saturating_add(v))
}
