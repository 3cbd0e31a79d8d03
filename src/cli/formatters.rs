//! Output formatting module for CLI display
//!
//! This module handles all terminal output formatting, separating
//! the concerns of conversion from presentation.

use colored::Colorize;
use serde::Serialize;
use std::path::Path;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

use circular030::importers::ReferenceTable;
use circular030::pipeline::{ReportRecord, RunSummary};
use circular030::utils::format_pesos;

/// Format a run summary for JSON output
pub fn format_summary_json(input: &Path, output: Option<&Path>, summary: &RunSummary) -> String {
    #[derive(Serialize)]
    struct JsonRun<'a> {
        input: String,
        output: Option<String>,
        #[serde(flatten)]
        summary: &'a RunSummary,
    }

    let payload = JsonRun {
        input: input.display().to_string(),
        output: output.map(|p| p.display().to_string()),
        summary,
    };

    serde_json::to_string_pretty(&payload)
        .unwrap_or_else(|e| format!(r#"{{"error": "JSON serialization failed: {}"}}"#, e))
}

/// Preview table of the first `limit` report records
pub fn format_preview_table(records: &[ReportRecord], limit: usize) -> String {
    #[derive(Tabled)]
    struct RecordPreview {
        #[tabled(rename = "#")]
        sequence: usize,
        #[tabled(rename = "ERP")]
        erp_name: String,
        #[tabled(rename = "Tipo ID")]
        erp_id_type: String,
        #[tabled(rename = "Factura")]
        invoice: String,
        #[tabled(rename = "Radicación")]
        filing_date: String,
        #[tabled(rename = "Valor")]
        value: String,
        #[tabled(rename = "Pagos")]
        payments: String,
        #[tabled(rename = "Glosa")]
        glosa: String,
        #[tabled(rename = "Saldo")]
        balance: String,
    }

    let preview: Vec<RecordPreview> = records
        .iter()
        .take(limit)
        .map(|r| RecordPreview {
            sequence: r.sequence,
            erp_name: r.erp_name.clone(),
            erp_id_type: r.erp_id_type.clone().unwrap_or_else(|| "-".to_string()),
            invoice: format!("{}-{}", r.invoice_prefix, r.invoice_number),
            filing_date: r.filing_date.format("%d/%m/%Y").to_string(),
            value: format_pesos(r.invoice_value),
            payments: format_pesos(r.total_payments_applied),
            glosa: format_pesos(r.accepted_claim_value),
            balance: format_pesos(r.invoice_balance),
        })
        .collect();

    let mut output = Table::new(preview)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(5..)).with(Alignment::right()))
        .to_string();

    if records.len() > limit {
        output.push_str(&format!(
            "\n... and {} more records",
            records.len() - limit
        ));
    }
    output
}

/// Human-readable run summary
pub fn format_summary(summary: &RunSummary) -> String {
    let mut output = String::new();

    output.push_str(&format!("\n{} Summary", "━".repeat(60).bright_black()));
    output.push_str(&format!("\n{:<28} {}", "Rows read:".bold(), summary.rows_read));
    output.push_str(&format!(
        "\n{:<28} {}",
        "Excluded (plan):".bold(),
        summary.excluded_by_plan
    ));
    if summary.rejected_rows > 0 {
        output.push_str(&format!(
            "\n{:<28} {}",
            "Rejected (malformed):".bold(),
            summary.rejected_rows.to_string().red()
        ));
    }
    if summary.missing_filing_date > 0 {
        output.push_str(&format!(
            "\n{:<28} {}",
            "Dropped (no filing date):".bold(),
            summary.missing_filing_date.to_string().yellow()
        ));
    }
    if summary.invalid_emission_date > 0 {
        output.push_str(&format!(
            "\n{:<28} {}",
            "Empty emission date:".bold(),
            summary.invalid_emission_date.to_string().yellow()
        ));
    }
    output.push_str(&format!(
        "\n{:<28} {}",
        "Records reported:".bold(),
        summary.records_written.to_string().green()
    ));
    output.push_str(&format!(
        "\n{:<28} {} matched, {} unmatched",
        "ERP reference:".bold(),
        summary.matched_reference,
        summary.unmatched_reference
    ));
    output.push_str(&format!(
        "\n{:<28} {}",
        "Total invoiced:".bold(),
        format_pesos(summary.total_invoice_value)
    ));
    output.push_str(&format!(
        "\n{:<28} {}\n",
        "Total balance:".bold(),
        format_pesos(summary.total_balance)
    ));

    if !summary.unmatched_erp_names.is_empty() {
        output.push_str(&format!(
            "\n{} ERP names without identification type:\n",
            "⚠".yellow().bold()
        ));
        for name in &summary.unmatched_erp_names {
            output.push_str(&format!("  - {}\n", name));
        }
    }

    if !summary.issues_by_field.is_empty() {
        output.push_str(&format!("\n{} Issues by field:\n", "ℹ".blue().bold()));
        for (field, count) in &summary.issues_by_field {
            output.push_str(&format!("  {:<24} {}\n", field, count));
        }
    }

    output
}

/// Reference table listing
pub fn format_reference_table(reference: &ReferenceTable) -> String {
    #[derive(Tabled)]
    struct ReferenceRow {
        #[tabled(rename = "Razón social")]
        legal_name: String,
        #[tabled(rename = "Tipo identificación")]
        id_type: String,
    }

    let rows: Vec<ReferenceRow> = reference
        .entries()
        .iter()
        .map(|e| ReferenceRow {
            legal_name: e.legal_name.clone(),
            id_type: e.id_type.clone(),
        })
        .collect();

    let mut output = Table::new(rows).with(Style::rounded()).to_string();
    output.push_str(&format!(
        "\n{} entries ({} duplicates ignored)\n",
        reference.len(),
        reference.duplicates()
    ));
    output
}
