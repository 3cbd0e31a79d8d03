//! Field normalization: invoice split, amounts, dates and the filing-date gate

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::columns::InputColumn;
use crate::config::{InputProfile, RowErrorPolicy};
use crate::error::{CircularError, EmptyStage, PipelineResult, RowError};
use crate::importers::{DateWarning, RawRecord, ValidatedTable, ValidationReport};
use crate::utils::MAX_EXACT_AMOUNT;

/// A record with typed amounts and dates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRecord {
    pub row: usize,
    pub nit: String,
    pub responsable: String,
    pub nit_empresa: String,
    pub invoice_prefix: String,
    pub invoice_number: String,
    pub valor_factura: i64,
    pub fecha_emision: Option<NaiveDate>,
    pub fecha_radicacion: NaiveDate,
    pub recaudo: i64,
    pub retenciones: i64,
    pub otras_glosas_aceptada: i64,
    pub glosa_acep_conciliacion: i64,
    pub cartera_total: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedTable {
    pub records: Vec<NormalizedRecord>,
    pub report: ValidationReport,
}

/// Split an invoice identifier on its first '-'
pub fn split_invoice(row: usize, factura: &str) -> Result<(String, String), RowError> {
    factura
        .split_once('-')
        .map(|(prefix, number)| (prefix.trim().to_string(), number.trim().to_string()))
        .ok_or_else(|| RowError::MalformedInvoice {
            row,
            value: factura.to_string(),
        })
}

fn parse_amount(
    record: &RawRecord,
    column: InputColumn,
    profile: &InputProfile,
) -> Result<i64, RowError> {
    let value = record.field(column);
    profile
        .numbers
        .parse_amount(value)
        .map_err(|e| RowError::MalformedAmount {
            row: record.row,
            column: column.default_header().to_string(),
            value: value.to_string(),
            reason: e.to_string(),
        })
}

fn checked_sum(
    record: &RawRecord,
    column: InputColumn,
    a: i64,
    b: i64,
) -> Result<i64, RowError> {
    a.checked_add(b)
        .filter(|sum| sum.unsigned_abs() <= MAX_EXACT_AMOUNT as u64)
        .ok_or_else(|| RowError::MalformedAmount {
            row: record.row,
            column: column.default_header().to_string(),
            value: record.field(column).to_string(),
            reason: "sum out of range".to_string(),
        })
}

/// Outcome of normalizing one row
enum RowOutcome {
    Kept(NormalizedRecord),
    Dropped(DateWarning),
}

fn normalize_record(
    record: &RawRecord,
    profile: &InputProfile,
    warnings: &mut Vec<DateWarning>,
) -> Result<RowOutcome, RowError> {
    let (invoice_prefix, invoice_number) = split_invoice(record.row, &record.factura)?;

    let valor_factura = parse_amount(record, InputColumn::ValorFactura, profile)?;
    let recaudo = parse_amount(record, InputColumn::Recaudo, profile)?;
    let retenciones = parse_amount(record, InputColumn::Retenciones, profile)?;
    let otras_glosas_aceptada = parse_amount(record, InputColumn::OtrasGlosasAceptada, profile)?;
    let glosa_acep_conciliacion =
        parse_amount(record, InputColumn::GlosaAcepConciliacion, profile)?;
    let cartera_total = parse_amount(record, InputColumn::CarteraTotal, profile)?;

    // Aggregates are computed by the projector; make sure they fit
    checked_sum(record, InputColumn::Retenciones, recaudo, retenciones)?;
    checked_sum(
        record,
        InputColumn::GlosaAcepConciliacion,
        otras_glosas_aceptada,
        glosa_acep_conciliacion,
    )?;

    let Some(fecha_radicacion) = profile.dates.parse(&record.fecha_radicacion) else {
        return Ok(RowOutcome::Dropped(DateWarning::MissingFilingDate {
            row: record.row,
            value: record.fecha_radicacion.clone(),
        }));
    };

    let fecha_emision = profile.dates.parse(&record.fecha_emision);
    if fecha_emision.is_none() {
        warnings.push(DateWarning::InvalidEmissionDate {
            row: record.row,
            value: record.fecha_emision.clone(),
        });
    }

    Ok(RowOutcome::Kept(NormalizedRecord {
        row: record.row,
        nit: record.nit.clone(),
        responsable: record.responsable.clone(),
        nit_empresa: record.nit_empresa.clone(),
        invoice_prefix,
        invoice_number,
        valor_factura,
        fecha_emision,
        fecha_radicacion,
        recaudo,
        retenciones,
        otras_glosas_aceptada,
        glosa_acep_conciliacion,
        cartera_total,
    }))
}

/// Normalize every validated record.
///
/// Malformed invoices and amounts are row errors: collected and excluded
/// under [`RowErrorPolicy::Skip`], fatal under [`RowErrorPolicy::FailFast`].
/// Rows without a usable filing date are dropped with a warning.
pub fn normalize(
    table: &ValidatedTable,
    profile: &InputProfile,
    policy: RowErrorPolicy,
) -> PipelineResult<NormalizedTable> {
    let mut records = Vec::with_capacity(table.records.len());
    let mut report = ValidationReport::default();

    for raw in &table.records {
        let mut row_warnings = Vec::new();
        match normalize_record(raw, profile, &mut row_warnings) {
            Ok(RowOutcome::Kept(record)) => {
                for warning in &row_warnings {
                    warn!("{}", warning);
                }
                report.warnings.extend(row_warnings);
                records.push(record);
            }
            Ok(RowOutcome::Dropped(warning)) => {
                warn!("{}", warning);
                report.warnings.push(warning);
            }
            Err(error) => {
                if policy == RowErrorPolicy::FailFast {
                    return Err(CircularError::MalformedRow(error));
                }
                warn!("Skipping {}", error);
                report.errors.push(error);
            }
        }
    }

    info!(
        "Normalized {} records ({} rejected, {} without filing date)",
        records.len(),
        report.rejected_rows(),
        report.dropped_missing_filing_date()
    );

    if records.is_empty() {
        return Err(CircularError::EmptyResult {
            stage: EmptyStage::Normalization,
        });
    }

    Ok(NormalizedTable { records, report })
}
