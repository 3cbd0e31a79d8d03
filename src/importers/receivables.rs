//! Receivables CSV ingestion
//!
//! Parses the ERP reconciliation export, keeps only the columns the report
//! needs and drops records whose plan is excluded from Circular 030.

use csv::{ReaderBuilder, StringRecord, Trim};
use std::collections::HashMap;
use tracing::{debug, info};

use crate::columns::InputColumn;
use crate::config::InputProfile;
use crate::error::{CircularError, EmptyStage, PipelineResult};

/// One input row, fields exactly as exported (trimmed)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawRecord {
    /// Line number in the source file (header is line 1)
    pub row: usize,
    pub nit: String,
    pub responsable: String,
    pub nit_empresa: String,
    pub factura: String,
    pub valor_factura: String,
    pub fecha_emision: String,
    pub fecha_radicacion: String,
    pub recaudo: String,
    pub retenciones: String,
    pub otras_glosas_aceptada: String,
    pub glosa_acep_conciliacion: String,
    pub cartera_total: String,
    pub plan: String,
}

impl RawRecord {
    pub fn field(&self, column: InputColumn) -> &str {
        match column {
            InputColumn::Nit => &self.nit,
            InputColumn::Responsable => &self.responsable,
            InputColumn::NitEmpresa => &self.nit_empresa,
            InputColumn::Factura => &self.factura,
            InputColumn::ValorFactura => &self.valor_factura,
            InputColumn::FechaEmision => &self.fecha_emision,
            InputColumn::FechaRadicacion => &self.fecha_radicacion,
            InputColumn::Recaudo => &self.recaudo,
            InputColumn::Retenciones => &self.retenciones,
            InputColumn::OtrasGlosasAceptada => &self.otras_glosas_aceptada,
            InputColumn::GlosaAcepConciliacion => &self.glosa_acep_conciliacion,
            InputColumn::CarteraTotal => &self.cartera_total,
            InputColumn::Plan => &self.plan,
        }
    }

    fn field_mut(&mut self, column: InputColumn) -> &mut String {
        match column {
            InputColumn::Nit => &mut self.nit,
            InputColumn::Responsable => &mut self.responsable,
            InputColumn::NitEmpresa => &mut self.nit_empresa,
            InputColumn::Factura => &mut self.factura,
            InputColumn::ValorFactura => &mut self.valor_factura,
            InputColumn::FechaEmision => &mut self.fecha_emision,
            InputColumn::FechaRadicacion => &mut self.fecha_radicacion,
            InputColumn::Recaudo => &mut self.recaudo,
            InputColumn::Retenciones => &mut self.retenciones,
            InputColumn::OtrasGlosasAceptada => &mut self.otras_glosas_aceptada,
            InputColumn::GlosaAcepConciliacion => &mut self.glosa_acep_conciliacion,
            InputColumn::CarteraTotal => &mut self.cartera_total,
            InputColumn::Plan => &mut self.plan,
        }
    }
}

/// Records that passed schema and plan validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedTable {
    pub records: Vec<RawRecord>,
    /// Data rows read from the file
    pub rows_read: usize,
    pub excluded_by_plan: usize,
}

/// Parse the receivables export and apply schema and plan validation
pub fn ingest(text: &str, profile: &InputProfile) -> PipelineResult<ValidatedTable> {
    let mut reader = ReaderBuilder::new()
        .delimiter(super::csv_delimiter(profile.delimiter))
        .flexible(true) // Allow ragged rows; missing trailing fields read as empty
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    debug!("CSV headers: {:?}", headers);

    let column_mapping = find_columns(&headers, profile)?;
    debug!("Column mapping: {:?}", column_mapping);

    let mut records = Vec::new();
    let mut rows_read = 0;
    let mut excluded_by_plan = 0;

    for (idx, result) in reader.records().enumerate() {
        let record = result?;
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }
        rows_read += 1;

        let row_num = record
            .position()
            .map(|pos| pos.line() as usize)
            .unwrap_or(idx + 2);
        let raw = project_row(&record, &column_mapping, row_num);
        if profile.is_excluded_plan(&raw.plan) {
            excluded_by_plan += 1;
            continue;
        }
        records.push(raw);
    }

    info!(
        "Read {} rows, excluded {} by plan, {} remaining",
        rows_read,
        excluded_by_plan,
        records.len()
    );

    if records.is_empty() {
        return Err(CircularError::EmptyResult {
            stage: EmptyStage::PlanFilter,
        });
    }

    Ok(ValidatedTable {
        records,
        rows_read,
        excluded_by_plan,
    })
}

/// Header position of each required column
fn find_columns(
    headers: &StringRecord,
    profile: &InputProfile,
) -> PipelineResult<HashMap<InputColumn, usize>> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    for (idx, header) in headers.iter().enumerate() {
        // First occurrence wins on duplicated headers
        positions
            .entry(header.trim_start_matches('\u{feff}').trim())
            .or_insert(idx);
    }

    let mut mapping = HashMap::new();
    let mut missing = Vec::new();
    for column in InputColumn::ALL {
        let name = profile.header(column);
        match positions.get(name) {
            Some(idx) => {
                mapping.insert(column, *idx);
            }
            None => missing.push(name.to_string()),
        }
    }

    if !missing.is_empty() {
        return Err(CircularError::Schema { missing });
    }
    Ok(mapping)
}

fn project_row(
    record: &StringRecord,
    mapping: &HashMap<InputColumn, usize>,
    row_num: usize,
) -> RawRecord {
    let mut raw = RawRecord {
        row: row_num,
        ..RawRecord::default()
    };
    for (column, idx) in mapping {
        *raw.field_mut(*column) = record.get(*idx).unwrap_or("").to_string();
    }
    raw
}
