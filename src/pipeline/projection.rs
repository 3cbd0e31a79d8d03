//! Projection of normalized records onto the Circular 030 record

use chrono::NaiveDate;

use crate::config::ReportConstants;
use crate::pipeline::normalize::NormalizedTable;

/// One Circular 030 record, one per reported invoice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRecord {
    pub record_type: i64,
    /// 1-based position in the filtered row order
    pub sequence: usize,
    /// Filled by the enrichment join; `None` when the ERP is not in the reference
    pub erp_id_type: Option<String>,
    pub erp_id_number: String,
    pub erp_name: String,
    pub ips_id_type: String,
    pub ips_id_number: String,
    pub claim_type: String,
    pub invoice_prefix: String,
    pub invoice_number: String,
    pub update_indicator: String,
    pub invoice_value: i64,
    pub issue_date: Option<NaiveDate>,
    pub filing_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    /// Recaudo + Retenciones
    pub total_payments_applied: i64,
    /// OtrasGlosasAceptada + GlosaAcepConciliacion
    pub accepted_claim_value: i64,
    pub claim_answered: String,
    pub invoice_balance: i64,
    pub legal_collection: String,
    pub process_stage: i64,
}

/// Derive the report records. Sequence numbers follow the table order.
pub fn project(table: &NormalizedTable, constants: &ReportConstants) -> Vec<ReportRecord> {
    table
        .records
        .iter()
        .enumerate()
        .map(|(idx, record)| ReportRecord {
            record_type: constants.record_type,
            sequence: idx + 1,
            erp_id_type: None,
            erp_id_number: record.nit.clone(),
            erp_name: record.responsable.clone(),
            ips_id_type: constants.ips_id_type.clone(),
            ips_id_number: record.nit_empresa.clone(),
            claim_type: constants.claim_type.clone(),
            invoice_prefix: record.invoice_prefix.clone(),
            invoice_number: record.invoice_number.clone(),
            update_indicator: constants.update_indicator.clone(),
            invoice_value: record.valor_factura,
            issue_date: record.fecha_emision,
            filing_date: record.fecha_radicacion,
            return_date: None,
            // sums were bounded during normalization
            total_payments_applied: record.recaudo + record.retenciones,
            accepted_claim_value: record.otras_glosas_aceptada + record.glosa_acep_conciliacion,
            claim_answered: constants.claim_answered.clone(),
            invoice_balance: record.cartera_total,
            legal_collection: constants.legal_collection.clone(),
            process_stage: constants.process_stage,
        })
        .collect()
}
