//! Left join of report records against the ERP reference table

use std::collections::BTreeSet;
use tracing::{debug, info};

use crate::importers::ReferenceTable;
use crate::pipeline::projection::ReportRecord;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichedTable {
    pub records: Vec<ReportRecord>,
    pub matched: usize,
    /// Distinct ERP names with no reference entry
    pub unmatched_names: BTreeSet<String>,
}

impl EnrichedTable {
    pub fn unmatched(&self) -> usize {
        self.records.len() - self.matched
    }
}

/// Populate the ERP identification type from the reference table.
///
/// Every record comes out exactly once and in the same order; records
/// without a match keep an empty identification type.
pub fn enrich(records: Vec<ReportRecord>, reference: &ReferenceTable) -> EnrichedTable {
    let mut matched = 0;
    let mut unmatched_names = BTreeSet::new();

    let records: Vec<ReportRecord> = records
        .into_iter()
        .map(|mut record| {
            match reference.lookup(&record.erp_name) {
                Some(id_type) => {
                    matched += 1;
                    record.erp_id_type = Some(id_type.to_string());
                }
                None => {
                    debug!("No reference entry for ERP '{}'", record.erp_name);
                    unmatched_names.insert(record.erp_name.clone());
                    record.erp_id_type = None;
                }
            }
            record
        })
        .collect();

    info!(
        "Enriched {} records: {} matched, {} unmatched ({} distinct ERP names)",
        records.len(),
        matched,
        records.len() - matched,
        unmatched_names.len()
    );

    EnrichedTable {
        records,
        matched,
        unmatched_names,
    }
}
