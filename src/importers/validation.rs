//! Row-level validation bookkeeping
//!
//! Normalization does not stop at the first bad row. Rejected rows and
//! dropped dates are collected here so the caller can report a summary of
//! partial success.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::RowError;

/// Non-fatal date problems
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DateWarning {
    /// Filing date missing or unparseable; the row is dropped
    MissingFilingDate { row: usize, value: String },
    /// Emission date unparseable; the row is kept with an empty date
    InvalidEmissionDate { row: usize, value: String },
}

impl DateWarning {
    pub fn row(&self) -> usize {
        match self {
            DateWarning::MissingFilingDate { row, .. }
            | DateWarning::InvalidEmissionDate { row, .. } => *row,
        }
    }

    pub fn field(&self) -> &'static str {
        match self {
            DateWarning::MissingFilingDate { .. } => "Fecha_Radicacion",
            DateWarning::InvalidEmissionDate { .. } => "Fecha_Emision",
        }
    }

    pub fn drops_row(&self) -> bool {
        matches!(self, DateWarning::MissingFilingDate { .. })
    }
}

impl std::fmt::Display for DateWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateWarning::MissingFilingDate { row, value } => {
                write!(f, "row {}: filing date '{}' is missing or invalid, row dropped", row, value)
            }
            DateWarning::InvalidEmissionDate { row, value } => {
                write!(f, "row {}: emission date '{}' is invalid, left empty", row, value)
            }
        }
    }
}

/// Errors and warnings collected while normalizing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub errors: Vec<RowError>,
    pub warnings: Vec<DateWarning>,
}

impl ValidationReport {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn rejected_rows(&self) -> usize {
        self.errors.len()
    }

    pub fn dropped_missing_filing_date(&self) -> usize {
        self.warnings.iter().filter(|w| w.drops_row()).count()
    }

    pub fn invalid_emission_dates(&self) -> usize {
        self.warnings.iter().filter(|w| !w.drops_row()).count()
    }

    /// Count issues by field for summary reporting
    pub fn issue_summary(&self) -> BTreeMap<String, usize> {
        let mut summary = BTreeMap::new();
        for error in &self.errors {
            *summary.entry(error.field().to_string()).or_insert(0) += 1;
        }
        for warning in &self.warnings {
            *summary.entry(warning.field().to_string()).or_insert(0) += 1;
        }
        summary
    }
}
