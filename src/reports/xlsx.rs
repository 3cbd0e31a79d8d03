//! Excel writer for the Circular 030 sheet

use anyhow::{bail, Context, Result};
use chrono::Datelike;
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};

use super::{Cell, OrderedReport, SpreadsheetWriter};
use crate::config::OutputSchema;
use crate::utils::MAX_EXACT_AMOUNT;

/// Writes reports as a single-sheet .xlsx workbook
#[derive(Debug, Clone)]
pub struct XlsxReportWriter {
    date_format: String,
    autofit: bool,
}

impl Default for XlsxReportWriter {
    fn default() -> Self {
        Self::from_schema(&OutputSchema::default())
    }
}

impl XlsxReportWriter {
    pub fn from_schema(schema: &OutputSchema) -> Self {
        Self {
            date_format: schema.date_format.clone(),
            autofit: schema.autofit,
        }
    }
}

impl SpreadsheetWriter for XlsxReportWriter {
    fn to_bytes(&self, report: &OrderedReport) -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();
        let header_format = Format::new().set_bold();
        let date_format = Format::new().set_num_format(&self.date_format);

        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(&report.sheet_name)
            .with_context(|| format!("Invalid sheet name '{}'", report.sheet_name))?;

        for (col, header) in report.headers.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, header, &header_format)?;
        }

        for (idx, row) in report.rows.iter().enumerate() {
            let row_num = (idx + 1) as u32;
            for (col, cell) in row.iter().enumerate() {
                let col = col as u16;
                match cell {
                    Cell::Empty => {}
                    Cell::Text(text) => {
                        worksheet.write_string(row_num, col, text)?;
                    }
                    Cell::Integer(value) => {
                        if value.unsigned_abs() > MAX_EXACT_AMOUNT as u64 {
                            bail!(
                                "Value {} in row {} cannot be stored exactly in a number cell",
                                value,
                                row_num + 1
                            );
                        }
                        worksheet.write_number(row_num, col, *value as f64)?;
                    }
                    Cell::Date(date) => {
                        let datetime = ExcelDateTime::from_ymd(
                            date.year() as u16,
                            date.month() as u8,
                            date.day() as u8,
                        )
                        .with_context(|| format!("Date {} cannot be written to Excel", date))?;
                        worksheet.write_datetime_with_format(row_num, col, &datetime, &date_format)?;
                    }
                }
            }
        }

        if self.autofit {
            worksheet.autofit();
        }

        workbook
            .save_to_buffer()
            .context("Failed to serialize Circular 030 workbook")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::ReportColumn;

    #[test]
    fn test_writes_non_empty_workbook() {
        let report = OrderedReport {
            sheet_name: "Circular 030".to_string(),
            columns: vec![ReportColumn::Sequence],
            headers: vec!["Consecutivo de Registro".to_string()],
            rows: vec![vec![Cell::Integer(1)], vec![Cell::Empty]],
        };
        let bytes = XlsxReportWriter::default().to_bytes(&report).unwrap();
        // xlsx files are zip archives
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn test_invalid_sheet_name_is_an_error() {
        let report = OrderedReport {
            sheet_name: "Circular [030]".to_string(),
            columns: vec![],
            headers: vec![],
            rows: vec![],
        };
        assert!(XlsxReportWriter::default().to_bytes(&report).is_err());
    }

    #[test]
    fn test_integers_beyond_exact_range_are_refused() {
        let report = |value: i64| OrderedReport {
            sheet_name: "Circular 030".to_string(),
            columns: vec![ReportColumn::InvoiceValue],
            headers: vec!["VL Factura o Recobro".to_string()],
            rows: vec![vec![Cell::Integer(value)]],
        };
        let writer = XlsxReportWriter::default();
        assert!(writer.to_bytes(&report(MAX_EXACT_AMOUNT)).is_ok());
        assert!(writer.to_bytes(&report(-MAX_EXACT_AMOUNT)).is_ok());

        let err = writer.to_bytes(&report(MAX_EXACT_AMOUNT + 2)).unwrap_err();
        assert!(err.to_string().contains("9007199254740993"));
    }
}
