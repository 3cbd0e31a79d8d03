//! End-to-end tests of the conversion pipeline
//!
//! These tests drive `circular030::run` with in-memory CSV text and verify:
//! - Plan filtering and filing-date gating decide the output row count
//! - Sequence numbers are contiguous and follow row order
//! - Payment and glosa aggregates
//! - Left-join totality against the reference table
//! - Row-level error policies


use chrono::NaiveDate;
use circular030::columns::ReportColumn;
use circular030::config::{MatchMode, PipelineConfig, RowErrorPolicy};
use circular030::error::{CircularError, EmptyStage, RowError};
use circular030::importers::reference::{ReferenceEntry, ReferenceTable};
use circular030::reports::Cell;
use cli_helpers::receivables_csv;

const EXAMPLE_ROW: &str = "900123,Clinica X,800456,FEV-4521,1.250.000,01/02/2024,05/02/2024,1.000.000,50.000,0,0,200.000,CONTRIBUTIVO";

fn reference() -> ReferenceTable {
    ReferenceTable::from_entries(
        vec![
            ReferenceEntry {
                legal_name: "Clinica X".to_string(),
                id_type: "NI".to_string(),
            },
            ReferenceEntry {
                legal_name: "EPS Sur".to_string(),
                id_type: "CC".to_string(),
            },
        ],
        MatchMode::Exact,
    )
}

#[test]
fn test_example_row_end_to_end() {
    let text = receivables_csv(&[EXAMPLE_ROW]);
    let outcome = circular030::run(&text, &reference(), &PipelineConfig::default()).unwrap();

    assert_eq!(outcome.records.len(), 1);
    let record = &outcome.records[0];
    assert_eq!(record.invoice_value, 1_250_000);
    assert_eq!(record.total_payments_applied, 1_050_000);
    assert_eq!(record.accepted_claim_value, 0);
    assert_eq!(record.invoice_prefix, "FEV");
    assert_eq!(record.invoice_number, "4521");
    assert_eq!(record.invoice_balance, 200_000);
    assert_eq!(record.erp_id_type.as_deref(), Some("NI"));
    assert_eq!(record.issue_date, NaiveDate::from_ymd_opt(2024, 2, 1));

    let report = &outcome.report;
    assert_eq!(report.sheet_name, "Circular 030");
    assert_eq!(report.headers.len(), 21);
    let row = &report.rows[0];
    assert_eq!(row[0], Cell::Integer(2));
    assert_eq!(row[1], Cell::Integer(1));
    assert_eq!(row[2], Cell::Text("NI".to_string()));
    assert_eq!(row[4], Cell::Text("Clinica X".to_string()));
    assert_eq!(row[5], Cell::Text("NI".to_string()));
    assert_eq!(row[7], Cell::Text("F".to_string()));
    assert_eq!(row[18], Cell::Integer(200_000));
}

#[test]
fn test_output_row_count_matches_filters() {
    let text = receivables_csv(&[
        "1,Clinica X,2,A-1,100,01/01/2024,02/01/2024,0,0,0,0,100,CONTRIBUTIVO",
        "1,Clinica X,2,A-2,100,01/01/2024,02/01/2024,0,0,0,0,100,ESTATAL",
        "1,Clinica X,2,A-3,100,01/01/2024,,0,0,0,0,100,SUBSIDIADO",
        "1,EPS Sur,2,A-4,100,01/01/2024,32/01/2024,0,0,0,0,100,SUBSIDIADO",
        "1,EPS Sur,2,A-5,100,01/01/2024,03/01/2024,0,0,0,0,100,SUBSIDIADO",
    ]);
    let outcome = circular030::run(&text, &reference(), &PipelineConfig::default()).unwrap();

    let invoices: Vec<&str> = outcome
        .records
        .iter()
        .map(|r| r.invoice_number.as_str())
        .collect();
    assert_eq!(invoices, vec!["1", "5"]);
    assert_eq!(outcome.summary.rows_read, 5);
    assert_eq!(outcome.summary.excluded_by_plan, 1);
    assert_eq!(outcome.summary.missing_filing_date, 2);
    assert_eq!(outcome.summary.records_written, 2);
}

#[test]
fn test_sequence_is_contiguous_after_drops() {
    let mut rows = Vec::new();
    for i in 0..12 {
        let plan = if i % 3 == 0 { "ESTATAL" } else { "CONTRIBUTIVO" };
        let filing = if i % 4 == 0 { "sin fecha" } else { "10/03/2024" };
        rows.push(format!(
            "1,Clinica X,2,FE-{},1.000,01/03/2024,{},500,100,20,5,400,{}",
            i, filing, plan
        ));
    }
    let refs: Vec<&str> = rows.iter().map(String::as_str).collect();
    let outcome = circular030::run(
        &receivables_csv(&refs),
        &reference(),
        &PipelineConfig::default(),
    )
    .unwrap();

    let sequences: Vec<usize> = outcome.records.iter().map(|r| r.sequence).collect();
    let expected: Vec<usize> = (1..=outcome.records.len()).collect();
    assert_eq!(sequences, expected);

    // surviving rows keep their input order
    let invoices: Vec<&str> = outcome
        .records
        .iter()
        .map(|r| r.invoice_number.as_str())
        .collect();
    assert_eq!(invoices, vec!["1", "2", "5", "7", "10", "11"]);

    let seq_col = outcome
        .report
        .column_index(ReportColumn::Sequence)
        .unwrap();
    for (idx, row) in outcome.report.rows.iter().enumerate() {
        assert_eq!(row[seq_col], Cell::Integer(idx as i64 + 1));
    }
}

#[test]
fn test_aggregates_hold_for_every_row() {
    let text = receivables_csv(&[
        "1,Clinica X,2,A-1,$10.000,01/01/2024,02/01/2024,$1.500,300,$2.000,700,5.000,CONTRIBUTIVO",
        "1,Clinica X,2,A-2,20.000,01/01/2024,02/01/2024,0,0,1.000.000,1,0,CONTRIBUTIVO",
    ]);
    let outcome = circular030::run(&text, &reference(), &PipelineConfig::default()).unwrap();
    assert_eq!(outcome.records[0].total_payments_applied, 1_800);
    assert_eq!(outcome.records[0].accepted_claim_value, 2_700);
    assert_eq!(outcome.records[1].total_payments_applied, 0);
    assert_eq!(outcome.records[1].accepted_claim_value, 1_000_001);
}

#[test]
fn test_left_join_keeps_unmatched_rows() {
    let text = receivables_csv(&[
        "1,EPS Desconocida,2,A-1,100,01/01/2024,02/01/2024,0,0,0,0,100,CONTRIBUTIVO",
        "1,EPS Sur,2,A-2,100,01/01/2024,02/01/2024,0,0,0,0,100,CONTRIBUTIVO",
        "1,EPS Desconocida,2,A-3,100,01/01/2024,02/01/2024,0,0,0,0,100,CONTRIBUTIVO",
    ]);
    let outcome = circular030::run(&text, &reference(), &PipelineConfig::default()).unwrap();

    assert_eq!(outcome.records.len(), 3);
    assert_eq!(outcome.records[0].erp_id_type, None);
    assert_eq!(outcome.records[1].erp_id_type.as_deref(), Some("CC"));
    assert_eq!(outcome.report.rows[0][2], Cell::Empty);
    assert_eq!(outcome.summary.matched_reference, 1);
    assert_eq!(outcome.summary.unmatched_reference, 2);
    assert_eq!(
        outcome.summary.unmatched_erp_names,
        vec!["EPS Desconocida".to_string()]
    );
}

#[test]
fn test_left_join_with_empty_reference() {
    let empty = ReferenceTable::from_entries(Vec::new(), MatchMode::Exact);
    let outcome = circular030::run(
        &receivables_csv(&[EXAMPLE_ROW]),
        &empty,
        &PipelineConfig::default(),
    )
    .unwrap();
    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0].erp_id_type, None);
}

#[test]
fn test_estatal_never_reported() {
    let text = receivables_csv(&[
        "1,Clinica X,2,EST-1,100,01/01/2024,02/01/2024,0,0,0,0,100,ESTATAL",
        EXAMPLE_ROW,
    ]);
    let outcome = circular030::run(&text, &reference(), &PipelineConfig::default()).unwrap();
    assert!(outcome.records.iter().all(|r| r.invoice_prefix != "EST"));
}

#[test]
fn test_invalid_emission_date_is_reported_empty() {
    let text = receivables_csv(&[
        "900123,Clinica X,800456,FEV-1,1.000,fecha mala,05/02/2024,0,0,0,0,1.000,CONTRIBUTIVO",
    ]);
    let outcome = circular030::run(&text, &reference(), &PipelineConfig::default()).unwrap();
    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0].issue_date, None);
    let issue_col = outcome
        .report
        .column_index(ReportColumn::IssueDate)
        .unwrap();
    assert_eq!(outcome.report.rows[0][issue_col], Cell::Empty);
    assert_eq!(outcome.summary.invalid_emission_date, 1);
}

#[test]
fn test_only_estatal_is_empty_result() {
    let text = receivables_csv(&[
        "1,Clinica X,2,A-1,100,01/01/2024,02/01/2024,0,0,0,0,100,ESTATAL",
    ]);
    let err = circular030::run(&text, &reference(), &PipelineConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        CircularError::EmptyResult {
            stage: EmptyStage::PlanFilter
        }
    ));
}

#[test]
fn test_no_filing_dates_is_empty_result() {
    let text = receivables_csv(&[
        "1,Clinica X,2,A-1,100,01/01/2024,,0,0,0,0,100,CONTRIBUTIVO",
    ]);
    let err = circular030::run(&text, &reference(), &PipelineConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        CircularError::EmptyResult {
            stage: EmptyStage::Normalization
        }
    ));
}

#[test]
fn test_missing_column_is_schema_error() {
    let text = "NIT,Responsable\n1,Clinica X\n";
    let err = circular030::run(text, &reference(), &PipelineConfig::default()).unwrap_err();
    match err {
        CircularError::Schema { missing } => {
            assert_eq!(missing.len(), 11);
            assert!(missing.contains(&"Plan".to_string()));
        }
        other => panic!("expected schema error, got {:?}", other),
    }
}

#[test]
fn test_row_errors_skip_and_summarize() {
    let text = receivables_csv(&[
        "1,Clinica X,2,SINGUION,100,01/01/2024,02/01/2024,0,0,0,0,100,CONTRIBUTIVO",
        "1,Clinica X,2,A-2,100,01/01/2024,02/01/2024,abc,0,0,0,100,CONTRIBUTIVO",
        "1,Clinica X,2,A-3,100,01/01/2024,02/01/2024,0,0,0,0,100,CONTRIBUTIVO",
    ]);
    let outcome = circular030::run(&text, &reference(), &PipelineConfig::default()).unwrap();
    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0].sequence, 1);
    assert_eq!(outcome.records[0].invoice_number, "3");
    assert_eq!(outcome.summary.rejected_rows, 2);
    assert_eq!(outcome.summary.issues_by_field.get("Factura"), Some(&1));
    assert_eq!(outcome.summary.issues_by_field.get("Recaudo"), Some(&1));
    assert_eq!(outcome.validation.errors[0].row(), 2);
}

#[test]
fn test_row_errors_fail_fast() {
    let text = receivables_csv(&[
        "1,Clinica X,2,A-1,100,01/01/2024,02/01/2024,0,0,0,0,100,CONTRIBUTIVO",
        "1,Clinica X,2,SINGUION,100,01/01/2024,02/01/2024,0,0,0,0,100,CONTRIBUTIVO",
    ]);
    let config = PipelineConfig {
        row_errors: RowErrorPolicy::FailFast,
        ..PipelineConfig::default()
    };
    let err = circular030::run(&text, &reference(), &config).unwrap_err();
    match err {
        CircularError::MalformedRow(RowError::MalformedInvoice { row, value }) => {
            assert_eq!(row, 3);
            assert_eq!(value, "SINGUION");
        }
        other => panic!("expected malformed invoice, got {:?}", other),
    }
}

#[test]
fn test_config_profile_drives_parsing() {
    let config = PipelineConfig::from_toml(
        r#"
        [input]
        delimiter = ";"
        excluded_plans = ["ESTATAL", "ESPECIAL"]

        [input.headers]
        Responsable = "ERP"

        [reference]
        match_mode = "relaxed"

        [output]
        sheet_name = "Reporte"
        columns = ["Consecutivo de Registro", "Tipo de idenftificacion ERP", "Valor Total Pagos Aplicados a esta Factura o Recobro"]
        "#,
    )
    .unwrap();
    let reference = ReferenceTable::from_entries(
        vec![ReferenceEntry {
            legal_name: "CLÍNICA X".to_string(),
            id_type: "NI".to_string(),
        }],
        config.reference.match_mode,
    );
    let text = "NIT;ERP;NIT_Empresa;Factura;Valor_Factura;Fecha_Emision;Fecha_Radicacion;Recaudo;Retenciones;OtrasGlosasAceptada;GlosaAcepConciliacion;CarteraTotal;Plan\n\
                1;clinica x;2;A-1;1.000,00;01/01/2024;02/01/2024;$ 1.000;500;0;0;0;CONTRIBUTIVO\n\
                1;clinica x;2;A-2;1.000;01/01/2024;02/01/2024;0;0;0;0;0;ESPECIAL\n";
    let outcome = circular030::run(text, &reference, &config).unwrap();

    assert_eq!(outcome.report.sheet_name, "Reporte");
    assert_eq!(outcome.report.rows.len(), 1);
    assert_eq!(
        outcome.report.rows[0],
        vec![
            Cell::Integer(1),
            Cell::Text("NI".to_string()),
            Cell::Integer(1_500)
        ]
    );
}

#[test]
fn test_two_digit_years_do_not_abort_the_run() {
    let text = receivables_csv(&[
        "1,Clinica X,2,A-1,100,01/01/2024,02/01/2024,0,0,0,0,100,CONTRIBUTIVO",
        "1,Clinica X,2,A-2,100,01/01/24,05/02/24,0,0,0,0,100,CONTRIBUTIVO",
        "1,Clinica X,2,A-3,100,01/01/24,05/02/2024,0,0,0,0,100,CONTRIBUTIVO",
    ]);
    let outcome = circular030::run(&text, &reference(), &PipelineConfig::default()).unwrap();

    let invoices: Vec<&str> = outcome
        .records
        .iter()
        .map(|r| r.invoice_number.as_str())
        .collect();
    assert_eq!(invoices, vec!["1", "3"]);
    assert_eq!(outcome.records[1].issue_date, None);
    assert_eq!(outcome.summary.missing_filing_date, 1);
    assert_eq!(outcome.summary.invalid_emission_date, 1);
}

#[test]
fn test_amounts_beyond_exact_range_are_rejected() {
    let text = receivables_csv(&[
        "1,Clinica X,2,A-1,9.007.199.254.740.991,01/01/2024,02/01/2024,0,0,0,0,0,CONTRIBUTIVO",
        "1,Clinica X,2,A-2,9.007.199.254.740.993,01/01/2024,02/01/2024,0,0,0,0,0,CONTRIBUTIVO",
        "1,Clinica X,2,A-3,100,01/01/2024,02/01/2024,9.007.199.254.740.991,1,0,0,0,CONTRIBUTIVO",
    ]);
    let outcome = circular030::run(&text, &reference(), &PipelineConfig::default()).unwrap();

    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0].invoice_value, 9_007_199_254_740_991);
    assert_eq!(outcome.summary.rejected_rows, 2);
    assert_eq!(outcome.summary.issues_by_field.get("Valor_Factura"), Some(&1));
    assert_eq!(outcome.summary.issues_by_field.get("Retenciones"), Some(&1));
}
