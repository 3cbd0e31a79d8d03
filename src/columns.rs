//! Column catalogues for the receivables input and the Circular 030 output

use serde::{Deserialize, Serialize};

/// Required columns of the receivables CSV export
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum InputColumn {
    #[serde(rename = "NIT")]
    Nit,
    #[serde(rename = "Responsable")]
    Responsable,
    #[serde(rename = "NIT_Empresa")]
    NitEmpresa,
    #[serde(rename = "Factura")]
    Factura,
    #[serde(rename = "Valor_Factura")]
    ValorFactura,
    #[serde(rename = "Fecha_Emision")]
    FechaEmision,
    #[serde(rename = "Fecha_Radicacion")]
    FechaRadicacion,
    #[serde(rename = "Recaudo")]
    Recaudo,
    #[serde(rename = "Retenciones")]
    Retenciones,
    #[serde(rename = "OtrasGlosasAceptada")]
    OtrasGlosasAceptada,
    #[serde(rename = "GlosaAcepConciliacion")]
    GlosaAcepConciliacion,
    #[serde(rename = "CarteraTotal")]
    CarteraTotal,
    #[serde(rename = "Plan")]
    Plan,
}

impl InputColumn {
    pub const ALL: [InputColumn; 13] = [
        InputColumn::Nit,
        InputColumn::Responsable,
        InputColumn::NitEmpresa,
        InputColumn::Factura,
        InputColumn::ValorFactura,
        InputColumn::FechaEmision,
        InputColumn::FechaRadicacion,
        InputColumn::Recaudo,
        InputColumn::Retenciones,
        InputColumn::OtrasGlosasAceptada,
        InputColumn::GlosaAcepConciliacion,
        InputColumn::CarteraTotal,
        InputColumn::Plan,
    ];

    /// Monetary columns, parsed to whole pesos
    pub const AMOUNTS: [InputColumn; 6] = [
        InputColumn::ValorFactura,
        InputColumn::Recaudo,
        InputColumn::Retenciones,
        InputColumn::OtrasGlosasAceptada,
        InputColumn::GlosaAcepConciliacion,
        InputColumn::CarteraTotal,
    ];

    /// Header name used by the ERP export
    pub fn default_header(self) -> &'static str {
        match self {
            InputColumn::Nit => "NIT",
            InputColumn::Responsable => "Responsable",
            InputColumn::NitEmpresa => "NIT_Empresa",
            InputColumn::Factura => "Factura",
            InputColumn::ValorFactura => "Valor_Factura",
            InputColumn::FechaEmision => "Fecha_Emision",
            InputColumn::FechaRadicacion => "Fecha_Radicacion",
            InputColumn::Recaudo => "Recaudo",
            InputColumn::Retenciones => "Retenciones",
            InputColumn::OtrasGlosasAceptada => "OtrasGlosasAceptada",
            InputColumn::GlosaAcepConciliacion => "GlosaAcepConciliacion",
            InputColumn::CarteraTotal => "CarteraTotal",
            InputColumn::Plan => "Plan",
        }
    }
}

/// Columns of the Circular 030 sheet.
///
/// Header labels are reproduced byte for byte, including the
/// "idenftificacion" misspelling the regulator's template carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportColumn {
    #[serde(rename = "Tipo de registro")]
    RecordType,
    #[serde(rename = "Consecutivo de Registro")]
    Sequence,
    #[serde(rename = "Tipo de idenftificacion ERP")]
    ErpIdType,
    #[serde(rename = "Numero de identificacion ERP")]
    ErpIdNumber,
    #[serde(rename = "Razon Social de la ERP")]
    ErpName,
    #[serde(rename = "Tipo Identificación IPS")]
    IpsIdType,
    #[serde(rename = "Número de identificación IPS")]
    IpsIdNumber,
    #[serde(rename = "Tipo de Cobro")]
    ClaimType,
    #[serde(rename = "Prefijo de la Factura o N° Recobro de la ERP")]
    InvoicePrefix,
    #[serde(rename = "Número de la Factura o N° Recobro de la ERP")]
    InvoiceNumber,
    #[serde(rename = "Indicador de Actualización de la Factura o Recobro")]
    UpdateIndicator,
    #[serde(rename = "VL Factura o Recobro")]
    InvoiceValue,
    #[serde(rename = "Fecha Emisión de la Factura o Recobro")]
    IssueDate,
    #[serde(rename = "Fecha Presentación de la factura o Recobro")]
    FilingDate,
    #[serde(rename = "Fecha Devolución de la Factura o Recobro")]
    ReturnDate,
    #[serde(rename = "Valor Total Pagos Aplicados a esta Factura o Recobro")]
    TotalPaymentsApplied,
    #[serde(rename = "Valor Glosa Aceptada")]
    AcceptedClaimValue,
    #[serde(rename = "Glosa fue Respondida")]
    ClaimAnswered,
    #[serde(rename = "Saldo Factura o Recobro")]
    InvoiceBalance,
    #[serde(rename = "Facturas se Encuentran en Cobro Juridico")]
    LegalCollection,
    #[serde(rename = "Etapa en que se Encuentra el Proceso")]
    ProcessStage,
}

impl ReportColumn {
    /// Canonical regulatory column order
    pub const CANONICAL: [ReportColumn; 21] = [
        ReportColumn::RecordType,
        ReportColumn::Sequence,
        ReportColumn::ErpIdType,
        ReportColumn::ErpIdNumber,
        ReportColumn::ErpName,
        ReportColumn::IpsIdType,
        ReportColumn::IpsIdNumber,
        ReportColumn::ClaimType,
        ReportColumn::InvoicePrefix,
        ReportColumn::InvoiceNumber,
        ReportColumn::UpdateIndicator,
        ReportColumn::InvoiceValue,
        ReportColumn::IssueDate,
        ReportColumn::FilingDate,
        ReportColumn::ReturnDate,
        ReportColumn::TotalPaymentsApplied,
        ReportColumn::AcceptedClaimValue,
        ReportColumn::ClaimAnswered,
        ReportColumn::InvoiceBalance,
        ReportColumn::LegalCollection,
        ReportColumn::ProcessStage,
    ];

    pub fn header(self) -> &'static str {
        match self {
            ReportColumn::RecordType => "Tipo de registro",
            ReportColumn::Sequence => "Consecutivo de Registro",
            ReportColumn::ErpIdType => "Tipo de idenftificacion ERP",
            ReportColumn::ErpIdNumber => "Numero de identificacion ERP",
            ReportColumn::ErpName => "Razon Social de la ERP",
            ReportColumn::IpsIdType => "Tipo Identificación IPS",
            ReportColumn::IpsIdNumber => "Número de identificación IPS",
            ReportColumn::ClaimType => "Tipo de Cobro",
            ReportColumn::InvoicePrefix => "Prefijo de la Factura o N° Recobro de la ERP",
            ReportColumn::InvoiceNumber => "Número de la Factura o N° Recobro de la ERP",
            ReportColumn::UpdateIndicator => "Indicador de Actualización de la Factura o Recobro",
            ReportColumn::InvoiceValue => "VL Factura o Recobro",
            ReportColumn::IssueDate => "Fecha Emisión de la Factura o Recobro",
            ReportColumn::FilingDate => "Fecha Presentación de la factura o Recobro",
            ReportColumn::ReturnDate => "Fecha Devolución de la Factura o Recobro",
            ReportColumn::TotalPaymentsApplied => {
                "Valor Total Pagos Aplicados a esta Factura o Recobro"
            }
            ReportColumn::AcceptedClaimValue => "Valor Glosa Aceptada",
            ReportColumn::ClaimAnswered => "Glosa fue Respondida",
            ReportColumn::InvoiceBalance => "Saldo Factura o Recobro",
            ReportColumn::LegalCollection => "Facturas se Encuentran en Cobro Juridico",
            ReportColumn::ProcessStage => "Etapa en que se Encuentra el Proceso",
        }
    }
}
