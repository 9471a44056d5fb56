use serde::Serialize;
use uuid::Uuid;

use application::transfer::{BillingRecordDto, InvoiceDto, InvoiceFailureDto, InvoiceRunDto};

use crate::controller::Exhaust;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateInvoicesResponse {
    message: String,
    invoices: Vec<InvoiceBody>,
    failures: Vec<InvoiceFailureBody>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceBody {
    invoice_number: String,
    company_id: Uuid,
    billing_month: String,
    total_amount: i64,
    details: InvoiceDetailsBody,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDetailsBody {
    usage_fee: i64,
    shipping_fee: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceFailureBody {
    company_id: Uuid,
    stage: &'static str,
}

impl From<InvoiceDto> for InvoiceBody {
    fn from(value: InvoiceDto) -> Self {
        Self {
            invoice_number: value.invoice_number,
            company_id: value.company_id,
            billing_month: value.billing_month,
            total_amount: value.total_amount,
            details: InvoiceDetailsBody {
                usage_fee: value.usage_fee,
                shipping_fee: value.shipping_fee,
            },
        }
    }
}

impl From<InvoiceFailureDto> for InvoiceFailureBody {
    fn from(value: InvoiceFailureDto) -> Self {
        Self {
            company_id: value.company_id,
            stage: value.stage.as_str(),
        }
    }
}

pub struct InvoiceRunPresenter;

impl Exhaust<InvoiceRunDto> for InvoiceRunPresenter {
    type To = GenerateInvoicesResponse;
    fn emit(&self, input: InvoiceRunDto) -> Self::To {
        GenerateInvoicesResponse {
            message: "invoice generation completed".to_string(),
            invoices: input.invoices.into_iter().map(InvoiceBody::from).collect(),
            failures: input
                .failures
                .into_iter()
                .map(InvoiceFailureBody::from)
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListInvoicesResponse {
    invoices: Vec<BillingRecordBody>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingRecordBody {
    id: Uuid,
    company_id: Uuid,
    billing_month: String,
    invoice_number: Option<String>,
    total_amount: i64,
    status: String,
    transaction_id: Option<String>,
    withdrawal_date: Option<String>,
}

impl From<BillingRecordDto> for BillingRecordBody {
    fn from(value: BillingRecordDto) -> Self {
        Self {
            id: value.id,
            company_id: value.company_id,
            billing_month: value.billing_month,
            invoice_number: value.invoice_number,
            total_amount: value.total_amount,
            status: value.status,
            transaction_id: value.transaction_id,
            withdrawal_date: value.withdrawal_date,
        }
    }
}

pub struct InvoiceListPresenter;

impl Exhaust<Vec<BillingRecordDto>> for InvoiceListPresenter {
    type To = ListInvoicesResponse;
    fn emit(&self, input: Vec<BillingRecordDto>) -> Self::To {
        ListInvoicesResponse {
            invoices: input.into_iter().map(BillingRecordBody::from).collect(),
        }
    }
}
