use serde::Deserialize;

use application::transfer::{GenerateInvoicesDto, ListInvoicesDto};

use crate::controller::Intake;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateInvoicesRequest {
    billing_month: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListInvoicesRequest {
    billing_month: String,
}

pub struct InvoiceTransformer;

impl Intake<GenerateInvoicesRequest> for InvoiceTransformer {
    type To = GenerateInvoicesDto;
    fn emit(&self, GenerateInvoicesRequest { billing_month }: GenerateInvoicesRequest) -> Self::To {
        GenerateInvoicesDto { billing_month }
    }
}

impl Intake<ListInvoicesRequest> for InvoiceTransformer {
    type To = ListInvoicesDto;
    fn emit(&self, ListInvoicesRequest { billing_month }: ListInvoicesRequest) -> Self::To {
        ListInvoicesDto { billing_month }
    }
}
