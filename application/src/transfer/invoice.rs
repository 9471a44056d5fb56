use uuid::Uuid;

use kernel::prelude::entity::{BillingRecord, DestructBillingRecord};

pub struct GenerateInvoicesDto {
    pub billing_month: String,
}

pub struct ListInvoicesDto {
    pub billing_month: String,
}

#[derive(Debug, Clone)]
pub struct InvoiceDto {
    pub invoice_number: String,
    pub company_id: Uuid,
    pub billing_month: String,
    pub total_amount: i64,
    pub usage_fee: i64,
    pub shipping_fee: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvoiceFailureStage {
    Compose,
    Dispatch,
}

impl InvoiceFailureStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceFailureStage::Compose => "compose",
            InvoiceFailureStage::Dispatch => "dispatch",
        }
    }
}

#[derive(Debug, Clone)]
pub struct InvoiceFailureDto {
    pub company_id: Uuid,
    pub stage: InvoiceFailureStage,
}

/// Outcome of one composition run. Tenants are processed independently, so a
/// run can carry both issued invoices and per-tenant failures.
pub struct InvoiceRunDto {
    pub billing_month: String,
    pub invoices: Vec<InvoiceDto>,
    pub failures: Vec<InvoiceFailureDto>,
}

#[derive(Debug, Clone)]
pub struct BillingRecordDto {
    pub id: Uuid,
    pub company_id: Uuid,
    pub billing_month: String,
    pub invoice_number: Option<String>,
    pub total_amount: i64,
    pub status: String,
    pub transaction_id: Option<String>,
    pub withdrawal_date: Option<String>,
}

impl From<BillingRecord> for BillingRecordDto {
    fn from(value: BillingRecord) -> Self {
        let DestructBillingRecord {
            id,
            tenant_id,
            period,
            invoice_number,
            breakdown: _,
            amount,
            status,
            transaction_id,
            withdrawal_date,
            created_at: _,
        } = value.into_destruct();
        Self {
            id: *id.as_ref(),
            company_id: *tenant_id.as_ref(),
            billing_month: period.to_string(),
            invoice_number: invoice_number.map(|number| number.as_ref().clone()),
            total_amount: *amount.as_ref(),
            status: status.as_symbol().to_string(),
            transaction_id: transaction_id.map(|transaction| transaction.as_ref().clone()),
            withdrawal_date: withdrawal_date.map(|date| {
                let date = date.as_ref();
                format!(
                    "{:04}-{:02}-{:02}",
                    date.year(),
                    u8::from(date.month()),
                    date.day()
                )
            }),
        }
    }
}
