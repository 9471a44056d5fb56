mod fee;
mod id;
mod invoice_number;
mod period;
mod status;
mod transaction;

pub use self::{fee::*, id::*, invoice_number::*, period::*, status::*, transaction::*};
use destructure::Destructure;
use vodca::References;

use crate::entity::{CreatedAt, TenantId};

/// Persisted financial obligation of one tenant. Created by invoice
/// composition (`invoice_number` and `breakdown` present, status `unpaid`)
/// or by a completed automatic withdrawal (ledger entry without an invoice
/// number, status `completed`). Append-only: rows are never deleted, only
/// status-transitioned.
#[derive(Debug, Clone, Eq, PartialEq, References, Destructure)]
pub struct BillingRecord {
    id: BillingId,
    tenant_id: TenantId,
    period: BillingPeriod,
    invoice_number: Option<InvoiceNumber>,
    breakdown: Option<FeeBreakdown>,
    amount: PaymentAmount,
    status: BillingStatus,
    transaction_id: Option<TransactionId>,
    withdrawal_date: Option<WithdrawalDate>,
    created_at: CreatedAt<BillingRecord>,
}

impl BillingRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: BillingId,
        tenant_id: TenantId,
        period: BillingPeriod,
        invoice_number: Option<InvoiceNumber>,
        breakdown: Option<FeeBreakdown>,
        amount: PaymentAmount,
        status: BillingStatus,
        transaction_id: Option<TransactionId>,
        withdrawal_date: Option<WithdrawalDate>,
        created_at: CreatedAt<BillingRecord>,
    ) -> Self {
        Self {
            id,
            tenant_id,
            period,
            invoice_number,
            breakdown,
            amount,
            status,
            transaction_id,
            withdrawal_date,
            created_at,
        }
    }

    /// Invoice issued at period close. The total is derived from the line
    /// items, never passed in separately.
    pub fn issue(
        id: BillingId,
        tenant_id: TenantId,
        period: BillingPeriod,
        invoice_number: InvoiceNumber,
        breakdown: FeeBreakdown,
        created_at: CreatedAt<BillingRecord>,
    ) -> Self {
        let amount = breakdown.total();
        Self {
            id,
            tenant_id,
            period,
            invoice_number: Some(invoice_number),
            breakdown: Some(breakdown),
            amount,
            status: BillingStatus::Unpaid,
            transaction_id: None,
            withdrawal_date: None,
            created_at,
        }
    }

    /// Ledger entry for a withdrawal already executed by the bank.
    pub fn collect(
        id: BillingId,
        tenant_id: TenantId,
        period: BillingPeriod,
        amount: PaymentAmount,
        transaction_id: TransactionId,
        withdrawal_date: WithdrawalDate,
        created_at: CreatedAt<BillingRecord>,
    ) -> Self {
        Self {
            id,
            tenant_id,
            period,
            invoice_number: None,
            breakdown: None,
            amount,
            status: BillingStatus::Completed,
            transaction_id: Some(transaction_id),
            withdrawal_date: Some(withdrawal_date),
            created_at,
        }
    }
}
