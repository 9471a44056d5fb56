mod id;
mod status;

pub use self::{id::*, status::*};
use destructure::Destructure;
use vodca::References;

use crate::entity::{
    AccountNumber, BankName, BillingId, BranchCode, CreatedAt, PaymentAmount, TenantId,
};

/// Upper bound on the number of payment instructions accepted in one
/// settlement batch.
pub const MAX_SETTLEMENT_BATCH: usize = 100;

/// Bank destination snapshot carried by a payment instruction, independent of
/// the account currently registered by the tenant.
#[derive(Debug, Clone, Eq, PartialEq, References, Destructure)]
pub struct BankInfo {
    bank_name: BankName,
    branch_code: BranchCode,
    account_number: AccountNumber,
}

impl BankInfo {
    pub fn new(bank_name: BankName, branch_code: BranchCode, account_number: AccountNumber) -> Self {
        Self {
            bank_name,
            branch_code,
            account_number,
        }
    }
}

/// Ephemeral settlement request targeting one billing record. Consumed by the
/// settlement processor, never persisted as its own entity.
#[derive(Debug, Clone, Eq, PartialEq, References, Destructure)]
pub struct PaymentInstruction {
    billing_id: BillingId,
    tenant_id: TenantId,
    amount: PaymentAmount,
    bank_info: BankInfo,
}

impl PaymentInstruction {
    pub fn new(
        billing_id: BillingId,
        tenant_id: TenantId,
        amount: PaymentAmount,
        bank_info: BankInfo,
    ) -> Self {
        Self {
            billing_id,
            tenant_id,
            amount,
            bank_info,
        }
    }
}

/// Durable record of an intended transfer, written before the external bank
/// call. Its id doubles as the idempotency key sent to the transfer service,
/// so an intent stuck in `pending` can later be reconciled against the bank.
#[derive(Debug, Clone, Eq, PartialEq, References, Destructure)]
pub struct SettlementIntent {
    id: IntentId,
    kind: IntentKind,
    billing_ids: Vec<BillingId>,
    tenant_id: Option<TenantId>,
    amount: PaymentAmount,
    status: IntentStatus,
    created_at: CreatedAt<SettlementIntent>,
}

impl SettlementIntent {
    pub fn new(
        id: IntentId,
        kind: IntentKind,
        billing_ids: Vec<BillingId>,
        tenant_id: Option<TenantId>,
        amount: PaymentAmount,
        status: IntentStatus,
        created_at: CreatedAt<SettlementIntent>,
    ) -> Self {
        Self {
            id,
            kind,
            billing_ids,
            tenant_id,
            amount,
            status,
            created_at,
        }
    }

    pub fn bulk(
        id: IntentId,
        billing_ids: Vec<BillingId>,
        amount: PaymentAmount,
        created_at: CreatedAt<SettlementIntent>,
    ) -> Self {
        Self::new(
            id,
            IntentKind::Bulk,
            billing_ids,
            None,
            amount,
            IntentStatus::Pending,
            created_at,
        )
    }

    pub fn withdrawal(
        id: IntentId,
        tenant_id: TenantId,
        amount: PaymentAmount,
        created_at: CreatedAt<SettlementIntent>,
    ) -> Self {
        Self::new(
            id,
            IntentKind::Withdrawal,
            Vec::new(),
            Some(tenant_id),
            amount,
            IntentStatus::Pending,
            created_at,
        )
    }
}
