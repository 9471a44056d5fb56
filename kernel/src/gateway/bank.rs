use destructure::Destructure;
use vodca::References;

use crate::entity::{
    BankAccount, BankInfo, IntentId, PaymentAmount, TenantName, TransactionId,
};
use crate::KernelError;

/// One transfer in a bulk settlement request.
#[derive(Debug, Clone, Eq, PartialEq, References, Destructure)]
pub struct TransferOrder {
    recipient: TenantName,
    bank_info: BankInfo,
    amount: PaymentAmount,
    description: String,
}

impl TransferOrder {
    pub fn new(
        recipient: TenantName,
        bank_info: BankInfo,
        amount: PaymentAmount,
        description: impl Into<String>,
    ) -> Self {
        Self {
            recipient,
            bank_info,
            amount,
            description: description.into(),
        }
    }
}

/// Terminal result the bank reports for an idempotency key.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum TransferOutcome {
    Completed {
        transaction_id: Option<TransactionId>,
    },
    Rejected,
}

/// External bank transfer service. Every call carries the settlement intent
/// id as idempotency key, so an interrupted attempt can be looked up later
/// instead of being retried blindly.
#[async_trait::async_trait]
pub trait BankTransferService: 'static + Sync + Send {
    async fn transfer_bulk(
        &self,
        idempotency_key: &IntentId,
        orders: &[TransferOrder],
    ) -> error_stack::Result<(), KernelError>;

    async fn withdraw(
        &self,
        idempotency_key: &IntentId,
        account: &BankAccount,
        amount: &PaymentAmount,
    ) -> error_stack::Result<TransactionId, KernelError>;

    async fn find_outcome(
        &self,
        idempotency_key: &IntentId,
    ) -> error_stack::Result<Option<TransferOutcome>, KernelError>;
}

pub trait DependOnBankTransferService: 'static + Sync + Send {
    type BankTransferService: BankTransferService;
    fn bank_transfer_service(&self) -> &Self::BankTransferService;
}
