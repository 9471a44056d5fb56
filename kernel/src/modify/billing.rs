use crate::database::Transaction;
use crate::entity::{BillingId, BillingPeriod, BillingRecord, InvoiceSequence, WithdrawalDate};
use crate::KernelError;

#[async_trait::async_trait]
pub trait BillingModifier<Connection: Transaction>: Sync + Send + 'static {
    async fn create(
        &self,
        con: &mut Connection,
        record: &BillingRecord,
    ) -> error_stack::Result<(), KernelError>;

    /// Allocates the next invoice sequence for the period from a single
    /// atomic counter row. Serialized by the database, so concurrent
    /// composition runs can never produce duplicate numbers; rolling the
    /// surrounding transaction back releases the number and keeps the
    /// sequence gap-free.
    async fn next_sequence(
        &self,
        con: &mut Connection,
        period: &BillingPeriod,
    ) -> error_stack::Result<InvoiceSequence, KernelError>;

    /// Compare-and-swap terminal flip: `unpaid -> completed` with the
    /// settlement date, restricted to rows still `unpaid`. Returns the number
    /// of rows actually flipped so the caller can detect a concurrent
    /// settlement and roll back.
    async fn complete(
        &self,
        con: &mut Connection,
        ids: &[BillingId],
        settled_on: &WithdrawalDate,
    ) -> error_stack::Result<u64, KernelError>;
}

pub trait DependOnBillingModifier<Connection: Transaction>: Sync + Send + 'static {
    type BillingModifier: BillingModifier<Connection>;
    fn billing_modifier(&self) -> &Self::BillingModifier;
}
