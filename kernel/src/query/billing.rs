use crate::database::Transaction;
use crate::entity::{BillingId, BillingPeriod, BillingRecord, BillingStatus, TransactionId};
use crate::KernelError;

#[async_trait::async_trait]
pub trait BillingQuery<Connection: Transaction>: Sync + Send + 'static {
    async fn find_by_period(
        &self,
        con: &mut Connection,
        period: &BillingPeriod,
    ) -> error_stack::Result<Vec<BillingRecord>, KernelError>;

    /// Current status of every referenced record that exists. Used by the
    /// settlement idempotency guard before any external call.
    async fn find_statuses(
        &self,
        con: &mut Connection,
        ids: &[BillingId],
    ) -> error_stack::Result<Vec<(BillingId, BillingStatus)>, KernelError>;

    async fn find_by_transaction_id(
        &self,
        con: &mut Connection,
        transaction_id: &TransactionId,
    ) -> error_stack::Result<Option<BillingRecord>, KernelError>;
}

pub trait DependOnBillingQuery<Connection: Transaction>: Sync + Send + 'static {
    type BillingQuery: BillingQuery<Connection>;
    fn billing_query(&self) -> &Self::BillingQuery;
}
