use crate::database::Transaction;
use crate::entity::{BillingPeriod, LendingCharge};
use crate::KernelError;

#[async_trait::async_trait]
pub trait LendingQuery<Connection: Transaction>: Sync + Send + 'static {
    /// Billable activities whose lending date falls inside the period,
    /// joined with the daily fee of the lent book's contract.
    async fn find_charges_in_period(
        &self,
        con: &mut Connection,
        period: &BillingPeriod,
    ) -> error_stack::Result<Vec<LendingCharge>, KernelError>;
}

pub trait DependOnLendingQuery<Connection: Transaction>: Sync + Send + 'static {
    type LendingQuery: LendingQuery<Connection>;
    fn lending_query(&self) -> &Self::LendingQuery;
}
