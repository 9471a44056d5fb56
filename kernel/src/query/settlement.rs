use crate::database::Transaction;
use crate::entity::SettlementIntent;
use crate::KernelError;

#[async_trait::async_trait]
pub trait SettlementIntentQuery<Connection: Transaction>: Sync + Send + 'static {
    async fn find_pending(
        &self,
        con: &mut Connection,
    ) -> error_stack::Result<Vec<SettlementIntent>, KernelError>;
}

pub trait DependOnSettlementIntentQuery<Connection: Transaction>: Sync + Send + 'static {
    type SettlementIntentQuery: SettlementIntentQuery<Connection>;
    fn settlement_intent_query(&self) -> &Self::SettlementIntentQuery;
}
