use crate::database::Transaction;
use crate::entity::{IntentId, IntentStatus, SettlementIntent};
use crate::KernelError;

#[async_trait::async_trait]
pub trait SettlementIntentModifier<Connection: Transaction>: Sync + Send + 'static {
    async fn create(
        &self,
        con: &mut Connection,
        intent: &SettlementIntent,
    ) -> error_stack::Result<(), KernelError>;

    async fn transition(
        &self,
        con: &mut Connection,
        id: &IntentId,
        status: IntentStatus,
    ) -> error_stack::Result<(), KernelError>;
}

pub trait DependOnSettlementIntentModifier<Connection: Transaction>: Sync + Send + 'static {
    type SettlementIntentModifier: SettlementIntentModifier<Connection>;
    fn settlement_intent_modifier(&self) -> &Self::SettlementIntentModifier;
}
