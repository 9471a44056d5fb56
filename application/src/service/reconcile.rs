use time::OffsetDateTime;
use uuid::Uuid;

use kernel::interface::database::{
    DependOnDatabaseConnection, QueryDatabaseConnection, Transaction,
};
use kernel::interface::gateway::{
    BankTransferService, DependOnBankTransferService, TransferOutcome,
};
use kernel::interface::query::{
    BillingQuery, DependOnBillingQuery, DependOnSettlementIntentQuery, SettlementIntentQuery,
};
use kernel::interface::update::{
    BillingModifier, DependOnBillingModifier, DependOnSettlementIntentModifier,
    SettlementIntentModifier,
};
use kernel::prelude::entity::{
    BillingId, BillingPeriod, BillingRecord, CreatedAt, IntentKind, IntentStatus,
    SettlementIntent, TransactionId, WithdrawalDate,
};
use kernel::KernelError;

use crate::transfer::ReconciliationReportDto;

#[async_trait::async_trait]
pub trait ReconcileSettlementService<Connection: Transaction + Send>:
    'static
    + Sync
    + Send
    + DependOnDatabaseConnection<Connection>
    + DependOnSettlementIntentQuery<Connection>
    + DependOnSettlementIntentModifier<Connection>
    + DependOnBillingQuery<Connection>
    + DependOnBillingModifier<Connection>
    + DependOnBankTransferService
{
    /// Closes intents stuck in `pending`: asks the bank for the terminal
    /// outcome of each idempotency key and replays the missing ledger write.
    /// A key the bank has never seen means the transfer never happened.
    async fn reconcile_settlements(
        &self,
    ) -> error_stack::Result<ReconciliationReportDto, KernelError> {
        let mut connection = self.database_connection().transact().await?;
        let pending = self
            .settlement_intent_query()
            .find_pending(&mut connection)
            .await?;
        connection.commit().await?;

        let mut completed = 0;
        let mut failed = 0;
        for intent in &pending {
            match self
                .bank_transfer_service()
                .find_outcome(intent.id())
                .await?
            {
                Some(TransferOutcome::Completed { transaction_id }) => {
                    if self.replay_completion(intent, transaction_id).await? {
                        completed += 1;
                    }
                }
                Some(TransferOutcome::Rejected) | None => {
                    let mut connection = self.database_connection().transact().await?;
                    self.settlement_intent_modifier()
                        .transition(&mut connection, intent.id(), IntentStatus::Failed)
                        .await?;
                    connection.commit().await?;
                    failed += 1;
                }
            }
        }
        Ok(ReconciliationReportDto {
            examined: pending.len(),
            completed,
            failed,
        })
    }

    async fn replay_completion(
        &self,
        intent: &SettlementIntent,
        transaction_id: Option<TransactionId>,
    ) -> error_stack::Result<bool, KernelError> {
        let mut connection = self.database_connection().transact().await?;
        let settled_on = WithdrawalDate::new(OffsetDateTime::now_utc().date());
        match intent.kind() {
            IntentKind::Bulk => {
                // compare-and-swap: rows someone already flipped stay untouched
                self.billing_modifier()
                    .complete(&mut connection, intent.billing_ids(), &settled_on)
                    .await?;
            }
            IntentKind::Withdrawal => {
                let (Some(transaction_id), Some(tenant_id)) =
                    (transaction_id, intent.tenant_id().clone())
                else {
                    tracing::warn!(
                        "pending withdrawal intent lacks transaction id or tenant; left for manual review"
                    );
                    return Ok(false);
                };
                let existing = self
                    .billing_query()
                    .find_by_transaction_id(&mut connection, &transaction_id)
                    .await?;
                if existing.is_none() {
                    let period = BillingPeriod::from_date(*settled_on.as_ref())?;
                    let record = BillingRecord::collect(
                        BillingId::new(Uuid::new_v4()),
                        tenant_id,
                        period,
                        intent.amount().clone(),
                        transaction_id,
                        settled_on,
                        CreatedAt::new(OffsetDateTime::now_utc()),
                    );
                    self.billing_modifier().create(&mut connection, &record).await?;
                }
            }
        }
        self.settlement_intent_modifier()
            .transition(&mut connection, intent.id(), IntentStatus::Completed)
            .await?;
        connection.commit().await?;
        Ok(true)
    }
}

impl<Connection: Transaction + Send, T> ReconcileSettlementService<Connection> for T where
    T: DependOnDatabaseConnection<Connection>
        + DependOnSettlementIntentQuery<Connection>
        + DependOnSettlementIntentModifier<Connection>
        + DependOnBillingQuery<Connection>
        + DependOnBillingModifier<Connection>
        + DependOnBankTransferService
{
}

#[cfg(test)]
mod test {
    use time::OffsetDateTime;
    use uuid::Uuid;

    use kernel::interface::gateway::TransferOutcome;
    use kernel::prelude::entity::{
        BillingId, BillingStatus, CreatedAt, IntentId, IntentStatus, PaymentAmount,
        SettlementIntent, TenantId, TransactionId,
    };

    use crate::testing::{unpaid_record, MockApp};

    use super::ReconcileSettlementService;

    #[tokio::test]
    async fn replays_a_lost_withdrawal_ledger_write() {
        let app = MockApp::default();
        let company = Uuid::from_u128(1);
        let intent_id = Uuid::from_u128(100);
        {
            let mut state = app.store.lock();
            state.intents.push(SettlementIntent::withdrawal(
                IntentId::new(intent_id),
                TenantId::new(company),
                PaymentAmount::new(30000),
                CreatedAt::new(OffsetDateTime::now_utc()),
            ));
        }
        app.bank.lock().outcomes.insert(
            intent_id,
            TransferOutcome::Completed {
                transaction_id: Some(TransactionId::new("TX-9")),
            },
        );

        let report = app.reconcile_settlements().await.unwrap();
        assert_eq!(report.examined, 1);
        assert_eq!(report.completed, 1);
        assert_eq!(report.failed, 0);

        let state = app.store.lock();
        assert_eq!(state.billing.len(), 1);
        assert_eq!(*state.billing[0].status(), BillingStatus::Completed);
        assert_eq!(
            state.billing[0]
                .transaction_id()
                .as_ref()
                .map(|id| id.as_ref().clone()),
            Some("TX-9".to_string())
        );
        assert_eq!(*state.intents[0].status(), IntentStatus::Completed);
    }

    #[tokio::test]
    async fn unknown_outcome_marks_the_intent_failed() {
        let app = MockApp::default();
        {
            let mut state = app.store.lock();
            state.intents.push(SettlementIntent::withdrawal(
                IntentId::new(Uuid::from_u128(101)),
                TenantId::new(Uuid::from_u128(1)),
                PaymentAmount::new(30000),
                CreatedAt::new(OffsetDateTime::now_utc()),
            ));
        }

        let report = app.reconcile_settlements().await.unwrap();
        assert_eq!(report.failed, 1);
        let state = app.store.lock();
        assert!(state.billing.is_empty());
        assert_eq!(*state.intents[0].status(), IntentStatus::Failed);
    }

    #[tokio::test]
    async fn completes_a_pending_bulk_intent() {
        let app = MockApp::default();
        let billing_id = Uuid::from_u128(50);
        let intent_id = Uuid::from_u128(102);
        {
            let mut state = app.store.lock();
            state
                .billing
                .push(unpaid_record(billing_id, Uuid::from_u128(1), "2024-01", 50000));
            state.intents.push(SettlementIntent::bulk(
                IntentId::new(intent_id),
                vec![BillingId::new(billing_id)],
                PaymentAmount::new(50000),
                CreatedAt::new(OffsetDateTime::now_utc()),
            ));
        }
        app.bank.lock().outcomes.insert(
            intent_id,
            TransferOutcome::Completed {
                transaction_id: None,
            },
        );

        let report = app.reconcile_settlements().await.unwrap();
        assert_eq!(report.completed, 1);

        let state = app.store.lock();
        assert_eq!(*state.billing[0].status(), BillingStatus::Completed);
        assert_eq!(*state.intents[0].status(), IntentStatus::Completed);
    }
}
