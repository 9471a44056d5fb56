use error_stack::Report;
use time::OffsetDateTime;
use uuid::Uuid;

use kernel::interface::database::{
    DependOnDatabaseConnection, QueryDatabaseConnection, Transaction,
};
use kernel::interface::gateway::{BankTransferService, DependOnBankTransferService};
use kernel::interface::query::{DependOnTenantQuery, TenantQuery};
use kernel::interface::update::{
    BillingModifier, DependOnBillingModifier, DependOnSettlementIntentModifier,
    SettlementIntentModifier,
};
use kernel::prelude::entity::{
    BillingId, BillingPeriod, BillingRecord, CreatedAt, IntentId, IntentStatus, PaymentAmount,
    SettlementIntent, TenantId, WithdrawalDate,
};
use kernel::KernelError;

use crate::transfer::{WithdrawalDto, WithdrawalReceiptDto};

#[async_trait::async_trait]
pub trait AutoWithdrawalService<Connection: Transaction + Send>:
    'static
    + Sync
    + Send
    + DependOnDatabaseConnection<Connection>
    + DependOnTenantQuery<Connection>
    + DependOnBillingModifier<Connection>
    + DependOnSettlementIntentModifier<Connection>
    + DependOnBankTransferService
{
    /// Single-tenant automatic withdrawal. On success a `completed` ledger
    /// entry is written with the bank's transaction id; on bank failure no
    /// ledger entry is created. If the ledger write fails after the bank
    /// accepted the transfer, the intent stays `pending` and reconciliation
    /// replays the write.
    async fn execute_withdrawal(
        &self,
        dto: WithdrawalDto,
    ) -> error_stack::Result<WithdrawalReceiptDto, KernelError> {
        if dto.amount <= 0 {
            return Err(Report::new(KernelError::Validation(
                "invalid payment amount",
            )));
        }
        let withdrawal_date = WithdrawalDate::parse(&dto.withdrawal_date)?;
        let period = BillingPeriod::from_date(*withdrawal_date.as_ref())?;
        let amount = PaymentAmount::new(dto.amount);

        let tenant_id = TenantId::new(dto.company_id);
        let mut connection = self.database_connection().transact().await?;
        let tenant = self
            .tenant_query()
            .find_by_id(&mut connection, &tenant_id)
            .await?
            .ok_or_else(|| Report::new(KernelError::NotFound("company")))?;

        let intent = SettlementIntent::withdrawal(
            IntentId::new(Uuid::new_v4()),
            tenant_id.clone(),
            amount.clone(),
            CreatedAt::new(OffsetDateTime::now_utc()),
        );
        self.settlement_intent_modifier()
            .create(&mut connection, &intent)
            .await?;
        connection.commit().await?;

        let transaction_id = match self
            .bank_transfer_service()
            .withdraw(intent.id(), tenant.bank_account(), &amount)
            .await
        {
            Ok(transaction_id) => transaction_id,
            Err(report) => {
                self.abandon_withdrawal_intent(intent.id(), &report).await;
                return Err(report);
            }
        };

        let record = BillingRecord::collect(
            BillingId::new(Uuid::new_v4()),
            tenant_id,
            period,
            amount,
            transaction_id.clone(),
            withdrawal_date,
            CreatedAt::new(OffsetDateTime::now_utc()),
        );
        let mut connection = self.database_connection().transact().await?;
        self.billing_modifier().create(&mut connection, &record).await?;
        self.settlement_intent_modifier()
            .transition(&mut connection, intent.id(), IntentStatus::Completed)
            .await?;
        connection.commit().await?;

        Ok(WithdrawalReceiptDto {
            transaction_id: transaction_id.as_ref().clone(),
        })
    }

    /// Mirrors the settlement processor's discipline: terminal rejections are
    /// marked `failed`, timeouts stay `pending` for reconciliation.
    async fn abandon_withdrawal_intent(&self, id: &IntentId, report: &Report<KernelError>) {
        if matches!(report.current_context(), KernelError::Timeout) {
            return;
        }
        let marked: error_stack::Result<(), KernelError> = async {
            let mut connection = self.database_connection().transact().await?;
            self.settlement_intent_modifier()
                .transition(&mut connection, id, IntentStatus::Failed)
                .await?;
            connection.commit().await
        }
        .await;
        if let Err(mark_failure) = marked {
            tracing::error!("could not mark withdrawal intent as failed: {mark_failure:?}");
        }
    }
}

impl<Connection: Transaction + Send, T> AutoWithdrawalService<Connection> for T where
    T: DependOnDatabaseConnection<Connection>
        + DependOnTenantQuery<Connection>
        + DependOnBillingModifier<Connection>
        + DependOnSettlementIntentModifier<Connection>
        + DependOnBankTransferService
{
}

#[cfg(test)]
mod test {
    use uuid::Uuid;

    use kernel::prelude::entity::{BillingStatus, IntentStatus};
    use kernel::KernelError;

    use crate::testing::{tenant, MockApp};
    use crate::transfer::WithdrawalDto;

    use super::AutoWithdrawalService;

    #[tokio::test]
    async fn records_a_completed_ledger_entry() {
        let app = MockApp::default();
        let company = Uuid::from_u128(1);
        app.store.lock().tenants.push(tenant(company, "Alpha Trading"));

        let receipt = app
            .execute_withdrawal(WithdrawalDto {
                company_id: company,
                amount: 30000,
                withdrawal_date: "2024-01-27".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(receipt.transaction_id, "TX-1");

        let state = app.store.lock();
        assert_eq!(state.billing.len(), 1);
        let record = &state.billing[0];
        assert_eq!(*record.status(), BillingStatus::Completed);
        assert_eq!(record.invoice_number(), &None);
        assert_eq!(*record.amount().as_ref(), 30000);
        assert_eq!(record.period().to_string(), "2024-01");
        assert_eq!(
            record.transaction_id().as_ref().map(|id| id.as_ref().clone()),
            Some("TX-1".to_string())
        );
        assert_eq!(state.intents.len(), 1);
        assert_eq!(*state.intents[0].status(), IntentStatus::Completed);
    }

    #[tokio::test]
    async fn unknown_tenant_creates_no_ledger_entry() {
        let app = MockApp::default();
        let report = app
            .execute_withdrawal(WithdrawalDto {
                company_id: Uuid::from_u128(9),
                amount: 30000,
                withdrawal_date: "2024-01-27".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(
            report.current_context(),
            KernelError::NotFound("company")
        ));
        let state = app.store.lock();
        assert!(state.billing.is_empty());
        assert!(state.intents.is_empty());
        assert_eq!(app.bank.lock().withdraw_calls, 0);
    }

    #[tokio::test]
    async fn non_positive_amount_is_rejected() {
        let app = MockApp::default();
        let report = app
            .execute_withdrawal(WithdrawalDto {
                company_id: Uuid::from_u128(1),
                amount: 0,
                withdrawal_date: "2024-01-27".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(
            report.current_context(),
            KernelError::Validation("invalid payment amount")
        ));
    }

    #[tokio::test]
    async fn malformed_date_is_rejected() {
        let app = MockApp::default();
        let report = app
            .execute_withdrawal(WithdrawalDto {
                company_id: Uuid::from_u128(1),
                amount: 30000,
                withdrawal_date: "soon".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(
            report.current_context(),
            KernelError::Validation("invalid withdrawal date format")
        ));
    }

    #[tokio::test]
    async fn bank_failure_leaves_no_ledger_entry() {
        let app = MockApp::default();
        let company = Uuid::from_u128(1);
        app.store.lock().tenants.push(tenant(company, "Alpha Trading"));
        app.bank.lock().fail_withdrawals = true;

        let report = app
            .execute_withdrawal(WithdrawalDto {
                company_id: company,
                amount: 30000,
                withdrawal_date: "2024-01-27".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(
            report.current_context(),
            KernelError::Dependency(_)
        ));

        let state = app.store.lock();
        assert!(state.billing.is_empty());
        assert_eq!(state.intents.len(), 1);
        assert_eq!(*state.intents[0].status(), IntentStatus::Failed);
    }
}
