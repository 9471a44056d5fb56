use std::collections::{HashMap, HashSet};

use error_stack::Report;
use time::OffsetDateTime;
use uuid::Uuid;

use kernel::interface::database::{
    DependOnDatabaseConnection, QueryDatabaseConnection, Transaction,
};
use kernel::interface::gateway::{
    BankTransferService, DependOnBankTransferService, TransferOrder,
};
use kernel::interface::query::{
    BillingQuery, DependOnBillingQuery, DependOnTenantQuery, TenantQuery,
};
use kernel::interface::update::{
    BillingModifier, DependOnBillingModifier, DependOnSettlementIntentModifier,
    SettlementIntentModifier,
};
use kernel::prelude::entity::{
    AccountNumber, BankInfo, BankName, BillingId, BranchCode, CreatedAt, DestructTenant, IntentId,
    IntentStatus, PaymentAmount, PaymentInstruction, SettlementIntent, TenantId, TenantName,
    WithdrawalDate, MAX_SETTLEMENT_BATCH,
};
use kernel::KernelError;

use crate::transfer::{SettleBatchDto, SettlementReportDto};

#[async_trait::async_trait]
pub trait ProcessSettlementService<Connection: Transaction + Send>:
    'static
    + Sync
    + Send
    + DependOnDatabaseConnection<Connection>
    + DependOnTenantQuery<Connection>
    + DependOnBillingQuery<Connection>
    + DependOnBillingModifier<Connection>
    + DependOnSettlementIntentModifier<Connection>
    + DependOnBankTransferService
{
    /// Bulk settlement. The whole batch is validated before any external
    /// call; one bulk transfer is issued; on success every referenced record
    /// flips to `completed` in one transaction, on failure none does.
    async fn process_settlement(
        &self,
        dto: SettleBatchDto,
    ) -> error_stack::Result<SettlementReportDto, KernelError> {
        if dto.requests.is_empty() {
            return Err(Report::new(KernelError::Validation(
                "payment requests are missing",
            )));
        }
        if dto.requests.len() > MAX_SETTLEMENT_BATCH {
            return Err(Report::new(KernelError::Validation(
                "settlement batch limit exceeded",
            )));
        }
        let mut instructions = Vec::with_capacity(dto.requests.len());
        for request in &dto.requests {
            if request.amount <= 0 {
                return Err(Report::new(KernelError::Validation(
                    "invalid payment amount",
                )));
            }
            if request.bank_name.is_empty()
                || request.branch_code.is_empty()
                || request.account_number.is_empty()
            {
                return Err(Report::new(KernelError::Validation(
                    "incomplete bank information",
                )));
            }
            instructions.push(PaymentInstruction::new(
                BillingId::new(request.id),
                TenantId::new(request.company_id),
                PaymentAmount::new(request.amount),
                BankInfo::new(
                    BankName::new(request.bank_name.clone()),
                    BranchCode::new(request.branch_code.clone()),
                    AccountNumber::new(request.account_number.clone()),
                ),
            ));
        }

        let billing_ids = instructions
            .iter()
            .map(|instruction| instruction.billing_id().clone())
            .collect::<Vec<BillingId>>();
        // the terminal flip is a compare-and-swap counted against the batch
        // size, so a duplicated id would make a successful transfer look like
        // a conflict after the fact
        if billing_ids.iter().collect::<HashSet<_>>().len() != billing_ids.len() {
            return Err(Report::new(KernelError::Validation(
                "duplicate billing record included",
            )));
        }

        let mut connection = self.database_connection().transact().await?;
        let statuses = self
            .billing_query()
            .find_statuses(&mut connection, &billing_ids)
            .await?;
        let found = statuses.into_iter().collect::<HashMap<_, _>>();
        for id in &billing_ids {
            match found.get(id) {
                None => {
                    return Err(Report::new(KernelError::Validation(
                        "unknown billing record included",
                    )))
                }
                Some(status) if status.is_settled() => {
                    return Err(Report::new(KernelError::Conflict("already processed")))
                }
                Some(_) => {}
            }
        }

        let tenant_ids = instructions
            .iter()
            .map(|instruction| instruction.tenant_id().clone())
            .collect::<Vec<TenantId>>();
        let names = self
            .tenant_query()
            .find_by_ids(&mut connection, &tenant_ids)
            .await?
            .into_iter()
            .map(|tenant| {
                let DestructTenant { id, name, .. } = tenant.into_destruct();
                (id, name)
            })
            .collect::<HashMap<TenantId, TenantName>>();

        let total = PaymentAmount::new(
            instructions
                .iter()
                .map(|instruction| *instruction.amount().as_ref())
                .sum::<i64>(),
        );
        // durable intent before the external call; its id is the idempotency
        // key the bank sees
        let intent = SettlementIntent::bulk(
            IntentId::new(Uuid::new_v4()),
            billing_ids.clone(),
            total,
            CreatedAt::new(OffsetDateTime::now_utc()),
        );
        self.settlement_intent_modifier()
            .create(&mut connection, &intent)
            .await?;
        connection.commit().await?;

        let today = OffsetDateTime::now_utc().date();
        let description = format!(
            "usage fee payment - {:04}-{:02}-{:02}",
            today.year(),
            u8::from(today.month()),
            today.day()
        );
        let orders = instructions
            .iter()
            .map(|instruction| {
                let recipient = names
                    .get(instruction.tenant_id())
                    .cloned()
                    .unwrap_or_default();
                TransferOrder::new(
                    recipient,
                    instruction.bank_info().clone(),
                    instruction.amount().clone(),
                    description.clone(),
                )
            })
            .collect::<Vec<TransferOrder>>();

        if let Err(report) = self
            .bank_transfer_service()
            .transfer_bulk(intent.id(), &orders)
            .await
        {
            self.abandon_intent(intent.id(), &report).await;
            return Err(report);
        }

        let settled_on = WithdrawalDate::new(today);
        let mut connection = self.database_connection().transact().await?;
        let flipped = self
            .billing_modifier()
            .complete(&mut connection, &billing_ids, &settled_on)
            .await?;
        if flipped != billing_ids.len() as u64 {
            // another settlement raced us between the guard and the flip;
            // roll back and leave the intent pending for reconciliation
            connection.roll_back().await?;
            return Err(Report::new(KernelError::Conflict("already processed")));
        }
        self.settlement_intent_modifier()
            .transition(&mut connection, intent.id(), IntentStatus::Completed)
            .await?;
        connection.commit().await?;

        Ok(SettlementReportDto {
            processed_count: dto.requests.len(),
        })
    }

    /// Best-effort `failed` mark after a terminal bank rejection. Timeouts
    /// stay `pending`: the outcome is unknown and belongs to reconciliation.
    async fn abandon_intent(&self, id: &IntentId, report: &Report<KernelError>) {
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
            tracing::error!("could not mark settlement intent as failed: {mark_failure:?}");
        }
    }
}

impl<Connection: Transaction + Send, T> ProcessSettlementService<Connection> for T where
    T: DependOnDatabaseConnection<Connection>
        + DependOnTenantQuery<Connection>
        + DependOnBillingQuery<Connection>
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

    use crate::testing::{payment_request, tenant, unpaid_record, MockApp};
    use crate::transfer::SettleBatchDto;

    use super::ProcessSettlementService;

    fn settled_app(ids: &[Uuid]) -> MockApp {
        let app = MockApp::default();
        let mut state = app.store.lock();
        for (index, id) in ids.iter().enumerate() {
            let company = Uuid::from_u128(index as u128 + 1);
            state.tenants.push(tenant(company, "Tenant"));
            state.billing.push(unpaid_record(*id, company, "2024-01", 50000));
        }
        drop(state);
        app
    }

    #[tokio::test]
    async fn settles_a_valid_batch() {
        let first = Uuid::from_u128(11);
        let second = Uuid::from_u128(12);
        let app = settled_app(&[first, second]);

        let report = app
            .process_settlement(SettleBatchDto {
                requests: vec![payment_request(first, 50000), payment_request(second, 50000)],
            })
            .await
            .unwrap();
        assert_eq!(report.processed_count, 2);

        let state = app.store.lock();
        assert!(state
            .billing
            .iter()
            .all(|record| *record.status() == BillingStatus::Completed));
        assert!(state
            .billing
            .iter()
            .all(|record| record.withdrawal_date().is_some()));
        assert_eq!(state.intents.len(), 1);
        assert_eq!(*state.intents[0].status(), IntentStatus::Completed);
        assert_eq!(app.bank.lock().transfer_calls, 1);
    }

    #[tokio::test]
    async fn empty_batch_is_rejected() {
        let app = MockApp::default();
        let report = app
            .process_settlement(SettleBatchDto { requests: vec![] })
            .await
            .unwrap_err();
        assert!(matches!(
            report.current_context(),
            KernelError::Validation("payment requests are missing")
        ));
        assert_eq!(app.bank.lock().transfer_calls, 0);
    }

    #[tokio::test]
    async fn oversized_batch_is_rejected_before_any_external_call() {
        let app = MockApp::default();
        let requests = (0..101)
            .map(|index| payment_request(Uuid::from_u128(index as u128 + 100), 1000))
            .collect();
        let report = app
            .process_settlement(SettleBatchDto { requests })
            .await
            .unwrap_err();
        assert!(matches!(
            report.current_context(),
            KernelError::Validation("settlement batch limit exceeded")
        ));
        assert_eq!(app.bank.lock().transfer_calls, 0);
        assert!(app.store.lock().intents.is_empty());
    }

    #[tokio::test]
    async fn non_positive_amount_rejects_the_whole_batch() {
        let first = Uuid::from_u128(21);
        let second = Uuid::from_u128(22);
        let app = settled_app(&[first, second]);

        let mut bad = payment_request(second, 50000);
        bad.amount = 0;
        let report = app
            .process_settlement(SettleBatchDto {
                requests: vec![payment_request(first, 50000), bad],
            })
            .await
            .unwrap_err();
        assert!(matches!(
            report.current_context(),
            KernelError::Validation("invalid payment amount")
        ));

        let state = app.store.lock();
        assert!(state
            .billing
            .iter()
            .all(|record| *record.status() == BillingStatus::Unpaid));
        assert_eq!(app.bank.lock().transfer_calls, 0);
    }

    #[tokio::test]
    async fn incomplete_bank_info_rejects_the_whole_batch() {
        let first = Uuid::from_u128(31);
        let app = settled_app(&[first]);

        let mut bad = payment_request(first, 50000);
        bad.branch_code = String::new();
        let report = app
            .process_settlement(SettleBatchDto {
                requests: vec![bad],
            })
            .await
            .unwrap_err();
        assert!(matches!(
            report.current_context(),
            KernelError::Validation("incomplete bank information")
        ));
        assert_eq!(app.bank.lock().transfer_calls, 0);
    }

    #[tokio::test]
    async fn already_processed_record_is_rejected_with_zero_transfer_calls() {
        let first = Uuid::from_u128(41);
        let second = Uuid::from_u128(42);
        let app = settled_app(&[first, second]);
        app.store.lock().complete_record(second);

        let report = app
            .process_settlement(SettleBatchDto {
                requests: vec![payment_request(first, 50000), payment_request(second, 50000)],
            })
            .await
            .unwrap_err();
        assert!(matches!(
            report.current_context(),
            KernelError::Conflict("already processed")
        ));
        assert_eq!(app.bank.lock().transfer_calls, 0);
        // the still-unpaid record must not have moved either
        let state = app.store.lock();
        let untouched = state
            .billing
            .iter()
            .find(|record| *record.id().as_ref() == first)
            .unwrap();
        assert_eq!(*untouched.status(), BillingStatus::Unpaid);
    }

    #[tokio::test]
    async fn unknown_billing_record_rejects_the_batch() {
        let first = Uuid::from_u128(51);
        let app = settled_app(&[first]);
        let report = app
            .process_settlement(SettleBatchDto {
                requests: vec![
                    payment_request(first, 50000),
                    payment_request(Uuid::from_u128(999), 50000),
                ],
            })
            .await
            .unwrap_err();
        assert!(matches!(
            report.current_context(),
            KernelError::Validation("unknown billing record included")
        ));
        assert_eq!(app.bank.lock().transfer_calls, 0);
    }

    #[tokio::test]
    async fn duplicate_billing_record_rejects_the_batch() {
        let first = Uuid::from_u128(61);
        let app = settled_app(&[first]);
        let report = app
            .process_settlement(SettleBatchDto {
                requests: vec![payment_request(first, 50000), payment_request(first, 50000)],
            })
            .await
            .unwrap_err();
        assert!(matches!(
            report.current_context(),
            KernelError::Validation("duplicate billing record included")
        ));
        assert_eq!(app.bank.lock().transfer_calls, 0);
    }

    #[tokio::test]
    async fn transfer_failure_leaves_every_record_untouched() {
        let first = Uuid::from_u128(71);
        let second = Uuid::from_u128(72);
        let app = settled_app(&[first, second]);
        app.bank.lock().fail_transfers = true;

        let report = app
            .process_settlement(SettleBatchDto {
                requests: vec![payment_request(first, 50000), payment_request(second, 50000)],
            })
            .await
            .unwrap_err();
        assert!(matches!(
            report.current_context(),
            KernelError::Dependency(_)
        ));

        let state = app.store.lock();
        assert!(state
            .billing
            .iter()
            .all(|record| *record.status() == BillingStatus::Unpaid));
        // the intent records the terminal rejection
        assert_eq!(state.intents.len(), 1);
        assert_eq!(*state.intents[0].status(), IntentStatus::Failed);
    }
}
