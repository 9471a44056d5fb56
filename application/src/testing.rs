use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use error_stack::Report;
use time::{Date, Duration, Month, OffsetDateTime};
use uuid::Uuid;

use kernel::interface::database::{QueryDatabaseConnection, Transaction};
use kernel::interface::gateway::{
    BankTransferService, DocumentRenderer, InvoiceNotice, Notifier, RenderedDocument,
    TransferOrder, TransferOutcome,
};
use kernel::interface::query::{
    BillingQuery, LendingQuery, SettlementIntentQuery, TenantQuery,
};
use kernel::interface::update::{BillingModifier, SettlementIntentModifier};
use kernel::prelude::entity::{
    AccountNumber, AccountType, BankAccount, BankName, BillingId, BillingPeriod, BillingRecord,
    BillingStatus, BookId, BranchCode, ContactEmail, CreatedAt, DailyFee, FeeBreakdown,
    IntentId, IntentStatus, InvoiceNumber, InvoiceSequence, LendingActivity, LendingCharge,
    LendingDate, LendingId, LendingStatus, PaymentAmount, ReturnDueDate, SettlementIntent,
    ShippingFee, Tenant, TenantId, TenantName, TransactionId, UsageFee, WithdrawalDate,
};
use kernel::interface::database::{
    DependOnDatabaseConnection,
};
use kernel::interface::gateway::{
    DependOnBankTransferService, DependOnDocumentRenderer, DependOnNotifier,
};
use kernel::interface::query::{
    DependOnBillingQuery, DependOnLendingQuery, DependOnSettlementIntentQuery, DependOnTenantQuery,
};
use kernel::interface::update::{DependOnBillingModifier, DependOnSettlementIntentModifier};
use kernel::KernelError;

use crate::transfer::PaymentRequestDto;

pub(crate) struct MockConnection;

#[async_trait::async_trait]
impl Transaction for MockConnection {
    async fn commit(self) -> error_stack::Result<(), KernelError> {
        Ok(())
    }

    async fn roll_back(self) -> error_stack::Result<(), KernelError> {
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct MockState {
    pub tenants: Vec<Tenant>,
    pub charges: Vec<LendingCharge>,
    pub billing: Vec<BillingRecord>,
    pub sequences: HashMap<String, i32>,
    pub intents: Vec<SettlementIntent>,
    pub fail_reads: bool,
}

impl MockState {
    pub fn complete_record(&mut self, id: Uuid) {
        let records = std::mem::take(&mut self.billing);
        self.billing = records
            .into_iter()
            .map(|record| {
                if *record.id().as_ref() == id {
                    let destruct = record.into_destruct();
                    BillingRecord::new(
                        destruct.id,
                        destruct.tenant_id,
                        destruct.period,
                        destruct.invoice_number,
                        destruct.breakdown,
                        destruct.amount,
                        BillingStatus::Completed,
                        destruct.transaction_id,
                        destruct.withdrawal_date,
                        destruct.created_at,
                    )
                } else {
                    record
                }
            })
            .collect();
    }
}

#[derive(Clone, Default)]
pub(crate) struct MockStore(Arc<Mutex<MockState>>);

impl MockStore {
    pub fn lock(&self) -> MutexGuard<'_, MockState> {
        self.0.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl QueryDatabaseConnection<MockConnection> for MockStore {
    async fn transact(&self) -> error_stack::Result<MockConnection, KernelError> {
        Ok(MockConnection)
    }
}

#[async_trait::async_trait]
impl TenantQuery<MockConnection> for MockStore {
    async fn find_by_id(
        &self,
        _con: &mut MockConnection,
        id: &TenantId,
    ) -> error_stack::Result<Option<Tenant>, KernelError> {
        Ok(self
            .lock()
            .tenants
            .iter()
            .find(|tenant| tenant.id() == id)
            .cloned())
    }

    async fn find_by_ids(
        &self,
        _con: &mut MockConnection,
        ids: &[TenantId],
    ) -> error_stack::Result<Vec<Tenant>, KernelError> {
        Ok(self
            .lock()
            .tenants
            .iter()
            .filter(|tenant| ids.contains(tenant.id()))
            .cloned()
            .collect())
    }
}

#[async_trait::async_trait]
impl LendingQuery<MockConnection> for MockStore {
    async fn find_charges_in_period(
        &self,
        _con: &mut MockConnection,
        period: &BillingPeriod,
    ) -> error_stack::Result<Vec<LendingCharge>, KernelError> {
        let state = self.lock();
        if state.fail_reads {
            return Err(Report::new(KernelError::Dependency("datastore")));
        }
        Ok(state
            .charges
            .iter()
            .filter(|charge| {
                let date = *charge.activity().lending_date().as_ref();
                date >= period.first_day() && date < period.next_first_day()
            })
            .cloned()
            .collect())
    }
}

#[async_trait::async_trait]
impl BillingQuery<MockConnection> for MockStore {
    async fn find_by_period(
        &self,
        _con: &mut MockConnection,
        period: &BillingPeriod,
    ) -> error_stack::Result<Vec<BillingRecord>, KernelError> {
        Ok(self
            .lock()
            .billing
            .iter()
            .filter(|record| record.period() == period)
            .cloned()
            .collect())
    }

    async fn find_statuses(
        &self,
        _con: &mut MockConnection,
        ids: &[BillingId],
    ) -> error_stack::Result<Vec<(BillingId, BillingStatus)>, KernelError> {
        Ok(self
            .lock()
            .billing
            .iter()
            .filter(|record| ids.contains(record.id()))
            .map(|record| (record.id().clone(), *record.status()))
            .collect())
    }

    async fn find_by_transaction_id(
        &self,
        _con: &mut MockConnection,
        transaction_id: &TransactionId,
    ) -> error_stack::Result<Option<BillingRecord>, KernelError> {
        Ok(self
            .lock()
            .billing
            .iter()
            .find(|record| record.transaction_id().as_ref() == Some(transaction_id))
            .cloned())
    }
}

#[async_trait::async_trait]
impl BillingModifier<MockConnection> for MockStore {
    async fn create(
        &self,
        _con: &mut MockConnection,
        record: &BillingRecord,
    ) -> error_stack::Result<(), KernelError> {
        self.lock().billing.push(record.clone());
        Ok(())
    }

    async fn next_sequence(
        &self,
        _con: &mut MockConnection,
        period: &BillingPeriod,
    ) -> error_stack::Result<InvoiceSequence, KernelError> {
        let mut state = self.lock();
        let sequence = state
            .sequences
            .entry(period.to_string())
            .and_modify(|sequence| *sequence += 1)
            .or_insert(1);
        Ok(InvoiceSequence::new(*sequence))
    }

    async fn complete(
        &self,
        _con: &mut MockConnection,
        ids: &[BillingId],
        settled_on: &WithdrawalDate,
    ) -> error_stack::Result<u64, KernelError> {
        let targets = ids.iter().map(|id| *id.as_ref()).collect::<HashSet<Uuid>>();
        let mut state = self.lock();
        let mut flipped = 0;
        let records = std::mem::take(&mut state.billing);
        state.billing = records
            .into_iter()
            .map(|record| {
                if targets.contains(record.id().as_ref())
                    && *record.status() == BillingStatus::Unpaid
                {
                    flipped += 1;
                    let destruct = record.into_destruct();
                    BillingRecord::new(
                        destruct.id,
                        destruct.tenant_id,
                        destruct.period,
                        destruct.invoice_number,
                        destruct.breakdown,
                        destruct.amount,
                        BillingStatus::Completed,
                        destruct.transaction_id,
                        Some(settled_on.clone()),
                        destruct.created_at,
                    )
                } else {
                    record
                }
            })
            .collect();
        Ok(flipped)
    }
}

#[async_trait::async_trait]
impl SettlementIntentQuery<MockConnection> for MockStore {
    async fn find_pending(
        &self,
        _con: &mut MockConnection,
    ) -> error_stack::Result<Vec<SettlementIntent>, KernelError> {
        Ok(self
            .lock()
            .intents
            .iter()
            .filter(|intent| *intent.status() == IntentStatus::Pending)
            .cloned()
            .collect())
    }
}

#[async_trait::async_trait]
impl SettlementIntentModifier<MockConnection> for MockStore {
    async fn create(
        &self,
        _con: &mut MockConnection,
        intent: &SettlementIntent,
    ) -> error_stack::Result<(), KernelError> {
        self.lock().intents.push(intent.clone());
        Ok(())
    }

    async fn transition(
        &self,
        _con: &mut MockConnection,
        id: &IntentId,
        status: IntentStatus,
    ) -> error_stack::Result<(), KernelError> {
        let mut state = self.lock();
        let intents = std::mem::take(&mut state.intents);
        state.intents = intents
            .into_iter()
            .map(|intent| {
                if intent.id() == id {
                    let destruct = intent.into_destruct();
                    SettlementIntent::new(
                        destruct.id,
                        destruct.kind,
                        destruct.billing_ids,
                        destruct.tenant_id,
                        destruct.amount,
                        status,
                        destruct.created_at,
                    )
                } else {
                    intent
                }
            })
            .collect();
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct MockBankState {
    pub transfer_calls: usize,
    pub withdraw_calls: usize,
    pub fail_transfers: bool,
    pub fail_withdrawals: bool,
    pub outcomes: HashMap<Uuid, TransferOutcome>,
}

#[derive(Clone, Default)]
pub(crate) struct MockBank(Arc<Mutex<MockBankState>>);

impl MockBank {
    pub fn lock(&self) -> MutexGuard<'_, MockBankState> {
        self.0.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl BankTransferService for MockBank {
    async fn transfer_bulk(
        &self,
        _idempotency_key: &IntentId,
        _orders: &[TransferOrder],
    ) -> error_stack::Result<(), KernelError> {
        let mut state = self.lock();
        if state.fail_transfers {
            return Err(Report::new(KernelError::Dependency("bank transfer service")));
        }
        state.transfer_calls += 1;
        Ok(())
    }

    async fn withdraw(
        &self,
        _idempotency_key: &IntentId,
        _account: &BankAccount,
        _amount: &PaymentAmount,
    ) -> error_stack::Result<TransactionId, KernelError> {
        let mut state = self.lock();
        if state.fail_withdrawals {
            return Err(Report::new(KernelError::Dependency("bank transfer service")));
        }
        state.withdraw_calls += 1;
        Ok(TransactionId::new(format!("TX-{}", state.withdraw_calls)))
    }

    async fn find_outcome(
        &self,
        idempotency_key: &IntentId,
    ) -> error_stack::Result<Option<TransferOutcome>, KernelError> {
        Ok(self.lock().outcomes.get(idempotency_key.as_ref()).cloned())
    }
}

#[derive(Default)]
pub(crate) struct MockRenderer;

impl DocumentRenderer for MockRenderer {
    fn render_invoice(
        &self,
        record: &BillingRecord,
    ) -> error_stack::Result<RenderedDocument, KernelError> {
        Ok(RenderedDocument::new(
            format!("invoice-{}.txt", record.id().as_ref()),
            "text/plain",
            b"rendered".to_vec(),
        ))
    }
}

#[derive(Clone, Default)]
pub(crate) struct MockNotifier {
    pub sent: Arc<Mutex<Vec<(String, String)>>>,
    pub fail: Arc<Mutex<bool>>,
}

#[async_trait::async_trait]
impl Notifier for MockNotifier {
    async fn send(
        &self,
        recipient: &ContactEmail,
        notice: &InvoiceNotice,
    ) -> error_stack::Result<(), KernelError> {
        if *self.fail.lock().unwrap() {
            return Err(Report::new(KernelError::Dependency("notification delivery")));
        }
        self.sent
            .lock()
            .unwrap()
            .push((recipient.as_ref().clone(), notice.subject().clone()));
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct MockApp {
    pub store: MockStore,
    pub bank: MockBank,
    pub renderer: MockRenderer,
    pub notifier: MockNotifier,
}

impl DependOnDatabaseConnection<MockConnection> for MockApp {
    type DatabaseConnection = MockStore;

    fn database_connection(&self) -> &Self::DatabaseConnection {
        &self.store
    }
}

impl DependOnTenantQuery<MockConnection> for MockApp {
    type TenantQuery = MockStore;

    fn tenant_query(&self) -> &Self::TenantQuery {
        &self.store
    }
}

impl DependOnLendingQuery<MockConnection> for MockApp {
    type LendingQuery = MockStore;

    fn lending_query(&self) -> &Self::LendingQuery {
        &self.store
    }
}

impl DependOnBillingQuery<MockConnection> for MockApp {
    type BillingQuery = MockStore;

    fn billing_query(&self) -> &Self::BillingQuery {
        &self.store
    }
}

impl DependOnSettlementIntentQuery<MockConnection> for MockApp {
    type SettlementIntentQuery = MockStore;

    fn settlement_intent_query(&self) -> &Self::SettlementIntentQuery {
        &self.store
    }
}

impl DependOnBillingModifier<MockConnection> for MockApp {
    type BillingModifier = MockStore;

    fn billing_modifier(&self) -> &Self::BillingModifier {
        &self.store
    }
}

impl DependOnSettlementIntentModifier<MockConnection> for MockApp {
    type SettlementIntentModifier = MockStore;

    fn settlement_intent_modifier(&self) -> &Self::SettlementIntentModifier {
        &self.store
    }
}

impl DependOnBankTransferService for MockApp {
    type BankTransferService = MockBank;

    fn bank_transfer_service(&self) -> &Self::BankTransferService {
        &self.bank
    }
}

impl DependOnDocumentRenderer for MockApp {
    type DocumentRenderer = MockRenderer;

    fn document_renderer(&self) -> &Self::DocumentRenderer {
        &self.renderer
    }
}

impl DependOnNotifier for MockApp {
    type Notifier = MockNotifier;

    fn notifier(&self) -> &Self::Notifier {
        &self.notifier
    }
}

pub(crate) fn tenant(id: Uuid, name: &str) -> Tenant {
    Tenant::new(
        TenantId::new(id),
        TenantName::new(name),
        ContactEmail::new(format!("billing-{id}@example.co.jp")),
        BankAccount::new(
            BankName::new("Example Bank"),
            BranchCode::new("001"),
            AccountType::new("ordinary"),
            AccountNumber::new("1234567"),
        ),
    )
}

pub(crate) fn charge(tenant_id: Uuid, year: i32, month: u8, day: u8, daily_fee: i64) -> LendingCharge {
    let lending_date = Date::from_calendar_date(year, Month::try_from(month).unwrap(), day).unwrap();
    let activity = LendingActivity::new(
        LendingId::new(Uuid::new_v4()),
        BookId::new(Uuid::new_v4()),
        TenantId::new(tenant_id),
        LendingDate::new(lending_date),
        ReturnDueDate::new(lending_date + Duration::days(14)),
        None,
        LendingStatus::Active,
    );
    LendingCharge::new(activity, DailyFee::new(daily_fee))
}

pub(crate) fn unpaid_record(id: Uuid, company: Uuid, month: &str, amount: i64) -> BillingRecord {
    let period = BillingPeriod::parse(month).unwrap();
    BillingRecord::issue(
        BillingId::new(id),
        TenantId::new(company),
        period.clone(),
        InvoiceNumber::compose(&period, &InvoiceSequence::new(1)),
        FeeBreakdown::new(UsageFee::new(amount - 500), ShippingFee::new(500)),
        CreatedAt::new(OffsetDateTime::now_utc()),
    )
}

pub(crate) fn payment_request(id: Uuid, amount: i64) -> PaymentRequestDto {
    PaymentRequestDto {
        id,
        company_id: Uuid::from_u128(7),
        amount,
        bank_name: "Example Bank".to_string(),
        branch_code: "001".to_string(),
        account_number: "1234567".to_string(),
    }
}
