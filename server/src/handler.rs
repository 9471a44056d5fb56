use driver::database::{
    PgTransaction, PostgresBillingRepository, PostgresDatabase, PostgresLendingRepository,
    PostgresSettlementIntentRepository, PostgresTenantRepository,
};
use driver::gateway::{BankApiClient, DeliveryApiClient, PlainTextRenderer};
use kernel::interface::database::DependOnDatabaseConnection;
use kernel::interface::gateway::{
    DependOnBankTransferService, DependOnDocumentRenderer, DependOnNotifier,
};
use kernel::interface::query::{
    DependOnBillingQuery, DependOnLendingQuery, DependOnSettlementIntentQuery, DependOnTenantQuery,
};
use kernel::interface::update::{DependOnBillingModifier, DependOnSettlementIntentModifier};
use kernel::KernelError;
use std::ops::Deref;
use std::sync::Arc;
use vodca::References;

#[derive(Clone)]
pub struct AppModule(Arc<Handler>);

impl AppModule {
    pub async fn new() -> error_stack::Result<Self, KernelError> {
        Ok(Self(Arc::new(Handler::init().await?)))
    }
}

impl Deref for AppModule {
    type Target = Handler;
    fn deref(&self) -> &Self::Target {
        Deref::deref(&self.0)
    }
}

/// Composition root: every dependency is constructed once and injected
/// explicitly through the `DependOn*` seams.
#[derive(References)]
pub struct Handler {
    database: PostgresDatabase,
    tenants: PostgresTenantRepository,
    lendings: PostgresLendingRepository,
    billings: PostgresBillingRepository,
    intents: PostgresSettlementIntentRepository,
    bank: BankApiClient,
    renderer: PlainTextRenderer,
    delivery: DeliveryApiClient,
}

impl Handler {
    pub async fn init() -> error_stack::Result<Self, KernelError> {
        let database = PostgresDatabase::new().await?;
        let bank = BankApiClient::new()?;
        let delivery = DeliveryApiClient::new()?;

        Ok(Self {
            database,
            tenants: PostgresTenantRepository,
            lendings: PostgresLendingRepository,
            billings: PostgresBillingRepository,
            intents: PostgresSettlementIntentRepository,
            bank,
            renderer: PlainTextRenderer,
            delivery,
        })
    }
}

impl DependOnDatabaseConnection<PgTransaction> for AppModule {
    type DatabaseConnection = PostgresDatabase;
    fn database_connection(&self) -> &Self::DatabaseConnection {
        self.database()
    }
}

impl DependOnTenantQuery<PgTransaction> for AppModule {
    type TenantQuery = PostgresTenantRepository;
    fn tenant_query(&self) -> &Self::TenantQuery {
        self.tenants()
    }
}

impl DependOnLendingQuery<PgTransaction> for AppModule {
    type LendingQuery = PostgresLendingRepository;
    fn lending_query(&self) -> &Self::LendingQuery {
        self.lendings()
    }
}

impl DependOnBillingQuery<PgTransaction> for AppModule {
    type BillingQuery = PostgresBillingRepository;
    fn billing_query(&self) -> &Self::BillingQuery {
        self.billings()
    }
}

impl DependOnBillingModifier<PgTransaction> for AppModule {
    type BillingModifier = PostgresBillingRepository;
    fn billing_modifier(&self) -> &Self::BillingModifier {
        self.billings()
    }
}

impl DependOnSettlementIntentQuery<PgTransaction> for AppModule {
    type SettlementIntentQuery = PostgresSettlementIntentRepository;
    fn settlement_intent_query(&self) -> &Self::SettlementIntentQuery {
        self.intents()
    }
}

impl DependOnSettlementIntentModifier<PgTransaction> for AppModule {
    type SettlementIntentModifier = PostgresSettlementIntentRepository;
    fn settlement_intent_modifier(&self) -> &Self::SettlementIntentModifier {
        self.intents()
    }
}

impl DependOnBankTransferService for AppModule {
    type BankTransferService = BankApiClient;
    fn bank_transfer_service(&self) -> &Self::BankTransferService {
        self.bank()
    }
}

impl DependOnDocumentRenderer for AppModule {
    type DocumentRenderer = PlainTextRenderer;
    fn document_renderer(&self) -> &Self::DocumentRenderer {
        self.renderer()
    }
}

impl DependOnNotifier for AppModule {
    type Notifier = DeliveryApiClient;
    fn notifier(&self) -> &Self::Notifier {
        self.delivery()
    }
}
