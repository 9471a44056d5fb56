use sqlx::PgConnection;
use time::OffsetDateTime;
use uuid::Uuid;

use kernel::interface::query::SettlementIntentQuery;
use kernel::interface::update::SettlementIntentModifier;
use kernel::prelude::entity::{
    BillingId, CreatedAt, IntentId, IntentKind, IntentStatus, PaymentAmount, SettlementIntent,
    TenantId,
};
use kernel::KernelError;

use crate::database::postgres::PgTransaction;
use crate::error::{ConvertError, DriverError};

pub struct PostgresSettlementIntentRepository;

#[async_trait::async_trait]
impl SettlementIntentQuery<PgTransaction> for PostgresSettlementIntentRepository {
    async fn find_pending(
        &self,
        con: &mut PgTransaction,
    ) -> error_stack::Result<Vec<SettlementIntent>, KernelError> {
        PgSettlementIntentInternal::find_pending(&mut **con)
            .await
            .convert_error()
    }
}

#[async_trait::async_trait]
impl SettlementIntentModifier<PgTransaction> for PostgresSettlementIntentRepository {
    async fn create(
        &self,
        con: &mut PgTransaction,
        intent: &SettlementIntent,
    ) -> error_stack::Result<(), KernelError> {
        PgSettlementIntentInternal::create(&mut **con, intent)
            .await
            .convert_error()
    }

    async fn transition(
        &self,
        con: &mut PgTransaction,
        id: &IntentId,
        status: IntentStatus,
    ) -> error_stack::Result<(), KernelError> {
        PgSettlementIntentInternal::transition(&mut **con, id, status)
            .await
            .convert_error()
    }
}

#[derive(sqlx::FromRow)]
struct IntentRow {
    id: Uuid,
    kind: String,
    billing_ids: Vec<Uuid>,
    company_id: Option<Uuid>,
    amount: i64,
    status: String,
    created_at: OffsetDateTime,
}

impl TryFrom<IntentRow> for SettlementIntent {
    type Error = DriverError;

    fn try_from(value: IntentRow) -> Result<Self, Self::Error> {
        let kind = IntentKind::from_symbol(&value.kind).ok_or_else(|| {
            DriverError::Conversion(anyhow::anyhow!("unknown intent kind: {}", value.kind))
        })?;
        let status = IntentStatus::from_symbol(&value.status).ok_or_else(|| {
            DriverError::Conversion(anyhow::anyhow!("unknown intent status: {}", value.status))
        })?;
        Ok(SettlementIntent::new(
            IntentId::new(value.id),
            kind,
            value.billing_ids.into_iter().map(BillingId::new).collect(),
            value.company_id.map(TenantId::new),
            PaymentAmount::new(value.amount),
            status,
            CreatedAt::new(value.created_at),
        ))
    }
}

pub(in crate::database) struct PgSettlementIntentInternal;

impl PgSettlementIntentInternal {
    async fn find_pending(con: &mut PgConnection) -> Result<Vec<SettlementIntent>, DriverError> {
        let rows = sqlx::query_as::<_, IntentRow>(
            // language=postgresql
            r#"
            SELECT
                id,
                kind,
                billing_ids,
                company_id,
                amount,
                status,
                created_at
            FROM
                settlement_intents
            WHERE
                status = 'pending'
            ORDER BY
                created_at
            "#,
        )
        .fetch_all(con)
        .await?;
        rows.into_iter().map(SettlementIntent::try_from).collect()
    }

    async fn create(con: &mut PgConnection, intent: &SettlementIntent) -> Result<(), DriverError> {
        let billing_ids = intent
            .billing_ids()
            .iter()
            .map(|id| *id.as_ref())
            .collect::<Vec<Uuid>>();
        sqlx::query(
            // language=postgresql
            r#"
            INSERT INTO settlement_intents (
                id,
                kind,
                billing_ids,
                company_id,
                amount,
                status,
                created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(intent.id().as_ref())
        .bind(intent.kind().as_symbol())
        .bind(&billing_ids)
        .bind(intent.tenant_id().as_ref().map(|id| *id.as_ref()))
        .bind(intent.amount().as_ref())
        .bind(intent.status().as_symbol())
        .bind(intent.created_at().as_ref())
        .execute(con)
        .await?;
        Ok(())
    }

    async fn transition(
        con: &mut PgConnection,
        id: &IntentId,
        status: IntentStatus,
    ) -> Result<(), DriverError> {
        sqlx::query(
            // language=postgresql
            r#"
            UPDATE settlement_intents
            SET status = $2
            WHERE id = $1
            "#,
        )
        .bind(id.as_ref())
        .bind(status.as_symbol())
        .execute(con)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use uuid::Uuid;

    use kernel::interface::database::{QueryDatabaseConnection, Transaction};
    use kernel::interface::query::SettlementIntentQuery;
    use kernel::interface::update::SettlementIntentModifier;
    use kernel::prelude::entity::{
        BillingId, CreatedAt, IntentId, IntentStatus, PaymentAmount, SettlementIntent,
    };
    use kernel::KernelError;

    use crate::database::postgres::{PostgresDatabase, PostgresSettlementIntentRepository};

    #[test_with::env(POSTGRES_TEST)]
    #[tokio::test]
    async fn test() -> Result<(), error_stack::Report<KernelError>> {
        let db = PostgresDatabase::new().await?;
        let mut con = db.transact().await?;

        let intent_id = IntentId::new(Uuid::new_v4());
        let intent = SettlementIntent::bulk(
            intent_id.clone(),
            vec![BillingId::new(Uuid::new_v4())],
            PaymentAmount::new(50000),
            CreatedAt::new(time::OffsetDateTime::now_utc()),
        );
        PostgresSettlementIntentRepository
            .create(&mut con, &intent)
            .await?;

        let pending = PostgresSettlementIntentRepository
            .find_pending(&mut con)
            .await?;
        assert!(pending.iter().any(|found| found.id() == &intent_id));

        PostgresSettlementIntentRepository
            .transition(&mut con, &intent_id, IntentStatus::Completed)
            .await?;
        let pending = PostgresSettlementIntentRepository
            .find_pending(&mut con)
            .await?;
        assert!(pending.iter().all(|found| found.id() != &intent_id));

        con.roll_back().await?;
        Ok(())
    }
}
