use sqlx::PgConnection;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use kernel::interface::query::BillingQuery;
use kernel::interface::update::BillingModifier;
use kernel::prelude::entity::{
    BillingId, BillingPeriod, BillingRecord, BillingStatus, CreatedAt, FeeBreakdown,
    InvoiceNumber, InvoiceSequence, PaymentAmount, ShippingFee, TenantId, TransactionId,
    UsageFee, WithdrawalDate,
};
use kernel::KernelError;

use crate::database::postgres::PgTransaction;
use crate::error::{ConvertError, DriverError};

pub struct PostgresBillingRepository;

#[async_trait::async_trait]
impl BillingQuery<PgTransaction> for PostgresBillingRepository {
    async fn find_by_period(
        &self,
        con: &mut PgTransaction,
        period: &BillingPeriod,
    ) -> error_stack::Result<Vec<BillingRecord>, KernelError> {
        PgBillingInternal::find_by_period(&mut **con, period)
            .await
            .convert_error()
    }

    async fn find_statuses(
        &self,
        con: &mut PgTransaction,
        ids: &[BillingId],
    ) -> error_stack::Result<Vec<(BillingId, BillingStatus)>, KernelError> {
        PgBillingInternal::find_statuses(&mut **con, ids)
            .await
            .convert_error()
    }

    async fn find_by_transaction_id(
        &self,
        con: &mut PgTransaction,
        transaction_id: &TransactionId,
    ) -> error_stack::Result<Option<BillingRecord>, KernelError> {
        PgBillingInternal::find_by_transaction_id(&mut **con, transaction_id)
            .await
            .convert_error()
    }
}

#[async_trait::async_trait]
impl BillingModifier<PgTransaction> for PostgresBillingRepository {
    async fn create(
        &self,
        con: &mut PgTransaction,
        record: &BillingRecord,
    ) -> error_stack::Result<(), KernelError> {
        PgBillingInternal::create(&mut **con, record)
            .await
            .convert_error()
    }

    async fn next_sequence(
        &self,
        con: &mut PgTransaction,
        period: &BillingPeriod,
    ) -> error_stack::Result<InvoiceSequence, KernelError> {
        PgBillingInternal::next_sequence(&mut **con, period)
            .await
            .convert_error()
    }

    async fn complete(
        &self,
        con: &mut PgTransaction,
        ids: &[BillingId],
        settled_on: &WithdrawalDate,
    ) -> error_stack::Result<u64, KernelError> {
        PgBillingInternal::complete(&mut **con, ids, settled_on)
            .await
            .convert_error()
    }
}

#[derive(sqlx::FromRow)]
struct BillingRow {
    id: Uuid,
    company_id: Uuid,
    billing_month: String,
    invoice_number: Option<String>,
    usage_fee: Option<i64>,
    shipping_fee: Option<i64>,
    amount: i64,
    status: String,
    transaction_id: Option<String>,
    withdrawal_date: Option<Date>,
    created_at: OffsetDateTime,
}

impl TryFrom<BillingRow> for BillingRecord {
    type Error = DriverError;

    fn try_from(value: BillingRow) -> Result<Self, Self::Error> {
        let period = BillingPeriod::parse(&value.billing_month).map_err(|report| {
            DriverError::Conversion(anyhow::anyhow!(
                "malformed billing month in row: {report:?}"
            ))
        })?;
        let status = BillingStatus::from_symbol(&value.status).ok_or_else(|| {
            DriverError::Conversion(anyhow::anyhow!("unknown billing status: {}", value.status))
        })?;
        let breakdown = match (value.usage_fee, value.shipping_fee) {
            (Some(usage), Some(shipping)) => Some(FeeBreakdown::new(
                UsageFee::new(usage),
                ShippingFee::new(shipping),
            )),
            _ => None,
        };
        Ok(BillingRecord::new(
            BillingId::new(value.id),
            TenantId::new(value.company_id),
            period,
            value.invoice_number.map(InvoiceNumber::new),
            breakdown,
            PaymentAmount::new(value.amount),
            status,
            value.transaction_id.map(TransactionId::new),
            value.withdrawal_date.map(WithdrawalDate::new),
            CreatedAt::new(value.created_at),
        ))
    }
}

pub(in crate::database) struct PgBillingInternal;

impl PgBillingInternal {
    async fn find_by_period(
        con: &mut PgConnection,
        period: &BillingPeriod,
    ) -> Result<Vec<BillingRecord>, DriverError> {
        let rows = sqlx::query_as::<_, BillingRow>(
            // language=postgresql
            r#"
            SELECT
                id,
                company_id,
                billing_month,
                invoice_number,
                usage_fee,
                shipping_fee,
                amount,
                status,
                transaction_id,
                withdrawal_date,
                created_at
            FROM
                billing_records
            WHERE
                billing_month = $1
            ORDER BY
                created_at, invoice_number
            "#,
        )
        .bind(period.to_string())
        .fetch_all(con)
        .await?;
        rows.into_iter().map(BillingRecord::try_from).collect()
    }

    async fn find_statuses(
        con: &mut PgConnection,
        ids: &[BillingId],
    ) -> Result<Vec<(BillingId, BillingStatus)>, DriverError> {
        let ids = ids.iter().map(|id| *id.as_ref()).collect::<Vec<Uuid>>();
        let rows = sqlx::query_as::<_, (Uuid, String)>(
            // language=postgresql
            r#"
            SELECT
                id,
                status
            FROM
                billing_records
            WHERE
                id = ANY($1)
            "#,
        )
        .bind(&ids)
        .fetch_all(con)
        .await?;
        rows.into_iter()
            .map(|(id, status)| {
                let status = BillingStatus::from_symbol(&status).ok_or_else(|| {
                    DriverError::Conversion(anyhow::anyhow!("unknown billing status: {status}"))
                })?;
                Ok((BillingId::new(id), status))
            })
            .collect()
    }

    async fn find_by_transaction_id(
        con: &mut PgConnection,
        transaction_id: &TransactionId,
    ) -> Result<Option<BillingRecord>, DriverError> {
        let row = sqlx::query_as::<_, BillingRow>(
            // language=postgresql
            r#"
            SELECT
                id,
                company_id,
                billing_month,
                invoice_number,
                usage_fee,
                shipping_fee,
                amount,
                status,
                transaction_id,
                withdrawal_date,
                created_at
            FROM
                billing_records
            WHERE
                transaction_id = $1
            "#,
        )
        .bind(transaction_id.as_ref())
        .fetch_optional(con)
        .await?;
        row.map(BillingRecord::try_from).transpose()
    }

    async fn create(con: &mut PgConnection, record: &BillingRecord) -> Result<(), DriverError> {
        sqlx::query(
            // language=postgresql
            r#"
            INSERT INTO billing_records (
                id,
                company_id,
                billing_month,
                invoice_number,
                usage_fee,
                shipping_fee,
                amount,
                status,
                transaction_id,
                withdrawal_date,
                created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(record.id().as_ref())
        .bind(record.tenant_id().as_ref())
        .bind(record.period().to_string())
        .bind(
            record
                .invoice_number()
                .as_ref()
                .map(|number| number.as_ref().as_str()),
        )
        .bind(
            record
                .breakdown()
                .as_ref()
                .map(|breakdown| *breakdown.usage_fee().as_ref()),
        )
        .bind(
            record
                .breakdown()
                .as_ref()
                .map(|breakdown| *breakdown.shipping_fee().as_ref()),
        )
        .bind(record.amount().as_ref())
        .bind(record.status().as_symbol())
        .bind(
            record
                .transaction_id()
                .as_ref()
                .map(|transaction| transaction.as_ref().as_str()),
        )
        .bind(record.withdrawal_date().as_ref().map(|date| *date.as_ref()))
        .bind(record.created_at().as_ref())
        .execute(con)
        .await?;
        Ok(())
    }

    async fn next_sequence(
        con: &mut PgConnection,
        period: &BillingPeriod,
    ) -> Result<InvoiceSequence, DriverError> {
        let (sequence,) = sqlx::query_as::<_, (i32,)>(
            // language=postgresql
            r#"
            INSERT INTO invoice_sequences (billing_month, last_seq)
            VALUES ($1, 1)
            ON CONFLICT (billing_month)
                DO UPDATE SET last_seq = invoice_sequences.last_seq + 1
            RETURNING last_seq
            "#,
        )
        .bind(period.to_string())
        .fetch_one(con)
        .await?;
        Ok(InvoiceSequence::new(sequence))
    }

    async fn complete(
        con: &mut PgConnection,
        ids: &[BillingId],
        settled_on: &WithdrawalDate,
    ) -> Result<u64, DriverError> {
        let ids = ids.iter().map(|id| *id.as_ref()).collect::<Vec<Uuid>>();
        let result = sqlx::query(
            // language=postgresql
            r#"
            UPDATE billing_records
            SET status = 'completed', withdrawal_date = $2
            WHERE id = ANY($1) AND status = 'unpaid'
            "#,
        )
        .bind(&ids)
        .bind(settled_on.as_ref())
        .execute(con)
        .await?;
        tracing::debug!(flipped = result.rows_affected(), "billing records completed");
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod test {
    use uuid::Uuid;

    use kernel::interface::database::{QueryDatabaseConnection, Transaction};
    use kernel::interface::query::BillingQuery;
    use kernel::interface::update::BillingModifier;
    use kernel::prelude::entity::{
        BillingId, BillingPeriod, BillingRecord, BillingStatus, CreatedAt, FeeBreakdown,
        InvoiceNumber, ShippingFee, TenantId, UsageFee, WithdrawalDate,
    };
    use kernel::KernelError;

    use crate::database::postgres::{PostgresBillingRepository, PostgresDatabase};

    #[test_with::env(POSTGRES_TEST)]
    #[tokio::test]
    async fn test() -> Result<(), error_stack::Report<KernelError>> {
        let db = PostgresDatabase::new().await?;
        let mut con = db.transact().await?;

        // random period so repeated runs never collide on the counter row
        let month = rand::random::<u8>() % 12 + 1;
        let year = 3000 + (rand::random::<u16>() % 1000) as i32;
        let period = BillingPeriod::parse(&format!("{year:04}-{month:02}"))?;

        let sequence = PostgresBillingRepository
            .next_sequence(&mut con, &period)
            .await?;
        assert_eq!(*sequence.as_ref(), 1);
        let sequence = PostgresBillingRepository
            .next_sequence(&mut con, &period)
            .await?;
        assert_eq!(*sequence.as_ref(), 2);

        let billing_id = BillingId::new(Uuid::new_v4());
        let record = BillingRecord::issue(
            billing_id.clone(),
            TenantId::new(Uuid::new_v4()),
            period.clone(),
            InvoiceNumber::compose(&period, &sequence),
            FeeBreakdown::new(UsageFee::new(45000), ShippingFee::new(5000)),
            CreatedAt::new(time::OffsetDateTime::now_utc()),
        );
        PostgresBillingRepository.create(&mut con, &record).await?;

        let statuses = PostgresBillingRepository
            .find_statuses(&mut con, &[billing_id.clone()])
            .await?;
        assert_eq!(statuses, vec![(billing_id.clone(), BillingStatus::Unpaid)]);

        let settled_on = WithdrawalDate::new(time::OffsetDateTime::now_utc().date());
        let flipped = PostgresBillingRepository
            .complete(&mut con, &[billing_id.clone()], &settled_on)
            .await?;
        assert_eq!(flipped, 1);

        // terminal state: a second attempt must not touch the row again
        let flipped = PostgresBillingRepository
            .complete(&mut con, &[billing_id.clone()], &settled_on)
            .await?;
        assert_eq!(flipped, 0);

        let found = PostgresBillingRepository
            .find_by_period(&mut con, &period)
            .await?;
        assert_eq!(found.len(), 1);
        assert_eq!(*found[0].status(), BillingStatus::Completed);

        con.roll_back().await?;
        Ok(())
    }
}
