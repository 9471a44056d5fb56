use sqlx::PgConnection;
use time::Date;
use uuid::Uuid;

use kernel::interface::query::LendingQuery;
use kernel::prelude::entity::{
    BillingPeriod, BookId, DailyFee, LendingActivity, LendingCharge, LendingDate, LendingId,
    LendingStatus, ReturnDueDate, ReturnedAt, TenantId,
};
use kernel::KernelError;

use crate::database::postgres::PgTransaction;
use crate::error::{ConvertError, DriverError};

pub struct PostgresLendingRepository;

#[async_trait::async_trait]
impl LendingQuery<PgTransaction> for PostgresLendingRepository {
    async fn find_charges_in_period(
        &self,
        con: &mut PgTransaction,
        period: &BillingPeriod,
    ) -> error_stack::Result<Vec<LendingCharge>, KernelError> {
        PgLendingInternal::find_charges_in_period(&mut **con, period)
            .await
            .convert_error()
    }
}

#[derive(sqlx::FromRow)]
struct ChargeRow {
    id: Uuid,
    book_id: Uuid,
    company_id: Uuid,
    lending_date: Date,
    return_due_date: Date,
    actual_return_date: Option<Date>,
    status: String,
    daily_fee: i64,
}

impl TryFrom<ChargeRow> for LendingCharge {
    type Error = DriverError;

    fn try_from(value: ChargeRow) -> Result<Self, Self::Error> {
        let status = LendingStatus::from_symbol(&value.status).ok_or_else(|| {
            DriverError::Conversion(anyhow::anyhow!("unknown lending status: {}", value.status))
        })?;
        let activity = LendingActivity::new(
            LendingId::new(value.id),
            BookId::new(value.book_id),
            TenantId::new(value.company_id),
            LendingDate::new(value.lending_date),
            ReturnDueDate::new(value.return_due_date),
            value.actual_return_date.map(ReturnedAt::new),
            status,
        );
        Ok(LendingCharge::new(activity, DailyFee::new(value.daily_fee)))
    }
}

pub(in crate::database) struct PgLendingInternal;

impl PgLendingInternal {
    async fn find_charges_in_period(
        con: &mut PgConnection,
        period: &BillingPeriod,
    ) -> Result<Vec<LendingCharge>, DriverError> {
        let rows = sqlx::query_as::<_, ChargeRow>(
            // language=postgresql
            r#"
            SELECT
                l.id,
                l.book_id,
                l.company_id,
                l.lending_date,
                l.return_due_date,
                l.actual_return_date,
                l.status,
                b.daily_fee
            FROM
                lending_records l
                JOIN books b ON b.id = l.book_id
            WHERE
                l.lending_date >= $1 AND l.lending_date < $2
            "#,
        )
        .bind(period.first_day())
        .bind(period.next_first_day())
        .fetch_all(con)
        .await?;
        rows.into_iter().map(LendingCharge::try_from).collect()
    }
}
