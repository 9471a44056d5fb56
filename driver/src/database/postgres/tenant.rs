use sqlx::PgConnection;
use uuid::Uuid;

use kernel::interface::query::TenantQuery;
use kernel::prelude::entity::{
    AccountNumber, AccountType, BankAccount, BankName, BranchCode, ContactEmail, Tenant, TenantId,
    TenantName,
};
use kernel::KernelError;

use crate::database::postgres::PgTransaction;
use crate::error::{ConvertError, DriverError};

pub struct PostgresTenantRepository;

#[async_trait::async_trait]
impl TenantQuery<PgTransaction> for PostgresTenantRepository {
    async fn find_by_id(
        &self,
        con: &mut PgTransaction,
        id: &TenantId,
    ) -> error_stack::Result<Option<Tenant>, KernelError> {
        PgTenantInternal::find_by_id(&mut **con, id)
            .await
            .convert_error()
    }

    async fn find_by_ids(
        &self,
        con: &mut PgTransaction,
        ids: &[TenantId],
    ) -> error_stack::Result<Vec<Tenant>, KernelError> {
        PgTenantInternal::find_by_ids(&mut **con, ids)
            .await
            .convert_error()
    }
}

#[derive(sqlx::FromRow)]
struct TenantRow {
    id: Uuid,
    name: String,
    contact_email: String,
    bank_name: String,
    branch_code: String,
    account_type: String,
    account_number: String,
}

impl From<TenantRow> for Tenant {
    fn from(value: TenantRow) -> Self {
        Tenant::new(
            TenantId::new(value.id),
            TenantName::new(value.name),
            ContactEmail::new(value.contact_email),
            BankAccount::new(
                BankName::new(value.bank_name),
                BranchCode::new(value.branch_code),
                AccountType::new(value.account_type),
                AccountNumber::new(value.account_number),
            ),
        )
    }
}

pub(in crate::database) struct PgTenantInternal;

impl PgTenantInternal {
    async fn find_by_id(
        con: &mut PgConnection,
        id: &TenantId,
    ) -> Result<Option<Tenant>, DriverError> {
        let row = sqlx::query_as::<_, TenantRow>(
            // language=postgresql
            r#"
            SELECT
                id,
                name,
                contact_email,
                bank_name,
                branch_code,
                account_type,
                account_number
            FROM
                companies
            WHERE
                id = $1
            "#,
        )
        .bind(id.as_ref())
        .fetch_optional(con)
        .await?;
        Ok(row.map(Tenant::from))
    }

    async fn find_by_ids(
        con: &mut PgConnection,
        ids: &[TenantId],
    ) -> Result<Vec<Tenant>, DriverError> {
        let ids = ids.iter().map(|id| *id.as_ref()).collect::<Vec<Uuid>>();
        let rows = sqlx::query_as::<_, TenantRow>(
            // language=postgresql
            r#"
            SELECT
                id,
                name,
                contact_email,
                bank_name,
                branch_code,
                account_type,
                account_number
            FROM
                companies
            WHERE
                id = ANY($1)
            "#,
        )
        .bind(&ids)
        .fetch_all(con)
        .await?;
        Ok(rows.into_iter().map(Tenant::from).collect())
    }
}
