use std::ops::{Deref, DerefMut};

use sqlx::{PgConnection, Pool, Postgres};

use kernel::interface::database::{QueryDatabaseConnection, Transaction};
use kernel::KernelError;

use crate::env;
use crate::error::{ConvertError, DriverError};

pub use self::{billing::*, lending::*, settlement::*, tenant::*};

mod billing;
mod lending;
mod settlement;
mod tenant;

static POSTGRES_URL: &str = "POSTGRES_URL";

pub struct PostgresDatabase {
    pool: Pool<Postgres>,
}

impl PostgresDatabase {
    pub async fn new() -> error_stack::Result<Self, KernelError> {
        let url = env(POSTGRES_URL).convert_error()?;
        let pool = Pool::connect(&url)
            .await
            .map_err(DriverError::from)
            .convert_error()?;
        Ok(Self { pool })
    }
}

#[async_trait::async_trait]
impl QueryDatabaseConnection<PgTransaction> for PostgresDatabase {
    async fn transact(&self) -> error_stack::Result<PgTransaction, KernelError> {
        let transaction = self
            .pool
            .begin()
            .await
            .map_err(DriverError::from)
            .convert_error()?;
        Ok(PgTransaction(transaction))
    }
}

pub struct PgTransaction(sqlx::Transaction<'static, Postgres>);

impl Deref for PgTransaction {
    type Target = PgConnection;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for PgTransaction {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

#[async_trait::async_trait]
impl Transaction for PgTransaction {
    async fn commit(self) -> error_stack::Result<(), KernelError> {
        self.0
            .commit()
            .await
            .map_err(DriverError::from)
            .convert_error()
    }

    async fn roll_back(self) -> error_stack::Result<(), KernelError> {
        self.0
            .rollback()
            .await
            .map_err(DriverError::from)
            .convert_error()
    }
}
