use crate::database::Transaction;
use crate::entity::{Tenant, TenantId};
use crate::KernelError;

#[async_trait::async_trait]
pub trait TenantQuery<Connection: Transaction>: Sync + Send + 'static {
    async fn find_by_id(
        &self,
        con: &mut Connection,
        id: &TenantId,
    ) -> error_stack::Result<Option<Tenant>, KernelError>;

    async fn find_by_ids(
        &self,
        con: &mut Connection,
        ids: &[TenantId],
    ) -> error_stack::Result<Vec<Tenant>, KernelError>;
}

pub trait DependOnTenantQuery<Connection: Transaction>: Sync + Send + 'static {
    type TenantQuery: TenantQuery<Connection>;
    fn tenant_query(&self) -> &Self::TenantQuery;
}
