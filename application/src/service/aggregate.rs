use std::collections::BTreeMap;

use kernel::interface::database::{
    DependOnDatabaseConnection, QueryDatabaseConnection, Transaction,
};
use kernel::interface::query::{DependOnLendingQuery, LendingQuery};
use kernel::prelude::entity::{BillingPeriod, TenantId, SHIPPING_FEE_PER_ITEM};
use kernel::KernelError;

use crate::transfer::{AggregateUsageDto, TenantUsageDto};

#[async_trait::async_trait]
pub trait AggregateUsageService<Connection: Transaction + Send>:
    'static
    + Sync
    + Send
    + DependOnDatabaseConnection<Connection>
    + DependOnLendingQuery<Connection>
{
    /// Monthly totals per tenant, ordered by ascending tenant id so that
    /// downstream invoice numbering is reproducible. Tenants without activity
    /// in the period produce no row. A datastore failure aborts the whole
    /// cycle; no partial output is returned.
    async fn aggregate_usage(
        &self,
        dto: AggregateUsageDto,
    ) -> error_stack::Result<Vec<TenantUsageDto>, KernelError> {
        let period = BillingPeriod::parse(&dto.billing_month)?;

        let mut connection = self.database_connection().transact().await?;
        let charges = self
            .lending_query()
            .find_charges_in_period(&mut connection, &period)
            .await?;
        connection.commit().await?;

        let mut totals: BTreeMap<TenantId, TenantUsageDto> = BTreeMap::new();
        for charge in charges {
            let tenant_id = charge.activity().tenant_id().clone();
            let entry = totals
                .entry(tenant_id.clone())
                .or_insert_with(|| TenantUsageDto {
                    tenant_id: *tenant_id.as_ref(),
                    usage_fee: 0,
                    shipping_fee: 0,
                    item_count: 0,
                });
            entry.usage_fee += charge.daily_fee().as_ref();
            entry.shipping_fee += SHIPPING_FEE_PER_ITEM;
            entry.item_count += 1;
        }
        Ok(totals.into_values().collect())
    }
}

impl<Connection: Transaction + Send, T> AggregateUsageService<Connection> for T where
    T: DependOnDatabaseConnection<Connection> + DependOnLendingQuery<Connection>
{
}

#[cfg(test)]
mod test {
    use uuid::Uuid;

    use kernel::KernelError;

    use crate::testing::{charge, MockApp};
    use crate::transfer::AggregateUsageDto;

    use super::AggregateUsageService;

    #[tokio::test]
    async fn groups_by_tenant_in_ascending_id_order() {
        let app = MockApp::default();
        let first = Uuid::from_u128(1);
        let second = Uuid::from_u128(2);
        {
            let mut state = app.store.lock();
            // inserted out of order on purpose
            state.charges.push(charge(second, 2024, 1, 20, 7000));
            state.charges.push(charge(first, 2024, 1, 5, 4500));
            state.charges.push(charge(first, 2024, 1, 12, 4500));
            // outside the period, must not contribute
            state.charges.push(charge(first, 2024, 2, 1, 9999));
        }

        let totals = app
            .aggregate_usage(AggregateUsageDto {
                billing_month: "2024-01".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].tenant_id, first);
        assert_eq!(totals[0].usage_fee, 9000);
        assert_eq!(totals[0].shipping_fee, 1000);
        assert_eq!(totals[0].item_count, 2);
        assert_eq!(totals[1].tenant_id, second);
        assert_eq!(totals[1].usage_fee, 7000);
        assert_eq!(totals[1].shipping_fee, 500);
    }

    #[tokio::test]
    async fn tenants_without_activity_are_excluded() {
        let app = MockApp::default();
        let totals = app
            .aggregate_usage(AggregateUsageDto {
                billing_month: "2024-01".to_string(),
            })
            .await
            .unwrap();
        assert!(totals.is_empty());
    }

    #[tokio::test]
    async fn malformed_period_is_a_validation_error() {
        let app = MockApp::default();
        let report = app
            .aggregate_usage(AggregateUsageDto {
                billing_month: "invalid-date".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(
            report.current_context(),
            KernelError::Validation("invalid billing month format")
        ));
    }

    #[tokio::test]
    async fn datastore_failure_aborts_the_cycle() {
        let app = MockApp::default();
        app.store.lock().fail_reads = true;
        let report = app
            .aggregate_usage(AggregateUsageDto {
                billing_month: "2024-01".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(
            report.current_context(),
            KernelError::Dependency(_)
        ));
    }
}
