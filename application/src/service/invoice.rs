use error_stack::Report;
use time::OffsetDateTime;
use uuid::Uuid;

use kernel::interface::database::{
    DependOnDatabaseConnection, QueryDatabaseConnection, Transaction,
};
use kernel::interface::gateway::{
    DependOnDocumentRenderer, DependOnNotifier, DocumentRenderer, InvoiceNotice, Notifier,
};
use kernel::interface::query::{
    BillingQuery, DependOnBillingQuery, DependOnTenantQuery, TenantQuery,
};
use kernel::interface::update::{BillingModifier, DependOnBillingModifier};
use kernel::prelude::entity::{
    BillingId, BillingPeriod, BillingRecord, ContactEmail, CreatedAt, DestructTenant,
    FeeBreakdown, InvoiceNumber, ShippingFee, TenantId, UsageFee,
};
use kernel::KernelError;

use crate::service::AggregateUsageService;
use crate::transfer::{
    AggregateUsageDto, BillingRecordDto, GenerateInvoicesDto, InvoiceDto, InvoiceFailureDto,
    InvoiceFailureStage, InvoiceRunDto, ListInvoicesDto, TenantUsageDto,
};

#[async_trait::async_trait]
pub trait ComposeInvoiceService<Connection: Transaction + Send>:
    AggregateUsageService<Connection>
    + DependOnTenantQuery<Connection>
    + DependOnBillingModifier<Connection>
    + DependOnDocumentRenderer
    + DependOnNotifier
{
    /// Monthly composition run. Tenants are handled independently: one
    /// tenant's failure is recorded in the run report and the loop moves on.
    async fn generate_invoices(
        &self,
        dto: GenerateInvoicesDto,
    ) -> error_stack::Result<InvoiceRunDto, KernelError> {
        let period = BillingPeriod::parse(&dto.billing_month)?;
        let usages = self
            .aggregate_usage(AggregateUsageDto {
                billing_month: dto.billing_month.clone(),
            })
            .await?;

        let mut invoices = Vec::new();
        let mut failures = Vec::new();
        for usage in usages {
            match self.compose_invoice(&period, &usage).await {
                Ok((invoice, record, contact)) => {
                    if let Err(report) = self.dispatch_invoice(&record, &contact).await {
                        tracing::warn!(
                            company = %usage.tenant_id,
                            "invoice dispatch failed: {report:?}"
                        );
                        failures.push(InvoiceFailureDto {
                            company_id: usage.tenant_id,
                            stage: InvoiceFailureStage::Dispatch,
                        });
                    }
                    invoices.push(invoice);
                }
                Err(report) => {
                    tracing::warn!(
                        company = %usage.tenant_id,
                        "invoice composition failed: {report:?}"
                    );
                    failures.push(InvoiceFailureDto {
                        company_id: usage.tenant_id,
                        stage: InvoiceFailureStage::Compose,
                    });
                }
            }
        }
        Ok(InvoiceRunDto {
            billing_month: dto.billing_month,
            invoices,
            failures,
        })
    }

    /// Allocates the next invoice number and persists the record in one
    /// transaction, so the sequence stays gap-free when a later step fails.
    /// Once this commits the invoice exists regardless of how rendering or
    /// delivery goes.
    async fn compose_invoice(
        &self,
        period: &BillingPeriod,
        usage: &TenantUsageDto,
    ) -> error_stack::Result<(InvoiceDto, BillingRecord, ContactEmail), KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let tenant_id = TenantId::new(usage.tenant_id);
        let tenant = self
            .tenant_query()
            .find_by_id(&mut connection, &tenant_id)
            .await?
            .ok_or_else(|| Report::new(KernelError::NotFound("company")))?;

        let sequence = self
            .billing_modifier()
            .next_sequence(&mut connection, period)
            .await?;
        let invoice_number = InvoiceNumber::compose(period, &sequence);
        let breakdown = FeeBreakdown::new(
            UsageFee::new(usage.usage_fee),
            ShippingFee::new(usage.shipping_fee),
        );
        let record = BillingRecord::issue(
            BillingId::new(Uuid::new_v4()),
            tenant_id,
            period.clone(),
            invoice_number.clone(),
            breakdown,
            CreatedAt::new(OffsetDateTime::now_utc()),
        );
        self.billing_modifier().create(&mut connection, &record).await?;
        connection.commit().await?;

        let invoice = InvoiceDto {
            invoice_number: invoice_number.as_ref().clone(),
            company_id: usage.tenant_id,
            billing_month: period.to_string(),
            total_amount: *record.amount().as_ref(),
            usage_fee: usage.usage_fee,
            shipping_fee: usage.shipping_fee,
        };
        let DestructTenant { contact_email, .. } = tenant.into_destruct();
        Ok((invoice, record, contact_email))
    }

    async fn dispatch_invoice(
        &self,
        record: &BillingRecord,
        contact: &ContactEmail,
    ) -> error_stack::Result<(), KernelError> {
        let document = self.document_renderer().render_invoice(record)?;
        let number = record
            .invoice_number()
            .as_ref()
            .map(|number| number.as_ref().as_str())
            .unwrap_or_default();
        let notice = InvoiceNotice::new(
            format!("Invoice for {}", record.period()),
            format!(
                "Invoice number: {number}\nTotal amount: {total}",
                total = record.amount().as_ref()
            ),
            document,
        );
        self.notifier().send(contact, &notice).await
    }
}

impl<Connection: Transaction + Send, T> ComposeInvoiceService<Connection> for T where
    T: AggregateUsageService<Connection>
        + DependOnTenantQuery<Connection>
        + DependOnBillingModifier<Connection>
        + DependOnDocumentRenderer
        + DependOnNotifier
{
}

#[async_trait::async_trait]
pub trait ListInvoiceService<Connection: Transaction + Send>:
    'static
    + Sync
    + Send
    + DependOnDatabaseConnection<Connection>
    + DependOnBillingQuery<Connection>
{
    async fn list_invoices(
        &self,
        dto: ListInvoicesDto,
    ) -> error_stack::Result<Vec<BillingRecordDto>, KernelError> {
        let period = BillingPeriod::parse(&dto.billing_month)?;
        let mut connection = self.database_connection().transact().await?;
        let records = self
            .billing_query()
            .find_by_period(&mut connection, &period)
            .await?;
        connection.commit().await?;
        Ok(records.into_iter().map(BillingRecordDto::from).collect())
    }
}

impl<Connection: Transaction + Send, T> ListInvoiceService<Connection> for T where
    T: DependOnDatabaseConnection<Connection> + DependOnBillingQuery<Connection>
{
}

#[cfg(test)]
mod test {
    use uuid::Uuid;

    use kernel::prelude::entity::BillingStatus;
    use kernel::KernelError;

    use crate::testing::{charge, tenant, MockApp};
    use crate::transfer::{GenerateInvoicesDto, InvoiceFailureStage, ListInvoicesDto};

    use super::{ComposeInvoiceService, ListInvoiceService};

    fn scenario_a_app() -> (MockApp, Uuid, Uuid) {
        let app = MockApp::default();
        let first = Uuid::from_u128(1);
        let second = Uuid::from_u128(2);
        {
            let mut state = app.store.lock();
            state.tenants.push(tenant(first, "Alpha Trading"));
            state.tenants.push(tenant(second, "Beta Works"));
            for _ in 0..10 {
                state.charges.push(charge(first, 2024, 1, 10, 4500));
            }
            for _ in 0..4 {
                state.charges.push(charge(second, 2024, 1, 15, 7000));
            }
        }
        (app, first, second)
    }

    #[tokio::test]
    async fn composes_sequential_invoices_and_notifies_each_tenant() {
        let (app, first, second) = scenario_a_app();

        let run = app
            .generate_invoices(GenerateInvoicesDto {
                billing_month: "2024-01".to_string(),
            })
            .await
            .unwrap();

        assert!(run.failures.is_empty());
        assert_eq!(run.invoices.len(), 2);

        assert_eq!(run.invoices[0].invoice_number, "INV-202401-0001");
        assert_eq!(run.invoices[0].company_id, first);
        assert_eq!(run.invoices[0].usage_fee, 45000);
        assert_eq!(run.invoices[0].shipping_fee, 5000);
        assert_eq!(run.invoices[0].total_amount, 50000);

        assert_eq!(run.invoices[1].invoice_number, "INV-202401-0002");
        assert_eq!(run.invoices[1].company_id, second);
        assert_eq!(run.invoices[1].total_amount, 30000);

        let state = app.store.lock();
        assert_eq!(state.billing.len(), 2);
        assert!(state
            .billing
            .iter()
            .all(|record| *record.status() == BillingStatus::Unpaid));

        let sent = app.notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert!(sent
            .iter()
            .all(|(_, subject)| subject.contains("2024-01")));
    }

    #[tokio::test]
    async fn totals_always_equal_the_sum_of_line_items() {
        let (app, _, _) = scenario_a_app();
        let run = app
            .generate_invoices(GenerateInvoicesDto {
                billing_month: "2024-01".to_string(),
            })
            .await
            .unwrap();
        for invoice in &run.invoices {
            assert_eq!(invoice.total_amount, invoice.usage_fee + invoice.shipping_fee);
        }
    }

    #[tokio::test]
    async fn malformed_month_fails_fast() {
        let app = MockApp::default();
        let report = app
            .generate_invoices(GenerateInvoicesDto {
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
    async fn one_tenant_failure_does_not_abort_the_run() {
        let app = MockApp::default();
        let missing = Uuid::from_u128(1);
        let known = Uuid::from_u128(2);
        {
            let mut state = app.store.lock();
            // no tenant row for `missing`, composition for it must fail
            state.tenants.push(tenant(known, "Beta Works"));
            state.charges.push(charge(missing, 2024, 1, 3, 1000));
            state.charges.push(charge(known, 2024, 1, 4, 2000));
        }

        let run = app
            .generate_invoices(GenerateInvoicesDto {
                billing_month: "2024-01".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(run.failures.len(), 1);
        assert_eq!(run.failures[0].company_id, missing);
        assert_eq!(run.failures[0].stage, InvoiceFailureStage::Compose);
        // the failed tenant consumed no sequence number
        assert_eq!(run.invoices.len(), 1);
        assert_eq!(run.invoices[0].invoice_number, "INV-202401-0001");
        assert_eq!(run.invoices[0].company_id, known);
    }

    #[tokio::test]
    async fn dispatch_failure_still_issues_the_invoice() {
        let (app, _, _) = scenario_a_app();
        *app.notifier.fail.lock().unwrap() = true;

        let run = app
            .generate_invoices(GenerateInvoicesDto {
                billing_month: "2024-01".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(run.invoices.len(), 2);
        assert_eq!(run.failures.len(), 2);
        assert!(run
            .failures
            .iter()
            .all(|failure| failure.stage == InvoiceFailureStage::Dispatch));
        assert_eq!(app.store.lock().billing.len(), 2);
    }

    #[tokio::test]
    async fn lists_billing_records_for_the_period() {
        let (app, _, _) = scenario_a_app();
        app.generate_invoices(GenerateInvoicesDto {
            billing_month: "2024-01".to_string(),
        })
        .await
        .unwrap();

        let records = app
            .list_invoices(ListInvoicesDto {
                billing_month: "2024-01".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|record| record.status == "unpaid"));

        let other = app
            .list_invoices(ListInvoicesDto {
                billing_month: "2024-02".to_string(),
            })
            .await
            .unwrap();
        assert!(other.is_empty());
    }
}
