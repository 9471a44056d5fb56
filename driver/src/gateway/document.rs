use error_stack::Report;

use kernel::interface::gateway::{DocumentRenderer, RenderedDocument};
use kernel::prelude::entity::BillingRecord;
use kernel::KernelError;

/// Renders the plain-text invoice artifact attached to tenant notifications.
pub struct PlainTextRenderer;

impl DocumentRenderer for PlainTextRenderer {
    fn render_invoice(
        &self,
        record: &BillingRecord,
    ) -> error_stack::Result<RenderedDocument, KernelError> {
        let number = record.invoice_number().as_ref().ok_or_else(|| {
            Report::new(KernelError::Internal)
                .attach_printable("billing record carries no invoice number")
        })?;
        let breakdown = record.breakdown().as_ref().ok_or_else(|| {
            Report::new(KernelError::Internal)
                .attach_printable("billing record carries no line items")
        })?;

        let text = format!(
            "Invoice {number}\nBilling month: {period}\n\nUsage fee: {usage}\nShipping fee: {shipping}\nTotal: {total}\n",
            number = number.as_ref(),
            period = record.period(),
            usage = breakdown.usage_fee().as_ref(),
            shipping = breakdown.shipping_fee().as_ref(),
            total = record.amount().as_ref(),
        );

        Ok(RenderedDocument::new(
            format!("invoice-{}.txt", number.as_ref()),
            "text/plain",
            text.into_bytes(),
        ))
    }
}
