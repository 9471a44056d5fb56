use destructure::Destructure;
use vodca::References;

use crate::entity::ContactEmail;
use crate::gateway::RenderedDocument;
use crate::KernelError;

#[derive(Debug, Clone, Eq, PartialEq, References, Destructure)]
pub struct InvoiceNotice {
    subject: String,
    body: String,
    attachment: RenderedDocument,
}

impl InvoiceNotice {
    pub fn new(
        subject: impl Into<String>,
        body: impl Into<String>,
        attachment: RenderedDocument,
    ) -> Self {
        Self {
            subject: subject.into(),
            body: body.into(),
            attachment,
        }
    }
}

/// Delivery service that carries an invoice notice to the tenant contact.
/// Invoked, not owned, by invoice composition.
#[async_trait::async_trait]
pub trait Notifier: 'static + Sync + Send {
    async fn send(
        &self,
        recipient: &ContactEmail,
        notice: &InvoiceNotice,
    ) -> error_stack::Result<(), KernelError>;
}

pub trait DependOnNotifier: 'static + Sync + Send {
    type Notifier: Notifier;
    fn notifier(&self) -> &Self::Notifier;
}
