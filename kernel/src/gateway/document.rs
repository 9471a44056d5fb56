use destructure::Destructure;
use vodca::References;

use crate::entity::BillingRecord;
use crate::KernelError;

/// Byte-stream artifact produced from structured invoice data.
#[derive(Debug, Clone, Eq, PartialEq, References, Destructure)]
pub struct RenderedDocument {
    filename: String,
    media_type: String,
    bytes: Vec<u8>,
}

impl RenderedDocument {
    pub fn new(
        filename: impl Into<String>,
        media_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            filename: filename.into(),
            media_type: media_type.into(),
            bytes,
        }
    }
}

pub trait DocumentRenderer: 'static + Sync + Send {
    fn render_invoice(
        &self,
        record: &BillingRecord,
    ) -> error_stack::Result<RenderedDocument, KernelError>;
}

pub trait DependOnDocumentRenderer: 'static + Sync + Send {
    type DocumentRenderer: DocumentRenderer;
    fn document_renderer(&self) -> &Self::DocumentRenderer;
}
