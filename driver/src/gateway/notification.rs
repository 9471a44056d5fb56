use base64::Engine;
use serde::Serialize;

use kernel::interface::gateway::{InvoiceNotice, Notifier};
use kernel::prelude::entity::ContactEmail;
use kernel::KernelError;

use crate::env;
use crate::error::{ConvertError, DriverError};

static NOTIFICATION_API_URL: &str = "NOTIFICATION_API_URL";
static NOTIFICATION_FROM: &str = "NOTIFICATION_FROM";

/// HTTP client for the delivery service that carries invoice notices (with
/// the rendered artifact attached) to tenant contacts.
pub struct DeliveryApiClient {
    client: reqwest::Client,
    base_url: String,
    sender: String,
}

impl DeliveryApiClient {
    pub fn new() -> error_stack::Result<Self, KernelError> {
        let base_url = env(NOTIFICATION_API_URL).convert_error()?;
        let sender = env(NOTIFICATION_FROM).convert_error()?;
        Ok(Self::with_endpoint(base_url, sender))
    }

    pub fn with_endpoint(base_url: impl Into<String>, sender: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            sender: sender.into(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MessageBody<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    body: &'a str,
    attachment: AttachmentBody<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AttachmentBody<'a> {
    filename: &'a str,
    content_type: &'a str,
    content: String,
}

#[async_trait::async_trait]
impl Notifier for DeliveryApiClient {
    async fn send(
        &self,
        recipient: &ContactEmail,
        notice: &InvoiceNotice,
    ) -> error_stack::Result<(), KernelError> {
        let attachment = notice.attachment();
        let body = MessageBody {
            from: &self.sender,
            to: recipient.as_ref(),
            subject: notice.subject(),
            body: notice.body(),
            attachment: AttachmentBody {
                filename: attachment.filename(),
                content_type: attachment.media_type(),
                content: base64::engine::general_purpose::STANDARD.encode(attachment.bytes()),
            },
        };
        self.client
            .post(format!("{}/messages", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(DriverError::from)
            .convert_error()?
            .error_for_status()
            .map_err(DriverError::from)
            .convert_error()?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use httpmock::prelude::*;

    use kernel::interface::gateway::{InvoiceNotice, Notifier, RenderedDocument};
    use kernel::prelude::entity::ContactEmail;
    use kernel::KernelError;

    use super::DeliveryApiClient;

    fn notice() -> InvoiceNotice {
        InvoiceNotice::new(
            "Invoice for 2024-01",
            "Invoice number: INV-202401-0001\nTotal: 50000",
            RenderedDocument::new(
                "invoice-INV-202401-0001.txt",
                "text/plain",
                b"Invoice INV-202401-0001".to_vec(),
            ),
        )
    }

    #[tokio::test]
    async fn delivers_message_with_attachment() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/messages")
                    .json_body_partial(r#"{"to": "billing@example.co.jp", "subject": "Invoice for 2024-01"}"#);
                then.status(202);
            })
            .await;

        let client = DeliveryApiClient::with_endpoint(server.url(""), "billing@lending.example");
        client
            .send(&ContactEmail::new("billing@example.co.jp"), &notice())
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn delivery_failure_is_a_dependency_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/messages");
                then.status(503);
            })
            .await;

        let client = DeliveryApiClient::with_endpoint(server.url(""), "billing@lending.example");
        let report = client
            .send(&ContactEmail::new("billing@example.co.jp"), &notice())
            .await
            .unwrap_err();
        assert!(matches!(
            report.current_context(),
            KernelError::Dependency(_)
        ));
    }
}
