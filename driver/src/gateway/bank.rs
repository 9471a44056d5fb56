use error_stack::Report;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use kernel::interface::gateway::{BankTransferService, TransferOrder, TransferOutcome};
use kernel::prelude::entity::{BankAccount, IntentId, PaymentAmount, TransactionId};
use kernel::KernelError;

use crate::env;
use crate::error::{ConvertError, DriverError};

static BANK_API_URL: &str = "BANK_API_URL";
static BANK_API_KEY: &str = "BANK_API_KEY";

/// HTTP client for the external bank transfer service. Every request carries
/// the settlement intent id as idempotency key so an unknown-outcome call can
/// be looked up afterwards instead of being blindly retried.
pub struct BankApiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl BankApiClient {
    pub fn new() -> error_stack::Result<Self, KernelError> {
        let base_url = env(BANK_API_URL).convert_error()?;
        let api_key = env(BANK_API_KEY).convert_error()?;
        Ok(Self::with_endpoint(base_url, api_key))
    }

    pub fn with_endpoint(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BulkTransferBody<'a> {
    idempotency_key: &'a Uuid,
    transfers: Vec<TransferBody<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TransferBody<'a> {
    recipient_name: &'a str,
    bank_name: &'a str,
    branch_code: &'a str,
    account_number: &'a str,
    amount: i64,
    description: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WithdrawalBody<'a> {
    idempotency_key: &'a Uuid,
    bank_name: &'a str,
    branch_code: &'a str,
    account_type: &'a str,
    account_number: &'a str,
    amount: i64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WithdrawalResponse {
    transaction_id: String,
    status: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OutcomeResponse {
    status: String,
    transaction_id: Option<String>,
}

#[async_trait::async_trait]
impl BankTransferService for BankApiClient {
    async fn transfer_bulk(
        &self,
        idempotency_key: &IntentId,
        orders: &[TransferOrder],
    ) -> error_stack::Result<(), KernelError> {
        let body = BulkTransferBody {
            idempotency_key: idempotency_key.as_ref(),
            transfers: orders
                .iter()
                .map(|order| TransferBody {
                    recipient_name: order.recipient().as_ref(),
                    bank_name: order.bank_info().bank_name().as_ref(),
                    branch_code: order.bank_info().branch_code().as_ref(),
                    account_number: order.bank_info().account_number().as_ref(),
                    amount: *order.amount().as_ref(),
                    description: order.description(),
                })
                .collect(),
        };
        let response = self
            .client
            .post(format!("{}/transfers", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(DriverError::from)
            .convert_error()?;
        response
            .error_for_status()
            .map_err(DriverError::from)
            .convert_error()?;
        Ok(())
    }

    async fn withdraw(
        &self,
        idempotency_key: &IntentId,
        account: &BankAccount,
        amount: &PaymentAmount,
    ) -> error_stack::Result<TransactionId, KernelError> {
        let body = WithdrawalBody {
            idempotency_key: idempotency_key.as_ref(),
            bank_name: account.bank_name().as_ref(),
            branch_code: account.branch_code().as_ref(),
            account_type: account.account_type().as_ref(),
            account_number: account.account_number().as_ref(),
            amount: *amount.as_ref(),
        };
        let response = self
            .client
            .post(format!("{}/withdrawal", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(DriverError::from)
            .convert_error()?
            .error_for_status()
            .map_err(DriverError::from)
            .convert_error()?;
        let payload = response
            .json::<WithdrawalResponse>()
            .await
            .map_err(DriverError::from)
            .convert_error()?;
        if payload.status != "completed" {
            return Err(Report::new(KernelError::Dependency("bank transfer service"))
                .attach_printable(format!(
                    "withdrawal rejected with status {}",
                    payload.status
                )));
        }
        Ok(TransactionId::new(payload.transaction_id))
    }

    async fn find_outcome(
        &self,
        idempotency_key: &IntentId,
    ) -> error_stack::Result<Option<TransferOutcome>, KernelError> {
        let response = self
            .client
            .get(format!(
                "{}/transfers/{}",
                self.base_url,
                idempotency_key.as_ref()
            ))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(DriverError::from)
            .convert_error()?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let payload = response
            .error_for_status()
            .map_err(DriverError::from)
            .convert_error()?
            .json::<OutcomeResponse>()
            .await
            .map_err(DriverError::from)
            .convert_error()?;
        let outcome = match payload.status.as_str() {
            "completed" => TransferOutcome::Completed {
                transaction_id: payload.transaction_id.map(TransactionId::new),
            },
            _ => TransferOutcome::Rejected,
        };
        Ok(Some(outcome))
    }
}

#[cfg(test)]
mod test {
    use httpmock::prelude::*;
    use serde_json::json;
    use uuid::Uuid;

    use kernel::interface::gateway::{BankTransferService, TransferOutcome};
    use kernel::prelude::entity::{
        AccountNumber, AccountType, BankAccount, BankName, BranchCode, IntentId, PaymentAmount,
    };
    use kernel::KernelError;

    use super::BankApiClient;

    fn account() -> BankAccount {
        BankAccount::new(
            BankName::new("Example Bank"),
            BranchCode::new("001"),
            AccountType::new("ordinary"),
            AccountNumber::new("1234567"),
        )
    }

    #[tokio::test]
    async fn withdraw_returns_transaction_id() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/withdrawal")
                    .json_body_partial(r#"{"accountNumber": "1234567", "amount": 30000}"#);
                then.status(200)
                    .json_body(json!({"transactionId": "TX-1", "status": "completed"}));
            })
            .await;

        let client = BankApiClient::with_endpoint(server.url(""), "test-key");
        let transaction = client
            .withdraw(
                &IntentId::new(Uuid::new_v4()),
                &account(),
                &PaymentAmount::new(30000),
            )
            .await
            .unwrap();
        assert_eq!(transaction.as_ref(), "TX-1");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn rejected_withdrawal_is_a_dependency_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/withdrawal");
                then.status(200)
                    .json_body(json!({"transactionId": "TX-2", "status": "rejected"}));
            })
            .await;

        let client = BankApiClient::with_endpoint(server.url(""), "test-key");
        let report = client
            .withdraw(
                &IntentId::new(Uuid::new_v4()),
                &account(),
                &PaymentAmount::new(30000),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            report.current_context(),
            KernelError::Dependency(_)
        ));
    }

    #[tokio::test]
    async fn bulk_transfer_failure_surfaces_as_dependency_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/transfers");
                then.status(502);
            })
            .await;

        let client = BankApiClient::with_endpoint(server.url(""), "test-key");
        let report = client
            .transfer_bulk(&IntentId::new(Uuid::new_v4()), &[])
            .await
            .unwrap_err();
        assert!(matches!(
            report.current_context(),
            KernelError::Dependency(_)
        ));
    }

    #[tokio::test]
    async fn unknown_idempotency_key_yields_no_outcome() {
        let server = MockServer::start_async().await;
        let key = IntentId::new(Uuid::new_v4());
        server
            .mock_async(|when, then| {
                when.method(GET).path(format!("/transfers/{}", key.as_ref()));
                then.status(404);
            })
            .await;

        let client = BankApiClient::with_endpoint(server.url(""), "test-key");
        let outcome = client.find_outcome(&key).await.unwrap();
        assert_eq!(outcome, None);
    }

    #[tokio::test]
    async fn completed_outcome_carries_transaction_id() {
        let server = MockServer::start_async().await;
        let key = IntentId::new(Uuid::new_v4());
        server
            .mock_async(|when, then| {
                when.method(GET).path(format!("/transfers/{}", key.as_ref()));
                then.status(200)
                    .json_body(json!({"status": "completed", "transactionId": "TX-9"}));
            })
            .await;

        let client = BankApiClient::with_endpoint(server.url(""), "test-key");
        let outcome = client.find_outcome(&key).await.unwrap();
        match outcome {
            Some(TransferOutcome::Completed { transaction_id }) => {
                assert_eq!(transaction_id.map(|id| id.as_ref().clone()), Some("TX-9".to_string()));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}
