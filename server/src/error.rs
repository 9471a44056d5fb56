use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use error_stack::Report;
use kernel::KernelError;
use serde_json::json;
use std::process::{ExitCode, Termination};

#[derive(Debug)]
pub struct StackTrace(Report<KernelError>);

impl From<Report<KernelError>> for StackTrace {
    fn from(e: Report<KernelError>) -> Self {
        StackTrace(e)
    }
}

impl Termination for StackTrace {
    fn report(self) -> ExitCode {
        eprintln!("{:?}", self.0);
        ExitCode::FAILURE
    }
}

#[derive(Debug)]
pub struct ErrorStatus(Report<KernelError>);

impl From<Report<KernelError>> for ErrorStatus {
    fn from(e: Report<KernelError>) -> Self {
        ErrorStatus(e)
    }
}

impl IntoResponse for ErrorStatus {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self.0.current_context() {
            KernelError::Validation(message) => (StatusCode::BAD_REQUEST, (*message).to_string()),
            KernelError::NotFound(target) => (StatusCode::NOT_FOUND, format!("{target} not found")),
            KernelError::Conflict(message) => (StatusCode::CONFLICT, (*message).to_string()),
            KernelError::Timeout => {
                tracing::error!("request failed: {:?}", self.0);
                (
                    StatusCode::GATEWAY_TIMEOUT,
                    "external service timed out".to_string(),
                )
            }
            KernelError::Dependency(_) | KernelError::Internal => {
                // underlying cause stays in the logs only
                tracing::error!("request failed: {:?}", self.0);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal processing error".to_string(),
                )
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
