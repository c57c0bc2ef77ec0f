use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    InvalidInput(String),

    /// Reserved 500 path. Every current handler is infallible past input
    /// validation, since upstream failures degrade to synthetic data.
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Failures talking to the research agent. These are logged and answered
/// with synthetic data; they never reach a client.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("research agent unreachable: {0}")]
    Unavailable(#[from] reqwest::Error),

    #[error("research agent did not answer within {0:?}")]
    Timeout(Duration),

    #[error("research agent returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("malformed research agent payload: {0}")]
    MalformedPayload(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::InvalidInput(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::Internal(e) => {
                tracing::error!("Request failed: {:#}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidInput(format!("Invalid request body: {}", rejection.body_text()))
    }
}

pub type AppResult<T> = Result<T, AppError>;
