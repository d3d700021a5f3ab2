use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, Serialize)]
#[serde(tag = "type", content = "message")]
pub enum AppError {
    /// Caller supplied something unusable (missing fields, unknown unit, bad JSON)
    #[error("Validation Error: {0}")]
    Validation(String),

    /// Deployment is missing something it needs, e.g. an API credential
    #[error("Configuration Error: {0}")]
    Configuration(String),

    /// An external provider answered, but not with anything usable
    #[error("Upstream Error: {0}")]
    Upstream(String),

    #[error("Network Error: {0}")]
    Network(String),

    #[error("System Error: {0}")]
    System(String),

    #[error("Unknown Error: {0}")]
    Unknown(String),
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::System(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Validation(format!("Serialization error: {}", err))
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Upstream(_) | AppError::Network(_) => StatusCode::BAD_GATEWAY,
            AppError::Configuration(_) | AppError::System(_) | AppError::Unknown(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message safe to hand back to an HTTP caller.
    ///
    /// Internal failures collapse to a generic message; the detail only goes to the log.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Validation(msg) | AppError::Configuration(msg) | AppError::Upstream(msg) => {
                msg.clone()
            }
            AppError::Network(_) => "Failed to reach upstream provider".to_string(),
            AppError::System(_) | AppError::Unknown(_) => "Unexpected error".to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }
        (status, Json(ErrorBody { error: self.public_message() })).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
