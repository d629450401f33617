use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use shared::ValidationError;
use thiserror::Error;
use uuid::Uuid;

use crate::repositories::{StoreError, Table};

// Custom error type untuk chat service: closed set kategori untuk caller
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Internal error: {0}")]
    Internal(String),

    /// Write fan-out gagal di satu table. `durable` berarti message sudah
    /// tersimpan di messages_by_conversation dan messages_by_id; retry dengan
    /// `message_id` yang sama akan converge ke row yang sama.
    #[error("Fan-out write to {table} failed for message {message_id} (durable: {durable}): {reason}")]
    FanOut {
        table: Table,
        message_id: Uuid,
        durable: bool,
        reason: String,
    },
}

impl AppError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    // Kategori error yang terlihat oleh caller
    pub fn category(&self) -> &'static str {
        match self {
            AppError::InvalidArgument(_) => "invalid_argument",
            AppError::NotFound(_) => "not_found",
            AppError::StoreUnavailable(_) => "store_unavailable",
            AppError::Timeout(_) => "timeout",
            AppError::Internal(_) | AppError::FanOut { .. } => "internal",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Internal(_) | AppError::FanOut { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Konversi dari ValidationError ke AppError
impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::InvalidArgument(err.to_string())
    }
}

// Konversi dari StoreError (read path) ke AppError
impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(msg) => AppError::StoreUnavailable(msg),
            StoreError::Timeout(msg) => AppError::Timeout(msg),
            StoreError::Schema(msg) => {
                tracing::error!("Store schema mismatch: {}", msg);
                AppError::Internal(format!("store schema mismatch: {msg}"))
            }
        }
    }
}

// Implementasi IntoResponse untuk return error sebagai JSON response
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            AppError::InvalidArgument(msg) => {
                tracing::warn!("Invalid argument: {}", msg);
                msg.clone()
            }
            AppError::NotFound(msg) => msg.clone(),
            AppError::StoreUnavailable(msg) => {
                tracing::error!("Store unavailable: {}", msg);
                "Message store is unavailable".to_string()
            }
            AppError::Timeout(msg) => {
                tracing::error!("Store timeout: {}", msg);
                "Message store did not respond in time".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal server error: {}", msg);
                "Internal server error".to_string()
            }
            AppError::FanOut {
                table,
                message_id,
                durable,
                ..
            } => {
                if *durable {
                    format!(
                        "Message {message_id} was stored but the {table} update failed; retry with the same message_id"
                    )
                } else {
                    format!(
                        "Message was not fully stored ({table} write failed); retry with the same message_id"
                    )
                }
            }
        };

        let mut body = json!({
            "error": self.category(),
            "message": message,
        });
        if let AppError::FanOut { message_id, .. } = &self {
            body["message_id"] = json!(message_id);
        }

        (status, Json(body)).into_response()
    }
}
