use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Wallet not found: {0}")]
    WalletNotFound(String),

    #[error("Wallet already exists for {0}")]
    WalletAlreadyExists(String),

    #[error("Wallet generation failed: {0}")]
    WalletGenerationFailed(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Mnemonic security error: {0}")]
    MnemonicSecurity(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Kafka error: {0}")]
    KafkaError(String),

    #[error("Publish failed: {0}")]
    PublishFailed(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl IntoResponse for WalletError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            WalletError::InvalidInput(_) => (StatusCode::BAD_REQUEST, self.to_string()),

            WalletError::WalletNotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),

            WalletError::WalletAlreadyExists(_) => (StatusCode::CONFLICT, self.to_string()),

            WalletError::WalletGenerationFailed(ref e) => {
                tracing::error!("Wallet generation failed: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Wallet generation failed".to_string(),
                )
            }

            WalletError::InvalidAddress(ref e) => {
                tracing::error!("Invalid address generated: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Wallet generation failed".to_string(),
                )
            }

            WalletError::MnemonicSecurity(ref e) => {
                tracing::error!("Mnemonic security error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred".to_string(),
                )
            }

            WalletError::DatabaseError(ref e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database operation failed".to_string(),
                )
            }

            WalletError::KafkaError(ref e) => {
                tracing::error!("Kafka error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Event processing failed".to_string(),
                )
            }

            WalletError::PublishFailed(ref e) => {
                tracing::error!("Publish failed: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Event publishing failed".to_string(),
                )
            }

            WalletError::InternalError(ref e) => {
                tracing::error!("Internal error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "success": false,
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

pub type WalletResult<T> = Result<T, WalletError>;
