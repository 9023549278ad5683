use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level errors for the verification pipeline.
#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Document too large")]
    DocumentTooLarge,

    #[error("Verification failed: {0}")]
    VerificationFailed(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Kafka error: {0}")]
    KafkaError(String),

    #[error("Publish failed: {0}")]
    PublishFailed(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl IntoResponse for VerificationError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            VerificationError::InvalidInput(_) => (StatusCode::BAD_REQUEST, self.to_string()),

            VerificationError::DocumentTooLarge => {
                (StatusCode::PAYLOAD_TOO_LARGE, self.to_string())
            }

            VerificationError::VerificationFailed(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, self.to_string())
            }

            VerificationError::DatabaseError(ref e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database operation failed".to_string(),
                )
            }

            VerificationError::KafkaError(ref e) => {
                tracing::error!("Kafka error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Event publishing failed".to_string(),
                )
            }

            VerificationError::PublishFailed(ref e) => {
                tracing::error!("Publish failed: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Event publishing failed".to_string(),
                )
            }

            VerificationError::InternalError(ref e) => {
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

pub type VerificationResult<T> = Result<T, VerificationError>;
