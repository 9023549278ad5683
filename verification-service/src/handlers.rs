use crate::core::VerificationCore;
use crate::errors::{VerificationError, VerificationResult};
use crate::models::{ApiResponse, Network, VerificationRequest, VerificationResponse};
use axum::{
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode},
    Json,
};
use base64::Engine;
use std::sync::Arc;
use uuid::Uuid;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub core: Arc<VerificationCore>,
    pub max_document_size_bytes: u64,
}

/// `POST /verify` — accept a document, persist a verification attempt, and
/// return 202 immediately; the transition to VERIFIED and the downstream
/// event publish happen off the request path.
pub async fn verify(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<VerificationRequest>,
) -> VerificationResult<(StatusCode, HeaderMap, Json<ApiResponse<VerificationResponse>>)> {
    let network = Network::parse(&payload.network).ok_or_else(|| {
        VerificationError::InvalidInput(format!("Unsupported network: {}", payload.network))
    })?;

    let document_bytes = base64::engine::general_purpose::STANDARD
        .decode(&payload.document)
        .map_err(|e| VerificationError::InvalidInput(format!("Invalid base64 document: {e}")))?;

    tracing::info!(user_id = %payload.user_id, network = %network, "Verifying user");

    let verification = state
        .core
        .verify_user(
            &payload.user_id,
            network,
            &document_bytes,
            state.max_document_size_bytes,
        )
        .await?;

    let request_id = headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let mut response_headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response_headers.insert("x-request-id", value);
    }

    let body = VerificationResponse {
        message: "Verification accepted".to_string(),
        verification_id: verification.id,
        status: verification.status.to_string(),
    };

    Ok((
        StatusCode::ACCEPTED,
        response_headers,
        Json(ApiResponse::success(body)),
    ))
}

/// Health check endpoint.
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "verification-service",
    }))
}
