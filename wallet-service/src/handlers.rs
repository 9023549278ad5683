use crate::core::WalletCore;
use crate::errors::{WalletError, WalletResult};
use crate::models::{ApiResponse, Network, WalletResponse};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Clone)]
pub struct AppState {
    pub core: Arc<WalletCore>,
    pub pool: sqlx::PgPool,
    pub consumer_running: Arc<AtomicBool>,
}

#[derive(Debug, Deserialize)]
pub struct WalletQuery {
    pub network: String,
}

/// `GET /wallet/{user_id}?network=ethereum` - looks up a previously
/// provisioned wallet. Provisioning itself only happens via the
/// `user.verified` consumer, not through this endpoint.
pub async fn get_wallet(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<WalletQuery>,
) -> WalletResult<Json<ApiResponse<WalletResponse>>> {
    let network = Network::parse(&query.network)
        .ok_or_else(|| WalletError::InvalidInput(format!("unknown network: {}", query.network)))?;

    let wallet = state
        .core
        .get_wallet(&user_id, network)
        .await?
        .ok_or_else(|| WalletError::WalletNotFound(format!("{user_id}:{network}")))?;

    Ok(Json(ApiResponse::success(WalletResponse::from(wallet))))
}

/// Health check: database reachability and consumer liveness.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let db_ok = sqlx::query("SELECT 1").execute(&state.pool).await.is_ok();
    let consumer_ok = state.consumer_running.load(Ordering::SeqCst);

    let status = if db_ok && consumer_ok { "healthy" } else { "degraded" };
    let code = if db_ok && consumer_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        code,
        Json(serde_json::json!({
            "status": status,
            "service": "wallet-service",
            "database": db_ok,
            "consumer": consumer_ok,
        })),
    )
}
