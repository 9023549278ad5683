use verification_service::config::Settings;
use verification_service::core::VerificationCore;
use verification_service::handlers::{self, AppState};
use verification_service::kafka::EventProducer;
use verification_service::repository::VerificationRepository;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Echoes `X-Request-ID` if present, otherwise generates one.
async fn request_id_middleware(
    mut request: axum::extract::Request,
    next: middleware::Next,
) -> axum::response::Response {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    request
        .headers_mut()
        .insert("x-request-id", request_id.parse().unwrap());

    let mut response = next.run(request).await;
    response
        .headers_mut()
        .insert("x-request-id", request_id.parse().unwrap());
    response
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "verification_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;

    tracing::info!("Starting Verification Service");
    tracing::info!("Database: {}", settings.database_url);
    tracing::info!("Kafka brokers: {}", settings.kafka_bootstrap_servers);
    tracing::info!("Kafka topic: {}", settings.user_verified_topic);

    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(settings.db_pool_size)
        .connect(&settings.database_url)
        .await?;

    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Migrations completed successfully");

    let repository = VerificationRepository::new(pool);

    tracing::info!("Initializing Kafka producer...");
    let producer = Arc::new(EventProducer::new(
        settings.kafka_bootstrap_servers.clone(),
        settings.user_verified_topic.clone(),
    ));

    let core = Arc::new(VerificationCore::new(
        repository,
        producer,
        settings.max_concurrent_verifications,
        settings.verification_delay_seconds,
    ));

    let state = AppState {
        core,
        max_document_size_bytes: settings.max_document_size_bytes(),
    };

    let app = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/verify", post(handlers::verify))
        .with_state(state)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http());

    let addr = format!("0.0.0.0:{}", settings.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Verification Service listening on {}", addr);
    tracing::info!("  POST   /verify  - Submit a verification attempt");
    tracing::info!("  GET    /health  - Health check");

    axum::serve(listener, app).await?;

    Ok(())
}
