use wallet_service::cache::Cache;
use wallet_service::config::Settings;
use wallet_service::consumer::EventConsumer;
use wallet_service::core::WalletCore;
use wallet_service::derivation::DerivationAllocator;
use wallet_service::event_handler::EventHandler;
use wallet_service::handlers::{self, AppState};
use wallet_service::kafka::EventProducer;
use wallet_service::repository::WalletRepository;
use axum::{
    middleware,
    routing::get,
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
                .unwrap_or_else(|_| "wallet_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;

    tracing::info!("Starting Wallet Service");
    tracing::info!("Database: {}", settings.database_url);
    tracing::info!("Kafka brokers: {}", settings.kafka_bootstrap_servers);
    tracing::info!("Consumer group: {}", settings.kafka_consumer_group);

    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(settings.db_pool_size)
        .connect(&settings.database_url)
        .await?;

    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Migrations completed successfully");

    let repository = WalletRepository::new(pool.clone());

    let cache = Arc::new(Cache::new(settings.cache_ttl_seconds));
    let allocator = Arc::new(DerivationAllocator::new(repository.clone()));

    tracing::info!("Initializing Kafka producer...");
    let producer = Arc::new(EventProducer::new(
        settings.kafka_bootstrap_servers.clone(),
        settings.wallet_created_topic.clone(),
    ));

    let core = Arc::new(WalletCore::new(
        repository,
        cache,
        allocator,
        producer,
        settings.mnemonic.clone(),
        settings.max_concurrent_generations,
    ));

    let handler = Arc::new(EventHandler::new(Arc::clone(&core)));

    tracing::info!("Initializing Kafka consumer...");
    let consumer = EventConsumer::new(
        &settings.kafka_bootstrap_servers,
        &settings.kafka_consumer_group,
        &settings.user_verified_topic,
        handler,
        settings.batch_processing_size,
        settings.consumer_poll_timeout_ms,
    )?;
    let consumer_running = consumer.running_flag();

    tokio::spawn(async move {
        consumer.run().await;
    });

    let state = AppState {
        core,
        pool,
        consumer_running,
    };

    let app = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/wallet/:user_id", get(handlers::get_wallet))
        .with_state(state)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http());

    let addr = format!("0.0.0.0:{}", settings.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Wallet Service listening on {}", addr);
    tracing::info!("  GET    /wallet/:user_id  - Look up a provisioned wallet");
    tracing::info!("  GET    /health           - Health check");
    tracing::info!("Kafka consumer running in background, subscribed to user.verified");

    axum::serve(listener, app).await?;

    Ok(())
}
