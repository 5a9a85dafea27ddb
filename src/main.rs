use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;

use tenant_auth::{
    build_router,
    config::AuthConfig,
    db::{self, PgStore},
    error::AppError,
    init_tracing,
    services::TokenCodec,
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();

    // Fail fast on invalid configuration.
    let config = AuthConfig::from_env()?;

    init_tracing(&config.log_level);

    tracing::info!(
        service = %config.service_name,
        version = %config.service_version,
        environment = ?config.environment,
        "Starting tenant-auth"
    );

    let pool = db::create_pool(&config.database)
        .await
        .map_err(AppError::Database)?;
    db::run_migrations(&pool)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Migration failed: {}", e)))?;

    let codec = TokenCodec::new(&config.jwt).map_err(AppError::Config)?;
    tracing::info!("Token codec initialized");

    let store = Arc::new(PgStore::new(pool));
    let state = AppState::new(config.clone(), codec, store.clone(), store);

    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(address = %addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?;

    tracing::info!("Service shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
