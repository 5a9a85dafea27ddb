pub mod config;
pub mod db;
pub mod dtos;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

use axum::{
    http::HeaderValue,
    middleware::from_fn_with_state,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::AuthConfig;
use crate::services::{
    AuthService, RevocationManager, TokenCodec, TokenIssuer, TokenLedger, UserStore,
};

#[derive(Clone)]
pub struct AppState {
    pub config: AuthConfig,
    pub codec: TokenCodec,
    pub users: Arc<dyn UserStore>,
    pub tokens: Arc<dyn TokenLedger>,
    pub auth: AuthService,
}

impl AppState {
    /// Wire the authenticator from its collaborators. The stores are
    /// interface-typed so tests can swap the sqlx backend for the
    /// in-memory one.
    pub fn new(
        config: AuthConfig,
        codec: TokenCodec,
        users: Arc<dyn UserStore>,
        tokens: Arc<dyn TokenLedger>,
    ) -> Self {
        let issuer = TokenIssuer::new(codec.clone(), tokens.clone());
        let revocation = RevocationManager::new(tokens.clone());
        let auth = AuthService::new(
            users.clone(),
            tokens.clone(),
            issuer,
            revocation,
            codec.clone(),
        );

        Self {
            config,
            codec,
            users,
            tokens,
            auth,
        }
    }
}

pub fn init_tracing(log_level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_file(true)
                .with_line_number(true)
                .json()
                .flatten_event(true),
        )
        .init();
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

pub fn build_router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .security
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/refresh", post(handlers::auth::refresh))
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/me", get(handlers::user::get_me))
        .layer(from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
