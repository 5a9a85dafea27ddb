//! Shared setup for integration tests: in-memory stores wired into the
//! real router, driven through tower's oneshot.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::util::ServiceExt;
use uuid::Uuid;

use tenant_auth::{
    build_router,
    config::{AuthConfig, DatabaseConfig, Environment, JwtConfig, SecurityConfig},
    db::memory::InMemoryStore,
    services::TokenCodec,
    AppState,
};

pub fn test_config() -> AuthConfig {
    AuthConfig {
        environment: Environment::Dev,
        service_name: "tenant-auth".to_string(),
        service_version: "test".to_string(),
        log_level: "debug".to_string(),
        port: 8080,
        database: DatabaseConfig {
            url: "postgres://unused-in-tests".to_string(),
            max_connections: 1,
            min_connections: 1,
        },
        jwt: JwtConfig {
            secret_base64: BASE64.encode(b"integration-test-signing-secret"),
            access_token_expiry_minutes: 15,
            refresh_token_expiry_days: 7,
        },
        security: SecurityConfig {
            allowed_origins: vec!["http://localhost:3000".to_string()],
        },
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

pub fn test_app() -> TestApp {
    let config = test_config();
    let codec = TokenCodec::new(&config.jwt).expect("test codec");
    let store = Arc::new(InMemoryStore::new());
    let state = AppState::new(config, codec, store.clone(), store);
    TestApp {
        router: build_router(state.clone()),
        state,
    }
}

pub async fn request(
    router: &Router,
    method: &str,
    uri: &str,
    bearer: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    };

    let response = router.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, value)
}

pub fn register_payload(email: &str, tenant_id: Uuid) -> Value {
    json!({
        "first_name": "Ada",
        "last_name": "Lovelace",
        "email": email,
        "password": "correct horse battery",
        "contact": "+1-555-0100",
        "tenant_id": tenant_id,
        "roles": ["USER"],
    })
}

/// Register a user and return the issued (access, refresh) pair.
pub async fn register_user(app: &TestApp, email: &str, tenant_id: Uuid) -> (String, String) {
    let (status, body) = request(
        &app.router,
        "POST",
        "/auth/register",
        None,
        Some(register_payload(email, tenant_id)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
    (
        body["access_token"].as_str().unwrap().to_string(),
        body["refresh_token"].as_str().unwrap().to_string(),
    )
}
