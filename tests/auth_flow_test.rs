mod common;

use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use common::{register_payload, register_user, request, test_app};

#[tokio::test]
async fn register_binds_tokens_to_subject_and_tenant() {
    let app = test_app();
    let tenant = Uuid::new_v4();

    let (status, body) = request(
        &app.router,
        "POST",
        "/auth/register",
        None,
        Some(register_payload("u1@example.com", tenant)),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["user"]["email"], "u1@example.com");

    for field in ["access_token", "refresh_token"] {
        let claims = app.state.codec.decode(body[field].as_str().unwrap()).unwrap();
        assert_eq!(claims.sub, "u1@example.com");
        assert_eq!(claims.customer_account_id, tenant);
    }
}

#[tokio::test]
async fn register_reports_every_violation_at_once() {
    let app = test_app();

    let (status, body) = request(
        &app.router,
        "POST",
        "/auth/register",
        None,
        Some(json!({
            "first_name": "   ",
            "last_name": "Lovelace",
            "email": "not-an-email",
            "password": "short",
            "contact": "",
            "tenant_id": Uuid::new_v4(),
            "roles": ["WIZARD"],
        })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let details: Vec<String> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect();

    assert!(details.iter().any(|d| d.contains("First name")));
    assert!(details.iter().any(|d| d.contains("email")));
    assert!(details.iter().any(|d| d.contains("Password")));
    assert!(details.iter().any(|d| d.contains("Contact")));
    assert!(details.iter().any(|d| d.contains("Unknown role: WIZARD")));
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
    let app = test_app();
    let tenant = Uuid::new_v4();
    register_user(&app, "u1@example.com", tenant).await;

    let (status, _) = request(
        &app.router,
        "POST",
        "/auth/register",
        None,
        Some(register_payload("u1@example.com", tenant)),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn login_failures_do_not_reveal_which_credential_was_wrong() {
    let app = test_app();
    register_user(&app, "u1@example.com", Uuid::new_v4()).await;

    let (wrong_password_status, wrong_password_body) = request(
        &app.router,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "email": "u1@example.com", "password": "incorrect horse" })),
    )
    .await;
    let (unknown_email_status, unknown_email_body) = request(
        &app.router,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "email": "nobody@example.com", "password": "correct horse battery" })),
    )
    .await;

    assert_eq!(wrong_password_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password_body, unknown_email_body);
}

#[tokio::test]
async fn login_revokes_every_previously_valid_token() {
    let app = test_app();
    let tenant = Uuid::new_v4();
    let (old_access, old_refresh) = register_user(&app, "u1@example.com", tenant).await;

    let (status, body) = request(
        &app.router,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "email": "u1@example.com", "password": "correct horse battery" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let user = app
        .state
        .users
        .find_by_email("u1@example.com")
        .await
        .unwrap()
        .unwrap();
    let valid = app.state.tokens.find_valid_by_user(user.id).await.unwrap();

    assert_eq!(valid.len(), 2);
    let values: Vec<&str> = valid.iter().map(|t| t.value.as_str()).collect();
    assert!(values.contains(&body["access_token"].as_str().unwrap()));
    assert!(values.contains(&body["refresh_token"].as_str().unwrap()));
    assert!(!values.contains(&old_access.as_str()));
    assert!(!values.contains(&old_refresh.as_str()));
}

#[tokio::test]
async fn revoked_access_token_is_rejected_before_its_expiry() {
    let app = test_app();
    let (access, _) = register_user(&app, "u1@example.com", Uuid::new_v4()).await;

    let (status, body) = request(&app.router, "GET", "/me", Some(&access), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "u1@example.com");

    // Ledger revocation wins even though the encoded expiry has not elapsed.
    app.state.tokens.revoke_one(&access, None).await.unwrap();

    let (status, _) = request(&app.router, "GET", "/me", Some(&access), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn anonymous_request_to_protected_route_is_unauthorized() {
    let app = test_app();

    let (status, _) = request(&app.router, "GET", "/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = request(&app.router, "GET", "/me", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn health_is_public() {
    let app = test_app();
    let (status, body) = request(&app.router, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}
