//! Authentication handlers: register, login, refresh, logout.

use axum::{
    extract::{Json, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use validator::Validate;

use crate::dtos::auth::{AuthResponse, LoginRequest, RegisterRequest};
use crate::dtos::{ErrorResponse, MessageResponse};
use crate::error::AppError;
use crate::middleware::bearer_token;
use crate::AppState;

/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let response = state.auth.register(req).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    req.validate().map_err(AppError::from)?;
    let response = state.auth.authenticate(req).await?;
    Ok(Json(response))
}

/// POST /auth/refresh
///
/// Reads the refresh token from the `Authorization: Bearer` header. Any
/// failure that is not a server-side fault resolves to the same 401 body;
/// nothing about the specific rejection reason is leaked.
pub async fn refresh(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let presented = match bearer_token(&headers) {
        Some(token) => token,
        None => return refresh_rejection(),
    };

    match state.auth.refresh(presented).await {
        Ok(response) => Json(response).into_response(),
        Err(
            AppError::Database(_)
            | AppError::Internal(_)
            | AppError::MissingTenant
            | AppError::DuplicateToken,
        ) => AppError::Internal(anyhow::anyhow!("Refresh failed")).into_response(),
        Err(_) => refresh_rejection(),
    }
}

fn refresh_rejection() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse {
            error: "Invalid or expired refresh token.".to_string(),
        }),
    )
        .into_response()
}

/// POST /auth/logout
///
/// Revokes exactly the presented access token. With no bearer header the
/// call is a no-op; the request-scoped context is dropped either way.
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<MessageResponse>, AppError> {
    state.auth.logout(bearer_token(&headers)).await?;
    Ok(Json(MessageResponse {
        message: "Logged out".to_string(),
    }))
}
