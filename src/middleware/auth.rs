//! Bearer-token middleware.
//!
//! Resolves the per-request [`SecurityContext`] exactly once: decode the
//! presented token, consult the ledger for revocation, resolve the user.
//! An absent or unresolvable credential leaves the request anonymous; the
//! first authorization check downstream then fails with
//! `NoAuthenticatedUser`. Validity is read from the ledger on every
//! request, never cached, so a revocation takes effect immediately.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::error::AppError;
use crate::models::TokenKind;
use crate::services::SecurityContext;
use crate::AppState;

/// Extract the token value from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

pub async fn auth_middleware(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let context = match bearer_token(req.headers()) {
        None => SecurityContext::anonymous(),
        Some(token) => resolve_principal(&state, token)
            .await
            .unwrap_or_else(|| SecurityContext::anonymous()),
    };

    req.extensions_mut().insert(context);
    next.run(req).await
}

/// Codec, ledger, and user store must all agree before a principal is
/// attached. The ledger read makes revocation read-after-write: a token
/// revoked by a prior request fails here even if its expiry has not elapsed.
async fn resolve_principal(state: &AppState, token: &str) -> Option<SecurityContext> {
    let claims = match state.codec.decode(token) {
        Ok(claims) => claims,
        Err(err) => {
            tracing::debug!(error = %err, "Rejected bearer token at decode");
            return None;
        }
    };

    let stored = match state.tokens.find_by_value(token).await {
        Ok(stored) => stored?,
        Err(err) => {
            tracing::error!(error = %err, "Ledger lookup failed during authentication");
            return None;
        }
    };

    if stored.kind != TokenKind::Access || !stored.is_valid() {
        tracing::debug!(token_id = %stored.id, "Rejected non-usable bearer token");
        return None;
    }

    let user = match state.users.find_by_email(&claims.sub).await {
        Ok(user) => user?,
        Err(err) => {
            tracing::error!(error = %err, "User lookup failed during authentication");
            return None;
        }
    };

    Some(SecurityContext::for_user(&user, claims.customer_account_id))
}

/// Extractor handing the resolved context to handlers.
pub struct Context(pub SecurityContext);

#[axum::async_trait]
impl<S> FromRequestParts<S> for Context
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let context = parts
            .extensions
            .get::<SecurityContext>()
            .cloned()
            .unwrap_or_else(SecurityContext::anonymous);
        Ok(Context(context))
    }
}
