use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Service-wide error taxonomy.
///
/// Credential and token failures are deliberately generic outward; ownership
/// failures map to 404 so an unauthorized tenant cannot confirm that a
/// resource exists.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid or expired token")]
    TokenInvalid,

    #[error("Token tenant claim does not match the resolved user")]
    TokenScopeMismatch,

    #[error("No authenticated user in context")]
    NoAuthenticatedUser,

    #[error("Authenticated user has no tenant")]
    NoTenant,

    #[error("Cannot mint a token for a subject without a tenant")]
    MissingTenant,

    #[error("Not authorized to access {display_name} [{resource_id}] from tenant {tenant_id}")]
    NotAuthorized {
        resource_id: Uuid,
        tenant_id: Uuid,
        display_name: String,
    },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Token value collision on insert")]
    DuplicateToken,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(anyhow::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Flatten every field violation into human-readable messages, so callers
/// see the full list rather than the first failure.
pub fn flatten_validation_errors(errors: &validator::ValidationErrors) -> Vec<String> {
    let mut violations = Vec::new();
    for (field, errs) in errors.field_errors() {
        for err in errs {
            let message = err
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("{} is invalid", field));
            violations.push(message);
        }
    }
    violations.sort();
    violations
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(flatten_validation_errors(&errors))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorBody {
            error: String,
            #[serde(skip_serializing_if = "Option::is_none")]
            details: Option<Vec<String>>,
        }

        let (status, error, details) = match self {
            AppError::Validation(violations) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "Validation error".to_string(),
                Some(violations),
            ),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "Invalid credentials".to_string(),
                None,
            ),
            AppError::TokenInvalid
            | AppError::TokenScopeMismatch
            | AppError::NoAuthenticatedUser
            | AppError::NoTenant => (
                StatusCode::UNAUTHORIZED,
                "Unauthorized".to_string(),
                None,
            ),
            // Indistinguishable from a missing resource on purpose.
            AppError::NotAuthorized { .. } => {
                (StatusCode::NOT_FOUND, "Not found".to_string(), None)
            }
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg, None),
            AppError::MissingTenant | AppError::DuplicateToken => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
                None,
            ),
            AppError::Database(err) => {
                tracing::error!(error = %err, "Database failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error".to_string(),
                    None,
                )
            }
            AppError::Config(err) | AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
        };

        (status, Json(ErrorBody { error, details })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_authorized_message_omits_owner_tenant() {
        let caller = Uuid::new_v4();
        let resource = Uuid::new_v4();
        let err = AppError::NotAuthorized {
            resource_id: resource,
            tenant_id: caller,
            display_name: "invoice".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains(&resource.to_string()));
        assert!(msg.contains(&caller.to_string()));
    }

    #[test]
    fn validation_errors_flatten_every_violation() {
        let err = AppError::Validation(vec![
            "first name must not be blank".to_string(),
            "password must be at least 8 characters".to_string(),
        ]);
        assert!(err.to_string().contains("first name"));
        assert!(err.to_string().contains("password"));
    }
}
