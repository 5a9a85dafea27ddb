//! Authenticator: registration, login, refresh, logout.
//!
//! Composed from interface-typed collaborators (user store, issuer,
//! revocation manager, codec). Login and refresh both revoke the user's
//! prior token set before minting, so at most one active session's worth of
//! tokens exists per user.

use chrono::Utc;
use std::sync::Arc;
use validator::Validate;

use crate::dtos::auth::{AuthResponse, LoginRequest, RegisterRequest};
use crate::error::{flatten_validation_errors, AppError};
use crate::models::{RoleName, TokenKind, UserAccount};
use crate::services::codec::TokenCodec;
use crate::services::issuer::TokenIssuer;
use crate::services::ledger::{TokenLedger, UserStore};
use crate::services::revocation::RevocationManager;
use crate::utils::{hash_password, verify_password, Password, PasswordHashString};

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    ledger: Arc<dyn TokenLedger>,
    issuer: TokenIssuer,
    revocation: RevocationManager,
    codec: TokenCodec,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        ledger: Arc<dyn TokenLedger>,
        issuer: TokenIssuer,
        revocation: RevocationManager,
        codec: TokenCodec,
    ) -> Self {
        Self {
            users,
            ledger,
            issuer,
            revocation,
            codec,
        }
    }

    /// Register a new user and issue their first token pair.
    ///
    /// Every violation is collected before failing, not just the first.
    pub async fn register(&self, req: RegisterRequest) -> Result<AuthResponse, AppError> {
        let mut violations = match req.validate() {
            Ok(()) => Vec::new(),
            Err(errors) => flatten_validation_errors(&errors),
        };

        let mut roles = Vec::new();
        for name in &req.roles {
            match RoleName::parse(name.trim()) {
                Some(role) => roles.push(role),
                None => violations.push(format!("Unknown role: {}", name)),
            }
        }

        if !violations.is_empty() {
            return Err(AppError::Validation(violations));
        }

        if self.users.exists_by_email(&req.email).await? {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let password_hash = hash_password(&Password::new(req.password))
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Password hashing error: {}", e)))?;

        let user = UserAccount::new(
            req.email,
            password_hash.into_string(),
            req.first_name.trim().to_string(),
            req.last_name.trim().to_string(),
            req.contact.trim().to_string(),
            Some(req.tenant_id),
            roles,
        );

        self.users.insert(&user).await?;
        tracing::info!(user_id = %user.id, "User registered");

        let pair = self.issuer.issue_pair(&user, Utc::now()).await?;
        Ok(AuthResponse::new(pair, user.sanitized()))
    }

    /// Verify credentials and issue a fresh pair, revoking all prior
    /// tokens for the user first. Unknown email and wrong password are
    /// indistinguishable to the caller.
    pub async fn authenticate(&self, req: LoginRequest) -> Result<AuthResponse, AppError> {
        let user = self
            .users
            .find_by_email(&req.email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        verify_password(
            &Password::new(req.password),
            &PasswordHashString::new(user.password_hash.clone()),
        )
        .map_err(|_| AppError::InvalidCredentials)?;

        self.revocation
            .revoke_user_tokens(user.id, Some(user.id))
            .await?;

        tracing::info!(user_id = %user.id, "User logged in");

        let pair = self.issuer.issue_pair(&user, Utc::now()).await?;
        Ok(AuthResponse::new(pair, user.sanitized()))
    }

    /// Rotate a session from a presented refresh token.
    ///
    /// Fails fast, without touching the ledger, when the token cannot be
    /// parsed, its subject is unknown, its tenant claim does not match the
    /// user's current tenant, or the ledger no longer considers it valid.
    /// The tenant mismatch is a security failure in its own right, never
    /// downgraded to ordinary invalidity.
    pub async fn refresh(&self, presented: &str) -> Result<AuthResponse, AppError> {
        let claims = self
            .codec
            .decode(presented)
            .map_err(|_| AppError::TokenInvalid)?;

        let user = self
            .users
            .find_by_email(&claims.sub)
            .await?
            .ok_or(AppError::TokenInvalid)?;

        if user.tenant_id != Some(claims.customer_account_id) {
            tracing::warn!(
                user_id = %user.id,
                claimed_tenant = %claims.customer_account_id,
                "Refresh token tenant claim does not match user tenant"
            );
            return Err(AppError::TokenScopeMismatch);
        }

        let stored = self
            .ledger
            .find_by_value(presented)
            .await?
            .ok_or(AppError::TokenInvalid)?;

        if stored.kind != TokenKind::Refresh || !stored.is_valid() {
            return Err(AppError::TokenInvalid);
        }

        // Programmatic rotation carries no authenticated actor.
        self.revocation.revoke_user_tokens(user.id, None).await?;

        tracing::info!(user_id = %user.id, "Session refreshed");

        let pair = self.issuer.issue_pair(&user, Utc::now()).await?;
        Ok(AuthResponse::new(pair, user.sanitized()))
    }

    /// Revoke exactly the presented access token. A missing bearer value
    /// is a no-op, not an error; the caller still clears its context.
    pub async fn logout(&self, bearer: Option<&str>) -> Result<(), AppError> {
        let value = match bearer {
            Some(value) => value,
            None => return Ok(()),
        };

        let actor = self
            .ledger
            .find_by_value(value)
            .await?
            .map(|token| token.user_id);

        self.revocation.revoke_token(value, actor).await?;

        if let Some(user_id) = actor {
            tracing::info!(user_id = %user_id, "User logged out");
        }

        Ok(())
    }
}
