//! Persistence seams for the token ledger and user accounts.
//!
//! The ledger is the source of truth for whether an issued token is still
//! usable. Every mutation is durable before the call returns; validity is
//! never cached in-process, so a revocation is visible to the next request
//! that presents the token.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Token, UserAccount};

#[async_trait]
pub trait TokenLedger: Send + Sync {
    /// Persist a newly issued token. Fails with [`AppError::DuplicateToken`]
    /// if the value collides with an existing row.
    async fn create(&self, token: &Token) -> Result<Uuid, AppError>;

    /// Point lookup by token value.
    async fn find_by_value(&self, value: &str) -> Result<Option<Token>, AppError>;

    /// Tokens for a user where neither `expired` nor `revoked` is set.
    async fn find_valid_by_user(&self, user_id: Uuid) -> Result<Vec<Token>, AppError>;

    /// Revoke every currently valid token for a user, stamping the actor
    /// and timestamp. Silent no-op when the user has none.
    async fn revoke_all_for_user(
        &self,
        user_id: Uuid,
        actor: Option<Uuid>,
    ) -> Result<(), AppError>;

    /// Revoke the single token with this value. Silently idempotent when
    /// the value is unknown.
    async fn revoke_one(&self, value: &str, actor: Option<Uuid>) -> Result<(), AppError>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>, AppError>;

    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<UserAccount>, AppError>;

    async fn exists_by_email(&self, email: &str) -> Result<bool, AppError>;

    async fn insert(&self, user: &UserAccount) -> Result<(), AppError>;
}
