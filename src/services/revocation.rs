//! Revocation manager.
//!
//! Carries the single-active-session policy: login and refresh both sweep
//! every prior valid token for the user before a new pair is minted, so at
//! most one session's worth of tokens is live per user.

use std::sync::Arc;
use uuid::Uuid;

use crate::error::AppError;
use crate::services::ledger::TokenLedger;

#[derive(Clone)]
pub struct RevocationManager {
    ledger: Arc<dyn TokenLedger>,
}

impl RevocationManager {
    pub fn new(ledger: Arc<dyn TokenLedger>) -> Self {
        Self { ledger }
    }

    /// Revoke the user's entire valid token set. No-op when none are valid.
    pub async fn revoke_user_tokens(
        &self,
        user_id: Uuid,
        actor: Option<Uuid>,
    ) -> Result<(), AppError> {
        self.ledger.revoke_all_for_user(user_id, actor).await?;
        tracing::info!(user_id = %user_id, "Revoked outstanding tokens for user");
        Ok(())
    }

    /// Revoke exactly one token by value, leaving the rest of the owner's
    /// set untouched. Idempotent for unknown values.
    pub async fn revoke_token(&self, value: &str, actor: Option<Uuid>) -> Result<(), AppError> {
        self.ledger.revoke_one(value, actor).await?;
        Ok(())
    }
}
