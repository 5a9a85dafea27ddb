//! Token issuance: encode an access/refresh pair and persist both rows.

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::error::AppError;
use crate::models::{Token, TokenKind, UserAccount};
use crate::services::codec::{CodecError, TokenCodec};
use crate::services::ledger::TokenLedger;

/// A freshly issued access/refresh pair.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

#[derive(Clone)]
pub struct TokenIssuer {
    codec: TokenCodec,
    ledger: Arc<dyn TokenLedger>,
}

impl TokenIssuer {
    pub fn new(codec: TokenCodec, ledger: Arc<dyn TokenLedger>) -> Self {
        Self { codec, ledger }
    }

    /// Mint and persist a token pair for `user`.
    ///
    /// A subject without a tenant is a defect, not a user error; the
    /// codec's refusal propagates as a server-side failure. A value
    /// collision in the ledger likewise surfaces instead of being retried.
    pub async fn issue_pair(
        &self,
        user: &UserAccount,
        now: DateTime<Utc>,
    ) -> Result<TokenPair, AppError> {
        let access_token = self
            .codec
            .encode(&user.email, user.tenant_id, TokenKind::Access, now)
            .map_err(map_encode_error)?;
        let refresh_token = self
            .codec
            .encode(&user.email, user.tenant_id, TokenKind::Refresh, now)
            .map_err(map_encode_error)?;

        self.ledger
            .create(&Token::new(access_token.clone(), TokenKind::Access, user.id))
            .await?;
        self.ledger
            .create(&Token::new(
                refresh_token.clone(),
                TokenKind::Refresh,
                user.id,
            ))
            .await?;

        tracing::info!(user_id = %user.id, "Issued token pair");

        Ok(TokenPair {
            access_token,
            refresh_token,
            expires_in: self.codec.access_token_expiry_seconds(),
        })
    }
}

fn map_encode_error(err: CodecError) -> AppError {
    match err {
        CodecError::MissingTenant => AppError::MissingTenant,
        other => AppError::Internal(anyhow::anyhow!("Token encoding failed: {}", other)),
    }
}
