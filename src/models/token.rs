//! Token ledger rows. Tokens are created at issue time, flipped to
//! expired/revoked by the revocation manager, and never deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "access" => Some(TokenKind::Access),
            "refresh" => Some(TokenKind::Refresh),
            _ => None,
        }
    }
}

/// An issued bearer token as stored in the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub id: Uuid,
    /// The signed credential itself; globally unique.
    pub value: String,
    pub kind: TokenKind,
    /// Monotonic: once true, never reset.
    pub expired: bool,
    /// Monotonic: once true, never reset.
    pub revoked: bool,
    pub revoked_at: Option<DateTime<Utc>>,
    pub revoked_by: Option<Uuid>,
    pub user_id: Uuid,
    pub created_utc: DateTime<Utc>,
}

impl Token {
    pub fn new(value: String, kind: TokenKind, user_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            value,
            kind,
            expired: false,
            revoked: false,
            revoked_at: None,
            revoked_by: None,
            user_id,
            created_utc: Utc::now(),
        }
    }

    /// A token is usable iff neither flag has been set. Codec-level expiry
    /// is enforced separately at decode time.
    pub fn is_valid(&self) -> bool {
        !self.expired && !self.revoked
    }

    /// Stamp the revocation flags. Idempotent; flags only ever move to true.
    pub fn revoke(&mut self, actor: Option<Uuid>, at: DateTime<Utc>) {
        if self.is_valid() {
            self.revoked_at = Some(at);
            self.revoked_by = actor;
        }
        self.expired = true;
        self.revoked = true;
    }
}
