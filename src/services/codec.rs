//! Signed bearer token codec.
//!
//! Stateless HMAC-SHA256 encode/decode of claims. Pure: no I/O, safe to
//! share across request tasks without synchronization.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::JwtConfig;
use crate::models::TokenKind;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Malformed token")]
    Malformed,

    #[error("Token signature is invalid")]
    SignatureInvalid,

    #[error("Token has expired")]
    Expired,

    #[error("Subject has no tenant; refusing to mint a token")]
    MissingTenant,
}

/// Claims carried inside a signed token. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user's login email.
    pub sub: String,
    /// Owning tenant of the subject.
    #[serde(rename = "customerAccountId")]
    pub customer_account_id: Uuid,
    /// Issued at (epoch seconds).
    pub iat: i64,
    /// Expiry (epoch seconds).
    pub exp: i64,
}

#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_expiry_minutes: i64,
    refresh_token_expiry_days: i64,
}

impl TokenCodec {
    /// Build a codec from configuration; the shared secret is base64-decoded.
    pub fn new(config: &JwtConfig) -> Result<Self, anyhow::Error> {
        let secret = BASE64
            .decode(config.secret_base64.trim())
            .map_err(|e| anyhow::anyhow!("Failed to base64-decode JWT secret: {}", e))?;

        if secret.is_empty() {
            return Err(anyhow::anyhow!("JWT secret must not be empty"));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(&secret),
            decoding_key: DecodingKey::from_secret(&secret),
            access_token_expiry_minutes: config.access_token_expiry_minutes,
            refresh_token_expiry_days: config.refresh_token_expiry_days,
        })
    }

    fn ttl(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => Duration::minutes(self.access_token_expiry_minutes),
            TokenKind::Refresh => Duration::days(self.refresh_token_expiry_days),
        }
    }

    /// Encode a signed token for `subject`. Fails when the subject carries
    /// no tenant: every login-capable subject must resolve to one before a
    /// token is minted.
    pub fn encode(
        &self,
        subject: &str,
        tenant_id: Option<Uuid>,
        kind: TokenKind,
        now: DateTime<Utc>,
    ) -> Result<String, CodecError> {
        let tenant_id = tenant_id.ok_or(CodecError::MissingTenant)?;
        let exp = now + self.ttl(kind);

        let claims = Claims {
            sub: subject.to_string(),
            customer_account_id: tenant_id,
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        let header = Header::new(Algorithm::HS256);
        encode(&header, &claims, &self.encoding_key).map_err(|_| CodecError::Malformed)
    }

    /// Decode and verify a token. Discriminates malformed input, bad
    /// signatures, and elapsed expiry.
    pub fn decode(&self, token: &str) -> Result<Claims, CodecError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        let token_data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => CodecError::Expired,
                    jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                        CodecError::SignatureInvalid
                    }
                    _ => CodecError::Malformed,
                }
            })?;

        Ok(token_data.claims)
    }

    /// Access token lifetime in seconds, for the response envelope.
    pub fn access_token_expiry_seconds(&self) -> i64 {
        self.access_token_expiry_minutes * 60
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_codec() -> TokenCodec {
        let config = JwtConfig {
            secret_base64: BASE64.encode(b"a-sufficiently-long-test-secret"),
            access_token_expiry_minutes: 15,
            refresh_token_expiry_days: 7,
        };
        TokenCodec::new(&config).unwrap()
    }

    #[test]
    fn encode_then_decode_round_trips_claims() {
        let codec = test_codec();
        let tenant = Uuid::new_v4();
        let now = Utc::now();

        let token = codec
            .encode("u1@example.com", Some(tenant), TokenKind::Access, now)
            .unwrap();
        let claims = codec.decode(&token).unwrap();

        assert_eq!(claims.sub, "u1@example.com");
        assert_eq!(claims.customer_account_id, tenant);
        assert_eq!(claims.iat, now.timestamp());
        assert_eq!(claims.exp, (now + Duration::minutes(15)).timestamp());
    }

    #[test]
    fn refresh_tokens_use_their_own_ttl() {
        let codec = test_codec();
        let now = Utc::now();
        let token = codec
            .encode(
                "u1@example.com",
                Some(Uuid::new_v4()),
                TokenKind::Refresh,
                now,
            )
            .unwrap();
        let claims = codec.decode(&token).unwrap();
        assert_eq!(claims.exp, (now + Duration::days(7)).timestamp());
    }

    #[test]
    fn missing_tenant_is_refused_at_encode() {
        let codec = test_codec();
        let err = codec
            .encode("root@example.com", None, TokenKind::Access, Utc::now())
            .unwrap_err();
        assert!(matches!(err, CodecError::MissingTenant));
    }

    #[test]
    fn expired_token_is_discriminated() {
        let codec = test_codec();
        let issued = Utc::now() - Duration::hours(1);
        let token = codec
            .encode("u1@example.com", Some(Uuid::new_v4()), TokenKind::Access, issued)
            .unwrap();
        let err = codec.decode(&token).unwrap_err();
        assert!(matches!(err, CodecError::Expired));
    }

    #[test]
    fn foreign_signature_is_rejected() {
        let codec = test_codec();
        let other = TokenCodec::new(&JwtConfig {
            secret_base64: BASE64.encode(b"a-completely-different-secret!!"),
            access_token_expiry_minutes: 15,
            refresh_token_expiry_days: 7,
        })
        .unwrap();

        let token = other
            .encode("u1@example.com", Some(Uuid::new_v4()), TokenKind::Access, Utc::now())
            .unwrap();
        let err = codec.decode(&token).unwrap_err();
        assert!(matches!(err, CodecError::SignatureInvalid));
    }

    #[test]
    fn garbage_input_is_malformed() {
        let codec = test_codec();
        assert!(matches!(
            codec.decode("not-a-token").unwrap_err(),
            CodecError::Malformed
        ));
    }
}
