//! PostgreSQL connection management and sqlx-backed stores.

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::FromRow;
use std::time::Duration;
use uuid::Uuid;

use crate::config::DatabaseConfig;
use crate::error::AppError;
use crate::models::{RoleName, Token, TokenKind, UserAccount};
use crate::services::{TokenLedger, UserStore};

/// Create a PostgreSQL connection pool.
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    tracing::info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(30))
        .idle_timeout(Duration::from_secs(600))
        .connect(&config.url)
        .await?;

    tracing::info!("Successfully connected to PostgreSQL");

    Ok(pool)
}

/// Run database migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("Database migrations completed");
    Ok(())
}

/// Check database health.
pub async fn health_check(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

#[derive(Debug, FromRow)]
struct TokenRow {
    token_id: Uuid,
    value: String,
    kind: String,
    expired: bool,
    revoked: bool,
    revoked_at: Option<DateTime<Utc>>,
    revoked_by: Option<Uuid>,
    user_id: Uuid,
    created_utc: DateTime<Utc>,
}

impl TryFrom<TokenRow> for Token {
    type Error = AppError;

    fn try_from(row: TokenRow) -> Result<Self, Self::Error> {
        let kind = TokenKind::parse(&row.kind)
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Unknown token kind: {}", row.kind)))?;
        Ok(Token {
            id: row.token_id,
            value: row.value,
            kind,
            expired: row.expired,
            revoked: row.revoked,
            revoked_at: row.revoked_at,
            revoked_by: row.revoked_by,
            user_id: row.user_id,
            created_utc: row.created_utc,
        })
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    user_id: Uuid,
    email: String,
    password_hash: String,
    first_name: String,
    last_name: String,
    contact: String,
    tenant_id: Option<Uuid>,
    roles: Vec<String>,
    created_utc: DateTime<Utc>,
}

impl TryFrom<UserRow> for UserAccount {
    type Error = AppError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let roles = row
            .roles
            .iter()
            .map(|r| {
                RoleName::parse(r)
                    .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Unknown role: {}", r)))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(UserAccount {
            id: row.user_id,
            email: row.email,
            password_hash: row.password_hash,
            first_name: row.first_name,
            last_name: row.last_name,
            contact: row.contact,
            tenant_id: row.tenant_id,
            roles,
            created_utc: row.created_utc,
        })
    }
}

const TOKEN_COLUMNS: &str =
    "token_id, value, kind, expired, revoked, revoked_at, revoked_by, user_id, created_utc";
const USER_COLUMNS: &str =
    "user_id, email, password_hash, first_name, last_name, contact, tenant_id, roles, created_utc";

/// sqlx-backed implementation of both store traits.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokenLedger for PgStore {
    async fn create(&self, token: &Token) -> Result<Uuid, AppError> {
        let result = sqlx::query(
            "INSERT INTO tokens (token_id, value, kind, expired, revoked, revoked_at, revoked_by, user_id, created_utc) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(token.id)
        .bind(&token.value)
        .bind(token.kind.as_str())
        .bind(token.expired)
        .bind(token.revoked)
        .bind(token.revoked_at)
        .bind(token.revoked_by)
        .bind(token.user_id)
        .bind(token.created_utc)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(token.id),
            Err(err) => {
                let is_unique_violation = err
                    .as_database_error()
                    .map(|e| e.is_unique_violation())
                    .unwrap_or(false);
                if is_unique_violation {
                    Err(AppError::DuplicateToken)
                } else {
                    Err(AppError::Database(err))
                }
            }
        }
    }

    async fn find_by_value(&self, value: &str) -> Result<Option<Token>, AppError> {
        let row: Option<TokenRow> = sqlx::query_as(&format!(
            "SELECT {} FROM tokens WHERE value = $1",
            TOKEN_COLUMNS
        ))
        .bind(value)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Token::try_from).transpose()
    }

    async fn find_valid_by_user(&self, user_id: Uuid) -> Result<Vec<Token>, AppError> {
        let rows: Vec<TokenRow> = sqlx::query_as(&format!(
            "SELECT {} FROM tokens WHERE user_id = $1 AND NOT expired AND NOT revoked",
            TOKEN_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Token::try_from).collect()
    }

    async fn revoke_all_for_user(
        &self,
        user_id: Uuid,
        actor: Option<Uuid>,
    ) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE tokens SET expired = TRUE, revoked = TRUE, revoked_at = $2, revoked_by = $3 \
             WHERE user_id = $1 AND NOT expired AND NOT revoked",
        )
        .bind(user_id)
        .bind(Utc::now())
        .bind(actor)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn revoke_one(&self, value: &str, actor: Option<Uuid>) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE tokens SET expired = TRUE, revoked = TRUE, revoked_at = $2, revoked_by = $3 \
             WHERE value = $1 AND NOT expired AND NOT revoked",
        )
        .bind(value)
        .bind(Utc::now())
        .bind(actor)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>, AppError> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserAccount::try_from).transpose()
    }

    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<UserAccount>, AppError> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "SELECT {} FROM users WHERE user_id = $1",
            USER_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserAccount::try_from).transpose()
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, AppError> {
        let row: Option<(i32,)> =
            sqlx::query_as("SELECT 1 FROM users WHERE email = $1 LIMIT 1")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.is_some())
    }

    async fn insert(&self, user: &UserAccount) -> Result<(), AppError> {
        let roles: Vec<String> = user.roles.iter().map(|r| r.as_str().to_string()).collect();

        sqlx::query(
            "INSERT INTO users (user_id, email, password_hash, first_name, last_name, contact, tenant_id, roles, created_utc) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.contact)
        .bind(user.tenant_id)
        .bind(&roles)
        .bind(user.created_utc)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires running PostgreSQL
    async fn test_create_pool() {
        let config = DatabaseConfig {
            url: "postgres://localhost/tenant_auth_test".to_string(),
            max_connections: 5,
            min_connections: 1,
        };

        let result = create_pool(&config).await;
        assert!(result.is_ok());
    }
}
