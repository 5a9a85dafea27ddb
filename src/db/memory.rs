//! In-memory stores for tests and local development without PostgreSQL.
//!
//! Mirrors the durability contract of the sqlx-backed stores: a mutation
//! completes before the call returns, and a later read on the same value
//! observes it.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Token, UserAccount};
use crate::services::{TokenLedger, UserStore};

#[derive(Default)]
pub struct InMemoryStore {
    tokens: Mutex<HashMap<String, Token>>,
    users: Mutex<HashMap<Uuid, UserAccount>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenLedger for InMemoryStore {
    async fn create(&self, token: &Token) -> Result<Uuid, AppError> {
        let mut tokens = self.tokens.lock().unwrap();
        if tokens.contains_key(&token.value) {
            return Err(AppError::DuplicateToken);
        }
        tokens.insert(token.value.clone(), token.clone());
        Ok(token.id)
    }

    async fn find_by_value(&self, value: &str) -> Result<Option<Token>, AppError> {
        Ok(self.tokens.lock().unwrap().get(value).cloned())
    }

    async fn find_valid_by_user(&self, user_id: Uuid) -> Result<Vec<Token>, AppError> {
        Ok(self
            .tokens
            .lock()
            .unwrap()
            .values()
            .filter(|t| t.user_id == user_id && t.is_valid())
            .cloned()
            .collect())
    }

    async fn revoke_all_for_user(
        &self,
        user_id: Uuid,
        actor: Option<Uuid>,
    ) -> Result<(), AppError> {
        let now = Utc::now();
        let mut tokens = self.tokens.lock().unwrap();
        for token in tokens.values_mut() {
            if token.user_id == user_id && token.is_valid() {
                token.revoke(actor, now);
            }
        }
        Ok(())
    }

    async fn revoke_one(&self, value: &str, actor: Option<Uuid>) -> Result<(), AppError> {
        let mut tokens = self.tokens.lock().unwrap();
        if let Some(token) = tokens.get_mut(value) {
            if token.is_valid() {
                token.revoke(actor, Utc::now());
            }
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>, AppError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<UserAccount>, AppError> {
        Ok(self.users.lock().unwrap().get(&user_id).cloned())
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, AppError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .any(|u| u.email == email))
    }

    async fn insert(&self, user: &UserAccount) -> Result<(), AppError> {
        self.users.lock().unwrap().insert(user.id, user.clone());
        Ok(())
    }
}
