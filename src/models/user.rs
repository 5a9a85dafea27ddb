//! User accounts. Consumed by the auth core; business profile fields
//! beyond what login and tenant scoping need are out of scope.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::role::RoleName;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: Uuid,
    /// Unique login identifier; the token `sub` claim.
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub contact: String,
    /// None only for the system superadmin account.
    pub tenant_id: Option<Uuid>,
    pub roles: Vec<RoleName>,
    pub created_utc: DateTime<Utc>,
}

impl UserAccount {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        email: String,
        password_hash: String,
        first_name: String,
        last_name: String,
        contact: String,
        tenant_id: Option<Uuid>,
        roles: Vec<RoleName>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            password_hash,
            first_name,
            last_name,
            contact,
            tenant_id,
            roles,
            created_utc: Utc::now(),
        }
    }

    pub fn is_super_admin(&self) -> bool {
        self.roles.contains(&RoleName::SuperAdmin)
    }

    /// Response shape without the credential hash.
    pub fn sanitized(&self) -> UserResponse {
        UserResponse {
            user_id: self.id,
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            tenant_id: self.tenant_id,
            roles: self.roles.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub user_id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub tenant_id: Option<Uuid>,
    pub roles: Vec<RoleName>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> UserAccount {
        UserAccount::new(
            "u1@example.com".to_string(),
            "$argon2id$stub".to_string(),
            "Ada".to_string(),
            "Lovelace".to_string(),
            "+1-555-0100".to_string(),
            Some(Uuid::new_v4()),
            vec![RoleName::User],
        )
    }

    #[test]
    fn sanitized_response_drops_password_hash() {
        let user = sample_user();
        let json = serde_json::to_string(&user.sanitized()).unwrap();
        assert!(!json.contains("argon2"));
        assert!(json.contains("u1@example.com"));
    }

    #[test]
    fn super_admin_detection() {
        let mut user = sample_user();
        assert!(!user.is_super_admin());
        user.roles.push(RoleName::SuperAdmin);
        assert!(user.is_super_admin());
    }
}
