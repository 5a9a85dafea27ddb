//! Per-request security context.
//!
//! Built exactly once per request after token validation and threaded as an
//! explicit value (request extension + extractor), never a process global.
//! The tenant id comes from the token claim, which is authoritative for the
//! duration of the request.

use std::collections::BTreeSet;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{authorities_for, RoleName, UserAccount, UserResponse};

#[derive(Debug, Clone)]
pub enum SecurityContext {
    Anonymous,
    Authenticated {
        user: UserResponse,
        /// Tenant id as claimed by the presented token.
        tenant_id: Option<Uuid>,
        authorities: BTreeSet<String>,
    },
}

impl SecurityContext {
    pub fn anonymous() -> Self {
        SecurityContext::Anonymous
    }

    /// Resolve a principal from a validated user and the tenant claim
    /// carried by their token.
    pub fn for_user(user: &UserAccount, tenant_claim: Uuid) -> Self {
        SecurityContext::Authenticated {
            user: user.sanitized(),
            tenant_id: Some(tenant_claim),
            authorities: authorities_for(&user.roles),
        }
    }

    pub fn current_user(&self) -> Result<&UserResponse, AppError> {
        match self {
            SecurityContext::Anonymous => Err(AppError::NoAuthenticatedUser),
            SecurityContext::Authenticated { user, .. } => Ok(user),
        }
    }

    pub fn current_tenant_id(&self) -> Result<Uuid, AppError> {
        match self {
            SecurityContext::Anonymous => Err(AppError::NoAuthenticatedUser),
            SecurityContext::Authenticated { tenant_id, .. } => {
                (*tenant_id).ok_or(AppError::NoTenant)
            }
        }
    }

    pub fn has_authority(&self, name: &str) -> bool {
        match self {
            SecurityContext::Anonymous => false,
            SecurityContext::Authenticated { authorities, .. } => authorities.contains(name),
        }
    }

    pub fn is_role(&self, role: RoleName) -> bool {
        self.has_authority(&role.marker())
    }
}
