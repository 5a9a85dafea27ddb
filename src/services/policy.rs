//! Ownership-scoped authorization.
//!
//! A resource grants access when its owning tenant matches the caller's,
//! with a superadmin bypass. Denials surface the resource id and the
//! caller's own tenant only; the true owner is never echoed back, and the
//! HTTP boundary maps the denial to 404.

use uuid::Uuid;

use crate::error::AppError;
use crate::models::RoleName;
use crate::services::context::SecurityContext;

/// Capability contract for any business object subject to tenant scoping.
pub trait Owned {
    /// Owning tenant of the resource.
    fn owner_id(&self) -> Uuid;

    fn resource_id(&self) -> Uuid;

    fn display_name(&self) -> &str;
}

/// Grant access iff the caller's tenant owns the resource, or the caller
/// holds SUPER_ADMIN. Returns the resource on success so call sites can
/// chain directly.
pub fn validate_access<'r, R: Owned>(
    ctx: &SecurityContext,
    resource: &'r R,
) -> Result<&'r R, AppError> {
    if ctx.is_role(RoleName::SuperAdmin) {
        return Ok(resource);
    }

    let tenant_id = ctx.current_tenant_id()?;
    if tenant_id == resource.owner_id() {
        Ok(resource)
    } else {
        Err(AppError::NotAuthorized {
            resource_id: resource.resource_id(),
            tenant_id,
            display_name: resource.display_name().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserAccount;

    #[derive(Debug)]
    struct Invoice {
        id: Uuid,
        tenant: Uuid,
    }

    impl Owned for Invoice {
        fn owner_id(&self) -> Uuid {
            self.tenant
        }

        fn resource_id(&self) -> Uuid {
            self.id
        }

        fn display_name(&self) -> &str {
            "invoice"
        }
    }

    fn ctx_for(roles: Vec<RoleName>, tenant: Uuid) -> SecurityContext {
        let user = UserAccount::new(
            "u1@example.com".to_string(),
            "hash".to_string(),
            "Ada".to_string(),
            "Lovelace".to_string(),
            "+1-555-0100".to_string(),
            Some(tenant),
            roles,
        );
        SecurityContext::for_user(&user, tenant)
    }

    #[test]
    fn grants_when_tenant_matches_owner() {
        let tenant = Uuid::new_v4();
        let ctx = ctx_for(vec![RoleName::User], tenant);
        let invoice = Invoice {
            id: Uuid::new_v4(),
            tenant,
        };
        assert!(validate_access(&ctx, &invoice).is_ok());
    }

    #[test]
    fn denies_cross_tenant_access_without_leaking_owner() {
        let caller_tenant = Uuid::new_v4();
        let owner_tenant = Uuid::new_v4();
        let ctx = ctx_for(vec![RoleName::AccountAdmin], caller_tenant);
        let invoice = Invoice {
            id: Uuid::new_v4(),
            tenant: owner_tenant,
        };

        let err = validate_access(&ctx, &invoice).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains(&invoice.id.to_string()));
        assert!(msg.contains(&caller_tenant.to_string()));
        assert!(!msg.contains(&owner_tenant.to_string()));
    }

    #[test]
    fn super_admin_bypasses_ownership() {
        let ctx = ctx_for(vec![RoleName::SuperAdmin], Uuid::new_v4());
        let invoice = Invoice {
            id: Uuid::new_v4(),
            tenant: Uuid::new_v4(),
        };
        assert!(validate_access(&ctx, &invoice).is_ok());
    }

    #[test]
    fn anonymous_caller_is_rejected() {
        let ctx = SecurityContext::anonymous();
        let invoice = Invoice {
            id: Uuid::new_v4(),
            tenant: Uuid::new_v4(),
        };
        assert!(matches!(
            validate_access(&ctx, &invoice).unwrap_err(),
            AppError::NoAuthenticatedUser
        ));
    }
}
