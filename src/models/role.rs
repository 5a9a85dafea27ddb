//! Role tiers and their permission grants.
//!
//! The role/permission relation is a static immutable table built once at
//! startup. There is no implicit tier inheritance at check time: every
//! role's set is enumerated in full here.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoleName {
    User,
    Associate,
    Member,
    AccountAdmin,
    SuperAdmin,
}

impl RoleName {
    pub const ALL: [RoleName; 5] = [
        RoleName::User,
        RoleName::Associate,
        RoleName::Member,
        RoleName::AccountAdmin,
        RoleName::SuperAdmin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RoleName::User => "USER",
            RoleName::Associate => "ASSOCIATE",
            RoleName::Member => "MEMBER",
            RoleName::AccountAdmin => "ACCOUNT_ADMIN",
            RoleName::SuperAdmin => "SUPER_ADMIN",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "USER" => Some(RoleName::User),
            "ASSOCIATE" => Some(RoleName::Associate),
            "MEMBER" => Some(RoleName::Member),
            "ACCOUNT_ADMIN" => Some(RoleName::AccountAdmin),
            "SUPER_ADMIN" => Some(RoleName::SuperAdmin),
            _ => None,
        }
    }

    /// The `ROLE_<name>` marker authority for this tier.
    pub fn marker(&self) -> String {
        format!("ROLE_{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Permission {
    UserRead,
    UserUpdate,
    UserCreate,
    UserDelete,
    AssociateRead,
    AssociateUpdate,
    AssociateCreate,
    AssociateDelete,
    MemberRead,
    MemberUpdate,
    MemberCreate,
    MemberDelete,
    AccountAdminRead,
    AccountAdminUpdate,
    AccountAdminCreate,
    AccountAdminDelete,
    SuperAdminRead,
    SuperAdminUpdate,
    SuperAdminCreate,
    SuperAdminDelete,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::UserRead => "user:read",
            Permission::UserUpdate => "user:update",
            Permission::UserCreate => "user:create",
            Permission::UserDelete => "user:delete",
            Permission::AssociateRead => "associate:read",
            Permission::AssociateUpdate => "associate:update",
            Permission::AssociateCreate => "associate:create",
            Permission::AssociateDelete => "associate:delete",
            Permission::MemberRead => "member:read",
            Permission::MemberUpdate => "member:update",
            Permission::MemberCreate => "member:create",
            Permission::MemberDelete => "member:delete",
            Permission::AccountAdminRead => "account_admin:read",
            Permission::AccountAdminUpdate => "account_admin:update",
            Permission::AccountAdminCreate => "account_admin:create",
            Permission::AccountAdminDelete => "account_admin:delete",
            Permission::SuperAdminRead => "super_admin:read",
            Permission::SuperAdminUpdate => "super_admin:update",
            Permission::SuperAdminCreate => "super_admin:create",
            Permission::SuperAdminDelete => "super_admin:delete",
        }
    }
}

const USER_TIER: [Permission; 4] = [
    Permission::UserRead,
    Permission::UserUpdate,
    Permission::UserCreate,
    Permission::UserDelete,
];
const ASSOCIATE_TIER: [Permission; 4] = [
    Permission::AssociateRead,
    Permission::AssociateUpdate,
    Permission::AssociateCreate,
    Permission::AssociateDelete,
];
const MEMBER_TIER: [Permission; 4] = [
    Permission::MemberRead,
    Permission::MemberUpdate,
    Permission::MemberCreate,
    Permission::MemberDelete,
];
const ACCOUNT_ADMIN_TIER: [Permission; 4] = [
    Permission::AccountAdminRead,
    Permission::AccountAdminUpdate,
    Permission::AccountAdminCreate,
    Permission::AccountAdminDelete,
];
const SUPER_ADMIN_TIER: [Permission; 4] = [
    Permission::SuperAdminRead,
    Permission::SuperAdminUpdate,
    Permission::SuperAdminCreate,
    Permission::SuperAdminDelete,
];

/// Static role -> permission table. Higher tiers list the lower tiers'
/// permissions explicitly; nothing is inferred from tier ordering.
pub static ROLE_PERMISSIONS: Lazy<BTreeMap<RoleName, BTreeSet<Permission>>> = Lazy::new(|| {
    let mut table = BTreeMap::new();
    table.insert(RoleName::User, USER_TIER.into_iter().collect());
    table.insert(
        RoleName::Associate,
        USER_TIER.into_iter().chain(ASSOCIATE_TIER).collect(),
    );
    table.insert(
        RoleName::Member,
        USER_TIER
            .into_iter()
            .chain(ASSOCIATE_TIER)
            .chain(MEMBER_TIER)
            .collect(),
    );
    table.insert(
        RoleName::AccountAdmin,
        USER_TIER
            .into_iter()
            .chain(ASSOCIATE_TIER)
            .chain(MEMBER_TIER)
            .chain(ACCOUNT_ADMIN_TIER)
            .collect(),
    );
    table.insert(
        RoleName::SuperAdmin,
        USER_TIER
            .into_iter()
            .chain(ASSOCIATE_TIER)
            .chain(MEMBER_TIER)
            .chain(ACCOUNT_ADMIN_TIER)
            .chain(SUPER_ADMIN_TIER)
            .collect(),
    );
    table
});

/// Authority strings for a set of held roles: one string per granted
/// permission plus one `ROLE_*` marker per role.
pub fn authorities_for(roles: &[RoleName]) -> BTreeSet<String> {
    let mut authorities = BTreeSet::new();
    for role in roles {
        authorities.insert(role.marker());
        if let Some(permissions) = ROLE_PERMISSIONS.get(role) {
            for permission in permissions {
                authorities.insert(permission.as_str().to_string());
            }
        }
    }
    authorities
}
