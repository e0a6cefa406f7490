// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    SuperAdmin,
    Cashier,
    RepairStaff,
}

/// Which side(s) of the house a user may log in to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "system_scope", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SystemScope {
    Operation,
    Accounting,
    Both,
}

impl SystemScope {
    pub fn allows(self, portal: Portal) -> bool {
        match self {
            SystemScope::Both => true,
            SystemScope::Operation => portal == Portal::Operation,
            SystemScope::Accounting => portal == Portal::Accounting,
        }
    }
}

/// A portal is an explicit value everywhere below the HTTP boundary; the
/// middleware is the only place that infers it from the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "portal", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Portal {
    Operation,
    Accounting,
}

impl Portal {
    /// Portal-specific session cookie name; the two portals read and write
    /// disjoint cookies, so a user can hold one session per portal.
    pub fn cookie_name(self) -> &'static str {
        match self {
            Portal::Operation => "bw_ops_session",
            Portal::Accounting => "bw_acct_session",
        }
    }
}

/// Per-module access grants. SUPER_ADMIN implicitly holds the full set and
/// never needs them listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "capability", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Capability {
    Dashboard,
    Repairs,
    Clients,
    Brands,
    Users,
    Sms,
    Settings,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
    pub mobile: Option<String>,

    #[serde(skip_serializing)]
    pub password_hash: String,

    pub role: Role,
    pub system: SystemScope,
    pub capabilities: Vec<Capability>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn has_capability(&self, capability: Capability) -> bool {
        self.role == Role::SuperAdmin || self.capabilities.contains(&capability)
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub portal: Portal,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

// --- Payloads ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginPayload {
    #[validate(length(min = 1, message = "is required"))]
    #[schema(example = "kasun")]
    pub username: String,

    #[validate(length(min = 6, message = "must be at least 6 characters"))]
    pub password: String,

    pub portal: Portal,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserPayload {
    #[validate(length(min = 3, message = "must be at least 3 characters"))]
    #[schema(example = "kasun")]
    pub username: String,

    #[validate(length(min = 1, message = "is required"))]
    #[schema(example = "Kasun Perera")]
    pub full_name: String,

    pub mobile: Option<String>,

    #[validate(length(min = 6, message = "must be at least 6 characters"))]
    pub password: String,

    pub role: Role,
    pub system: SystemScope,

    #[serde(default)]
    pub capabilities: Vec<Capability>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserPayload {
    pub full_name: Option<String>,
    pub mobile: Option<String>,
    pub role: Option<Role>,
    pub system: Option<SystemScope>,
    pub capabilities: Option<Vec<Capability>>,
    pub is_active: Option<bool>,

    #[validate(length(min = 6, message = "must be at least 6 characters"))]
    pub password: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with(role: Role, capabilities: Vec<Capability>) -> User {
        User {
            id: Uuid::new_v4(),
            username: "test".into(),
            full_name: "Test".into(),
            mobile: None,
            password_hash: String::new(),
            role,
            system: SystemScope::Operation,
            capabilities,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn super_admin_holds_every_capability_implicitly() {
        let admin = user_with(Role::SuperAdmin, vec![]);
        for cap in [
            Capability::Dashboard,
            Capability::Repairs,
            Capability::Clients,
            Capability::Brands,
            Capability::Users,
            Capability::Sms,
            Capability::Settings,
        ] {
            assert!(admin.has_capability(cap));
        }
    }

    #[test]
    fn other_roles_need_explicit_grants() {
        let cashier = user_with(Role::Cashier, vec![Capability::Repairs]);
        assert!(cashier.has_capability(Capability::Repairs));
        assert!(!cashier.has_capability(Capability::Users));
    }

    #[test]
    fn system_scope_gates_portals() {
        assert!(SystemScope::Operation.allows(Portal::Operation));
        assert!(!SystemScope::Operation.allows(Portal::Accounting));
        assert!(!SystemScope::Accounting.allows(Portal::Operation));
        assert!(SystemScope::Both.allows(Portal::Operation));
        assert!(SystemScope::Both.allows(Portal::Accounting));
    }

    #[test]
    fn portals_use_disjoint_cookie_names() {
        assert_ne!(Portal::Operation.cookie_name(), Portal::Accounting.cookie_name());
    }
}
