// Database row types shared across queries and handlers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

// ============================================================================
// User
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role_id: Uuid,
    /// Flat role tag kept in sync with `role_id` at write time. The legacy
    /// `authorize(...)` middleware checks this field; the permission-table
    /// middleware checks the referenced role. Both stay live.
    pub legacy_role: String,
    pub is_active: bool,
    pub login_attempts: i32,
    pub lock_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// A locked account rejects any login attempt until `lock_until` elapses.
    /// Evaluated fresh per request.
    pub fn is_locked(&self, now: DateTime<Utc>) -> bool {
        self.lock_until.map_or(false, |until| until > now)
    }
}

// ============================================================================
// Role & permissions
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    Complaints,
    Users,
    Reports,
    System,
}

impl Resource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Complaints => "complaints",
            Resource::Users => "users",
            Resource::Reports => "reports",
            Resource::System => "system",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
    Assign,
    Approve,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Read => "read",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::Assign => "assign",
            Action::Approve => "approve",
        }
    }
}

/// One grant inside a role: a resource and the actions allowed on it.
/// A role holds at most one grant per resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionGrant {
    pub resource: Resource,
    pub actions: Vec<Action>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Role {
    pub id: Uuid,
    pub name: String,
    pub display_name: String,
    pub description: String,
    /// 1-10, higher = more privileged. Display and ordering only; never used
    /// as a numeric authorization gate.
    pub hierarchy: i32,
    pub is_active: bool,
    pub permissions: Json<Vec<PermissionGrant>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Role {
    /// Permission test against this role's grant table. False for inactive
    /// roles regardless of grants; no hierarchy inheritance.
    pub fn allows(&self, resource: Resource, action: Action) -> bool {
        if !self.is_active {
            return false;
        }
        self.permissions
            .iter()
            .find(|grant| grant.resource == resource)
            .map_or(false, |grant| grant.actions.contains(&action))
    }
}

// ============================================================================
// Session
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    pub refresh_token: String,
    pub user_agent: String,
    pub ip: String,
    pub device_type: String,
    pub browser: String,
    pub os: String,
    pub is_active: bool,
    pub last_activity: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn role_with(permissions: Vec<PermissionGrant>, is_active: bool) -> Role {
        let now = Utc::now();
        Role {
            id: Uuid::new_v4(),
            name: "citizen".to_string(),
            display_name: "Citizen".to_string(),
            description: "Regular city resident".to_string(),
            hierarchy: 1,
            is_active,
            permissions: Json(permissions),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_allows_matching_grant() {
        let role = role_with(
            vec![PermissionGrant {
                resource: Resource::Complaints,
                actions: vec![Action::Create, Action::Read],
            }],
            true,
        );

        assert!(role.allows(Resource::Complaints, Action::Create));
        assert!(role.allows(Resource::Complaints, Action::Read));
        assert!(!role.allows(Resource::Complaints, Action::Assign));
    }

    #[test]
    fn test_allows_no_grant_for_resource() {
        let role = role_with(
            vec![PermissionGrant {
                resource: Resource::Complaints,
                actions: vec![Action::Read],
            }],
            true,
        );

        assert!(!role.allows(Resource::Users, Action::Read));
    }

    #[test]
    fn test_inactive_role_denies_everything() {
        let role = role_with(
            vec![PermissionGrant {
                resource: Resource::Complaints,
                actions: vec![Action::Create, Action::Read],
            }],
            false,
        );

        assert!(!role.allows(Resource::Complaints, Action::Read));
    }

    #[test]
    fn test_user_lock_window() {
        let now = Utc::now();
        let mut user = User {
            id: Uuid::new_v4(),
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: "$argon2id$...".to_string(),
            role_id: Uuid::new_v4(),
            legacy_role: "citizen".to_string(),
            is_active: true,
            login_attempts: 0,
            lock_until: None,
            created_at: now,
            updated_at: now,
        };

        assert!(!user.is_locked(now));

        user.lock_until = Some(now + Duration::hours(2));
        assert!(user.is_locked(now));

        // Window elapsed
        assert!(!user.is_locked(now + Duration::hours(2) + Duration::seconds(1)));
    }

    #[test]
    fn test_permission_grant_json_shape() {
        let grant = PermissionGrant {
            resource: Resource::Complaints,
            actions: vec![Action::Create, Action::Read],
        };
        let value = serde_json::to_value(&grant).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"resource": "complaints", "actions": ["create", "read"]})
        );
    }
}
