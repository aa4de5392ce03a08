// Database queries for roles

use crate::db::schema::{PermissionGrant, Role};
use crate::errors::Result;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

/// Get a role by ID, active or not. Callers that care about activity check
/// `is_active` themselves (an inactive role must still load so permission
/// checks can deny it explicitly).
pub async fn get_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Role>> {
    let role = sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(role)
}

/// Get an active role by name
pub async fn get_by_name(pool: &PgPool, name: &str) -> Result<Option<Role>> {
    let role = sqlx::query_as::<_, Role>(
        "SELECT * FROM roles WHERE name = $1 AND is_active = TRUE",
    )
    .bind(name)
    .fetch_optional(pool)
    .await?;

    Ok(role)
}

/// Get all active roles ordered by hierarchy
pub async fn get_all_active(pool: &PgPool) -> Result<Vec<Role>> {
    let roles = sqlx::query_as::<_, Role>(
        "SELECT * FROM roles WHERE is_active = TRUE ORDER BY hierarchy",
    )
    .fetch_all(pool)
    .await?;

    Ok(roles)
}

/// Upsert a role by name. Used by the boot-time seed; re-running refreshes
/// the seeded definitions without duplicating rows or touching other roles.
pub async fn upsert_by_name(
    pool: &PgPool,
    name: &str,
    display_name: &str,
    description: &str,
    hierarchy: i32,
    permissions: &[PermissionGrant],
) -> Result<Role> {
    let role = sqlx::query_as::<_, Role>(
        r#"
        INSERT INTO roles (name, display_name, description, hierarchy, permissions)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (name) DO UPDATE SET
            display_name = EXCLUDED.display_name,
            description = EXCLUDED.description,
            hierarchy = EXCLUDED.hierarchy,
            permissions = EXCLUDED.permissions,
            updated_at = NOW()
        RETURNING *
        "#,
    )
    .bind(name)
    .bind(display_name)
    .bind(description)
    .bind(hierarchy)
    .bind(Json(permissions))
    .fetch_one(pool)
    .await?;

    Ok(role)
}
