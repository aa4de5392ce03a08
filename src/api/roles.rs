// Role endpoints, gated on the system:read permission

use crate::api::routes::AppState;
use crate::authz::roles;
use crate::db;
use crate::db::schema::Role;
use crate::errors::{AppError, Result};
use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

/// GET /roles
pub async fn list_roles(State(state): State<AppState>) -> Result<Json<Vec<Role>>> {
    let roles = roles::get_all_roles(&state.db_pool).await?;
    Ok(Json(roles))
}

/// GET /roles/:id
///
/// Loads by id without the active filter so administrators can inspect
/// deactivated roles too.
pub async fn get_role(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Role>> {
    let role = db::roles::get_by_id(&state.db_pool, id)
        .await?
        .ok_or(AppError::NotFound("Role"))?;

    Ok(Json(role))
}
