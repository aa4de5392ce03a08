// User endpoints

use crate::api::routes::AppState;
use crate::authz::CurrentUser;
use crate::db;
use crate::db::schema::{Role, User};
use crate::errors::Result;
use axum::{extract::State, Extension, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// GET /users/profile
///
/// Any authenticated principal; returns their own projection with the
/// populated role.
pub async fn get_profile(
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<serde_json::Value>> {
    let CurrentUser { user, role } = current;

    let profile = ProfileUser {
        id: user.id,
        name: user.name,
        email: user.email,
        role,
        created_at: user.created_at,
    };

    Ok(Json(json!({
        "message": "Profile retrieved successfully",
        "user": profile,
    })))
}

#[derive(Debug, Serialize)]
pub struct UsersResponse {
    pub message: String,
    pub users: Vec<User>,
}

/// GET /users
///
/// Admin only (legacy role check). `User` serialization skips the digest.
pub async fn list_users(State(state): State<AppState>) -> Result<Json<UsersResponse>> {
    let users = db::users::list(&state.db_pool).await?;

    Ok(Json(UsersResponse {
        message: "Users retrieved successfully".to_string(),
        users,
    }))
}
