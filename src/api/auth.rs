// Authentication endpoints: register, login, refresh, logout

use crate::api::routes::AppState;
use crate::auth::{device::DeviceInfo, password, session};
use crate::authz::roles;
use crate::db;
use crate::db::schema::{PermissionGrant, Role, User};
use crate::errors::{AppError, FieldError, Result};
use axum::{
    extract::{ConnectInfo, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use uuid::Uuid;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutRequest {
    pub refresh_token: Option<String>,
}

/// Public-safe user projection. Never carries the credential digest.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub role_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<PermissionGrant>>,
}

impl PublicUser {
    fn new(user: &User, role: &Role) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: role.name.clone(),
            role_id: role.id,
            permissions: None,
        }
    }

    fn with_permissions(user: &User, role: &Role) -> Self {
        Self {
            permissions: Some(role.permissions.0.clone()),
            ..Self::new(user, role)
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub message: String,
    pub access_token: String,
    pub refresh_token: String,
    pub user: PublicUser,
}

/// Projection used by older clients of the refresh endpoint: the role comes
/// from the flat legacy tag, not the populated role object.
#[derive(Debug, Serialize)]
pub struct LegacyUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
    pub user: LegacyUser,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub message: String,
}

// ============================================================================
// Input validation
// ============================================================================

fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

fn validate_register(req: &RegisterRequest) -> Result<()> {
    let mut errors = Vec::new();

    let name = req.name.trim();
    if name.len() < 2 || name.len() > 50 {
        errors.push(FieldError::new(
            "name",
            "Name must be between 2 and 50 characters",
        ));
    }

    if !is_plausible_email(&req.email) {
        errors.push(FieldError::new("email", "Please provide a valid email"));
    }

    if req.password.len() < 6 {
        errors.push(FieldError::new(
            "password",
            "Password must be at least 6 characters",
        ));
    }

    if let Some(role) = &req.role {
        if !["citizen", "staff", "admin"].contains(&role.as_str()) {
            errors.push(FieldError::new(
                "role",
                "Role must be citizen, staff, or admin",
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

fn validate_login(req: &LoginRequest) -> Result<()> {
    let mut errors = Vec::new();

    if !is_plausible_email(&req.email) {
        errors.push(FieldError::new("email", "Please provide a valid email"));
    }

    if req.password.is_empty() {
        errors.push(FieldError::new("password", "Password is required"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/register
///
/// Create a user and log them straight in: a fresh session and both tokens
/// come back with the 201.
pub async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    addr: Option<ConnectInfo<SocketAddr>>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    validate_register(&req)?;

    if db::users::exists_by_email(&state.db_pool, &req.email).await? {
        return Err(AppError::DuplicateEmail);
    }

    let role_name = req.role.as_deref().unwrap_or("citizen");
    let role = roles::get_role_by_name(&state.db_pool, role_name)
        .await?
        .ok_or(AppError::InvalidRole)?;

    let password_hash = password::hash_password(&req.password)?;

    let user = db::users::create(
        &state.db_pool,
        req.name.trim(),
        &req.email,
        &password_hash,
        role.id,
        &role.name,
    )
    .await?;

    let device = DeviceInfo::from_request(&headers, addr.map(|ConnectInfo(a)| a));
    let tokens = session::create_session(
        &state.db_pool,
        &state.jwt,
        user.id,
        &device,
        state.auth.session_expiration_seconds,
    )
    .await?;

    tracing::info!("Registered user {} as {}", user.id, role.name);

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User registered successfully".to_string(),
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            user: PublicUser::new(&user, &role),
        }),
    ))
}

/// POST /auth/login
///
/// Validation ordering matters: user lookup, then the lockout check (before
/// any password comparison, re-evaluated against the clock on every attempt),
/// then the credential check.
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    addr: Option<ConnectInfo<SocketAddr>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    validate_login(&req)?;

    let user = db::users::get_active_by_email(&state.db_pool, &req.email)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if user.is_locked(Utc::now()) {
        tracing::warn!("Login attempt for locked account {}", user.id);
        return Err(AppError::AccountLocked);
    }

    if !password::verify_password(&req.password, &user.password_hash)? {
        db::users::record_failed_login(
            &state.db_pool,
            user.id,
            state.auth.max_login_attempts,
            state.auth.lockout_duration_seconds,
        )
        .await?;
        return Err(AppError::InvalidCredentials);
    }

    db::users::reset_login_attempts(&state.db_pool, user.id).await?;

    let role = db::roles::get_by_id(&state.db_pool, user.role_id)
        .await?
        .ok_or_else(|| AppError::Internal(format!("Role missing for user {}", user.id)))?;

    let device = DeviceInfo::from_request(&headers, addr.map(|ConnectInfo(a)| a));
    let tokens = session::create_session(
        &state.db_pool,
        &state.jwt,
        user.id,
        &device,
        state.auth.session_expiration_seconds,
    )
    .await?;

    tracing::info!("Successful login for user {}", user.id);

    Ok(Json(AuthResponse {
        message: "Login successful".to_string(),
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        user: PublicUser::with_permissions(&user, &role),
    }))
}

/// POST /auth/refresh
///
/// Exchange a live refresh token for a new access token. The refresh token
/// is not rotated.
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<RefreshResponse>> {
    let refresh_token = req
        .refresh_token
        .filter(|t| !t.is_empty())
        .ok_or(AppError::Unauthorized("Refresh token required."))?;

    let (access_token, user) =
        session::refresh_access_token(&state.db_pool, &state.jwt, &refresh_token).await?;

    Ok(Json(RefreshResponse {
        access_token,
        user: LegacyUser {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.legacy_role,
        },
    }))
}

/// POST /auth/logout
///
/// Idempotent: succeeds whether or not the supplied token matched anything.
pub async fn logout(
    State(state): State<AppState>,
    Json(req): Json<LogoutRequest>,
) -> Result<Json<LogoutResponse>> {
    if let Some(refresh_token) = req.refresh_token.filter(|t| !t.is_empty()) {
        db::sessions::revoke_by_token(&state.db_pool, &refresh_token).await?;
    }

    Ok(Json(LogoutResponse {
        message: "Logged out successfully".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register_request(role: Option<&str>) -> RegisterRequest {
        RegisterRequest {
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "secret123".to_string(),
            role: role.map(|r| r.to_string()),
        }
    }

    #[test]
    fn test_validate_register_accepts_good_input() {
        assert!(validate_register(&register_request(None)).is_ok());
        assert!(validate_register(&register_request(Some("staff"))).is_ok());
    }

    #[test]
    fn test_validate_register_rejects_bad_fields() {
        let mut req = register_request(Some("superuser"));
        req.name = "A".to_string();
        req.email = "not-an-email".to_string();
        req.password = "short".to_string();

        let err = validate_register(&req).unwrap_err();
        match err {
            AppError::Validation(errors) => {
                let fields: Vec<&str> = errors.iter().map(|e| e.field).collect();
                assert_eq!(fields, vec!["name", "email", "password", "role"]);
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_login() {
        let ok = LoginRequest {
            email: "alice@example.com".to_string(),
            password: "x".to_string(),
        };
        assert!(validate_login(&ok).is_ok());

        let bad = LoginRequest {
            email: "alice@example.com".to_string(),
            password: String::new(),
        };
        assert!(validate_login(&bad).is_err());
    }

    #[test]
    fn test_email_plausibility() {
        assert!(is_plausible_email("alice@example.com"));
        assert!(!is_plausible_email("alice"));
        assert!(!is_plausible_email("@example.com"));
        assert!(!is_plausible_email("alice@nodot"));
        assert!(!is_plausible_email("alice@.com"));
    }

    #[test]
    fn test_public_user_omits_digest_and_empty_permissions() {
        let now = Utc::now();
        let role = Role {
            id: Uuid::new_v4(),
            name: "citizen".to_string(),
            display_name: "Citizen".to_string(),
            description: "Resident".to_string(),
            hierarchy: 1,
            is_active: true,
            permissions: sqlx::types::Json(vec![]),
            created_at: now,
            updated_at: now,
        };
        let user = User {
            id: Uuid::new_v4(),
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            role_id: role.id,
            legacy_role: "citizen".to_string(),
            is_active: true,
            login_attempts: 0,
            lock_until: None,
            created_at: now,
            updated_at: now,
        };

        let value = serde_json::to_value(PublicUser::new(&user, &role)).unwrap();
        assert_eq!(value.get("role").unwrap(), "citizen");
        assert!(value.get("roleId").is_some());
        assert!(value.get("permissions").is_none());
        assert!(!value.to_string().contains("argon2id"));

        let with_perms = serde_json::to_value(PublicUser::with_permissions(&user, &role)).unwrap();
        assert!(with_perms.get("permissions").is_some());
    }
}
