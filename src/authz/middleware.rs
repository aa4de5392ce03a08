// Per-request authentication and the two authorization strategies.
//
// `authenticate` turns a bearer token into a principal on the request.
// Downstream, routes pick one strategy each: the legacy flat role-name check
// or the role-permission table check. Both stay supported; different
// endpoints historically used each.

use crate::{
    api::routes::AppState,
    authz::roles,
    db,
    db::schema::{Action, Resource, Role, User},
    errors::{AppError, Result},
};
use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

/// The authenticated principal attached to the request: the user plus its
/// resolved role. `user.legacy_role` feeds the legacy check; `role` feeds the
/// permission-table check.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    pub role: Role,
}

/// Pull the bearer token out of the Authorization header
fn bearer_token(headers: &HeaderMap) -> Result<&str> {
    let header = headers
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::Unauthorized("Access denied. No token provided."))?;

    header
        .strip_prefix("Bearer ")
        .ok_or(AppError::Unauthorized("Access denied. No token provided."))
}

/// Extract the principal set by `authenticate`
fn extract_current_user(request: &Request) -> Result<CurrentUser> {
    request
        .extensions()
        .get::<CurrentUser>()
        .cloned()
        .ok_or(AppError::Unauthorized(
            "Access denied. Please authenticate.",
        ))
}

/// Authentication middleware: verify the access token and attach the
/// principal. Runs before every protected handler.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let token = bearer_token(request.headers())?;

    // Signature and expiry; maps expired signatures to their own 401
    let claims = state.jwt.validate_access_token(token)?;

    // Refresh tokens are opaque strings and can never reach here, but a
    // forged signed token with the wrong type still gets rejected explicitly
    if !claims.is_access() {
        return Err(AppError::InvalidTokenType);
    }

    let user = db::users::get_active_by_id(&state.db_pool, claims.user_id)
        .await?
        .ok_or(AppError::Unauthorized("Invalid token or inactive user."))?;

    let role = db::roles::get_by_id(&state.db_pool, user.role_id)
        .await?
        .ok_or(AppError::Unauthorized("Invalid token or inactive user."))?;

    request.extensions_mut().insert(CurrentUser { user, role });

    Ok(next.run(request).await)
}

/// Legacy role-string authorization: the principal's flat role tag must be in
/// the allowed set. Coarse-grained; kept alongside the permission check.
pub struct RoleRequirement {
    allowed: &'static [&'static str],
}

impl RoleRequirement {
    pub fn new(allowed: &'static [&'static str]) -> Self {
        Self { allowed }
    }

    pub async fn check(self, request: Request, next: Next) -> Result<Response> {
        let current = extract_current_user(&request)?;

        if !self.allowed.contains(&current.user.legacy_role.as_str()) {
            tracing::warn!(
                user_id = %current.user.id,
                legacy_role = %current.user.legacy_role,
                "Role authorization denied"
            );
            return Err(AppError::Forbidden(
                "Access denied. Insufficient permissions.".to_string(),
            ));
        }

        Ok(next.run(request).await)
    }
}

/// Permission-table authorization: the principal's role must grant the
/// action on the resource. A storage failure surfaces as a 500, distinct
/// from a denial.
pub struct PermissionRequirement {
    resource: Resource,
    action: Action,
}

impl PermissionRequirement {
    pub fn new(resource: Resource, action: Action) -> Self {
        Self { resource, action }
    }

    pub async fn check(
        self,
        State(state): State<AppState>,
        request: Request,
        next: Next,
    ) -> Result<Response> {
        let current = extract_current_user(&request)?;

        let allowed =
            roles::has_permission(&state.db_pool, current.role.id, self.resource, self.action)
                .await?;

        if !allowed {
            tracing::warn!(
                user_id = %current.user.id,
                role = %current.role.name,
                resource = %self.resource.as_str(),
                action = %self.action.as_str(),
                "Permission denied"
            );
            return Err(AppError::Forbidden(format!(
                "Access denied. Missing permission: {} on {}",
                self.action.as_str(),
                self.resource.as_str()
            )));
        }

        Ok(next.run(request).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&headers).unwrap(), "abc.def");
    }

    #[test]
    fn test_missing_authorization_header() {
        let err = bearer_token(&HeaderMap::new()).unwrap_err();
        assert!(matches!(
            err,
            AppError::Unauthorized("Access denied. No token provided.")
        ));
    }

    #[test]
    fn test_non_bearer_scheme_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Basic dXNlcg=="));
        assert!(bearer_token(&headers).is_err());
    }

    #[test]
    fn test_forbidden_message_names_resource_and_action() {
        let requirement = PermissionRequirement::new(Resource::Complaints, Action::Assign);
        let message = format!(
            "Access denied. Missing permission: {} on {}",
            requirement.action.as_str(),
            requirement.resource.as_str()
        );
        assert_eq!(message, "Access denied. Missing permission: assign on complaints");
    }
}
