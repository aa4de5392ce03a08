use crate::{
    api::{auth, health, roles as role_api, users},
    auth::jwt::JwtManager,
    authz::middleware::{authenticate, PermissionRequirement, RoleRequirement},
    config::AuthConfig,
    db::schema::{Action, Resource},
};
use axum::{
    extract::{Request, State},
    middleware::{self, Next},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub jwt: Arc<JwtManager>,
    pub auth: AuthConfig,
}

pub fn create_router(db_pool: PgPool, jwt: Arc<JwtManager>, auth: AuthConfig) -> Router {
    let state = AppState { db_pool, jwt, auth };

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Public authentication flows
    let auth_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/logout", post(auth::logout));

    // Legacy role-string strategy, admin only
    let admin_only = middleware::from_fn(|req: Request, next: Next| {
        RoleRequirement::new(&["admin"]).check(req, next)
    });

    // Permission-table strategy: system:read
    let system_read = middleware::from_fn_with_state(
        state.clone(),
        |state: State<AppState>, req: Request, next: Next| {
            PermissionRequirement::new(Resource::System, Action::Read).check(state, req, next)
        },
    );

    // Everything below runs behind `authenticate`; the route layers on top of
    // it pick one authorization strategy per endpoint
    let protected = Router::new()
        .route("/users/profile", get(users::get_profile))
        .route("/users", get(users::list_users).route_layer(admin_only))
        .route(
            "/roles",
            get(role_api::list_roles).route_layer(system_read.clone()),
        )
        .route(
            "/roles/:id",
            get(role_api::get_role).route_layer(system_read),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), authenticate));

    Router::new()
        .route(
            "/",
            get(|| async { Json(json!({ "message": "City CMS API is running!" })) }),
        )
        // Health endpoints
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .merge(auth_routes)
        .merge(protected)
        // Add middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Add state
        .with_state(state)
}
