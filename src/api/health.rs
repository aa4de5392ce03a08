// Health endpoints

use crate::api::routes::AppState;
use crate::db;
use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

/// GET /health/live — process is up
pub async fn liveness() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// GET /health/ready — process can reach its database
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match db::health_check(&state.db_pool).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ready" }))),
        Err(e) => {
            tracing::error!("Readiness check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable" })),
            )
        }
    }
}
