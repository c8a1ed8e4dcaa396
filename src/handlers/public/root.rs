use axum::{extract::State, http::StatusCode};
use serde_json::{json, Value};

use crate::middleware::response::ApiResponse;
use crate::state::AppState;

/// GET / - service description
pub async fn root() -> ApiResponse<Value> {
    ApiResponse::success(json!({
        "name": "unconf-api",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/health (public)",
            "invites": "/api/invites/:token (public lookup; accept and revoke need a bearer token)",
            "session_invites": "/api/sessions/:id/invites (bearer)",
            "cohosts": "/api/sessions/:id/cohosts/:user_id (bearer)",
            "permissions": "/api/events/:event_id/permissions (bearer)",
            "read_api": "/api/v1/{profiles,sessions,tracks,venues,timeslots}[/:id] (x-api-key)",
        }
    }))
}

/// GET /health - liveness plus a store ping
pub async fn health(State(state): State<AppState>) -> ApiResponse<Value> {
    let now = chrono::Utc::now();

    match state.store.ping().await {
        Ok(()) => ApiResponse::success(json!({
            "status": "ok",
            "timestamp": now,
            "store": "ok",
        })),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            ApiResponse {
                status_code: StatusCode::SERVICE_UNAVAILABLE,
                ..ApiResponse::success(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "store": "unavailable",
                }))
            }
        }
    }
}
