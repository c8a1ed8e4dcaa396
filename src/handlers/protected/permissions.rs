use axum::extract::State;
use serde::Serialize;
use uuid::Uuid;

use crate::middleware::response::{not_found, parse_uuid, ApiResponse, ApiResult};
use crate::middleware::{AuthUser, Path};
use crate::permissions::{get_permissions_for_role, Permission, Role};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct EventPermissions {
    pub event_id: Uuid,
    pub role: Role,
    pub label: &'static str,
    pub permissions: Vec<Permission>,
}

/// GET /api/events/:event_id/permissions - what the caller may do in an event
pub async fn get(
    user: AuthUser,
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> ApiResult<EventPermissions> {
    let event_id = parse_uuid(&event_id, "Event")?;

    let role = state
        .store
        .member_role(event_id, user.user_id)
        .await?
        .ok_or_else(|| not_found("Event role"))?;

    Ok(ApiResponse::success(EventPermissions {
        event_id,
        role,
        label: role.label(),
        permissions: get_permissions_for_role(role),
    }))
}
