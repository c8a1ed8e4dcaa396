use axum::extract::State;
use serde_json::{json, Value};
use tracing::info;

use crate::error::ApiError;
use crate::middleware::response::{not_found, parse_uuid, ApiResponse, ApiResult};
use crate::middleware::{AuthUser, Path};
use crate::state::AppState;

use super::access::SessionAccess;

/// DELETE /api/sessions/:id/cohosts/:user_id - remove a co-host
///
/// Allowed for the primary host, an event admin, or the co-host leaving.
pub async fn delete(
    user: AuthUser,
    State(state): State<AppState>,
    Path((session_id, cohost_id)): Path<(String, String)>,
) -> ApiResult<Value> {
    let session_id = parse_uuid(&session_id, "Session")?;
    let cohost_id = parse_uuid(&cohost_id, "User")?;

    let access = SessionAccess::load(state.store.as_ref(), session_id, user.user_id).await?;
    let is_self = cohost_id == user.user_id;
    if !(is_self || access.is_host() || access.is_admin()) {
        return Err(ApiError::forbidden("Not authorized to remove this co-host"));
    }

    if !state.store.remove_cohost(session_id, cohost_id).await? {
        return Err(not_found("Co-host"));
    }

    info!(
        "Removed co-host {} from session {} (by {})",
        cohost_id, session_id, user.user_id
    );
    Ok(ApiResponse::success(json!({
        "session_id": session_id,
        "user_id": cohost_id,
        "removed": true,
    })))
}
