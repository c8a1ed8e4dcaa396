use axum::extract::State;
use serde_json::Value;

use crate::api::{parse_status_filter, resolve_includes, ListQuery, SessionInclude};
use crate::middleware::response::{api_success, not_found, parse_uuid, ApiResult};
use crate::middleware::{Path, Query};
use crate::state::AppState;

/// GET /api/v1/sessions - list sessions, most voted first
///
/// `?status=` defaults to the publicly visible statuses (approved, scheduled).
pub async fn list(State(state): State<AppState>, Query(query): Query<ListQuery>) -> ApiResult<Vec<Value>> {
    let statuses = parse_status_filter(query.status.as_deref())?;
    let includes = resolve_includes::<SessionInclude>(query.include.as_deref())?;

    let rows = state.store.list_sessions(&statuses, &includes).await?;
    let count = rows.len();
    Ok(api_success(rows, Some(count)))
}

/// GET /api/v1/sessions/:id - show single session regardless of status
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Value> {
    let id = parse_uuid(&id, "Session")?;
    let includes = resolve_includes::<SessionInclude>(query.include.as_deref())?;

    match state.store.get_session(id, &includes).await? {
        Some(row) => Ok(api_success(row, None)),
        None => Err(not_found("Session")),
    }
}
