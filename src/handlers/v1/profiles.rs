use axum::extract::State;
use serde_json::Value;

use crate::api::{resolve_includes, ListQuery, ProfileInclude};
use crate::middleware::response::{api_success, not_found, parse_uuid, ApiResult};
use crate::middleware::{Path, Query};
use crate::state::AppState;

/// GET /api/v1/profiles - list profiles by display name
pub async fn list(State(state): State<AppState>, Query(query): Query<ListQuery>) -> ApiResult<Vec<Value>> {
    let includes = resolve_includes::<ProfileInclude>(query.include.as_deref())?;
    let rows = state.store.list_profiles(&includes).await?;
    let count = rows.len();
    Ok(api_success(rows, Some(count)))
}

/// GET /api/v1/profiles/:id - show single profile
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Value> {
    let id = parse_uuid(&id, "Profile")?;
    let includes = resolve_includes::<ProfileInclude>(query.include.as_deref())?;

    match state.store.get_profile(id, &includes).await? {
        Some(row) => Ok(api_success(row, None)),
        None => Err(not_found("Profile")),
    }
}
