use axum::extract::State;
use serde_json::Value;

use crate::api::{resolve_includes, ListQuery, VenueInclude};
use crate::middleware::response::{api_success, not_found, parse_uuid, ApiResult};
use crate::middleware::{Path, Query};
use crate::state::AppState;

/// GET /api/v1/venues - list venues by name
pub async fn list(State(state): State<AppState>, Query(query): Query<ListQuery>) -> ApiResult<Vec<Value>> {
    let includes = resolve_includes::<VenueInclude>(query.include.as_deref())?;
    let rows = state.store.list_venues(&includes).await?;
    let count = rows.len();
    Ok(api_success(rows, Some(count)))
}

/// GET /api/v1/venues/:id
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Value> {
    let id = parse_uuid(&id, "Venue")?;
    let includes = resolve_includes::<VenueInclude>(query.include.as_deref())?;

    state
        .store
        .get_venue(id, &includes)
        .await?
        .map(|row| api_success(row, None))
        .ok_or_else(|| not_found("Venue"))
}
