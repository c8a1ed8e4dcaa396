use axum::extract::State;
use serde_json::Value;

use crate::api::{parse_day_filter, resolve_includes, ListQuery, TimeslotInclude};
use crate::middleware::response::{api_success, not_found, parse_uuid, ApiResult};
use crate::middleware::{Path, Query};
use crate::state::AppState;

/// GET /api/v1/timeslots - list timeslots chronologically
///
/// `?day=YYYY-MM-DD` keeps slots starting on that UTC date.
pub async fn list(State(state): State<AppState>, Query(query): Query<ListQuery>) -> ApiResult<Vec<Value>> {
    let day = parse_day_filter(query.day.as_deref())?;
    let includes = resolve_includes::<TimeslotInclude>(query.include.as_deref())?;

    let rows = state.store.list_timeslots(day, &includes).await?;
    let count = rows.len();
    Ok(api_success(rows, Some(count)))
}

/// GET /api/v1/timeslots/:id
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Value> {
    let id = parse_uuid(&id, "Timeslot")?;
    let includes = resolve_includes::<TimeslotInclude>(query.include.as_deref())?;

    state
        .store
        .get_timeslot(id, &includes)
        .await?
        .map(|row| api_success(row, None))
        .ok_or_else(|| not_found("Timeslot"))
}
