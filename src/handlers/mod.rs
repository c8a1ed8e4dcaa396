//! Request handlers grouped by how callers authenticate:
//! public (none), v1 (`x-api-key`) and protected (bearer JWT).

pub mod protected;
pub mod public;
pub mod v1;

use crate::error::ApiError;
use crate::middleware::response;

/// Fallback for verbs a route does not serve
pub async fn method_not_allowed() -> ApiError {
    response::method_not_allowed()
}

/// Fallback for unknown paths
pub async fn route_not_found() -> ApiError {
    ApiError::not_found("Route not found")
}
