use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use subtle::ConstantTimeEq;
use tracing::debug;

use crate::config::ApiConfig;
use crate::state::AppState;

use super::response::unauthorized;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Compare the `x-api-key` header with the configured secret.
///
/// Never errors: absent header, unconfigured secret and length mismatch are
/// all plain `false`.
pub fn validate_api_key(headers: &HeaderMap, config: &ApiConfig) -> bool {
    let Some(expected) = config.secret_key.as_deref().filter(|s| !s.is_empty()) else {
        return false;
    };
    let Some(provided) = headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok()) else {
        return false;
    };

    // ct_eq on unequal lengths returns early, so reject those explicitly first
    if provided.len() != expected.len() {
        return false;
    }
    provided.as_bytes().ct_eq(expected.as_bytes()).into()
}

/// Route layer for the versioned read API
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if !validate_api_key(request.headers(), &state.config.api) {
        debug!("Rejected read API request to {}", request.uri().path());
        return unauthorized().into_response();
    }
    next.run(request).await
}
