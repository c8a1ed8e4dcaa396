use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::error::ApiError;

/// Max-age for public read API responses
pub const PUBLIC_MAX_AGE_SECS: u32 = 60;

/// Caching directive attached to a successful response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// `public, max-age=N` for read-mostly collections
    Public(u32),
    /// `no-store` for session-scoped responses
    NoStore,
}

impl CachePolicy {
    fn header_value(&self) -> HeaderValue {
        match self {
            CachePolicy::Public(secs) => HeaderValue::from_str(&format!("public, max-age={}", secs))
                .unwrap_or_else(|_| HeaderValue::from_static("no-store")),
            CachePolicy::NoStore => HeaderValue::from_static("no-store"),
        }
    }
}

/// Wrapper for API responses that adds the `{data, count?}` envelope
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub count: Option<usize>,
    pub status_code: StatusCode,
    pub cache: CachePolicy,
}

impl<T: Serialize> ApiResponse<T> {
    /// Session-scoped 200 response, never cached
    pub fn success(data: T) -> Self {
        Self {
            data,
            count: None,
            status_code: StatusCode::OK,
            cache: CachePolicy::NoStore,
        }
    }

    /// Create a 201 Created response
    pub fn created(data: T) -> Self {
        Self {
            status_code: StatusCode::CREATED,
            ..Self::success(data)
        }
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    pub fn with_cache(mut self, cache: CachePolicy) -> Self {
        self.cache = cache;
        self
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let data_value = match serde_json::to_value(&self.data) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                return ApiError::internal_server_error("Failed to serialize response data")
                    .into_response();
            }
        };

        let mut envelope = Map::new();
        envelope.insert("data".into(), data_value);
        if let Some(count) = self.count {
            envelope.insert("count".into(), json!(count));
        }

        let mut response = (self.status_code, Json(Value::Object(envelope))).into_response();
        response
            .headers_mut()
            .insert(header::CACHE_CONTROL, self.cache.header_value());
        response
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, ApiError>;

/// `{data}` or `{data, count}` with the public read-API cache directive
pub fn api_success<T: Serialize>(data: T, count: Option<usize>) -> ApiResponse<T> {
    let response = ApiResponse::success(data).with_cache(CachePolicy::Public(PUBLIC_MAX_AGE_SECS));
    match count {
        Some(n) => response.with_count(n),
        None => response,
    }
}

/// `{error:{code,message}}` with an arbitrary status
pub fn api_error(status: StatusCode, code: &str, message: &str) -> Response {
    let mut response = (
        status,
        Json(json!({ "error": { "code": code, "message": message } })),
    )
        .into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

pub fn unauthorized() -> ApiError {
    ApiError::unauthorized("Invalid or missing API key")
}

pub fn bad_request(message: impl Into<String>) -> ApiError {
    ApiError::bad_request(message)
}

/// `"<Resource> not found"`
pub fn not_found(resource: &str) -> ApiError {
    ApiError::not_found(format!("{} not found", resource))
}

pub fn forbidden(message: impl Into<String>) -> ApiError {
    ApiError::forbidden(message)
}

pub fn internal(message: impl Into<String>) -> ApiError {
    ApiError::internal_server_error(message)
}

pub fn method_not_allowed() -> ApiError {
    ApiError::method_not_allowed("Method not allowed")
}

/// Strict 8-4-4-4-12 hexadecimal form
pub fn is_valid_uuid(value: &str) -> bool {
    const GROUPS: [usize; 5] = [8, 4, 4, 4, 12];

    let parts: Vec<&str> = value.split('-').collect();
    parts.len() == GROUPS.len()
        && parts
            .iter()
            .zip(GROUPS)
            .all(|(part, len)| part.len() == len && part.bytes().all(|b| b.is_ascii_hexdigit()))
}

/// Validate a path identifier before it reaches the store
pub fn parse_uuid(value: &str, resource: &str) -> Result<Uuid, ApiError> {
    if !is_valid_uuid(value) {
        return Err(bad_request(format!("Invalid {} ID format: {}", resource.to_lowercase(), value)));
    }
    Uuid::parse_str(value).map_err(|_| bad_request(format!("Invalid {} ID format: {}", resource.to_lowercase(), value)))
}
