pub mod api_key;
pub mod auth;
pub mod extract;
pub mod response;

pub use api_key::{require_api_key, validate_api_key, API_KEY_HEADER};
pub use auth::{extract_bearer_token, AuthUser};
pub use extract::{Path, Query};
pub use response::{api_error, api_success, ApiResponse, ApiResult, CachePolicy};
