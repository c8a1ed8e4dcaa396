use axum::extract::State;
use chrono::Utc;

use crate::auth::is_invite_token;
use crate::database::models::InviteView;
use crate::error::ApiError;
use crate::middleware::response::{bad_request, not_found, ApiResponse, ApiResult};
use crate::middleware::Path;
use crate::state::AppState;

/// Reject anything that is not a 64-character hex token before touching the store
pub fn check_token(token: &str) -> Result<(), ApiError> {
    if is_invite_token(token) {
        Ok(())
    } else {
        Err(bad_request("Invalid invite token format"))
    }
}

/// GET /api/invites/:token - look up an invite by its opaque token
///
/// Public: the token itself is the credential. Status is reported as
/// `expired` once a pending invite passes its expiry.
pub async fn get(State(state): State<AppState>, Path(token): Path<String>) -> ApiResult<InviteView> {
    check_token(&token)?;

    let invite = state
        .store
        .find_invite(&token)
        .await?
        .ok_or_else(|| not_found("Invite"))?;

    let title = state
        .store
        .find_session(invite.session_id)
        .await?
        .map(|session| session.title);

    let mut view = InviteView::new(invite, Utc::now());
    if let Some(title) = title {
        view = view.with_session_title(title);
    }
    Ok(ApiResponse::success(view))
}
