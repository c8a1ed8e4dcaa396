use axum::extract::State;
use chrono::{DateTime, Duration, Utc};
use tracing::info;

use crate::auth::{generate_invite_token, token_fingerprint};
use crate::database::models::{Invite, InviteStatus, InviteView, NewInvite};
use crate::error::ApiError;
use crate::handlers::public::invites::check_token;
use crate::middleware::response::{bad_request, internal, not_found, parse_uuid, ApiResponse, ApiResult};
use crate::middleware::{AuthUser, Path};
use crate::state::AppState;

use super::access::SessionAccess;

/// 400 for anything but a live pending invite
fn require_pending(invite: &Invite) -> Result<(), ApiError> {
    match invite.effective_status(Utc::now()) {
        InviteStatus::Pending => Ok(()),
        InviteStatus::Expired => Err(bad_request("Invite has expired")),
        _ => Err(bad_request("Invite is no longer pending")),
    }
}

/// `now` plus the configured lifetime, or a 500 when that is not a representable instant
fn invite_expiry(now: DateTime<Utc>, days: i64) -> Result<DateTime<Utc>, ApiError> {
    Duration::try_days(days)
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .ok_or_else(|| internal("Invite expiry is out of range"))
}

async fn load_invite(state: &AppState, token: &str) -> Result<Invite, ApiError> {
    check_token(token)?;
    state
        .store
        .find_invite(token)
        .await?
        .ok_or_else(|| not_found("Invite"))
}

/// POST /api/invites/:token/accept - join a session as co-host
///
/// The status change and the co-host insert happen as one store step.
pub async fn accept(
    user: AuthUser,
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> ApiResult<InviteView> {
    let invite = load_invite(&state, &token).await?;

    let (session, already_cohost) = tokio::try_join!(
        state.store.find_session(invite.session_id),
        state.store.is_cohost(invite.session_id, user.user_id),
    )?;
    let session = session.ok_or_else(|| not_found("Session"))?;

    require_pending(&invite)?;
    if session.host_id == user.user_id {
        return Err(bad_request("The session host cannot accept a co-host invite"));
    }
    if already_cohost {
        return Err(ApiError::conflict("You are already a co-host of this session"));
    }

    let accepted = state
        .store
        .accept_invite(invite.id, user.user_id, Utc::now())
        .await?;

    info!(
        "Invite {} accepted by {} for session {}",
        token_fingerprint(&token),
        user.user_id,
        session.id
    );
    Ok(ApiResponse::success(
        InviteView::new(accepted, Utc::now()).with_session_title(session.title),
    ))
}

/// DELETE /api/invites/:token - revoke a pending invite
///
/// Allowed for the primary host, an event admin, or whoever sent the invite.
pub async fn revoke(
    user: AuthUser,
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> ApiResult<InviteView> {
    let invite = load_invite(&state, &token).await?;
    let access = SessionAccess::load(state.store.as_ref(), invite.session_id, user.user_id).await?;

    if !(invite.invited_by == user.user_id || access.is_host() || access.is_admin()) {
        return Err(ApiError::forbidden("Not authorized to revoke this invite"));
    }
    require_pending(&invite)?;

    let revoked = state
        .store
        .revoke_invite(invite.id)
        .await?
        .ok_or_else(|| bad_request("Invite is no longer pending"))?;

    info!("Invite {} revoked by {}", token_fingerprint(&token), user.user_id);
    Ok(ApiResponse::success(InviteView::new(revoked, Utc::now())))
}

/// POST /api/sessions/:id/invites - create a co-host invite
pub async fn create(
    user: AuthUser,
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<InviteView> {
    let session_id = parse_uuid(&session_id, "Session")?;
    let access = SessionAccess::load(state.store.as_ref(), session_id, user.user_id).await?;
    access.require_host_or_admin("Only the session host or an event admin can invite co-hosts")?;

    let token = generate_invite_token();
    let expires_at = invite_expiry(Utc::now(), state.config.invites.expiry_days)?;
    let invite = state
        .store
        .create_invite(NewInvite {
            session_id,
            token,
            invited_by: user.user_id,
            expires_at,
        })
        .await?;

    info!(
        "Invite {} created for session {} by {}",
        token_fingerprint(&invite.token),
        session_id,
        user.user_id
    );
    Ok(ApiResponse::created(
        InviteView::new(invite, Utc::now()).with_session_title(access.session.title),
    ))
}

/// GET /api/sessions/:id/invites - list a session's invites, newest first
pub async fn list(
    user: AuthUser,
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Vec<InviteView>> {
    let session_id = parse_uuid(&session_id, "Session")?;
    let access = SessionAccess::load(state.store.as_ref(), session_id, user.user_id).await?;
    access.require_host_or_admin("Only the session host or an event admin can view invites")?;

    let now = Utc::now();
    let invites: Vec<InviteView> = state
        .store
        .list_invites(session_id)
        .await?
        .into_iter()
        .map(|invite| InviteView::new(invite, now))
        .collect();

    let count = invites.len();
    Ok(ApiResponse::success(invites).with_count(count))
}
