use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::api::includes::{
    ProfileInclude, SessionInclude, TimeslotInclude, TrackInclude, VenueInclude,
};
use crate::permissions::Role;

use super::models::{Invite, NewInvite, Session, SessionStatus};

/// Errors from the relational store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Query(String),

    #[error("{0}")]
    Decode(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StoreError::Unavailable(err.to_string())
            }
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) | sqlx::Error::ColumnNotFound(_) => {
                StoreError::Decode(err.to_string())
            }
            sqlx::Error::Database(db) => StoreError::Query(db.message().to_string()),
            other => StoreError::Query(other.to_string()),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Read projections and session-scoped mutations against the event store.
///
/// Read methods return JSON projections with the requested includes already
/// attached, so the handlers stay free of join logic.
#[async_trait]
pub trait Store: Send + Sync {
    async fn ping(&self) -> StoreResult<()>;

    async fn list_profiles(&self, includes: &[ProfileInclude]) -> StoreResult<Vec<Value>>;
    async fn get_profile(&self, id: Uuid, includes: &[ProfileInclude]) -> StoreResult<Option<Value>>;

    /// Ordered by descending vote count
    async fn list_sessions(
        &self,
        statuses: &[SessionStatus],
        includes: &[SessionInclude],
    ) -> StoreResult<Vec<Value>>;
    async fn get_session(&self, id: Uuid, includes: &[SessionInclude]) -> StoreResult<Option<Value>>;

    async fn list_tracks(&self, includes: &[TrackInclude]) -> StoreResult<Vec<Value>>;
    async fn get_track(&self, id: Uuid, includes: &[TrackInclude]) -> StoreResult<Option<Value>>;

    async fn list_venues(&self, includes: &[VenueInclude]) -> StoreResult<Vec<Value>>;
    async fn get_venue(&self, id: Uuid, includes: &[VenueInclude]) -> StoreResult<Option<Value>>;

    /// `day` matches the UTC calendar date of `start_time`
    async fn list_timeslots(
        &self,
        day: Option<NaiveDate>,
        includes: &[TimeslotInclude],
    ) -> StoreResult<Vec<Value>>;
    async fn get_timeslot(&self, id: Uuid, includes: &[TimeslotInclude]) -> StoreResult<Option<Value>>;

    async fn find_session(&self, id: Uuid) -> StoreResult<Option<Session>>;
    async fn member_role(&self, event_id: Uuid, user_id: Uuid) -> StoreResult<Option<Role>>;

    async fn is_cohost(&self, session_id: Uuid, user_id: Uuid) -> StoreResult<bool>;
    /// Returns false when the pair did not exist
    async fn remove_cohost(&self, session_id: Uuid, user_id: Uuid) -> StoreResult<bool>;

    async fn find_invite(&self, token: &str) -> StoreResult<Option<Invite>>;
    async fn list_invites(&self, session_id: Uuid) -> StoreResult<Vec<Invite>>;
    async fn create_invite(&self, invite: NewInvite) -> StoreResult<Invite>;
    /// Only a pending invite transitions; `None` when it was no longer pending
    async fn revoke_invite(&self, invite_id: Uuid) -> StoreResult<Option<Invite>>;
    /// Marks the invite accepted and inserts the co-host as one atomic step.
    /// Fails with [`StoreError::Conflict`] if the invite stopped being pending
    /// or the user already co-hosts the session.
    async fn accept_invite(
        &self,
        invite_id: Uuid,
        user_id: Uuid,
        at: DateTime<Utc>,
    ) -> StoreResult<Invite>;
}
