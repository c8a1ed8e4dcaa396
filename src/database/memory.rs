use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::api::includes::{
    ProfileInclude, SessionInclude, TimeslotInclude, TrackInclude, VenueInclude,
};
use crate::permissions::Role;

use super::models::{
    Cohost, EventRole, Invite, InviteStatus, NewInvite, Profile, ProfileSummary, Session,
    SessionStatus, Timeslot, Track, Venue,
};
use super::store::{Store, StoreError, StoreResult};

/// Every table the API touches, as plain rows
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryData {
    pub profiles: Vec<Profile>,
    pub sessions: Vec<Session>,
    pub tracks: Vec<Track>,
    pub venues: Vec<Venue>,
    pub timeslots: Vec<Timeslot>,
    pub cohosts: Vec<Cohost>,
    pub invites: Vec<Invite>,
    pub event_roles: Vec<EventRole>,
}

/// Process-local [`Store`] for demos and tests. Same ordering and include
/// semantics as the PostgreSQL store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<MemoryData>,
}

impl MemoryStore {
    pub fn new(data: MemoryData) -> Self {
        Self { data: RwLock::new(data) }
    }

    /// Load rows from a JSON document shaped like [`MemoryData`]
    pub fn from_json_file(path: &str) -> Result<Self, StoreError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| StoreError::Unavailable(format!("Failed to read {}: {}", path, e)))?;
        let data: MemoryData = serde_json::from_str(&raw)
            .map_err(|e| StoreError::Decode(format!("Invalid seed file {}: {}", path, e)))?;
        Ok(Self::new(data))
    }

    pub async fn snapshot(&self) -> MemoryData {
        self.data.read().await.clone()
    }
}

fn to_value<T: Serialize>(row: &T) -> StoreResult<Value> {
    serde_json::to_value(row).map_err(|e| StoreError::Decode(e.to_string()))
}

fn attach(mut base: Value, key: &str, value: Value) -> Value {
    if let Value::Object(map) = &mut base {
        map.insert(key.to_string(), value);
    }
    base
}

/// Sessions ordered by descending votes, newest first on ties
fn sort_sessions(sessions: &mut [&Session]) {
    sessions.sort_by(|a, b| {
        b.total_votes
            .cmp(&a.total_votes)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
}

fn public_sessions<'a>(data: &'a MemoryData, pred: impl Fn(&Session) -> bool) -> Vec<&'a Session> {
    let mut out: Vec<&Session> = data
        .sessions
        .iter()
        .filter(|s| s.status.is_public() && pred(s))
        .collect();
    sort_sessions(&mut out);
    out
}

fn values<'a, T: Serialize + 'a>(rows: impl IntoIterator<Item = &'a T>) -> StoreResult<Value> {
    rows.into_iter()
        .map(to_value)
        .collect::<StoreResult<Vec<_>>>()
        .map(Value::Array)
}

fn optional<T: Serialize>(row: Option<&T>) -> StoreResult<Value> {
    match row {
        Some(r) => to_value(r),
        None => Ok(Value::Null),
    }
}

impl MemoryData {
    fn profile(&self, id: Uuid) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.id == id)
    }

    fn summary(&self, id: Uuid) -> Option<ProfileSummary> {
        self.profile(id).map(ProfileSummary::from)
    }

    fn venue(&self, id: Uuid) -> Option<&Venue> {
        self.venues.iter().find(|v| v.id == id)
    }

    fn expand_profile(&self, profile: &Profile, includes: &[ProfileInclude]) -> StoreResult<Value> {
        let mut out = to_value(profile)?;
        for include in includes {
            match include {
                ProfileInclude::Sessions => {
                    let hosted = public_sessions(self, |s| s.host_id == profile.id);
                    out = attach(out, "sessions", values(hosted)?);
                }
            }
        }
        Ok(out)
    }

    fn expand_session(&self, session: &Session, includes: &[SessionInclude]) -> StoreResult<Value> {
        let mut out = to_value(session)?;
        for include in includes {
            let (key, value) = match include {
                SessionInclude::Host => ("host", optional(self.summary(session.host_id).as_ref())?),
                SessionInclude::Track => (
                    "track",
                    optional(session.track_id.and_then(|id| self.tracks.iter().find(|t| t.id == id)))?,
                ),
                SessionInclude::Venue => ("venue", optional(session.venue_id.and_then(|id| self.venue(id)))?),
                SessionInclude::Timeslot => (
                    "timeslot",
                    optional(session.timeslot_id.and_then(|id| self.timeslots.iter().find(|t| t.id == id)))?,
                ),
                SessionInclude::Cohosts => {
                    let mut rows: Vec<&Cohost> = self
                        .cohosts
                        .iter()
                        .filter(|c| c.session_id == session.id)
                        .collect();
                    rows.sort_by_key(|c| c.created_at);
                    let summaries: Vec<ProfileSummary> =
                        rows.iter().filter_map(|c| self.summary(c.user_id)).collect();
                    ("cohosts", values(summaries.iter())?)
                }
            };
            out = attach(out, key, value);
        }
        Ok(out)
    }

    fn expand_track(&self, track: &Track, includes: &[TrackInclude]) -> StoreResult<Value> {
        let mut out = to_value(track)?;
        for include in includes {
            match include {
                TrackInclude::Sessions => {
                    let sessions = public_sessions(self, |s| s.track_id == Some(track.id));
                    out = attach(out, "sessions", values(sessions)?);
                }
            }
        }
        Ok(out)
    }

    fn expand_venue(&self, venue: &Venue, includes: &[VenueInclude]) -> StoreResult<Value> {
        let mut out = to_value(venue)?;
        for include in includes {
            match include {
                VenueInclude::Timeslots => {
                    let mut slots: Vec<&Timeslot> =
                        self.timeslots.iter().filter(|t| t.venue_id == venue.id).collect();
                    slots.sort_by_key(|t| t.start_time);
                    out = attach(out, "timeslots", values(slots)?);
                }
            }
        }
        Ok(out)
    }

    fn expand_timeslot(&self, slot: &Timeslot, includes: &[TimeslotInclude]) -> StoreResult<Value> {
        let mut out = to_value(slot)?;
        for include in includes {
            match include {
                TimeslotInclude::Venue => {
                    out = attach(out, "venue", optional(self.venue(slot.venue_id))?);
                }
            }
        }
        Ok(out)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn list_profiles(&self, includes: &[ProfileInclude]) -> StoreResult<Vec<Value>> {
        let data = self.data.read().await;
        let mut rows: Vec<&Profile> = data.profiles.iter().collect();
        rows.sort_by(|a, b| a.display_name.cmp(&b.display_name));
        rows.into_iter().map(|p| data.expand_profile(p, includes)).collect()
    }

    async fn get_profile(&self, id: Uuid, includes: &[ProfileInclude]) -> StoreResult<Option<Value>> {
        let data = self.data.read().await;
        data.profile(id).map(|p| data.expand_profile(p, includes)).transpose()
    }

    async fn list_sessions(
        &self,
        statuses: &[SessionStatus],
        includes: &[SessionInclude],
    ) -> StoreResult<Vec<Value>> {
        let data = self.data.read().await;
        let mut rows: Vec<&Session> = data
            .sessions
            .iter()
            .filter(|s| statuses.contains(&s.status))
            .collect();
        sort_sessions(&mut rows);
        rows.into_iter().map(|s| data.expand_session(s, includes)).collect()
    }

    async fn get_session(&self, id: Uuid, includes: &[SessionInclude]) -> StoreResult<Option<Value>> {
        let data = self.data.read().await;
        data.sessions
            .iter()
            .find(|s| s.id == id)
            .map(|s| data.expand_session(s, includes))
            .transpose()
    }

    async fn list_tracks(&self, includes: &[TrackInclude]) -> StoreResult<Vec<Value>> {
        let data = self.data.read().await;
        let mut rows: Vec<&Track> = data.tracks.iter().collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        rows.into_iter().map(|t| data.expand_track(t, includes)).collect()
    }

    async fn get_track(&self, id: Uuid, includes: &[TrackInclude]) -> StoreResult<Option<Value>> {
        let data = self.data.read().await;
        data.tracks
            .iter()
            .find(|t| t.id == id)
            .map(|t| data.expand_track(t, includes))
            .transpose()
    }

    async fn list_venues(&self, includes: &[VenueInclude]) -> StoreResult<Vec<Value>> {
        let data = self.data.read().await;
        let mut rows: Vec<&Venue> = data.venues.iter().collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        rows.into_iter().map(|v| data.expand_venue(v, includes)).collect()
    }

    async fn get_venue(&self, id: Uuid, includes: &[VenueInclude]) -> StoreResult<Option<Value>> {
        let data = self.data.read().await;
        data.venue(id).map(|v| data.expand_venue(v, includes)).transpose()
    }

    async fn list_timeslots(
        &self,
        day: Option<NaiveDate>,
        includes: &[TimeslotInclude],
    ) -> StoreResult<Vec<Value>> {
        let data = self.data.read().await;
        let mut rows: Vec<&Timeslot> = data
            .timeslots
            .iter()
            .filter(|t| day.map_or(true, |d| t.start_time.date_naive() == d))
            .collect();
        rows.sort_by_key(|t| t.start_time);
        rows.into_iter().map(|t| data.expand_timeslot(t, includes)).collect()
    }

    async fn get_timeslot(&self, id: Uuid, includes: &[TimeslotInclude]) -> StoreResult<Option<Value>> {
        let data = self.data.read().await;
        data.timeslots
            .iter()
            .find(|t| t.id == id)
            .map(|t| data.expand_timeslot(t, includes))
            .transpose()
    }

    async fn find_session(&self, id: Uuid) -> StoreResult<Option<Session>> {
        let data = self.data.read().await;
        Ok(data.sessions.iter().find(|s| s.id == id).cloned())
    }

    async fn member_role(&self, event_id: Uuid, user_id: Uuid) -> StoreResult<Option<Role>> {
        let data = self.data.read().await;
        Ok(data
            .event_roles
            .iter()
            .find(|r| r.event_id == event_id && r.user_id == user_id)
            .map(|r| r.role))
    }

    async fn is_cohost(&self, session_id: Uuid, user_id: Uuid) -> StoreResult<bool> {
        let data = self.data.read().await;
        Ok(data
            .cohosts
            .iter()
            .any(|c| c.session_id == session_id && c.user_id == user_id))
    }

    async fn remove_cohost(&self, session_id: Uuid, user_id: Uuid) -> StoreResult<bool> {
        let mut data = self.data.write().await;
        let before = data.cohosts.len();
        data.cohosts
            .retain(|c| !(c.session_id == session_id && c.user_id == user_id));
        Ok(data.cohosts.len() < before)
    }

    async fn find_invite(&self, token: &str) -> StoreResult<Option<Invite>> {
        let data = self.data.read().await;
        Ok(data.invites.iter().find(|i| i.token == token).cloned())
    }

    async fn list_invites(&self, session_id: Uuid) -> StoreResult<Vec<Invite>> {
        let data = self.data.read().await;
        let mut rows: Vec<Invite> = data
            .invites
            .iter()
            .filter(|i| i.session_id == session_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn create_invite(&self, invite: NewInvite) -> StoreResult<Invite> {
        let mut data = self.data.write().await;
        if data.invites.iter().any(|i| i.token == invite.token) {
            return Err(StoreError::Query(
                "duplicate key value violates unique constraint \"session_invites_token_key\"".into(),
            ));
        }
        let row = Invite {
            id: Uuid::new_v4(),
            session_id: invite.session_id,
            token: invite.token,
            invited_by: invite.invited_by,
            status: InviteStatus::Pending,
            expires_at: invite.expires_at,
            accepted_by: None,
            accepted_at: None,
            created_at: Utc::now(),
        };
        data.invites.push(row.clone());
        Ok(row)
    }

    async fn revoke_invite(&self, invite_id: Uuid) -> StoreResult<Option<Invite>> {
        let mut data = self.data.write().await;
        Ok(data
            .invites
            .iter_mut()
            .find(|i| i.id == invite_id && i.status == InviteStatus::Pending)
            .map(|i| {
                i.status = InviteStatus::Revoked;
                i.clone()
            }))
    }

    async fn accept_invite(
        &self,
        invite_id: Uuid,
        user_id: Uuid,
        at: DateTime<Utc>,
    ) -> StoreResult<Invite> {
        // One write guard covers both steps
        let mut data = self.data.write().await;

        let idx = data
            .invites
            .iter()
            .position(|i| i.id == invite_id && i.effective_status(at) == InviteStatus::Pending)
            .ok_or_else(|| StoreError::Conflict("Invite is no longer pending".into()))?;
        let session_id = data.invites[idx].session_id;

        if data
            .cohosts
            .iter()
            .any(|c| c.session_id == session_id && c.user_id == user_id)
        {
            return Err(StoreError::Conflict("You are already a co-host of this session".into()));
        }

        let invite = &mut data.invites[idx];
        invite.status = InviteStatus::Accepted;
        invite.accepted_by = Some(user_id);
        invite.accepted_at = Some(at);
        let accepted = invite.clone();

        data.cohosts.push(Cohost { session_id, user_id, created_at: at });
        Ok(accepted)
    }
}
