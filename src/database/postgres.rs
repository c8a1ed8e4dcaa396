use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{PgPool, Postgres, Row};
use uuid::Uuid;

use crate::api::includes::{
    ProfileInclude, SessionInclude, TimeslotInclude, TrackInclude, VenueInclude,
};
use crate::permissions::Role;

use super::models::{Invite, InviteStatus, NewInvite, Session, SessionStatus};
use super::store::{Store, StoreError, StoreResult};

const PROFILE_COLUMNS: &[&str] = &["id", "display_name", "avatar_url", "bio", "created_at"];
const PROFILE_SUMMARY_COLUMNS: &[&str] = &["id", "display_name", "avatar_url"];
const SESSION_COLUMNS: &[&str] = &[
    "id", "event_id", "title", "description", "format", "duration", "status",
    "total_votes", "host_id", "track_id", "venue_id", "timeslot_id", "created_at",
];
const TRACK_COLUMNS: &[&str] = &["id", "event_id", "name", "description", "color", "created_at"];
const VENUE_COLUMNS: &[&str] = &["id", "event_id", "name", "capacity", "features", "created_at"];
const TIMESLOT_COLUMNS: &[&str] = &["id", "venue_id", "label", "start_time", "end_time"];

const INVITE_SELECT: &str = "id, session_id, token, invited_by, status, expires_at, accepted_by, accepted_at, created_at";

/// `'col', alias.col` pairs for `json_build_object`
fn fields(alias: &str, columns: &[&str]) -> String {
    columns
        .iter()
        .map(|c| format!("'{c}', {alias}.{c}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn object(alias: &str, columns: &[&str]) -> String {
    format!("json_build_object({})", fields(alias, columns))
}

/// `('approved', 'scheduled')`, built from the enum, never from input
fn public_statuses() -> String {
    let list: Vec<String> = SessionStatus::PUBLIC
        .iter()
        .map(|s| format!("'{}'", s.as_str()))
        .collect();
    format!("({})", list.join(", "))
}

/// Sessions nested under a parent row, public statuses only
fn nested_sessions(parent_column: &str, parent: &str) -> String {
    format!(
        "COALESCE((SELECT json_agg({} ORDER BY ns.total_votes DESC, ns.created_at DESC) \
         FROM sessions ns WHERE ns.{parent_column} = {parent} AND ns.status IN {}), '[]'::json)",
        object("ns", SESSION_COLUMNS),
        public_statuses(),
    )
}

pub(crate) fn profile_include(include: ProfileInclude) -> String {
    match include {
        ProfileInclude::Sessions => format!("'sessions', {}", nested_sessions("host_id", "p.id")),
    }
}

pub(crate) fn session_include(include: SessionInclude) -> String {
    match include {
        SessionInclude::Host => format!(
            "'host', (SELECT {} FROM profiles h WHERE h.id = s.host_id)",
            object("h", PROFILE_SUMMARY_COLUMNS)
        ),
        SessionInclude::Track => format!(
            "'track', (SELECT {} FROM tracks t WHERE t.id = s.track_id)",
            object("t", TRACK_COLUMNS)
        ),
        SessionInclude::Venue => format!(
            "'venue', (SELECT {} FROM venues v WHERE v.id = s.venue_id)",
            object("v", VENUE_COLUMNS)
        ),
        SessionInclude::Timeslot => format!(
            "'timeslot', (SELECT {} FROM timeslots ts WHERE ts.id = s.timeslot_id)",
            object("ts", TIMESLOT_COLUMNS)
        ),
        SessionInclude::Cohosts => format!(
            "'cohosts', COALESCE((SELECT json_agg({} ORDER BY c.created_at) \
             FROM session_cohosts c JOIN profiles cp ON cp.id = c.user_id \
             WHERE c.session_id = s.id), '[]'::json)",
            object("cp", PROFILE_SUMMARY_COLUMNS)
        ),
    }
}

pub(crate) fn track_include(include: TrackInclude) -> String {
    match include {
        TrackInclude::Sessions => format!("'sessions', {}", nested_sessions("track_id", "t.id")),
    }
}

pub(crate) fn venue_include(include: VenueInclude) -> String {
    match include {
        VenueInclude::Timeslots => format!(
            "'timeslots', COALESCE((SELECT json_agg({} ORDER BY vts.start_time) \
             FROM timeslots vts WHERE vts.venue_id = v.id), '[]'::json)",
            object("vts", TIMESLOT_COLUMNS)
        ),
    }
}

pub(crate) fn timeslot_include(include: TimeslotInclude) -> String {
    match include {
        TimeslotInclude::Venue => format!(
            "'venue', (SELECT {} FROM venues v WHERE v.id = ts.venue_id)",
            object("v", VENUE_COLUMNS)
        ),
    }
}

/// `SELECT json_build_object(<base>, <includes>) AS row FROM <from> <tail>`
pub(crate) fn projection_sql(
    alias: &str,
    columns: &[&str],
    includes: impl IntoIterator<Item = String>,
    from: &str,
    tail: &str,
) -> String {
    let mut parts = vec![fields(alias, columns)];
    parts.extend(includes);
    format!(
        "SELECT json_build_object({}) AS row FROM {} {}",
        parts.join(", "),
        from,
        tail
    )
}

/// PostgreSQL-backed [`Store`]
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_rows(&self, query: Query<'_, Postgres, PgArguments>) -> StoreResult<Vec<Value>> {
        let rows = query.fetch_all(&self.pool).await?;
        rows.iter()
            .map(|row| row.try_get::<Value, _>("row").map_err(StoreError::from))
            .collect()
    }

    async fn fetch_row(&self, sql: &str, id: Uuid) -> StoreResult<Option<Value>> {
        let row = sqlx::query(sql).bind(id).fetch_optional(&self.pool).await?;
        row.map(|r| r.try_get::<Value, _>("row").map_err(StoreError::from))
            .transpose()
    }
}

fn session_from_row(row: &PgRow) -> StoreResult<Session> {
    let status: String = row.try_get("status")?;
    Ok(Session {
        id: row.try_get("id")?,
        event_id: row.try_get("event_id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        format: row.try_get("format")?,
        duration: row.try_get("duration")?,
        status: status
            .parse::<SessionStatus>()
            .map_err(|s| StoreError::Decode(format!("Unknown session status: {}", s)))?,
        total_votes: row.try_get("total_votes")?,
        host_id: row.try_get("host_id")?,
        track_id: row.try_get("track_id")?,
        venue_id: row.try_get("venue_id")?,
        timeslot_id: row.try_get("timeslot_id")?,
        created_at: row.try_get("created_at")?,
    })
}

fn invite_from_row(row: &PgRow) -> StoreResult<Invite> {
    let status: String = row.try_get("status")?;
    Ok(Invite {
        id: row.try_get("id")?,
        session_id: row.try_get("session_id")?,
        token: row.try_get("token")?,
        invited_by: row.try_get("invited_by")?,
        status: status
            .parse::<InviteStatus>()
            .map_err(|s| StoreError::Decode(format!("Unknown invite status: {}", s)))?,
        expires_at: row.try_get("expires_at")?,
        accepted_by: row.try_get("accepted_by")?,
        accepted_at: row.try_get("accepted_at")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn list_profiles(&self, includes: &[ProfileInclude]) -> StoreResult<Vec<Value>> {
        let sql = projection_sql(
            "p",
            PROFILE_COLUMNS,
            includes.iter().map(|i| profile_include(*i)),
            "profiles p",
            "ORDER BY p.display_name ASC",
        );
        self.fetch_rows(sqlx::query(&sql)).await
    }

    async fn get_profile(&self, id: Uuid, includes: &[ProfileInclude]) -> StoreResult<Option<Value>> {
        let sql = projection_sql(
            "p",
            PROFILE_COLUMNS,
            includes.iter().map(|i| profile_include(*i)),
            "profiles p",
            "WHERE p.id = $1",
        );
        self.fetch_row(&sql, id).await
    }

    async fn list_sessions(
        &self,
        statuses: &[SessionStatus],
        includes: &[SessionInclude],
    ) -> StoreResult<Vec<Value>> {
        let sql = projection_sql(
            "s",
            SESSION_COLUMNS,
            includes.iter().map(|i| session_include(*i)),
            "sessions s",
            "WHERE s.status = ANY($1) ORDER BY s.total_votes DESC, s.created_at DESC",
        );
        let statuses: Vec<String> = statuses.iter().map(|s| s.as_str().to_string()).collect();
        self.fetch_rows(sqlx::query(&sql).bind(statuses)).await
    }

    async fn get_session(&self, id: Uuid, includes: &[SessionInclude]) -> StoreResult<Option<Value>> {
        let sql = projection_sql(
            "s",
            SESSION_COLUMNS,
            includes.iter().map(|i| session_include(*i)),
            "sessions s",
            "WHERE s.id = $1",
        );
        self.fetch_row(&sql, id).await
    }

    async fn list_tracks(&self, includes: &[TrackInclude]) -> StoreResult<Vec<Value>> {
        let sql = projection_sql(
            "t",
            TRACK_COLUMNS,
            includes.iter().map(|i| track_include(*i)),
            "tracks t",
            "ORDER BY t.name ASC",
        );
        self.fetch_rows(sqlx::query(&sql)).await
    }

    async fn get_track(&self, id: Uuid, includes: &[TrackInclude]) -> StoreResult<Option<Value>> {
        let sql = projection_sql(
            "t",
            TRACK_COLUMNS,
            includes.iter().map(|i| track_include(*i)),
            "tracks t",
            "WHERE t.id = $1",
        );
        self.fetch_row(&sql, id).await
    }

    async fn list_venues(&self, includes: &[VenueInclude]) -> StoreResult<Vec<Value>> {
        let sql = projection_sql(
            "v",
            VENUE_COLUMNS,
            includes.iter().map(|i| venue_include(*i)),
            "venues v",
            "ORDER BY v.name ASC",
        );
        self.fetch_rows(sqlx::query(&sql)).await
    }

    async fn get_venue(&self, id: Uuid, includes: &[VenueInclude]) -> StoreResult<Option<Value>> {
        let sql = projection_sql(
            "v",
            VENUE_COLUMNS,
            includes.iter().map(|i| venue_include(*i)),
            "venues v",
            "WHERE v.id = $1",
        );
        self.fetch_row(&sql, id).await
    }

    async fn list_timeslots(
        &self,
        day: Option<NaiveDate>,
        includes: &[TimeslotInclude],
    ) -> StoreResult<Vec<Value>> {
        let sql = projection_sql(
            "ts",
            TIMESLOT_COLUMNS,
            includes.iter().map(|i| timeslot_include(*i)),
            "timeslots ts",
            "WHERE ($1::date IS NULL OR (ts.start_time AT TIME ZONE 'UTC')::date = $1) \
             ORDER BY ts.start_time ASC",
        );
        self.fetch_rows(sqlx::query(&sql).bind(day)).await
    }

    async fn get_timeslot(&self, id: Uuid, includes: &[TimeslotInclude]) -> StoreResult<Option<Value>> {
        let sql = projection_sql(
            "ts",
            TIMESLOT_COLUMNS,
            includes.iter().map(|i| timeslot_include(*i)),
            "timeslots ts",
            "WHERE ts.id = $1",
        );
        self.fetch_row(&sql, id).await
    }

    async fn find_session(&self, id: Uuid) -> StoreResult<Option<Session>> {
        let sql = format!("SELECT {} FROM sessions WHERE id = $1", SESSION_COLUMNS.join(", "));
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.as_ref().map(session_from_row).transpose()
    }

    async fn member_role(&self, event_id: Uuid, user_id: Uuid) -> StoreResult<Option<Role>> {
        let row = sqlx::query("SELECT role FROM event_roles WHERE event_id = $1 AND user_id = $2")
            .bind(event_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(r) => {
                let role: String = r.try_get("role")?;
                role.parse::<Role>()
                    .map(Some)
                    .map_err(|e| StoreError::Decode(e.to_string()))
            }
            None => Ok(None),
        }
    }

    async fn is_cohost(&self, session_id: Uuid, user_id: Uuid) -> StoreResult<bool> {
        let row = sqlx::query(
            "SELECT EXISTS(SELECT 1 FROM session_cohosts WHERE session_id = $1 AND user_id = $2) AS present",
        )
        .bind(session_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.try_get("present")?)
    }

    async fn remove_cohost(&self, session_id: Uuid, user_id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM session_cohosts WHERE session_id = $1 AND user_id = $2")
            .bind(session_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_invite(&self, token: &str) -> StoreResult<Option<Invite>> {
        let sql = format!("SELECT {} FROM session_invites WHERE token = $1", INVITE_SELECT);
        let row = sqlx::query(&sql).bind(token).fetch_optional(&self.pool).await?;
        row.as_ref().map(invite_from_row).transpose()
    }

    async fn list_invites(&self, session_id: Uuid) -> StoreResult<Vec<Invite>> {
        let sql = format!(
            "SELECT {} FROM session_invites WHERE session_id = $1 ORDER BY created_at DESC",
            INVITE_SELECT
        );
        let rows = sqlx::query(&sql).bind(session_id).fetch_all(&self.pool).await?;
        rows.iter().map(invite_from_row).collect()
    }

    async fn create_invite(&self, invite: NewInvite) -> StoreResult<Invite> {
        let sql = format!(
            "INSERT INTO session_invites (id, session_id, token, invited_by, status, expires_at, created_at) \
             VALUES ($1, $2, $3, $4, 'pending', $5, now()) RETURNING {}",
            INVITE_SELECT
        );
        let row = sqlx::query(&sql)
            .bind(Uuid::new_v4())
            .bind(invite.session_id)
            .bind(&invite.token)
            .bind(invite.invited_by)
            .bind(invite.expires_at)
            .fetch_one(&self.pool)
            .await?;
        invite_from_row(&row)
    }

    async fn revoke_invite(&self, invite_id: Uuid) -> StoreResult<Option<Invite>> {
        let sql = format!(
            "UPDATE session_invites SET status = 'revoked' WHERE id = $1 AND status = 'pending' RETURNING {}",
            INVITE_SELECT
        );
        let row = sqlx::query(&sql).bind(invite_id).fetch_optional(&self.pool).await?;
        row.as_ref().map(invite_from_row).transpose()
    }

    async fn accept_invite(
        &self,
        invite_id: Uuid,
        user_id: Uuid,
        at: DateTime<Utc>,
    ) -> StoreResult<Invite> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "UPDATE session_invites SET status = 'accepted', accepted_by = $2, accepted_at = $3 \
             WHERE id = $1 AND status = 'pending' AND expires_at > $3 RETURNING {}",
            INVITE_SELECT
        );
        let Some(row) = sqlx::query(&sql)
            .bind(invite_id)
            .bind(user_id)
            .bind(at)
            .fetch_optional(&mut *tx)
            .await?
        else {
            tx.rollback().await?;
            return Err(StoreError::Conflict("Invite is no longer pending".into()));
        };
        let invite = invite_from_row(&row)?;

        let inserted = sqlx::query(
            "INSERT INTO session_cohosts (session_id, user_id, created_at) VALUES ($1, $2, $3) \
             ON CONFLICT (session_id, user_id) DO NOTHING",
        )
        .bind(invite.session_id)
        .bind(user_id)
        .bind(at)
        .execute(&mut *tx)
        .await?;

        if inserted.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(StoreError::Conflict("You are already a co-host of this session".into()));
        }

        tx.commit().await?;
        Ok(invite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projection_attaches_only_requested_includes() {
        let sql = projection_sql(
            "s",
            SESSION_COLUMNS,
            [SessionInclude::Host].into_iter().map(session_include),
            "sessions s",
            "WHERE s.id = $1",
        );
        assert!(sql.starts_with("SELECT json_build_object('id', s.id, 'event_id', s.event_id"));
        assert!(sql.contains("'host', (SELECT json_build_object('id', h.id"));
        assert!(!sql.contains("'cohosts'"));
        assert!(sql.ends_with("FROM sessions s WHERE s.id = $1"));
    }

    #[test]
    fn nested_sessions_are_limited_to_public_statuses() {
        let sql = track_include(TrackInclude::Sessions);
        assert!(sql.contains("ns.track_id = t.id"));
        assert!(sql.contains("ns.status IN ('approved', 'scheduled')"));
    }

    #[test]
    fn every_include_has_a_fragment() {
        for name in <SessionInclude as crate::api::includes::Expansion>::VALID {
            let include = <SessionInclude as crate::api::includes::Expansion>::from_name(name).unwrap();
            assert!(session_include(include).starts_with(&format!("'{}', ", name)));
        }
        assert!(venue_include(VenueInclude::Timeslots).contains("vts.venue_id = v.id"));
        assert!(timeslot_include(TimeslotInclude::Venue).contains("v.id = ts.venue_id"));
        assert!(profile_include(ProfileInclude::Sessions).contains("ns.host_id = p.id"));
    }
}
