//! Runs the PostgreSQL store against a live database.
//!
//! Ignored by default. Point `DATABASE_URL` at a scratch database and run
//! `cargo test --test 50_postgres -- --ignored`. Each test works inside its own
//! throwaway schema and drops it afterwards.

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, PgPool};
use uuid::Uuid;

use unconf_api::api::includes::TimeslotInclude;
use unconf_api::database::models::{NewInvite, SessionStatus};
use unconf_api::database::{PgStore, Store, StoreError};

const SCHEMA: &str = r#"
CREATE TABLE profiles (
    id uuid PRIMARY KEY,
    display_name text NOT NULL,
    avatar_url text,
    bio text,
    created_at timestamptz NOT NULL DEFAULT now()
);
CREATE TABLE tracks (
    id uuid PRIMARY KEY,
    event_id uuid NOT NULL,
    name text NOT NULL,
    description text,
    color text,
    created_at timestamptz NOT NULL DEFAULT now()
);
CREATE TABLE venues (
    id uuid PRIMARY KEY,
    event_id uuid NOT NULL,
    name text NOT NULL,
    capacity integer,
    features text[] NOT NULL DEFAULT '{}',
    created_at timestamptz NOT NULL DEFAULT now()
);
CREATE TABLE timeslots (
    id uuid PRIMARY KEY,
    venue_id uuid NOT NULL REFERENCES venues(id),
    label text,
    start_time timestamptz NOT NULL,
    end_time timestamptz NOT NULL
);
CREATE TABLE sessions (
    id uuid PRIMARY KEY,
    event_id uuid NOT NULL,
    title text NOT NULL,
    description text,
    format text NOT NULL,
    duration integer NOT NULL,
    status text NOT NULL,
    total_votes integer NOT NULL DEFAULT 0,
    host_id uuid NOT NULL REFERENCES profiles(id),
    track_id uuid REFERENCES tracks(id),
    venue_id uuid REFERENCES venues(id),
    timeslot_id uuid REFERENCES timeslots(id),
    created_at timestamptz NOT NULL DEFAULT now()
);
CREATE TABLE session_cohosts (
    session_id uuid NOT NULL REFERENCES sessions(id),
    user_id uuid NOT NULL REFERENCES profiles(id),
    created_at timestamptz NOT NULL DEFAULT now(),
    PRIMARY KEY (session_id, user_id)
);
CREATE TABLE session_invites (
    id uuid PRIMARY KEY,
    session_id uuid NOT NULL REFERENCES sessions(id),
    token text NOT NULL UNIQUE,
    invited_by uuid NOT NULL,
    status text NOT NULL,
    expires_at timestamptz NOT NULL,
    accepted_by uuid,
    accepted_at timestamptz,
    created_at timestamptz NOT NULL DEFAULT now()
);
CREATE TABLE event_roles (
    event_id uuid NOT NULL,
    user_id uuid NOT NULL,
    role text NOT NULL,
    PRIMARY KEY (event_id, user_id)
);
"#;

struct Scratch {
    pool: PgPool,
    schema: String,
    event: Uuid,
    host: Uuid,
    cohost: Uuid,
    guest: Uuid,
    session: Uuid,
    venue: Uuid,
}

impl Scratch {
    /// `None` when `DATABASE_URL` is unset
    async fn open() -> Result<Option<Self>> {
        let Ok(url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL not set, skipping");
            return Ok(None);
        };

        let schema = format!("unconf_test_{}", Uuid::new_v4().simple());
        let search_path = format!("SET search_path TO {}", schema);
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .after_connect(move |conn, _meta| {
                let search_path = search_path.clone();
                Box::pin(async move {
                    conn.execute(search_path.as_str()).await?;
                    Ok(())
                })
            })
            .connect(&url)
            .await
            .context("failed to connect to DATABASE_URL")?;

        pool.execute(format!("CREATE SCHEMA {}", schema).as_str()).await?;
        pool.execute(SCHEMA).await?;

        let scratch = Self {
            pool,
            schema,
            event: Uuid::new_v4(),
            host: Uuid::new_v4(),
            cohost: Uuid::new_v4(),
            guest: Uuid::new_v4(),
            session: Uuid::new_v4(),
            venue: Uuid::new_v4(),
        };
        scratch.seed().await?;
        Ok(Some(scratch))
    }

    async fn seed(&self) -> Result<()> {
        for (id, name) in [(self.host, "Ada"), (self.cohost, "Bob"), (self.guest, "Cy")] {
            sqlx::query("INSERT INTO profiles (id, display_name) VALUES ($1, $2)")
                .bind(id)
                .bind(name)
                .execute(&self.pool)
                .await?;
        }

        sqlx::query("INSERT INTO venues (id, event_id, name, features) VALUES ($1, $2, 'Main Hall', ARRAY['projector'])")
            .bind(self.venue)
            .bind(self.event)
            .execute(&self.pool)
            .await?;
        for (label, day) in [("Day 1 morning", 1), ("Day 2 morning", 2)] {
            sqlx::query(
                "INSERT INTO timeslots (id, venue_id, label, start_time, end_time) VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(Uuid::new_v4())
            .bind(self.venue)
            .bind(label)
            .bind(Utc.with_ymd_and_hms(2024, 6, day, 10, 0, 0).unwrap())
            .bind(Utc.with_ymd_and_hms(2024, 6, day, 11, 0, 0).unwrap())
            .execute(&self.pool)
            .await?;
        }

        let sessions = [
            (self.session, "Async Rust", "approved", 10),
            (Uuid::new_v4(), "Borrow checker clinic", "scheduled", 20),
            (Uuid::new_v4(), "Secret plans", "pending", 99),
        ];
        for (id, title, status, votes) in sessions {
            sqlx::query(
                "INSERT INTO sessions (id, event_id, title, format, duration, status, total_votes, host_id) \
                 VALUES ($1, $2, $3, 'discussion', 45, $4, $5, $6)",
            )
            .bind(id)
            .bind(self.event)
            .bind(title)
            .bind(status)
            .bind(votes)
            .bind(self.host)
            .execute(&self.pool)
            .await?;
        }

        sqlx::query("INSERT INTO session_cohosts (session_id, user_id) VALUES ($1, $2)")
            .bind(self.session)
            .bind(self.cohost)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    fn store(&self) -> PgStore {
        PgStore::new(self.pool.clone())
    }

    async fn invite(&self, token: &str) -> Result<Uuid> {
        let invite = self
            .store()
            .create_invite(NewInvite {
                session_id: self.session,
                token: token.to_string(),
                invited_by: self.host,
                expires_at: Utc::now() + Duration::days(7),
            })
            .await?;
        Ok(invite.id)
    }

    async fn teardown(self) -> Result<()> {
        self.pool
            .execute(format!("DROP SCHEMA {} CASCADE", self.schema).as_str())
            .await?;
        Ok(())
    }
}

#[tokio::test]
#[ignore]
async fn status_filter_binds_as_array() -> Result<()> {
    let Some(db) = Scratch::open().await? else { return Ok(()) };

    let rows = db
        .store()
        .list_sessions(&[SessionStatus::Approved, SessionStatus::Scheduled], &[])
        .await?;
    let titles: Vec<&str> = rows.iter().map(|r| r["title"].as_str().unwrap()).collect();
    assert_eq!(titles, vec!["Borrow checker clinic", "Async Rust"]);

    let rows = db.store().list_sessions(&[SessionStatus::Pending], &[]).await?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["total_votes"], 99);

    db.teardown().await
}

#[tokio::test]
#[ignore]
async fn day_filter_matches_utc_date() -> Result<()> {
    let Some(db) = Scratch::open().await? else { return Ok(()) };

    let all = db.store().list_timeslots(None, &[]).await?;
    assert_eq!(all.len(), 2);
    assert_eq!(all[0]["label"], "Day 1 morning");

    let day = NaiveDate::from_ymd_opt(2024, 6, 2).unwrap();
    let rows = db
        .store()
        .list_timeslots(Some(day), &[TimeslotInclude::Venue])
        .await?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["label"], "Day 2 morning");
    assert_eq!(rows[0]["venue"]["name"], "Main Hall");

    db.teardown().await
}

#[tokio::test]
#[ignore]
async fn accept_updates_invite_and_adds_cohost_together() -> Result<()> {
    let Some(db) = Scratch::open().await? else { return Ok(()) };
    let store = db.store();

    let invite_id = db.invite(&"a".repeat(64)).await?;
    let accepted = store.accept_invite(invite_id, db.guest, Utc::now()).await?;
    assert_eq!(accepted.accepted_by, Some(db.guest));
    assert!(store.is_cohost(db.session, db.guest).await?);

    // Same invite a second time: no longer pending
    assert!(matches!(
        store.accept_invite(invite_id, db.guest, Utc::now()).await,
        Err(StoreError::Conflict(_))
    ));

    db.teardown().await
}

#[tokio::test]
#[ignore]
async fn failed_cohost_insert_rolls_back_invite() -> Result<()> {
    let Some(db) = Scratch::open().await? else { return Ok(()) };
    let store = db.store();

    let token = "b".repeat(64);
    let invite_id = db.invite(&token).await?;
    assert!(matches!(
        store.accept_invite(invite_id, db.cohost, Utc::now()).await,
        Err(StoreError::Conflict(_))
    ));

    let invite = store.find_invite(&token).await?.context("invite vanished")?;
    assert_eq!(invite.status.as_str(), "pending");
    assert!(invite.accepted_by.is_none());

    db.teardown().await
}
