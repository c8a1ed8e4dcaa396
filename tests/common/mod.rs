#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, TimeZone, Utc};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use unconf_api::auth::{generate_jwt, Claims};
use unconf_api::config::AppConfig;
use unconf_api::database::models::{
    Cohost, EventRole, Invite, InviteStatus, Profile, Session, SessionStatus, Timeslot, Track, Venue,
};
use unconf_api::database::{MemoryData, MemoryStore};
use unconf_api::permissions::Role;
use unconf_api::{app, AppState};

pub const API_KEY: &str = "test-api-key-0123456789";
pub const JWT_SECRET: &str = "test-jwt-secret";

pub const PENDING_TOKEN: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
pub const EXPIRED_TOKEN: &str = "bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";
pub const REVOKED_TOKEN: &str = "cccccccccccccccccccccccccccccccccccccccccccccccccccccccccccccccc";
/// Pending invite on `approved_session` sent by Bob, a co-host
pub const COHOST_SENT_TOKEN: &str = "eeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee";

/// Fixed identifiers for the seeded event
pub struct Fixture {
    pub event: Uuid,
    /// Primary host of `approved_session` and `pending_session`
    pub ada: Uuid,
    /// Co-host of `approved_session`; host of `scheduled_session`
    pub bob: Uuid,
    /// Attendee with no relation to any session
    pub cy: Uuid,
    /// Event admin
    pub dee: Uuid,
    pub track: Uuid,
    pub venue: Uuid,
    pub slot_day_one: Uuid,
    pub slot_day_two: Uuid,
    pub approved_session: Uuid,
    pub scheduled_session: Uuid,
    pub pending_session: Uuid,
    pub rejected_session: Uuid,
}

fn id(n: u128) -> Uuid {
    Uuid::from_u128(0x1000_0000_0000_4000_8000_0000_0000_0000 + n)
}

fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, day, hour, 0, 0).unwrap()
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            event: id(1),
            ada: id(10),
            bob: id(11),
            cy: id(12),
            dee: id(13),
            track: id(20),
            venue: id(30),
            slot_day_one: id(40),
            slot_day_two: id(41),
            approved_session: id(50),
            scheduled_session: id(51),
            pending_session: id(52),
            rejected_session: id(53),
        }
    }

    fn profile(&self, id: Uuid, name: &str) -> Profile {
        Profile {
            id,
            display_name: name.to_string(),
            avatar_url: None,
            bio: Some(format!("{} likes unconferences", name)),
            created_at: at(1, 8),
        }
    }

    fn session(&self, id: Uuid, title: &str, status: SessionStatus, votes: i32, host: Uuid) -> Session {
        Session {
            id,
            event_id: self.event,
            title: title.to_string(),
            description: None,
            format: "discussion".to_string(),
            duration: 45,
            status,
            total_votes: votes,
            host_id: host,
            track_id: Some(self.track),
            venue_id: None,
            timeslot_id: None,
            created_at: at(1, 9),
        }
    }

    fn invite(&self, token: &str, status: InviteStatus, expires_at: DateTime<Utc>) -> Invite {
        self.invite_from(self.ada, token, status, expires_at)
    }

    fn invite_from(&self, inviter: Uuid, token: &str, status: InviteStatus, expires_at: DateTime<Utc>) -> Invite {
        Invite {
            id: Uuid::new_v4(),
            session_id: self.approved_session,
            token: token.to_string(),
            invited_by: inviter,
            status,
            expires_at,
            accepted_by: None,
            accepted_at: None,
            created_at: Utc::now() - Duration::days(1),
        }
    }

    pub fn data(&self) -> MemoryData {
        let mut approved = self.session(self.approved_session, "Async Rust", SessionStatus::Approved, 10, self.ada);
        approved.venue_id = Some(self.venue);
        approved.timeslot_id = Some(self.slot_day_one);

        MemoryData {
            profiles: vec![
                self.profile(self.dee, "Dee"),
                self.profile(self.ada, "Ada"),
                self.profile(self.cy, "Cy"),
                self.profile(self.bob, "Bob"),
            ],
            sessions: vec![
                approved,
                self.session(self.scheduled_session, "Borrow checker clinic", SessionStatus::Scheduled, 20, self.bob),
                self.session(self.pending_session, "Secret plans", SessionStatus::Pending, 99, self.ada),
                self.session(self.rejected_session, "Rejected idea", SessionStatus::Rejected, 1, self.cy),
            ],
            tracks: vec![Track {
                id: self.track,
                event_id: self.event,
                name: "Systems".to_string(),
                description: None,
                color: Some("#336699".to_string()),
                created_at: at(1, 8),
            }],
            venues: vec![Venue {
                id: self.venue,
                event_id: self.event,
                name: "Main Hall".to_string(),
                capacity: Some(120),
                features: vec!["projector".to_string()],
                created_at: at(1, 8),
            }],
            timeslots: vec![
                Timeslot {
                    id: self.slot_day_two,
                    venue_id: self.venue,
                    label: Some("Day 2 morning".to_string()),
                    start_time: at(2, 10),
                    end_time: at(2, 11),
                },
                Timeslot {
                    id: self.slot_day_one,
                    venue_id: self.venue,
                    label: Some("Day 1 morning".to_string()),
                    start_time: at(1, 10),
                    end_time: at(1, 11),
                },
            ],
            cohosts: vec![Cohost {
                session_id: self.approved_session,
                user_id: self.bob,
                created_at: at(1, 12),
            }],
            invites: vec![
                self.invite(PENDING_TOKEN, InviteStatus::Pending, Utc::now() + Duration::days(6)),
                self.invite(EXPIRED_TOKEN, InviteStatus::Pending, Utc::now() - Duration::hours(1)),
                self.invite(REVOKED_TOKEN, InviteStatus::Revoked, Utc::now() + Duration::days(6)),
                self.invite_from(self.bob, COHOST_SENT_TOKEN, InviteStatus::Pending, Utc::now() + Duration::days(6)),
            ],
            event_roles: vec![
                EventRole { event_id: self.event, user_id: self.ada, role: Role::Attendee },
                EventRole { event_id: self.event, user_id: self.bob, role: Role::Attendee },
                EventRole { event_id: self.event, user_id: self.cy, role: Role::Attendee },
                EventRole { event_id: self.event, user_id: self.dee, role: Role::Admin },
            ],
        }
    }
}

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub fixture: Fixture,
    pub client: reqwest::Client,
}

impl TestServer {
    /// Serve the router on an unused port with a freshly seeded store
    pub async fn spawn() -> Result<Self> {
        init_tracing();
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut config = AppConfig::development();
        config.server.port = port;
        config.api.secret_key = Some(API_KEY.to_string());
        config.auth.jwt_secret = Some(JWT_SECRET.to_string());

        let fixture = Fixture::new();
        let store = Arc::new(MemoryStore::new(fixture.data()));
        let router = app(AppState::new(config, store));

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test listener")?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Ok(Self {
            port,
            base_url,
            fixture,
            client: reqwest::Client::new(),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET on the read API with the valid key
    pub async fn read(&self, path: &str) -> Result<reqwest::Response> {
        Ok(self
            .client
            .get(self.url(path))
            .header("x-api-key", API_KEY)
            .send()
            .await?)
    }

    pub fn bearer(&self, user: Uuid) -> String {
        let claims = Claims::new(user, Duration::hours(1));
        let token = generate_jwt(&claims, &test_auth()).expect("test token");
        format!("Bearer {}", token)
    }
}

/// Server logs go through the test writer; `RUST_LOG=debug` to see them
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_test_writer()
        .try_init();
}

fn test_auth() -> unconf_api::config::AuthConfig {
    unconf_api::config::AuthConfig {
        jwt_secret: Some(JWT_SECRET.to_string()),
        jwt_audience: None,
    }
}
