use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Privilege level held by a user within one event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Attendee,
    Volunteer,
    TrackLead,
    Moderator,
    Admin,
    Owner,
}

/// Role hierarchy, lowest privilege first
pub const ROLE_HIERARCHY: [Role; 6] = [
    Role::Attendee,
    Role::Volunteer,
    Role::TrackLead,
    Role::Moderator,
    Role::Admin,
    Role::Owner,
];

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown role: {0}")]
pub struct UnknownRole(pub String);

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Attendee => "attendee",
            Role::Volunteer => "volunteer",
            Role::TrackLead => "track_lead",
            Role::Moderator => "moderator",
            Role::Admin => "admin",
            Role::Owner => "owner",
        }
    }

    /// Human readable label for display surfaces
    pub fn label(&self) -> &'static str {
        match self {
            Role::Attendee => "Attendee",
            Role::Volunteer => "Volunteer",
            Role::TrackLead => "Track Lead",
            Role::Moderator => "Moderator",
            Role::Admin => "Admin",
            Role::Owner => "Owner",
        }
    }

    /// Position in [`ROLE_HIERARCHY`]
    pub fn rank(&self) -> usize {
        match self {
            Role::Attendee => 0,
            Role::Volunteer => 1,
            Role::TrackLead => 2,
            Role::Moderator => 3,
            Role::Admin => 4,
            Role::Owner => 5,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ROLE_HIERARCHY
            .iter()
            .copied()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}
