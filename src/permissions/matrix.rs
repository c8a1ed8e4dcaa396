use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::role::Role;

/// Named actions gated by role membership
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Permission {
    DeleteEvent,
    EditEventSettings,
    ManageTeam,
    ManageVenues,
    ManageTimeslots,
    ManageTracks,
    ViewAnalytics,
    ApproveProposals,
    ManageSchedule,
    SendAnnouncements,
    ManageTrackSessions,
    CheckInAttendees,
    SubmitProposal,
    Vote,
}

impl Permission {
    /// Permission catalog in insertion order
    pub const ALL: [Permission; 14] = [
        Permission::DeleteEvent,
        Permission::EditEventSettings,
        Permission::ManageTeam,
        Permission::ManageVenues,
        Permission::ManageTimeslots,
        Permission::ManageTracks,
        Permission::ViewAnalytics,
        Permission::ApproveProposals,
        Permission::ManageSchedule,
        Permission::SendAnnouncements,
        Permission::ManageTrackSessions,
        Permission::CheckInAttendees,
        Permission::SubmitProposal,
        Permission::Vote,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::DeleteEvent => "deleteEvent",
            Permission::EditEventSettings => "editEventSettings",
            Permission::ManageTeam => "manageTeam",
            Permission::ManageVenues => "manageVenues",
            Permission::ManageTimeslots => "manageTimeslots",
            Permission::ManageTracks => "manageTracks",
            Permission::ViewAnalytics => "viewAnalytics",
            Permission::ApproveProposals => "approveProposals",
            Permission::ManageSchedule => "manageSchedule",
            Permission::SendAnnouncements => "sendAnnouncements",
            Permission::ManageTrackSessions => "manageTrackSessions",
            Permission::CheckInAttendees => "checkInAttendees",
            Permission::SubmitProposal => "submitProposal",
            Permission::Vote => "vote",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown permission: {0}")]
pub struct UnknownPermission(pub String);

impl FromStr for Permission {
    type Err = UnknownPermission;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Permission::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| UnknownPermission(s.to_string()))
    }
}

use Role::*;

const EVERYONE: &[Role] = &[Owner, Admin, Moderator, TrackLead, Volunteer, Attendee];

/// Allow-set per permission. Not a threshold on the hierarchy:
/// volunteers check attendees in, track leads do not.
pub const PERMISSION_TABLE: &[(Permission, &[Role])] = &[
    (Permission::DeleteEvent, &[Owner]),
    (Permission::EditEventSettings, &[Owner, Admin]),
    (Permission::ManageTeam, &[Owner, Admin]),
    (Permission::ManageVenues, &[Owner, Admin]),
    (Permission::ManageTimeslots, &[Owner, Admin]),
    (Permission::ManageTracks, &[Owner, Admin]),
    (Permission::ViewAnalytics, &[Owner, Admin]),
    (Permission::ApproveProposals, &[Owner, Admin, Moderator]),
    (Permission::ManageSchedule, &[Owner, Admin, Moderator]),
    (Permission::SendAnnouncements, &[Owner, Admin, Moderator]),
    (Permission::ManageTrackSessions, &[Owner, Admin, Moderator, TrackLead]),
    (Permission::CheckInAttendees, &[Owner, Admin, Moderator, Volunteer]),
    (Permission::SubmitProposal, EVERYONE),
    (Permission::Vote, EVERYONE),
];

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MatrixError {
    #[error("Permission {0} has no allow-set")]
    MissingPermission(Permission),

    #[error("Permission {0} is listed more than once")]
    DuplicatePermission(Permission),

    #[error("Permission {0} has an empty allow-set")]
    EmptyAllowSet(Permission),

    #[error("Permission {0} lists role {1} more than once")]
    DuplicateRole(Permission, Role),
}

/// Validated (permission -> allowed roles) mapping
#[derive(Debug, Clone)]
pub struct PermissionMatrix {
    entries: Vec<(Permission, Vec<Role>)>,
}

impl PermissionMatrix {
    /// Build from a literal table, rejecting anything that is not exhaustive
    pub fn new(table: &[(Permission, &[Role])]) -> Result<Self, MatrixError> {
        let mut entries: Vec<(Permission, Vec<Role>)> = Vec::with_capacity(Permission::ALL.len());

        for (permission, roles) in table {
            if entries.iter().any(|(p, _)| p == permission) {
                return Err(MatrixError::DuplicatePermission(*permission));
            }
            if roles.is_empty() {
                return Err(MatrixError::EmptyAllowSet(*permission));
            }
            let mut allowed: Vec<Role> = Vec::with_capacity(roles.len());
            for role in roles.iter() {
                if allowed.contains(role) {
                    return Err(MatrixError::DuplicateRole(*permission, *role));
                }
                allowed.push(*role);
            }
            entries.push((*permission, allowed));
        }

        for permission in Permission::ALL {
            if !entries.iter().any(|(p, _)| *p == permission) {
                return Err(MatrixError::MissingPermission(permission));
            }
        }

        // Keep catalog order regardless of table order
        entries.sort_by_key(|(p, _)| Permission::ALL.iter().position(|c| c == p));

        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn allowed_roles(&self, permission: Permission) -> &[Role] {
        self.entries
            .iter()
            .find(|(p, _)| *p == permission)
            .map(|(_, roles)| roles.as_slice())
            .unwrap_or(&[])
    }

    pub fn can_role_perform(&self, role: Role, permission: Permission) -> bool {
        self.allowed_roles(permission).contains(&role)
    }

    pub fn permissions_for_role(&self, role: Role) -> Vec<Permission> {
        self.entries
            .iter()
            .filter(|(_, roles)| roles.contains(&role))
            .map(|(p, _)| *p)
            .collect()
    }
}

static MATRIX: Lazy<Result<PermissionMatrix, MatrixError>> =
    Lazy::new(|| PermissionMatrix::new(PERMISSION_TABLE));

/// Validate the built-in table. Called once before the server starts.
pub fn validate() -> Result<&'static PermissionMatrix, MatrixError> {
    MATRIX.as_ref().map_err(|e| e.clone())
}

fn matrix() -> &'static PermissionMatrix {
    match MATRIX.as_ref() {
        Ok(m) => m,
        Err(e) => panic!("permission table is invalid: {e}"),
    }
}

pub fn can_role_perform(role: Role, permission: Permission) -> bool {
    matrix().can_role_perform(role, permission)
}

pub fn get_permissions_for_role(role: Role) -> Vec<Permission> {
    matrix().permissions_for_role(role)
}

pub fn is_role_higher_than(a: Role, b: Role) -> bool {
    a.rank() > b.rank()
}

/// Fast-path check, deliberately separate from hierarchy comparison
pub fn is_admin_role(role: Role) -> bool {
    matches!(role, Role::Owner | Role::Admin)
}

pub fn get_role_label(role: Role) -> &'static str {
    role.label()
}
