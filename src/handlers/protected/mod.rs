//! Session-scoped routes. Each handler takes [`AuthUser`](crate::middleware::AuthUser),
//! so the bearer check runs before any path parsing or store access.

pub mod access;
pub mod cohosts;
pub mod invites;
pub mod permissions;

pub use cohosts::delete as cohost_delete;
pub use invites::{accept as invite_accept, create as session_invite_create, list as session_invite_list, revoke as invite_revoke};
pub use permissions::get as event_permissions_get;
