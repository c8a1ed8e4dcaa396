//! Routes that need no credentials.

pub mod invites;
pub mod root;

pub use invites::get as invite_get;
pub use root::{health, root};
