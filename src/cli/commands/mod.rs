pub mod get;
pub mod roles;
pub mod token;
