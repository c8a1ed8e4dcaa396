//! Query-shape resolution for the read API: include whitelists and filters.

pub mod includes;
pub mod query;

pub use includes::{
    Expansion, ProfileInclude, SessionInclude, TimeslotInclude, TrackInclude, VenueInclude,
};
pub use query::{
    parse_day_filter, parse_includes, parse_status_filter, resolve_includes, ListQuery, QueryError,
};
