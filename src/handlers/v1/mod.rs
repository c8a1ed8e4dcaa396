//! Versioned read API. Every route sits behind the API key layer and only
//! answers GET.

pub mod profiles;
pub mod sessions;
pub mod timeslots;
pub mod tracks;
pub mod venues;

pub use profiles::get as profile_get;
pub use profiles::list as profile_list;
pub use sessions::get as session_get;
pub use sessions::list as session_list;
pub use timeslots::get as timeslot_get;
pub use timeslots::list as timeslot_list;
pub use tracks::get as track_get;
pub use tracks::list as track_list;
pub use venues::get as venue_get;
pub use venues::list as venue_list;
