/// A closed set of relationship expansions a resource accepts via `?include=`
pub trait Expansion: Sized + Copy + PartialEq + 'static {
    /// Whitelisted wire names, in documentation order
    const VALID: &'static [&'static str];

    fn from_name(name: &str) -> Option<Self>;

    fn name(&self) -> &'static str;
}

macro_rules! expansion {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $($variant),+
        }

        impl Expansion for $name {
            const VALID: &'static [&'static str] = &[$($wire),+];

            fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($wire => Some($name::$variant),)+
                    _ => None,
                }
            }

            fn name(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }
        }
    };
}

expansion!(
    /// `/api/v1/profiles`
    ProfileInclude { Sessions => "sessions" }
);

expansion!(
    /// `/api/v1/sessions`
    SessionInclude {
        Host => "host",
        Track => "track",
        Venue => "venue",
        Timeslot => "timeslot",
        Cohosts => "cohosts",
    }
);

expansion!(
    /// `/api/v1/tracks`
    TrackInclude { Sessions => "sessions" }
);

expansion!(
    /// `/api/v1/venues`
    VenueInclude { Timeslots => "timeslots" }
);

expansion!(
    /// `/api/v1/timeslots`
    TimeslotInclude { Venue => "venue" }
);
