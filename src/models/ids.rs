//! Integer identifiers for server-owned reference data.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! integer_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// Get the raw integer value.
            pub fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, "({})"), self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }
    };
}

integer_id!(
    /// Identifies a player across the league.
    PlayerId,
    "PlayerId"
);

integer_id!(
    /// Identifies a timeslot (a fixed calendar slot).
    TimeSlotId,
    "TimeSlotId"
);

integer_id!(
    /// Identifies a court.
    CourtId,
    "CourtId"
);

integer_id!(
    /// Identifies a flight (skill-tier bracket scheduled independently).
    FlightId,
    "FlightId"
);
