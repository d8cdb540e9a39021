//! Player availability classification per timeslot.

use serde::{Deserialize, Serialize};

use super::TimeSlotId;

/// How a player can be scheduled in a timeslot. Encoded on the wire as
/// 1 (available), 2 (low preference) and 3 (unavailable). A missing record
/// means no constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Availability {
    Available,
    LowPreference,
    Unavailable,
}

impl Availability {
    pub fn code(self) -> u8 {
        match self {
            Availability::Available => 1,
            Availability::LowPreference => 2,
            Availability::Unavailable => 3,
        }
    }
}

impl TryFrom<u8> for Availability {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Availability::Available),
            2 => Ok(Availability::LowPreference),
            3 => Ok(Availability::Unavailable),
            other => Err(format!("unknown availability code {}", other)),
        }
    }
}

impl From<Availability> for u8 {
    fn from(value: Availability) -> Self {
        value.code()
    }
}

impl std::fmt::Display for Availability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Availability::Available => write!(f, "available"),
            Availability::LowPreference => write!(f, "low-preference"),
            Availability::Unavailable => write!(f, "unavailable"),
        }
    }
}

/// One player's availability for one timeslot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityRecord {
    #[serde(rename = "timeSlotId")]
    pub time_slot_id: TimeSlotId,

    pub availability: Availability,
}

impl AvailabilityRecord {
    pub fn new(time_slot_id: TimeSlotId, availability: Availability) -> Self {
        Self {
            time_slot_id,
            availability,
        }
    }
}
