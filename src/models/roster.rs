//! Reference data: players, timeslots and courts for one flight.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{CourtId, PlayerId, TimeSlotId};

/// A league player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,

    /// Short name shown on draggable chips and in the tabular view
    pub display_name: String,

    pub full_name: String,
}

/// A fixed calendar slot during which games may be played.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub id: TimeSlotId,
    pub start: NaiveDateTime,
}

/// A court. Courts that are unavailable or reserved by another flight
/// never accept drops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Court {
    pub id: CourtId,

    #[serde(default = "default_available")]
    pub available: bool,

    /// Name of the flight holding this court, if not ours
    #[serde(default)]
    pub reserved_by_flight: Option<String>,
}

fn default_available() -> bool {
    true
}

impl Court {
    pub fn new(id: CourtId) -> Self {
        Self {
            id,
            available: true,
            reserved_by_flight: None,
        }
    }

    /// Whether players may be dropped onto this court.
    pub fn accepts_drops(&self) -> bool {
        self.available && self.reserved_by_flight.is_none()
    }
}

/// All immutable reference data for a scheduling session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Roster {
    pub players: Vec<Player>,
    pub timeslots: Vec<TimeSlot>,
    pub courts: Vec<Court>,
}

impl Roster {
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn court(&self, id: CourtId) -> Option<&Court> {
        self.courts.iter().find(|c| c.id == id)
    }

    pub fn player_ids(&self) -> Vec<PlayerId> {
        self.players.iter().map(|p| p.id).collect()
    }

    /// Display name for a player, falling back to the numeric id.
    pub fn display_name(&self, id: PlayerId) -> String {
        self.player(id)
            .map(|p| p.display_name.clone())
            .unwrap_or_else(|| format!("#{}", id))
    }

    /// Load a roster from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
