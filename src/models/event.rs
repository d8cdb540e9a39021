//! Event model and the JSON bodies exchanged with the league server.

use serde::{Deserialize, Serialize};

use super::{AvailabilityRecord, CourtId, FlightId, PlayerId, TimeSlotId};

/// A fully populated, server-persisted game assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub court: CourtId,

    pub timeslot: TimeSlotId,

    /// Players in assignment order
    pub players: Vec<PlayerId>,

    #[serde(default)]
    pub captain: Option<PlayerId>,
}

/// Response of `/flights/{id}/events/get`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventsResponse {
    #[serde(default)]
    pub events: Vec<Event>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Body of the event creation and deletion calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventPayload {
    pub court: CourtId,
    pub timeslot: TimeSlotId,
    pub players: Vec<PlayerId>,
}

/// Body of `/timeslot/{id}/events/updateCaptain`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptainUpdate {
    pub court: CourtId,
    pub captain: PlayerId,
}

/// Response of the captain update call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

/// Response of `/players/{id}/getAvailability`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityResponse {
    pub flight_id: FlightId,

    #[serde(default)]
    pub availability: Vec<AvailabilityRecord>,
}
