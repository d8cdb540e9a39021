//! In-memory gateway that serves canned reads and records every write.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{SyncError, SyncGateway};
use crate::models::{
    AvailabilityRecord, CaptainUpdate, Event, EventPayload, FlightId, PlayerId, StatusResponse,
    TimeSlotId,
};

/// A write observed by [`RecordingGateway`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    Create(EventPayload),
    Delete(EventPayload),
    Captain(TimeSlotId, CaptainUpdate),
}

/// Gateway double for tests and offline runs.
#[derive(Default)]
pub struct RecordingGateway {
    events: Vec<Event>,
    availability: HashMap<PlayerId, Vec<AvailabilityRecord>>,
    unreachable_players: HashSet<PlayerId>,
    fail_writes: bool,
    captain_status: Option<String>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl RecordingGateway {
    pub fn with_events(mut self, events: Vec<Event>) -> Self {
        self.events = events;
        self
    }

    pub fn with_availability(mut self, player: PlayerId, records: Vec<AvailabilityRecord>) -> Self {
        self.availability.insert(player, records);
        self
    }

    /// Make availability fetches for this player fail.
    pub fn unreachable(mut self, player: PlayerId) -> Self {
        self.unreachable_players.insert(player);
        self
    }

    /// Make every create/delete call fail after being recorded.
    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    /// Status string returned by captain updates (default "success").
    pub fn with_captain_status(mut self, status: impl Into<String>) -> Self {
        self.captain_status = Some(status.into());
        self
    }

    /// Writes seen so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, call: RecordedCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }

    fn write_result(&self) -> Result<(), SyncError> {
        if self.fail_writes {
            Err(SyncError::HttpStatus {
                status: 503,
                message: "recording gateway set to fail".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl SyncGateway for RecordingGateway {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn fetch_events(&self, _flight: FlightId) -> Result<Vec<Event>, SyncError> {
        Ok(self.events.clone())
    }

    async fn fetch_availability(
        &self,
        player: PlayerId,
        _flight: FlightId,
    ) -> Result<Vec<AvailabilityRecord>, SyncError> {
        if self.unreachable_players.contains(&player) {
            return Err(SyncError::HttpStatus {
                status: 500,
                message: format!("availability for {} unavailable", player),
            });
        }
        Ok(self.availability.get(&player).cloned().unwrap_or_default())
    }

    async fn create_event(&self, payload: &EventPayload) -> Result<(), SyncError> {
        self.record(RecordedCall::Create(payload.clone()));
        self.write_result()
    }

    async fn delete_event(&self, payload: &EventPayload) -> Result<(), SyncError> {
        self.record(RecordedCall::Delete(payload.clone()));
        self.write_result()
    }

    async fn update_captain(
        &self,
        timeslot: TimeSlotId,
        update: &CaptainUpdate,
    ) -> Result<StatusResponse, SyncError> {
        self.record(RecordedCall::Captain(timeslot, update.clone()));
        Ok(StatusResponse {
            status: self
                .captain_status
                .clone()
                .unwrap_or_else(|| "success".to_string()),
        })
    }
}
