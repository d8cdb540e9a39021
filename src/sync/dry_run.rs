//! Gateway wrapper that reads from the server but never writes to it.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use super::{SyncError, SyncGateway};
use crate::models::{
    AvailabilityRecord, CaptainUpdate, Event, EventPayload, FlightId, PlayerId, StatusResponse,
    TimeSlotId,
};

/// Delegates reads to `inner`; writes are logged and acknowledged locally.
pub struct DryRunGateway {
    inner: Arc<dyn SyncGateway>,
}

impl DryRunGateway {
    pub fn new(inner: Arc<dyn SyncGateway>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl SyncGateway for DryRunGateway {
    fn name(&self) -> &'static str {
        "dry-run"
    }

    async fn fetch_events(&self, flight: FlightId) -> Result<Vec<Event>, SyncError> {
        self.inner.fetch_events(flight).await
    }

    async fn fetch_availability(
        &self,
        player: PlayerId,
        flight: FlightId,
    ) -> Result<Vec<AvailabilityRecord>, SyncError> {
        self.inner.fetch_availability(player, flight).await
    }

    async fn create_event(&self, payload: &EventPayload) -> Result<(), SyncError> {
        info!(
            "[dry-run] would create event on court {} @ slot {} with {:?}",
            payload.court, payload.timeslot, payload.players
        );
        Ok(())
    }

    async fn delete_event(&self, payload: &EventPayload) -> Result<(), SyncError> {
        info!(
            "[dry-run] would delete event on court {} @ slot {} with {:?}",
            payload.court, payload.timeslot, payload.players
        );
        Ok(())
    }

    async fn update_captain(
        &self,
        timeslot: TimeSlotId,
        update: &CaptainUpdate,
    ) -> Result<StatusResponse, SyncError> {
        info!(
            "[dry-run] would make {} captain on court {} @ slot {}",
            update.captain, update.court, timeslot
        );
        Ok(StatusResponse {
            status: "success".to_string(),
        })
    }
}
