//! Server sync gateway.
//!
//! Translates local grid mutations into event creation/deletion calls and
//! captain updates, and fetches the initial events and availability. All
//! writes are fire-and-continue: the local grid is never rolled back when
//! the server rejects or misses a call.

pub mod dry_run;
pub mod http;
#[cfg(test)]
pub mod recording;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::models::{
    AvailabilityRecord, CaptainUpdate, Event, EventPayload, FlightId, PlayerId, StatusResponse,
    TimeSlotId,
};

pub use dry_run::DryRunGateway;
pub use http::HttpGateway;
#[cfg(test)]
pub use recording::{RecordedCall, RecordingGateway};

/// Errors that can occur talking to the league server.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Server reported an error: {0}")]
    Server(String),
}

/// Boundary to the league server.
#[async_trait]
pub trait SyncGateway: Send + Sync {
    /// Gateway name for logging.
    fn name(&self) -> &'static str;

    /// Load the persisted events of a flight.
    async fn fetch_events(&self, flight: FlightId) -> Result<Vec<Event>, SyncError>;

    /// Load one player's availability within a flight.
    async fn fetch_availability(
        &self,
        player: PlayerId,
        flight: FlightId,
    ) -> Result<Vec<AvailabilityRecord>, SyncError>;

    async fn create_event(&self, payload: &EventPayload) -> Result<(), SyncError>;

    async fn delete_event(&self, payload: &EventPayload) -> Result<(), SyncError>;

    async fn update_captain(
        &self,
        timeslot: TimeSlotId,
        update: &CaptainUpdate,
    ) -> Result<StatusResponse, SyncError>;
}

/// A write produced by a drop. At most one per drop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum SyncRequest {
    CreateEvent(EventPayload),
    DeleteEvent(EventPayload),
}

impl SyncRequest {
    pub fn payload(&self) -> &EventPayload {
        match self {
            SyncRequest::CreateEvent(p) | SyncRequest::DeleteEvent(p) => p,
        }
    }

    /// Send the request, logging the outcome.
    pub async fn send(&self, gateway: &dyn SyncGateway) -> Result<(), SyncError> {
        let payload = self.payload();
        let result = match self {
            SyncRequest::CreateEvent(p) => gateway.create_event(p).await,
            SyncRequest::DeleteEvent(p) => gateway.delete_event(p).await,
        };

        match &result {
            Ok(()) => info!(
                "{} {:?} on court {} @ slot {} via {}",
                self.verb(),
                payload.players,
                payload.court,
                payload.timeslot,
                gateway.name()
            ),
            Err(e) => warn!(
                "Failed to {} event on court {} @ slot {}: {}",
                self.verb(),
                payload.court,
                payload.timeslot,
                e
            ),
        }

        result
    }

    fn verb(&self) -> &'static str {
        match self {
            SyncRequest::CreateEvent(_) => "create",
            SyncRequest::DeleteEvent(_) => "delete",
        }
    }
}

/// Fire a request onto the runtime without waiting for it. Failures are
/// logged by [`SyncRequest::send`] and otherwise dropped.
pub fn dispatch(gateway: Arc<dyn SyncGateway>, request: SyncRequest) -> JoinHandle<()> {
    tokio::spawn(async move {
        let _ = request.send(gateway.as_ref()).await;
    })
}
