//! Availability store.
//!
//! Per-player, per-timeslot availability loaded once at startup. The
//! scheduling core only reads it.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::models::{Availability, AvailabilityRecord, FlightId, PlayerId, TimeSlotId};
use crate::sync::SyncGateway;

/// Read-only availability lookup for a session.
#[derive(Debug, Clone, Default)]
pub struct AvailabilityStore {
    records: HashMap<PlayerId, Vec<AvailabilityRecord>>,
}

impl AvailabilityStore {
    /// Build a store from records already in hand.
    pub fn from_records(records: HashMap<PlayerId, Vec<AvailabilityRecord>>) -> Self {
        Self { records }
    }

    /// Fetch every player's availability in parallel. A failed fetch is
    /// logged and leaves that player with no constraints.
    pub async fn load(
        gateway: Arc<dyn SyncGateway>,
        flight: FlightId,
        player_ids: &[PlayerId],
    ) -> Self {
        let mut tasks = JoinSet::new();
        for &player in player_ids {
            let gateway = gateway.clone();
            tasks.spawn(async move {
                let result = gateway.fetch_availability(player, flight).await;
                (player, result)
            });
        }

        let mut records = HashMap::with_capacity(player_ids.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((player, Ok(list))) => {
                    debug!("Loaded {} availability records for {}", list.len(), player);
                    records.insert(player, list);
                }
                Ok((player, Err(e))) => {
                    warn!("Availability fetch failed for player {}: {}", player, e);
                    records.insert(player, Vec::new());
                }
                Err(e) => warn!("Availability task aborted: {}", e),
            }
        }

        info!(
            "Loaded availability for {}/{} players",
            records.values().filter(|r| !r.is_empty()).count(),
            player_ids.len()
        );

        Self { records }
    }

    /// All records for a player, in server order.
    pub fn records(&self, player: PlayerId) -> &[AvailabilityRecord] {
        self.records.get(&player).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Availability of a player in a timeslot; `None` when unknown.
    pub fn lookup(&self, player: PlayerId, timeslot: TimeSlotId) -> Option<Availability> {
        self.records(player)
            .iter()
            .find(|r| r.time_slot_id == timeslot)
            .map(|r| r.availability)
    }

    /// Number of timeslots the player marked as low preference.
    pub fn low_preference_slots(&self, player: PlayerId) -> usize {
        self.records(player)
            .iter()
            .filter(|r| r.availability == Availability::LowPreference)
            .count()
    }
}
