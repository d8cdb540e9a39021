//! Session-scoped state owned by the mediator.

use crate::availability::AvailabilityStore;
use crate::config::LeagueConfig;
use crate::grid::AssignmentGrid;
use crate::models::{Availability, FlightId, PlayerId, Roster, TimeSlotId};

/// Everything the assignment engine knows about one flight.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub flight: FlightId,
    pub roster: Roster,
    pub availability: AvailabilityStore,
    pub grid: AssignmentGrid,
    pub league: LeagueConfig,
}

impl SessionContext {
    /// A context with an empty grid built from the roster.
    pub fn new(
        flight: FlightId,
        roster: Roster,
        availability: AvailabilityStore,
        league: LeagueConfig,
    ) -> Self {
        let grid = AssignmentGrid::from_roster(&roster);
        Self {
            flight,
            roster,
            availability,
            grid,
            league,
        }
    }

    pub fn availability_of(&self, player: PlayerId, timeslot: TimeSlotId) -> Option<Availability> {
        self.availability.lookup(player, timeslot)
    }
}
