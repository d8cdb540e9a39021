//! Assignment grid: the court × timeslot matrix.
//!
//! Every cell holds an ordered list of assigned players and an optional
//! captain. The grid is the single source of truth for the session; the
//! renderer and the metrics engine only ever read it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{Court, CourtId, Event, PlayerId, Roster, TimeSlotId};

/// Errors raised for malformed cell references.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("No cell at court {court} / timeslot {timeslot}")]
    UnknownCell { court: CourtId, timeslot: TimeSlotId },
}

/// Address of a grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellRef {
    pub court: CourtId,
    pub timeslot: TimeSlotId,
}

impl CellRef {
    pub fn new(court: CourtId, timeslot: TimeSlotId) -> Self {
        Self { court, timeslot }
    }
}

impl std::fmt::Display for CellRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "court {} @ slot {}", self.court, self.timeslot)
    }
}

/// Contents of one (court, timeslot) intersection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    assignments: Vec<PlayerId>,
    captain: Option<PlayerId>,
}

impl Cell {
    pub fn players(&self) -> &[PlayerId] {
        &self.assignments
    }

    pub fn captain(&self) -> Option<PlayerId> {
        self.captain
    }

    pub fn contains(&self, player: PlayerId) -> bool {
        self.assignments.contains(&player)
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}

/// The court × timeslot matrix for one flight.
#[derive(Debug, Clone)]
pub struct AssignmentGrid {
    courts: Vec<Court>,
    timeslots: Vec<TimeSlotId>,
    cells: BTreeMap<CellRef, Cell>,
}

impl AssignmentGrid {
    /// Create an empty grid with one cell per court and timeslot.
    pub fn new(courts: Vec<Court>, timeslots: Vec<TimeSlotId>) -> Self {
        let mut cells = BTreeMap::new();
        for court in &courts {
            for &timeslot in &timeslots {
                cells.insert(CellRef::new(court.id, timeslot), Cell::default());
            }
        }

        Self {
            courts,
            timeslots,
            cells,
        }
    }

    pub fn from_roster(roster: &Roster) -> Self {
        Self::new(
            roster.courts.clone(),
            roster.timeslots.iter().map(|t| t.id).collect(),
        )
    }

    /// Populate the grid from server-persisted events. Events that point
    /// outside the grid are logged and skipped.
    pub fn load_events(&mut self, events: &[Event]) {
        for event in events {
            let cell = CellRef::new(event.court, event.timeslot);
            if !self.cells.contains_key(&cell) {
                warn!("Skipping event outside the grid: {}", cell);
                continue;
            }

            for &player in &event.players {
                // Infallible: the cell was checked above.
                let _ = self.add_assignment(cell, player);
            }

            if let Some(captain) = event.captain {
                let _ = self.set_captain(cell, captain);
            }
        }
    }

    pub fn courts(&self) -> &[Court] {
        &self.courts
    }

    pub fn timeslots(&self) -> &[TimeSlotId] {
        &self.timeslots
    }

    pub fn court(&self, id: CourtId) -> Option<&Court> {
        self.courts.iter().find(|c| c.id == id)
    }

    pub fn cell(&self, cell: CellRef) -> Result<&Cell, GridError> {
        self.cells.get(&cell).ok_or(GridError::UnknownCell {
            court: cell.court,
            timeslot: cell.timeslot,
        })
    }

    fn cell_mut(&mut self, cell: CellRef) -> Result<&mut Cell, GridError> {
        self.cells.get_mut(&cell).ok_or(GridError::UnknownCell {
            court: cell.court,
            timeslot: cell.timeslot,
        })
    }

    /// Iterate over every cell in (court, timeslot) order.
    pub fn cells(&self) -> impl Iterator<Item = (CellRef, &Cell)> {
        self.cells.iter().map(|(r, c)| (*r, c))
    }

    /// Cells that currently hold at least one player.
    pub fn occupied_cells(&self) -> impl Iterator<Item = (CellRef, &Cell)> {
        self.cells().filter(|(_, c)| !c.is_empty())
    }

    /// Whether a cell exists and its court accepts drops.
    pub fn is_drop_target(&self, cell: CellRef) -> bool {
        self.cells.contains_key(&cell)
            && self
                .court(cell.court)
                .map(Court::accepts_drops)
                .unwrap_or(false)
    }

    /// Append a player to a cell. Returns `false` without changing anything
    /// if the player is already there.
    pub fn add_assignment(&mut self, cell: CellRef, player: PlayerId) -> Result<bool, GridError> {
        let target = self.cell_mut(cell)?;
        if target.contains(player) {
            debug!("Player {} already assigned to {}", player, cell);
            return Ok(false);
        }

        target.assignments.push(player);
        Ok(true)
    }

    /// Remove one occurrence of a player. Clears the captain if it was them.
    pub fn remove_assignment(
        &mut self,
        cell: CellRef,
        player: PlayerId,
    ) -> Result<bool, GridError> {
        let target = self.cell_mut(cell)?;
        let Some(pos) = target.assignments.iter().position(|&p| p == player) else {
            return Ok(false);
        };

        target.assignments.remove(pos);
        if target.captain == Some(player) && !target.contains(player) {
            target.captain = None;
        }
        Ok(true)
    }

    /// Designate the captain of a cell. Rejected (and logged) when the
    /// player is not assigned there.
    pub fn set_captain(&mut self, cell: CellRef, player: PlayerId) -> Result<bool, GridError> {
        let target = self.cell_mut(cell)?;
        if !target.contains(player) {
            warn!(
                "Refusing to make {} captain of {}: not assigned there",
                player, cell
            );
            return Ok(false);
        }

        target.captain = Some(player);
        Ok(true)
    }

    pub fn count_at(&self, cell: CellRef) -> Result<usize, GridError> {
        Ok(self.cell(cell)?.len())
    }

    /// Every cell a player is assigned to.
    pub fn all_assignments_for_player(&self, player: PlayerId) -> Vec<CellRef> {
        self.cells()
            .filter(|(_, c)| c.contains(player))
            .map(|(r, _)| r)
            .collect()
    }

    /// Cells sharing a timeslot, in court order.
    pub fn cells_at_timeslot(&self, timeslot: TimeSlotId) -> impl Iterator<Item = (CellRef, &Cell)> {
        self.cells().filter(move |(r, _)| r.timeslot == timeslot)
    }

    /// Snapshot of the persisted form of a cell.
    pub fn event_at(&self, cell: CellRef) -> Result<Event, GridError> {
        let c = self.cell(cell)?;
        Ok(Event {
            court: cell.court,
            timeslot: cell.timeslot,
            players: c.assignments.clone(),
            captain: c.captain,
        })
    }
}
