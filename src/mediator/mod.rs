//! Drag/drop mediator.
//!
//! The only component allowed to mutate the assignment grid. Drives the
//! `Idle -> Dragging -> (Dropped | Cancelled) -> Idle` state machine and
//! decides, per drop, whether the placement stands and which single server
//! write (if any) it implies.

mod capability;

pub use capability::*;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::grid::{AssignmentGrid, CellRef, GridError};
use crate::models::{Availability, EventPayload, PlayerId};
use crate::session::SessionContext;
use crate::sync::SyncRequest;

/// Errors surfaced by the mediator.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MediatorError {
    #[error("A drag is already in progress")]
    AlreadyDragging,

    #[error("Nothing is being dragged")]
    NotDragging,

    #[error("Player {player} cannot be picked up from {origin:?}")]
    InvalidSource { player: PlayerId, origin: Container },

    #[error(transparent)]
    Grid(#[from] GridError),
}

/// An in-flight drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveDrag {
    pub chip: PlayerChip,
    pub origin: Container,
    pub semantics: DragSemantics,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(ActiveDrag),
}

/// Why a drop was discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    /// Released over the container it came from
    SameContainer,
    /// The player is already in the target cell
    DuplicatePlayer,
    /// The target cell already holds a full event
    CellFull,
    /// The player marked the target timeslot unavailable
    Unavailable,
}

/// What happened to the dropped item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "result", content = "reason", rename_all = "snake_case")]
pub enum Disposition {
    Placed,
    Unassigned,
    Rejected(Rejection),
}

/// Result of a completed drop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DropOutcome {
    pub player: PlayerId,
    pub zone: Option<CellRef>,
    pub disposition: Disposition,
    pub sync: Option<SyncRequest>,
}

/// Terminal transition of a drag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "end", rename_all = "snake_case")]
pub enum DragEnd {
    Dropped(DropOutcome),
    Cancelled,
}

/// Owner of the session context and the drag state machine.
#[derive(Debug)]
pub struct DragDropMediator {
    context: SessionContext,
    state: DragState,
}

impl DragDropMediator {
    pub fn new(context: SessionContext) -> Self {
        Self {
            context,
            state: DragState::Idle,
        }
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    pub fn grid(&self) -> &AssignmentGrid {
        &self.context.grid
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    /// `Idle -> Dragging`. A chip may be picked up from the roster (copy)
    /// or from a cell it is assigned to (move).
    pub fn pick_up<D, S>(&mut self, item: &D, origin: S) -> Result<ActiveDrag, MediatorError>
    where
        D: Draggable,
        S: Source + Into<Container>,
    {
        if self.is_dragging() {
            return Err(MediatorError::AlreadyDragging);
        }

        let player = item.player();
        let semantics = origin.drag_semantics(&self.context.grid);
        let origin: Container = origin.into();

        let valid = match (semantics, origin) {
            (Some(DragSemantics::Move), Container::Cell(cell)) => {
                self.context.grid.cell(cell)?.contains(player)
            }
            (Some(_), _) => true,
            (None, _) => false,
        };

        let Some(semantics) = semantics.filter(|_| valid) else {
            return Err(MediatorError::InvalidSource { player, origin });
        };

        let drag = ActiveDrag {
            chip: PlayerChip::new(player),
            origin,
            semantics,
        };
        debug!("Picked up {} from {:?} ({:?})", player, origin, semantics);
        self.state = DragState::Dragging(drag);
        Ok(drag)
    }

    /// `Dragging -> Dropped | Cancelled`, then back to `Idle`.
    pub fn release<T>(&mut self, over: T) -> Result<DragEnd, MediatorError>
    where
        T: DropTarget + Into<Container>,
    {
        let DragState::Dragging(drag) = std::mem::take(&mut self.state) else {
            return Err(MediatorError::NotDragging);
        };

        let zone = over.drop_zone(&self.context.grid);
        let over: Container = over.into();

        match zone {
            None => {
                debug!("Drag of {} cancelled over {:?}", drag.chip.player, over);
                Ok(DragEnd::Cancelled)
            }
            Some(DropZone::Unassign) => self.unassign(drag),
            Some(DropZone::Cell(target)) => Ok(DragEnd::Dropped(self.place(drag, target)?)),
        }
    }

    /// `Dragging -> Cancelled`: the pointer left every container.
    pub fn cancel(&mut self) -> Result<DragEnd, MediatorError> {
        self.release(Container::Outside)
    }

    /// Set a cell's captain. Returns `false` if the player is not there.
    pub fn apply_captain(&mut self, cell: CellRef, player: PlayerId) -> Result<bool, GridError> {
        self.context.grid.set_captain(cell, player)
    }

    fn place(&mut self, drag: ActiveDrag, target: CellRef) -> Result<DropOutcome, MediatorError> {
        let player = drag.chip.player;
        let multiple = self.context.league.player_multiple;
        let reject = |reason: Rejection| {
            debug!("Discarding drop of {} on {}: {:?}", player, target, reason);
            DropOutcome {
                player,
                zone: Some(target),
                disposition: Disposition::Rejected(reason),
                sync: None,
            }
        };

        if drag.origin == Container::Cell(target) {
            return Ok(reject(Rejection::SameContainer));
        }

        let target_cell = self.context.grid.cell(target)?;
        if target_cell.contains(player) {
            return Ok(reject(Rejection::DuplicatePlayer));
        }
        if target_cell.len() + 1 > multiple {
            return Ok(reject(Rejection::CellFull));
        }
        if self.context.availability_of(player, target.timeslot) == Some(Availability::Unavailable)
        {
            return Ok(reject(Rejection::Unavailable));
        }

        let deletion = match drag.origin {
            Container::Cell(source) if drag.semantics == DragSemantics::Move => {
                self.remove_from(source, player)?
            }
            _ => None,
        };

        self.context.grid.add_assignment(target, player)?;

        let creation = if self.context.grid.count_at(target)? == multiple {
            Some(SyncRequest::CreateEvent(self.payload(target)?))
        } else {
            None
        };

        let sync = match (deletion, creation) {
            // A full cell rejects further drops, so its creation could never
            // be resent. The broken source event is resent if the cell refills.
            (Some(delete), Some(create)) => {
                warn!(
                    "Drop of {} both broke and completed an event; sending creation only, {:?} stays on the server",
                    player,
                    delete.payload()
                );
                Some(create)
            }
            (delete, create) => delete.or(create),
        };

        Ok(DropOutcome {
            player,
            zone: Some(target),
            disposition: Disposition::Placed,
            sync,
        })
    }

    fn unassign(&mut self, drag: ActiveDrag) -> Result<DragEnd, MediatorError> {
        let player = drag.chip.player;
        let Container::Cell(source) = drag.origin else {
            debug!("Roster chip {} released over the roster", player);
            return Ok(DragEnd::Cancelled);
        };

        let sync = self.remove_from(source, player)?;
        Ok(DragEnd::Dropped(DropOutcome {
            player,
            zone: None,
            disposition: Disposition::Unassigned,
            sync,
        }))
    }

    /// Remove a player from a cell, returning the deletion request if that
    /// broke up a complete event.
    fn remove_from(
        &mut self,
        source: CellRef,
        player: PlayerId,
    ) -> Result<Option<SyncRequest>, MediatorError> {
        let before = self.payload(source)?;
        self.context.grid.remove_assignment(source, player)?;

        let multiple = self.context.league.player_multiple;
        if multiple > 0 && self.context.grid.count_at(source)? == multiple - 1 {
            Ok(Some(SyncRequest::DeleteEvent(before)))
        } else {
            Ok(None)
        }
    }

    fn payload(&self, cell: CellRef) -> Result<EventPayload, GridError> {
        let event = self.context.grid.event_at(cell)?;
        Ok(EventPayload {
            court: event.court,
            timeslot: event.timeslot,
            players: event.players,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::availability::AvailabilityStore;
    use crate::config::LeagueConfig;
    use crate::models::{AvailabilityRecord, Court, CourtId, FlightId, Roster, TimeSlot, TimeSlotId};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn roster() -> Roster {
        let start = NaiveDate::from_ymd_opt(2026, 5, 2)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        Roster {
            players: Vec::new(),
            timeslots: (1..=2)
                .map(|id| TimeSlot {
                    id: TimeSlotId(id),
                    start,
                })
                .collect(),
            courts: vec![
                Court::new(CourtId(1)),
                Court::new(CourtId(2)),
                Court {
                    reserved_by_flight: Some("Gold".to_string()),
                    ..Court::new(CourtId(3))
                },
            ],
        }
    }

    fn mediator() -> DragDropMediator {
        let availability = AvailabilityStore::from_records(HashMap::from([(
            PlayerId(13),
            vec![AvailabilityRecord::new(TimeSlotId(2), Availability::Unavailable)],
        )]));
        DragDropMediator::new(SessionContext::new(
            FlightId(1),
            roster(),
            availability,
            LeagueConfig::default(),
        ))
    }

    fn cell(court: i64, slot: i64) -> CellRef {
        CellRef::new(CourtId(court), TimeSlotId(slot))
    }

    fn ids(raw: &[i64]) -> Vec<PlayerId> {
        raw.iter().copied().map(PlayerId).collect()
    }

    /// Copy a player from the roster into a cell.
    fn drop_from_roster(m: &mut DragDropMediator, player: i64, target: CellRef) -> DragEnd {
        m.pick_up(&PlayerChip::new(PlayerId(player)), Container::Roster)
            .unwrap();
        m.release(Container::Cell(target)).unwrap()
    }

    fn move_between(m: &mut DragDropMediator, player: i64, from: CellRef, to: Container) -> DragEnd {
        m.pick_up(&PlayerChip::new(PlayerId(player)), Container::Cell(from))
            .unwrap();
        m.release(to).unwrap()
    }

    fn outcome(end: DragEnd) -> DropOutcome {
        match end {
            DragEnd::Dropped(outcome) => outcome,
            DragEnd::Cancelled => panic!("expected a drop"),
        }
    }

    #[test]
    fn test_state_machine_transitions() {
        let mut m = mediator();
        assert_eq!(m.state(), DragState::Idle);

        let drag = m
            .pick_up(&PlayerChip::new(PlayerId(1)), Container::Roster)
            .unwrap();
        assert_eq!(drag.semantics, DragSemantics::Copy);
        assert!(m.is_dragging());
        assert_eq!(
            m.pick_up(&PlayerChip::new(PlayerId(2)), Container::Roster),
            Err(MediatorError::AlreadyDragging)
        );

        assert_eq!(m.cancel().unwrap(), DragEnd::Cancelled);
        assert_eq!(m.state(), DragState::Idle);
        assert_eq!(m.release(Container::Roster), Err(MediatorError::NotDragging));
    }

    #[test]
    fn test_cannot_pick_up_from_cell_player_is_not_in() {
        let mut m = mediator();
        let err = m
            .pick_up(&PlayerChip::new(PlayerId(1)), Container::Cell(cell(1, 1)))
            .unwrap_err();
        assert!(matches!(err, MediatorError::InvalidSource { .. }));
        assert!(!m.is_dragging());

        assert!(m
            .pick_up(&PlayerChip::new(PlayerId(1)), Container::Outside)
            .is_err());
    }

    #[test]
    fn test_release_outside_or_reserved_cancels() {
        let mut m = mediator();
        m.pick_up(&PlayerChip::new(PlayerId(1)), Container::Roster)
            .unwrap();
        assert_eq!(m.release(Container::Cell(cell(3, 1))).unwrap(), DragEnd::Cancelled);
        assert!(m.grid().cells().all(|(_, c)| c.is_empty()));
    }

    #[test]
    fn test_fourth_player_creates_event_fifth_rejected() {
        let mut m = mediator();
        for p in 1..=3 {
            let o = outcome(drop_from_roster(&mut m, p, cell(1, 1)));
            assert_eq!(o.disposition, Disposition::Placed);
            assert_eq!(o.sync, None);
        }

        let o = outcome(drop_from_roster(&mut m, 4, cell(1, 1)));
        assert_eq!(
            o.sync,
            Some(SyncRequest::CreateEvent(EventPayload {
                court: CourtId(1),
                timeslot: TimeSlotId(1),
                players: ids(&[1, 2, 3, 4]),
            }))
        );

        let o = outcome(drop_from_roster(&mut m, 5, cell(1, 1)));
        assert_eq!(o.disposition, Disposition::Rejected(Rejection::CellFull));
        assert_eq!(o.sync, None);
        assert_eq!(m.grid().count_at(cell(1, 1)).unwrap(), 4);
    }

    #[test]
    fn test_duplicate_drop_does_not_increase_count() {
        let mut m = mediator();
        drop_from_roster(&mut m, 1, cell(1, 1));
        drop_from_roster(&mut m, 2, cell(1, 1));

        let o = outcome(drop_from_roster(&mut m, 1, cell(1, 1)));
        assert_eq!(o.disposition, Disposition::Rejected(Rejection::DuplicatePlayer));
        assert_eq!(m.grid().count_at(cell(1, 1)).unwrap(), 2);
    }

    #[test]
    fn test_drop_back_into_same_cell_is_discarded() {
        let mut m = mediator();
        drop_from_roster(&mut m, 1, cell(1, 1));

        let o = outcome(move_between(&mut m, 1, cell(1, 1), Container::Cell(cell(1, 1))));
        assert_eq!(o.disposition, Disposition::Rejected(Rejection::SameContainer));
        assert_eq!(m.grid().cell(cell(1, 1)).unwrap().players(), &[PlayerId(1)]);
    }

    #[test]
    fn test_unavailable_timeslot_rejects_regardless_of_count() {
        let mut m = mediator();
        for p in 1..=3 {
            drop_from_roster(&mut m, p, cell(2, 2));
        }

        // Would complete the event, but player 13 cannot play in slot 2
        let o = outcome(drop_from_roster(&mut m, 13, cell(2, 2)));
        assert_eq!(o.disposition, Disposition::Rejected(Rejection::Unavailable));
        assert_eq!(o.sync, None);
        assert!(m.grid().all_assignments_for_player(PlayerId(13)).is_empty());

        // Slot 1 has no constraint
        let o = outcome(drop_from_roster(&mut m, 13, cell(2, 1)));
        assert_eq!(o.disposition, Disposition::Placed);
    }

    #[test]
    fn test_moving_out_of_full_cell_deletes_event() {
        let mut m = mediator();
        for p in 1..=4 {
            drop_from_roster(&mut m, p, cell(1, 1));
        }

        let o = outcome(move_between(&mut m, 2, cell(1, 1), Container::Cell(cell(2, 1))));
        assert_eq!(o.disposition, Disposition::Placed);
        assert_eq!(
            o.sync,
            Some(SyncRequest::DeleteEvent(EventPayload {
                court: CourtId(1),
                timeslot: TimeSlotId(1),
                players: ids(&[1, 2, 3, 4]),
            }))
        );
        assert_eq!(m.grid().cell(cell(1, 1)).unwrap().players(), ids(&[1, 3, 4]).as_slice());
        assert_eq!(m.grid().cell(cell(2, 1)).unwrap().players(), &[PlayerId(2)]);
    }

    #[test]
    fn test_move_that_completes_and_breaks_sends_creation_only() {
        let mut m = mediator();
        for p in 1..=4 {
            drop_from_roster(&mut m, p, cell(1, 1));
        }
        for p in 5..=7 {
            drop_from_roster(&mut m, p, cell(2, 1));
        }

        let o = outcome(move_between(&mut m, 4, cell(1, 1), Container::Cell(cell(2, 1))));
        assert_eq!(
            o.sync,
            Some(SyncRequest::CreateEvent(EventPayload {
                court: CourtId(2),
                timeslot: TimeSlotId(1),
                players: ids(&[5, 6, 7, 4]),
            }))
        );
        assert_eq!(m.grid().count_at(cell(1, 1)).unwrap(), 3);
        assert_eq!(m.grid().count_at(cell(2, 1)).unwrap(), 4);
    }

    #[test]
    fn test_rejected_move_leaves_source_untouched() {
        let mut m = mediator();
        for p in 1..=4 {
            drop_from_roster(&mut m, p, cell(1, 1));
        }
        drop_from_roster(&mut m, 1, cell(2, 1));

        let o = outcome(move_between(&mut m, 1, cell(1, 1), Container::Cell(cell(2, 1))));
        assert_eq!(o.disposition, Disposition::Rejected(Rejection::DuplicatePlayer));
        assert_eq!(o.sync, None);
        assert_eq!(m.grid().count_at(cell(1, 1)).unwrap(), 4);
    }

    #[test]
    fn test_copy_from_roster_never_deletes() {
        let mut m = mediator();
        for p in 1..=4 {
            drop_from_roster(&mut m, p, cell(1, 1));
        }
        let o = outcome(drop_from_roster(&mut m, 1, cell(2, 1)));
        assert_eq!(o.sync, None);
        assert_eq!(m.grid().count_at(cell(1, 1)).unwrap(), 4);
    }

    #[test]
    fn test_drop_on_roster_unassigns() {
        let mut m = mediator();
        for p in 1..=4 {
            drop_from_roster(&mut m, p, cell(1, 1));
        }
        m.apply_captain(cell(1, 1), PlayerId(3)).unwrap();

        let o = outcome(move_between(&mut m, 3, cell(1, 1), Container::Roster));
        assert_eq!(o.disposition, Disposition::Unassigned);
        assert!(matches!(o.sync, Some(SyncRequest::DeleteEvent(ref p)) if p.players.len() == 4));
        assert_eq!(m.grid().cell(cell(1, 1)).unwrap().captain(), None);

        // Roster to roster is a no-op
        m.pick_up(&PlayerChip::new(PlayerId(3)), Container::Roster)
            .unwrap();
        assert_eq!(m.release(Container::Roster).unwrap(), DragEnd::Cancelled);
    }

    #[test]
    fn test_apply_captain_requires_assignment() {
        let mut m = mediator();
        drop_from_roster(&mut m, 1, cell(1, 1));

        assert!(!m.apply_captain(cell(1, 1), PlayerId(2)).unwrap());
        assert_eq!(m.grid().cell(cell(1, 1)).unwrap().captain(), None);
        assert!(m.apply_captain(cell(1, 1), PlayerId(1)).unwrap());
    }
}
