//! Capabilities of the things a user can grab and release.

use serde::{Deserialize, Serialize};

use crate::grid::{AssignmentGrid, CellRef};
use crate::models::PlayerId;

/// What picking an item up from a container does to the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DragSemantics {
    /// The original stays where it was (roster chips)
    Copy,
    /// The item leaves its container (grid cells)
    Move,
}

/// Where a released item lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropZone {
    Cell(CellRef),
    /// Back on the roster: the assignment is removed
    Unassign,
}

/// An item that can be picked up.
pub trait Draggable {
    fn player(&self) -> PlayerId;
}

/// A container items can be picked up from.
pub trait Source {
    /// `None` when nothing may be picked up here.
    fn drag_semantics(&self, grid: &AssignmentGrid) -> Option<DragSemantics>;
}

/// A container items can be released over.
pub trait DropTarget {
    /// `None` when this container does not accept drops.
    fn drop_zone(&self, grid: &AssignmentGrid) -> Option<DropZone>;
}

/// A draggable player item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerChip {
    pub player: PlayerId,
}

impl PlayerChip {
    pub fn new(player: PlayerId) -> Self {
        Self { player }
    }
}

impl Draggable for PlayerChip {
    fn player(&self) -> PlayerId {
        self.player
    }
}

/// Every container a chip can sit in or be released over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "container", rename_all = "snake_case")]
pub enum Container {
    /// The origin roster listing every player in the flight
    Roster,
    Cell(CellRef),
    /// Anywhere that is not a recognised container
    Outside,
}

impl Source for Container {
    fn drag_semantics(&self, grid: &AssignmentGrid) -> Option<DragSemantics> {
        match self {
            Container::Roster => Some(DragSemantics::Copy),
            Container::Cell(cell) => grid.cell(*cell).ok().map(|_| DragSemantics::Move),
            Container::Outside => None,
        }
    }
}

impl DropTarget for Container {
    fn drop_zone(&self, grid: &AssignmentGrid) -> Option<DropZone> {
        match self {
            Container::Roster => Some(DropZone::Unassign),
            Container::Cell(cell) if grid.is_drop_target(*cell) => Some(DropZone::Cell(*cell)),
            Container::Cell(_) | Container::Outside => None,
        }
    }
}
