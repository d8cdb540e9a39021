//! Alternate tabular view: one column per court, one row per timeslot,
//! each cell listing display names.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use crate::grid::{AssignmentGrid, CellRef};
use crate::models::{CourtId, Roster, TimeSlotId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableCell {
    pub cell: CellRef,
    pub names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableColumn {
    pub court: CourtId,

    /// Set when another flight holds the court
    pub reserved_by: Option<String>,

    pub cells: Vec<TableCell>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScheduleTable {
    pub timeslots: Vec<TimeSlotId>,
    pub columns: Vec<TableColumn>,
}

impl ScheduleTable {
    pub fn build(grid: &AssignmentGrid, roster: &Roster) -> Self {
        let columns = grid
            .courts()
            .iter()
            .map(|court| TableColumn {
                court: court.id,
                reserved_by: court.reserved_by_flight.clone(),
                cells: grid
                    .timeslots()
                    .iter()
                    .filter_map(|&slot| {
                        let cell = CellRef::new(court.id, slot);
                        let contents = grid.cell(cell).ok()?;
                        Some(TableCell {
                            cell,
                            names: contents
                                .players()
                                .iter()
                                .map(|&p| roster.display_name(p))
                                .collect(),
                        })
                    })
                    .collect(),
            })
            .collect();

        Self {
            timeslots: grid.timeslots().to_vec(),
            columns,
        }
    }
}

/// Cells holding a name that appears at least twice within the same
/// column. Every occurrence is flagged, the first one included.
pub fn duplicate_cells(table: &ScheduleTable) -> BTreeSet<CellRef> {
    let mut flagged = BTreeSet::new();

    for column in &table.columns {
        let mut seen: HashMap<&str, usize> = HashMap::new();
        for cell in &column.cells {
            for name in &cell.names {
                *seen.entry(name.as_str()).or_insert(0) += 1;
            }
        }

        for cell in &column.cells {
            if cell.names.iter().any(|n| seen.get(n.as_str()).copied().unwrap_or(0) >= 2) {
                flagged.insert(cell.cell);
            }
        }
    }

    flagged
}
