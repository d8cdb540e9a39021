//! Conflict/legend renderer.
//!
//! A pure projection of the grid, the availability store and the derived
//! metrics into colors and view rows. Nothing here is a source of truth:
//! every layer can be thrown away and rebuilt from the grid.

mod table;

pub use table::*;

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::availability::AvailabilityStore;
use crate::calculate::{pair_color, MetricWarnings, PairCell, ScheduleMetrics};
use crate::config::AppConfig;
use crate::grid::{AssignmentGrid, CellRef};
use crate::models::{Availability, PlayerId, Rgb, Roster};

pub const GREEN: Rgb = Rgb::new(0x9c, 0xe0, 0x9c);
pub const YELLOW: Rgb = Rgb::new(0xf5, 0xe3, 0x7a);
pub const RED: Rgb = Rgb::new(0xe8, 0x7f, 0x7f);
pub const BLUE: Rgb = Rgb::new(0x8a, 0xb4, 0xf0);
pub const WARNING: Rgb = Rgb::new(0xf0, 0xa0, 0x40);
pub const DUPLICATE: Rgb = Rgb::new(0xf2, 0x9c, 0xd8);

/// Availability cue painted while a player is being dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Highlight {
    Available,
    LowPreference,
    Unavailable,
    /// The dragged player is already in this cell
    AlreadyAssigned,
}

impl Highlight {
    pub fn color(self) -> Rgb {
        match self {
            Highlight::Available => GREEN,
            Highlight::LowPreference => YELLOW,
            Highlight::Unavailable => RED,
            Highlight::AlreadyAssigned => BLUE,
        }
    }
}

impl From<Availability> for Highlight {
    fn from(value: Availability) -> Self {
        match value {
            Availability::Available => Highlight::Available,
            Availability::LowPreference => Highlight::LowPreference,
            Availability::Unavailable => Highlight::Unavailable,
        }
    }
}

/// Color layers over the grid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Paint {
    /// Drag-time availability highlighting
    pub highlights: BTreeMap<CellRef, Highlight>,

    /// Cells whose count is not a multiple of the player multiple
    pub warnings: BTreeSet<CellRef>,

    /// Cells sharing a repeated name within their court column
    pub duplicates: BTreeSet<CellRef>,

    /// Roster chip the current (or last) drag started from
    pub origin: Option<PlayerId>,
}

impl Paint {
    /// Effective color of a cell: drag highlight, then count warning,
    /// then duplicate mark.
    pub fn cell_color(&self, cell: CellRef) -> Option<Rgb> {
        if let Some(h) = self.highlights.get(&cell) {
            return Some(h.color());
        }
        if self.warnings.contains(&cell) {
            return Some(WARNING);
        }
        if self.duplicates.contains(&cell) {
            return Some(DUPLICATE);
        }
        None
    }

    pub fn marker(&self, cell: CellRef) -> Option<Highlight> {
        self.highlights.get(&cell).copied()
    }
}

/// One legend row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegendEntry {
    pub player: PlayerId,
    pub display_name: String,
    pub full_name: String,
    pub game_count: u32,
    pub captain_count: u32,
    pub low_preference: String,
    pub warnings: MetricWarnings,
}

impl LegendEntry {
    pub fn color(&self) -> Option<Rgb> {
        self.warnings.any().then_some(WARNING)
    }
}

/// Mutual-exclusion group of captain controls for one cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaptainGroup {
    pub cell: CellRef,
    pub candidates: Vec<PlayerId>,
    pub selected: Option<PlayerId>,
}

/// Everything a front end needs to redraw after a mutation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScheduleView {
    pub table: ScheduleTable,
    pub warnings: Vec<CellRef>,
    pub duplicates: Vec<CellRef>,
    pub legend: Vec<LegendEntry>,
    pub captain_groups: Vec<CaptainGroup>,
    pub pair_players: Vec<PlayerId>,
    pub pair_matrix: Vec<Vec<Option<PairCell>>>,
}

/// Holds the paint layers between mutations.
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    paint: Paint,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn paint(&self) -> &Paint {
        &self.paint
    }

    /// Paint every drop-target cell by the player's availability in its
    /// timeslot, and blue where the player is already assigned. Clears
    /// previous highlighting first.
    pub fn highlight_availability(
        &mut self,
        grid: &AssignmentGrid,
        availability: &AvailabilityStore,
        player: PlayerId,
    ) {
        self.reset_cell_colors();

        for &slot in grid.timeslots() {
            let marker = availability.lookup(player, slot).map(Highlight::from);
            for (cell_ref, cell) in grid.cells_at_timeslot(slot) {
                // Reserved and closed courts take no drops, so they stay unpainted
                if !grid.is_drop_target(cell_ref) {
                    continue;
                }
                let highlight = if cell.contains(player) {
                    Some(Highlight::AlreadyAssigned)
                } else {
                    marker
                };
                if let Some(h) = highlight {
                    self.paint.highlights.insert(cell_ref, h);
                }
            }
        }
    }

    /// Drop every drag-time highlight.
    pub fn reset_cell_colors(&mut self) {
        self.paint.highlights.clear();
    }

    pub fn mark_origin(&mut self, player: Option<PlayerId>) {
        self.paint.origin = player;
    }

    pub fn clear_origin(&mut self) {
        self.paint.origin = None;
    }

    /// Flag cells holding a name repeated within their court column.
    pub fn highlight_duplicate_players(&mut self, table: &ScheduleTable) {
        self.paint.duplicates = duplicate_cells(table);
    }

    /// Flag cells whose count is not a multiple of `player_multiple`.
    pub fn check_cells(&mut self, grid: &AssignmentGrid, player_multiple: usize) {
        self.paint.warnings = grid
            .cells()
            .filter(|(_, c)| player_multiple == 0 || c.len() % player_multiple != 0)
            .map(|(r, _)| r)
            .collect();
    }

    /// Rebuild every derived layer and produce the view.
    pub fn refresh(
        &mut self,
        grid: &AssignmentGrid,
        roster: &Roster,
        metrics: &ScheduleMetrics,
        config: &AppConfig,
    ) -> ScheduleView {
        let table = ScheduleTable::build(grid, roster);
        self.check_cells(grid, config.league.player_multiple);
        self.highlight_duplicate_players(&table);

        let pair_players: Vec<PlayerId> = metrics.players.iter().map(|m| m.player).collect();
        let max_games = config.league.max_games_total;
        let pair_matrix = metrics
            .pairs
            .rows(&pair_players)
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|count| {
                        count.map(|count| PairCell {
                            count,
                            color: pair_color(count, max_games, &config.palette),
                        })
                    })
                    .collect()
            })
            .collect();

        ScheduleView {
            table,
            warnings: self.paint.warnings.iter().copied().collect(),
            duplicates: self.paint.duplicates.iter().copied().collect(),
            legend: legend(roster, metrics),
            captain_groups: captain_groups(grid),
            pair_players,
            pair_matrix,
        }
    }
}

/// Legend rows in metrics order.
pub fn legend(roster: &Roster, metrics: &ScheduleMetrics) -> Vec<LegendEntry> {
    metrics
        .players
        .iter()
        .map(|m| {
            let player = roster.player(m.player);
            LegendEntry {
                player: m.player,
                display_name: roster.display_name(m.player),
                full_name: player.map(|p| p.full_name.clone()).unwrap_or_default(),
                game_count: m.game_count,
                captain_count: m.captain_count,
                low_preference: m.exposure_label(),
                warnings: m.warnings,
            }
        })
        .collect()
}

/// One captain group per occupied cell, matching current contents.
pub fn captain_groups(grid: &AssignmentGrid) -> Vec<CaptainGroup> {
    grid.occupied_cells()
        .map(|(cell, contents)| CaptainGroup {
            cell,
            candidates: contents.players().to_vec(),
            selected: contents.captain(),
        })
        .collect()
}
