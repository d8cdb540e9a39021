//! Derived-metrics engine.
//!
//! Recomputes, from scratch on every mutation, the per-player aggregates
//! and the pair matrix:
//! - Games and captaincies per player
//! - Low-preference exposure
//! - Warning flags against the league's configured ranges

mod pairs;

pub use pairs::*;

use serde::Serialize;

use crate::availability::AvailabilityStore;
use crate::config::LeagueConfig;
use crate::grid::AssignmentGrid;
use crate::models::{Availability, PlayerId};

/// Threshold breaches for one player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricWarnings {
    /// Game count outside [min_games_total, max_games_total]
    pub games: bool,

    /// Captain count outside [min_captained, max_captained]
    pub captained: bool,

    /// Low-preference exposure above half of min_games_total
    pub low_preference: bool,
}

impl MetricWarnings {
    pub fn any(&self) -> bool {
        self.games || self.captained || self.low_preference
    }
}

/// Aggregates for one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerMetrics {
    pub player: PlayerId,
    pub game_count: u32,
    pub captain_count: u32,

    /// Scheduled cells in timeslots the player marked low preference
    pub low_preference_exposed: u32,

    /// Timeslots the player marked low preference
    pub low_preference_total: u32,

    pub warnings: MetricWarnings,
}

impl PlayerMetrics {
    /// Exposure as "exposed/total".
    pub fn exposure_label(&self) -> String {
        format!("{}/{}", self.low_preference_exposed, self.low_preference_total)
    }
}

/// Snapshot of everything derived from the grid.
#[derive(Debug, Clone, Default)]
pub struct ScheduleMetrics {
    pub players: Vec<PlayerMetrics>,
    pub pairs: PairMatrix,
}

impl ScheduleMetrics {
    pub fn player(&self, id: PlayerId) -> Option<&PlayerMetrics> {
        self.players.iter().find(|m| m.player == id)
    }

    /// Players with at least one warning flag.
    pub fn flagged(&self) -> impl Iterator<Item = &PlayerMetrics> {
        self.players.iter().filter(|m| m.warnings.any())
    }
}

/// Whether `value` falls outside `[min, max]`.
pub fn outside_range(value: u32, min: u32, max: u32) -> bool {
    value < min || value > max
}

/// Compute metrics for `players` plus anyone else found in the grid.
pub fn compute_metrics(
    grid: &AssignmentGrid,
    availability: &AvailabilityStore,
    players: &[PlayerId],
    league: &LeagueConfig,
) -> ScheduleMetrics {
    let mut ids: Vec<PlayerId> = players.to_vec();
    for (_, cell) in grid.occupied_cells() {
        for &p in cell.players() {
            if !ids.contains(&p) {
                ids.push(p);
            }
        }
    }

    let players = ids
        .into_iter()
        .map(|id| player_metrics(grid, availability, id, league))
        .collect();

    ScheduleMetrics {
        players,
        pairs: PairMatrix::from_grid(grid),
    }
}

/// Compute the aggregates for a single player.
pub fn player_metrics(
    grid: &AssignmentGrid,
    availability: &AvailabilityStore,
    player: PlayerId,
    league: &LeagueConfig,
) -> PlayerMetrics {
    let mut game_count = 0;
    let mut captain_count = 0;
    let mut low_preference_exposed = 0;

    for (cell_ref, cell) in grid.occupied_cells() {
        if !cell.contains(player) {
            continue;
        }
        game_count += 1;
        if cell.captain() == Some(player) {
            captain_count += 1;
        }
        if availability.lookup(player, cell_ref.timeslot) == Some(Availability::LowPreference) {
            low_preference_exposed += 1;
        }
    }

    let warnings = MetricWarnings {
        games: outside_range(game_count, league.min_games_total, league.max_games_total),
        captained: outside_range(captain_count, league.min_captained, league.max_captained),
        low_preference: low_preference_exposed as f64 > league.min_games_total as f64 / 2.0,
    };

    PlayerMetrics {
        player,
        game_count,
        captain_count,
        low_preference_exposed,
        low_preference_total: availability.low_preference_slots(player) as u32,
        warnings,
    }
}
