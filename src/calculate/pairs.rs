//! Pairwise co-occurrence matrix.

use std::collections::HashMap;

use serde::Serialize;

use crate::config::PaletteConfig;
use crate::grid::AssignmentGrid;
use crate::models::{PlayerId, Rgb};

/// How many cells each pair of distinct players shares.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PairMatrix {
    counts: HashMap<(PlayerId, PlayerId), u32>,
}

impl PairMatrix {
    /// Rebuild the matrix from the grid. Both orientations of a pair are
    /// incremented together.
    pub fn from_grid(grid: &AssignmentGrid) -> Self {
        let mut counts = HashMap::new();
        for (_, cell) in grid.occupied_cells() {
            let players = cell.players();
            for (i, &a) in players.iter().enumerate() {
                for &b in &players[i + 1..] {
                    if a == b {
                        continue;
                    }
                    *counts.entry((a, b)).or_insert(0) += 1;
                    *counts.entry((b, a)).or_insert(0) += 1;
                }
            }
        }

        Self { counts }
    }

    /// Shared cells for a pair; `None` on the diagonal.
    pub fn get(&self, a: PlayerId, b: PlayerId) -> Option<u32> {
        if a == b {
            return None;
        }
        Some(self.counts.get(&(a, b)).copied().unwrap_or(0))
    }

    /// Largest count in the matrix.
    pub fn max_count(&self) -> u32 {
        self.counts.values().copied().max().unwrap_or(0)
    }

    /// Pairs (in both orientations) that share at least one cell.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Square projection over `players`, for tables and JSON output.
    pub fn rows(&self, players: &[PlayerId]) -> Vec<Vec<Option<u32>>> {
        players
            .iter()
            .map(|&a| players.iter().map(|&b| self.get(a, b)).collect())
            .collect()
    }
}

/// Color of a pair count: the neutral color for 0, otherwise a linear blend
/// from `pair_good` (count 1) to `pair_bad` (count `max_count`).
pub fn pair_color(count: u32, max_count: u32, palette: &PaletteConfig) -> Rgb {
    if count == 0 {
        return palette.pair_never;
    }

    let t = if max_count <= 1 {
        0.0
    } else {
        (count - 1) as f64 / (max_count - 1) as f64
    };
    palette.pair_good.lerp(palette.pair_bad, t)
}

/// One colored matrix entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PairCell {
    pub count: u32,
    pub color: Rgb,
}
