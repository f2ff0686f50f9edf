use mineprobe_core::TileIndex;
use num_bigint::BigUint;

use crate::{Safety, constraint::Constraints};

/// Exact safeties for one board snapshot.
///
/// Produced by [`Solver::analyze`](crate::Solver::analyze). Holds the
/// extracted [`Constraints`] so callers can map tiles to boxes.
#[derive(Debug, Clone)]
pub struct Analysis {
    constraints: Constraints,
    box_safety: Vec<Safety>,
    off_edge_safety: Safety,
    solutions: BigUint,
    dead: Vec<bool>,
    best_safety: Safety,
}

impl Analysis {
    pub(crate) fn new(
        constraints: Constraints,
        box_safety: Vec<Safety>,
        off_edge_safety: Safety,
        solutions: BigUint,
        dead_tiles: &[TileIndex],
    ) -> Self {
        let mut dead = vec![false; constraints.board_len()];
        for &tile in dead_tiles {
            dead[tile] = true;
        }

        let on_edge = constraints
            .boxes()
            .iter()
            .zip(&box_safety)
            .filter(|(b, s)| s.is_certain_safe() || b.tiles().iter().any(|&t| !dead[t]))
            .map(|(_, &s)| s);
        let off_edge = (!constraints.off_edge().is_empty()).then_some(off_edge_safety);
        let best_safety = on_edge.chain(off_edge).max().unwrap_or(Safety::ZERO);

        Self {
            constraints,
            box_safety,
            off_edge_safety,
            solutions,
            dead,
            best_safety,
        }
    }

    /// The constraints this analysis was computed from.
    #[must_use]
    pub fn constraints(&self) -> &Constraints {
        &self.constraints
    }

    /// Safety of a tile.
    ///
    /// Returns `None` for tiles that are neither covered nor known markers.
    #[must_use]
    pub fn safety(&self, tile: TileIndex) -> Option<Safety> {
        if self.constraints.is_mine(tile) {
            return Some(Safety::ZERO);
        }
        if let Some(id) = self.constraints.box_of(tile) {
            return Some(self.box_safety[id]);
        }
        self.constraints
            .off_edge()
            .binary_search(&tile)
            .is_ok()
            .then_some(self.off_edge_safety)
    }

    /// Safety shared by every tile without an adjacent clue.
    #[must_use]
    pub fn off_edge_safety(&self) -> Safety {
        self.off_edge_safety
    }

    /// Returns `true` if revealing the tile can never yield information.
    #[must_use]
    pub fn is_dead(&self, tile: TileIndex) -> bool {
        self.dead[tile]
    }

    /// Number of consistent layouts of the remaining markers.
    #[must_use]
    pub fn solutions(&self) -> &BigUint {
        &self.solutions
    }

    /// Highest safety among tiles worth playing.
    ///
    /// A box counts only if it is certainly safe or holds a tile that is not
    /// dead.
    #[must_use]
    pub fn best_safety(&self) -> Safety {
        self.best_safety
    }

    /// Covered non-marker tiles with their safety, in scan order.
    pub fn covered_safeties(&self) -> impl Iterator<Item = (TileIndex, Safety)> + '_ {
        self.constraints
            .covered()
            .iter()
            .filter_map(|&t| self.safety(t).map(|s| (t, s)))
    }

    /// Number of covered tiles that are provably clear.
    #[must_use]
    pub fn certain_safe_count(&self) -> usize {
        self.covered_safeties()
            .filter(|(_, s)| s.is_certain_safe())
            .count()
    }

    /// Covered, non-dead tiles that are not certain markers.
    pub fn living_tiles(&self) -> impl Iterator<Item = (TileIndex, Safety)> + '_ {
        self.covered_safeties()
            .filter(|&(t, s)| !self.dead[t] && !s.is_certain_mine())
    }
}
