//! Constraint extraction and equivalence partition.
//!
//! Turns a [`Board`] into the solver's working model:
//!
//! - trivially forced markers (a clue with exactly as many unrevealed
//!   neighbours as its value),
//! - [`Witness`]es: clues that still constrain covered tiles,
//! - [`TileBox`]es: covered tiles grouped by their identical set of adjacent
//!   witnesses.
//!
//! Witnesses and boxes live in dense arrays and refer to each other by index.

use std::collections::{HashMap, HashSet};

use mineprobe_core::{Board, BoardError, CellState, MAX_CLUE, TileIndex};

use crate::{InconsistencyKind, SolveError};

/// Index of a witness in [`Constraints::witnesses`].
pub type WitnessId = usize;

/// Index of a box in [`Constraints::boxes`].
pub type BoxId = usize;

/// A revealed clue that still needs markers placed around it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Witness {
    tile: TileIndex,
    mines_to_find: usize,
    tiles: Vec<TileIndex>,
    boxes: Vec<BoxId>,
}

impl Witness {
    /// The clue tile.
    #[must_use]
    pub fn tile(&self) -> TileIndex {
        self.tile
    }

    /// Markers still to be placed among [`Witness::tiles`].
    #[must_use]
    pub fn mines_to_find(&self) -> usize {
        self.mines_to_find
    }

    /// Covered, unconfirmed neighbours, in scan order.
    #[must_use]
    pub fn tiles(&self) -> &[TileIndex] {
        &self.tiles
    }

    /// Adjacent boxes, in ascending id order.
    #[must_use]
    pub fn boxes(&self) -> &[BoxId] {
        &self.boxes
    }
}

/// Covered tiles sharing exactly the same adjacent witnesses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileBox {
    tiles: Vec<TileIndex>,
    witnesses: Vec<WitnessId>,
    min_mines: usize,
    max_mines: usize,
}

impl TileBox {
    /// Member tiles, in the order they were witnessed.
    #[must_use]
    pub fn tiles(&self) -> &[TileIndex] {
        &self.tiles
    }

    /// Adjacent witnesses, in ascending id order.
    #[must_use]
    pub fn witnesses(&self) -> &[WitnessId] {
        &self.witnesses
    }

    /// Fewest markers the box can hold.
    #[must_use]
    pub fn min_mines(&self) -> usize {
        self.min_mines
    }

    /// Most markers the box can hold.
    #[must_use]
    pub fn max_mines(&self) -> usize {
        self.max_mines
    }
}

/// Everything the probability engine needs to know about a board.
#[derive(Debug, Clone)]
pub struct Constraints {
    board_len: usize,
    is_mine: Vec<bool>,
    trivial_mines: Vec<TileIndex>,
    covered: Vec<TileIndex>,
    mines_left: usize,
    witnesses: Vec<Witness>,
    pruned: Vec<WitnessId>,
    witnessed: Vec<TileIndex>,
    boxes: Vec<TileBox>,
    box_of: Vec<Option<BoxId>>,
    off_edge: Vec<TileIndex>,
}

impl Constraints {
    /// Extracts witnesses and boxes from a board.
    ///
    /// # Errors
    ///
    /// Returns [`SolveError::InvalidInput`] for clue values above 8 and
    /// [`SolveError::Inconsistent`] when a clue cannot be satisfied or the
    /// marker budget does not fit the covered tiles.
    pub fn extract(board: &Board) -> Result<Self, SolveError> {
        let mut is_mine: Vec<bool> = board.cells().map(|(_, c)| c == CellState::Mine).collect();

        let mut trivial_mines = Vec::new();
        let mut unsatisfied = Vec::new();
        for (index, state) in board.cells() {
            let Some(value) = state.clue() else {
                continue;
            };
            if value > MAX_CLUE {
                let coord = board.coord_of(index);
                return Err(BoardError::ClueOutOfRange {
                    x: coord.x(),
                    y: coord.y(),
                    value: i64::from(value),
                }
                .into());
            }
            let neighbors = board.neighbors(index);
            let unrevealed = neighbors
                .iter()
                .filter(|&&n| matches!(board.cell(n), CellState::Covered | CellState::Mine))
                .count();
            if usize::from(value) == unrevealed {
                for &n in &neighbors {
                    if board.cell(n) == CellState::Covered && !is_mine[n] {
                        is_mine[n] = true;
                        trivial_mines.push(n);
                    }
                }
            } else {
                unsatisfied.push(index);
            }
        }

        let confirmed = is_mine.iter().filter(|&&m| m).count();
        if confirmed > board.mines() {
            return Err(InconsistencyKind::TooManyConfirmed {
                confirmed,
                total: board.mines(),
            }
            .into());
        }
        let mines_left = board.mines() - confirmed;

        let covered: Vec<TileIndex> = board
            .cells()
            .filter(|&(i, c)| c == CellState::Covered && !is_mine[i])
            .map(|(i, _)| i)
            .collect();
        if mines_left > covered.len() {
            return Err(InconsistencyKind::NotEnoughRoom {
                left: mines_left,
                covered: covered.len(),
            }
            .into());
        }

        let mut witnesses = Vec::with_capacity(unsatisfied.len());
        let mut witness_at = vec![None; board.len()];
        for index in unsatisfied {
            let value = board.cell(index).clue().map_or(0, i64::from);
            let mut adjacent_mines = 0i64;
            let mut tiles = Vec::new();
            for n in board.neighbors(index) {
                if is_mine[n] {
                    adjacent_mines += 1;
                } else if board.cell(n) == CellState::Covered {
                    tiles.push(n);
                }
            }
            let needed = value - adjacent_mines;
            let Some(mines_to_find) = usize::try_from(needed).ok().filter(|&m| m <= tiles.len())
            else {
                let coord = board.coord_of(index);
                return Err(InconsistencyKind::UnsatisfiableClue {
                    x: coord.x(),
                    y: coord.y(),
                    needed,
                    available: tiles.len(),
                }
                .into());
            };
            if tiles.is_empty() {
                continue;
            }
            witness_at[index] = Some(witnesses.len());
            witnesses.push(Witness {
                tile: index,
                mines_to_find,
                tiles,
                boxes: Vec::new(),
            });
        }

        let mut seen_sets = HashSet::new();
        let pruned: Vec<WitnessId> = witnesses
            .iter()
            .enumerate()
            .filter(|(_, w)| {
                let mut set = w.tiles.clone();
                set.sort_unstable();
                seen_sets.insert(set)
            })
            .map(|(id, _)| id)
            .collect();

        let mut witnessed = Vec::new();
        let mut is_witnessed = vec![false; board.len()];
        for witness in &witnesses {
            for &tile in &witness.tiles {
                if !is_witnessed[tile] {
                    is_witnessed[tile] = true;
                    witnessed.push(tile);
                }
            }
        }

        let mut boxes: Vec<TileBox> = Vec::new();
        let mut box_of = vec![None; board.len()];
        let mut by_witness_set: HashMap<Vec<WitnessId>, BoxId> = HashMap::new();
        for &tile in &witnessed {
            // neighbours come back in ascending index order, so the key is sorted
            let key: Vec<WitnessId> = board
                .neighbors(tile)
                .iter()
                .filter_map(|&n| witness_at[n])
                .collect();
            let id = *by_witness_set.entry(key).or_insert_with_key(|key| {
                let id = boxes.len();
                for &w in key {
                    witnesses[w].boxes.push(id);
                }
                boxes.push(TileBox {
                    tiles: Vec::new(),
                    witnesses: key.clone(),
                    min_mines: 0,
                    max_mines: 0,
                });
                id
            });
            boxes[id].tiles.push(tile);
            box_of[tile] = Some(id);
        }

        for tile_box in &mut boxes {
            tile_box.max_mines = tile_box
                .witnesses
                .iter()
                .map(|&w| witnesses[w].mines_to_find)
                .fold(tile_box.tiles.len().min(mines_left), usize::min);
        }

        let off_edge = covered
            .iter()
            .copied()
            .filter(|&t| !is_witnessed[t])
            .collect();

        log::trace!(
            "extracted {} witnesses ({} after pruning), {} boxes, {} trivial markers",
            witnesses.len(),
            pruned.len(),
            boxes.len(),
            trivial_mines.len()
        );

        Ok(Self {
            board_len: board.len(),
            is_mine,
            trivial_mines,
            covered,
            mines_left,
            witnesses,
            pruned,
            witnessed,
            boxes,
            box_of,
            off_edge,
        })
    }

    /// Number of tiles on the board.
    #[must_use]
    pub fn board_len(&self) -> usize {
        self.board_len
    }

    /// Returns `true` for confirmed and trivially forced markers.
    #[must_use]
    pub fn is_mine(&self, tile: TileIndex) -> bool {
        self.is_mine[tile]
    }

    /// Markers forced by a clue with no spare covered neighbours.
    #[must_use]
    pub fn trivial_mines(&self) -> &[TileIndex] {
        &self.trivial_mines
    }

    /// Covered tiles that are not known markers.
    #[must_use]
    pub fn covered(&self) -> &[TileIndex] {
        &self.covered
    }

    /// Markers not yet accounted for.
    #[must_use]
    pub fn mines_left(&self) -> usize {
        self.mines_left
    }

    /// All witnesses, in scan order.
    #[must_use]
    pub fn witnesses(&self) -> &[Witness] {
        &self.witnesses
    }

    /// Witnesses with duplicate tile sets removed.
    #[must_use]
    pub fn pruned_witnesses(&self) -> &[WitnessId] {
        &self.pruned
    }

    /// Covered tiles next to at least one witness.
    #[must_use]
    pub fn witnessed(&self) -> &[TileIndex] {
        &self.witnessed
    }

    /// The equivalence partition of [`Constraints::witnessed`].
    #[must_use]
    pub fn boxes(&self) -> &[TileBox] {
        &self.boxes
    }

    /// The box holding a tile, if it is witnessed.
    #[must_use]
    pub fn box_of(&self, tile: TileIndex) -> Option<BoxId> {
        self.box_of[tile]
    }

    /// Covered tiles with no adjacent witness.
    #[must_use]
    pub fn off_edge(&self) -> &[TileIndex] {
        &self.off_edge
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(text: &str, mines: usize) -> Result<Constraints, SolveError> {
        Constraints::extract(&Board::from_ascii(text, mines).unwrap())
    }

    #[test]
    fn test_trivial_mines() {
        let c = extract(
            "
            1.
            ..
            ",
            1,
        )
        .unwrap();
        assert!(c.trivial_mines().is_empty());
        assert_eq!(c.witnesses().len(), 1);

        let c = extract(
            "
            11.
            1..
            ...
            ",
            1,
        )
        .unwrap();
        // (1,1) is the only unrevealed neighbour of (0,0)
        assert_eq!(c.trivial_mines(), &[4]);
        assert_eq!(c.mines_left(), 0);
        assert!(c.is_mine(4));
    }

    #[test]
    fn test_boxes_partition_witnessed_tiles() {
        let c = extract(
            "
            ....
            .21.
            ....
            ",
            3,
        )
        .unwrap();
        assert_eq!(c.witnesses().len(), 2);
        let mut seen: Vec<TileIndex> = c.boxes().iter().flat_map(|b| b.tiles().to_vec()).collect();
        seen.sort_unstable();
        let mut witnessed = c.witnessed().to_vec();
        witnessed.sort_unstable();
        assert_eq!(seen, witnessed);
        // left-only, shared, right-only
        assert_eq!(c.boxes().len(), 3);
        for tile_box in c.boxes() {
            assert!(tile_box.max_mines() <= tile_box.tiles().len());
            for &tile in tile_box.tiles() {
                assert_eq!(c.box_of(tile).map(|b| &c.boxes()[b]), Some(tile_box));
            }
        }
        assert!(c.off_edge().is_empty());
    }

    #[test]
    fn test_duplicate_witnesses_are_pruned() {
        let c = extract(
            "
            1..1
            1..1
            ",
            2,
        )
        .unwrap();
        assert_eq!(c.witnesses().len(), 4);
        // the two clues on each side see the same two tiles
        assert_eq!(c.pruned_witnesses().len(), 2);
    }

    #[test]
    fn test_box_bounds_use_tightest_witness() {
        let c = extract(
            "
            1...
            ....
            ",
            3,
        )
        .unwrap();
        assert_eq!(c.boxes().len(), 1);
        assert_eq!(c.boxes()[0].max_mines(), 1);
        assert_eq!(c.boxes()[0].min_mines(), 0);
        assert_eq!(c.off_edge().len(), 4);
    }

    #[test]
    fn test_inconsistent_inputs() {
        assert!(extract("3.\n..", 3).is_ok());
        assert!(matches!(
            extract("4.\n..", 3),
            Err(SolveError::Inconsistent(InconsistencyKind::UnsatisfiableClue {
                x: 0,
                y: 0,
                needed: 4,
                available: 3
            }))
        ));
        assert!(matches!(
            extract("**.", 1),
            Err(SolveError::Inconsistent(InconsistencyKind::TooManyConfirmed {
                confirmed: 2,
                total: 1
            }))
        ));
        assert!(matches!(
            extract("0..", 3),
            Err(SolveError::Inconsistent(InconsistencyKind::NotEnoughRoom {
                left: 3,
                covered: 2
            }))
        ));
    }

    #[test]
    fn test_clear_cells_are_not_candidates() {
        let c = extract("_1.", 1).unwrap();
        assert_eq!(c.trivial_mines(), &[2]);
        assert!(c.covered().is_empty());
    }
}
