//! Dead tile detection.
//!
//! A tile is dead when, across every consistent layout in which it is clear,
//! the clue it would reveal is the same. Picking it can only lose the game,
//! never teach anything.
//!
//! Candidates are witnessed tiles whose every covered neighbour is itself
//! witnessed, so the revealed value is a function of box allocations alone.
//! The probability engine keeps the allocation of every box a pending
//! candidate touches in its line merge key, and calls
//! [`DeadCandidate::evaluate`] as soon as all of the candidate's boxes have
//! been processed.

use mineprobe_core::{Board, CellState, TileIndex};

use crate::{
    constraint::{BoxId, Constraints},
    engine::ProbabilityLine,
};

/// Liveness of a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub(crate) enum Liveness {
    Pending,
    Alive,
    Dead,
}

/// How the other tiles of a candidate's own box sit around it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OwnBox {
    /// Every other tile of the box is adjacent.
    Surrounding,
    /// No other tile of the box is adjacent.
    Detached,
    /// Some are, some are not.
    Partial { adjacent: usize },
}

/// A box next to the candidate, with how many of its tiles are adjacent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct NearBox {
    id: BoxId,
    adjacent: usize,
    size: usize,
}

impl NearBox {
    fn is_good(self) -> bool {
        self.adjacent == self.size
    }
}

/// A witnessed tile whose liveness is being tracked.
#[derive(Debug, Clone)]
pub(crate) struct DeadCandidate {
    tile: TileIndex,
    own_box: BoxId,
    own_size: usize,
    own_kind: OwnBox,
    near: Vec<NearBox>,
    liveness: Liveness,
}

impl DeadCandidate {
    /// Builds candidates for every witnessed tile that has no off-edge
    /// neighbour.
    pub(crate) fn collect(board: &Board, constraints: &Constraints) -> Vec<Self> {
        let mut candidates = Vec::new();
        'tiles: for &tile in constraints.witnessed() {
            let Some(own_box) = constraints.box_of(tile) else {
                continue;
            };
            let mut near: Vec<NearBox> = Vec::new();
            for n in board.neighbors(tile) {
                if constraints.is_mine(n) {
                    continue;
                }
                let Some(id) = constraints.box_of(n) else {
                    if board.cell(n) == CellState::Covered {
                        // an off-edge neighbour can reveal anything
                        continue 'tiles;
                    }
                    continue;
                };
                if id == own_box || near.iter().any(|b| b.id == id) {
                    continue;
                }
                let members = constraints.boxes()[id].tiles();
                near.push(NearBox {
                    id,
                    adjacent: members.iter().filter(|&&m| board.is_adjacent(tile, m)).count(),
                    size: members.len(),
                });
            }

            let own_members = constraints.boxes()[own_box].tiles();
            let others = own_members.len() - 1;
            let adjacent = own_members
                .iter()
                .filter(|&&m| m != tile && board.is_adjacent(tile, m))
                .count();
            let own_kind = if adjacent == others {
                OwnBox::Surrounding
            } else if adjacent == 0 {
                OwnBox::Detached
            } else {
                OwnBox::Partial { adjacent }
            };

            candidates.push(Self {
                tile,
                own_box,
                own_size: own_members.len(),
                own_kind,
                near,
                liveness: Liveness::Pending,
            });
        }
        candidates
    }

    pub(crate) fn tile(&self) -> TileIndex {
        self.tile
    }

    pub(crate) fn liveness(&self) -> Liveness {
        self.liveness
    }

    pub(crate) fn set_liveness(&mut self, liveness: Liveness) {
        self.liveness = liveness;
    }

    /// Every box whose allocation decides the revealed value.
    pub(crate) fn boxes(&self) -> impl Iterator<Item = BoxId> + '_ {
        std::iter::once(self.own_box).chain(self.near.iter().map(|b| b.id))
    }

    /// Decides liveness from lines that carry exact allocations for every
    /// box of this candidate.
    ///
    /// Lines may still include layouts that later constraints rule out;
    /// a value that is constant over a superset is constant over the
    /// final set, so a `Dead` verdict is always sound.
    pub(crate) fn evaluate(&self, lines: &[ProbabilityLine]) -> Liveness {
        let mut seen = None;
        for line in lines {
            let own = usize::from(line.allocated(self.own_box));
            if own == self.own_size {
                // the candidate itself is a marker in every such layout
                continue;
            }
            let mut value = match self.own_kind {
                OwnBox::Surrounding => own,
                OwnBox::Detached => 0,
                OwnBox::Partial { adjacent } => {
                    if own == 0 {
                        0
                    } else if own == self.own_size - 1 {
                        adjacent
                    } else {
                        return Liveness::Alive;
                    }
                }
            };
            for near in &self.near {
                let placed = usize::from(line.allocated(near.id));
                if near.is_good() {
                    value += placed;
                } else if placed == near.size {
                    value += near.adjacent;
                } else if placed != 0 {
                    return Liveness::Alive;
                }
            }
            match seen {
                None => seen = Some(value),
                Some(v) if v != value => return Liveness::Alive,
                Some(_) => {}
            }
        }
        if seen.is_some() {
            Liveness::Dead
        } else {
            Liveness::Alive
        }
    }
}
