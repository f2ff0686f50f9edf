//! Exhaustive enumeration of small solution spaces.
//!
//! Marker layouts are generated like an odometer: one
//! [`SequentialIterator`] per independent witness (no two share a tile) and
//! a final one spreading the remaining markers over every other covered
//! tile. Each layout is checked against the dependent witnesses; survivors
//! become [`Solution`]s, the clue every covered tile would show.

use mineprobe_core::{Board, TileIndex};
use num_bigint::BigUint;
use num_traits::{One as _, ToPrimitive as _};

use crate::{
    Analysis, Binomial,
    constraint::{Constraints, WitnessId},
};

/// Value recorded for a tile that holds a marker.
pub(crate) const MINE: u8 = 9;

/// The clue each location would show, or [`MINE`].
pub(crate) type Solution = Vec<u8>;

/// Every `k`-subset of `0..n` in lexicographic order.
#[derive(Debug, Clone)]
pub(crate) struct SequentialIterator {
    n: usize,
    current: Vec<usize>,
}

impl SequentialIterator {
    /// Starts at the first subset, `0..k`. Returns `None` when `k > n`.
    pub(crate) fn new(k: usize, n: usize) -> Option<Self> {
        (k <= n).then(|| Self {
            n,
            current: (0..k).collect(),
        })
    }

    pub(crate) fn current(&self) -> &[usize] {
        &self.current
    }

    /// Steps to the next subset. At the end it wraps to the first subset
    /// and returns `false`.
    pub(crate) fn advance(&mut self) -> bool {
        let k = self.current.len();
        let Some(i) = (0..k).rev().find(|&i| self.current[i] < self.n - k + i) else {
            for (i, slot) in self.current.iter_mut().enumerate() {
                *slot = i;
            }
            return false;
        };
        self.current[i] += 1;
        for j in i + 1..k {
            self.current[j] = self.current[j - 1] + 1;
        }
        true
    }
}

/// One wheel of the odometer.
#[derive(Debug, Clone)]
struct Cog {
    tiles: Vec<TileIndex>,
    iter: SequentialIterator,
}

/// Odometer over independent witnesses plus everything else.
#[derive(Debug, Clone)]
pub(crate) struct WitnessWebIterator {
    cogs: Vec<Cog>,
    independent: Vec<WitnessId>,
    placed: Vec<bool>,
    cycles: BigUint,
}

impl WitnessWebIterator {
    /// Builds the odometer. Returns `None` when the independent witnesses
    /// already need more markers than are left.
    pub(crate) fn new(constraints: &Constraints) -> Option<Self> {
        let mut order: Vec<(BigUint, WitnessId)> = constraints
            .pruned_witnesses()
            .iter()
            .map(|&w| {
                let witness = &constraints.witnesses()[w];
                (
                    Binomial::combination(witness.mines_to_find(), witness.tiles().len()),
                    w,
                )
            })
            .collect();
        order.sort();

        let mut taken = vec![false; constraints.board_len()];
        let mut independent = Vec::new();
        let mut cogs = Vec::new();
        let mut mines = 0;
        for (_, w) in order {
            let witness = &constraints.witnesses()[w];
            if witness.tiles().iter().any(|&t| taken[t]) {
                continue;
            }
            for &t in witness.tiles() {
                taken[t] = true;
            }
            mines += witness.mines_to_find();
            independent.push(w);
            cogs.push(Cog {
                tiles: witness.tiles().to_vec(),
                iter: SequentialIterator::new(witness.mines_to_find(), witness.tiles().len())?,
            });
        }

        let rest: Vec<TileIndex> = constraints
            .covered()
            .iter()
            .copied()
            .filter(|&t| !taken[t])
            .collect();
        let rest_mines = constraints.mines_left().checked_sub(mines)?;
        cogs.push(Cog {
            iter: SequentialIterator::new(rest_mines, rest.len())?,
            tiles: rest,
        });

        let cycles = cogs
            .iter()
            .map(|c| Binomial::combination(c.iter.current().len(), c.tiles.len()))
            .fold(BigUint::one(), |acc, c| acc * c);

        let mut placed = vec![false; constraints.board_len()];
        for cog in &cogs {
            for &i in cog.iter.current() {
                placed[cog.tiles[i]] = true;
            }
        }

        Some(Self {
            cogs,
            independent,
            placed,
            cycles,
        })
    }

    /// Number of layouts the odometer will produce.
    pub(crate) fn cycles(&self) -> &BigUint {
        &self.cycles
    }

    pub(crate) fn independent(&self) -> &[WitnessId] {
        &self.independent
    }

    /// Tiles holding a marker in the current layout.
    pub(crate) fn placed(&self) -> &[bool] {
        &self.placed
    }

    /// Steps to the next layout. Returns `false` once every layout has been
    /// produced.
    pub(crate) fn advance(&mut self) -> bool {
        for cog in self.cogs.iter_mut().rev() {
            for &i in cog.iter.current() {
                self.placed[cog.tiles[i]] = false;
            }
            let carried = !cog.iter.advance();
            for &i in cog.iter.current() {
                self.placed[cog.tiles[i]] = true;
            }
            if !carried {
                return true;
            }
        }
        false
    }
}

/// Checks odometer layouts against the dependent witnesses.
#[derive(Debug)]
pub(crate) struct Cruncher<'a> {
    board: &'a Board,
    constraints: &'a Constraints,
    dependent: Vec<WitnessId>,
}

impl<'a> Cruncher<'a> {
    pub(crate) fn new(board: &'a Board, constraints: &'a Constraints, independent: &[WitnessId]) -> Self {
        let dependent = constraints
            .pruned_witnesses()
            .iter()
            .copied()
            .filter(|w| !independent.contains(w))
            .collect();
        Self {
            board,
            constraints,
            dependent,
        }
    }

    /// Returns the solution for a layout, or `None` if a witness disagrees.
    pub(crate) fn check(&self, placed: &[bool]) -> Option<Solution> {
        for &w in &self.dependent {
            let witness = &self.constraints.witnesses()[w];
            let found = witness.tiles().iter().filter(|&&t| placed[t]).count();
            if found != witness.mines_to_find() {
                return None;
            }
        }

        let solution = self
            .constraints
            .covered()
            .iter()
            .map(|&tile| {
                if placed[tile] {
                    return MINE;
                }
                let around = self
                    .board
                    .neighbors(tile)
                    .iter()
                    .filter(|&&n| placed[n] || self.constraints.is_mine(n))
                    .count();
                u8::try_from(around).unwrap_or(MINE)
            })
            .collect();
        Some(solution)
    }
}

/// Enumerates every solution when there are at most `threshold` of them and
/// the odometer needs at most `max_cycles` steps.
///
/// Solutions are indexed like [`Constraints::covered`].
pub(crate) fn enumerate(
    board: &Board,
    analysis: &Analysis,
    threshold: usize,
    max_cycles: u64,
) -> Option<Vec<Solution>> {
    if analysis.solutions().to_usize().is_none_or(|s| s > threshold) {
        return None;
    }
    let constraints = analysis.constraints();
    let mut web = WitnessWebIterator::new(constraints)?;
    if web.cycles().to_u64().is_none_or(|c| c > max_cycles) {
        log::debug!("enumeration needs {} cycles, skipped", web.cycles());
        return None;
    }

    let cruncher = Cruncher::new(board, constraints, web.independent());
    let mut solutions = Vec::new();
    loop {
        if let Some(solution) = cruncher.check(web.placed()) {
            solutions.push(solution);
        }
        if !web.advance() {
            break;
        }
    }

    if BigUint::from(solutions.len()) != *analysis.solutions() {
        log::warn!(
            "enumerated {} solutions, expected {}",
            solutions.len(),
            analysis.solutions()
        );
    }
    Some(solutions)
}
