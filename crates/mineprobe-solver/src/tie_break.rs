//! Secondary safety for near-tied candidates.
//!
//! Each candidate is scored by looking one move ahead: for every clue value
//! it could show, the board is re-analysed with that clue revealed, and the
//! best safety of the resulting position is weighted by how many solutions
//! show that value. A candidate whose clearing alone already proves other
//! tiles safe is scored from a single speculation instead.

use mineprobe_core::{Board, CellState, TileIndex};
use num_bigint::BigUint;
use num_traits::Zero as _;

use crate::{Analysis, EffectiveOptions, Safety, SolveError, Solver, safety::ratio};

/// Relative secondary-safety gap inside which a safer candidate wins.
const DOMINANCE_MARGIN: f64 = 0.001;

#[derive(Debug, Clone, Copy)]
struct Scored {
    tile: TileIndex,
    safety: Safety,
    secondary: f64,
    clears: f64,
}

fn candidates(solver: &Solver, analysis: &Analysis) -> Vec<(TileIndex, Safety)> {
    let config = solver.config();
    let floor = analysis.best_safety().as_f64() * config.tie_break_fraction;
    let mut candidates: Vec<(TileIndex, Safety)> = analysis
        .living_tiles()
        .filter(|(_, s)| s.as_f64() >= floor)
        .collect();
    candidates.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    candidates.truncate(config.tie_break_max_candidates);
    candidates
}

/// Speculatively clears `tile` without giving it a clue; returns how many
/// other covered tiles become certainly safe.
///
/// The count is taken over the whole board, so tiles freed through the
/// global marker count are included, not only those next to `tile`. A
/// positive count lets [`score`] skip the per-clue speculations.
fn newly_safe_if_clear(
    solver: &Solver,
    board: &mut Board,
    analysis: &Analysis,
    tile: TileIndex,
    options: &EffectiveOptions,
) -> Result<usize, SolveError> {
    let overlay = board.speculate([(tile, CellState::Clear)]);
    match solver.analyze(&overlay, options) {
        Ok(after) => Ok(after
            .certain_safe_count()
            .saturating_sub(analysis.certain_safe_count())),
        Err(SolveError::Inconsistent(_)) => Ok(0),
        Err(e) => Err(e),
    }
}

fn score(
    solver: &Solver,
    board: &mut Board,
    analysis: &Analysis,
    tile: TileIndex,
    safety: Safety,
    options: &EffectiveOptions,
) -> Result<Scored, SolveError> {
    let p = safety.as_f64();

    let newly_safe = newly_safe_if_clear(solver, board, analysis, tile, options)?;
    if newly_safe > 0 {
        #[expect(clippy::cast_precision_loss)]
        let clears = p * newly_safe as f64;
        return Ok(Scored {
            tile,
            safety,
            secondary: p,
            clears,
        });
    }

    let constraints = analysis.constraints();
    let neighbors = board.neighbors(tile);
    let known = neighbors.iter().filter(|&&n| constraints.is_mine(n)).count();
    let open = neighbors
        .iter()
        .filter(|&&n| board.cell(n) == CellState::Covered && !constraints.is_mine(n))
        .count();

    let mut outcomes: Vec<(BigUint, f64, usize)> = Vec::new();
    for value in known..=known + open {
        let Ok(clue) = u8::try_from(value) else {
            break;
        };
        let overlay = board.speculate([(tile, CellState::Revealed(clue))]);
        match solver.analyze(&overlay, options) {
            Ok(after) => {
                let best = if after.constraints().covered().is_empty() {
                    1.0
                } else {
                    after.best_safety().as_f64()
                };
                outcomes.push((after.solutions().clone(), best, after.certain_safe_count()));
            }
            Err(SolveError::Inconsistent(_)) => {}
            Err(e) => return Err(e),
        }
    }

    let total: BigUint = outcomes.iter().map(|(s, _, _)| s).sum();
    let (mut secondary, mut clears) = (0.0, 0.0);
    if !total.is_zero() {
        for (solutions, best, safe) in &outcomes {
            let weight = ratio(solutions, &total);
            secondary += weight * best;
            #[expect(clippy::cast_precision_loss)]
            let safe = *safe as f64;
            clears += weight * safe;
        }
    }
    Ok(Scored {
        tile,
        safety,
        secondary: p * secondary,
        clears: p * clears,
    })
}

/// Ranks near-tied candidates and returns the preferred one.
///
/// Returns `None` when fewer than two candidates are close enough to the
/// best safety to be worth comparing.
///
/// # Errors
///
/// Propagates arithmetic failures from speculative analyses.
pub(crate) fn choose(
    solver: &Solver,
    board: &mut Board,
    analysis: &Analysis,
    options: &EffectiveOptions,
) -> Result<Option<TileIndex>, SolveError> {
    let candidates = candidates(solver, analysis);
    if candidates.len() < 2 {
        return Ok(None);
    }

    let speculation = options.for_speculation();
    let level = options.diagnostic_level();
    let mut scored = Vec::with_capacity(candidates.len());
    for (tile, safety) in candidates {
        let s = score(solver, board, analysis, tile, safety, &speculation)?;
        log::log!(
            level,
            "tie-break {}: safety {}, secondary {:.6}, expected clears {:.3}",
            board.coord_of(tile),
            s.safety,
            s.secondary,
            s.clears
        );
        scored.push(s);
    }

    scored.sort_by(|a, b| {
        b.secondary
            .total_cmp(&a.secondary)
            .then(b.clears.total_cmp(&a.clears))
            .then(b.safety.cmp(&a.safety))
            .then(a.tile.cmp(&b.tile))
    });

    let top = scored[0];
    let cutoff = top.secondary * (1.0 - DOMINANCE_MARGIN);
    let safer = scored
        .iter()
        .filter(|s| s.secondary >= cutoff && s.safety > top.safety)
        .max_by(|a, b| a.safety.cmp(&b.safety).then(b.tile.cmp(&a.tile)));
    Ok(Some(safer.map_or(top.tile, |s| s.tile)))
}
