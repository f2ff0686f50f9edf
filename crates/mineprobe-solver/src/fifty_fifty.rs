//! Unavoidable guess detection.
//!
//! Two shapes are recognised:
//!
//! - **Link chains.** A clue needing one marker among exactly two tiles links
//!   them. Links sharing tiles form a chain whose markers alternate. If the
//!   chain has an even number of tiles and nothing outside it can tell the
//!   two alternations apart, no amount of logic will resolve it.
//! - **Isolated 2×2 blocks.** A block of covered tiles whose twelve
//!   surrounding cells are all revealed, known markers or off the board can
//!   only be resolved from inside. Every marker pattern is tested by
//!   speculation; a tile left clear by some feasible pattern is preferred.

use std::collections::VecDeque;

use mineprobe_core::{Board, CellState, Coord, TileIndex};

use crate::{Analysis, EffectiveOptions, SolveError, Solver};

/// A clue needing exactly one marker among exactly two ambiguous tiles.
#[derive(Debug, Clone, Copy)]
struct Link {
    tiles: [TileIndex; 2],
}

impl Link {
    fn other(self, tile: TileIndex) -> Option<TileIndex> {
        match self.tiles {
            [a, b] if a == tile => Some(b),
            [a, b] if b == tile => Some(a),
            _ => None,
        }
    }
}

fn is_ambiguous(analysis: &Analysis, tile: TileIndex) -> bool {
    analysis
        .safety(tile)
        .is_some_and(|s| !s.is_certain_safe() && !s.is_certain_mine())
}

fn links(analysis: &Analysis) -> Vec<Link> {
    let constraints = analysis.constraints();
    constraints
        .pruned_witnesses()
        .iter()
        .map(|&w| &constraints.witnesses()[w])
        .filter(|w| w.mines_to_find() == 1 && w.tiles().len() == 2)
        .filter(|w| w.tiles().iter().all(|&t| is_ambiguous(analysis, t)))
        .map(|w| Link {
            tiles: [w.tiles()[0], w.tiles()[1]],
        })
        .collect()
}

/// Grows a chain from `links[start]` in both directions.
fn grow_chain(links: &[Link], used: &mut [bool], start: usize) -> VecDeque<TileIndex> {
    used[start] = true;
    let mut chain: VecDeque<TileIndex> = links[start].tiles.into_iter().collect();
    for at_back in [true, false] {
        loop {
            let end = if at_back { chain.back() } else { chain.front() };
            let Some(&end) = end else { break };
            let next = links
                .iter()
                .enumerate()
                .filter(|&(i, _)| !used[i])
                .find_map(|(i, link)| link.other(end).map(|t| (i, t)));
            let Some((i, tile)) = next else { break };
            used[i] = true;
            if chain.contains(&tile) {
                break;
            }
            if at_back {
                chain.push_back(tile);
            } else {
                chain.push_front(tile);
            }
        }
    }
    chain
}

/// A chain cannot be resolved if every covered tile and every clue next to
/// it sees as many even-position tiles as odd-position ones.
fn is_balanced(board: &Board, analysis: &Analysis, chain: &VecDeque<TileIndex>) -> bool {
    let constraints = analysis.constraints();
    let parity = |cell: TileIndex| -> isize {
        chain
            .iter()
            .enumerate()
            .filter(|&(_, &t)| board.is_adjacent(cell, t))
            .map(|(i, _)| if i % 2 == 0 { 1 } else { -1 })
            .sum()
    };

    let mut checked = vec![false; board.len()];
    for &tile in chain {
        checked[tile] = true;
    }
    for &tile in chain {
        for n in board.neighbors(tile) {
            if checked[n] {
                continue;
            }
            checked[n] = true;
            let observer = match board.cell(n) {
                CellState::Covered => !constraints.is_mine(n),
                CellState::Revealed(_) => true,
                CellState::Mine | CellState::Clear => false,
            };
            if observer && parity(n) != 0 {
                return false;
            }
        }
    }
    true
}

fn find_chain(board: &Board, analysis: &Analysis) -> Option<TileIndex> {
    let links = links(analysis);
    let mut used = vec![false; links.len()];
    for start in 0..links.len() {
        if used[start] {
            continue;
        }
        let chain = grow_chain(&links, &mut used, start);
        if chain.len() % 2 != 0 || !is_balanced(board, analysis, &chain) {
            continue;
        }
        log::debug!("unavoidable guess over a chain of {} tiles", chain.len());
        return chain
            .iter()
            .copied()
            .max_by(|&a, &b| analysis.safety(a).cmp(&analysis.safety(b)).then(b.cmp(&a)));
    }
    None
}

fn block_at(board: &Board, analysis: &Analysis, x: usize, y: usize) -> Option<[TileIndex; 4]> {
    let constraints = analysis.constraints();
    let block = [
        board.index_of(Coord::new(x, y)),
        board.index_of(Coord::new(x + 1, y)),
        board.index_of(Coord::new(x, y + 1)),
        board.index_of(Coord::new(x + 1, y + 1)),
    ];
    if block
        .iter()
        .any(|&t| board.cell(t) != CellState::Covered || constraints.is_mine(t))
    {
        return None;
    }
    if !block.iter().any(|&t| is_ambiguous(analysis, t)) {
        return None;
    }

    for ry in y.saturating_sub(1)..=(y + 2).min(board.height() - 1) {
        for rx in x.saturating_sub(1)..=(x + 2).min(board.width() - 1) {
            let tile = board.index_of(Coord::new(rx, ry));
            if block.contains(&tile) {
                continue;
            }
            let quiet = match board.cell(tile) {
                CellState::Revealed(_) | CellState::Mine => true,
                CellState::Covered => constraints.is_mine(tile),
                CellState::Clear => false,
            };
            if !quiet {
                return None;
            }
        }
    }
    Some(block)
}

fn find_block(
    solver: &Solver,
    board: &mut Board,
    analysis: &Analysis,
    options: &EffectiveOptions,
) -> Result<Option<TileIndex>, SolveError> {
    let mines_left = analysis.constraints().mines_left();
    let speculation = options.for_speculation();

    for y in 0..board.height().saturating_sub(1) {
        for x in 0..board.width().saturating_sub(1) {
            let Some(block) = block_at(board, analysis, x, y) else {
                continue;
            };

            let mut feasible = 0usize;
            let mut mine_in = [0usize; 4];
            for mask in 1u8..15 {
                if usize::try_from(mask.count_ones()).unwrap_or(usize::MAX) > mines_left {
                    continue;
                }
                let changes = block.iter().enumerate().map(|(i, &t)| {
                    let state = if mask & (1 << i) == 0 {
                        CellState::Clear
                    } else {
                        CellState::Mine
                    };
                    (t, state)
                });
                let overlay = board.speculate(changes);
                match solver.analyze(&overlay, &speculation) {
                    Ok(_) => {
                        feasible += 1;
                        for (i, count) in mine_in.iter_mut().enumerate() {
                            if mask & (1 << i) != 0 {
                                *count += 1;
                            }
                        }
                    }
                    Err(SolveError::Inconsistent(_)) => {}
                    Err(e) => return Err(e),
                }
            }

            let Some((i, &fewest)) = mine_in
                .iter()
                .enumerate()
                .min_by_key(|&(i, &count)| (count, i))
            else {
                continue;
            };
            if feasible > 0 && fewest < feasible {
                log::debug!(
                    "isolated 2x2 block at {}: {feasible} feasible patterns",
                    Coord::new(x, y)
                );
                return Ok(Some(block[i]));
            }
        }
    }
    Ok(None)
}

/// Looks for a tile that has to be guessed sooner or later.
///
/// # Errors
///
/// Propagates arithmetic failures from speculative analyses.
pub(crate) fn find_unavoidable_guess(
    solver: &Solver,
    board: &mut Board,
    analysis: &Analysis,
    options: &EffectiveOptions,
) -> Result<Option<TileIndex>, SolveError> {
    if let Some(tile) = find_chain(board, analysis) {
        return Ok(Some(tile));
    }
    find_block(solver, board, analysis, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(text: &str, mines: usize) -> (Solver, Board, Analysis) {
        let solver = Solver::default();
        let board = Board::from_ascii(text, mines).unwrap();
        let analysis = solver.analyze(&board, &EffectiveOptions::default()).unwrap();
        (solver, board, analysis)
    }

    #[test]
    fn test_enclosed_pair_is_unavoidable() {
        let (_, board, analysis) = setup(
            "
            ..
            11
            ",
            1,
        );
        assert_eq!(find_chain(&board, &analysis), Some(0));
    }

    #[test]
    fn test_pair_with_outside_observer_is_not() {
        // (2,0) touches only one of the pair
        let (_, board, analysis) = setup(
            "
            ...
            11.
            ",
            1,
        );
        assert_eq!(find_chain(&board, &analysis), None);
    }

    #[test]
    fn test_closed_chain_of_four_is_unavoidable() {
        // each side clue needs one marker between two block tiles
        let (_, board, analysis) = setup(
            "
            *22*
            2..2
            2..2
            *22*
            ",
            6,
        );
        assert_eq!(find_chain(&board, &analysis), Some(board.index_of(Coord::new(1, 1))));
    }

    #[test]
    fn test_chain_seen_by_covered_tile_is_not() {
        // (0,0) is provably clear and sees only (1,1) of the chain
        let (_, board, analysis) = setup(
            "
            .12*
            1..2
            2..2
            *22*
            ",
            5,
        );
        let corner = board.index_of(Coord::new(0, 0));
        assert!(analysis.safety(corner).is_some_and(|s| s.is_certain_safe()));
        assert!(is_ambiguous(&analysis, board.index_of(Coord::new(1, 1))));
        assert_eq!(find_chain(&board, &analysis), None);
    }

    #[test]
    fn test_block_with_diagonal_patterns_picks_a_tile() {
        // only the two diagonal patterns satisfy the surrounding clues
        let (solver, mut board, analysis) = setup(
            "
            *22*
            2..2
            2..2
            *22*
            ",
            6,
        );
        let options = EffectiveOptions::default();
        let tile = find_block(&solver, &mut board, &analysis, &options).unwrap();
        assert_eq!(tile, Some(board.index_of(Coord::new(1, 1))));
        assert_eq!(board.count(CellState::Covered), 4);
        assert_eq!(board.count(CellState::Mine), 4);
    }

    #[test]
    fn test_block_pinned_by_clues_is_skipped() {
        // the clues leave a single pattern: a marker on (1,1)
        let (solver, mut board, analysis) = setup(
            "
            *22*
            2..1
            2..1
            *11*
            ",
            5,
        );
        assert!(
            analysis
                .safety(board.index_of(Coord::new(1, 1)))
                .is_some_and(|s| s.is_certain_mine())
        );
        let options = EffectiveOptions::default();
        assert_eq!(
            find_block(&solver, &mut board, &analysis, &options).unwrap(),
            None
        );
        assert_eq!(find_chain(&board, &analysis), None);
    }

    #[test]
    fn test_isolated_block_picks_a_tile() {
        let (solver, mut board, analysis) = setup(
            "
            ****
            *..*
            *..*
            ****
            ",
            13,
        );
        let options = EffectiveOptions::default();
        let tile = find_block(&solver, &mut board, &analysis, &options).unwrap();
        assert_eq!(tile, Some(board.index_of(Coord::new(1, 1))));
        // speculation is rolled back
        assert_eq!(board.count(CellState::Covered), 4);
    }

    #[test]
    fn test_block_with_a_covered_neighbour_is_skipped() {
        let (solver, mut board, analysis) = setup(
            "
            ***.*
            *..**
            *..**
            *****
            ",
            16,
        );
        let options = EffectiveOptions::default();
        assert_eq!(
            find_block(&solver, &mut board, &analysis, &options).unwrap(),
            None
        );
    }
}
