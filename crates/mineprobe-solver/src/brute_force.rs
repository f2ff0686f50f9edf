//! Decision-tree search over enumerated solutions.
//!
//! A node is the set of solutions consistent with the clues revealed so far.
//! Its value is the number of solutions in which the game can be finished
//! without another guess ("winning lines"). For every living location (one
//! whose value differs across the node) the solutions are split by the value
//! revealed there; the location's score is the sum of its children's values.
//! Locations are tried in ascending marker count, so among equal scores the
//! one that explodes least often wins.
//!
//! Nodes are memoized by their [`Position`], the vector of revealed values.
//! Only nodes within `cache_depth` reveals of the root are stored; deeper
//! sub-trees are recomputed when met again.

use std::collections::HashMap;

use mineprobe_core::{Board, Coord, TileIndex};

use crate::enumerate::{MINE, Solution};

/// Per location: `0` while unrevealed, `value + 1` once revealed.
type Position = Vec<u8>;

#[derive(Debug, Clone, Copy)]
struct CacheEntry {
    winning_lines: usize,
    best: Option<usize>,
}

/// Outcome of a decision-tree search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BruteForceResult {
    /// Recommended first move.
    pub(crate) best: Option<TileIndex>,
    /// Solutions won by following the tree from `best`.
    pub(crate) winning_lines: usize,
    /// Solutions searched.
    pub(crate) solutions: usize,
    /// `false` when the node budget ran out; the other fields are then
    /// meaningless.
    pub(crate) complete: bool,
}

#[derive(Debug)]
struct Search<'a> {
    solutions: &'a [Solution],
    max_nodes: usize,
    cache_depth: usize,
    nodes: usize,
    aborted: bool,
    cache: HashMap<Position, CacheEntry>,
}

impl Search<'_> {
    fn living(&self, subset: &[usize], position: &[u8]) -> Vec<(usize, usize)> {
        let mut living = Vec::new();
        for (loc, &revealed) in position.iter().enumerate() {
            if revealed != 0 {
                continue;
            }
            let first = self.solutions[subset[0]][loc];
            if subset.iter().all(|&s| self.solutions[s][loc] == first) {
                continue;
            }
            let mines = subset
                .iter()
                .filter(|&&s| self.solutions[s][loc] == MINE)
                .count();
            living.push((mines, loc));
        }
        living.sort_unstable();
        living
    }

    /// Groups the non-marker solutions of `subset` by the value at `loc`.
    fn split(&self, subset: &[usize], loc: usize) -> Vec<(u8, Vec<usize>)> {
        let mut groups: Vec<(u8, Vec<usize>)> = Vec::new();
        for &s in subset {
            let value = self.solutions[s][loc];
            if value == MINE {
                continue;
            }
            match groups.iter_mut().find(|(v, _)| *v == value) {
                Some((_, members)) => members.push(s),
                None => groups.push((value, vec![s])),
            }
        }
        groups.sort_unstable_by_key(|(v, _)| *v);
        groups
    }

    fn node(&mut self, subset: &[usize], position: &mut Position, level: usize) -> usize {
        if subset.len() == 1 {
            return 1;
        }
        if let Some(entry) = self.cache.get(position.as_slice()) {
            return entry.winning_lines;
        }
        self.nodes += 1;
        if self.nodes > self.max_nodes {
            self.aborted = true;
            return 0;
        }

        let mut best = 0;
        let mut best_loc = None;
        for (mines, loc) in self.living(subset, position) {
            if subset.len() - mines <= best {
                break;
            }
            let score = self.location(subset, position, level, loc, best);
            if self.aborted {
                return 0;
            }
            if score > best {
                best = score;
                best_loc = Some(loc);
            }
        }

        if level <= self.cache_depth {
            self.cache.insert(
                position.clone(),
                CacheEntry {
                    winning_lines: best,
                    best: best_loc,
                },
            );
        }
        best
    }

    /// Scores revealing `loc`, giving up once it cannot beat `best`.
    fn location(
        &mut self,
        subset: &[usize],
        position: &mut Position,
        level: usize,
        loc: usize,
        best: usize,
    ) -> usize {
        let groups = self.split(subset, loc);
        let mut remaining: usize = groups.iter().map(|(_, g)| g.len()).sum();
        let mut total = 0;
        for (value, group) in groups {
            remaining -= group.len();
            position[loc] = value + 1;
            total += self.node(&group, position, level + 1);
            position[loc] = 0;
            if self.aborted || total + remaining <= best {
                break;
            }
        }
        total
    }
}

/// Finds the move that wins the most solutions.
///
/// `locations[i]` is the tile behind column `i` of every solution. Nodes
/// deeper than `cache_depth` reveals are not memoized.
pub(crate) fn search(
    solutions: &[Solution],
    locations: &[TileIndex],
    max_nodes: usize,
    cache_depth: usize,
) -> BruteForceResult {
    let all: Vec<usize> = (0..solutions.len()).collect();
    let mut search = Search {
        solutions,
        max_nodes,
        cache_depth,
        nodes: 0,
        aborted: false,
        cache: HashMap::new(),
    };
    let mut position = vec![0; locations.len()];
    let winning_lines = if all.is_empty() {
        0
    } else {
        search.node(&all, &mut position, 0)
    };
    let best = search
        .cache
        .get(position.as_slice())
        .and_then(|e| e.best)
        .map(|loc| locations[loc]);

    log::debug!(
        "decision tree: {} nodes, {} cached positions, {winning_lines}/{} winning lines",
        search.nodes,
        search.cache.len(),
        solutions.len()
    );

    BruteForceResult {
        best,
        winning_lines,
        solutions: solutions.len(),
        complete: !search.aborted,
    }
}

/// Renders the top `depth` levels of the winning strategy.
///
/// Re-runs the search, so it is only worth calling for diagnostics.
pub(crate) fn strategy(
    board: &Board,
    solutions: &[Solution],
    locations: &[TileIndex],
    max_nodes: usize,
    depth: usize,
) -> Vec<String> {
    let mut search = Search {
        solutions,
        max_nodes,
        cache_depth: depth,
        nodes: 0,
        aborted: false,
        cache: HashMap::new(),
    };
    let all: Vec<usize> = (0..solutions.len()).collect();
    let mut position = vec![0; locations.len()];
    if all.is_empty() {
        return Vec::new();
    }
    search.node(&all, &mut position, 0);
    if search.aborted {
        return Vec::new();
    }

    let coords: Vec<Coord> = locations.iter().map(|&t| board.coord_of(t)).collect();
    let mut lines = Vec::new();
    dump(&search, &coords, &all, &mut position, depth, 0, &mut lines);
    lines
}

fn dump(
    search: &Search<'_>,
    coords: &[Coord],
    subset: &[usize],
    position: &mut Position,
    depth: usize,
    level: usize,
    lines: &mut Vec<String>,
) {
    if level >= depth || subset.len() <= 1 {
        return;
    }
    let Some(entry) = search.cache.get(position.as_slice()).copied() else {
        return;
    };
    let Some(loc) = entry.best else {
        return;
    };
    let indent = "  ".repeat(level);
    lines.push(format!(
        "{indent}play {} ({}/{} winning)",
        coords[loc],
        entry.winning_lines,
        subset.len()
    ));
    for (value, group) in search.split(subset, loc) {
        lines.push(format!("{indent}  shows {value}: {} solutions", group.len()));
        position[loc] = value + 1;
        dump(search, coords, &group, position, depth, level + 1, lines);
        position[loc] = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_split_wins_everything() {
        // location 0 separates all three solutions, location 1 is a marker in one
        let solutions = vec![vec![1, 2], vec![2, 2], vec![3, MINE]];
        let result = search(&solutions, &[10, 20], 100, 4);
        assert!(result.complete);
        assert_eq!(result.winning_lines, 3);
        assert_eq!(result.best, Some(10));
    }

    #[test]
    fn test_pure_guess_wins_half() {
        let solutions = vec![vec![MINE, 1], vec![1, MINE]];
        let result = search(&solutions, &[0, 1], 100, 4);
        assert!(result.complete);
        assert_eq!(result.winning_lines, 1);
        assert_eq!(result.best, Some(0));
    }

    #[test]
    fn test_fewer_markers_breaks_ties() {
        // both locations win 2 lines; location 1 is never a marker
        let solutions = vec![vec![MINE, 1], vec![2, 1], vec![3, 2]];
        let result = search(&solutions, &[5, 6], 100, 4);
        assert_eq!(result.winning_lines, 2);
        assert_eq!(result.best, Some(6));
    }

    #[test]
    fn test_node_budget_marks_incomplete() {
        let solutions = vec![vec![MINE, 1, 1], vec![1, MINE, 1], vec![1, 1, MINE]];
        let result = search(&solutions, &[0, 1, 2], 0, 4);
        assert!(!result.complete);
    }

    #[test]
    fn test_shallow_cache_keeps_the_result() {
        // a pair of pure guesses behind one informative location
        let solutions = vec![
            vec![1, MINE, 1, MINE, 1],
            vec![1, 1, MINE, MINE, 1],
            vec![2, MINE, 1, 1, MINE],
            vec![2, 1, MINE, 1, MINE],
            vec![3, 1, 1, MINE, MINE],
        ];
        let locations = [0, 1, 2, 3, 4];
        let deep = search(&solutions, &locations, 1_000, 8);
        let shallow = search(&solutions, &locations, 1_000, 0);
        assert!(deep.complete && shallow.complete);
        assert_eq!(shallow.winning_lines, deep.winning_lines);
        assert_eq!(shallow.best, deep.best);
    }

    #[test]
    fn test_cache_stops_below_depth() {
        let solutions = vec![vec![MINE, 1, 1], vec![1, MINE, 2], vec![2, 2, MINE], vec![1, 1, 1]];
        let all: Vec<usize> = (0..solutions.len()).collect();
        let mut search = Search {
            solutions: &solutions,
            max_nodes: 1_000,
            cache_depth: 0,
            nodes: 0,
            aborted: false,
            cache: HashMap::new(),
        };
        let mut position = vec![0; 3];
        search.node(&all, &mut position, 0);
        assert_eq!(search.cache.len(), 1);
        assert!(search.cache.contains_key([0u8, 0, 0].as_slice()));
    }
}
