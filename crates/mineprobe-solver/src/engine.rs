//! Constraint propagation over boxes.
//!
//! The engine walks the witness graph one witness at a time. It holds a set
//! of [`ProbabilityLine`]s, each standing for every layout that places the
//! same number of markers in each processed box. Processing a witness
//! distributes its missing markers over its newly exposed boxes; afterwards
//! lines that agree on every box still touching an unprocessed witness are
//! merged, which keeps the line count polynomial.
//!
//! When no unprocessed witness touches a processed box, the current
//! independent edge is closed: its lines are convolved with the lines of
//! earlier edges, grouped by total marker count. Finally every line is
//! spread over the off-edge tiles with an exact binomial coefficient to
//! produce per-box marker tallies.

use std::{cmp::Ordering, mem};

use log::Level;
use num_bigint::BigUint;
use num_traits::{One as _, Zero as _};

use crate::{
    Binomial, Safety, SolveError,
    binomial::SMALL_COMBINATIONS,
    constraint::{BoxId, Constraints, WitnessId},
    dead::{DeadCandidate, Liveness},
};

/// One class of partial layouts with identical per-box marker counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ProbabilityLine {
    mine_count: usize,
    solution_count: BigUint,
    /// Per box: `solution_count * markers in the box`, summed over merged
    /// lines.
    mine_box_count: Vec<BigUint>,
    allocated: Vec<u8>,
}

impl ProbabilityLine {
    fn new(boxes: usize, solution_count: BigUint) -> Self {
        Self {
            mine_count: 0,
            solution_count,
            mine_box_count: vec![BigUint::zero(); boxes],
            allocated: vec![0; boxes],
        }
    }

    /// Markers this line places in a box.
    pub(crate) fn allocated(&self, id: BoxId) -> u8 {
        self.allocated[id]
    }
}

/// Raw results of a propagation run.
#[derive(Debug, Clone)]
pub(crate) struct EngineOutput {
    pub(crate) box_safety: Vec<Safety>,
    pub(crate) off_edge_safety: Safety,
    pub(crate) solutions: BigUint,
    pub(crate) dead: Vec<usize>,
}

/// Propagation state for a single query.
#[derive(Debug)]
pub(crate) struct ProbabilityEngine<'a> {
    constraints: &'a Constraints,
    binomial: &'a Binomial,
    level: Level,
    max_dead_lines: usize,
    witness_processed: Vec<bool>,
    box_processed: Vec<bool>,
    box_edge: Vec<usize>,
    edge: usize,
    held: Vec<ProbabilityLine>,
    working: Vec<ProbabilityLine>,
    candidates: Vec<DeadCandidate>,
    track_dead: bool,
}

impl<'a> ProbabilityEngine<'a> {
    /// Prepares an engine. Pass an empty `candidates` list to skip dead tile
    /// analysis.
    pub(crate) fn new(
        constraints: &'a Constraints,
        binomial: &'a Binomial,
        candidates: Vec<DeadCandidate>,
        max_dead_lines: usize,
        level: Level,
    ) -> Self {
        let boxes = constraints.boxes().len();
        Self {
            constraints,
            binomial,
            level,
            max_dead_lines,
            witness_processed: vec![false; constraints.witnesses().len()],
            box_processed: vec![false; boxes],
            box_edge: vec![usize::MAX; boxes],
            edge: 0,
            held: vec![ProbabilityLine::new(boxes, BigUint::one())],
            working: vec![ProbabilityLine::new(boxes, BigUint::one())],
            track_dead: !candidates.is_empty(),
            candidates,
        }
    }

    /// Processes every witness and aggregates the result.
    pub(crate) fn run(mut self) -> Result<EngineOutput, SolveError> {
        let mut next = self.first_unprocessed();
        while let Some(witness) = next {
            self.merge(witness);
            next = self.next_witness();
        }
        self.aggregate()
    }

    fn first_unprocessed(&self) -> Option<WitnessId> {
        self.witness_processed.iter().position(|&done| !done)
    }

    /// Picks the frontier witness with the fewest unprocessed boxes, closing
    /// the edge when the frontier is empty.
    fn next_witness(&mut self) -> Option<WitnessId> {
        let mut best: Option<(usize, WitnessId)> = None;
        for (id, tile_box) in self.constraints.boxes().iter().enumerate() {
            if !self.box_processed[id] {
                continue;
            }
            for &w in tile_box.witnesses() {
                if self.witness_processed[w] {
                    continue;
                }
                let todo = self.constraints.witnesses()[w]
                    .boxes()
                    .iter()
                    .filter(|&&b| !self.box_processed[b])
                    .count();
                if todo == 0 {
                    return Some(w);
                }
                if best.is_none_or(|(best_todo, _)| todo < best_todo) {
                    best = Some((todo, w));
                }
            }
        }
        if let Some((_, w)) = best {
            return Some(w);
        }

        self.close_edge();
        let next = self.first_unprocessed();
        if next.is_some() {
            log::trace!("starting independent edge {}", self.edge);
        }
        next
    }

    fn merge(&mut self, witness: WitnessId) {
        let constraints = self.constraints;
        let wit = &constraints.witnesses()[witness];
        let (old, new): (Vec<BoxId>, Vec<BoxId>) = wit
            .boxes()
            .iter()
            .partition(|&&b| self.box_processed[b]);

        let mut extended = Vec::new();
        for line in mem::take(&mut self.working) {
            let placed: usize = old.iter().map(|&b| usize::from(line.allocated[b])).sum();
            let Some(missing) = wit.mines_to_find().checked_sub(placed) else {
                continue;
            };
            if missing == 0 {
                extended.push(line);
            } else if !new.is_empty() {
                self.distribute(&line, &new, missing, 0, &mut extended);
            }
        }

        self.witness_processed[witness] = true;
        for &b in &new {
            self.box_processed[b] = true;
            self.box_edge[b] = self.edge;
        }

        self.check_candidates(&extended);
        let key = self.merge_key();
        let before = extended.len();
        self.working = crunch(extended, &key);
        log::trace!(
            "{before} probability lines compressed to {}",
            self.working.len()
        );

        if self.track_dead && self.working.len() > self.max_dead_lines {
            log::log!(
                self.level,
                "{} working lines exceed {}; dead tile analysis abandoned",
                self.working.len(),
                self.max_dead_lines
            );
            self.abandon_dead_analysis();
        }
    }

    fn distribute(
        &self,
        line: &ProbabilityLine,
        new: &[BoxId],
        missing: usize,
        index: usize,
        out: &mut Vec<ProbabilityLine>,
    ) {
        let id = new[index];
        let tile_box = &self.constraints.boxes()[id];

        if index + 1 == new.len() {
            if tile_box.max_mines() < missing
                || tile_box.min_mines() > missing
                || line.mine_count + missing > self.constraints.mines_left()
            {
                return;
            }
            out.push(self.extend(line, id, missing));
            return;
        }

        let most = tile_box.max_mines().min(missing);
        for placed in tile_box.min_mines()..=most {
            let next = self.extend(line, id, placed);
            self.distribute(&next, new, missing - placed, index + 1, out);
        }
    }

    fn extend(&self, line: &ProbabilityLine, id: BoxId, mines: usize) -> ProbabilityLine {
        let size = self.constraints.boxes()[id].tiles().len();
        let combination = SMALL_COMBINATIONS[size][mines];
        let solution_count = &line.solution_count * combination;

        let mut mine_box_count = if combination == 1 {
            line.mine_box_count.clone()
        } else {
            line.mine_box_count.iter().map(|c| c * combination).collect()
        };
        mine_box_count[id] = &solution_count * mines;

        let mut allocated = line.allocated.clone();
        allocated[id] = u8::try_from(mines).unwrap_or(u8::MAX);

        ProbabilityLine {
            mine_count: line.mine_count + mines,
            solution_count,
            mine_box_count,
            allocated,
        }
    }

    /// Boxes whose allocation must survive line merging: boxes on the
    /// frontier plus processed boxes of pending dead candidates.
    fn merge_key(&self) -> Vec<BoxId> {
        let mut in_key = vec![false; self.box_processed.len()];
        for (id, tile_box) in self.constraints.boxes().iter().enumerate() {
            let processed = tile_box.witnesses().iter().any(|&w| self.witness_processed[w]);
            let pending = tile_box.witnesses().iter().any(|&w| !self.witness_processed[w]);
            in_key[id] = processed && pending;
        }
        if self.track_dead {
            for candidate in &self.candidates {
                if !candidate.liveness().is_pending() {
                    continue;
                }
                for b in candidate.boxes() {
                    if self.box_processed[b] {
                        in_key[b] = true;
                    }
                }
            }
        }
        in_key
            .iter()
            .enumerate()
            .filter(|&(_, &k)| k)
            .map(|(id, _)| id)
            .collect()
    }

    fn check_candidates(&mut self, lines: &[ProbabilityLine]) {
        if !self.track_dead {
            return;
        }
        for candidate in &mut self.candidates {
            if !candidate.liveness().is_pending()
                || !candidate.boxes().all(|b| self.box_processed[b])
            {
                continue;
            }
            let liveness = if candidate.boxes().all(|b| self.box_edge[b] == self.edge) {
                candidate.evaluate(lines)
            } else {
                Liveness::Alive
            };
            candidate.set_liveness(liveness);
        }
    }

    fn abandon_dead_analysis(&mut self) {
        for candidate in &mut self.candidates {
            if candidate.liveness().is_pending() {
                candidate.set_liveness(Liveness::Alive);
            }
        }
        self.track_dead = false;
    }

    fn close_edge(&mut self) {
        log::trace!(
            "closing independent edge {} with {} lines",
            self.edge,
            self.working.len()
        );
        if self.track_dead {
            for candidate in &mut self.candidates {
                if candidate.liveness().is_pending()
                    && candidate.boxes().any(|b| self.box_edge[b] == self.edge)
                {
                    // spans several edges, allocations of the others are gone
                    candidate.set_liveness(Liveness::Alive);
                }
            }
        }
        self.store();
        self.working = vec![ProbabilityLine::new(
            self.box_processed.len(),
            BigUint::one(),
        )];
        self.edge += 1;
    }

    /// Convolves the lines of the closed edge with the held lines.
    fn store(&mut self) {
        let max_total = self.constraints.mines_left();
        let boxes = self.box_processed.len();
        let mut result = Vec::new();
        for line in &self.working {
            for held in &self.held {
                let mine_count = line.mine_count + held.mine_count;
                if mine_count > max_total {
                    continue;
                }
                let mine_box_count = line
                    .mine_box_count
                    .iter()
                    .zip(&held.mine_box_count)
                    .map(|(a, b)| a * &held.solution_count + b * &line.solution_count)
                    .collect();
                result.push(ProbabilityLine {
                    mine_count,
                    solution_count: &line.solution_count * &held.solution_count,
                    mine_box_count,
                    allocated: vec![0; boxes],
                });
            }
        }
        self.held = crunch(result, &[]);
    }

    fn aggregate(self) -> Result<EngineOutput, SolveError> {
        let constraints = self.constraints;
        let mines_left = constraints.mines_left();
        let off_edge = constraints.off_edge().len();
        let min_total = mines_left.saturating_sub(off_edge);

        let mut tally = vec![BigUint::zero(); constraints.boxes().len()];
        let mut total = BigUint::zero();
        let mut outside = BigUint::zero();
        for line in &self.held {
            if line.mine_count < min_total {
                continue;
            }
            let Some(rest) = mines_left.checked_sub(line.mine_count) else {
                continue;
            };
            let mult = self.binomial.generate(rest, off_edge)?;
            outside += &mult * rest * &line.solution_count;
            total += &mult * &line.solution_count;
            for (id, tile_box) in constraints.boxes().iter().enumerate() {
                tally[id] += &mult * &line.mine_box_count[id] / tile_box.tiles().len();
            }
        }

        let box_safety = tally
            .iter()
            .map(|t| Safety::from_mine_tally(t, &total))
            .collect();
        let off_edge_safety = if off_edge == 0 || total.is_zero() {
            Safety::ZERO
        } else {
            Safety::from_mine_tally(&outside, &(&total * off_edge))
        };
        let dead = self
            .candidates
            .iter()
            .filter(|c| c.liveness().is_dead())
            .map(DeadCandidate::tile)
            .collect();

        log::log!(
            self.level,
            "{} edges, off edge safety {off_edge_safety}, {total} candidate solutions",
            self.edge
        );

        Ok(EngineOutput {
            box_safety,
            off_edge_safety,
            solutions: total,
            dead,
        })
    }
}

/// Sorts lines by marker count and the allocation of `key` boxes, then
/// merges lines that agree on both.
fn crunch(mut lines: Vec<ProbabilityLine>, key: &[BoxId]) -> Vec<ProbabilityLine> {
    let compare = |a: &ProbabilityLine, b: &ProbabilityLine| -> Ordering {
        a.mine_count.cmp(&b.mine_count).then_with(|| {
            key.iter()
                .map(|&k| a.allocated[k].cmp(&b.allocated[k]))
                .find(|o| o.is_ne())
                .unwrap_or(Ordering::Equal)
        })
    };
    lines.sort_by(compare);

    let mut result: Vec<ProbabilityLine> = Vec::with_capacity(lines.len());
    for line in lines {
        match result.last_mut() {
            Some(current) if compare(current, &line).is_eq() => {
                current.solution_count += line.solution_count;
                for (sum, add) in current.mine_box_count.iter_mut().zip(line.mine_box_count) {
                    *sum += add;
                }
            }
            _ => result.push(line),
        }
    }
    result
}
