use std::time::Instant;

use mineprobe_core::{Board, CellState, TileIndex};
use num_traits::Zero as _;

use crate::{
    Analysis, Binomial, EffectiveOptions, InconsistencyKind, Safety, SolveError, SolveRequest,
    SolveResponse, SolverConfig, TileReport, brute_force,
    constraint::Constraints,
    dead::DeadCandidate,
    engine::ProbabilityEngine,
    enumerate, fifty_fifty, tie_break,
};

/// Why a tile was recommended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::IsVariant)]
pub enum PlayReason {
    /// Part of a guess that no amount of logic can avoid.
    #[display("unavoidable guess")]
    UnavoidableGuess,
    /// First move of the best decision tree over all solutions.
    #[display("decision tree")]
    DecisionTree,
    /// Best one-move lookahead among near-tied candidates.
    #[display("tie-break")]
    TieBreak,
    /// Highest safety.
    #[display("safest tile")]
    Safest,
}

/// Everything [`Solver::solve`] found out about a board.
#[derive(Debug, Clone)]
pub struct SolveOutcome {
    /// Exact safeties.
    pub analysis: Analysis,
    /// The recommended guess. `None` when a certainly safe tile exists or
    /// nothing is left to reveal.
    pub play: Option<(TileIndex, PlayReason)>,
    /// One report per unrevealed tile, safest first.
    pub tiles: Vec<TileReport>,
}

/// The solver: configuration plus the shared binomial tables.
///
/// Build one per process and reuse it for every request.
///
/// # Examples
///
/// ```
/// use mineprobe_core::Board;
/// use mineprobe_solver::{EffectiveOptions, Solver};
///
/// let solver = Solver::default();
/// let board = Board::from_ascii(
///     "
///     1.
///     ..
///     ",
///     1,
/// )?;
/// let analysis = solver.analyze(&board, &EffectiveOptions::default())?;
/// let safety = analysis.safety(1).map(|s| s.to_string());
/// assert_eq!(safety.as_deref(), Some("0.666667"));
/// assert_eq!(analysis.solutions().to_string(), "3");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct Solver {
    config: SolverConfig,
    binomial: Binomial,
}

impl Default for Solver {
    fn default() -> Self {
        Self::new(SolverConfig::default())
    }
}

impl Solver {
    /// Creates a solver and builds its binomial tables.
    #[must_use]
    pub fn new(config: SolverConfig) -> Self {
        let binomial = Binomial::new(config.binomial_max, config.binomial_lookup);
        Self { config, binomial }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Returns the shared binomial calculator.
    #[must_use]
    pub fn binomial(&self) -> &Binomial {
        &self.binomial
    }

    /// Computes exact safeties for every covered tile.
    ///
    /// Runs constraint extraction, propagation and aggregation, plus dead
    /// tile analysis when enabled. No guess is chosen.
    ///
    /// # Errors
    ///
    /// Returns [`SolveError::InvalidInput`] for malformed boards,
    /// [`SolveError::Inconsistent`] when no marker layout fits the clues and
    /// [`SolveError::Arithmetic`] when the board is too large for the
    /// binomial tables.
    pub fn analyze(&self, board: &Board, options: &EffectiveOptions) -> Result<Analysis, SolveError> {
        let constraints = Constraints::extract(board)?;
        let level = options.diagnostic_level();

        if constraints.witnesses().is_empty() {
            let mines_left = constraints.mines_left();
            let covered = constraints.covered().len();
            let solutions = self.binomial.generate(mines_left, covered)?;
            let safety = Safety::from_uniform(mines_left, covered);
            log::log!(level, "no witnesses: {covered} covered tiles at safety {safety}");
            return Ok(Analysis::new(constraints, Vec::new(), safety, solutions, &[]));
        }

        let candidates = if options.dead_tile_analysis {
            DeadCandidate::collect(board, &constraints)
        } else {
            Vec::new()
        };
        let output = ProbabilityEngine::new(
            &constraints,
            &self.binomial,
            candidates,
            self.config.dead_analysis_max_lines,
            level,
        )
        .run()?;
        if output.solutions.is_zero() {
            return Err(InconsistencyKind::NoSolutions.into());
        }

        Ok(Analysis::new(
            constraints,
            output.box_safety,
            output.off_edge_safety,
            output.solutions,
            &output.dead,
        ))
    }

    /// Analyzes a board and, when no tile is certainly safe, recommends a
    /// guess.
    ///
    /// The board is only modified temporarily, by speculative analyses, and
    /// is restored before this returns.
    ///
    /// # Errors
    ///
    /// See [`Solver::analyze`].
    pub fn solve(&self, board: &mut Board, options: &EffectiveOptions) -> Result<SolveOutcome, SolveError> {
        let start = Instant::now();
        let level = options.diagnostic_level();

        let analysis = self.analyze(board, options)?;
        let play = if analysis.best_safety().is_certain_safe() || analysis.constraints().covered().is_empty() {
            None
        } else {
            self.choose_guess(board, &analysis, options)?
        };
        if let Some((tile, reason)) = play {
            log::log!(level, "play {} ({reason})", board.coord_of(tile));
        }

        let tiles = report(board, &analysis, play.map(|(t, _)| t));
        log::log!(
            level,
            "solved in {:?}: best safety {}, {} solutions",
            start.elapsed(),
            analysis.best_safety(),
            analysis.solutions()
        );
        Ok(SolveOutcome {
            analysis,
            play,
            tiles,
        })
    }

    /// Solves a request and converts every failure into a `valid: false`
    /// response.
    #[must_use]
    pub fn solve_request(&self, request: &SolveRequest) -> SolveResponse {
        let result = request
            .to_board()
            .map_err(SolveError::from)
            .and_then(|mut board| {
                let options = self.config.resolve(&request.options);
                self.solve(&mut board, &options)
            });
        match result {
            Ok(outcome) => SolveResponse::success(outcome.tiles),
            Err(error) => {
                log::debug!("request rejected: {error}");
                SolveResponse::failure(&error)
            }
        }
    }

    fn choose_guess(
        &self,
        board: &mut Board,
        analysis: &Analysis,
        options: &EffectiveOptions,
    ) -> Result<Option<(TileIndex, PlayReason)>, SolveError> {
        let level = options.diagnostic_level();

        if options.fifty_fifty_check
            && let Some(tile) = fifty_fifty::find_unavoidable_guess(self, board, analysis, options)?
        {
            return Ok(Some((tile, PlayReason::UnavoidableGuess)));
        }

        if options.brute_force_threshold > 0
            && let Some(solutions) = enumerate::enumerate(
                board,
                analysis,
                options.brute_force_threshold,
                self.config.brute_force_max_cycles,
            )
        {
            let locations = analysis.constraints().covered();
            let result = brute_force::search(
                &solutions,
                locations,
                self.config.brute_force_max_nodes,
                self.config.brute_force_tree_depth,
            );
            if result.complete
                && let Some(tile) = result.best
            {
                log::log!(
                    level,
                    "decision tree wins {} of {} solutions",
                    result.winning_lines,
                    result.solutions
                );
                if options.verbose {
                    let lines = brute_force::strategy(
                        board,
                        &solutions,
                        locations,
                        self.config.brute_force_max_nodes,
                        self.config.brute_force_tree_depth,
                    );
                    for line in lines {
                        log::info!("{line}");
                    }
                }
                return Ok(Some((tile, PlayReason::DecisionTree)));
            }
            log::log!(level, "decision tree search incomplete, falling back");
        }

        if options.tie_break
            && let Some(tile) = tie_break::choose(self, board, analysis, options)?
        {
            return Ok(Some((tile, PlayReason::TieBreak)));
        }

        let by_safety =
            |a: &(TileIndex, Safety), b: &(TileIndex, Safety)| a.1.cmp(&b.1).then(b.0.cmp(&a.0));
        let tile = analysis
            .living_tiles()
            .max_by(by_safety)
            .or_else(|| analysis.covered_safeties().max_by(by_safety));
        Ok(tile.map(|(t, _)| (t, PlayReason::Safest)))
    }
}

fn report(board: &Board, analysis: &Analysis, play: Option<TileIndex>) -> Vec<TileReport> {
    let mut tiles: Vec<TileReport> = board
        .cells()
        .filter_map(|(tile, state)| {
            let safety = match state {
                CellState::Revealed(_) => return None,
                CellState::Mine => Safety::ZERO,
                CellState::Clear => Safety::ONE,
                CellState::Covered => analysis.safety(tile)?,
            };
            let coord = board.coord_of(tile);
            Some(TileReport {
                x: coord.x(),
                y: coord.y(),
                safety,
                mine: state == CellState::Mine || analysis.constraints().is_mine(tile),
                dead: analysis.is_dead(tile),
                play: play == Some(tile),
            })
        })
        .collect();
    // stable: equal safeties stay in scan order
    tiles.sort_by(|a, b| b.safety.cmp(&a.safety));
    tiles
}
