//! Test utilities for solver scenarios.
//!
//! This module provides [`PositionTester`], a testing harness that solves a
//! board drawn as ASCII art and checks the per-tile results.
//!
//! # Example
//!
//! ```ignore
//! PositionTester::from_ascii(
//!     "
//!     1.
//!     ..
//!     ",
//!     1,
//! )
//! .solve()
//! .assert_safety(1, 1, "0.666667");
//! ```

use mineprobe_core::{Board, Coord};

use crate::{SolveError, SolveOptions, SolveOutcome, SolveResponse, Solver, SolverConfig, TileReport};

/// A test harness for solver scenarios.
///
/// # Method Chaining
///
/// All methods return `self`, enabling fluent method chaining for readable tests.
///
/// # Panics
///
/// All assertion methods panic with detailed messages on failure, using
/// `#[track_caller]` to report the correct source location.
#[derive(Debug)]
pub struct PositionTester {
    board: Board,
    config: SolverConfig,
    options: SolveOptions,
    result: Option<Result<SolveOutcome, SolveError>>,
}

impl PositionTester {
    /// Creates a tester from a board drawing, see [`Board::from_ascii`].
    ///
    /// # Panics
    ///
    /// Panics if the drawing cannot be parsed.
    #[track_caller]
    pub fn from_ascii(text: &str, mines: usize) -> Self {
        Self {
            board: Board::from_ascii(text, mines).unwrap(),
            config: SolverConfig::default(),
            options: SolveOptions::default(),
            result: None,
        }
    }

    /// Replaces the request options.
    #[must_use]
    pub fn with_options(mut self, options: SolveOptions) -> Self {
        self.options = options;
        self
    }

    /// Replaces the solver configuration.
    #[must_use]
    pub fn with_config(mut self, config: SolverConfig) -> Self {
        self.config = config;
        self
    }

    /// Solves the board and keeps the result for the assertions.
    ///
    /// # Panics
    ///
    /// Panics if solving modified the board.
    #[track_caller]
    pub fn solve(mut self) -> Self {
        let solver = Solver::new(self.config.clone());
        let options = self.config.resolve(&self.options);
        let before = self.board.clone();
        let result = solver.solve(&mut self.board, &options);
        assert_eq!(self.board, before, "Expected the board to be restored after solving");
        self.result = Some(result);
        self
    }

    #[track_caller]
    fn outcome(&self) -> &SolveOutcome {
        match &self.result {
            Some(Ok(outcome)) => outcome,
            Some(Err(e)) => panic!("Expected a solution, but solving failed: {e}"),
            None => panic!("Expected solve() to be called before asserting"),
        }
    }

    #[track_caller]
    fn report(&self, x: usize, y: usize) -> &TileReport {
        let outcome = self.outcome();
        outcome
            .tiles
            .iter()
            .find(|t| t.x == x && t.y == y)
            .unwrap_or_else(|| panic!("Expected a report for {}, but there is none", Coord::new(x, y)))
    }

    /// Asserts the reported safety of a tile.
    #[track_caller]
    pub fn assert_safety(self, x: usize, y: usize, expected: &str) -> Self {
        let report = self.report(x, y);
        assert_eq!(
            report.safety.to_string(),
            expected,
            "Expected safety {expected} at {}, got {}",
            Coord::new(x, y),
            report.safety
        );
        self
    }

    /// Asserts that a tile is reported as a known marker.
    #[track_caller]
    pub fn assert_mine(self, x: usize, y: usize) -> Self {
        let report = self.report(x, y);
        assert!(
            report.mine && report.safety.is_certain_mine(),
            "Expected a marker at {}, got {report:?}",
            Coord::new(x, y)
        );
        self
    }

    /// Asserts that a tile is reported dead.
    #[track_caller]
    pub fn assert_dead(self, x: usize, y: usize) -> Self {
        let report = self.report(x, y);
        assert!(report.dead, "Expected {} to be dead, got {report:?}", Coord::new(x, y));
        self
    }

    /// Asserts that a tile is not reported dead.
    #[track_caller]
    pub fn assert_not_dead(self, x: usize, y: usize) -> Self {
        let report = self.report(x, y);
        assert!(!report.dead, "Expected {} to be alive, got {report:?}", Coord::new(x, y));
        self
    }

    /// Asserts that exactly this tile is the recommended move.
    #[track_caller]
    pub fn assert_play(self, x: usize, y: usize) -> Self {
        let played: Vec<&TileReport> = self.outcome().tiles.iter().filter(|t| t.play).collect();
        assert_eq!(played.len(), 1, "Expected exactly one play, got {played:?}");
        assert_eq!(
            (played[0].x, played[0].y),
            (x, y),
            "Expected play at {}, got {:?}",
            Coord::new(x, y),
            self.outcome().play
        );
        self
    }

    /// Asserts that no move is recommended.
    #[track_caller]
    pub fn assert_no_play(self) -> Self {
        let outcome = self.outcome();
        assert!(
            outcome.play.is_none() && outcome.tiles.iter().all(|t| !t.play),
            "Expected no play, got {:?}",
            outcome.play
        );
        self
    }

    /// Asserts the number of tile reports.
    #[track_caller]
    pub fn assert_report_count(self, expected: usize) -> Self {
        let count = self.outcome().tiles.len();
        assert_eq!(count, expected, "Expected {expected} tile reports, got {count}");
        self
    }

    /// Asserts that solving failed with a message containing `needle`.
    #[track_caller]
    pub fn assert_invalid(self, needle: &str) -> Self {
        let Some(Err(error)) = &self.result else {
            panic!("Expected solving to fail, got {:?}", self.result);
        };
        let response = SolveResponse::failure(error);
        let message = response.message.unwrap_or_default();
        assert!(
            message.contains(needle),
            "Expected failure message containing {needle:?}, got {message:?}"
        );
        assert!(!response.valid && response.tiles.is_empty());
        self
    }
}
