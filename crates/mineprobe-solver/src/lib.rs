//! Exact probability solver for minesweeper-style boards.
//!
//! Given a board snapshot, the solver finds every tile that is provably a
//! marker or provably clear, computes the exact probability that each
//! remaining tile is clear, and recommends a guess when no tile is certain.
//!
//! # Overview
//!
//! - [`Solver`]: entry point; owns the [`SolverConfig`] and the shared
//!   [`Binomial`] tables
//! - [`Solver::analyze`]: exact safeties ([`Analysis`]) for one board
//! - [`Solver::solve`]: analysis plus a recommended guess ([`SolveOutcome`])
//! - [`Solver::solve_request`]: the JSON contract ([`SolveRequest`] in,
//!   [`SolveResponse`] out), with every failure turned into a response
//! - [`constraint`]: witnesses and boxes extracted from a board
//!
//! # Examples
//!
//! ```
//! use mineprobe_core::{Board, Coord};
//! use mineprobe_solver::{Solver, SolverConfig};
//!
//! let solver = Solver::new(SolverConfig::default());
//! let mut board = Board::from_ascii(
//!     "
//!     ...
//!     11.
//!     ",
//!     1,
//! )?;
//!
//! let options = solver.config().resolve(&Default::default());
//! let outcome = solver.solve(&mut board, &options)?;
//! let corner = board.index_of(Coord::new(2, 0));
//! assert!(outcome.analysis.safety(corner).is_some_and(|s| s.is_certain_safe()));
//! assert!(outcome.play.is_none());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub use self::{
    analysis::Analysis,
    binomial::{Binomial, PrimeSieve},
    config::{EffectiveOptions, SolveOptions, SolverConfig},
    error::{ArithmeticError, InconsistencyKind, SolveError},
    request::{BoardSpec, SolveRequest, SolveResponse, TileReport, TileSpec},
    safety::{ParseSafetyError, Safety},
    solver::{PlayReason, SolveOutcome, Solver},
};

mod analysis;
mod binomial;
mod brute_force;
mod config;
pub mod constraint;
mod dead;
mod engine;
mod enumerate;
mod error;
mod fifty_fifty;
mod request;
mod safety;
mod solver;
mod tie_break;

#[cfg(test)]
mod testing;
