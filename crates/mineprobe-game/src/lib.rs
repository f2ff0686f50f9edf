//! Minesweeper game simulation for exercising the solver.
//!
//! A [`Minefield`] holds a hidden mine layout, generated reproducibly from a
//! [`GameSeed`], and the player's view of it as a
//! [`Board`](mineprobe_core::Board). The view can be turned into a
//! [`SolveRequest`](mineprobe_solver::SolveRequest) at any time, and
//! [`Minefield::autoplay`] plays a whole game with the solver while checking
//! every certainty it reports against the real layout.
//!
//! # Examples
//!
//! ```
//! use mineprobe_core::Coord;
//! use mineprobe_game::{GameSeed, Minefield, StartRule};
//! use mineprobe_solver::{SolveOptions, Solver};
//!
//! let seed = GameSeed::from_phrase("doc");
//! let mut field = Minefield::generate(8, 8, 10, Coord::new(0, 0), StartRule::Zero, seed)?;
//! let record = field.autoplay(&Solver::default(), &SolveOptions::default(), 1_000)?;
//! assert!(!record.status.is_in_play());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub use self::{
    autoplay::GameRecord,
    error::{AutoplayError, GameError, ParseSeedError},
    game::{GameStatus, Minefield, RevealOutcome, StartRule},
    seed::GameSeed,
};

mod autoplay;
mod error;
mod game;
mod seed;
