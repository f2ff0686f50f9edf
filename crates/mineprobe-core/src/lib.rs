//! Core data structures for minesweeper-style boards.
//!
//! This crate provides the board snapshot that the solver reads and the game
//! simulation produces. It knows nothing about probabilities; it only models
//! what is visible on a board and how tiles relate to each other.
//!
//! # Overview
//!
//! - [`coord`]: tile coordinates and the flat tile index used everywhere else
//! - [`board`]: the board snapshot ([`Board`]) and per-tile [`CellState`]
//! - [`speculation`]: a scoped overlay for "what-if" cell states that is
//!   reverted when it goes out of scope
//!
//! # Examples
//!
//! ```
//! use mineprobe_core::{Board, CellState, Coord};
//!
//! let board = Board::from_ascii(
//!     "
//!     1..
//!     ...
//!     ",
//!     1,
//! )?;
//!
//! let origin = board.index_of(Coord::new(0, 0));
//! assert_eq!(board.cell(origin), CellState::Revealed(1));
//! assert_eq!(board.neighbors(origin).len(), 3);
//! # Ok::<(), mineprobe_core::BoardError>(())
//! ```

pub use self::{
    board::{Board, CellState, MAX_CLUE, MAX_SIDE},
    coord::{Coord, TileIndex},
    error::BoardError,
    speculation::Speculation,
};

pub mod board;
pub mod coord;
mod error;
pub mod speculation;
