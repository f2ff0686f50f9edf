use mineprobe_core::BoardError;

use crate::GameStatus;

/// Errors raised while setting up or playing a minefield.
#[derive(
    Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::From,
)]
pub enum GameError {
    /// The requested board is malformed.
    #[display("{_0}")]
    #[from]
    Board(BoardError),
    /// The start rule leaves too few tiles to place every mine.
    #[display("cannot place {mines} mines in {free} free tiles")]
    NoRoomForMines {
        /// Mines requested.
        mines: usize,
        /// Tiles outside the protected start area.
        free: usize,
    },
    /// The mine layout does not match the board dimensions.
    #[display("layout has {actual} tiles but the board has {expected}")]
    LayoutSize {
        /// Tiles on the board.
        expected: usize,
        /// Tiles in the layout.
        actual: usize,
    },
    /// A move was made after the game ended.
    #[display("the game is already over ({_0})")]
    GameOver(#[error(not(source))] GameStatus),
}

/// Errors raised while parsing a [`GameSeed`](crate::GameSeed) from hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ParseSeedError {
    /// The text is not 64 characters long.
    #[display("seed must be 64 hex digits, got {_0} characters")]
    InvalidLength(#[error(not(source))] usize),
    /// The text contains a character that is not a hex digit.
    #[display("seed contains a non-hex character")]
    InvalidDigit,
}

/// A self-play game that could not be completed, or that caught the solver
/// contradicting the real layout.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum AutoplayError {
    /// The minefield rejected a move.
    #[display("{_0}")]
    #[from]
    Game(GameError),
    /// The solver answered `valid: false`.
    #[display("solver rejected the position: {_0}")]
    Rejected(#[error(not(source))] String),
    /// A tile reported certainly safe hides a mine.
    #[display("tile ({x},{y}) was reported safe but is a mine")]
    SafeTileIsMine {
        /// Column.
        x: usize,
        /// Row.
        y: usize,
    },
    /// A tile reported certainly a mine is clear.
    #[display("tile ({x},{y}) was reported as a mine but is clear")]
    MineTileIsClear {
        /// Column.
        x: usize,
        /// Row.
        y: usize,
    },
    /// The game did not finish within the move limit.
    #[display("game did not finish after {_0} moves")]
    MoveLimit(#[error(not(source))] usize),
}
