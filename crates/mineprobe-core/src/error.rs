/// Errors raised while building or validating a board snapshot.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum BoardError {
    /// Width or height is zero or larger than [`MAX_SIDE`](crate::MAX_SIDE).
    #[display("board dimensions {width}x{height} are not valid")]
    InvalidDimensions {
        /// Requested width.
        width: i64,
        /// Requested height.
        height: i64,
    },
    /// The marker count is negative or larger than the number of tiles.
    #[display("mine count {mines} does not fit a board of {tiles} tiles")]
    TooManyMines {
        /// Requested marker count.
        mines: i64,
        /// Number of tiles on the board.
        tiles: usize,
    },
    /// A tile coordinate lies outside the board.
    #[display("tile ({x},{y}) is outside the board")]
    CoordinateOutOfRange {
        /// Requested column.
        x: i64,
        /// Requested row.
        y: i64,
    },
    /// A revealed clue is outside `0..=8`.
    #[display("tile ({x},{y}) has clue value {value} which is outside 0..=8")]
    ClueOutOfRange {
        /// Column of the tile.
        x: usize,
        /// Row of the tile.
        y: usize,
        /// Supplied clue value.
        value: i64,
    },
    /// The same tile was supplied more than once.
    #[display("tile ({x},{y}) was supplied more than once")]
    DuplicateTile {
        /// Column of the tile.
        x: usize,
        /// Row of the tile.
        y: usize,
    },
    /// ASCII board text could not be parsed.
    #[display("cannot parse board text: {_0}")]
    Parse(#[error(not(source))] &'static str),
}
