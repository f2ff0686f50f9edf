//! Board snapshot and per-tile state.

use std::fmt::{self, Display, Write as _};

use tinyvec::ArrayVec;

use crate::{BoardError, Coord, TileIndex};

/// Largest accepted board width or height.
pub const MAX_SIDE: usize = 1000;

/// Largest value a revealed clue can carry.
pub const MAX_CLUE: u8 = 8;

/// Neighbour offsets in scan order (row above, same row, row below).
const OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// What is known about a single tile.
///
/// Only [`Revealed`](CellState::Revealed) tiles carry clue information.
/// The other three states are all unrevealed tiles; they differ in what the
/// caller asserts about them:
///
/// - [`Covered`](CellState::Covered): nothing is known.
/// - [`Mine`](CellState::Mine): the tile is known to hide a marker.
/// - [`Clear`](CellState::Clear): the tile is asserted to be empty. Used by
///   speculative queries that need a "must be empty" constraint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CellState {
    /// Unrevealed, unknown.
    #[default]
    Covered,
    /// Revealed with the given clue value.
    Revealed(u8),
    /// Unrevealed and known to be a marker.
    Mine,
    /// Unrevealed and asserted to be empty.
    Clear,
}

impl CellState {
    /// Returns `true` for every unrevealed state.
    #[must_use]
    #[inline]
    pub fn is_unrevealed(self) -> bool {
        !matches!(self, Self::Revealed(_))
    }

    /// Returns the clue value of a revealed tile.
    #[must_use]
    #[inline]
    pub fn clue(self) -> Option<u8> {
        match self {
            Self::Revealed(value) => Some(value),
            _ => None,
        }
    }

    fn to_char(self) -> char {
        match self {
            Self::Covered => '.',
            Self::Revealed(value) => char::from(b'0' + value.min(9)),
            Self::Mine => '*',
            Self::Clear => '_',
        }
    }

    fn from_char(c: char) -> Option<Self> {
        match c {
            '.' | '#' => Some(Self::Covered),
            '*' | 'F' => Some(Self::Mine),
            '_' => Some(Self::Clear),
            '0'..='8' => c.to_digit(10).and_then(|d| u8::try_from(d).ok()).map(Self::Revealed),
            _ => None,
        }
    }
}

/// A rectangular board snapshot.
///
/// The board stores its dimensions, the global marker count and one
/// [`CellState`] per tile in row-major order. Tiles are addressed by
/// [`TileIndex`] (`x + y * width`); use [`Board::index_of`] and
/// [`Board::coord_of`] to convert.
///
/// # Examples
///
/// ```
/// use mineprobe_core::{Board, CellState, Coord};
///
/// let mut board = Board::new(4, 3, 2)?;
/// let tile = board.index_of(Coord::new(1, 1));
/// board.set_cell(tile, CellState::Revealed(2));
///
/// assert_eq!(board.len(), 12);
/// assert_eq!(board.neighbors(tile).len(), 8);
/// assert_eq!(board.count_unrevealed(), 11);
/// # Ok::<(), mineprobe_core::BoardError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    width: usize,
    height: usize,
    mines: usize,
    cells: Vec<CellState>,
}

impl Board {
    /// Creates a fully covered board.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::InvalidDimensions`] if either side is zero or
    /// larger than [`MAX_SIDE`], and [`BoardError::TooManyMines`] if `mines`
    /// exceeds the number of tiles.
    pub fn new(width: usize, height: usize, mines: usize) -> Result<Self, BoardError> {
        if !(1..=MAX_SIDE).contains(&width) || !(1..=MAX_SIDE).contains(&height) {
            return Err(BoardError::InvalidDimensions {
                width: to_i64(width),
                height: to_i64(height),
            });
        }
        let tiles = width * height;
        if mines > tiles {
            return Err(BoardError::TooManyMines {
                mines: to_i64(mines),
                tiles,
            });
        }
        Ok(Self {
            width,
            height,
            mines,
            cells: vec![CellState::Covered; tiles],
        })
    }

    /// Parses a board from a compact text drawing.
    ///
    /// Leading and trailing whitespace on every line is ignored, as are
    /// blank lines, so boards can be written as indented string literals.
    ///
    /// | Char | State |
    /// |------|-------|
    /// | `.` or `#` | [`CellState::Covered`] |
    /// | `0`..`8` | [`CellState::Revealed`] |
    /// | `*` or `F` | [`CellState::Mine`] |
    /// | `_` | [`CellState::Clear`] |
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Parse`] for unknown characters, ragged rows or
    /// an empty drawing, plus any error [`Board::new`] can return.
    ///
    /// # Examples
    ///
    /// ```
    /// use mineprobe_core::{Board, CellState, Coord};
    ///
    /// let board = Board::from_ascii(
    ///     "
    ///     *2.
    ///     12.
    ///     ",
    ///     2,
    /// )?;
    /// assert_eq!((board.width(), board.height()), (3, 2));
    /// assert_eq!(board.cell(board.index_of(Coord::new(0, 0))), CellState::Mine);
    /// # Ok::<(), mineprobe_core::BoardError>(())
    /// ```
    pub fn from_ascii(text: &str, mines: usize) -> Result<Self, BoardError> {
        let rows: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        let Some(first) = rows.first() else {
            return Err(BoardError::Parse("board text is empty"));
        };
        let width = first.chars().count();
        if rows.iter().any(|row| row.chars().count() != width) {
            return Err(BoardError::Parse("board rows have different lengths"));
        }

        let mut board = Self::new(width, rows.len(), mines)?;
        for (y, row) in rows.iter().enumerate() {
            for (x, c) in row.chars().enumerate() {
                let state =
                    CellState::from_char(c).ok_or(BoardError::Parse("unknown board character"))?;
                board.cells[x + y * width] = state;
            }
        }
        Ok(board)
    }

    /// Returns the board width.
    #[must_use]
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the board height.
    #[must_use]
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the total number of markers hidden on the board.
    #[must_use]
    #[inline]
    pub fn mines(&self) -> usize {
        self.mines
    }

    /// Returns the number of tiles.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always `false`; boards have at least one tile.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Returns the state of a tile.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    #[must_use]
    #[inline]
    pub fn cell(&self, index: TileIndex) -> CellState {
        self.cells[index]
    }

    /// Overwrites the state of a tile.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    #[inline]
    pub fn set_cell(&mut self, index: TileIndex, state: CellState) {
        self.cells[index] = state;
    }

    /// Iterates over `(index, state)` for every tile in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (TileIndex, CellState)> + '_ {
        self.cells.iter().copied().enumerate()
    }

    /// Converts a coordinate to a tile index.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if the coordinate lies outside the board.
    #[must_use]
    #[inline]
    pub fn index_of(&self, coord: Coord) -> TileIndex {
        debug_assert!(coord.x() < self.width && coord.y() < self.height);
        coord.x() + coord.y() * self.width
    }

    /// Converts a tile index to a coordinate.
    #[must_use]
    #[inline]
    pub fn coord_of(&self, index: TileIndex) -> Coord {
        Coord::new(index % self.width, index / self.width)
    }

    /// Converts untrusted signed coordinates to a tile index.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::CoordinateOutOfRange`] if the coordinate lies
    /// outside the board.
    pub fn checked_index(&self, x: i64, y: i64) -> Result<TileIndex, BoardError> {
        let out_of_range = || BoardError::CoordinateOutOfRange { x, y };
        let col = usize::try_from(x).map_err(|_| out_of_range())?;
        let row = usize::try_from(y).map_err(|_| out_of_range())?;
        if col >= self.width || row >= self.height {
            return Err(out_of_range());
        }
        Ok(col + row * self.width)
    }

    /// Returns the on-board neighbours of a tile, in scan order.
    #[must_use]
    pub fn neighbors(&self, index: TileIndex) -> ArrayVec<[TileIndex; 8]> {
        let (x, y) = (index % self.width, index / self.width);
        let mut out = ArrayVec::new();
        for (dx, dy) in OFFSETS {
            let (Some(nx), Some(ny)) = (x.checked_add_signed(dx), y.checked_add_signed(dy)) else {
                continue;
            };
            if nx < self.width && ny < self.height {
                out.push(nx + ny * self.width);
            }
        }
        out
    }

    /// Returns `true` if two tiles touch, including diagonally.
    #[must_use]
    pub fn is_adjacent(&self, a: TileIndex, b: TileIndex) -> bool {
        self.coord_of(a).is_adjacent(self.coord_of(b))
    }

    /// Counts tiles that have not been revealed (covered, mine or clear).
    #[must_use]
    pub fn count_unrevealed(&self) -> usize {
        self.cells.iter().filter(|c| c.is_unrevealed()).count()
    }

    /// Counts tiles in the given state.
    #[must_use]
    pub fn count(&self, state: CellState) -> usize {
        self.cells.iter().filter(|&&c| c == state).count()
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (y, row) in self.cells.chunks(self.width).enumerate() {
            if y > 0 {
                f.write_char('\n')?;
            }
            for cell in row {
                f.write_char(cell.to_char())?;
            }
        }
        Ok(())
    }
}

fn to_i64(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}
