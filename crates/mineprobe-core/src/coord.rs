//! Tile coordinates.

use std::fmt::{self, Display};

/// Flat index of a tile, `x + y * width`.
///
/// All solver tables are indexed by `TileIndex`; [`Coord`] only appears at the
/// request boundary and in diagnostics.
pub type TileIndex = usize;

/// A tile coordinate on a board.
///
/// `x` grows to the right and `y` grows downwards, matching the request
/// format.
///
/// # Examples
///
/// ```
/// use mineprobe_core::Coord;
///
/// let a = Coord::new(2, 3);
/// assert_eq!((a.x(), a.y()), (2, 3));
/// assert!(a.is_adjacent(Coord::new(3, 4)));
/// assert!(!a.is_adjacent(a));
/// assert_eq!(a.to_string(), "(2,3)");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Coord {
    x: usize,
    y: usize,
}

impl Coord {
    /// Creates a coordinate.
    #[must_use]
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Returns the column.
    #[must_use]
    pub const fn x(self) -> usize {
        self.x
    }

    /// Returns the row.
    #[must_use]
    pub const fn y(self) -> usize {
        self.y
    }

    /// Returns `true` if the two coordinates touch (including diagonally)
    /// and are not the same tile.
    #[must_use]
    pub fn is_adjacent(self, other: Coord) -> bool {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        dx < 2 && dy < 2 && !(dx == 0 && dy == 0)
    }

    /// Chebyshev distance between two coordinates.
    #[must_use]
    pub fn distance(self, other: Coord) -> usize {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }
}

impl Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}
