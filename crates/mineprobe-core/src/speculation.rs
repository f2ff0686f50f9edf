//! Scoped "what-if" overlay on a board.
//!
//! Speculative queries temporarily rewrite a handful of tiles (a candidate
//! reveal value, a hypothetical marker layout) and run the solver against the
//! result. [`Speculation`] applies such changes in place and reverts them when
//! dropped, so every exit path (early return, `?`, panic unwinding) leaves the
//! board exactly as it was.

use std::ops::Deref;

use crate::{Board, CellState, TileIndex};

/// Guard returned by [`Board::speculate`].
///
/// Dereferences to the modified board. The board cannot be reached mutably
/// while the guard lives, so overlays nest only by speculating on a fresh
/// board and never interleave on the same one.
#[derive(Debug)]
pub struct Speculation<'a> {
    board: &'a mut Board,
    saved: Vec<(TileIndex, CellState)>,
}

impl Board {
    /// Applies hypothetical cell states until the returned guard is dropped.
    ///
    /// Changes are applied in order; if the same tile appears twice the last
    /// state wins and the original state is still restored.
    ///
    /// # Examples
    ///
    /// ```
    /// use mineprobe_core::{Board, CellState};
    ///
    /// let mut board = Board::new(3, 3, 1)?;
    /// {
    ///     let what_if = board.speculate([(4, CellState::Revealed(1)), (0, CellState::Mine)]);
    ///     assert_eq!(what_if.cell(4), CellState::Revealed(1));
    ///     assert_eq!(what_if.count(CellState::Mine), 1);
    /// }
    /// assert_eq!(board.cell(4), CellState::Covered);
    /// assert_eq!(board.count(CellState::Mine), 0);
    /// # Ok::<(), mineprobe_core::BoardError>(())
    /// ```
    pub fn speculate<I>(&mut self, changes: I) -> Speculation<'_>
    where
        I: IntoIterator<Item = (TileIndex, CellState)>,
    {
        let mut saved = Vec::new();
        for (index, state) in changes {
            saved.push((index, self.cell(index)));
            self.set_cell(index, state);
        }
        Speculation { board: self, saved }
    }
}

impl Speculation<'_> {
    /// Number of tile changes held by this overlay.
    #[must_use]
    pub fn len(&self) -> usize {
        self.saved.len()
    }

    /// Returns `true` if the overlay changed nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.saved.is_empty()
    }
}

impl Deref for Speculation<'_> {
    type Target = Board;

    fn deref(&self) -> &Board {
        self.board
    }
}

impl Drop for Speculation<'_> {
    fn drop(&mut self) {
        while let Some((index, state)) = self.saved.pop() {
            self.board.set_cell(index, state);
        }
    }
}
