use mineprobe_core::{Board, BoardError, CellState, Coord, TileIndex};
use mineprobe_solver::{BoardSpec, SolveOptions, SolveRequest, TileSpec};
use rand::seq::SliceRandom as _;

use crate::{GameError, GameSeed};

/// Progress of a game.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, derive_more::Display, derive_more::IsVariant,
)]
pub enum GameStatus {
    /// Safe tiles remain covered.
    #[default]
    #[display("in play")]
    InPlay,
    /// Every safe tile is revealed.
    #[display("won")]
    Won,
    /// A mine was revealed.
    #[display("lost")]
    Lost,
}

/// Which tiles are kept free of mines around the first move.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, derive_more::IsVariant)]
pub enum StartRule {
    /// Only the start tile is safe.
    #[default]
    Safe,
    /// The start tile and all its neighbours are safe, so the first move
    /// opens an area.
    Zero,
}

/// What a single reveal did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealOutcome {
    /// Status after the move.
    pub status: GameStatus,
    /// Tiles uncovered by the move, in flood order. Empty when the tile was
    /// already revealed or hid a mine.
    pub revealed: Vec<TileIndex>,
}

/// A minefield with a hidden mine layout and the player's view of it.
///
/// The player's view is a [`Board`] in which every tile is either
/// [`CellState::Covered`] or [`CellState::Revealed`]; it never contains
/// flags, so it can be handed to the solver as is.
///
/// # Examples
///
/// ```
/// use mineprobe_core::Coord;
/// use mineprobe_game::{GameSeed, GameStatus, Minefield, StartRule};
///
/// let seed = GameSeed::from_phrase("example");
/// let mut field = Minefield::generate(9, 9, 10, Coord::new(4, 4), StartRule::Zero, seed)?;
///
/// let outcome = field.reveal(field.start())?;
/// assert_eq!(outcome.status, GameStatus::InPlay);
/// assert!(outcome.revealed.len() >= 9);
/// # Ok::<(), mineprobe_game::GameError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Minefield {
    board: Board,
    mines: Vec<bool>,
    seed: Option<GameSeed>,
    start: TileIndex,
    safe_left: usize,
    status: GameStatus,
}

impl Minefield {
    /// Lays out `mines` mines from a seed, keeping the start area clear.
    ///
    /// The same arguments always produce the same layout.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Board`] for bad dimensions, a mine count larger
    /// than the board or a start outside it, and
    /// [`GameError::NoRoomForMines`] when the protected start area leaves
    /// too few tiles.
    pub fn generate(
        width: usize,
        height: usize,
        mines: usize,
        start: Coord,
        rule: StartRule,
        seed: GameSeed,
    ) -> Result<Self, GameError> {
        let board = Board::new(width, height, mines)?;
        if start.x() >= width || start.y() >= height {
            return Err(BoardError::CoordinateOutOfRange {
                x: wire(start.x()),
                y: wire(start.y()),
            }
            .into());
        }
        let start = board.index_of(start);

        let mut protected = vec![false; board.len()];
        protected[start] = true;
        if rule.is_zero() {
            for n in board.neighbors(start) {
                protected[n] = true;
            }
        }
        let mut free: Vec<TileIndex> = (0..board.len()).filter(|&t| !protected[t]).collect();
        if free.len() < mines {
            return Err(GameError::NoRoomForMines {
                mines,
                free: free.len(),
            });
        }

        free.shuffle(&mut seed.rng());
        let mut layout = vec![false; board.len()];
        for &tile in &free[..mines] {
            layout[tile] = true;
        }
        log::trace!("generated {width}x{height}/{mines} from seed {seed}");

        let mut field = Self::from_layout(width, height, layout)?;
        field.seed = Some(seed);
        field.start = start;
        Ok(field)
    }

    /// Builds a minefield from an explicit layout in row-major order.
    ///
    /// The start tile is the top-left corner.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Board`] for bad dimensions and
    /// [`GameError::LayoutSize`] when the layout length does not match.
    pub fn from_layout(width: usize, height: usize, layout: Vec<bool>) -> Result<Self, GameError> {
        let mines = layout.iter().filter(|&&m| m).count();
        let board = Board::new(width, height, mines)?;
        if layout.len() != board.len() {
            return Err(GameError::LayoutSize {
                expected: board.len(),
                actual: layout.len(),
            });
        }
        let safe_left = board.len() - mines;
        Ok(Self {
            board,
            mines: layout,
            seed: None,
            start: 0,
            safe_left,
            status: if safe_left == 0 {
                GameStatus::Won
            } else {
                GameStatus::InPlay
            },
        })
    }

    /// Returns the player's view.
    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the seed the layout was generated from, if any.
    #[must_use]
    pub fn seed(&self) -> Option<GameSeed> {
        self.seed
    }

    /// Returns the tile guaranteed safe by the start rule.
    #[must_use]
    pub fn start(&self) -> TileIndex {
        self.start
    }

    /// Returns the game status.
    #[must_use]
    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Returns `true` if the tile hides a mine.
    ///
    /// # Panics
    ///
    /// Panics if `tile` is out of range.
    #[must_use]
    pub fn is_mine(&self, tile: TileIndex) -> bool {
        self.mines[tile]
    }

    /// Counts the mines around a tile.
    #[must_use]
    pub fn mines_around(&self, tile: TileIndex) -> u8 {
        let count = self.board.neighbors(tile).iter().filter(|&&n| self.mines[n]).count();
        u8::try_from(count).unwrap_or(u8::MAX)
    }

    /// Reveals a tile, opening every connected zero area.
    ///
    /// Revealing an already revealed tile does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::GameOver`] if the game has already ended.
    ///
    /// # Panics
    ///
    /// Panics if `tile` is out of range.
    pub fn reveal(&mut self, tile: TileIndex) -> Result<RevealOutcome, GameError> {
        if !self.status.is_in_play() {
            return Err(GameError::GameOver(self.status));
        }
        if self.board.cell(tile) != CellState::Covered {
            return Ok(self.outcome(Vec::new()));
        }
        if self.mines[tile] {
            self.status = GameStatus::Lost;
            log::trace!("revealed mine at {}", self.board.coord_of(tile));
            return Ok(self.outcome(Vec::new()));
        }

        let mut revealed = Vec::new();
        let mut stack = vec![tile];
        self.board.set_cell(tile, CellState::Revealed(self.mines_around(tile)));
        while let Some(t) = stack.pop() {
            revealed.push(t);
            if self.board.cell(t) != CellState::Revealed(0) {
                continue;
            }
            for n in self.board.neighbors(t) {
                if self.board.cell(n) == CellState::Covered {
                    self.board.set_cell(n, CellState::Revealed(self.mines_around(n)));
                    stack.push(n);
                }
            }
        }

        self.safe_left -= revealed.len();
        if self.safe_left == 0 {
            self.status = GameStatus::Won;
        }
        Ok(self.outcome(revealed))
    }

    fn outcome(&self, revealed: Vec<TileIndex>) -> RevealOutcome {
        RevealOutcome {
            status: self.status,
            revealed,
        }
    }

    /// Builds a solver request from the player's view.
    #[must_use]
    pub fn to_request(&self, options: SolveOptions) -> SolveRequest {
        let tiles = self
            .board
            .cells()
            .filter_map(|(tile, state)| {
                let value = state.clue()?;
                let coord = self.board.coord_of(tile);
                Some(TileSpec {
                    x: wire(coord.x()),
                    y: wire(coord.y()),
                    value: Some(i64::from(value)),
                })
            })
            .collect();
        SolveRequest {
            board: BoardSpec {
                width: wire(self.board.width()),
                height: wire(self.board.height()),
                mines: wire(self.board.mines()),
            },
            tiles,
            options,
        }
    }
}

fn wire(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(text: &str) -> Minefield {
        let rows: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
        let layout = rows.iter().flat_map(|r| r.chars().map(|c| c == '*')).collect();
        Minefield::from_layout(rows[0].len(), rows.len(), layout).unwrap()
    }

    #[test]
    fn test_reveal_floods_zero_area() {
        let mut f = field(
            "
            ....
            ....
            ...*
            ",
        );
        let outcome = f.reveal(0).unwrap();
        assert_eq!(outcome.status, GameStatus::Won);
        assert_eq!(outcome.revealed.len(), 11);
        assert_eq!(f.board().to_string(), "0000\n0011\n001.");
    }

    #[test]
    fn test_reveal_clue_stops_flood() {
        let mut f = field(
            "
            .*..
            ....
            ",
        );
        let outcome = f.reveal(0).unwrap();
        assert_eq!(outcome.revealed, vec![0]);
        assert_eq!(outcome.status, GameStatus::InPlay);
        assert_eq!(f.board().cell(0), CellState::Revealed(1));

        let again = f.reveal(0).unwrap();
        assert!(again.revealed.is_empty());
    }

    #[test]
    fn test_reveal_mine_loses() {
        let mut f = field(
            "
            .*
            ..
            ",
        );
        let outcome = f.reveal(1).unwrap();
        assert_eq!(outcome.status, GameStatus::Lost);
        assert_eq!(f.reveal(0), Err(GameError::GameOver(GameStatus::Lost)));
    }

    #[test]
    fn test_generate_is_reproducible_and_respects_start() {
        let seed = GameSeed::from_phrase("layout");
        let a = Minefield::generate(8, 8, 20, Coord::new(3, 3), StartRule::Zero, seed).unwrap();
        let b = Minefield::generate(8, 8, 20, Coord::new(3, 3), StartRule::Zero, seed).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.board().mines(), 20);
        assert_eq!((0..64).filter(|&t| a.is_mine(t)).count(), 20);
        assert!(!a.is_mine(a.start()));
        assert_eq!(a.mines_around(a.start()), 0);

        let other = Minefield::generate(
            8,
            8,
            20,
            Coord::new(3, 3),
            StartRule::Zero,
            GameSeed::from_phrase("other"),
        )
        .unwrap();
        assert_ne!(a.mines, other.mines);
    }

    #[test]
    fn test_generate_rejects_crowded_start() {
        let seed = GameSeed::from_phrase("crowded");
        assert_eq!(
            Minefield::generate(3, 3, 1, Coord::new(1, 1), StartRule::Zero, seed),
            Err(GameError::NoRoomForMines { mines: 1, free: 0 })
        );
        assert!(matches!(
            Minefield::generate(3, 3, 1, Coord::new(3, 0), StartRule::Safe, seed),
            Err(GameError::Board(BoardError::CoordinateOutOfRange { x: 3, y: 0 }))
        ));
    }

    #[test]
    fn test_to_request_lists_clues_only() {
        let mut f = field(
            "
            .*.
            ...
            ",
        );
        f.reveal(3).unwrap();
        let request = f.to_request(SolveOptions::default());
        assert_eq!(
            request.board,
            BoardSpec {
                width: 3,
                height: 2,
                mines: 1
            }
        );
        assert_eq!(
            request.tiles,
            vec![TileSpec {
                x: 0,
                y: 1,
                value: Some(1)
            }]
        );
        assert_eq!(request.to_board().unwrap(), *f.board());
    }
}
