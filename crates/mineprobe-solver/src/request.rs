//! The JSON request/response contract.
//!
//! A request names the board dimensions, the total marker count, the
//! revealed clues and optional [`SolveOptions`]. A response lists a
//! [`TileReport`] for every unrevealed tile, safest first, or carries an
//! error message with `valid: false`.
//!
//! ```
//! use mineprobe_solver::{SolveRequest, Solver};
//!
//! let request: SolveRequest = serde_json::from_str(
//!     r#"{
//!         "board": { "width": 2, "height": 2, "mines": 1 },
//!         "tiles": [{ "x": 0, "y": 0, "value": 1 }]
//!     }"#,
//! )?;
//! let response = Solver::default().solve_request(&request);
//! assert!(response.valid);
//! assert_eq!(response.tiles.len(), 3);
//! assert_eq!(response.tiles[0].safety.to_string(), "0.666667");
//! # Ok::<(), serde_json::Error>(())
//! ```

use std::fmt::Display;

use mineprobe_core::{Board, BoardError, CellState, MAX_CLUE};

use crate::{Safety, SolveError, SolveOptions};

/// Board dimensions and marker count as sent on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BoardSpec {
    /// Columns.
    pub width: i64,
    /// Rows.
    pub height: i64,
    /// Total markers on the board, found or not.
    pub mines: i64,
}

/// A tile as sent on the wire. Tiles without a value are left covered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TileSpec {
    /// Column.
    pub x: i64,
    /// Row.
    pub y: i64,
    /// Revealed clue.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<i64>,
}

/// A solve request.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SolveRequest {
    /// Board dimensions and marker count.
    pub board: BoardSpec,
    /// Revealed tiles.
    #[serde(default)]
    pub tiles: Vec<TileSpec>,
    /// Per-request options.
    #[serde(default)]
    pub options: SolveOptions,
}

impl SolveRequest {
    /// Builds the board snapshot described by the request.
    ///
    /// # Errors
    ///
    /// Returns a [`BoardError`] for bad dimensions, a negative or oversized
    /// marker count, coordinates off the board, clue values outside `0..=8`
    /// and tiles listed twice.
    pub fn to_board(&self) -> Result<Board, BoardError> {
        let BoardSpec {
            width,
            height,
            mines,
        } = self.board;
        let invalid = || BoardError::InvalidDimensions { width, height };
        let w = usize::try_from(width).map_err(|_| invalid())?;
        let h = usize::try_from(height).map_err(|_| invalid())?;
        let m = usize::try_from(mines).map_err(|_| BoardError::TooManyMines {
            mines,
            tiles: w.saturating_mul(h),
        })?;
        let mut board = Board::new(w, h, m)?;

        let mut seen = vec![false; board.len()];
        for tile in &self.tiles {
            let index = board.checked_index(tile.x, tile.y)?;
            let coord = board.coord_of(index);
            if seen[index] {
                return Err(BoardError::DuplicateTile {
                    x: coord.x(),
                    y: coord.y(),
                });
            }
            seen[index] = true;

            let Some(value) = tile.value else {
                continue;
            };
            let clue = u8::try_from(value)
                .ok()
                .filter(|&v| v <= MAX_CLUE)
                .ok_or(BoardError::ClueOutOfRange {
                    x: coord.x(),
                    y: coord.y(),
                    value,
                })?;
            board.set_cell(index, CellState::Revealed(clue));
        }
        Ok(board)
    }
}

/// Result for one unrevealed tile.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TileReport {
    /// Column.
    pub x: usize,
    /// Row.
    pub y: usize,
    /// Probability the tile is clear.
    pub safety: Safety,
    /// The tile is a known marker.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub mine: bool,
    /// Revealing the tile can never yield information.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub dead: bool,
    /// The recommended move.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub play: bool,
}

/// A solve response.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SolveResponse {
    /// `false` when the request could not be solved.
    pub valid: bool,
    /// Unrevealed tiles, safest first. Empty on failure.
    pub tiles: Vec<TileReport>,
    /// `"<ErrorClass>: <detail>"` on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SolveResponse {
    /// A successful response.
    #[must_use]
    pub fn success(tiles: Vec<TileReport>) -> Self {
        Self {
            valid: true,
            tiles,
            message: None,
        }
    }

    /// A failure response for a solver error.
    #[must_use]
    pub fn failure(error: &SolveError) -> Self {
        Self::with_message(format!("{}: {error}", error.class()))
    }

    /// A failure response for a request that could not even be decoded.
    #[must_use]
    pub fn invalid_input(detail: impl Display) -> Self {
        Self::with_message(format!("InputValidationError: {detail}"))
    }

    fn with_message(message: String) -> Self {
        Self {
            valid: false,
            tiles: Vec::new(),
            message: Some(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(json: &str) -> SolveRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_to_board_places_clues() {
        let req = request(
            r#"{
                "board": { "width": 3, "height": 2, "mines": 1 },
                "tiles": [{ "x": 2, "y": 1, "value": 0 }, { "x": 0, "y": 0 }]
            }"#,
        );
        let board = req.to_board().unwrap();
        assert_eq!(board.to_string(), "...\n..0");
        assert_eq!(req.options, SolveOptions::default());
    }

    #[test]
    fn test_to_board_rejects_bad_input() {
        let cases = [
            (
                r#"{ "board": { "width": 0, "height": 2, "mines": 1 } }"#,
                BoardError::InvalidDimensions { width: 0, height: 2 },
            ),
            (
                r#"{ "board": { "width": -3, "height": 2, "mines": 1 } }"#,
                BoardError::InvalidDimensions { width: -3, height: 2 },
            ),
            (
                r#"{ "board": { "width": 2, "height": 2, "mines": -1 } }"#,
                BoardError::TooManyMines { mines: -1, tiles: 4 },
            ),
            (
                r#"{ "board": { "width": 2, "height": 2, "mines": 5 } }"#,
                BoardError::TooManyMines { mines: 5, tiles: 4 },
            ),
            (
                r#"{ "board": { "width": 2, "height": 2, "mines": 1 },
                     "tiles": [{ "x": 2, "y": 0, "value": 1 }] }"#,
                BoardError::CoordinateOutOfRange { x: 2, y: 0 },
            ),
            (
                r#"{ "board": { "width": 2, "height": 2, "mines": 1 },
                     "tiles": [{ "x": 1, "y": 1, "value": 9 }] }"#,
                BoardError::ClueOutOfRange { x: 1, y: 1, value: 9 },
            ),
            (
                r#"{ "board": { "width": 2, "height": 2, "mines": 1 },
                     "tiles": [{ "x": 1, "y": 1, "value": 1 }, { "x": 1, "y": 1, "value": 2 }] }"#,
                BoardError::DuplicateTile { x: 1, y: 1 },
            ),
        ];
        for (json, expected) in cases {
            assert_eq!(request(json).to_board(), Err(expected), "{json}");
        }
    }

    #[test]
    fn test_response_wire_shape() {
        let response = SolveResponse::success(vec![
            TileReport {
                x: 1,
                y: 0,
                safety: Safety::ONE,
                mine: false,
                dead: false,
                play: true,
            },
            TileReport {
                x: 0,
                y: 0,
                safety: Safety::ZERO,
                mine: true,
                dead: false,
                play: false,
            },
        ]);
        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(
            json,
            r#"{"valid":true,"tiles":[{"x":1,"y":0,"safety":"1.000000","play":true},{"x":0,"y":0,"safety":"0.000000","mine":true}]}"#
        );

        let failure = SolveResponse::invalid_input("missing field `board`");
        let json = serde_json::to_value(&failure).unwrap();
        assert_eq!(json["valid"], false);
        assert_eq!(json["tiles"], serde_json::json!([]));
        assert_eq!(json["message"], "InputValidationError: missing field `board`");
    }
}
