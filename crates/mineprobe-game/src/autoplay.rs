use mineprobe_core::{CellState, Coord};
use mineprobe_solver::{Safety, SolveOptions, Solver, TileReport};

use crate::{AutoplayError, GameStatus, Minefield};

/// How a self-played game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameRecord {
    /// Final status, never [`GameStatus::InPlay`].
    pub status: GameStatus,
    /// At least one move was a guess.
    pub guessed: bool,
    /// Solver queries made.
    pub turns: usize,
}

impl Minefield {
    /// Plays the game to the end with the solver.
    ///
    /// The first move reveals the start tile. After that every turn asks the
    /// solver about the current view and reveals every certainly safe tile;
    /// when there is none it reveals the recommended tile, or failing that
    /// the first tile that is neither dead nor a known mine.
    ///
    /// Every report is checked against the hidden layout: a certainly safe
    /// tile must be clear and a certain mine must be a mine.
    ///
    /// # Errors
    ///
    /// Returns [`AutoplayError`] when the solver rejects a position,
    /// contradicts the layout or the game runs past `max_turns`.
    pub fn autoplay(
        &mut self,
        solver: &Solver,
        options: &SolveOptions,
        max_turns: usize,
    ) -> Result<GameRecord, AutoplayError> {
        if self.status().is_in_play() {
            self.reveal(self.start())?;
        }

        let mut guessed = false;
        let mut turns = 0;
        while self.status().is_in_play() {
            if turns == max_turns {
                return Err(AutoplayError::MoveLimit(turns));
            }
            turns += 1;

            let response = solver.solve_request(&self.to_request(options.clone()));
            if !response.valid {
                return Err(AutoplayError::Rejected(response.message.unwrap_or_default()));
            }
            self.check(&response.tiles)?;

            let (moves, guess) = pick_moves(&response.tiles);
            guessed |= guess;
            for report in moves {
                let tile = self.board().index_of(Coord::new(report.x, report.y));
                if self.board().cell(tile) != CellState::Covered {
                    continue;
                }
                let outcome = self.reveal(tile)?;
                if !outcome.status.is_in_play() {
                    break;
                }
            }
        }

        log::debug!(
            "game {} after {turns} turns{}",
            self.status(),
            if guessed { "" } else { " without guessing" }
        );
        Ok(GameRecord {
            status: self.status(),
            guessed,
            turns,
        })
    }

    fn check(&self, reports: &[TileReport]) -> Result<(), AutoplayError> {
        for report in reports {
            let tile = self.board().index_of(Coord::new(report.x, report.y));
            let (x, y) = (report.x, report.y);
            if report.safety.is_certain_safe() && self.is_mine(tile) {
                return Err(AutoplayError::SafeTileIsMine { x, y });
            }
            if report.safety.is_certain_mine() && !self.is_mine(tile) {
                return Err(AutoplayError::MineTileIsClear { x, y });
            }
        }
        Ok(())
    }
}

/// Returns the tiles to reveal this turn and whether any of them is a guess.
fn pick_moves(reports: &[TileReport]) -> (Vec<&TileReport>, bool) {
    let mut moves = Vec::new();
    for report in reports {
        if report.safety == Safety::ONE {
            moves.push(report);
        } else if report.play {
            moves.push(report);
            return (moves, true);
        }
    }
    if !moves.is_empty() {
        return (moves, false);
    }

    let fallback = reports
        .iter()
        .find(|r| !r.dead && r.safety > Safety::ZERO)
        .or_else(|| reports.first());
    (fallback.into_iter().collect(), true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(x: usize, safety: Safety, dead: bool, play: bool) -> TileReport {
        TileReport {
            x,
            y: 0,
            safety,
            mine: safety == Safety::ZERO,
            dead,
            play,
        }
    }

    #[test]
    fn test_pick_moves_plays_safe_tiles_then_stops_at_guess() {
        let half: Safety = "0.500000".parse().unwrap();
        let reports = [
            report(0, Safety::ONE, false, false),
            report(1, Safety::ONE, false, false),
            report(2, half, false, true),
            report(3, half, false, false),
        ];
        let (moves, guess) = pick_moves(&reports);
        assert_eq!(moves.iter().map(|r| r.x).collect::<Vec<_>>(), vec![0, 1, 2]);
        assert!(guess);

        let (moves, guess) = pick_moves(&reports[..2]);
        assert_eq!(moves.len(), 2);
        assert!(!guess);
    }

    #[test]
    fn test_pick_moves_skips_dead_and_mines_without_play() {
        let half: Safety = "0.500000".parse().unwrap();
        let reports = [
            report(0, Safety::ZERO, false, false),
            report(1, half, true, false),
            report(2, half, false, false),
        ];
        let (moves, guess) = pick_moves(&reports);
        assert_eq!(moves.iter().map(|r| r.x).collect::<Vec<_>>(), vec![2]);
        assert!(guess);
    }

    #[test]
    fn test_autoplay_solves_without_guessing() {
        let layout = "..*....".chars().map(|c| c == '*').collect();
        let mut field = Minefield::from_layout(7, 1, layout).unwrap();
        let record = field
            .autoplay(&Solver::default(), &SolveOptions::default(), 100)
            .unwrap();
        assert_eq!(record.status, GameStatus::Won);
        assert!(!record.guessed);
    }
}
