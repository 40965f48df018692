//! Board replay for transcripts that record moves without boards.

use thiserror::Error;

use crate::models::enums::CubeAction;
use crate::models::{Board, Cube, Point};
use crate::pipeline::formats::Snapshot;
use crate::pipeline::notation::{is_valid_sub_move, BAR};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReplayError {
    #[error("Player {player} has no checker on {from} to move to {to}")]
    NoCheckerToMove { player: u8, from: i32, to: i32 },

    #[error("Player {player} cannot land on blocked point {to}")]
    BlockedPoint { player: u8, to: i32 },

    #[error("Player {player} has no valid sub-move {from}/{to}")]
    InvalidSubMove { player: u8, from: i32, to: i32 },
}

/// Tracks the board and cube through one game. Once a move fails to
/// apply the replay stays out of sync until the next snapshot.
#[derive(Debug, Clone)]
pub struct Replay {
    board: Board,
    cube: Cube,
    in_sync: bool,
}

impl Default for Replay {
    fn default() -> Self {
        Self::new_game()
    }
}

impl Replay {
    pub fn new_game() -> Self {
        Self {
            board: Board::starting(),
            cube: Cube::centered(),
            in_sync: true,
        }
    }

    pub fn resync(&mut self, snapshot: &Snapshot) {
        self.board = snapshot.board;
        self.cube = snapshot.cube;
        self.in_sync = true;
    }

    /// Current board and cube, `None` while out of sync.
    pub fn state(&self) -> Option<(Board, Cube)> {
        self.in_sync.then_some((self.board, self.cube))
    }

    pub fn is_in_sync(&self) -> bool {
        self.in_sync
    }

    /// Play universal sub-moves for `player`, in the order recorded.
    pub fn apply_checker(&mut self, player: u8, sub_moves: &[(i32, i32)]) -> Result<(), ReplayError> {
        if !self.in_sync {
            return Ok(());
        }
        let mut board = self.board;
        for &(from, to) in sub_moves {
            if let Err(e) = move_checker(&mut board, player, from, to) {
                self.in_sync = false;
                return Err(e);
            }
        }
        self.board = board;
        Ok(())
    }

    /// A taken double turns the cube and hands it to the taker.
    pub fn apply_cube(&mut self, doubler: u8, action: CubeAction) {
        if action == CubeAction::Take {
            self.cube = Cube {
                owner: (1 - doubler) as i8,
                value: self.cube.value.saturating_add(1),
            };
        }
    }
}

fn move_checker(board: &mut Board, player: u8, from: i32, to: i32) -> Result<(), ReplayError> {
    if !is_valid_sub_move(from, to) {
        return Err(ReplayError::InvalidSubMove { player, from, to });
    }
    let color = player as i8;
    let source = if from == BAR {
        Board::bar_slot(player)
    } else {
        Board::slot_for(player, from)
    };
    let origin = board.points[source];
    if origin.checkers == 0 || origin.color != color {
        return Err(ReplayError::NoCheckerToMove { player, from, to });
    }

    if (1..=24).contains(&to) {
        let target = Board::slot_for(player, to);
        let dest = board.points[target];
        if !dest.is_empty() && dest.color != color {
            if dest.checkers > 1 {
                return Err(ReplayError::BlockedPoint { player, to });
            }
            let opponent = 1 - player;
            let bar = Board::bar_slot(opponent);
            board.points[bar] = Point::new(board.points[bar].checkers + 1, opponent as i8);
            board.points[target] = Point::EMPTY;
        }
        let landed = board.points[target].checkers + 1;
        board.points[target] = Point::new(landed, color);
    } else {
        board.bearoff[player as usize] += 1;
    }

    board.points[source] = Point::new(origin.checkers - 1, color);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FIRST_PLAYER_BAR, SECOND_PLAYER_BAR};
    use crate::pipeline::notation::BEAR_OFF;

    #[test]
    fn opening_move_for_each_side() {
        let mut replay = Replay::new_game();
        replay.apply_checker(0, &[(8, 5), (6, 5)]).unwrap();
        replay.apply_checker(1, &[(8, 5), (6, 5)]).unwrap();
        let (board, _) = replay.state().unwrap();

        assert_eq!(board.points[5], Point::new(2, 0));
        assert_eq!(board.points[8], Point::new(2, 0));
        assert_eq!(board.points[20], Point::new(2, 1));
        assert_eq!(board.points[17], Point::new(2, 1));
        assert_eq!(board.checkers_in_play(0), 15);
        assert_eq!(board.checkers_in_play(1), 15);
    }

    #[test]
    fn hitting_sends_blot_to_the_bar() {
        let mut replay = Replay::new_game();
        // First player leaves a blot on their 23 (slot 23)
        replay.apply_checker(0, &[(24, 23)]).unwrap();
        // Second player's 2-point is slot 23
        replay.apply_checker(1, &[(6, 2)]).unwrap();
        let (board, _) = replay.state().unwrap();
        assert_eq!(board.points[FIRST_PLAYER_BAR], Point::new(1, 0));
        assert_eq!(board.points[23], Point::new(1, 1));

        replay.apply_checker(0, &[(BAR, 23)]).unwrap();
        let (board, _) = replay.state().unwrap();
        assert!(board.points[FIRST_PLAYER_BAR].is_empty());
        assert_eq!(board.points[SECOND_PLAYER_BAR], Point::new(1, 1));
    }

    #[test]
    fn bearing_off_counts() {
        let mut board = Board::empty();
        board.points[3] = Point::new(2, 0);
        board.points[22] = Point::new(1, 1);
        let mut replay = Replay::new_game();
        replay.resync(&Snapshot { board, cube: Cube::centered() });
        replay.apply_checker(0, &[(3, BEAR_OFF), (3, 0)]).unwrap();
        let (board, _) = replay.state().unwrap();
        assert_eq!(board.bearoff[0], 2);
        assert!(board.points[3].is_empty());
    }

    #[test]
    fn illegal_move_desyncs_until_snapshot() {
        let mut replay = Replay::new_game();
        let err = replay.apply_checker(0, &[(7, 3)]).unwrap_err();
        assert_eq!(err, ReplayError::NoCheckerToMove { player: 0, from: 7, to: 3 });
        assert!(replay.state().is_none());
        assert!(replay.apply_checker(1, &[(8, 5)]).is_ok());
        assert!(!replay.is_in_sync());

        replay.resync(&Snapshot { board: Board::starting(), cube: Cube::centered() });
        assert!(replay.state().is_some());
    }

    #[test]
    fn off_board_destination_outside_home_desyncs() {
        let mut replay = Replay::new_game();
        let err = replay.apply_checker(0, &[(8, -1), (6, 2)]).unwrap_err();
        assert_eq!(err, ReplayError::InvalidSubMove { player: 0, from: 8, to: -1 });
        assert!(replay.state().is_none());
    }

    #[test]
    fn blocked_point_is_rejected() {
        let mut replay = Replay::new_game();
        // First player's 12 is the second player's 13-point with five checkers
        let err = replay.apply_checker(0, &[(13, 12)]).unwrap_err();
        assert_eq!(err, ReplayError::BlockedPoint { player: 0, to: 12 });
    }

    #[test]
    fn taken_double_turns_the_cube() {
        let mut replay = Replay::new_game();
        replay.apply_cube(0, CubeAction::Take);
        let (_, cube) = replay.state().unwrap();
        assert_eq!(cube, Cube { owner: 1, value: 1 });

        replay.apply_cube(1, CubeAction::Pass);
        let (_, cube) = replay.state().unwrap();
        assert_eq!(cube, Cube { owner: 1, value: 1 });
    }
}
