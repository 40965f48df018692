use base64::Engine;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use super::enums::DecisionKind;

pub const NUM_POINTS: usize = 24;
pub const BOARD_SLOTS: usize = NUM_POINTS + 2;
pub const CHECKERS_PER_PLAYER: u32 = 15;

/// Slot holding the first player's (color 0) checkers on the bar.
pub const FIRST_PLAYER_BAR: usize = 25;
/// Slot holding the second player's (color 1) checkers on the bar.
pub const SECOND_PLAYER_BAR: usize = 0;

/// Color of an empty slot, and owner of a centred cube.
pub const NO_COLOR: i8 = -1;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PositionError {
    #[error("Player {color} has {count} checkers (max 15)")]
    TooManyCheckers { color: u8, count: u32 },

    #[error("Slot {slot} holds checkers without an owning color")]
    ColorlessCheckers { slot: usize },

    #[error("Slot {slot} is a bar slot but holds checkers of player {color}")]
    MisplacedBar { slot: usize, color: i8 },

    #[error("Player on roll must be 0 or 1, got {0}")]
    InvalidPlayer(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub checkers: u8,
    pub color: i8,
}

impl Point {
    pub const EMPTY: Point = Point { checkers: 0, color: NO_COLOR };

    pub fn new(checkers: u8, color: i8) -> Self {
        if checkers == 0 {
            Self::EMPTY
        } else {
            Self { checkers, color }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.checkers == 0
    }
}

impl Default for Point {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Doubling cube. `value` is the log2 exponent (0 = 1-cube), `owner` is
/// the owning player or `NO_COLOR` when centred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cube {
    pub owner: i8,
    pub value: u8,
}

impl Cube {
    pub fn centered() -> Self {
        Self { owner: NO_COLOR, value: 0 }
    }

    /// Convert a face value (1, 2, 4, ...) to the stored exponent.
    pub fn exponent_of(face: u32) -> u8 {
        if face <= 1 {
            0
        } else {
            (31 - face.leading_zeros()) as u8
        }
    }

    pub fn face_value(&self) -> u32 {
        1u32 << self.value
    }
}

impl Default for Cube {
    fn default() -> Self {
        Self::centered()
    }
}

/// Absolute board. Color 0 moves from point 24 down to point 1 and enters
/// from slot 25; color 1 moves the opposite way and enters from slot 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    pub points: [Point; BOARD_SLOTS],
    pub bearoff: [u8; 2],
}

impl Board {
    pub fn empty() -> Self {
        Self {
            points: [Point::EMPTY; BOARD_SLOTS],
            bearoff: [0, 0],
        }
    }

    /// Standard opening setup.
    pub fn starting() -> Self {
        let mut board = Self::empty();
        board.points[24] = Point::new(2, 0);
        board.points[13] = Point::new(5, 0);
        board.points[8] = Point::new(3, 0);
        board.points[6] = Point::new(5, 0);

        board.points[1] = Point::new(2, 1);
        board.points[12] = Point::new(5, 1);
        board.points[17] = Point::new(3, 1);
        board.points[19] = Point::new(5, 1);
        board
    }

    /// Slot index of `player`'s own point number `point` (25 = bar).
    pub fn slot_for(player: u8, point: i32) -> usize {
        if player == 0 {
            point as usize
        } else {
            (25 - point) as usize
        }
    }

    pub fn bar_slot(player: u8) -> usize {
        if player == 0 {
            FIRST_PLAYER_BAR
        } else {
            SECOND_PLAYER_BAR
        }
    }

    /// Checkers of `color` still in play (points and bar).
    pub fn checkers_in_play(&self, color: u8) -> u32 {
        self.points
            .iter()
            .filter(|p| p.color == color as i8)
            .map(|p| p.checkers as u32)
            .sum()
    }

    /// Derive borne-off counts from the checkers still in play.
    pub fn recompute_bearoff(&mut self) {
        for color in 0..2u8 {
            let in_play = self.checkers_in_play(color);
            self.bearoff[color as usize] = CHECKERS_PER_PLAYER.saturating_sub(in_play) as u8;
        }
    }

    pub fn mirrored(&self) -> Self {
        let mut mirrored = Self::empty();
        for (i, point) in self.points.iter().enumerate() {
            mirrored.points[BOARD_SLOTS - 1 - i] = if point.is_empty() {
                Point::EMPTY
            } else {
                Point::new(point.checkers, 1 - point.color)
            };
        }
        mirrored.bearoff = [self.bearoff[1], self.bearoff[0]];
        mirrored
    }

    fn clear_empty_colors(&mut self) {
        for point in self.points.iter_mut() {
            if point.checkers == 0 {
                *point = Point::EMPTY;
            }
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::empty()
    }
}

/// A decision point: board, cube, away scores, dice and who is on roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub board: Board,
    pub cube: Cube,
    pub dice: [u8; 2],
    pub score: [i32; 2],
    pub player_on_roll: u8,
    pub decision: DecisionKind,
}

impl Position {
    /// Same physical situation seen from the other side of the table.
    pub fn mirror(&self) -> Self {
        let mut mirrored = *self;
        mirrored.board = self.board.mirrored();
        mirrored.player_on_roll = 1 - self.player_on_roll;
        mirrored.score = [self.score[1], self.score[0]];
        if self.cube.owner != NO_COLOR {
            mirrored.cube.owner = 1 - self.cube.owner;
        }
        mirrored
    }

    /// Canonical form used for identity: on-roll player is always 0, dice
    /// high-first, empty slots uncolored, bear-off counts derived.
    pub fn normalized(&self) -> Self {
        let mut normalized = if self.player_on_roll == 1 {
            self.mirror()
        } else {
            *self
        };
        normalized.board.clear_empty_colors();
        normalized.board.recompute_bearoff();
        if normalized.dice[0] < normalized.dice[1] {
            normalized.dice.swap(0, 1);
        }
        normalized
    }

    pub fn validate(&self) -> Result<(), PositionError> {
        if self.player_on_roll > 1 {
            return Err(PositionError::InvalidPlayer(self.player_on_roll));
        }
        for (slot, point) in self.board.points.iter().enumerate() {
            if point.checkers == 0 {
                continue;
            }
            if point.color != 0 && point.color != 1 {
                return Err(PositionError::ColorlessCheckers { slot });
            }
            let misplaced = (slot == FIRST_PLAYER_BAR && point.color != 0)
                || (slot == SECOND_PLAYER_BAR && point.color != 1);
            if misplaced {
                return Err(PositionError::MisplacedBar { slot, color: point.color });
            }
        }
        for color in 0..2u8 {
            let count = self.board.checkers_in_play(color);
            if count > CHECKERS_PER_PLAYER {
                return Err(PositionError::TooManyCheckers { color, count });
            }
        }
        Ok(())
    }

    /// Serialized canonical state, as stored in the `position.state` column.
    pub fn canonical_state(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.normalized())
    }

    /// Content address of the canonical state.
    pub fn identity_key(&self) -> Result<String, serde_json::Error> {
        let state = self.canonical_state()?;
        let digest = Sha256::digest(state.as_bytes());
        Ok(base64::engine::general_purpose::STANDARD.encode(digest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opening(player_on_roll: u8, dice: [u8; 2]) -> Position {
        Position {
            board: Board::starting(),
            cube: Cube::centered(),
            dice,
            score: [5, 3],
            player_on_roll,
            decision: DecisionKind::CheckerPlay,
        }
    }

    #[test]
    fn starting_board_has_fifteen_each() {
        let board = Board::starting();
        assert_eq!(board.checkers_in_play(0), 15);
        assert_eq!(board.checkers_in_play(1), 15);
    }

    #[test]
    fn mirror_is_an_involution() {
        let mut pos = opening(1, [6, 2]);
        pos.cube = Cube { owner: 0, value: 1 };
        assert_eq!(pos.mirror().mirror(), pos);
    }

    #[test]
    fn mirror_swaps_score_and_cube_owner() {
        let mut pos = opening(1, [6, 2]);
        pos.cube = Cube { owner: 1, value: 2 };
        let mirrored = pos.mirror();
        assert_eq!(mirrored.score, [3, 5]);
        assert_eq!(mirrored.cube.owner, 0);
        assert_eq!(mirrored.player_on_roll, 0);
    }

    #[test]
    fn same_situation_from_either_side_shares_identity() {
        // Opening board is symmetric, so only score orientation differs
        let first = Position { score: [3, 5], ..opening(0, [3, 1]) };
        let second = opening(1, [1, 3]);
        assert_eq!(first.identity_key().unwrap(), second.identity_key().unwrap());
    }

    #[test]
    fn identity_is_stable() {
        let pos = opening(0, [4, 2]);
        assert_eq!(pos.identity_key().unwrap(), pos.identity_key().unwrap());
    }

    #[test]
    fn dice_differ_means_identity_differs() {
        let a = opening(0, [4, 2]);
        let b = opening(0, [5, 2]);
        assert_ne!(a.identity_key().unwrap(), b.identity_key().unwrap());
    }

    #[test]
    fn validate_rejects_sixteen_checkers() {
        let mut pos = opening(0, [1, 2]);
        pos.board.points[3] = Point::new(1, 0);
        assert_eq!(
            pos.validate(),
            Err(PositionError::TooManyCheckers { color: 0, count: 16 })
        );
    }

    #[test]
    fn validate_rejects_wrong_bar_owner() {
        let mut pos = opening(0, [1, 2]);
        pos.board.points[24] = Point::new(1, 0);
        pos.board.points[FIRST_PLAYER_BAR] = Point::new(1, 1);
        assert!(matches!(pos.validate(), Err(PositionError::MisplacedBar { .. })));
    }

    #[test]
    fn normalized_derives_bearoff() {
        let mut pos = opening(0, [1, 2]);
        pos.board.points[6] = Point::new(2, 0);
        let normalized = pos.normalized();
        assert_eq!(normalized.board.bearoff, [3, 0]);
    }

    #[test]
    fn cube_exponent_conversion() {
        assert_eq!(Cube::exponent_of(1), 0);
        assert_eq!(Cube::exponent_of(2), 1);
        assert_eq!(Cube::exponent_of(8), 3);
        assert_eq!(Cube { owner: 0, value: 3 }.face_value(), 8);
    }
}
