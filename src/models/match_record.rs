use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::enums::{CubeAction, MatchFormat, MoveKind};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
    pub id: i64,
    pub player1_name: String,
    pub player2_name: String,
    pub event: String,
    pub location: String,
    pub round: String,
    pub match_length: i32,
    pub match_date: Option<NaiveDateTime>,
    pub import_date: NaiveDateTime,
    pub file_path: String,
    pub source_format: MatchFormat,
    pub game_count: i32,
    pub match_hash: String,
    pub canonical_hash: String,
}

/// One import artifact folded into a match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchArtifact {
    pub id: i64,
    pub match_id: i64,
    pub match_hash: String,
    pub source_format: MatchFormat,
    pub file_path: String,
    pub imported_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    pub id: i64,
    pub match_id: i64,
    pub game_number: i32,
    pub initial_score: [i32; 2],
    pub winner: i32,
    pub points_won: i32,
    pub move_count: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Move {
    pub id: i64,
    pub game_id: i64,
    pub move_number: i32,
    pub kind: MoveKind,
    pub position_id: Option<i64>,
    /// Responder's take decision, for a resolved double.
    pub response_position_id: Option<i64>,
    pub player: i32,
    pub dice: [i32; 2],
    pub checker_move: Option<String>,
    pub cube_action: Option<CubeAction>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseStats {
    pub matches: i64,
    pub games: i64,
    pub moves: i64,
    pub positions: i64,
    pub analyses: i64,
}
