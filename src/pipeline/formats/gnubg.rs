//! GNU Backgammon transcripts (SGF, MAT and plain-text exports).
//!
//! The three exports share one record model. SGF numbers points 0-23 from
//! the mover's side with 24 for the bar and may carry boards and analysis;
//! MAT and text exports number 1-24 and carry neither.

use serde::{Deserialize, Serialize};

use super::{analysis_from, chances_from, dice_from, parse_match_date, MatchHeader, PointEncoding, Snapshot, UniversalAction, UniversalGame, UniversalMatch, UniversalMove};
use crate::models::enums::{CubeAction, MatchFormat};
use crate::models::{AnalysisDepth, Board, CheckerMoveEval, Cube, CubeEvaluation, Point, NO_COLOR};
use crate::pipeline::cube::classify_explicit;
use crate::pipeline::import::ImportError;
use crate::pipeline::notation::normalize_sub_moves;

pub const GNUBG_ENGINE: &str = "GNU Backgammon";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GnubgSource {
    Sgf,
    Mat,
    Text,
}

impl GnubgSource {
    pub fn format(&self) -> MatchFormat {
        match self {
            Self::Sgf => MatchFormat::GnubgSgf,
            Self::Mat => MatchFormat::GnubgMat,
            Self::Text => MatchFormat::GnubgText,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GnubgMatchInfo {
    pub player_names: [String; 2],
    pub match_length: i32,
    pub event: String,
    pub round: String,
    pub place: String,
    pub date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GnubgMatch {
    pub source: GnubgSource,
    pub info: GnubgMatchInfo,
    pub games: Vec<GnubgGame>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GnubgGame {
    pub game_number: i32,
    pub score: [i32; 2],
    /// Winning player index, `-1` when unfinished.
    pub winner: i32,
    pub points: i32,
    pub records: Vec<GnubgRecord>,
}

/// gnubg's two-sided board: `an_board[1]` is the player on roll,
/// `an_board[0]` the opponent, each indexed 0-23 from its own side with 24
/// for the bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GnubgBoard {
    pub an_board: [[u8; 25]; 2],
    pub cube_value: u32,
    /// Absolute owner index, `-1` centred.
    pub cube_owner: i8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GnubgMoveEval {
    pub plies: i32,
    pub rollout: bool,
    pub moves: Vec<[i32; 2]>,
    pub equity: f64,
    pub chances: [f64; 6],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GnubgCubeEval {
    pub plies: i32,
    pub rollout: bool,
    pub chances: [f64; 6],
    pub cubeful_no_double: f64,
    pub cubeful_double_take: f64,
    pub cubeful_double_pass: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GnubgRecord {
    Move {
        player: u8,
        dice: [i32; 2],
        moves: Vec<[i32; 2]>,
        board: Option<GnubgBoard>,
        analysis: Vec<GnubgMoveEval>,
        cube_eval: Option<GnubgCubeEval>,
    },
    /// One side of a cube exchange: an offer, a response or a declined
    /// double.
    Cube {
        player: u8,
        action: String,
        board: Option<GnubgBoard>,
        evaluation: Option<GnubgCubeEval>,
    },
}

fn depth_of(plies: i32, rollout: bool) -> AnalysisDepth {
    if rollout {
        AnalysisDepth::Rollout
    } else {
        u8::try_from(plies)
            .ok()
            .and_then(|p| p.checked_add(1))
            .map(AnalysisDepth::Ply)
            .unwrap_or_default()
    }
}

impl GnubgBoard {
    pub fn to_snapshot(&self, on_roll: u8) -> Snapshot {
        let mut board = Board::empty();
        for (side, player) in [(1usize, on_roll), (0usize, 1 - on_roll)] {
            for (index, &count) in self.an_board[side].iter().enumerate() {
                if count > 0 {
                    let slot = Board::slot_for(player, index as i32 + 1);
                    board.points[slot] = Point::new(count, player as i8);
                }
            }
        }
        board.recompute_bearoff();

        let owner = if self.cube_owner == 0 || self.cube_owner == 1 {
            self.cube_owner
        } else {
            NO_COLOR
        };
        Snapshot {
            board,
            cube: Cube { owner, value: Cube::exponent_of(self.cube_value) },
        }
    }
}

impl GnubgCubeEval {
    fn to_evaluation(&self) -> CubeEvaluation {
        CubeEvaluation {
            depth: depth_of(self.plies, self.rollout),
            chances: chances_from(&self.chances),
            cubeful_no_double: self.cubeful_no_double,
            cubeful_double_take: self.cubeful_double_take,
            cubeful_double_pass: self.cubeful_double_pass,
            best_action: CubeEvaluation::best_action_for(
                self.cubeful_no_double,
                self.cubeful_double_take,
                self.cubeful_double_pass,
            )
            .to_string(),
        }
    }
}

/// A double waiting for its answer.
struct PendingOffer {
    player: u8,
    action: String,
    snapshot: Option<Snapshot>,
    evaluation: Option<CubeEvaluation>,
}

impl PendingOffer {
    fn resolve(self, response: Option<&str>) -> UniversalMove {
        let label = format!("{}/{}", self.action.trim(), response.map(str::trim).unwrap_or_default());
        UniversalMove {
            player: self.player,
            dice: [0, 0],
            action: UniversalAction::Cube { label },
            snapshot: self.snapshot,
            analysis: analysis_from(GNUBG_ENGINE, Vec::new(), self.evaluation),
        }
    }
}

impl GnubgMatch {
    pub fn to_universal(&self) -> Result<UniversalMatch, ImportError> {
        let encoding = PointEncoding::for_format(self.source.format());
        let info = &self.info;
        let header = MatchHeader {
            player1_name: info.player_names[0].clone(),
            player2_name: info.player_names[1].clone(),
            event: info.event.clone(),
            location: info.place.clone(),
            round: info.round.clone(),
            match_length: info.match_length,
            match_date: info.date.as_deref().and_then(parse_match_date),
        };

        let mut games = Vec::with_capacity(self.games.len());
        for game in &self.games {
            games.push(self.game_to_universal(game, &encoding)?);
        }
        Ok(UniversalMatch { header, games })
    }

    fn game_to_universal(&self, game: &GnubgGame, encoding: &PointEncoding) -> Result<UniversalGame, ImportError> {
        let mut moves = Vec::with_capacity(game.records.len());
        let mut pending_offer: Option<PendingOffer> = None;
        let mut pending_no_double: Option<CubeEvaluation> = None;

        for (index, record) in game.records.iter().enumerate() {
            match record {
                GnubgRecord::Cube { player, action, board, evaluation } => {
                    if *player > 1 {
                        return Err(ImportError::MalformedTranscript(format!(
                            "game {} record {}: player {player}",
                            game.game_number,
                            index + 1
                        )));
                    }
                    let evaluation = evaluation.as_ref().map(GnubgCubeEval::to_evaluation);
                    match classify_explicit(action) {
                        Some(CubeAction::NoDouble) => {
                            pending_no_double = evaluation;
                        }
                        Some(CubeAction::Take | CubeAction::Pass) => {
                            let offer = pending_offer.take().unwrap_or_else(|| PendingOffer {
                                player: 1 - *player,
                                action: "Double".to_string(),
                                snapshot: None,
                                evaluation: None,
                            });
                            moves.push(offer.resolve(Some(action)));
                        }
                        _ => {
                            if let Some(unanswered) = pending_offer.take() {
                                moves.push(unanswered.resolve(None));
                            }
                            pending_offer = Some(PendingOffer {
                                player: *player,
                                action: action.clone(),
                                snapshot: board.map(|b| b.to_snapshot(*player)),
                                evaluation,
                            });
                        }
                    }
                }
                GnubgRecord::Move { player, dice, moves: sub_moves, board, analysis, cube_eval } => {
                    if *player > 1 {
                        return Err(ImportError::MalformedTranscript(format!(
                            "game {} record {}: player {player}",
                            game.game_number,
                            index + 1
                        )));
                    }
                    if let Some(unanswered) = pending_offer.take() {
                        moves.push(unanswered.resolve(None));
                    }
                    let context = format!("game {} record {}", game.game_number, index + 1);
                    let checker_moves = analysis
                        .iter()
                        .enumerate()
                        .map(|(i, eval)| CheckerMoveEval {
                            index: i,
                            depth: depth_of(eval.plies, eval.rollout),
                            move_text: normalize_sub_moves(
                                &encoding.translate_all(eval.moves.iter().map(|m| (m[0], m[1]))),
                            ),
                            equity: eval.equity,
                            equity_error: None,
                            chances: chances_from(&eval.chances),
                        })
                        .collect();
                    let cube = cube_eval
                        .as_ref()
                        .map(GnubgCubeEval::to_evaluation)
                        .or(pending_no_double.take());

                    moves.push(UniversalMove {
                        player: *player,
                        dice: dice_from(*dice, &context)?,
                        action: UniversalAction::Checker {
                            sub_moves: encoding.translate_all(sub_moves.iter().map(|m| (m[0], m[1]))),
                        },
                        snapshot: board.map(|b| b.to_snapshot(*player)),
                        analysis: analysis_from(GNUBG_ENGINE, checker_moves, cube),
                    });
                }
            }
        }
        if let Some(unanswered) = pending_offer.take() {
            moves.push(unanswered.resolve(None));
        }

        Ok(UniversalGame {
            game_number: game.game_number,
            initial_score: game.score,
            winner: if game.winner == 0 || game.winner == 1 { game.winner } else { -1 },
            points_won: game.points,
            moves,
        })
    }
}
