//! eXtreme Gammon transcripts.
//!
//! XG records every decision relative to the player on roll: players are
//! `-1` (first) and `1` (second), board points count from the roller's
//! side, the cube is stored as a face value.

use serde::{Deserialize, Serialize};

use super::{analysis_from, chances_from, dice_from, parse_match_date, MatchHeader, PointEncoding, Snapshot, UniversalAction, UniversalGame, UniversalMatch, UniversalMove};
use crate::models::enums::MatchFormat;
use crate::models::{
    AnalysisDepth, Board, CheckerMoveEval, Cube, CubeEvaluation, Point,
    BOARD_SLOTS, NO_COLOR,
};
use crate::pipeline::import::ImportError;
use crate::pipeline::notation::{is_valid_sub_move, normalize_sub_moves, BAR};

pub const XG_ENGINE: &str = "eXtreme Gammon";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct XgMetadata {
    pub player1_name: String,
    pub player2_name: String,
    pub event: String,
    pub location: String,
    pub round: String,
    pub match_length: i32,
    pub date_time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XgMatch {
    pub metadata: XgMetadata,
    pub games: Vec<XgGame>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XgGame {
    pub game_number: i32,
    pub initial_score: [i32; 2],
    /// `-1` first player, `1` second player, `0` unfinished.
    pub winner: i32,
    pub points_won: i32,
    pub moves: Vec<XgMove>,
}

/// Board relative to the active player: slots 1-24 are the roller's
/// points, 25 the roller's bar, 0 the opponent's bar. Positive counts are
/// the roller's checkers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct XgPosition {
    pub checkers: [i8; BOARD_SLOTS],
    pub cube: i32,
    /// `1` roller owns, `-1` opponent owns, `0` centred.
    pub cube_pos: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XgMoveAnalysis {
    pub depth: i32,
    pub moves: [i32; 8],
    pub equity: f64,
    /// Win, gammon, backgammon for the roller then the opponent, as fractions.
    pub chances: [f64; 6],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XgCubeAnalysis {
    pub depth: i32,
    pub chances: [f64; 6],
    pub cubeful_no_double: f64,
    pub cubeful_double_take: f64,
    pub cubeful_double_pass: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum XgMove {
    Checker {
        active_player: i32,
        dice: [i32; 2],
        played_move: [i32; 8],
        position: Option<XgPosition>,
        analysis: Vec<XgMoveAnalysis>,
    },
    Cube {
        active_player: i32,
        /// `0` no double, `1` double offered, `-2` initial-position marker.
        double: i32,
        /// `1` taken, anything else passed.
        take: i32,
        position: Option<XgPosition>,
        analysis: Option<XgCubeAnalysis>,
    },
}

/// Depth code stored by XG for an evaluation.
pub fn translate_depth(depth: i32) -> AnalysisDepth {
    match depth {
        0..=9 => AnalysisDepth::Ply(depth as u8 + 1),
        998..=1000 => AnalysisDepth::Book,
        1001 => AnalysisDepth::Roller,
        1002 => AnalysisDepth::RollerPlusPlus,
        _ => AnalysisDepth::Unknown,
    }
}

fn player_index(xg_player: i32) -> Result<u8, ImportError> {
    match xg_player {
        -1 => Ok(0),
        1 => Ok(1),
        other => Err(ImportError::MalformedTranscript(format!("XG player code {other}"))),
    }
}

fn winner_index(xg_winner: i32) -> i32 {
    match xg_winner {
        -1 => 0,
        1 => 1,
        _ => -1,
    }
}

/// Marker record XG writes for the starting position of a game.
const INITIAL_POSITION: i32 = -2;

fn raw_cube_label(double: i32, take: i32) -> Option<&'static str> {
    match (double, take) {
        (0, _) => Some("No Double"),
        (1, 1) => Some("Double/Take"),
        (1, _) => Some("Double/Pass"),
        _ => None,
    }
}

fn own_checkers(board: &Board, player: u8, point: i32) -> u8 {
    let slot = if point == BAR {
        Board::bar_slot(player)
    } else {
        Board::slot_for(player, point)
    };
    let p = board.points[slot];
    if p.color == player as i8 {
        p.checkers
    } else {
        0
    }
}

/// Board at the first record after `index` that carries one, as long as no
/// other checker play comes in between.
fn board_after(moves: &[XgMove], index: usize) -> Option<Board> {
    for mv in moves.iter().skip(index + 1) {
        let (active, position, checker) = match mv {
            XgMove::Checker { active_player, position, .. } => (*active_player, position, true),
            XgMove::Cube { active_player, position, .. } => (*active_player, position, false),
        };
        if let Some(p) = position {
            return player_index(active).ok().map(|player| p.to_snapshot(player).board);
        }
        if checker {
            return None;
        }
    }
    None
}

/// XG may store a doublet played by one checker group as a single pair
/// ("13/11" for 13/11(2)). Recover the repetition from how many checkers
/// left the source point between the two boards.
fn expand_doublet(
    sub_moves: Vec<(i32, i32)>,
    dice: [i32; 2],
    player: u8,
    before: Option<&Board>,
    after: Option<&Board>,
) -> Vec<(i32, i32)> {
    let (Some(before), Some(after)) = (before, after) else {
        return sub_moves;
    };
    if dice[0] != dice[1] || sub_moves.len() != 1 {
        return sub_moves;
    }
    let (from, to) = sub_moves[0];
    if !is_valid_sub_move(from, to) {
        return sub_moves;
    }
    let left = own_checkers(before, player, from).saturating_sub(own_checkers(after, player, from));
    let count = usize::from(left.clamp(1, 4));
    if count > 1 {
        tracing::debug!(from, to, count, "Expanded compact doublet");
    }
    vec![(from, to); count]
}

impl XgPosition {
    pub fn to_snapshot(&self, active: u8) -> Snapshot {
        let mut board = Board::empty();
        for (native, &count) in self.checkers.iter().enumerate() {
            if count == 0 {
                continue;
            }
            let color = if count > 0 { active } else { 1 - active };
            let slot = Board::slot_for(active, native as i32);
            board.points[slot] = Point::new(count.unsigned_abs(), color as i8);
        }
        board.recompute_bearoff();

        let owner = match self.cube_pos {
            1 => active as i8,
            -1 => (1 - active) as i8,
            _ => NO_COLOR,
        };
        let value = Cube::exponent_of(self.cube.max(1) as u32);
        Snapshot { board, cube: Cube { owner, value } }
    }
}

impl XgCubeAnalysis {
    fn to_evaluation(&self) -> CubeEvaluation {
        CubeEvaluation {
            depth: translate_depth(self.depth),
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

/// Candidate plays. A candidate recorded exactly like the compact played
/// move takes its expansion.
fn checker_evals(
    encoding: &PointEncoding,
    analysis: &[XgMoveAnalysis],
    compact: &[(i32, i32)],
    expanded: &[(i32, i32)],
) -> Vec<CheckerMoveEval> {
    analysis
        .iter()
        .enumerate()
        .map(|(index, a)| {
            let mut pairs = encoding.translate_all(a.moves.chunks_exact(2).map(|c| (c[0], c[1])));
            if pairs == compact {
                pairs = expanded.to_vec();
            }
            CheckerMoveEval {
                index,
                depth: translate_depth(a.depth),
                move_text: normalize_sub_moves(&pairs),
                equity: a.equity,
                equity_error: None,
                chances: chances_from(&a.chances),
            }
        })
        .collect()
}

impl XgMatch {
    pub fn to_universal(&self) -> Result<UniversalMatch, ImportError> {
        let encoding = PointEncoding::for_format(MatchFormat::Xg);
        let meta = &self.metadata;
        let header = MatchHeader {
            player1_name: meta.player1_name.clone(),
            player2_name: meta.player2_name.clone(),
            event: meta.event.clone(),
            location: meta.location.clone(),
            round: meta.round.clone(),
            match_length: meta.match_length,
            match_date: parse_match_date(&meta.date_time),
        };

        let mut games = Vec::with_capacity(self.games.len());
        for game in &self.games {
            let mut moves = Vec::with_capacity(game.moves.len());
            // Analysis of a skipped no-double decision, waiting for the
            // checker play it belongs to
            let mut pending_cube: Option<CubeEvaluation> = None;

            for (index, mv) in game.moves.iter().enumerate() {
                let context = format!("game {} move {}", game.game_number, index + 1);
                match mv {
                    XgMove::Cube { double: INITIAL_POSITION, .. } => {}
                    XgMove::Cube { double: 0, analysis, .. } => {
                        pending_cube = analysis.as_ref().map(XgCubeAnalysis::to_evaluation);
                    }
                    XgMove::Cube { active_player, double, take, position, analysis } => {
                        let player = player_index(*active_player)?;
                        let label = raw_cube_label(*double, *take).ok_or_else(|| {
                            ImportError::MalformedTranscript(format!("{context}: XG cube code {double}"))
                        })?;
                        moves.push(UniversalMove {
                            player,
                            dice: [0, 0],
                            action: UniversalAction::Cube { label: label.to_string() },
                            snapshot: position.map(|p| p.to_snapshot(player)),
                            analysis: analysis_from(
                                XG_ENGINE,
                                Vec::new(),
                                analysis.as_ref().map(XgCubeAnalysis::to_evaluation),
                            ),
                        });
                        pending_cube = None;
                    }
                    XgMove::Checker { active_player, dice, played_move, position, analysis } => {
                        let player = player_index(*active_player)?;
                        let compact = encoding
                            .translate_all(played_move.chunks_exact(2).map(|c| (c[0], c[1])));
                        let snapshot = position.map(|p| p.to_snapshot(player));
                        let sub_moves = expand_doublet(
                            compact.clone(),
                            *dice,
                            player,
                            snapshot.as_ref().map(|s| &s.board),
                            board_after(&game.moves, index).as_ref(),
                        );
                        let evals = checker_evals(&encoding, analysis, &compact, &sub_moves);
                        moves.push(UniversalMove {
                            player,
                            dice: dice_from(*dice, &context)?,
                            action: UniversalAction::Checker { sub_moves },
                            snapshot,
                            analysis: analysis_from(XG_ENGINE, evals, pending_cube.take()),
                        });
                    }
                }
            }

            games.push(UniversalGame {
                game_number: game.game_number,
                initial_score: game.initial_score,
                winner: winner_index(game.winner),
                points_won: game.points_won,
                moves,
            });
        }

        Ok(UniversalMatch { header, games })
    }
}
