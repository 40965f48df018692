//! Canonical transcript: the format-independent form of a match that is
//! both hashed and persisted.

use std::fmt::Write as _;

use crate::models::enums::{CubeAction, DecisionKind, MatchFormat, MoveKind};
use crate::models::{Board, Cube, Position, PositionAnalysis, NO_COLOR};
use crate::pipeline::cube::classify_cube_action;
use crate::pipeline::formats::{MatchHeader, UniversalAction, UniversalMatch, UniversalMove};
use crate::pipeline::import::ImportError;
use crate::pipeline::notation::normalize_sub_moves_counting;
use crate::pipeline::replay::Replay;

#[derive(Debug, Clone, PartialEq)]
pub enum Play {
    Checker(String),
    Cube(CubeAction),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalMove {
    pub player: u8,
    /// Sorted ascending; `[0, 0]` for cube decisions.
    pub dice: [u8; 2],
    pub play: Play,
    /// Decision point before the move, when known.
    pub position: Option<Position>,
    pub analysis: Option<PositionAnalysis>,
}

impl CanonicalMove {
    pub fn kind(&self) -> MoveKind {
        match self.play {
            Play::Checker(_) => MoveKind::Checker,
            Play::Cube(_) => MoveKind::Cube,
        }
    }

    pub fn notation(&self) -> Option<&str> {
        match &self.play {
            Play::Checker(text) => Some(text),
            Play::Cube(_) => None,
        }
    }

    pub fn cube_action(&self) -> Option<CubeAction> {
        match self.play {
            Play::Cube(action) => Some(action),
            Play::Checker(_) => None,
        }
    }

    /// The responder's take/pass decision following a resolved double.
    pub fn response_position(&self) -> Option<Position> {
        let action = self.cube_action()?;
        action.response_label()?;
        let position = self.position?;
        Some(Position {
            cube: Cube {
                owner: NO_COLOR,
                value: position.cube.value.saturating_add(1),
            },
            player_on_roll: 1 - position.player_on_roll,
            ..position
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalGame {
    pub number: i32,
    pub initial_score: [i32; 2],
    pub winner: i32,
    pub points_won: i32,
    pub moves: Vec<CanonicalMove>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalTranscript {
    pub format: MatchFormat,
    pub header: MatchHeader,
    /// Lower-cased, trimmed player names.
    pub players: [String; 2],
    pub match_length: i32,
    pub games: Vec<CanonicalGame>,
    /// Sub-moves dropped by notation normalization.
    pub notation_warnings: usize,
}

impl CanonicalTranscript {
    /// Deterministic string fed to the canonical hash. Only the logical
    /// match goes in: names, length, game results, dice and plays.
    pub fn identity_string(&self) -> String {
        let mut out = String::new();
        let _ = write!(out, "meta:{}|{}|{}|", self.players[0], self.players[1], self.match_length);
        for (gi, game) in self.games.iter().enumerate() {
            let _ = write!(
                out,
                "g{gi}:{},{},{},{}|",
                game.initial_score[0], game.initial_score[1], game.winner, game.points_won
            );
            for (mi, mv) in game.moves.iter().enumerate() {
                let _ = match &mv.play {
                    Play::Checker(text) => {
                        write!(out, "m{mi}:checker,{}{},{}|", mv.dice[0], mv.dice[1], text)
                    }
                    Play::Cube(action) => write!(out, "m{mi}:cube,{}|", action.as_str()),
                };
            }
        }
        out
    }

    pub fn move_count(&self) -> usize {
        self.games.iter().map(|g| g.moves.len()).sum()
    }
}

pub fn normalize_player_name(name: &str) -> String {
    name.trim().to_lowercase()
}

fn away_score(match_length: i32, score: [i32; 2]) -> [i32; 2] {
    if match_length <= 0 {
        [-1, -1]
    } else {
        [match_length - score[0], match_length - score[1]]
    }
}

fn decision_position(
    state: Option<(Board, Cube)>,
    mv: &UniversalMove,
    score: [i32; 2],
    decision: DecisionKind,
) -> Option<Position> {
    let (board, cube) = state?;
    Some(Position {
        board,
        cube,
        dice: match decision {
            DecisionKind::CheckerPlay => mv.dice,
            DecisionKind::CubeAction => [0, 0],
        },
        score,
        player_on_roll: mv.player,
        decision,
    })
}

/// Build the canonical transcript of a universal match.
pub fn build(format: MatchFormat, source: &UniversalMatch) -> Result<CanonicalTranscript, ImportError> {
    let header = &source.header;
    if header.match_length < 0 {
        return Err(ImportError::MalformedTranscript(format!(
            "negative match length {}",
            header.match_length
        )));
    }

    let mut notation_warnings = 0;
    let mut games = Vec::with_capacity(source.games.len());

    for game in &source.games {
        let score = away_score(header.match_length, game.initial_score);
        let mut replay = Replay::new_game();
        let mut moves = Vec::with_capacity(game.moves.len());

        for (index, mv) in game.moves.iter().enumerate() {
            if let Some(snapshot) = &mv.snapshot {
                replay.resync(snapshot);
            }

            let canonical = match &mv.action {
                UniversalAction::Checker { sub_moves } => {
                    let position = decision_position(replay.state(), mv, score, DecisionKind::CheckerPlay);
                    let (text, rejected) = normalize_sub_moves_counting(sub_moves);
                    if rejected > 0 {
                        notation_warnings += rejected;
                        tracing::warn!(
                            game = game.game_number,
                            mv = index + 1,
                            rejected,
                            "Dropped invalid sub-moves"
                        );
                    }
                    if let Err(e) = replay.apply_checker(mv.player, sub_moves) {
                        tracing::warn!(
                            game = game.game_number,
                            mv = index + 1,
                            error = %e,
                            "Board replay lost sync"
                        );
                    }
                    let mut dice = mv.dice;
                    dice.sort_unstable();
                    CanonicalMove {
                        player: mv.player,
                        dice,
                        play: Play::Checker(text),
                        position,
                        analysis: mv.analysis.clone(),
                    }
                }
                UniversalAction::Cube { label } => {
                    let position = decision_position(replay.state(), mv, score, DecisionKind::CubeAction);
                    let action = classify_cube_action(label);
                    replay.apply_cube(mv.player, action);
                    CanonicalMove {
                        player: mv.player,
                        dice: [0, 0],
                        play: Play::Cube(action),
                        position,
                        analysis: mv.analysis.clone(),
                    }
                }
            };
            moves.push(canonical);
        }

        games.push(CanonicalGame {
            number: game.game_number,
            initial_score: game.initial_score,
            winner: game.winner,
            points_won: game.points_won,
            moves,
        });
    }

    Ok(CanonicalTranscript {
        format,
        header: header.clone(),
        players: [
            normalize_player_name(&header.player1_name),
            normalize_player_name(&header.player2_name),
        ],
        match_length: header.match_length,
        games,
        notation_warnings,
    })
}
