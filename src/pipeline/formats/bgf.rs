//! BGBlitz transcripts. Moves only: no boards, no analysis.

use serde::{Deserialize, Serialize};

use super::{dice_from, parse_match_date, MatchHeader, PointEncoding, UniversalAction, UniversalGame, UniversalMatch, UniversalMove};
use crate::models::enums::{CubeAction, MatchFormat};
use crate::pipeline::cube::classify_explicit;
use crate::pipeline::import::ImportError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BgfMatch {
    pub player_names: [String; 2],
    pub match_length: i32,
    pub event: String,
    pub date: Option<String>,
    pub games: Vec<BgfGame>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BgfGame {
    pub score: [i32; 2],
    pub winner: i32,
    pub points: i32,
    pub moves: Vec<BgfMove>,
}

/// One turn. `from`/`to` are parallel lists padded with `-1`; a turn with
/// `cube` set is a cube exchange written as "offer/response".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BgfMove {
    pub player: u8,
    pub dice: [i32; 2],
    pub from: Vec<i32>,
    pub to: Vec<i32>,
    pub cube: Option<String>,
}

impl BgfMatch {
    pub fn to_universal(&self) -> Result<UniversalMatch, ImportError> {
        let encoding = PointEncoding::for_format(MatchFormat::Bgf);
        let header = MatchHeader {
            player1_name: self.player_names[0].clone(),
            player2_name: self.player_names[1].clone(),
            event: self.event.clone(),
            match_length: self.match_length,
            match_date: self.date.as_deref().and_then(parse_match_date),
            ..Default::default()
        };

        let mut games = Vec::with_capacity(self.games.len());
        for (game_index, game) in self.games.iter().enumerate() {
            let game_number = game_index as i32 + 1;
            let mut moves = Vec::with_capacity(game.moves.len());

            for (index, mv) in game.moves.iter().enumerate() {
                let context = format!("game {game_number} move {}", index + 1);
                if mv.player > 1 {
                    return Err(ImportError::MalformedTranscript(format!("{context}: player {}", mv.player)));
                }
                if mv.from.len() != mv.to.len() {
                    return Err(ImportError::MalformedTranscript(format!(
                        "{context}: {} origins for {} destinations",
                        mv.from.len(),
                        mv.to.len()
                    )));
                }

                let action = match &mv.cube {
                    Some(label) if classify_explicit(label) == Some(CubeAction::NoDouble) => continue,
                    Some(label) => UniversalAction::Cube { label: label.clone() },
                    None => UniversalAction::Checker {
                        sub_moves: encoding.translate_all(mv.from.iter().copied().zip(mv.to.iter().copied())),
                    },
                };
                let dice = match action {
                    UniversalAction::Cube { .. } => [0, 0],
                    UniversalAction::Checker { .. } => dice_from(mv.dice, &context)?,
                };
                moves.push(UniversalMove {
                    player: mv.player,
                    dice,
                    action,
                    snapshot: None,
                    analysis: None,
                });
            }

            games.push(UniversalGame {
                game_number,
                initial_score: game.score,
                winner: if game.winner == 0 || game.winner == 1 { game.winner } else { -1 },
                points_won: game.points,
                moves,
            });
        }

        Ok(UniversalMatch { header, games })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(player: u8, dice: [i32; 2], from: Vec<i32>, to: Vec<i32>) -> BgfMove {
        BgfMove { player, dice, from, to, cube: None }
    }

    fn cube_turn(player: u8, label: &str) -> BgfMove {
        BgfMove { player, dice: [0, 0], from: Vec::new(), to: Vec::new(), cube: Some(label.into()) }
    }

    fn single_game(moves: Vec<BgfMove>) -> BgfMatch {
        BgfMatch {
            player_names: ["Alice".into(), "Bob".into()],
            match_length: 3,
            event: String::new(),
            date: None,
            games: vec![BgfGame { score: [0, 0], winner: 0, points: 1, moves }],
        }
    }

    #[test]
    fn padding_and_bear_off_translate() {
        let m = single_game(vec![turn(0, [6, 5], vec![6, 5, -1, -1], vec![0, 0, -1, -1])]);
        let universal = m.to_universal().unwrap();
        assert_eq!(
            universal.games[0].moves[0].action,
            UniversalAction::Checker { sub_moves: vec![(6, -2), (5, -2)] }
        );
    }

    #[test]
    fn declined_double_is_dropped() {
        let m = single_game(vec![cube_turn(0, "No Double"), cube_turn(1, "Double/Take")]);
        let universal = m.to_universal().unwrap();
        let moves = &universal.games[0].moves;
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].dice, [0, 0]);
        assert_eq!(moves[0].player, 1);
    }

    #[test]
    fn unbalanced_lists_are_malformed() {
        let m = single_game(vec![turn(0, [3, 1], vec![8, 6], vec![5])]);
        assert!(matches!(m.to_universal(), Err(ImportError::MalformedTranscript(_))));
    }

    #[test]
    fn games_are_numbered_from_one() {
        let universal = single_game(Vec::new()).to_universal().unwrap();
        assert_eq!(universal.games[0].game_number, 1);
    }
}
