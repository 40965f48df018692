//! One 3-point match between Alice and Bob, written out in every supported
//! encoding.
//!
//! Game 1 (0-0): Alice 31 8/5 6/5; Bob 64 24/18 18/14; Alice declines to
//! double, rolls 62 24/18 13/11*; Bob doubles, Alice takes; Bob 54 bar/21
//! 13/8; Alice 44 13/9(2) 6/2(2); Alice redoubles, Bob drops. Alice +2.
//! Game 2 (2-0): Bob 65 24/18 18/13; Alice 52 13/8 13/11; Bob resigns.
//! Alice +1.

use super::*;
use crate::models::BOARD_SLOTS;

const PAD: i32 = -1;

fn xg_opening() -> XgPosition {
    let mut checkers = [0i8; BOARD_SLOTS];
    for (point, count) in [(24, 2), (13, 5), (8, 3), (6, 5)] {
        checkers[point] = count;
    }
    for (point, count) in [(1, -2), (12, -5), (17, -3), (19, -5)] {
        checkers[point] = count;
    }
    XgPosition { checkers, cube: 1, cube_pos: 0 }
}

/// Board before Bob's bar entry, seen from Bob's side.
fn xg_before_bar_entry() -> XgPosition {
    let mut checkers = [0i8; BOARD_SLOTS];
    for (point, count) in [(25, 1), (24, 1), (13, 5), (8, 3), (6, 5)] {
        checkers[point] = count;
    }
    for (point, count) in [(1, -1), (7, -1), (12, -4), (14, -1), (17, -2), (19, -4), (20, -2)] {
        checkers[point] = count;
    }
    XgPosition { checkers, cube: 2, cube_pos: -1 }
}

fn xg_checker(player: i32, dice: [i32; 2], pairs: &[(i32, i32)]) -> XgMove {
    XgMove::Checker {
        active_player: player,
        dice,
        played_move: flat(pairs),
        position: None,
        analysis: Vec::new(),
    }
}

fn xg_cube(player: i32, double: i32, take: i32) -> XgMove {
    XgMove::Cube { active_player: player, double, take, position: None, analysis: None }
}

fn flat(pairs: &[(i32, i32)]) -> [i32; 8] {
    let mut out = [PAD; 8];
    for (i, (from, to)) in pairs.iter().enumerate() {
        out[i * 2] = *from;
        out[i * 2 + 1] = *to;
    }
    out
}

pub(crate) fn xg_native() -> XgMatch {
    let (alice, bob) = (-1, 1);

    let mut opening = xg_checker(alice, [3, 1], &[(8, 5), (6, 5)]);
    if let XgMove::Checker { position, analysis, .. } = &mut opening {
        *position = Some(xg_opening());
        *analysis = vec![
            XgMoveAnalysis {
                depth: 2,
                moves: flat(&[(8, 5), (6, 5)]),
                equity: 0.152,
                chances: [0.54, 0.16, 0.01, 0.46, 0.12, 0.005],
            },
            XgMoveAnalysis {
                depth: 2,
                moves: flat(&[(24, 23), (13, 10)]),
                equity: -0.012,
                chances: [0.5, 0.14, 0.01, 0.5, 0.13, 0.006],
            },
        ];
    }

    let no_double = XgMove::Cube {
        active_player: alice,
        double: 0,
        take: -1,
        position: None,
        analysis: Some(XgCubeAnalysis {
            depth: 2,
            chances: [0.55, 0.15, 0.01, 0.45, 0.11, 0.004],
            cubeful_no_double: 0.11,
            cubeful_double_take: 0.05,
            cubeful_double_pass: 1.0,
        }),
    };

    let mut bar_entry = xg_checker(bob, [5, 4], &[(25, 21), (13, 8)]);
    if let XgMove::Checker { position, .. } = &mut bar_entry {
        *position = Some(xg_before_bar_entry());
    }

    let mut second_opening = xg_checker(bob, [6, 5], &[(24, 18), (18, 13)]);
    if let XgMove::Checker { position, .. } = &mut second_opening {
        *position = Some(xg_opening());
    }

    XgMatch {
        metadata: XgMetadata {
            player1_name: "Alice".into(),
            player2_name: "Bob".into(),
            event: "Club Championship".into(),
            location: "Online".into(),
            round: "Final".into(),
            match_length: 3,
            date_time: "2024-03-09 20:15:00".into(),
        },
        games: vec![
            XgGame {
                game_number: 1,
                initial_score: [0, 0],
                winner: alice,
                points_won: 2,
                moves: vec![
                    opening,
                    xg_checker(bob, [6, 4], &[(24, 18), (18, 14)]),
                    no_double,
                    xg_checker(alice, [6, 2], &[(24, 18), (13, 11)]),
                    xg_cube(bob, 1, 1),
                    bar_entry,
                    xg_checker(alice, [4, 4], &[(13, 9), (13, 9), (6, 2), (6, 2)]),
                    xg_cube(alice, 1, 0),
                ],
            },
            XgGame {
                game_number: 2,
                initial_score: [2, 0],
                winner: alice,
                points_won: 1,
                moves: vec![second_opening, xg_checker(alice, [5, 2], &[(13, 8), (13, 11)])],
            },
        ],
    }
}

pub(crate) fn xg_match() -> RawTranscript {
    RawTranscript::Xg(xg_native())
}

fn gnubg_checker(player: u8, dice: [i32; 2], moves: &[[i32; 2]]) -> GnubgRecord {
    GnubgRecord::Move {
        player,
        dice,
        moves: moves.to_vec(),
        board: None,
        analysis: Vec::new(),
        cube_eval: None,
    }
}

fn gnubg_cube(player: u8, action: &str) -> GnubgRecord {
    GnubgRecord::Cube { player, action: action.into(), board: None, evaluation: None }
}

fn gnubg_info() -> GnubgMatchInfo {
    GnubgMatchInfo {
        player_names: ["Alice".into(), "Bob".into()],
        match_length: 3,
        event: "Club Championship".into(),
        round: "Final".into(),
        place: "Online".into(),
        date: Some("2024-03-09".into()),
    }
}

/// Board before Alice's 62, Alice on roll.
fn sgf_before_hit() -> GnubgBoard {
    let mut an_board = [[0u8; 25]; 2];
    for (index, count) in [(23, 2), (12, 5), (7, 2), (5, 4), (4, 2)] {
        an_board[1][index] = count;
    }
    for (index, count) in [(23, 1), (13, 1), (12, 5), (7, 3), (5, 5)] {
        an_board[0][index] = count;
    }
    GnubgBoard { an_board, cube_value: 1, cube_owner: -1 }
}

pub(crate) fn sgf_native() -> GnubgMatch {
    let mut opening = gnubg_checker(0, [1, 3], &[[7, 4], [5, 4]]);
    if let GnubgRecord::Move { analysis, .. } = &mut opening {
        *analysis = vec![
            GnubgMoveEval {
                plies: 2,
                rollout: true,
                moves: vec![[7, 4], [5, 4]],
                equity: 0.161,
                chances: [0.545, 0.158, 0.009, 0.455, 0.121, 0.005],
            },
            GnubgMoveEval {
                plies: 2,
                rollout: false,
                moves: vec![[12, 9], [12, 11]],
                equity: -0.027,
                chances: [0.5, 0.14, 0.01, 0.5, 0.13, 0.006],
            },
        ];
    }

    let no_double = GnubgRecord::Cube {
        player: 0,
        action: "No double".into(),
        board: None,
        evaluation: Some(GnubgCubeEval {
            plies: 3,
            rollout: false,
            chances: [0.552, 0.149, 0.01, 0.448, 0.112, 0.004],
            cubeful_no_double: 0.108,
            cubeful_double_take: 0.047,
            cubeful_double_pass: 1.0,
        }),
    };

    let mut hit = gnubg_checker(0, [6, 2], &[[23, 17], [12, 10]]);
    if let GnubgRecord::Move { board, .. } = &mut hit {
        *board = Some(sgf_before_hit());
    }

    GnubgMatch {
        source: GnubgSource::Sgf,
        info: gnubg_info(),
        games: vec![
            GnubgGame {
                game_number: 1,
                score: [0, 0],
                winner: 0,
                points: 2,
                records: vec![
                    opening,
                    gnubg_checker(1, [4, 6], &[[23, 17], [17, 13]]),
                    no_double,
                    hit,
                    gnubg_cube(1, "Double"),
                    gnubg_cube(0, "Take"),
                    gnubg_checker(1, [4, 5], &[[24, 20], [12, 7]]),
                    gnubg_checker(0, [4, 4], &[[12, 8], [12, 8], [5, 1], [5, 1]]),
                    gnubg_cube(0, "Redouble"),
                    gnubg_cube(1, "Drop"),
                ],
            },
            GnubgGame {
                game_number: 2,
                score: [2, 0],
                winner: 0,
                points: 1,
                records: vec![
                    gnubg_checker(1, [5, 6], &[[23, 17], [17, 12]]),
                    gnubg_checker(0, [2, 5], &[[12, 7], [12, 10]]),
                ],
            },
        ],
    }
}

pub(crate) fn sgf_match() -> RawTranscript {
    RawTranscript::Gnubg(sgf_native())
}

pub(crate) fn mat_match() -> RawTranscript {
    RawTranscript::Gnubg(GnubgMatch {
        source: GnubgSource::Mat,
        info: gnubg_info(),
        games: vec![
            GnubgGame {
                game_number: 1,
                score: [0, 0],
                winner: 0,
                points: 2,
                records: vec![
                    gnubg_checker(0, [3, 1], &[[8, 5], [6, 5]]),
                    gnubg_checker(1, [6, 4], &[[24, 18], [18, 14]]),
                    gnubg_checker(0, [6, 2], &[[24, 18], [13, 11]]),
                    gnubg_cube(1, "Doubles"),
                    gnubg_cube(0, "Takes"),
                    gnubg_checker(1, [5, 4], &[[25, 21], [13, 8]]),
                    gnubg_checker(0, [4, 4], &[[13, 9], [13, 9], [6, 2], [6, 2]]),
                    gnubg_cube(0, "Doubles"),
                    gnubg_cube(1, "Drops"),
                ],
            },
            GnubgGame {
                game_number: 2,
                score: [2, 0],
                winner: 0,
                points: 1,
                records: vec![
                    gnubg_checker(1, [6, 5], &[[24, 18], [18, 13]]),
                    gnubg_checker(0, [5, 2], &[[13, 8], [13, 11]]),
                ],
            },
        ],
    })
}

fn bgf_turn(player: u8, dice: [i32; 2], pairs: &[(i32, i32)]) -> BgfMove {
    let mut from: Vec<i32> = pairs.iter().map(|p| p.0).collect();
    let mut to: Vec<i32> = pairs.iter().map(|p| p.1).collect();
    from.resize(4, PAD);
    to.resize(4, PAD);
    BgfMove { player, dice, from, to, cube: None }
}

fn bgf_cube(player: u8, label: &str) -> BgfMove {
    BgfMove { player, dice: [0, 0], from: Vec::new(), to: Vec::new(), cube: Some(label.into()) }
}

pub(crate) fn bgf_match() -> RawTranscript {
    RawTranscript::Bgf(BgfMatch {
        player_names: ["alice".into(), "bob ".into()],
        match_length: 3,
        event: "Club Championship".into(),
        date: Some("09.03.2024".into()),
        games: vec![
            BgfGame {
                score: [0, 0],
                winner: 0,
                points: 2,
                moves: vec![
                    bgf_turn(0, [3, 1], &[(8, 5), (6, 5)]),
                    bgf_turn(1, [6, 4], &[(24, 18), (18, 14)]),
                    bgf_cube(0, "No Double"),
                    bgf_turn(0, [6, 2], &[(24, 18), (13, 11)]),
                    bgf_cube(1, "Double/Take"),
                    bgf_turn(1, [5, 4], &[(25, 21), (13, 8)]),
                    bgf_turn(0, [4, 4], &[(13, 9), (13, 9), (6, 2), (6, 2)]),
                    bgf_cube(0, "Redouble/Pass"),
                ],
            },
            BgfGame {
                score: [2, 0],
                winner: 0,
                points: 1,
                moves: vec![
                    bgf_turn(1, [6, 5], &[(24, 18), (18, 13)]),
                    bgf_turn(0, [5, 2], &[(13, 8), (13, 11)]),
                ],
            },
        ],
    })
}
