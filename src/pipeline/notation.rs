//! Canonical checker-move notation.
//!
//! Input is always in universal numbering: points 1-24 from the mover's
//! perspective, 25 for the bar, `BEAR_OFF` for a checker leaving the board.
//! Format adapters translate their native numbering before calling in.

use std::cmp::Ordering;

use thiserror::Error;

pub const BAR: i32 = 25;
pub const BEAR_OFF: i32 = -2;
pub const CANNOT_MOVE: &str = "Cannot Move";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotationError {
    #[error("Invalid sub-move encoding {from}/{to}")]
    InvalidMoveEncoding { from: i32, to: i32 },
}

/// A validated sub-move, destination already resolved to `BEAR_OFF` when
/// the checker leaves the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SubMove {
    from: i32,
    to: i32,
}

impl SubMove {
    fn validate(from: i32, to: i32) -> Result<Self, NotationError> {
        if !(1..=BAR).contains(&from) {
            return Err(NotationError::InvalidMoveEncoding { from, to });
        }
        let to = match to {
            1..=24 => to,
            BEAR_OFF => BEAR_OFF,
            _ if to <= 0 && (1..=6).contains(&from) => BEAR_OFF,
            _ => return Err(NotationError::InvalidMoveEncoding { from, to }),
        };
        Ok(Self { from, to })
    }
}

fn canonical_order(a: &(i32, i32), b: &(i32, i32)) -> Ordering {
    b.0.cmp(&a.0).then(a.1.cmp(&b.1))
}

fn point_label(point: i32) -> String {
    match point {
        BAR => "bar".to_string(),
        BEAR_OFF => "off".to_string(),
        p => p.to_string(),
    }
}

fn render(mut moves: Vec<SubMove>) -> String {
    if moves.is_empty() {
        return CANNOT_MOVE.to_string();
    }
    moves.sort_by(|a, b| canonical_order(&(a.from, a.to), &(b.from, b.to)));

    let mut groups: Vec<(SubMove, usize)> = Vec::new();
    for mv in moves {
        match groups.last_mut() {
            Some((last, count)) if *last == mv => *count += 1,
            _ => groups.push((mv, 1)),
        }
    }

    groups
        .iter()
        .map(|(mv, count)| {
            let base = format!("{}/{}", point_label(mv.from), point_label(mv.to));
            if *count > 1 {
                format!("{base}({count})")
            } else {
                base
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Canonical notation, rejecting the whole move on the first bad pair.
pub fn try_normalize_sub_moves(pairs: &[(i32, i32)]) -> Result<String, NotationError> {
    let moves = pairs
        .iter()
        .map(|&(from, to)| SubMove::validate(from, to))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(render(moves))
}

/// Canonical notation, dropping invalid pairs. Degrades to "Cannot Move"
/// when nothing survives.
pub fn normalize_sub_moves(pairs: &[(i32, i32)]) -> String {
    normalize_sub_moves_counting(pairs).0
}

/// Like [`normalize_sub_moves`], also returning how many pairs were dropped.
pub fn normalize_sub_moves_counting(pairs: &[(i32, i32)]) -> (String, usize) {
    let mut rejected = 0;
    let moves: Vec<SubMove> = pairs
        .iter()
        .filter_map(|&(from, to)| match SubMove::validate(from, to) {
            Ok(mv) => Some(mv),
            Err(e) => {
                tracing::debug!(error = %e, "Dropping sub-move");
                rejected += 1;
                None
            }
        })
        .collect();
    (render(moves), rejected)
}

/// Whether a pair names a playable sub-move: a source on the board or bar,
/// and a destination on the board or off it.
pub fn is_valid_sub_move(from: i32, to: i32) -> bool {
    SubMove::validate(from, to).is_ok()
}

fn parse_point(label: &str) -> Option<i32> {
    match label {
        "bar" => Some(BAR),
        "off" => Some(BEAR_OFF),
        other => other.parse().ok(),
    }
}

/// Sort key of one rendered token ("13/8(2)" -> (13, 8)).
fn token_key(token: &str) -> Option<(i32, i32)> {
    let body = token.split('(').next()?;
    let (from, to) = body.split_once('/')?;
    Some((parse_point(from)?, parse_point(to)?))
}

/// Reorder the tokens of an already-rendered move into canonical order so
/// equivalent spellings compare equal. Tokens that do not parse keep their
/// relative order after the parsed ones.
pub fn normalize_played_move(text: &str) -> String {
    let text = text.trim();
    if text.eq_ignore_ascii_case(CANNOT_MOVE) {
        return CANNOT_MOVE.to_string();
    }
    let mut parsed: Vec<((i32, i32), &str)> = Vec::new();
    let mut unparsed: Vec<&str> = Vec::new();
    for token in text.split_whitespace() {
        match token_key(token) {
            Some(key) => parsed.push((key, token)),
            None => unparsed.push(token),
        }
    }
    parsed.sort_by(|a, b| canonical_order(&a.0, &b.0));
    parsed
        .into_iter()
        .map(|(_, token)| token)
        .chain(unparsed)
        .collect::<Vec<_>>()
        .join(" ")
}
