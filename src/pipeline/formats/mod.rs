//! Per-format transcripts and their translation into one universal shape.
//!
//! Byte-level parsing happens upstream behind [`FormatParser`]; this module
//! owns the native transcript types those parsers produce and the adapters
//! that map each native numbering onto universal `(from, to)` pairs.

pub mod bgf;
pub mod gnubg;
pub mod tables;
pub mod xg;

#[cfg(test)]
pub(crate) mod fixtures;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::models::enums::MatchFormat;
use crate::models::{Board, CheckerMoveEval, Cube, CubeEvaluation, PositionAnalysis, WinChances};
use crate::pipeline::import::ImportError;
use crate::pipeline::transcript::{self, CanonicalTranscript};

pub use bgf::*;
pub use gnubg::*;
pub use tables::PointEncoding;
pub use xg::*;

/// Produces a native transcript from raw artifact bytes.
pub trait FormatParser {
    fn format(&self) -> MatchFormat;
    fn parse(&self, bytes: &[u8]) -> Result<RawTranscript, ImportError>;
}

/// A parsed artifact, one variant per engine family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", content = "transcript")]
pub enum RawTranscript {
    Xg(XgMatch),
    Gnubg(GnubgMatch),
    Bgf(BgfMatch),
}

impl RawTranscript {
    pub fn format(&self) -> MatchFormat {
        match self {
            Self::Xg(_) => MatchFormat::Xg,
            Self::Gnubg(m) => m.source.format(),
            Self::Bgf(_) => MatchFormat::Bgf,
        }
    }

    /// Translate into the universal transcript (universal point numbering,
    /// folded cube records, decoded board snapshots).
    pub fn to_universal(&self) -> Result<UniversalMatch, ImportError> {
        match self {
            Self::Xg(m) => m.to_universal(),
            Self::Gnubg(m) => m.to_universal(),
            Self::Bgf(m) => m.to_universal(),
        }
    }

    pub fn normalize(&self) -> Result<CanonicalTranscript, ImportError> {
        let universal = self.to_universal()?;
        transcript::build(self.format(), &universal)
    }

    /// Exact native serialization, the input of the artifact hash.
    pub fn native_digest_input(&self) -> Result<String, serde_json::Error> {
        let native = match self {
            Self::Xg(m) => serde_json::to_string(m)?,
            Self::Gnubg(m) => serde_json::to_string(m)?,
            Self::Bgf(m) => serde_json::to_string(m)?,
        };
        Ok(format!("{}:{}", self.format().as_str(), native))
    }
}

/// Display header carried alongside the hashed identity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchHeader {
    pub player1_name: String,
    pub player2_name: String,
    pub event: String,
    pub location: String,
    pub round: String,
    pub match_length: i32,
    pub match_date: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UniversalMatch {
    pub header: MatchHeader,
    pub games: Vec<UniversalGame>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UniversalGame {
    pub game_number: i32,
    pub initial_score: [i32; 2],
    /// Winning player index, or -1 when the game was not finished.
    pub winner: i32,
    pub points_won: i32,
    pub moves: Vec<UniversalMove>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UniversalAction {
    Checker { sub_moves: Vec<(i32, i32)> },
    Cube { label: String },
}

/// Board state recorded by the source right before a decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot {
    pub board: Board,
    pub cube: Cube,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UniversalMove {
    pub player: u8,
    pub dice: [u8; 2],
    pub action: UniversalAction,
    pub snapshot: Option<Snapshot>,
    pub analysis: Option<PositionAnalysis>,
}

/// Parse the loosely formatted date strings engines write into headers.
pub fn parse_match_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y/%m/%d %H:%M"];
    const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y.%m.%d", "%d.%m.%Y"];

    DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(raw, f).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|f| NaiveDate::parse_from_str(raw, f).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

pub(crate) fn dice_from(native: [i32; 2], context: &str) -> Result<[u8; 2], ImportError> {
    let mut dice = [0u8; 2];
    for (slot, value) in dice.iter_mut().zip(native) {
        *slot = u8::try_from(value)
            .ok()
            .filter(|d| *d <= 6)
            .ok_or_else(|| ImportError::MalformedTranscript(format!("{context}: die value {value}")))?;
    }
    Ok(dice)
}

/// Win chances given as fractions, stored as percentages.
pub(crate) fn chances_from(raw: &[f64; 6]) -> WinChances {
    WinChances {
        player_win: raw[0] * 100.0,
        player_gammon: raw[1] * 100.0,
        player_backgammon: raw[2] * 100.0,
        opponent_win: raw[3] * 100.0,
        opponent_gammon: raw[4] * 100.0,
        opponent_backgammon: raw[5] * 100.0,
    }
}

pub(crate) fn analysis_from(
    engine: &str,
    checker_moves: Vec<CheckerMoveEval>,
    cube: Option<CubeEvaluation>,
) -> Option<PositionAnalysis> {
    if checker_moves.is_empty() && cube.is_none() {
        return None;
    }
    let mut analysis = PositionAnalysis::new(engine);
    analysis.checker_moves = checker_moves;
    analysis.cube = cube;
    Some(analysis)
}
