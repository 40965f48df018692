use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Evaluation depth, ordered from least to most authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum AnalysisDepth {
    #[default]
    Unknown,
    Ply(u8),
    Book,
    Roller,
    RollerPlusPlus,
    Rollout,
}

impl AnalysisDepth {
    pub fn label(&self) -> String {
        match self {
            Self::Unknown => "Unknown".to_string(),
            Self::Ply(n) => format!("{n}-ply"),
            Self::Book => "Book".to_string(),
            Self::Roller => "XG Roller".to_string(),
            Self::RollerPlusPlus => "XG Roller++".to_string(),
            Self::Rollout => "Rollout".to_string(),
        }
    }
}

/// Winning chances from the point of view of the player on roll, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WinChances {
    pub player_win: f64,
    pub player_gammon: f64,
    pub player_backgammon: f64,
    pub opponent_win: f64,
    pub opponent_gammon: f64,
    pub opponent_backgammon: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckerMoveEval {
    pub index: usize,
    pub depth: AnalysisDepth,
    pub move_text: String,
    pub equity: f64,
    pub equity_error: Option<f64>,
    pub chances: WinChances,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CubeEvaluation {
    pub depth: AnalysisDepth,
    pub chances: WinChances,
    pub cubeful_no_double: f64,
    pub cubeful_double_take: f64,
    pub cubeful_double_pass: f64,
    pub best_action: String,
}

impl CubeEvaluation {
    /// Best cube action given the three cubeful equities: the opponent picks
    /// the smaller of take/pass, the doubler picks the larger of that and
    /// no-double.
    pub fn best_action_for(no_double: f64, double_take: f64, double_pass: f64) -> &'static str {
        let effective_double = double_take.min(double_pass);
        if effective_double > no_double {
            if double_take <= double_pass {
                "Double, Take"
            } else {
                "Double, Pass"
            }
        } else {
            "No Double"
        }
    }
}

/// Everything known about one position, merged across every import that
/// reached it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionAnalysis {
    pub engine: String,
    pub checker_moves: Vec<CheckerMoveEval>,
    pub cube: Option<CubeEvaluation>,
    pub played_moves: Vec<String>,
    pub played_cube_actions: Vec<String>,
    pub created_at: NaiveDateTime,
    pub modified_at: NaiveDateTime,
}

impl PositionAnalysis {
    pub fn new(engine: &str) -> Self {
        let now = chrono::Local::now().naive_local();
        Self {
            engine: engine.to_string(),
            checker_moves: Vec::new(),
            cube: None,
            played_moves: Vec::new(),
            played_cube_actions: Vec::new(),
            created_at: now,
            modified_at: now,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.checker_moves.is_empty()
            && self.cube.is_none()
            && self.played_moves.is_empty()
            && self.played_cube_actions.is_empty()
    }
}
