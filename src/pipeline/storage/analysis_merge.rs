use std::cmp::Ordering;

use crate::models::{CheckerMoveEval, CubeEvaluation, PositionAnalysis};
use crate::pipeline::notation::normalize_played_move;

/// Fold `incoming` into `existing`. Checker candidates are keyed by move
/// text; a candidate is replaced only by an evaluation at least as deep.
pub fn merge_analysis(existing: &mut PositionAnalysis, incoming: &PositionAnalysis) {
    if existing.engine.is_empty() {
        existing.engine = incoming.engine.clone();
    }

    for candidate in &incoming.checker_moves {
        match existing
            .checker_moves
            .iter_mut()
            .find(|m| m.move_text == candidate.move_text)
        {
            Some(current) if candidate.depth >= current.depth => *current = candidate.clone(),
            Some(_) => {}
            None => existing.checker_moves.push(candidate.clone()),
        }
    }
    rank_checker_moves(&mut existing.checker_moves);

    existing.cube = deeper_cube(existing.cube.take(), incoming.cube.as_ref());

    for played in &incoming.played_moves {
        record_played_move(existing, played);
    }
    for action in &incoming.played_cube_actions {
        record_cube_action(existing, action);
    }

    existing.modified_at = chrono::Local::now().naive_local();
}

/// Append a played checker move unless an equivalent one is recorded.
pub fn record_played_move(analysis: &mut PositionAnalysis, played: &str) {
    let played = normalize_played_move(played);
    if !analysis.played_moves.contains(&played) {
        analysis.played_moves.push(played);
    }
}

pub fn record_cube_action(analysis: &mut PositionAnalysis, action: &str) {
    if !analysis.played_cube_actions.iter().any(|a| a == action) {
        analysis.played_cube_actions.push(action.to_string());
    }
}

/// Sort by equity, best first, then renumber and measure every candidate
/// against the new top move.
pub fn rank_checker_moves(moves: &mut [CheckerMoveEval]) {
    moves.sort_by(|a, b| b.equity.partial_cmp(&a.equity).unwrap_or(Ordering::Equal));
    let best = match moves.first() {
        Some(top) => top.equity,
        None => return,
    };
    for (index, m) in moves.iter_mut().enumerate() {
        m.index = index;
        m.equity_error = (index > 0).then(|| best - m.equity);
    }
}

fn deeper_cube(existing: Option<CubeEvaluation>, incoming: Option<&CubeEvaluation>) -> Option<CubeEvaluation> {
    match (existing, incoming) {
        (Some(current), Some(new)) if new.depth > current.depth => Some(new.clone()),
        (Some(current), _) => Some(current),
        (None, new) => new.cloned(),
    }
}
