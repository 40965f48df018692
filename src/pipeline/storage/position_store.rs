use rusqlite::Connection;

use super::analysis_merge::{merge_analysis, record_cube_action, record_played_move};
use super::StorageError;
use crate::db::{repository, DatabaseError};
use crate::models::{Position, PositionAnalysis};

/// What was actually played from a position, recorded in its analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayedEntry<'a> {
    Checker(&'a str),
    Cube(&'a str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoredPosition {
    pub id: i64,
    pub created: bool,
}

/// Content-address `position` and fold its analysis into whatever the
/// store already knows about it.
pub fn store_or_reuse(
    conn: &Connection,
    position: &Position,
    analysis: Option<&PositionAnalysis>,
    played: Option<PlayedEntry<'_>>,
) -> Result<StoredPosition, StorageError> {
    position.validate()?;
    let identity_key = position.identity_key().map_err(DatabaseError::from)?;

    let stored = match repository::find_position_by_key(conn, &identity_key)? {
        Some(id) => {
            tracing::debug!(position_id = id, "Reusing stored position");
            StoredPosition { id, created: false }
        }
        None => {
            let state = position.canonical_state().map_err(DatabaseError::from)?;
            let id = repository::insert_position(conn, &identity_key, &state)?;
            StoredPosition { id, created: true }
        }
    };

    let existing = repository::get_analysis(conn, stored.id)?;
    let had_analysis = existing.is_some();
    let mut current = match (existing, analysis) {
        (Some(mut current), Some(incoming)) => {
            merge_analysis(&mut current, incoming);
            current
        }
        (Some(current), None) => current,
        (None, Some(incoming)) => {
            // First attach goes through the merge too, so candidates are
            // ranked and played moves normalized
            let mut fresh = PositionAnalysis::new("");
            merge_analysis(&mut fresh, incoming);
            fresh.created_at = incoming.created_at;
            fresh
        }
        (None, None) => PositionAnalysis::new(""),
    };

    match played {
        Some(PlayedEntry::Checker(text)) => record_played_move(&mut current, text),
        Some(PlayedEntry::Cube(label)) => record_cube_action(&mut current, label),
        None => {}
    }

    if had_analysis || !current.is_empty() {
        repository::upsert_analysis(conn, stored.id, &current)?;
    }
    Ok(stored)
}
