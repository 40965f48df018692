use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use super::hash::{compute_hashes, MatchHashes};
use super::ImportError;
use crate::db::repository;
use crate::models::enums::MatchFormat;
use crate::models::{Game, Match, MatchArtifact, Move};
use crate::pipeline::formats::RawTranscript;
use crate::pipeline::storage::{store_or_reuse, PlayedEntry, StorageError};
use crate::pipeline::transcript::{CanonicalMove, CanonicalTranscript};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImportStatus {
    /// A new match with its games and moves.
    Inserted,
    /// Same logical match as an existing one; only positions and analysis
    /// were folded in.
    Merged,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportOutcome {
    pub match_id: i64,
    pub status: ImportStatus,
    pub format: MatchFormat,
    pub positions_created: usize,
    pub positions_reused: usize,
    pub notation_warnings: usize,
}

#[derive(Debug, Default)]
struct PositionTally {
    created: usize,
    reused: usize,
}

impl PositionTally {
    fn count(&mut self, created: bool) {
        if created {
            self.created += 1;
        } else {
            self.reused += 1;
        }
    }
}

/// Import one parsed artifact.
///
/// An artifact whose match hash is already recorded is rejected before any
/// write. Otherwise the match is inserted, or merged into the match sharing
/// its canonical hash, inside a single transaction.
pub fn import_transcript(
    conn: &Connection,
    raw: &RawTranscript,
    file_path: &str,
) -> Result<ImportOutcome, ImportError> {
    let format = raw.format();
    tracing::info!(format = format.as_str(), file = %file_path, "Transcript parsed");

    let transcript = raw.normalize()?;
    tracing::info!(
        format = format.as_str(),
        games = transcript.games.len(),
        moves = transcript.move_count(),
        notation_warnings = transcript.notation_warnings,
        "Transcript normalized"
    );

    let hashes = compute_hashes(raw, &transcript)?;
    tracing::info!(
        match_hash = %hashes.match_hash,
        canonical_hash = %hashes.canonical_hash,
        "Transcript hashed"
    );

    if let Some(existing_match_id) = repository::find_match_by_artifact_hash(conn, &hashes.match_hash)? {
        tracing::info!(existing_match_id, file = %file_path, "Duplicate artifact rejected");
        return Err(ImportError::DuplicateMatch { existing_match_id });
    }

    let tx = conn.unchecked_transaction()?;
    let outcome = match repository::find_match_by_canonical_hash(&tx, &hashes.canonical_hash)? {
        Some(match_id) => merge_into(&tx, match_id, &transcript, &hashes, file_path)?,
        None => insert_new(&tx, &transcript, &hashes, file_path)?,
    };
    tx.commit()?;

    tracing::info!(
        match_id = outcome.match_id,
        status = ?outcome.status,
        positions_created = outcome.positions_created,
        positions_reused = outcome.positions_reused,
        "Import committed"
    );
    Ok(outcome)
}

fn insert_new(
    conn: &Connection,
    transcript: &CanonicalTranscript,
    hashes: &MatchHashes,
    file_path: &str,
) -> Result<ImportOutcome, ImportError> {
    let now = chrono::Local::now().naive_local();
    let header = &transcript.header;
    let match_id = repository::insert_match(
        conn,
        &Match {
            id: 0,
            player1_name: header.player1_name.trim().to_string(),
            player2_name: header.player2_name.trim().to_string(),
            event: header.event.clone(),
            location: header.location.clone(),
            round: header.round.clone(),
            match_length: transcript.match_length,
            match_date: header.match_date,
            import_date: now,
            file_path: file_path.to_string(),
            source_format: transcript.format,
            game_count: transcript.games.len() as i32,
            match_hash: hashes.match_hash.clone(),
            canonical_hash: hashes.canonical_hash.clone(),
        },
    )?;
    record_artifact(conn, match_id, transcript.format, hashes, file_path)?;

    let mut tally = PositionTally::default();
    for game in &transcript.games {
        let game_id = repository::insert_game(
            conn,
            &Game {
                id: 0,
                match_id,
                game_number: game.number,
                initial_score: game.initial_score,
                winner: game.winner,
                points_won: game.points_won,
                move_count: game.moves.len() as i32,
            },
        )?;

        for (index, mv) in game.moves.iter().enumerate() {
            let (position_id, response_position_id) = store_move_positions(conn, match_id, mv, &mut tally)?;
            repository::insert_move(
                conn,
                &Move {
                    id: 0,
                    game_id,
                    move_number: index as i32 + 1,
                    kind: mv.kind(),
                    position_id,
                    response_position_id,
                    player: i32::from(mv.player),
                    dice: [i32::from(mv.dice[0]), i32::from(mv.dice[1])],
                    checker_move: mv.notation().map(str::to_string),
                    cube_action: mv.cube_action(),
                },
            )?;
        }
    }

    tracing::info!(match_id, games = transcript.games.len(), "New match inserted");
    Ok(ImportOutcome {
        match_id,
        status: ImportStatus::Inserted,
        format: transcript.format,
        positions_created: tally.created,
        positions_reused: tally.reused,
        notation_warnings: transcript.notation_warnings,
    })
}

fn merge_into(
    conn: &Connection,
    match_id: i64,
    transcript: &CanonicalTranscript,
    hashes: &MatchHashes,
    file_path: &str,
) -> Result<ImportOutcome, ImportError> {
    tracing::info!(match_id, "Same match already stored, merging positions");

    let mut tally = PositionTally::default();
    for mv in transcript.games.iter().flat_map(|g| &g.moves) {
        store_move_positions(conn, match_id, mv, &mut tally)?;
    }
    record_artifact(conn, match_id, transcript.format, hashes, file_path)?;

    Ok(ImportOutcome {
        match_id,
        status: ImportStatus::Merged,
        format: transcript.format,
        positions_created: tally.created,
        positions_reused: tally.reused,
        notation_warnings: transcript.notation_warnings,
    })
}

/// Store the decision point of a move and, for a resolved double, the
/// responder's take decision, linking both to the match. Returns both
/// position ids.
fn store_move_positions(
    conn: &Connection,
    match_id: i64,
    mv: &CanonicalMove,
    tally: &mut PositionTally,
) -> Result<(Option<i64>, Option<i64>), StorageError> {
    let Some(position) = &mv.position else {
        return Ok((None, None));
    };

    let played = match (mv.notation(), mv.cube_action()) {
        (Some(text), _) => Some(PlayedEntry::Checker(text)),
        (None, Some(action)) => Some(PlayedEntry::Cube(action.label())),
        (None, None) => None,
    };
    let stored = store_or_reuse(conn, position, mv.analysis.as_ref(), played)?;
    tally.count(stored.created);
    repository::link_match_position(conn, match_id, stored.id)?;

    let mut response_id = None;
    if let (Some(response), Some(label)) = (
        mv.response_position(),
        mv.cube_action().and_then(|a| a.response_label()),
    ) {
        let responded = store_or_reuse(conn, &response, None, Some(PlayedEntry::Cube(label)))?;
        tally.count(responded.created);
        repository::link_match_position(conn, match_id, responded.id)?;
        response_id = Some(responded.id);
    }

    Ok((Some(stored.id), response_id))
}

fn record_artifact(
    conn: &Connection,
    match_id: i64,
    format: MatchFormat,
    hashes: &MatchHashes,
    file_path: &str,
) -> Result<i64, ImportError> {
    let id = repository::insert_artifact(
        conn,
        &MatchArtifact {
            id: 0,
            match_id,
            match_hash: hashes.match_hash.clone(),
            source_format: format,
            file_path: file_path.to_string(),
            imported_at: chrono::Local::now().naive_local(),
        },
    )?;
    Ok(id)
}
