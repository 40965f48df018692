//! `MatchStore`: the archive session owning the single SQLite connection.
//!
//! Every operation takes the connection lock for its whole duration, so an
//! import's duplicate check and its insert or merge cannot interleave with
//! another import.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::config;
use crate::db::{self, repository};
use crate::models::{DatabaseStats, Game, Match, Move, Position, PositionAnalysis};
use crate::pipeline::formats::{FormatParser, RawTranscript};
use crate::pipeline::import::{detect_format, importer, sanitize_filename, ImportError, ImportOutcome, ImportStatus};

/// Per-file result of a batch import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum BatchStatus {
    Inserted,
    Merged,
    Duplicate,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchImportResult {
    pub path: String,
    pub status: BatchStatus,
    pub match_id: Option<i64>,
}

pub struct MatchStore {
    conn: Mutex<Connection>,
}

impl MatchStore {
    /// Open (or create) the archive at `path` and apply migrations.
    pub fn open(path: &Path) -> Result<Self, ImportError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = db::open_database(path)?;
        tracing::info!(path = %path.display(), "Match archive opened");
        Ok(Self::from_connection(conn))
    }

    pub fn open_default() -> Result<Self, ImportError> {
        Self::open(&config::default_database_path())
    }

    pub fn open_in_memory() -> Result<Self, ImportError> {
        Ok(Self::from_connection(db::open_memory_database()?))
    }

    fn from_connection(conn: Connection) -> Self {
        Self { conn: Mutex::new(conn) }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, ImportError> {
        self.conn.lock().map_err(|_| ImportError::LockPoisoned)
    }

    // ── Import ──────────────────────────────────────────────

    /// Import an already-parsed transcript.
    pub fn import_transcript(&self, raw: &RawTranscript, file_path: &str) -> Result<ImportOutcome, ImportError> {
        let conn = self.lock()?;
        importer::import_transcript(&conn, raw, file_path)
    }

    /// Detect the format of `path`, parse it with the matching parser and
    /// import it.
    pub fn import_file(&self, path: &Path, parsers: &[&dyn FormatParser]) -> Result<ImportOutcome, ImportError> {
        let detection = detect_format(path)?;
        let format = detection
            .format
            .ok_or_else(|| ImportError::UnsupportedFormat(path.display().to_string()))?;

        if detection.file_size_bytes > config::MAX_ARTIFACT_SIZE {
            return Err(ImportError::FileTooLarge {
                size_mb: detection.file_size_bytes as f64 / (1024.0 * 1024.0),
                max_mb: config::MAX_ARTIFACT_SIZE / (1024 * 1024),
            });
        }

        let parser = parsers
            .iter()
            .find(|p| p.format() == format)
            .ok_or_else(|| ImportError::UnsupportedFormat(format!("no parser registered for {}", format.as_str())))?;

        tracing::info!(
            file = %sanitize_filename(&path.to_string_lossy()),
            format = format.as_str(),
            size_bytes = detection.file_size_bytes,
            "Importing match file"
        );
        let conn = self.lock()?;
        let bytes = std::fs::read(path)?;
        let raw = parser.parse(&bytes)?;
        importer::import_transcript(&conn, &raw, &path.to_string_lossy())
    }

    /// Import every file, reporting each outcome. One failing file never
    /// stops the batch.
    pub fn import_files(&self, paths: &[PathBuf], parsers: &[&dyn FormatParser]) -> Vec<BatchImportResult> {
        let mut results = Vec::with_capacity(paths.len());

        for path in paths {
            let (status, match_id) = match self.import_file(path, parsers) {
                Ok(outcome) => {
                    let status = match outcome.status {
                        ImportStatus::Inserted => BatchStatus::Inserted,
                        ImportStatus::Merged => BatchStatus::Merged,
                    };
                    (status, Some(outcome.match_id))
                }
                Err(ImportError::DuplicateMatch { existing_match_id }) => {
                    (BatchStatus::Duplicate, Some(existing_match_id))
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Batch import: file failed");
                    (BatchStatus::Failed(e.to_string()), None)
                }
            };
            results.push(BatchImportResult {
                path: path.display().to_string(),
                status,
                match_id,
            });
        }

        tracing::info!(
            files = paths.len(),
            failed = results.iter().filter(|r| matches!(r.status, BatchStatus::Failed(_))).count(),
            "Batch import finished"
        );
        results
    }

    // ── Deletion ────────────────────────────────────────────

    /// Delete a match with its games, moves and artifacts, plus every
    /// position nothing else references. Returns the positions removed.
    pub fn delete_match(&self, match_id: i64) -> Result<usize, ImportError> {
        let conn = self.lock()?;
        let tx = conn.unchecked_transaction()?;
        let removed = repository::delete_match(&tx, match_id)?;
        tx.commit()?;

        tracing::info!(match_id, positions_removed = removed, "Match deleted");
        Ok(removed)
    }

    // ── Queries ─────────────────────────────────────────────

    pub fn get_match(&self, match_id: i64) -> Result<Option<Match>, ImportError> {
        Ok(repository::get_match(&*self.lock()?, match_id)?)
    }

    pub fn list_matches(&self) -> Result<Vec<Match>, ImportError> {
        Ok(repository::list_matches(&*self.lock()?)?)
    }

    pub fn list_games(&self, match_id: i64) -> Result<Vec<Game>, ImportError> {
        Ok(repository::list_games(&*self.lock()?, match_id)?)
    }

    pub fn list_moves(&self, game_id: i64) -> Result<Vec<Move>, ImportError> {
        Ok(repository::list_moves(&*self.lock()?, game_id)?)
    }

    pub fn load_position(&self, position_id: i64) -> Result<Option<Position>, ImportError> {
        Ok(repository::get_position(&*self.lock()?, position_id)?)
    }

    pub fn load_analysis(&self, position_id: i64) -> Result<Option<PositionAnalysis>, ImportError> {
        Ok(repository::get_analysis(&*self.lock()?, position_id)?)
    }

    pub fn stats(&self) -> Result<DatabaseStats, ImportError> {
        Ok(repository::get_stats(&*self.lock()?)?)
    }
}
