pub mod format;
pub mod hash;
pub mod importer;

pub use format::*;
pub use hash::*;
pub use importer::*;

use thiserror::Error;

use crate::db::DatabaseError;
use crate::pipeline::storage::StorageError;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("File too large: {size_mb:.1}MB exceeds {max_mb}MB limit")]
    FileTooLarge { size_mb: f64, max_mb: u64 },

    #[error("Could not parse {format} transcript: {reason}")]
    Parse { format: String, reason: String },

    #[error("Malformed transcript: {0}")]
    MalformedTranscript(String),

    #[error("Duplicate match: this artifact was already imported as match {existing_match_id}")]
    DuplicateMatch { existing_match_id: i64 },

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Archive lock poisoned")]
    LockPoisoned,
}

impl ImportError {
    /// Recoverable rejection of an artifact that is already stored.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::DuplicateMatch { .. })
    }
}

impl From<rusqlite::Error> for ImportError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Database(DatabaseError::from(e))
    }
}
