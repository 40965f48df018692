//! Content-addressed position store and analysis merging.

pub mod analysis_merge;
pub mod position_store;

pub use analysis_merge::merge_analysis;
pub use position_store::{store_or_reuse, PlayedEntry, StoredPosition};

use thiserror::Error;

use crate::db::DatabaseError;
use crate::models::PositionError;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Invalid position: {0}")]
    InvalidPosition(#[from] PositionError),
}
