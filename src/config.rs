use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "BgArchive";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Largest artifact accepted by file import (64 MB).
pub const MAX_ARTIFACT_SIZE: u64 = 64 * 1024 * 1024;

const DATABASE_FILE: &str = "archive.db";

/// Get the application data directory.
/// ~/BgArchive/ on all platforms, falling back to the working directory
/// when no home directory is known.
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Default location of the match archive database.
pub fn default_database_path() -> PathBuf {
    app_data_dir().join(DATABASE_FILE)
}

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "bgarchive=info,warn"
}
