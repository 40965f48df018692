pub mod config;
pub mod db;
pub mod models;
pub mod pipeline;
pub mod store;

pub use pipeline::formats::{FormatParser, RawTranscript};
pub use pipeline::import::{ImportError, ImportOutcome, ImportStatus};
pub use store::{BatchImportResult, BatchStatus, MatchStore};

use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber. `RUST_LOG` overrides the default
/// filter. Safe to call more than once.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);
}
