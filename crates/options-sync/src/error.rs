use std::sync::Arc;

use options_sync_host::StorageError;
use thiserror::Error;
use tokio::sync::broadcast;

use crate::migrations::MigrationError;

/// Errors that can occur when working with an [OptionsSync](crate::OptionsSync).
#[derive(Debug, Error)]
pub enum OptionsError {
    /// Reading or writing the bucket failed, including corrupt stored data.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A migration step failed.
    #[error("Migration '{name}' failed: {source}")]
    Migration {
        /// Name of the failing migration.
        name: String,
        /// The error it raised.
        source: MigrationError,
    },

    /// Migrations failed earlier in this accessor's lifetime. Returned by every subsequent read
    /// and write, since migrations are attempted only once.
    #[error("Migrations failed: {0}")]
    MigrationsFailed(Arc<OptionsError>),

    /// The migration task ended without reporting, for example because a migration panicked.
    #[error("The migration runner stopped before completing")]
    RunnerStopped,

    /// Failed to serialize settings.
    #[error("Failed to serialize settings: {0}")]
    Json(#[from] serde_json::Error),

    /// An imported document is not a flat JSON object of option values.
    #[error("Invalid settings import: {0}")]
    InvalidImport(#[source] serde_json::Error),

    /// The change subscription was closed or fell behind.
    #[error(transparent)]
    Subscription(#[from] broadcast::error::RecvError),
}
