//! Error types for the TUI.

use crate::config::ConfigError;
use dispenser_core::DispenserError;
use dispenser_storage::LmdbStoreError;

#[derive(Debug, thiserror::Error)]
pub enum TuiError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Store(#[from] LmdbStoreError),
    #[error(transparent)]
    Dispenser(#[from] DispenserError),
    #[error("Failed to initialise logging: {0}")]
    Logging(String),
}
