//! Tracing subscriber setup.
//!
//! Output goes to a file because the terminal is in raw mode while the UI
//! runs.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::TuiError;

pub const DEFAULT_FILTER: &str = "dispenser_ledger=info,dispenser_storage=info,warn";

/// Install the global subscriber, appending to `path`.
///
/// `RUST_LOG` takes precedence over `filter`, which falls back to
/// [`DEFAULT_FILTER`].
pub fn init(path: &Path, filter: Option<&str>) -> Result<(), TuiError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter.unwrap_or(DEFAULT_FILTER)))
        .map_err(|e| TuiError::Logging(e.to_string()))?;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .try_init()
        .map_err(|e| TuiError::Logging(e.to_string()))?;

    tracing::info!(log_path = %path.display(), "Logging initialised");
    Ok(())
}
