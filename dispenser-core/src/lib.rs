//! Dispenser Core - Ledger Types
//!
//! Pure data structures and seams shared by every other crate: the usage
//! record, user identity, the clock and authentication traits, errors and
//! configuration. This crate performs no I/O.

mod auth;
mod clock;
mod config;
mod error;
mod identity;
mod record;

pub use auth::{Authenticator, StaticCredentials};
pub use clock::{whole_seconds, Clock, FixedClock, SystemClock};
pub use config::DispenserConfig;
pub use error::{
    AuthError, ConfigError, DispenserError, DispenserResult, LedgerError, StorageError,
    ValidationError,
};
pub use identity::UserId;
pub use record::UsageRecord;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Dispense events allowed per user per calendar day.
pub const MAX_DAILY_USES: u32 = 2;

/// Sheets of paper handed out per dispense event.
pub const SHEETS_PER_DISPENSE: u32 = 5;

/// Default first segment of storage keys.
pub const DEFAULT_KEY_PREFIX: &str = "dispenser";

/// Wire format for record dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Wire format for event times.
pub const TIME_FORMAT: &str = "%H:%M:%S";
