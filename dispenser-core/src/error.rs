//! Error types for dispenser operations

use chrono::NaiveDate;
use thiserror::Error;

/// Storage layer errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Read failed for key {key}: {reason}")]
    ReadFailed { key: String, reason: String },

    #[error("Write failed for key {key}: {reason}")]
    WriteFailed { key: String, reason: String },

    #[error("Storage lock poisoned")]
    LockPoisoned,

    #[error("Storage backend error: {reason}")]
    Backend { reason: String },
}

/// Authentication errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,
}

/// Usage ledger errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Daily limit of {limit} dispenses reached for {user} on {date}")]
    CapReached {
        user: String,
        date: NaiveDate,
        limit: u32,
    },

    #[error("Corrupt persisted record under {key}: {reason}")]
    CorruptRecord { key: String, reason: String },

    #[error("Record for {record_date} is stale, today is {today}")]
    StaleRecord {
        record_date: NaiveDate,
        today: NaiveDate,
    },
}

/// Validation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Master error type for all dispenser errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DispenserError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl DispenserError {
    /// True when the error is the daily cap business rule, not a fault.
    pub fn is_cap_reached(&self) -> bool {
        matches!(self, DispenserError::Ledger(LedgerError::CapReached { .. }))
    }

    /// True when the error is a rejected login.
    pub fn is_invalid_credentials(&self) -> bool {
        matches!(self, DispenserError::Auth(AuthError::InvalidCredentials))
    }
}

/// Result type alias for dispenser operations.
pub type DispenserResult<T> = Result<T, DispenserError>;

// =============================================================================
// TESTS
// =============================================================================
