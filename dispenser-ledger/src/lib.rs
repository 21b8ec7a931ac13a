//! Dispenser Ledger - Daily Usage Tracking
//!
//! [`UsageLedger`] enforces the per-user daily dispense limit over a
//! [`dispenser_storage::KeyValueStore`]. [`DispenserService`] adds login
//! and logout on top and hands out [`ActiveSession`]s.

pub mod ledger;
pub mod session;

pub use ledger::{LoadedRecord, RecordOrigin, UsageLedger};
pub use session::{
    ActiveSession, DispenseReceipt, DispenserService, Session, UsageEntry, UsageSummary,
};
