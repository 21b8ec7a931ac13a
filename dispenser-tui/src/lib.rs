//! Dispenser TUI library exports.

pub mod config;
pub mod error;
pub mod keys;
pub mod logging;
pub mod notifications;
pub mod state;
pub mod theme;
pub mod views;
