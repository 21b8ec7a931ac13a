//! Session layer: login, dispensing and logout over a shared ledger.
//!
//! A [`Session`] is either logged out or holds an [`ActiveSession`] with
//! the authenticated user and today's record. Transitions go through
//! [`DispenserService`].

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use dispenser_core::{
    Authenticator, DispenserError, DispenserResult, LedgerError, UsageRecord, UserId,
};

use crate::ledger::{LoadedRecord, RecordOrigin, UsageLedger};

/// Explicit authentication state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Session {
    #[default]
    LoggedOut,
    LoggedIn(ActiveSession),
}

impl Session {
    pub fn is_logged_in(&self) -> bool {
        matches!(self, Session::LoggedIn(_))
    }

    pub fn active(&self) -> Option<&ActiveSession> {
        match self {
            Session::LoggedIn(active) => Some(active),
            Session::LoggedOut => None,
        }
    }

    pub fn active_mut(&mut self) -> Option<&mut ActiveSession> {
        match self {
            Session::LoggedIn(active) => Some(active),
            Session::LoggedOut => None,
        }
    }
}

/// An authenticated user together with today's record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveSession {
    user: UserId,
    record: UsageRecord,
    origin: RecordOrigin,
    daily_limit: u32,
    sheets_per_dispense: u32,
}

impl ActiveSession {
    pub fn user(&self) -> &UserId {
        &self.user
    }

    pub fn record(&self) -> &UsageRecord {
        &self.record
    }

    /// How today's record was obtained at login or last refresh.
    pub fn origin(&self) -> &RecordOrigin {
        &self.origin
    }

    pub fn sheets_per_dispense(&self) -> u32 {
        self.sheets_per_dispense
    }

    pub fn remaining(&self) -> u32 {
        self.record.remaining(self.daily_limit)
    }

    pub fn can_dispense(&self) -> bool {
        self.remaining() > 0
    }

    /// Display-facing view of today's usage.
    pub fn summary(&self) -> UsageSummary {
        let entries = self
            .record
            .events
            .iter()
            .enumerate()
            .map(|(i, time)| UsageEntry {
                ordinal: i + 1,
                time: *time,
                sheets: self.sheets_per_dispense,
            })
            .collect();

        UsageSummary {
            user: self.user.clone(),
            date: self.record.date,
            used: self.record.used(),
            remaining: self.remaining(),
            daily_limit: self.daily_limit,
            entries,
        }
    }

    fn replace(&mut self, loaded: LoadedRecord) {
        self.record = loaded.record;
        self.origin = loaded.origin;
    }
}

/// One line of the usage list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageEntry {
    /// 1-based position within the day.
    pub ordinal: usize,
    pub time: NaiveTime,
    pub sheets: u32,
}

/// Derived values shown to a logged-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageSummary {
    pub user: UserId,
    pub date: NaiveDate,
    pub used: u32,
    pub remaining: u32,
    pub daily_limit: u32,
    pub entries: Vec<UsageEntry>,
}

impl UsageSummary {
    pub fn can_dispense(&self) -> bool {
        self.remaining > 0
    }
}

/// Outcome of a successful dispense.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispenseReceipt {
    pub at: NaiveTime,
    pub sheets: u32,
    pub used: u32,
    pub remaining: u32,
}

/// Authentication plus ledger access.
pub struct DispenserService {
    authenticator: Arc<dyn Authenticator>,
    ledger: Arc<UsageLedger>,
}

impl std::fmt::Debug for DispenserService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispenserService")
            .field("ledger", &self.ledger)
            .finish_non_exhaustive()
    }
}

impl DispenserService {
    pub fn new(authenticator: Arc<dyn Authenticator>, ledger: Arc<UsageLedger>) -> Self {
        Self {
            authenticator,
            ledger,
        }
    }

    pub fn ledger(&self) -> &UsageLedger {
        &self.ledger
    }

    /// Authenticate and load today's record.
    ///
    /// No record is touched when the credentials are rejected.
    pub fn login(&self, username: &str, password: &str) -> DispenserResult<ActiveSession> {
        let user = match self.authenticator.authenticate(username, password) {
            Ok(user) => user,
            Err(e) => {
                tracing::info!(username = %username.trim(), "Login rejected");
                return Err(e);
            }
        };

        let loaded = self.ledger.load_today_detailed(&user)?;
        tracing::info!(
            user = %user,
            date = %loaded.record.date,
            used = loaded.record.used(),
            "Logged in"
        );

        let config = self.ledger.config();
        Ok(ActiveSession {
            user,
            record: loaded.record,
            origin: loaded.origin,
            daily_limit: config.daily_limit,
            sheets_per_dispense: config.sheets_per_dispense,
        })
    }

    /// Dispense once for the session's user.
    ///
    /// If the day rolled over since the record was loaded, today's record
    /// is loaded and the dispense is attempted once more against it.
    pub fn dispense(&self, session: &mut ActiveSession) -> DispenserResult<DispenseReceipt> {
        let at = match self.ledger.dispense(&mut session.record, &session.user) {
            Err(DispenserError::Ledger(LedgerError::StaleRecord { record_date, today })) => {
                tracing::info!(
                    user = %session.user,
                    %record_date,
                    %today,
                    "Day rolled over, reloading record"
                );
                self.refresh(session)?;
                self.ledger.dispense(&mut session.record, &session.user)?
            }
            other => other?,
        };

        Ok(DispenseReceipt {
            at,
            sheets: session.sheets_per_dispense,
            used: session.record.used(),
            remaining: session.remaining(),
        })
    }

    /// Reload today's record, picking up a new day or other sessions' writes.
    pub fn refresh(&self, session: &mut ActiveSession) -> DispenserResult<()> {
        let loaded = self.ledger.load_today_detailed(&session.user)?;
        session.replace(loaded);
        Ok(())
    }

    /// End the session. The persisted record is left as is.
    pub fn logout(&self, session: ActiveSession) -> Session {
        tracing::info!(user = %session.user, "Logged out");
        Session::LoggedOut
    }
}
