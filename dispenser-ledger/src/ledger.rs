//! The usage ledger: per-user, per-day dispense records and the daily cap.
//!
//! Records live in a [`KeyValueStore`] under [`LedgerKey`]s. A record is
//! created lazily the first time a user is seen on a given day and is
//! persisted immediately. Unparsable stored data never blocks a user: it is
//! logged and replaced by an empty record. Today's record holding more
//! events than the configured limit (left behind when the limit is lowered)
//! is treated the same way.

use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, NaiveTime};
use dispenser_core::{
    whole_seconds, Clock, DispenserConfig, DispenserError, DispenserResult, LedgerError,
    StorageError, UsageRecord, UserId,
};
use dispenser_storage::{KeyValueStore, LedgerKey};

/// How a record returned by [`UsageLedger::load_today_detailed`] came to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOrigin {
    /// Read back from the store.
    Existing,
    /// Nothing was stored yet; an empty record was created.
    Created,
    /// Stored data was unusable and has been replaced by an empty record.
    Recovered { reason: String },
}

/// Today's record together with its origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedRecord {
    pub record: UsageRecord,
    pub origin: RecordOrigin,
}

/// Result of reading one key.
enum StoredRecord {
    Missing,
    Valid(UsageRecord),
    Corrupt(LedgerError),
}

/// Per-user daily usage ledger.
pub struct UsageLedger {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    config: DispenserConfig,
    /// Serialises read-modify-write sequences against the store.
    write_lock: Mutex<()>,
}

impl std::fmt::Debug for UsageLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UsageLedger")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl UsageLedger {
    /// Create a ledger after validating `config`.
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        config: DispenserConfig,
    ) -> DispenserResult<Self> {
        config.validate()?;
        Ok(Self {
            store,
            clock,
            config,
            write_lock: Mutex::new(()),
        })
    }

    /// Ledger with the default limit of two dispenses per day.
    pub fn with_defaults(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            config: DispenserConfig::default(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &DispenserConfig {
        &self.config
    }

    pub fn daily_limit(&self) -> u32 {
        self.config.daily_limit
    }

    /// Today's date according to the ledger's clock.
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Storage key for `user` on `date`.
    pub fn key_for(&self, user: &UserId, date: NaiveDate) -> LedgerKey {
        LedgerKey::new(self.config.key_prefix.clone(), user, date)
    }

    /// Today's record for `user`, created and persisted if absent or unreadable.
    pub fn load_today(&self, user: &UserId) -> DispenserResult<UsageRecord> {
        self.load_today_detailed(user).map(|loaded| loaded.record)
    }

    /// Like [`load_today`](Self::load_today), also reporting whether the
    /// record already existed, was created, or replaced corrupt data.
    pub fn load_today_detailed(&self, user: &UserId) -> DispenserResult<LoadedRecord> {
        let _guard = self.lock()?;
        let today = self.clock.today();
        let key = self.key_for(user, today);

        let (record, origin) = match self.read_current(&key)? {
            StoredRecord::Valid(record) => (record, RecordOrigin::Existing),
            StoredRecord::Missing => {
                let record = UsageRecord::new(today);
                self.persist(&key, &record)?;
                tracing::debug!(user = %user, date = %today, "Created usage record");
                (record, RecordOrigin::Created)
            }
            StoredRecord::Corrupt(err) => {
                tracing::warn!(
                    user = %user,
                    date = %today,
                    error = %err,
                    "Discarding corrupt usage record"
                );
                let record = UsageRecord::new(today);
                self.persist(&key, &record)?;
                (
                    record,
                    RecordOrigin::Recovered {
                        reason: err.to_string(),
                    },
                )
            }
        };

        Ok(LoadedRecord { record, origin })
    }

    /// Dispenses left for `record` under the configured daily limit.
    pub fn remaining_uses(&self, record: &UsageRecord) -> u32 {
        record.remaining(self.config.daily_limit)
    }

    /// Record one dispense for `user` and return its time of day.
    ///
    /// `record` must be today's record for `user` as returned by
    /// [`load_today`](Self::load_today). Fails with
    /// [`LedgerError::CapReached`] when the limit is already met and with
    /// [`LedgerError::StaleRecord`] when `record` belongs to another day.
    /// On failure the store is left untouched, though `record` may have
    /// been replaced by a newer copy written by another session.
    pub fn dispense(&self, record: &mut UsageRecord, user: &UserId) -> DispenserResult<NaiveTime> {
        let _guard = self.lock()?;
        let now = self.clock.now();
        let today = now.date();

        if record.date != today {
            return Err(LedgerError::StaleRecord {
                record_date: record.date,
                today,
            }
            .into());
        }

        let key = self.key_for(user, today);

        // Another session for the same user may have dispensed since `record` was loaded.
        if let StoredRecord::Valid(stored) = self.read_current(&key)? {
            if stored.events.len() > record.events.len() {
                tracing::debug!(
                    user = %user,
                    stored = stored.events.len(),
                    local = record.events.len(),
                    "Adopting newer stored record"
                );
                *record = stored;
            }
        }

        let limit = self.config.daily_limit;
        if record.used() >= limit {
            tracing::info!(user = %user, date = %today, limit, "Daily limit reached");
            return Err(LedgerError::CapReached {
                user: user.to_string(),
                date: today,
                limit,
            }
            .into());
        }

        let at = whole_seconds(now);
        let mut updated = record.clone();
        updated.push_event(at);
        self.persist(&key, &updated)?;
        *record = updated;

        tracing::info!(
            user = %user,
            date = %today,
            at = %at,
            used = record.used(),
            remaining = self.remaining_uses(record),
            "Dispensed"
        );

        Ok(at)
    }

    /// Every stored record for `user`, oldest day first.
    ///
    /// Unreadable entries are skipped.
    pub fn history(&self, user: &UserId) -> DispenserResult<Vec<UsageRecord>> {
        let prefix = LedgerKey::user_prefix(&self.config.key_prefix, user);
        let mut records = Vec::new();

        for raw_key in self.store.keys_with_prefix(&prefix)? {
            let Some(key) = LedgerKey::decode(&self.config.key_prefix, &raw_key) else {
                continue;
            };
            if key.user() != user {
                continue;
            }
            match self.read_record(&key)? {
                StoredRecord::Valid(record) => records.push(record),
                StoredRecord::Missing => {}
                StoredRecord::Corrupt(err) => {
                    tracing::warn!(key = %raw_key, error = %err, "Skipping corrupt usage record");
                }
            }
        }

        records.sort_by_key(|r| r.date);
        Ok(records)
    }

    fn lock(&self) -> DispenserResult<std::sync::MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|_| DispenserError::from(StorageError::LockPoisoned))
    }

    fn read_record(&self, key: &LedgerKey) -> DispenserResult<StoredRecord> {
        let encoded = key.encode();
        let Some(raw) = self.store.get(&encoded)? else {
            return Ok(StoredRecord::Missing);
        };

        let record = match UsageRecord::from_json(&raw) {
            Ok(record) => record,
            Err(e) => {
                return Ok(StoredRecord::Corrupt(LedgerError::CorruptRecord {
                    key: encoded,
                    reason: e.to_string(),
                }))
            }
        };

        if record.date != key.date() {
            return Ok(StoredRecord::Corrupt(LedgerError::CorruptRecord {
                key: encoded,
                reason: format!(
                    "stored date {} does not match key date {}",
                    record.date,
                    key.date()
                ),
            }));
        }

        Ok(StoredRecord::Valid(record))
    }

    /// [`read_record`](Self::read_record) plus the daily cap. Past days keep
    /// whatever they recorded; only the record still being written to must
    /// fit under the current limit.
    fn read_current(&self, key: &LedgerKey) -> DispenserResult<StoredRecord> {
        let stored = self.read_record(key)?;
        let limit = self.config.daily_limit;
        match stored {
            StoredRecord::Valid(record) if record.used() > limit => {
                Ok(StoredRecord::Corrupt(LedgerError::CorruptRecord {
                    key: key.encode(),
                    reason: format!(
                        "{} events recorded, more than the daily limit of {}",
                        record.used(),
                        limit
                    ),
                }))
            }
            other => Ok(other),
        }
    }

    fn persist(&self, key: &LedgerKey, record: &UsageRecord) -> DispenserResult<()> {
        let encoded = key.encode();
        let value = record.to_json().map_err(|e| StorageError::WriteFailed {
            key: encoded.clone(),
            reason: e.to_string(),
        })?;
        self.store.set(&encoded, &value)
    }
}
