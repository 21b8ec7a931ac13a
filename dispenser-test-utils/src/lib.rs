//! Dispenser Test Utilities
//!
//! Shared test infrastructure for the dispenser workspace:
//! - Proptest generators for identities, dates and records
//! - Fixtures for the common 2025-11-13 scenario
//! - Assertions over `DispenserResult`

// Re-export the in-memory store from its source crate
pub use dispenser_storage::{KeyValueStore, LedgerKey, MemoryStore};

pub use dispenser_core::{
    AuthError, Clock, DispenserConfig, DispenserError, DispenserResult, FixedClock, LedgerError,
    StaticCredentials, StorageError, UsageRecord, UserId, MAX_DAILY_USES,
};

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for dispenser types.

    use super::*;
    use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
    use proptest::prelude::*;

    /// A valid user id: letters, digits and underscores.
    pub fn arb_user_id() -> impl Strategy<Value = UserId> {
        "[A-Za-z][A-Za-z0-9_]{0,11}".prop_map(|raw| {
            UserId::parse(raw).unwrap_or_else(|e| panic!("generated user id rejected: {e}"))
        })
    }

    /// A calendar date between 2020-01-01 and roughly 2030.
    pub fn arb_date() -> impl Strategy<Value = NaiveDate> {
        (0i64..3650).prop_map(|offset| {
            NaiveDate::from_ymd_opt(2020, 1, 1)
                .and_then(|d| d.checked_add_signed(chrono::TimeDelta::days(offset)))
                .unwrap_or(NaiveDate::MIN)
        })
    }

    /// A whole-second time of day.
    pub fn arb_time() -> impl Strategy<Value = NaiveTime> {
        (0u32..86_400).prop_map(|secs| {
            NaiveTime::from_num_seconds_from_midnight_opt(secs, 0).unwrap_or(NaiveTime::MIN)
        })
    }

    /// A local timestamp with whole seconds.
    pub fn arb_datetime() -> impl Strategy<Value = NaiveDateTime> {
        (arb_date(), arb_time()).prop_map(|(d, t)| d.and_time(t))
    }

    /// A record holding at most `limit` events in ascending order.
    pub fn arb_record_within(limit: u32) -> impl Strategy<Value = UsageRecord> {
        (
            arb_date(),
            prop::collection::vec(arb_time(), 0..=limit as usize),
        )
            .prop_map(|(date, mut events)| {
                events.sort();
                UsageRecord { date, events }
            })
    }

    /// A record within the default daily cap.
    pub fn arb_record() -> impl Strategy<Value = UsageRecord> {
        arb_record_within(MAX_DAILY_USES)
    }

    /// Strings that are not a valid record encoding.
    pub fn arb_corrupt_value() -> impl Strategy<Value = String> {
        prop_oneof![
            Just(String::new()),
            Just("{".to_string()),
            Just("null".to_string()),
            Just(r#"{"date":"2025-13-40","events":[]}"#.to_string()),
            Just(r#"{"date":"2025-11-13","events":"09:00:00"}"#.to_string()),
            Just(r#"{"date":"2025-11-13","events":["25:61:00"]}"#.to_string()),
            "[a-z ]{1,16}",
        ]
    }

    /// A sequence of dispense attempts, given as seconds to advance the
    /// clock before each attempt.
    pub fn arb_attempt_gaps() -> impl Strategy<Value = Vec<i64>> {
        prop::collection::vec(0i64..600, 1..8)
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built fixtures for common testing scenarios.

    use super::*;
    use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

    /// The reference scenario's first morning.
    pub const SCENARIO_START: &str = "2025-11-13 09:00:00";

    /// Parse `YYYY-MM-DD`.
    #[track_caller]
    pub fn day(raw: &str) -> NaiveDate {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .unwrap_or_else(|e| panic!("bad fixture date {raw:?}: {e}"))
    }

    /// Parse `HH:MM:SS`.
    #[track_caller]
    pub fn at(raw: &str) -> NaiveTime {
        NaiveTime::parse_from_str(raw, "%H:%M:%S")
            .unwrap_or_else(|e| panic!("bad fixture time {raw:?}: {e}"))
    }

    /// Parse `YYYY-MM-DD HH:MM:SS`.
    #[track_caller]
    pub fn timestamp(raw: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
            .unwrap_or_else(|e| panic!("bad fixture timestamp {raw:?}: {e}"))
    }

    #[track_caller]
    pub fn user(raw: &str) -> UserId {
        UserId::parse(raw).unwrap_or_else(|e| panic!("bad fixture user {raw:?}: {e}"))
    }

    /// Clock frozen at `raw` (`YYYY-MM-DD HH:MM:SS`).
    #[track_caller]
    pub fn fixed_clock(raw: &str) -> FixedClock {
        FixedClock::new(timestamp(raw))
    }

    /// Clock frozen at [`SCENARIO_START`].
    pub fn scenario_clock() -> FixedClock {
        fixed_clock(SCENARIO_START)
    }

    /// Record for `date` with the given `HH:MM:SS` events.
    #[track_caller]
    pub fn record(date: &str, events: &[&str]) -> UsageRecord {
        UsageRecord {
            date: day(date),
            events: events.iter().map(|e| at(e)).collect(),
        }
    }

    /// Storage key with the default prefix.
    #[track_caller]
    pub fn key(user_raw: &str, date: &str) -> String {
        LedgerKey::new(dispenser_core::DEFAULT_KEY_PREFIX, &user(user_raw), day(date)).encode()
    }

    /// Store pre-populated with `entries` as raw key/value pairs.
    #[track_caller]
    pub fn seeded_store(entries: &[(&str, &str)]) -> MemoryStore {
        let store = MemoryStore::new();
        for (k, v) in entries {
            store
                .set(k, v)
                .unwrap_or_else(|e| panic!("seeding {k:?} failed: {e}"));
        }
        store
    }

    /// Store holding `record` for `user_raw` under the default prefix.
    #[track_caller]
    pub fn store_with_record(user_raw: &str, record: &UsageRecord) -> MemoryStore {
        let value = record
            .to_json()
            .unwrap_or_else(|e| panic!("encoding fixture record failed: {e}"));
        let key = key(user_raw, &record.date.format("%Y-%m-%d").to_string());
        seeded_store(&[(&key, &value)])
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions over dispenser results and stored state.

    use super::*;

    /// Assert that a result is a `CapReached` ledger error.
    #[track_caller]
    pub fn assert_cap_reached<T: std::fmt::Debug>(result: &DispenserResult<T>) {
        match result {
            Err(DispenserError::Ledger(LedgerError::CapReached { .. })) => {}
            other => panic!("Expected CapReached, got: {:?}", other),
        }
    }

    /// Assert that a result is an `InvalidCredentials` auth error.
    #[track_caller]
    pub fn assert_invalid_credentials<T: std::fmt::Debug>(result: &DispenserResult<T>) {
        match result {
            Err(DispenserError::Auth(AuthError::InvalidCredentials)) => {}
            other => panic!("Expected InvalidCredentials, got: {:?}", other),
        }
    }

    #[track_caller]
    pub fn assert_storage_error<T: std::fmt::Debug>(result: &DispenserResult<T>) {
        match result {
            Err(DispenserError::Storage(_)) => {}
            other => panic!("Expected Storage error, got: {:?}", other),
        }
    }

    /// Assert that `store` holds exactly `expected` under `key`, decoded.
    #[track_caller]
    pub fn assert_stored_record(store: &dyn KeyValueStore, key: &str, expected: &UsageRecord) {
        let raw = store
            .get(key)
            .unwrap_or_else(|e| panic!("reading {key:?} failed: {e}"))
            .unwrap_or_else(|| panic!("no value stored under {key:?}"));
        let actual = UsageRecord::from_json(&raw)
            .unwrap_or_else(|e| panic!("value under {key:?} does not decode: {e}"));
        assert_eq!(&actual, expected, "stored record under {key:?} differs");
    }

    /// Assert that `record` respects the cap and keeps events in order.
    #[track_caller]
    pub fn assert_record_invariants(record: &UsageRecord, limit: u32) {
        assert!(
            record.used() <= limit,
            "record has {} events, limit is {}",
            record.used(),
            limit
        );
        assert!(
            record.events.windows(2).all(|w| w[0] <= w[1]),
            "events out of order: {:?}",
            record.events
        );
    }
}

#[cfg(test)]
mod tests {
    use super::assertions::*;
    use super::fixtures::*;
    use super::generators::*;
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_fixture_key_layout() {
        assert_eq!(key("pepito", "2025-11-13"), "dispenser_pepito_2025-11-13");
    }

    #[test]
    fn test_store_with_record() {
        let rec = record("2025-11-13", &["09:00:00"]);
        let store = store_with_record("pepito", &rec);
        assert_stored_record(&store, "dispenser_pepito_2025-11-13", &rec);
    }

    #[test]
    fn test_scenario_clock() {
        assert_eq!(scenario_clock().now(), timestamp(SCENARIO_START));
    }

    proptest! {
        #[test]
        fn prop_generated_records_within_cap(rec in arb_record()) {
            assert_record_invariants(&rec, MAX_DAILY_USES);
        }

        #[test]
        fn prop_corrupt_values_do_not_decode(raw in arb_corrupt_value()) {
            prop_assert!(UsageRecord::from_json(&raw).is_err());
        }
    }
}
