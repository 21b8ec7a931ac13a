//! End-to-end scenarios through the session layer, over both the
//! in-memory and the LMDB store.

use std::sync::Arc;
use std::thread;

use chrono::TimeDelta;
use dispenser_core::{FixedClock, StaticCredentials};
use dispenser_ledger::{DispenserService, RecordOrigin, Session, UsageLedger};
use dispenser_storage::{KeyValueStore, LmdbStore, MemoryStore};
use dispenser_test_utils::assertions::{
    assert_cap_reached, assert_invalid_credentials, assert_stored_record,
};
use dispenser_test_utils::fixtures::{at, day, key, record, scenario_clock, store_with_record};
use tempfile::TempDir;

fn service_over(store: Arc<dyn KeyValueStore>, clock: Arc<FixedClock>) -> DispenserService {
    let ledger = Arc::new(UsageLedger::with_defaults(store, clock));
    DispenserService::new(Arc::new(StaticCredentials::demo()), ledger)
}

#[test]
fn pepito_two_dispenses_then_cap() {
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(scenario_clock());
    let service = service_over(store.clone(), clock.clone());

    let mut session = service.login("pepito", "pepito123").unwrap();
    assert_eq!(session.remaining(), 2);
    assert!(session.record().events.is_empty());

    let first = service.dispense(&mut session).unwrap();
    assert_eq!(first.at, at("09:00:00"));
    assert_eq!(session.record().events, vec![at("09:00:00")]);
    assert_eq!(session.remaining(), 1);

    clock.advance(TimeDelta::minutes(5));
    let second = service.dispense(&mut session).unwrap();
    assert_eq!(second.at, at("09:05:00"));
    assert_eq!(
        session.record().events,
        vec![at("09:00:00"), at("09:05:00")]
    );
    assert_eq!(session.remaining(), 0);

    clock.advance(TimeDelta::minutes(5));
    assert_cap_reached(&service.dispense(&mut session));
    assert_eq!(session.record().events.len(), 2);

    assert_stored_record(
        store.as_ref(),
        "dispenser_pepito_2025-11-13",
        &record("2025-11-13", &["09:00:00", "09:05:00"]),
    );
}

#[test]
fn wrong_password_creates_no_record() {
    let store = Arc::new(MemoryStore::new());
    let service = service_over(store.clone(), Arc::new(scenario_clock()));

    assert_invalid_credentials(&service.login("pepito", "wrong"));
    assert_invalid_credentials(&service.login("PEPITO", "pepito123"));
    assert_invalid_credentials(&service.login("", ""));
    assert!(store.is_empty());
}

#[test]
fn prior_record_is_resumed() {
    let existing = record("2025-11-13", &["07:30:00"]);
    let store = Arc::new(store_with_record("Juancito", &existing));
    let service = service_over(store.clone(), Arc::new(scenario_clock()));

    let mut session = service.login("Juancito", "Juancito123").unwrap();
    assert_eq!(session.origin(), &RecordOrigin::Existing);
    assert_eq!(session.remaining(), 1);

    service.dispense(&mut session).unwrap();
    assert!(!session.can_dispense());
    assert_stored_record(
        store.as_ref(),
        &key("Juancito", "2025-11-13"),
        &record("2025-11-13", &["07:30:00", "09:00:00"]),
    );
}

#[test]
fn corrupt_record_is_replaced_on_login() {
    let store = Arc::new(MemoryStore::new());
    store
        .set(&key("pepito", "2025-11-13"), "][ definitely not json")
        .unwrap();
    let service = service_over(store.clone(), Arc::new(scenario_clock()));

    let session = service.login("pepito", "pepito123").unwrap();
    assert!(matches!(session.origin(), RecordOrigin::Recovered { .. }));
    assert_eq!(session.remaining(), 2);
    assert_stored_record(
        store.as_ref(),
        &key("pepito", "2025-11-13"),
        &record("2025-11-13", &[]),
    );
}

#[test]
fn history_keeps_past_days() {
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(scenario_clock());
    let service = service_over(store.clone(), clock.clone());

    for _ in 0..3 {
        let mut session = service.login("pepito", "pepito123").unwrap();
        service.dispense(&mut session).unwrap();
        service.logout(session);
        clock.advance(TimeDelta::days(1));
    }

    let pepito = dispenser_test_utils::fixtures::user("pepito");
    let history = service.ledger().history(&pepito).unwrap();
    let dates: Vec<_> = history.iter().map(|r| r.date).collect();
    assert_eq!(
        dates,
        vec![day("2025-11-13"), day("2025-11-14"), day("2025-11-15")]
    );
    assert!(history.iter().all(|r| r.used() == 1));
}

#[test]
fn concurrent_sessions_never_exceed_cap() {
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(scenario_clock());
    let service = Arc::new(service_over(store.clone(), clock));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let service = Arc::clone(&service);
            thread::spawn(move || {
                let mut session = service.login("pepito", "pepito123").unwrap();
                service.dispense(&mut session).is_ok()
            })
        })
        .collect();

    let successes = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|ok| *ok)
        .count();

    assert_eq!(successes, 2);
    let raw = store.get(&key("pepito", "2025-11-13")).unwrap().unwrap();
    let stored = dispenser_core::UsageRecord::from_json(&raw).unwrap();
    assert_eq!(stored.used(), 2);
}

#[test]
fn lmdb_state_survives_restart() {
    let dir = TempDir::new().unwrap();
    let clock = Arc::new(scenario_clock());

    {
        let store = Arc::new(LmdbStore::open(dir.path(), 10).unwrap());
        let service = service_over(store, clock.clone());
        let mut session = service.login("pepito", "pepito123").unwrap();
        service.dispense(&mut session).unwrap();
        clock.advance(TimeDelta::minutes(5));
        service.dispense(&mut session).unwrap();
    }

    let store = Arc::new(LmdbStore::open(dir.path(), 10).unwrap());
    let service = service_over(store, clock);
    let mut session = service.login("pepito", "pepito123").unwrap();
    assert_eq!(session.origin(), &RecordOrigin::Existing);
    assert_eq!(
        session.record().events,
        vec![at("09:00:00"), at("09:05:00")]
    );
    assert_cap_reached(&service.dispense(&mut session));
}

#[test]
fn session_state_transitions() {
    let service = service_over(Arc::new(MemoryStore::new()), Arc::new(scenario_clock()));

    let mut state = Session::LoggedOut;
    assert!(state.active().is_none());

    state = Session::LoggedIn(service.login("pepito", "pepito123").unwrap());
    if let Some(active) = state.active_mut() {
        service.dispense(active).unwrap();
    }
    assert_eq!(state.active().map(|s| s.remaining()), Some(1));

    if let Session::LoggedIn(active) = std::mem::take(&mut state) {
        state = service.logout(active);
    }
    assert_eq!(state, Session::LoggedOut);
}
