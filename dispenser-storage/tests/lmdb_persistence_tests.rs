//! Durability tests for the LMDB store: values written through one handle
//! are visible after the environment is closed and reopened.

use chrono::NaiveDate;
use dispenser_core::{UsageRecord, UserId};
use dispenser_storage::{KeyValueStore, LedgerKey, LmdbStore, MemoryStore};
use proptest::prelude::*;
use tempfile::TempDir;

fn key_for(user: &str, y: i32, m: u32, d: u32) -> String {
    let user = UserId::parse(user).unwrap();
    LedgerKey::new("dispenser", &user, NaiveDate::from_ymd_opt(y, m, d).unwrap()).encode()
}

#[test]
fn records_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let key = key_for("pepito", 2025, 11, 13);
    let record = UsageRecord::from_json(r#"{"date":"2025-11-13","events":["09:00:00"]}"#).unwrap();

    {
        let store = LmdbStore::open(dir.path(), 10).unwrap();
        store.set(&key, &record.to_json().unwrap()).unwrap();
    }

    let reopened = LmdbStore::open(dir.path(), 10).unwrap();
    let raw = reopened.get(&key).unwrap().expect("record should persist");
    assert_eq!(UsageRecord::from_json(&raw).unwrap(), record);
}

#[test]
fn past_days_are_kept() {
    let dir = TempDir::new().unwrap();
    let store = LmdbStore::open(dir.path(), 10).unwrap();
    for day in 10..=13 {
        store
            .set(&key_for("pepito", 2025, 11, day), r#"{"date":"x","events":[]}"#)
            .unwrap();
    }
    let user = UserId::parse("pepito").unwrap();
    let keys = store
        .keys_with_prefix(&LedgerKey::user_prefix("dispenser", &user))
        .unwrap();
    assert_eq!(keys.len(), 4);
    assert_eq!(keys[0], "dispenser_pepito_2025-11-10");
    assert_eq!(keys[3], "dispenser_pepito_2025-11-13");
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    // Both backends must agree on every observable result.
    #[test]
    fn lmdb_and_memory_agree(ops in prop::collection::vec((0u8..3, 0usize..4, "[a-z]{0,6}"), 1..24)) {
        let dir = TempDir::new().unwrap();
        let lmdb = LmdbStore::open(dir.path(), 10).unwrap();
        let memory = MemoryStore::new();
        let keys = ["p_a_1", "p_a_2", "p_b_1", "q_a_1"];

        for (op, idx, value) in ops {
            let key = keys[idx];
            match op {
                0 => {
                    lmdb.set(key, &value).unwrap();
                    memory.set(key, &value).unwrap();
                }
                1 => {
                    prop_assert_eq!(lmdb.remove(key).unwrap(), memory.remove(key).unwrap());
                }
                _ => {
                    prop_assert_eq!(lmdb.get(key).unwrap(), memory.get(key).unwrap());
                }
            }
        }
        prop_assert_eq!(
            lmdb.keys_with_prefix("p_").unwrap(),
            memory.keys_with_prefix("p_").unwrap()
        );
    }
}
