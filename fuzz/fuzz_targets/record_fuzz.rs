//! Fuzz test for stored record decoding
//!
//! Arbitrary stored values must either decode or fail cleanly, and any
//! value that decodes must re-encode to something that decodes the same.
//!
//! Run with: cargo +nightly fuzz run record_fuzz -- -max_total_time=60

#![no_main]

use dispenser_core::UsageRecord;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        if let Ok(record) = UsageRecord::from_json(input) {
            let encoded = record.to_json().expect("decoded record should encode");
            let again = UsageRecord::from_json(&encoded).expect("encoded record should decode");
            assert_eq!(record, again);
            assert_eq!(record.remaining(2) + record.used().min(2), 2);
        }
    }
});
