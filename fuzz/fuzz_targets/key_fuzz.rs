//! Fuzz test for storage key decoding
//!
//! Decoding arbitrary keys must never panic, and every accepted key must
//! be canonical: re-encoding yields the input unchanged.
//!
//! Run with: cargo +nightly fuzz run key_fuzz -- -max_total_time=60

#![no_main]

use dispenser_storage::LedgerKey;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        for prefix in ["dispenser", "a_b", ""] {
            if let Some(key) = LedgerKey::decode(prefix, input) {
                assert_eq!(key.encode(), input);
                assert_eq!(key.prefix(), prefix);
                assert!(input.starts_with(&LedgerKey::user_prefix(prefix, key.user())));
            }
        }
    }
});
