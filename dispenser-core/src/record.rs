//! Per-user, per-day usage record.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Dispense events recorded for one user on one calendar day.
///
/// Serialized form: `{"date":"YYYY-MM-DD","events":["HH:MM:SS", ...]}`.
/// Events are append-only and kept in the order they happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub date: NaiveDate,
    pub events: Vec<NaiveTime>,
}

impl UsageRecord {
    /// Empty record for the given day.
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            events: Vec::new(),
        }
    }

    /// Number of dispense events recorded.
    pub fn used(&self) -> u32 {
        u32::try_from(self.events.len()).unwrap_or(u32::MAX)
    }

    /// Remaining allowance under `limit`. Never negative.
    pub fn remaining(&self, limit: u32) -> u32 {
        limit.saturating_sub(self.used())
    }

    /// Append one event. Callers enforce the daily cap.
    pub fn push_event(&mut self, at: NaiveTime) {
        self.events.push(at);
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}


#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    fn arb_record() -> impl Strategy<Value = UsageRecord> {
        (
            0i32..3650,
            prop::collection::vec(0u32..86_400, 0..4),
        )
            .prop_map(|(offset, mut secs)| {
                secs.sort_unstable();
                let base = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
                let date = base + chrono::Duration::days(i64::from(offset));
                let events = secs
                    .into_iter()
                    .filter_map(|s| NaiveTime::from_num_seconds_from_midnight_opt(s, 0))
                    .collect();
                UsageRecord { date, events }
            })
    }

    proptest! {
        #[test]
        fn prop_json_round_trip(record in arb_record()) {
            let json = record.to_json().unwrap();
            let back = UsageRecord::from_json(&json).unwrap();
            prop_assert_eq!(back, record);
        }

        #[test]
        fn prop_remaining_never_exceeds_limit(record in arb_record(), limit in 0u32..5) {
            let remaining = record.remaining(limit);
            prop_assert!(remaining <= limit);
            prop_assert_eq!(remaining, limit.saturating_sub(record.events.len() as u32));
        }
    }
}
