//! User-and-day scoped storage keys.
//!
//! A `LedgerKey` cannot be built without both a user and a date, so every
//! read and write of a usage record is partitioned by (user, day).

use chrono::NaiveDate;
use dispenser_core::{UserId, DATE_FORMAT};

/// Separator between key segments.
const SEPARATOR: char = '_';

/// A storage key scoped to one user and one calendar day.
///
/// # Text Format
///
/// `<prefix>_<user>_<YYYY-MM-DD>`, for example `dispenser_pepito_2025-11-13`.
///
/// The date is always the segment after the last separator, so user
/// identifiers may themselves contain `_`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LedgerKey {
    /// Private inner data - cannot be constructed externally
    inner: LedgerKeyInner,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct LedgerKeyInner {
    prefix: String,
    user: UserId,
    date: NaiveDate,
}

impl LedgerKey {
    pub fn new(prefix: impl Into<String>, user: &UserId, date: NaiveDate) -> Self {
        Self {
            inner: LedgerKeyInner {
                prefix: prefix.into(),
                user: user.clone(),
                date,
            },
        }
    }

    pub fn prefix(&self) -> &str {
        &self.inner.prefix
    }

    pub fn user(&self) -> &UserId {
        &self.inner.user
    }

    pub fn date(&self) -> NaiveDate {
        self.inner.date
    }

    /// Encode to the stored key string.
    pub fn encode(&self) -> String {
        format!(
            "{}{sep}{}{sep}{}",
            self.inner.prefix,
            self.inner.user,
            self.inner.date.format(DATE_FORMAT),
            sep = SEPARATOR
        )
    }

    /// Decode a stored key that was written under `prefix`.
    ///
    /// Returns `None` if:
    /// - The key does not start with `prefix` followed by the separator
    /// - The user segment is empty or not a valid [`UserId`]
    /// - The date segment is not a zero-padded `YYYY-MM-DD` date
    pub fn decode(prefix: &str, raw: &str) -> Option<Self> {
        let rest = raw.strip_prefix(prefix)?.strip_prefix(SEPARATOR)?;
        let (user, date) = rest.rsplit_once(SEPARATOR)?;

        let user = UserId::parse(user).ok()?;
        let date = NaiveDate::parse_from_str(date, DATE_FORMAT).ok()?;
        let key = Self::new(prefix, &user, date);

        // Reject non-canonical spellings such as unpadded dates or padded users.
        (key.encode() == raw).then_some(key)
    }

    /// Prefix shared by every key of `user`.
    ///
    /// A scan by this prefix can also match users whose identifier extends
    /// `user` with `_`, so scanned keys must be decoded and compared.
    pub fn user_prefix(prefix: &str, user: &UserId) -> String {
        format!("{}{sep}{}{sep}", prefix, user, sep = SEPARATOR)
    }
}

impl std::fmt::Display for LedgerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.encode())
    }
}
