//! Authentication seam and the static credential table.

use crate::{AuthError, DispenserResult, UserId};
use std::collections::HashMap;

/// Identity provider used by the session layer.
///
/// Implementations return the validated [`UserId`] on success and
/// [`AuthError::InvalidCredentials`] otherwise.
pub trait Authenticator: Send + Sync {
    fn authenticate(&self, username: &str, password: &str) -> DispenserResult<UserId>;
}

/// In-memory username/password table. Passwords are compared as plain text.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    entries: HashMap<String, String>,
}

impl StaticCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    /// The two demo accounts.
    pub fn demo() -> Self {
        Self::new()
            .with_user("pepito", "pepito123")
            .with_user("Juancito", "Juancito123")
    }

    pub fn with_user(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.entries.insert(username.into(), password.into());
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, String)> for StaticCredentials {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl Authenticator for StaticCredentials {
    fn authenticate(&self, username: &str, password: &str) -> DispenserResult<UserId> {
        let username = username.trim();
        let password = password.trim();
        match self.entries.get(username) {
            Some(expected) if expected == password => {
                UserId::parse(username).map_err(|_| AuthError::InvalidCredentials.into())
            }
            _ => Err(AuthError::InvalidCredentials.into()),
        }
    }
}
