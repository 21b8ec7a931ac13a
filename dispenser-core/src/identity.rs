//! Identity types for dispenser users

use crate::{DispenserResult, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of an authenticated user.
///
/// The identifier is embedded verbatim in storage keys, so it must be
/// non-empty and free of whitespace and control characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Validate and wrap a user identifier. Surrounding whitespace is trimmed.
    pub fn parse(raw: impl AsRef<str>) -> DispenserResult<Self> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ValidationError::RequiredFieldMissing {
                field: "user".to_string(),
            }
            .into());
        }
        if trimmed.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(ValidationError::InvalidValue {
                field: "user".to_string(),
                reason: "must not contain whitespace or control characters".to_string(),
            }
            .into());
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UserId {
    type Error = crate::DispenserError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims_input() {
        let user = UserId::parse("  pepito ").unwrap();
        assert_eq!(user.as_str(), "pepito");
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert!(UserId::parse("").is_err());
        assert!(UserId::parse("   ").is_err());
    }

    #[test]
    fn test_parse_rejects_inner_whitespace() {
        assert!(UserId::parse("pepito perez").is_err());
        assert!(UserId::parse("pe\tpito").is_err());
    }

    #[test]
    fn test_parse_keeps_case() {
        let user = UserId::parse("Juancito").unwrap();
        assert_eq!(user.to_string(), "Juancito");
        assert_ne!(user, UserId::parse("juancito").unwrap());
    }

    #[test]
    fn test_serde_as_plain_string() {
        let user = UserId::parse("pepito").unwrap();
        let json = serde_json::to_string(&user).unwrap();
        assert_eq!(json, "\"pepito\"");
        let back: UserId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, user);
        assert!(serde_json::from_str::<UserId>("\"\"").is_err());
    }
}
