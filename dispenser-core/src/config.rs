//! Ledger configuration

use crate::*;
use serde::{Deserialize, Serialize};

/// Settings that shape the usage ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DispenserConfig {
    /// Maximum dispense events per user per calendar day.
    pub daily_limit: u32,
    /// Sheets handed out per dispense event. Display only.
    pub sheets_per_dispense: u32,
    /// First segment of every storage key.
    pub key_prefix: String,
}

impl Default for DispenserConfig {
    fn default() -> Self {
        Self {
            daily_limit: MAX_DAILY_USES,
            sheets_per_dispense: SHEETS_PER_DISPENSE,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
        }
    }
}

impl DispenserConfig {
    /// Create from environment variables with fallback to defaults.
    ///
    /// Environment variables:
    /// - `DISPENSER_DAILY_LIMIT`: Dispenses allowed per day (default: 2)
    /// - `DISPENSER_SHEETS_PER_DISPENSE`: Sheets per dispense (default: 5)
    /// - `DISPENSER_KEY_PREFIX`: Storage key prefix (default: "dispenser")
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            daily_limit: std::env::var("DISPENSER_DAILY_LIMIT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.daily_limit),
            sheets_per_dispense: std::env::var("DISPENSER_SHEETS_PER_DISPENSE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.sheets_per_dispense),
            key_prefix: std::env::var("DISPENSER_KEY_PREFIX")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.key_prefix),
        }
    }

    /// Validate the configuration.
    ///
    /// Validates:
    /// - daily_limit > 0
    /// - sheets_per_dispense > 0
    /// - key_prefix is non-empty and contains no whitespace
    pub fn validate(&self) -> DispenserResult<()> {
        if self.daily_limit == 0 {
            return Err(DispenserError::Config(ConfigError::InvalidValue {
                field: "daily_limit".to_string(),
                value: self.daily_limit.to_string(),
                reason: "daily_limit must be greater than 0".to_string(),
            }));
        }

        if self.sheets_per_dispense == 0 {
            return Err(DispenserError::Config(ConfigError::InvalidValue {
                field: "sheets_per_dispense".to_string(),
                value: self.sheets_per_dispense.to_string(),
                reason: "sheets_per_dispense must be greater than 0".to_string(),
            }));
        }

        if self.key_prefix.is_empty() || self.key_prefix.chars().any(char::is_whitespace) {
            return Err(DispenserError::Config(ConfigError::InvalidValue {
                field: "key_prefix".to_string(),
                value: self.key_prefix.clone(),
                reason: "key_prefix must be non-empty without whitespace".to_string(),
            }));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_constants() {
        let config = DispenserConfig::default();
        assert_eq!(config.daily_limit, 2);
        assert_eq!(config.sheets_per_dispense, 5);
        assert_eq!(config.key_prefix, "dispenser");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_limit_rejected() {
        let config = DispenserConfig {
            daily_limit: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("daily_limit"));
    }

    #[test]
    fn test_zero_sheets_rejected() {
        let config = DispenserConfig {
            sheets_per_dispense: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_prefix_rejected() {
        let empty = DispenserConfig {
            key_prefix: String::new(),
            ..Default::default()
        };
        assert!(empty.validate().is_err());

        let spaced = DispenserConfig {
            key_prefix: "paper towel".to_string(),
            ..Default::default()
        };
        assert!(spaced.validate().is_err());
    }
}
