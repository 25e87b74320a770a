//! Configuration for the seal registry
//!
//! # Example
//!
//! ```ignore
//! use seal_registry::RegistryConfigBuilder;
//!
//! let config = RegistryConfigBuilder::new()
//!     .operator("sealadmin")
//!     .max_reap_batch(50)
//!     .build()
//!     .expect("Valid config");
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::value_objects::AccountName;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Operator account must not be empty")]
    EmptyOperator,

    #[error("{field} must be positive")]
    ZeroLimit { field: &'static str },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Registry configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Account allowed to run operator-only maintenance (`wipe_all_keys`)
    pub operator: AccountName,
    /// Upper bound on seals removed by one `reap_expired` call
    pub max_reap_batch: usize,
    /// Longest accepted `expires_in_days`
    pub max_expiry_days: u32,
    /// Longest accepted workflow description, in bytes
    pub max_description_len: usize,
    /// Longest accepted memo or revoke reason, in bytes
    pub max_memo_len: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            operator: AccountName::from("sealregistry"),
            max_reap_batch: 100,
            max_expiry_days: 3650,
            max_description_len: 256,
            max_memo_len: 256,
        }
    }
}

impl RegistryConfig {
    /// Parses and validates a JSON document. Missing fields take defaults.
    pub fn from_json(document: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(document)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.operator.is_empty() {
            return Err(ConfigError::EmptyOperator);
        }
        if self.max_reap_batch == 0 {
            return Err(ConfigError::ZeroLimit {
                field: "max_reap_batch",
            });
        }
        if self.max_expiry_days == 0 {
            return Err(ConfigError::ZeroLimit {
                field: "max_expiry_days",
            });
        }
        Ok(())
    }

    pub fn with_operator(mut self, operator: impl Into<AccountName>) -> Self {
        self.operator = operator.into();
        self
    }

    pub fn with_max_reap_batch(mut self, max: usize) -> Self {
        self.max_reap_batch = max;
        self
    }
}

/// Fluent builder for [`RegistryConfig`]; unset fields take defaults.
#[derive(Default)]
pub struct RegistryConfigBuilder {
    operator: Option<AccountName>,
    max_reap_batch: Option<usize>,
    max_expiry_days: Option<u32>,
    max_description_len: Option<usize>,
    max_memo_len: Option<usize>,
}

impl RegistryConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn operator(mut self, operator: impl Into<AccountName>) -> Self {
        self.operator = Some(operator.into());
        self
    }

    pub fn max_reap_batch(mut self, max: usize) -> Self {
        self.max_reap_batch = Some(max);
        self
    }

    pub fn max_expiry_days(mut self, days: u32) -> Self {
        self.max_expiry_days = Some(days);
        self
    }

    pub fn max_description_len(mut self, len: usize) -> Self {
        self.max_description_len = Some(len);
        self
    }

    pub fn max_memo_len(mut self, len: usize) -> Self {
        self.max_memo_len = Some(len);
        self
    }

    pub fn build(self) -> Result<RegistryConfig, ConfigError> {
        let defaults = RegistryConfig::default();

        let config = RegistryConfig {
            operator: self.operator.unwrap_or(defaults.operator),
            max_reap_batch: self.max_reap_batch.unwrap_or(defaults.max_reap_batch),
            max_expiry_days: self.max_expiry_days.unwrap_or(defaults.max_expiry_days),
            max_description_len: self
                .max_description_len
                .unwrap_or(defaults.max_description_len),
            max_memo_len: self.max_memo_len.unwrap_or(defaults.max_memo_len),
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RegistryConfig::default();
        assert_eq!(config.operator.as_str(), "sealregistry");
        assert_eq!(config.max_reap_batch, 100);
        assert_eq!(config.max_expiry_days, 3650);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_overrides() {
        let config = RegistryConfigBuilder::new()
            .operator("ops")
            .max_reap_batch(5)
            .max_memo_len(32)
            .build()
            .unwrap();
        assert_eq!(config.operator, AccountName::from("ops"));
        assert_eq!(config.max_reap_batch, 5);
        assert_eq!(config.max_memo_len, 32);
        assert_eq!(config.max_description_len, 256);
    }

    #[test]
    fn test_builder_rejects_invalid() {
        assert!(matches!(
            RegistryConfigBuilder::new().operator("").build(),
            Err(ConfigError::EmptyOperator)
        ));
        assert!(matches!(
            RegistryConfigBuilder::new().max_reap_batch(0).build(),
            Err(ConfigError::ZeroLimit {
                field: "max_reap_batch"
            })
        ));
    }

    #[test]
    fn test_from_json_partial_document() {
        let config = RegistryConfig::from_json(r#"{"operator": "ops", "max_reap_batch": 7}"#)
            .unwrap();
        assert_eq!(config.operator.as_str(), "ops");
        assert_eq!(config.max_reap_batch, 7);
        assert_eq!(config.max_expiry_days, 3650);

        assert!(matches!(
            RegistryConfig::from_json(r#"{"max_expiry_days": 0}"#),
            Err(ConfigError::ZeroLimit {
                field: "max_expiry_days"
            })
        ));
    }

    #[test]
    fn test_parse_error_keeps_source() {
        use std::error::Error as _;

        let err = RegistryConfig::from_json("{not json").unwrap_err();
        let ConfigError::Parse(inner) = &err else {
            panic!("expected parse error, got {err:?}");
        };
        assert!(inner.is_syntax());
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("Failed to parse config:"));

        // Wrong field type is a data error, not a syntax error.
        let err = RegistryConfig::from_json(r#"{"max_reap_batch": "many"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(ref e) if e.is_data()));
    }
}
