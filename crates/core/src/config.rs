// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Tunables for the visit service.
///
/// Missing keys fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisitConfig {
    /// Alphanumeric prefix of generated ticket numbers.
    pub ticket_prefix: String,
    /// Candidates tried before ticket generation gives up.
    pub ticket_max_attempts: u32,
    pub device_cache_ttl_secs: u64,
    pub device_cache_capacity: u64,
    /// Bound of the background event queue.
    pub event_queue_capacity: usize,
}

impl Default for VisitConfig {
    fn default() -> Self {
        Self {
            ticket_prefix: String::from("MV"),
            ticket_max_attempts: 10,
            device_cache_ttl_secs: 3_600,
            device_cache_capacity: 10_000,
            event_queue_capacity: 256,
        }
    }
}

impl VisitConfig {
    /// Reads a JSON config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON, or
    /// holds values the service cannot run with.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw: String = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Parses a JSON config document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is malformed or fails validation.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the values are usable.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ticket_prefix.is_empty()
            || !self.ticket_prefix.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Err(ConfigError::Invalid(format!(
                "ticket_prefix must be alphanumeric, got {:?}",
                self.ticket_prefix
            )));
        }
        if self.ticket_max_attempts == 0 {
            return Err(ConfigError::Invalid(String::from(
                "ticket_max_attempts must be at least 1",
            )));
        }
        if self.event_queue_capacity == 0 {
            return Err(ConfigError::Invalid(String::from(
                "event_queue_capacity must be at least 1",
            )));
        }
        Ok(())
    }

    #[must_use]
    pub const fn device_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.device_cache_ttl_secs)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = VisitConfig::default();
        assert_eq!(config.ticket_prefix, "MV");
        assert_eq!(config.ticket_max_attempts, 10);
        assert_eq!(config.device_cache_ttl(), Duration::from_secs(3_600));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = VisitConfig::from_json(r#"{ "ticket_prefix": "SV" }"#).unwrap();
        assert_eq!(config.ticket_prefix, "SV");
        assert_eq!(config.event_queue_capacity, 256);
    }

    #[test]
    fn test_rejects_bad_prefix() {
        assert!(matches!(
            VisitConfig::from_json(r#"{ "ticket_prefix": "M-V" }"#),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_rejects_zero_attempts() {
        assert!(matches!(
            VisitConfig::from_json(r#"{ "ticket_max_attempts": 0 }"#),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            VisitConfig::from_json("{"),
            Err(ConfigError::Parse(_))
        ));
    }
}
