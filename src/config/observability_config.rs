//! Observability configuration parsing from environment variables.
//!
//! This module handles loading the push-based metrics reporter settings.

use anyhow::{Context, Result};

/// Observability environment configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ObservabilityEnvConfig {
    pub enabled: bool,
    pub interval_seconds: u64,
}

impl Default for ObservabilityEnvConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_seconds: 60,
        }
    }
}

impl ObservabilityEnvConfig {
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let enabled = match lookup("OBSERVABILITY_ENABLED") {
            Some(v) => v
                .trim()
                .parse::<bool>()
                .with_context(|| format!("Invalid OBSERVABILITY_ENABLED: {}", v))?,
            None => defaults.enabled,
        };

        let interval_seconds = match lookup("OBSERVABILITY_INTERVAL") {
            Some(v) => v
                .trim()
                .parse::<u64>()
                .with_context(|| format!("Invalid OBSERVABILITY_INTERVAL: {}", v))?,
            None => defaults.interval_seconds,
        };

        if interval_seconds == 0 {
            anyhow::bail!("OBSERVABILITY_INTERVAL must be at least 1 second");
        }

        Ok(Self {
            enabled,
            interval_seconds,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observability_config_defaults() {
        let config = ObservabilityEnvConfig::from_lookup(|_| None).unwrap();
        assert!(config.enabled);
        assert_eq!(config.interval_seconds, 60);
    }

    #[test]
    fn test_observability_config_overrides() {
        let config = ObservabilityEnvConfig::from_lookup(|key| match key {
            "OBSERVABILITY_ENABLED" => Some("false".to_string()),
            "OBSERVABILITY_INTERVAL" => Some("15".to_string()),
            _ => None,
        })
        .unwrap();
        assert!(!config.enabled);
        assert_eq!(config.interval_seconds, 15);
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        let result = ObservabilityEnvConfig::from_lookup(|key| {
            (key == "OBSERVABILITY_INTERVAL").then(|| "0".to_string())
        });
        assert!(result.is_err());
    }
}
