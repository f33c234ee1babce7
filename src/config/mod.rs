//! Configuration module for mailpulse.
//!
//! Structured configuration loading from environment variables, split into
//! storage and observability settings.

mod observability_config;

pub use observability_config::ObservabilityEnvConfig;

use crate::application::monitoring::performance_tracker::DEFAULT_HISTORY_LIMIT;
use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

pub const DEFAULT_PREDICTION_LOG_PATH: &str = "data/prediction_log.csv";

/// Main application configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    // Storage
    pub prediction_log_path: PathBuf,
    pub history_limit: usize,

    // Observability (from ObservabilityEnvConfig)
    pub observability_enabled: bool,
    pub observability_interval_seconds: u64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its value
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let prediction_log_path = lookup("PREDICTION_LOG_PATH")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PREDICTION_LOG_PATH));

        let history_limit = match lookup("HISTORY_LIMIT") {
            Some(v) => v
                .trim()
                .parse::<usize>()
                .with_context(|| format!("Invalid HISTORY_LIMIT: {}", v))?,
            None => DEFAULT_HISTORY_LIMIT,
        };

        let observability = ObservabilityEnvConfig::from_lookup(&lookup)
            .context("Failed to load observability config")?;

        Ok(Self {
            prediction_log_path,
            history_limit,
            observability_enabled: observability.enabled,
            observability_interval_seconds: observability.interval_seconds,
        })
    }
}
