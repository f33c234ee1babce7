//! mailpulse server - headless accuracy reporter
//!
//! Initializes the prediction log once, then pushes the current accuracy
//! metrics as structured JSON logs to stdout until Ctrl+C.
//!
//! # Usage
//! ```sh
//! OBSERVABILITY_INTERVAL=60 cargo run --bin server
//! ```
//!
//! # Environment Variables
//! - `PREDICTION_LOG_PATH` - Prediction log CSV (default: data/prediction_log.csv)
//! - `HISTORY_LIMIT` - Recent rows scanned for pending predictions (default: 50)
//! - `OBSERVABILITY_ENABLED` - Enable metrics reporting (default: true)
//! - `OBSERVABILITY_INTERVAL` - Interval in seconds between metric outputs (default: 60)

use anyhow::Result;
use mailpulse::application::monitoring::performance_tracker::PerformanceTracker;
use mailpulse::config::Config;
use mailpulse::infrastructure::observability::{Metrics, MetricsReporter};
use mailpulse::infrastructure::persistence::CsvPredictionLog;
use std::sync::Arc;
use tracing::{Level, info};
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false).pretty();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stdout_layer)
        .init();

    info!("mailpulse server {} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;
    info!(
        "Configuration loaded: log={:?}, history_limit={}",
        config.prediction_log_path, config.history_limit
    );

    let log = CsvPredictionLog::initialize(&config.prediction_log_path)?;
    let metrics = Metrics::new()?;
    let tracker = Arc::new(PerformanceTracker::new(Arc::new(log)).with_metrics(metrics.clone()));

    let initial = tracker.get_performance_metrics()?;
    info!(
        "Prediction log ready: {} completed predictions",
        initial.total_predictions
    );

    if config.observability_enabled {
        let reporter = MetricsReporter::new(
            tracker.clone(),
            metrics,
            config.observability_interval_seconds,
            config.history_limit,
        );

        tokio::spawn(async move {
            reporter.run().await;
        });

        info!(
            "Metrics reporter started (interval: {}s)",
            config.observability_interval_seconds
        );
    } else {
        info!("Metrics reporting disabled.");
    }

    info!("Server running. Press Ctrl+C to shutdown.");

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received. Exiting...");

    Ok(())
}
