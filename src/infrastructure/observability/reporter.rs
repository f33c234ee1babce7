//! Push-based metrics reporter for mailpulse
//!
//! Periodically outputs prediction accuracy as structured JSON to stdout.
//!
//! **Security**: This system only SENDS data, never accepts requests.

use crate::application::monitoring::performance_tracker::PerformanceTracker;
use crate::domain::performance::metrics::PerformanceMetrics;
use crate::infrastructure::observability::metrics::Metrics;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Metrics snapshot for JSON output
#[derive(Serialize)]
pub struct MetricsSnapshot {
    pub timestamp: String,
    pub uptime_seconds: u64,
    pub version: String,
    pub performance: PerformanceMetrics,
    pub pending_in_window: usize,
}

/// Push-based metrics reporter
///
/// Outputs metrics as structured JSON logs on a configurable interval.
pub struct MetricsReporter {
    tracker: Arc<PerformanceTracker>,
    metrics: Metrics,
    start_time: Instant,
    interval: Duration,
    history_limit: usize,
}

impl MetricsReporter {
    /// Create a new metrics reporter
    ///
    /// # Arguments
    /// * `tracker` - Shared performance tracker
    /// * `metrics` - Prometheus metrics (for internal tracking)
    /// * `interval_seconds` - How often to output metrics
    /// * `history_limit` - How many recent rows to scan for pending predictions
    pub fn new(
        tracker: Arc<PerformanceTracker>,
        metrics: Metrics,
        interval_seconds: u64,
        history_limit: usize,
    ) -> Self {
        Self {
            tracker,
            metrics,
            start_time: Instant::now(),
            interval: Duration::from_secs(interval_seconds.max(1)),
            history_limit,
        }
    }

    /// Run the reporter in a loop, outputting metrics periodically
    pub async fn run(self) {
        info!(
            "MetricsReporter: Starting push-based metrics (interval: {:?})",
            self.interval
        );

        loop {
            tokio::time::sleep(self.interval).await;

            match self.collect_snapshot().await {
                Ok(snapshot) => match serde_json::to_string(&snapshot) {
                    Ok(json) => {
                        // Prefix lets log shippers filter metric lines
                        println!("METRICS_JSON:{}", json);
                        info!(
                            "Completed: {} | MAE opens {:.2} clicks {:.2} | Uptime: {}s",
                            snapshot.performance.total_predictions,
                            snapshot.performance.mae_opens,
                            snapshot.performance.mae_clicks,
                            snapshot.uptime_seconds
                        );
                    }
                    Err(e) => warn!("Failed to serialize metrics: {}", e),
                },
                Err(e) => warn!("Failed to collect metrics: {}", e),
            }
        }
    }

    /// Collect current metrics snapshot
    pub async fn collect_snapshot(&self) -> anyhow::Result<MetricsSnapshot> {
        let tracker = self.tracker.clone();
        let limit = self.history_limit;

        // The log does blocking file I/O
        let (performance, recent) = tokio::task::spawn_blocking(move || {
            let performance = tracker.get_performance_metrics()?;
            let recent = tracker.get_recent_predictions(limit)?;
            Ok::<_, crate::domain::errors::TrackingError>((performance, recent))
        })
        .await??;

        let uptime = self.start_time.elapsed().as_secs();
        self.metrics.record_performance(&performance);
        self.metrics.uptime_seconds.set(uptime as f64);

        Ok(MetricsSnapshot {
            timestamp: chrono::Utc::now().to_rfc3339(),
            uptime_seconds: uptime,
            version: env!("CARGO_PKG_VERSION").to_string(),
            performance,
            pending_in_window: recent.iter().filter(|r| r.is_pending()).count(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::performance::prediction_record::PredictionType;
    use crate::infrastructure::persistence::InMemoryPredictionLog;

    #[tokio::test]
    async fn test_metrics_snapshot_collection() {
        let tracker = Arc::new(PerformanceTracker::new(Arc::new(InMemoryPredictionLog::new())));
        let ts = tracker
            .log_prediction(PredictionType::SendTime, "hour: 9, day: 1", 100.0, 10.0)
            .unwrap();
        tracker.log_actual_results(ts, 90.0, 15.0).unwrap();
        tracker
            .log_prediction(PredictionType::SubjectLine, "Flash sale", 50.0, 5.0)
            .unwrap();

        let metrics = Metrics::new().expect("Failed to create metrics");
        let reporter = MetricsReporter::new(tracker, metrics.clone(), 60, 50);

        let snapshot = reporter
            .collect_snapshot()
            .await
            .expect("Failed to collect snapshot");

        assert_eq!(snapshot.performance.total_predictions, 1);
        assert_eq!(snapshot.pending_in_window, 1);
        assert!(!snapshot.timestamp.is_empty());
        assert!(metrics.render().contains("mailpulse_mae_opens 10"));
    }

    #[test]
    fn test_snapshot_serialization() {
        let snapshot = MetricsSnapshot {
            timestamp: "2026-01-10T10:00:00Z".to_string(),
            uptime_seconds: 3600,
            version: "0.1.0".to_string(),
            performance: PerformanceMetrics {
                total_predictions: 2,
                mse_opens: 100.0,
                mse_clicks: 14.5,
                mae_opens: 10.0,
                mae_clicks: 3.5,
            },
            pending_in_window: 0,
        };

        let json = serde_json::to_string(&snapshot).expect("Failed to serialize");
        assert!(json.contains("\"total_predictions\":2"));
        assert!(json.contains("\"mse_clicks\":14.5"));
    }
}
