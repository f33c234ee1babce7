use crate::domain::errors::TrackingResult;
use crate::domain::performance::history::PredictionHistory;
use crate::domain::performance::metrics::{MetricsEngine, PerformanceMetrics};
use crate::domain::performance::prediction_record::{
    BackfillOutcome, PredictionRecord, PredictionType, format_timestamp, parse_timestamp,
};
use crate::domain::repositories::PredictionLogRepository;
use crate::infrastructure::observability::Metrics;
use chrono::NaiveDateTime;
use std::sync::Arc;
use tracing::{info, warn};

/// Default number of rows returned for the history view
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Entry point for logging predictions, reporting actual results and
/// reading accuracy. Holds one explicitly constructed log; share it by `Arc`.
pub struct PerformanceTracker {
    log: Arc<dyn PredictionLogRepository>,
    engine: MetricsEngine,
    metrics: Option<Metrics>,
}

impl PerformanceTracker {
    pub fn new(log: Arc<dyn PredictionLogRepository>) -> Self {
        Self {
            engine: MetricsEngine::new(log.clone()),
            log,
            metrics: None,
        }
    }

    /// Mirror log activity and accuracy into Prometheus metrics
    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn log_prediction(
        &self,
        prediction_type: PredictionType,
        input: &str,
        predicted_opens: f64,
        predicted_clicks: f64,
    ) -> TrackingResult<NaiveDateTime> {
        let timestamp = self
            .log
            .append(prediction_type, input, predicted_opens, predicted_clicks)?;

        if let Some(metrics) = &self.metrics {
            metrics.inc_predictions(prediction_type);
        }
        info!(
            "PerformanceTracker: logged {} prediction {}",
            prediction_type,
            format_timestamp(&timestamp)
        );
        Ok(timestamp)
    }

    pub fn log_actual_results(
        &self,
        timestamp: NaiveDateTime,
        actual_opens: f64,
        actual_clicks: f64,
    ) -> TrackingResult<BackfillOutcome> {
        let outcome = self.log.backfill(timestamp, actual_opens, actual_clicks)?;

        if let Some(metrics) = &self.metrics {
            metrics.inc_backfills(&outcome);
        }
        match outcome {
            BackfillOutcome::Updated { rows } => info!(
                "PerformanceTracker: actual results attached to {} ({} row(s))",
                format_timestamp(&timestamp),
                rows
            ),
            BackfillOutcome::NoMatch => warn!(
                "PerformanceTracker: no pending prediction at {}",
                format_timestamp(&timestamp)
            ),
        }
        Ok(outcome)
    }

    /// Same as [`Self::log_actual_results`] for timestamps received as text
    pub fn log_actual_results_at(
        &self,
        timestamp: &str,
        actual_opens: f64,
        actual_clicks: f64,
    ) -> TrackingResult<BackfillOutcome> {
        let timestamp = parse_timestamp(timestamp)?;
        self.log_actual_results(timestamp, actual_opens, actual_clicks)
    }

    pub fn get_performance_metrics(&self) -> TrackingResult<PerformanceMetrics> {
        let performance = self.engine.compute()?;
        if let Some(metrics) = &self.metrics {
            metrics.record_performance(&performance);
        }
        Ok(performance)
    }

    pub fn get_recent_predictions(&self, limit: usize) -> TrackingResult<Vec<PredictionRecord>> {
        self.log.recent(limit)
    }

    pub fn get_prediction_history(&self, limit: usize) -> TrackingResult<PredictionHistory> {
        let records = self.log.recent(limit)?;
        Ok(PredictionHistory::from_records(&records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::TrackingError;
    use crate::infrastructure::persistence::InMemoryPredictionLog;

    fn tracker() -> PerformanceTracker {
        PerformanceTracker::new(Arc::new(InMemoryPredictionLog::new()))
    }

    #[test]
    fn test_fresh_tracker_reports_zero_metrics() {
        let metrics = tracker().get_performance_metrics().unwrap();
        assert_eq!(metrics, PerformanceMetrics::default());
    }

    #[test]
    fn test_log_then_backfill_by_text_timestamp() {
        let tracker = tracker();
        let ts = tracker
            .log_prediction(PredictionType::SubjectLine, "Weekly digest", 150.0, 15.0)
            .unwrap();

        let outcome = tracker
            .log_actual_results_at(&format_timestamp(&ts), 140.0, 16.0)
            .unwrap();
        assert_eq!(outcome, BackfillOutcome::Updated { rows: 1 });

        let metrics = tracker.get_performance_metrics().unwrap();
        assert_eq!(metrics.total_predictions, 1);
        assert!((metrics.mae_opens - 10.0).abs() < 1e-9);
        assert!((metrics.mse_clicks - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_unparsable_timestamp_is_rejected() {
        let err = tracker()
            .log_actual_results_at("not-a-time", 1.0, 1.0)
            .unwrap_err();
        assert!(matches!(err, TrackingError::InvalidTimestamp { .. }));
    }

    #[test]
    fn test_history_view_follows_recent() {
        let tracker = tracker();
        tracker
            .log_prediction(PredictionType::SendTime, "hour: 8, day: 0", 10.0, 1.0)
            .unwrap();
        tracker
            .log_prediction(PredictionType::SendTime, "hour: 9, day: 0", 20.0, 2.0)
            .unwrap();

        let history = tracker.get_prediction_history(DEFAULT_HISTORY_LIMIT).unwrap();
        assert_eq!(history.predicted_opens, vec![20.0, 10.0]);
    }

    #[test]
    fn test_metrics_are_mirrored_to_prometheus() {
        let metrics = Metrics::new().unwrap();
        let tracker = tracker().with_metrics(metrics.clone());

        let ts = tracker
            .log_prediction(PredictionType::SendTime, "hour: 8, day: 0", 10.0, 1.0)
            .unwrap();
        tracker.log_actual_results(ts, 12.0, 1.0).unwrap();
        tracker.log_actual_results(ts, 12.0, 1.0).unwrap();
        tracker.get_performance_metrics().unwrap();

        let output = metrics.render();
        assert!(output.contains("mailpulse_completed_predictions 1"));
        assert!(output.contains("mailpulse_mse_opens 4"));
        assert!(output.contains("outcome=\"no_match\""));
    }
}
