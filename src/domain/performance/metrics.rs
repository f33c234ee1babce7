use super::prediction_record::PredictionRecord;
use super::stats::Stats;
use crate::domain::errors::TrackingResult;
use crate::domain::repositories::PredictionLogRepository;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Aggregate accuracy over completed predictions.
///
/// Every numeric field is 0 when nothing has been completed yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub total_predictions: usize,
    pub mse_opens: f64,
    pub mse_clicks: f64,
    pub mae_opens: f64,
    pub mae_clicks: f64,
}

impl PerformanceMetrics {
    /// Aggregate over `records`, ignoring pending ones.
    ///
    /// A row with any non-finite value is dropped entirely, so it neither
    /// counts towards `total_predictions` nor poisons the means.
    pub fn from_records(records: &[PredictionRecord]) -> Self {
        let mut opens = Vec::new();
        let mut clicks = Vec::new();

        for record in records {
            if let (Some(actual_opens), Some(actual_clicks)) =
                (record.actual_opens, record.actual_clicks)
            {
                let values = [
                    record.predicted_opens,
                    record.predicted_clicks,
                    actual_opens,
                    actual_clicks,
                ];
                if !values.iter().all(|v| v.is_finite()) {
                    continue;
                }
                opens.push((record.predicted_opens, actual_opens));
                clicks.push((record.predicted_clicks, actual_clicks));
            }
        }

        if opens.is_empty() {
            return Self::default();
        }

        Self {
            total_predictions: opens.len(),
            mse_opens: Stats::mean_squared_error(&opens),
            mse_clicks: Stats::mean_squared_error(&clicks),
            mae_opens: Stats::mean_absolute_error(&opens),
            mae_clicks: Stats::mean_absolute_error(&clicks),
        }
    }
}

/// Computes [`PerformanceMetrics`] from whatever the log holds right now
pub struct MetricsEngine {
    log: Arc<dyn PredictionLogRepository>,
}

impl MetricsEngine {
    pub fn new(log: Arc<dyn PredictionLogRepository>) -> Self {
        Self { log }
    }

    pub fn compute(&self) -> TrackingResult<PerformanceMetrics> {
        let completed = self.log.completed()?;
        let metrics = PerformanceMetrics::from_records(&completed);
        debug!(
            "MetricsEngine: {} completed predictions, mae_opens={:.3}, mae_clicks={:.3}",
            metrics.total_predictions, metrics.mae_opens, metrics.mae_clicks
        );
        Ok(metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::performance::prediction_record::PredictionType;
    use chrono::NaiveDate;

    fn record(
        second: u32,
        predicted: (f64, f64),
        actual: Option<(f64, f64)>,
    ) -> PredictionRecord {
        let timestamp = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(12, 0, second)
            .unwrap();
        let mut record = PredictionRecord::pending(
            timestamp,
            PredictionType::SendTime,
            "hour: 12, day: 2",
            predicted.0,
            predicted.1,
        );
        if let Some((opens, clicks)) = actual {
            record.complete(opens, clicks);
        }
        record
    }

    #[test]
    fn test_empty_records_give_zero_metrics() {
        assert_eq!(PerformanceMetrics::from_records(&[]), PerformanceMetrics::default());
    }

    #[test]
    fn test_metrics_over_completed_records() {
        let records = vec![
            record(1, (100.0, 10.0), Some((90.0, 15.0))),
            record(2, (200.0, 20.0), Some((210.0, 18.0))),
        ];

        let metrics = PerformanceMetrics::from_records(&records);

        assert_eq!(metrics.total_predictions, 2);
        assert!((metrics.mae_opens - 10.0).abs() < 1e-9);
        assert!((metrics.mae_clicks - 3.5).abs() < 1e-9);
        assert!((metrics.mse_opens - 100.0).abs() < 1e-9);
        assert!((metrics.mse_clicks - 14.5).abs() < 1e-9);
    }

    #[test]
    fn test_pending_records_are_ignored() {
        let records = vec![
            record(1, (100.0, 10.0), Some((90.0, 15.0))),
            record(2, (200.0, 20.0), Some((210.0, 18.0))),
            record(3, (5000.0, 900.0), None),
        ];

        let metrics = PerformanceMetrics::from_records(&records);
        assert_eq!(metrics.total_predictions, 2);
        assert!((metrics.mse_opens - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_nan_prediction_drops_the_row() {
        let records = vec![
            record(1, (100.0, 10.0), Some((90.0, 15.0))),
            record(2, (200.0, 20.0), Some((210.0, 18.0))),
            record(3, (f64::NAN, 5.0), Some((50.0, 5.0))),
        ];

        let metrics = PerformanceMetrics::from_records(&records);
        assert_eq!(metrics.total_predictions, 2);
        assert!((metrics.mse_opens - 100.0).abs() < 1e-9);
        assert!((metrics.mae_opens - 10.0).abs() < 1e-9);
        assert!((metrics.mse_clicks - 14.5).abs() < 1e-9);
    }

    #[test]
    fn test_only_non_finite_rows_give_zero_metrics() {
        let records = vec![
            record(1, (f64::NAN, 10.0), Some((90.0, 15.0))),
            record(2, (f64::INFINITY, 10.0), Some((90.0, 15.0))),
        ];

        assert_eq!(
            PerformanceMetrics::from_records(&records),
            PerformanceMetrics::default()
        );
    }
}
