//! Prometheus metrics definitions for mailpulse
//!
//! All metrics use the `mailpulse_` prefix and are read-only.

use crate::domain::performance::metrics::PerformanceMetrics;
use crate::domain::performance::prediction_record::{BackfillOutcome, PredictionType};
use prometheus::{
    CounterVec, Gauge, Opts, Registry, TextEncoder,
    core::{AtomicF64, GenericGauge},
};
use std::sync::Arc;

/// Prometheus metrics for the prediction log
#[derive(Clone)]
pub struct Metrics {
    registry: Arc<Registry>,
    /// Predictions appended, by prediction type
    pub predictions_logged_total: CounterVec,
    /// Backfill calls, by outcome (updated / no_match)
    pub backfills_total: CounterVec,
    /// Completed predictions in the log
    pub completed_predictions: GenericGauge<AtomicF64>,
    /// Mean squared error of predicted opens
    pub mse_opens: GenericGauge<AtomicF64>,
    /// Mean squared error of predicted clicks
    pub mse_clicks: GenericGauge<AtomicF64>,
    /// Mean absolute error of predicted opens
    pub mae_opens: GenericGauge<AtomicF64>,
    /// Mean absolute error of predicted clicks
    pub mae_clicks: GenericGauge<AtomicF64>,
    /// Uptime in seconds
    pub uptime_seconds: GenericGauge<AtomicF64>,
}

impl Metrics {
    /// Create a new Metrics instance with all gauges and counters registered
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let predictions_logged_total = CounterVec::new(
            Opts::new(
                "mailpulse_predictions_logged_total",
                "Total predictions appended to the log",
            ),
            &["prediction_type"],
        )?;
        registry.register(Box::new(predictions_logged_total.clone()))?;

        let backfills_total = CounterVec::new(
            Opts::new(
                "mailpulse_backfills_total",
                "Total actual-result backfills by outcome",
            ),
            &["outcome"],
        )?;
        registry.register(Box::new(backfills_total.clone()))?;

        let completed_predictions = Gauge::with_opts(Opts::new(
            "mailpulse_completed_predictions",
            "Predictions with actual results attached",
        ))?;
        registry.register(Box::new(completed_predictions.clone()))?;

        let mse_opens = Gauge::with_opts(Opts::new(
            "mailpulse_mse_opens",
            "Mean squared error of predicted opens",
        ))?;
        registry.register(Box::new(mse_opens.clone()))?;

        let mse_clicks = Gauge::with_opts(Opts::new(
            "mailpulse_mse_clicks",
            "Mean squared error of predicted clicks",
        ))?;
        registry.register(Box::new(mse_clicks.clone()))?;

        let mae_opens = Gauge::with_opts(Opts::new(
            "mailpulse_mae_opens",
            "Mean absolute error of predicted opens",
        ))?;
        registry.register(Box::new(mae_opens.clone()))?;

        let mae_clicks = Gauge::with_opts(Opts::new(
            "mailpulse_mae_clicks",
            "Mean absolute error of predicted clicks",
        ))?;
        registry.register(Box::new(mae_clicks.clone()))?;

        let uptime_seconds =
            Gauge::with_opts(Opts::new("mailpulse_uptime_seconds", "Uptime in seconds"))?;
        registry.register(Box::new(uptime_seconds.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            predictions_logged_total,
            backfills_total,
            completed_predictions,
            mse_opens,
            mse_clicks,
            mae_opens,
            mae_clicks,
            uptime_seconds,
        })
    }

    /// Render all metrics in Prometheus text format
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        encoder
            .encode_to_string(&metric_families)
            .unwrap_or_default()
    }

    /// Increment the append counter
    pub fn inc_predictions(&self, prediction_type: PredictionType) {
        self.predictions_logged_total
            .with_label_values(&[prediction_type.as_str()])
            .inc();
    }

    /// Increment the backfill counter
    pub fn inc_backfills(&self, outcome: &BackfillOutcome) {
        let label = match outcome {
            BackfillOutcome::Updated { .. } => "updated",
            BackfillOutcome::NoMatch => "no_match",
        };
        self.backfills_total.with_label_values(&[label]).inc();
    }

    /// Mirror the latest accuracy metrics into the gauges
    pub fn record_performance(&self, performance: &PerformanceMetrics) {
        self.completed_predictions
            .set(performance.total_predictions as f64);
        self.mse_opens.set(performance.mse_opens);
        self.mse_clicks.set(performance.mse_clicks);
        self.mae_opens.set(performance.mae_opens);
        self.mae_clicks.set(performance.mae_clicks);
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new().expect("Failed to create default Metrics")
    }
}
