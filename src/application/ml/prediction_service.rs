use super::predictor::EngagementModel;
use crate::application::monitoring::performance_tracker::PerformanceTracker;
use crate::domain::errors::PredictionError;
use crate::domain::ml::features::{EngagementFeatures, EngagementPrediction};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error};

/// A served prediction plus the log timestamp to report actuals against
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionOutcome {
    #[serde(flatten)]
    pub prediction: EngagementPrediction,
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: NaiveDateTime,
}

fn serialize_timestamp<S>(timestamp: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    use crate::domain::performance::prediction_record::format_timestamp;
    serializer.serialize_str(&format_timestamp(timestamp))
}

/// Validates requests, asks the matching model, and logs every prediction
pub struct PredictionService {
    send_time_model: Arc<dyn EngagementModel>,
    subject_line_model: Arc<dyn EngagementModel>,
    tracker: Arc<PerformanceTracker>,
}

impl PredictionService {
    pub fn new(
        send_time_model: Arc<dyn EngagementModel>,
        subject_line_model: Arc<dyn EngagementModel>,
        tracker: Arc<PerformanceTracker>,
    ) -> Self {
        Self {
            send_time_model,
            subject_line_model,
            tracker,
        }
    }

    /// `hour` is 0-23, `day` is the weekday with 0 = Monday
    pub fn predict_send_time(
        &self,
        hour: u32,
        day: u32,
    ) -> Result<PredictionOutcome, PredictionError> {
        if hour > 23 {
            return Err(PredictionError::Validation {
                reason: format!("hour must be between 0 and 23, got {}", hour),
            });
        }
        if day > 6 {
            return Err(PredictionError::Validation {
                reason: format!("day must be between 0 and 6, got {}", day),
            });
        }

        let features = EngagementFeatures::SendTime { hour, day };
        self.predict_and_log(self.send_time_model.as_ref(), features)
    }

    pub fn recommend_subject_line(
        &self,
        subject: &str,
    ) -> Result<PredictionOutcome, PredictionError> {
        if subject.trim().is_empty() {
            return Err(PredictionError::Validation {
                reason: "subject must not be empty".to_string(),
            });
        }

        let features = EngagementFeatures::SubjectLine {
            subject: subject.to_string(),
        };
        self.predict_and_log(self.subject_line_model.as_ref(), features)
    }

    fn predict_and_log(
        &self,
        model: &dyn EngagementModel,
        features: EngagementFeatures,
    ) -> Result<PredictionOutcome, PredictionError> {
        let prediction = model.predict(&features).map_err(|reason| {
            error!("Model {} {} failed: {}", model.name(), model.version(), reason);
            PredictionError::Model {
                model: model.name().to_string(),
                reason,
            }
        })?;
        debug!(
            "Model {} predicted opens={:.2} clicks={:.2} for {:?}",
            model.name(),
            prediction.predicted_opens,
            prediction.predicted_clicks,
            features
        );

        let timestamp = self.tracker.log_prediction(
            features.prediction_type(),
            &features.describe(),
            prediction.predicted_opens,
            prediction.predicted_clicks,
        )?;

        Ok(PredictionOutcome {
            prediction,
            timestamp,
        })
    }
}
