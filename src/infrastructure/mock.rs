use crate::application::ml::predictor::EngagementModel;
use crate::domain::ml::features::{EngagementFeatures, EngagementPrediction};
use crate::domain::performance::prediction_record::PredictionType;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Fixed-output model for one feature family
pub struct MockEngagementModel {
    family: PredictionType,
    prediction: EngagementPrediction,
    calls: AtomicUsize,
}

impl MockEngagementModel {
    pub fn new(family: PredictionType, predicted_opens: f64, predicted_clicks: f64) -> Self {
        Self {
            family,
            prediction: EngagementPrediction {
                predicted_opens,
                predicted_clicks,
            },
            calls: AtomicUsize::new(0),
        }
    }

    pub fn send_time(predicted_opens: f64, predicted_clicks: f64) -> Self {
        Self::new(PredictionType::SendTime, predicted_opens, predicted_clicks)
    }

    pub fn subject_line(predicted_opens: f64, predicted_clicks: f64) -> Self {
        Self::new(PredictionType::SubjectLine, predicted_opens, predicted_clicks)
    }

    /// Number of successful predictions served
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl EngagementModel for MockEngagementModel {
    fn predict(&self, features: &EngagementFeatures) -> Result<EngagementPrediction, String> {
        if features.prediction_type() != self.family {
            return Err(format!(
                "expected {} features, got {}",
                self.family,
                features.prediction_type()
            ));
        }
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.prediction)
    }

    fn name(&self) -> &str {
        "Mock Engagement Model"
    }

    fn version(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_rejects_other_family() {
        let model = MockEngagementModel::subject_line(1.0, 2.0);
        assert!(model.predict(&EngagementFeatures::SendTime { hour: 1, day: 1 }).is_err());
        assert_eq!(model.calls(), 0);

        let prediction = model
            .predict(&EngagementFeatures::SubjectLine {
                subject: "Hi".to_string(),
            })
            .unwrap();
        assert_eq!(prediction.predicted_clicks, 2.0);
        assert_eq!(model.calls(), 1);
    }
}
