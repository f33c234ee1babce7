use crate::domain::performance::prediction_record::PredictionType;
use serde::{Deserialize, Serialize};

/// Input to an engagement model, one variant per feature family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngagementFeatures {
    /// Hour of day (0-23) and day of week (0 = Monday)
    SendTime { hour: u32, day: u32 },
    /// Raw subject line text; vectorization is the model's concern
    SubjectLine { subject: String },
}

impl EngagementFeatures {
    pub fn prediction_type(&self) -> PredictionType {
        match self {
            EngagementFeatures::SendTime { .. } => PredictionType::SendTime,
            EngagementFeatures::SubjectLine { .. } => PredictionType::SubjectLine,
        }
    }

    /// Free-form description stored in the log's `input` column
    pub fn describe(&self) -> String {
        match self {
            EngagementFeatures::SendTime { hour, day } => format!("hour: {}, day: {}", hour, day),
            EngagementFeatures::SubjectLine { subject } => subject.clone(),
        }
    }
}

/// Predicted engagement for one campaign
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngagementPrediction {
    pub predicted_opens: f64,
    pub predicted_clicks: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_time_description() {
        let features = EngagementFeatures::SendTime { hour: 14, day: 3 };
        assert_eq!(features.describe(), "hour: 14, day: 3");
        assert_eq!(features.prediction_type(), PredictionType::SendTime);
    }

    #[test]
    fn test_subject_line_description() {
        let features = EngagementFeatures::SubjectLine {
            subject: "Spring sale, 20% off".to_string(),
        };
        assert_eq!(features.describe(), "Spring sale, 20% off");
        assert_eq!(features.prediction_type(), PredictionType::SubjectLine);
    }
}
