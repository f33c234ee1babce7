use super::predictor::EngagementModel;
use crate::domain::ml::features::{EngagementFeatures, EngagementPrediction};
use crate::domain::performance::prediction_record::{PredictionRecord, PredictionType};
use crate::domain::repositories::PredictionLogRepository;
use std::sync::Arc;
use tracing::{debug, warn};

/// Baseline model that predicts the mean observed engagement.
///
/// Completed predictions of the same family with an identical input are
/// preferred; otherwise every completed prediction of the family is
/// averaged. With no history at all the prediction is neutral (zero).
pub struct HistoricalAverageModel {
    family: PredictionType,
    log: Arc<dyn PredictionLogRepository>,
}

impl HistoricalAverageModel {
    pub fn new(family: PredictionType, log: Arc<dyn PredictionLogRepository>) -> Self {
        Self { family, log }
    }

    fn mean_actuals<'a>(
        records: impl Iterator<Item = &'a PredictionRecord>,
    ) -> Option<EngagementPrediction> {
        let (opens, clicks, count) = records
            .filter_map(|r| Some((r.actual_opens?, r.actual_clicks?)))
            .filter(|(opens, clicks)| opens.is_finite() && clicks.is_finite())
            .fold((0.0, 0.0, 0usize), |(o, c, n), (opens, clicks)| {
                (o + opens, c + clicks, n + 1)
            });

        (count > 0).then(|| EngagementPrediction {
            predicted_opens: opens / count as f64,
            predicted_clicks: clicks / count as f64,
        })
    }
}

impl EngagementModel for HistoricalAverageModel {
    fn predict(&self, features: &EngagementFeatures) -> Result<EngagementPrediction, String> {
        if features.prediction_type() != self.family {
            return Err(format!(
                "expected {} features, got {}",
                self.family,
                features.prediction_type()
            ));
        }

        let completed = self.log.completed().map_err(|e| e.to_string())?;
        let family: Vec<_> = completed
            .iter()
            .filter(|r| r.prediction_type == self.family)
            .collect();

        let input = features.describe();
        if let Some(prediction) =
            Self::mean_actuals(family.iter().copied().filter(|r| r.input == input))
        {
            debug!("Averaged history for identical input {:?}", input);
            return Ok(prediction);
        }

        match Self::mean_actuals(family.iter().copied()) {
            Some(prediction) => Ok(prediction),
            None => {
                warn!(
                    "No completed {} predictions yet. Model will return neutral.",
                    self.family
                );
                Ok(EngagementPrediction {
                    predicted_opens: 0.0,
                    predicted_clicks: 0.0,
                })
            }
        }
    }

    fn name(&self) -> &str {
        "Historical Average"
    }

    fn version(&self) -> &str {
        "baseline"
    }
}
