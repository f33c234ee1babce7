use crate::domain::ml::features::{EngagementFeatures, EngagementPrediction};

/// Interface for engagement models
pub trait EngagementModel: Send + Sync {
    /// Predict opens and clicks for one campaign.
    ///
    /// Implementations accept only their own feature family and return an
    /// error message for the other one.
    fn predict(&self, features: &EngagementFeatures) -> Result<EngagementPrediction, String>;

    /// Get model name/type
    fn name(&self) -> &str;

    /// Get model version/id
    fn version(&self) -> &str;
}
