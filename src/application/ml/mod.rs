pub mod historical_average;
pub mod prediction_service;
pub mod predictor;

pub use historical_average::HistoricalAverageModel;
pub use prediction_service::{PredictionOutcome, PredictionService};
pub use predictor::EngagementModel;
