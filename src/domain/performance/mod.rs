// Prediction accuracy tracking domain
pub mod history;
pub mod metrics;
pub mod prediction_record;
pub mod stats;
