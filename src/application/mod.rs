// Engagement models and the predict-and-log flow
pub mod ml;

// Prediction accuracy tracking
pub mod monitoring;
