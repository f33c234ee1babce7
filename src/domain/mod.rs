// Model input/output contract
pub mod ml;

// Prediction accuracy tracking domain
pub mod performance;

// Repository traits
pub mod repositories;

// Domain-specific error types
pub mod errors;
