// Prediction log access and accuracy reporting
pub mod performance_tracker;

pub use performance_tracker::{DEFAULT_HISTORY_LIMIT, PerformanceTracker};
