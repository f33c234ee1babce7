pub mod mock;
pub mod observability;
pub mod persistence;

pub use persistence::{CsvPredictionLog, InMemoryPredictionLog};
