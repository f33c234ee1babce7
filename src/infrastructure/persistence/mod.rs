pub mod csv_prediction_log;
pub mod in_memory_prediction_log;

pub use csv_prediction_log::CsvPredictionLog;
pub use in_memory_prediction_log::InMemoryPredictionLog;
