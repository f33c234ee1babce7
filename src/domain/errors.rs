use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the prediction log and the services built on it
#[derive(Debug, Error)]
pub enum TrackingError {
    #[error("Prediction log not found at {path:?}; it must be initialized first")]
    StoreNotFound { path: PathBuf },

    #[error("Prediction log at {path:?} is corrupt: {reason}")]
    StoreCorrupt { path: PathBuf, reason: String },

    #[error("I/O failure on prediction log {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid timestamp '{value}': expected YYYY-MM-DD HH:MM:SS[.ffffff]")]
    InvalidTimestamp { value: String },

    #[error("Prediction log lock poisoned")]
    LockPoisoned,
}

/// Errors related to prediction requests and the models serving them
#[derive(Debug, Error)]
pub enum PredictionError {
    #[error("Invalid request: {reason}")]
    Validation { reason: String },

    #[error("Model '{model}' failed: {reason}")]
    Model { model: String, reason: String },

    #[error(transparent)]
    Tracking(#[from] TrackingError),
}

pub type TrackingResult<T> = Result<T, TrackingError>;
