//! Repository abstraction for the prediction log.
//!
//! The log owns every prediction record. Business logic reaches it only
//! through [`PredictionLogRepository`], so the CSV store and the in-memory
//! store are interchangeable.
//!
//! # Example
//!
//! ```rust,no_run
//! use mailpulse::domain::performance::prediction_record::PredictionType;
//! use mailpulse::domain::repositories::PredictionLogRepository;
//! use mailpulse::infrastructure::persistence::CsvPredictionLog;
//!
//! # fn main() -> anyhow::Result<()> {
//! let log = CsvPredictionLog::initialize("data/prediction_log.csv")?;
//! let timestamp = log.append(PredictionType::SendTime, "hour: 9, day: 2", 120.0, 14.0)?;
//! log.backfill(timestamp, 110.0, 12.0)?;
//! # Ok(())
//! # }
//! ```

use crate::domain::errors::TrackingResult;
use crate::domain::performance::prediction_record::{
    BackfillOutcome, PredictionRecord, PredictionType,
};
use chrono::NaiveDateTime;

/// Append-only store of prediction records with a two-phase fill
pub trait PredictionLogRepository: Send + Sync {
    /// Write a new pending record and return its timestamp
    fn append(
        &self,
        prediction_type: PredictionType,
        input: &str,
        predicted_opens: f64,
        predicted_clicks: f64,
    ) -> TrackingResult<NaiveDateTime>;

    /// Attach actual results to every pending record with `timestamp`
    fn backfill(
        &self,
        timestamp: NaiveDateTime,
        actual_opens: f64,
        actual_clicks: f64,
    ) -> TrackingResult<BackfillOutcome>;

    /// Up to `limit` most recently appended records, newest first
    fn recent(&self, limit: usize) -> TrackingResult<Vec<PredictionRecord>>;

    /// Every record with both actual values present
    fn completed(&self) -> TrackingResult<Vec<PredictionRecord>>;
}
