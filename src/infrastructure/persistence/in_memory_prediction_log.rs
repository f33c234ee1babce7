use crate::domain::errors::{TrackingError, TrackingResult};
use crate::domain::performance::prediction_record::{
    BackfillOutcome, PredictionRecord, PredictionType, next_timestamp,
};
use crate::domain::repositories::PredictionLogRepository;
use chrono::{Local, NaiveDateTime};
use std::sync::RwLock;

/// Thread-safe, non-durable prediction log
#[derive(Default)]
pub struct InMemoryPredictionLog {
    records: RwLock<Vec<PredictionRecord>>,
}

impl InMemoryPredictionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with existing rows, e.g. fixtures in tests
    pub fn with_records(records: Vec<PredictionRecord>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PredictionLogRepository for InMemoryPredictionLog {
    fn append(
        &self,
        prediction_type: PredictionType,
        input: &str,
        predicted_opens: f64,
        predicted_clicks: f64,
    ) -> TrackingResult<NaiveDateTime> {
        let mut records = self.records.write().map_err(|_| TrackingError::LockPoisoned)?;
        let last = records.iter().map(|r| r.timestamp).max();
        let timestamp = next_timestamp(Local::now().naive_local(), last);
        records.push(PredictionRecord::pending(
            timestamp,
            prediction_type,
            input,
            predicted_opens,
            predicted_clicks,
        ));
        Ok(timestamp)
    }

    fn backfill(
        &self,
        timestamp: NaiveDateTime,
        actual_opens: f64,
        actual_clicks: f64,
    ) -> TrackingResult<BackfillOutcome> {
        let mut records = self.records.write().map_err(|_| TrackingError::LockPoisoned)?;
        let rows = records
            .iter_mut()
            .filter(|r| r.timestamp == timestamp)
            .map(|r| r.complete(actual_opens, actual_clicks))
            .filter(|completed| *completed)
            .count();
        Ok(BackfillOutcome::from_rows(rows))
    }

    fn recent(&self, limit: usize) -> TrackingResult<Vec<PredictionRecord>> {
        let records = self.records.read().map_err(|_| TrackingError::LockPoisoned)?;
        let mut recent: Vec<_> = records.iter().rev().cloned().collect();
        recent.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        recent.truncate(limit);
        Ok(recent)
    }

    fn completed(&self) -> TrackingResult<Vec<PredictionRecord>> {
        let records = self.records.read().map_err(|_| TrackingError::LockPoisoned)?;
        Ok(records.iter().filter(|r| r.is_completed()).cloned().collect())
    }
}
