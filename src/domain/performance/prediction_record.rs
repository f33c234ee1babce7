use crate::domain::errors::{TrackingError, TrackingResult};
use chrono::{Duration, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fixed column order of the persisted log
pub const LOG_COLUMNS: [&str; 7] = [
    "timestamp",
    "prediction_type",
    "input",
    "predicted_opens",
    "predicted_clicks",
    "actual_opens",
    "actual_clicks",
];

/// Fixed-width, lexically sortable timestamp format used on disk
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Accepts rows written with or without the microsecond fraction
const TIMESTAMP_PARSE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Which model family produced a prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionType {
    SendTime,
    SubjectLine,
}

impl PredictionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PredictionType::SendTime => "send_time",
            PredictionType::SubjectLine => "subject_line",
        }
    }
}

impl fmt::Display for PredictionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PredictionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "send_time" => Ok(PredictionType::SendTime),
            "subject_line" => Ok(PredictionType::SubjectLine),
            _ => Err(format!(
                "Invalid prediction type: {}. Must be 'send_time' or 'subject_line'",
                s
            )),
        }
    }
}

/// One row of the prediction log.
///
/// Created pending by an append; completed once both actual values are
/// backfilled together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    #[serde(with = "timestamp_format")]
    pub timestamp: NaiveDateTime,
    pub prediction_type: PredictionType,
    pub input: String,
    pub predicted_opens: f64,
    pub predicted_clicks: f64,
    pub actual_opens: Option<f64>,
    pub actual_clicks: Option<f64>,
}

impl PredictionRecord {
    pub fn pending(
        timestamp: NaiveDateTime,
        prediction_type: PredictionType,
        input: impl Into<String>,
        predicted_opens: f64,
        predicted_clicks: f64,
    ) -> Self {
        Self {
            timestamp,
            prediction_type,
            input: input.into(),
            predicted_opens,
            predicted_clicks,
            actual_opens: None,
            actual_clicks: None,
        }
    }

    /// Both actual values present. NaN cells count as missing.
    pub fn is_completed(&self) -> bool {
        matches!(
            (self.actual_opens, self.actual_clicks),
            (Some(opens), Some(clicks)) if !opens.is_nan() && !clicks.is_nan()
        )
    }

    pub fn is_pending(&self) -> bool {
        !self.is_completed()
    }

    /// Attach actual results if the record is still pending.
    ///
    /// Returns `false` when the record was already completed.
    pub fn complete(&mut self, actual_opens: f64, actual_clicks: f64) -> bool {
        if self.is_completed() {
            return false;
        }
        self.actual_opens = Some(actual_opens);
        self.actual_clicks = Some(actual_clicks);
        true
    }
}

/// Result of attaching actual values to a logged prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BackfillOutcome {
    /// Pending rows with the timestamp were completed
    Updated { rows: usize },
    /// No pending row carried the timestamp
    NoMatch,
}

impl BackfillOutcome {
    pub fn from_rows(rows: usize) -> Self {
        if rows == 0 {
            BackfillOutcome::NoMatch
        } else {
            BackfillOutcome::Updated { rows }
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, BackfillOutcome::Updated { .. })
    }
}

pub fn format_timestamp(timestamp: &NaiveDateTime) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

pub fn parse_timestamp(value: &str) -> TrackingResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), TIMESTAMP_PARSE_FORMAT).map_err(|_| {
        TrackingError::InvalidTimestamp {
            value: value.to_string(),
        }
    })
}

/// Truncate to the microsecond precision the log stores
pub fn truncate_to_micros(timestamp: NaiveDateTime) -> NaiveDateTime {
    let micros = timestamp.nanosecond() / 1_000;
    timestamp
        .with_nanosecond(micros * 1_000)
        .unwrap_or(timestamp)
}

/// Pick a timestamp strictly after `last` so appends never collide
pub fn next_timestamp(now: NaiveDateTime, last: Option<NaiveDateTime>) -> NaiveDateTime {
    let now = truncate_to_micros(now);
    match last {
        Some(last) if now <= last => last + Duration::microseconds(1),
        _ => now,
    }
}

mod timestamp_format {
    use super::{TIMESTAMP_FORMAT, TIMESTAMP_PARSE_FORMAT};
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(timestamp: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&timestamp.format(TIMESTAMP_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(raw.trim(), TIMESTAMP_PARSE_FORMAT)
            .map_err(serde::de::Error::custom)
    }
}
