use super::prediction_record::PredictionRecord;
use serde::Serialize;

/// Display format for the history chart, second precision
pub const HISTORY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Columnar view of recent predictions for dashboards, newest first
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PredictionHistory {
    pub timestamps: Vec<String>,
    pub predicted_opens: Vec<f64>,
    pub predicted_clicks: Vec<f64>,
}

impl PredictionHistory {
    pub fn from_records(records: &[PredictionRecord]) -> Self {
        let mut history = Self::default();
        for record in records {
            history
                .timestamps
                .push(record.timestamp.format(HISTORY_TIMESTAMP_FORMAT).to_string());
            history.predicted_opens.push(record.predicted_opens);
            history.predicted_clicks.push(record.predicted_clicks);
        }
        history
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::performance::prediction_record::PredictionType;
    use chrono::NaiveDate;

    #[test]
    fn test_history_keeps_order_and_drops_micros() {
        let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let records = vec![
            PredictionRecord::pending(
                day.and_hms_micro_opt(10, 0, 1, 250).unwrap(),
                PredictionType::SubjectLine,
                "Last chance",
                300.0,
                30.0,
            ),
            PredictionRecord::pending(
                day.and_hms_micro_opt(9, 30, 0, 0).unwrap(),
                PredictionType::SendTime,
                "hour: 9, day: 2",
                120.0,
                12.0,
            ),
        ];

        let history = PredictionHistory::from_records(&records);

        assert_eq!(history.len(), 2);
        assert_eq!(history.timestamps, vec!["2024-05-01 10:00:01", "2024-05-01 09:30:00"]);
        assert_eq!(history.predicted_opens, vec![300.0, 120.0]);
        assert_eq!(history.predicted_clicks, vec![30.0, 12.0]);
    }
}
