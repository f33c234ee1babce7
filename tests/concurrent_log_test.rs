use mailpulse::domain::performance::prediction_record::{BackfillOutcome, PredictionType};
use mailpulse::domain::repositories::PredictionLogRepository;
use mailpulse::infrastructure::persistence::CsvPredictionLog;
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

fn create_test_dir(name: &str) -> PathBuf {
    let temp_dir = std::env::temp_dir().join(format!(
        "mailpulse_concurrency_{}_{}_{}",
        name,
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0)
    ));
    fs::create_dir_all(&temp_dir).expect("Failed to create test temp dir");
    temp_dir
}

#[test]
fn test_concurrent_appends_are_not_lost() {
    let dir = create_test_dir("append");
    let log = Arc::new(CsvPredictionLog::initialize(dir.join("prediction_log.csv")).unwrap());

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let log = log.clone();
            thread::spawn(move || {
                (0..10)
                    .map(|i| {
                        log.append(
                            PredictionType::SendTime,
                            &format!("worker {} request {}", worker, i),
                            i as f64,
                            worker as f64,
                        )
                        .unwrap()
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let timestamps: Vec<_> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();

    let unique: HashSet<_> = timestamps.iter().collect();
    assert_eq!(timestamps.len(), 80);
    assert_eq!(unique.len(), 80);
    assert_eq!(log.recent(1000).unwrap().len(), 80);

    fs::remove_dir_all(dir).ok();
}

#[test]
fn test_concurrent_backfills_complete_once() {
    let dir = create_test_dir("backfill");
    let log = Arc::new(CsvPredictionLog::initialize(dir.join("prediction_log.csv")).unwrap());
    let ts = log
        .append(PredictionType::SubjectLine, "Limited offer", 100.0, 10.0)
        .unwrap();

    let handles: Vec<_> = (0..6)
        .map(|i| {
            let log = log.clone();
            thread::spawn(move || log.backfill(ts, 90.0 + i as f64, 9.0).unwrap())
        })
        .collect();

    let outcomes: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let updated = outcomes
        .iter()
        .filter(|o| **o == BackfillOutcome::Updated { rows: 1 })
        .count();
    assert_eq!(updated, 1);
    assert_eq!(
        outcomes.iter().filter(|o| **o == BackfillOutcome::NoMatch).count(),
        5
    );
    assert_eq!(log.completed().unwrap().len(), 1);

    fs::remove_dir_all(dir).ok();
}

#[test]
fn test_readers_see_consistent_log_during_writes() {
    let dir = create_test_dir("readers");
    let log = Arc::new(CsvPredictionLog::initialize(dir.join("prediction_log.csv")).unwrap());

    let writer = {
        let log = log.clone();
        thread::spawn(move || {
            for i in 0..30 {
                let ts = log
                    .append(PredictionType::SendTime, "hour: 12, day: 6", i as f64, 1.0)
                    .unwrap();
                log.backfill(ts, i as f64 + 1.0, 1.0).unwrap();
            }
        })
    };

    let readers: Vec<_> = (0..3)
        .map(|_| {
            let log = log.clone();
            thread::spawn(move || {
                for _ in 0..30 {
                    let recent = log.recent(1000).unwrap();
                    let completed = log.completed().unwrap();
                    assert!(completed.len() <= 30);
                    assert!(recent.len() <= 30);
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }
    assert_eq!(log.completed().unwrap().len(), 30);

    fs::remove_dir_all(dir).ok();
}
