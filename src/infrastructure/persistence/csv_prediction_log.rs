//! CSV-backed prediction log.
//!
//! The file keeps a header row and the fixed column order of
//! [`LOG_COLUMNS`]. Every mutation rewrites the whole table into a uniquely
//! named temp file in the same directory and renames it over the original,
//! so a crash never leaves a truncated log behind.
//!
//! Writers are serialized across processes by an advisory lock on the
//! sidecar `<log>.lock` file (exclusive for writers, shared for readers).
//! An in-process `RwLock` sits in front of it for callers sharing one
//! instance.

use crate::domain::errors::{TrackingError, TrackingResult};
use crate::domain::performance::prediction_record::{
    BackfillOutcome, LOG_COLUMNS, PredictionRecord, PredictionType, format_timestamp,
    next_timestamp,
};
use crate::domain::repositories::PredictionLogRepository;
use chrono::{Local, NaiveDateTime};
use fs4::fs_std::FileExt;
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy)]
enum LockMode {
    Shared,
    Exclusive,
}

/// Held advisory lock on the sidecar file, released on drop
struct LogFileLock {
    file: File,
}

impl Drop for LogFileLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            warn!("Failed to release prediction log lock: {}", e);
        }
    }
}

pub struct CsvPredictionLog {
    file_path: PathBuf,
    lock_path: PathBuf,
    staging_dir: PathBuf,
    lock: RwLock<()>,
}

impl CsvPredictionLog {
    /// Open the log at `path`, creating an empty one if none exists.
    ///
    /// An existing file is never truncated; its header is checked and a
    /// mismatch is reported as corruption.
    pub fn initialize(path: impl AsRef<Path>) -> TrackingResult<Self> {
        let file_path = path.as_ref().to_path_buf();
        let staging_dir = match file_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let mut lock_name = file_path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_else(|| OsString::from("prediction_log"));
        lock_name.push(".lock");

        let log = Self {
            lock_path: file_path.with_file_name(lock_name),
            file_path,
            staging_dir,
            lock: RwLock::new(()),
        };

        if !log.staging_dir.exists() {
            fs::create_dir_all(&log.staging_dir).map_err(|e| log.io_error(e))?;
        }

        // Held across create-or-validate; readers never see a headerless log
        let _file_lock = log.lock_file(LockMode::Exclusive)?;

        if log.file_path.exists() {
            log.read_records()?;
            info!("Using existing prediction log at {:?}", log.file_path);
            return Ok(log);
        }

        log.write_records(&[])?;
        info!("Created prediction log at {:?}", log.file_path);
        Ok(log)
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    #[cfg(test)]
    fn with_staging_dir(mut self, staging_dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = staging_dir.into();
        self
    }

    fn lock_file(&self, mode: LockMode) -> TrackingResult<LogFileLock> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.lock_path)
            .map_err(|e| self.io_error(e))?;

        match mode {
            LockMode::Shared => FileExt::lock_shared(&file),
            LockMode::Exclusive => FileExt::lock_exclusive(&file),
        }
        .map_err(|e| self.io_error(e))?;

        Ok(LogFileLock { file })
    }

    fn read_records(&self) -> TrackingResult<Vec<PredictionRecord>> {
        let file = File::open(&self.file_path).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                TrackingError::StoreNotFound {
                    path: self.file_path.clone(),
                }
            } else {
                self.io_error(e)
            }
        })?;

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(file);

        let headers = reader
            .headers()
            .map_err(|e| self.csv_read_error(e))?
            .clone();
        if headers.len() != LOG_COLUMNS.len()
            || headers.iter().zip(LOG_COLUMNS.iter()).any(|(a, b)| a.trim() != *b)
        {
            return Err(self.corrupt(format!(
                "unexpected header [{}]",
                headers.iter().collect::<Vec<_>>().join(",")
            )));
        }

        let mut records = Vec::new();
        for row in reader.deserialize::<PredictionRecord>() {
            records.push(row.map_err(|e| self.csv_read_error(e))?);
        }
        Ok(records)
    }

    /// Replace the whole log with `records` via temp file and rename.
    ///
    /// The temp file is removed when it is dropped on any error path.
    fn write_records(&self, records: &[PredictionRecord]) -> TrackingResult<()> {
        let mut temp = tempfile::Builder::new()
            .prefix(".prediction_log.")
            .suffix(".tmp")
            .tempfile_in(&self.staging_dir)
            .map_err(|e| self.io_error(e))?;

        let result = (|| -> Result<(), csv::Error> {
            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(temp.as_file_mut());
            writer.write_record(LOG_COLUMNS)?;
            for record in records {
                writer.serialize(record)?;
            }
            writer.flush()?;
            Ok(())
        })();

        if let Err(e) = result {
            return Err(match e.into_kind() {
                csv::ErrorKind::Io(io_err) => self.io_error(io_err),
                other => self.corrupt(format!("failed to serialize record: {:?}", other)),
            });
        }

        temp.as_file().sync_all().map_err(|e| self.io_error(e))?;
        temp.persist(&self.file_path).map_err(|e| self.io_error(e.error))?;
        Ok(())
    }

    fn io_error(&self, source: io::Error) -> TrackingError {
        TrackingError::Io {
            path: self.file_path.clone(),
            source,
        }
    }

    fn corrupt(&self, reason: impl Into<String>) -> TrackingError {
        TrackingError::StoreCorrupt {
            path: self.file_path.clone(),
            reason: reason.into(),
        }
    }

    fn csv_read_error(&self, error: csv::Error) -> TrackingError {
        match error.into_kind() {
            csv::ErrorKind::Io(e) => self.io_error(e),
            other => self.corrupt(format!("{:?}", other)),
        }
    }
}

impl PredictionLogRepository for CsvPredictionLog {
    fn append(
        &self,
        prediction_type: PredictionType,
        input: &str,
        predicted_opens: f64,
        predicted_clicks: f64,
    ) -> TrackingResult<NaiveDateTime> {
        let _guard = self.lock.write().map_err(|_| TrackingError::LockPoisoned)?;
        let _file_lock = self.lock_file(LockMode::Exclusive)?;

        let mut records = self.read_records()?;
        let last = records.iter().map(|r| r.timestamp).max();
        let timestamp = next_timestamp(Local::now().naive_local(), last);

        records.push(PredictionRecord::pending(
            timestamp,
            prediction_type,
            input,
            predicted_opens,
            predicted_clicks,
        ));
        self.write_records(&records)?;

        debug!(
            "Logged {} prediction at {} (opens={:.2}, clicks={:.2})",
            prediction_type,
            format_timestamp(&timestamp),
            predicted_opens,
            predicted_clicks
        );
        Ok(timestamp)
    }

    fn backfill(
        &self,
        timestamp: NaiveDateTime,
        actual_opens: f64,
        actual_clicks: f64,
    ) -> TrackingResult<BackfillOutcome> {
        let _guard = self.lock.write().map_err(|_| TrackingError::LockPoisoned)?;
        let _file_lock = self.lock_file(LockMode::Exclusive)?;

        let mut records = self.read_records()?;
        let rows = records
            .iter_mut()
            .filter(|r| r.timestamp == timestamp)
            .filter(|r| r.is_pending())
            .map(|r| r.complete(actual_opens, actual_clicks))
            .filter(|completed| *completed)
            .count();

        if rows == 0 {
            debug!(
                "Backfill for {} matched no pending prediction",
                format_timestamp(&timestamp)
            );
            return Ok(BackfillOutcome::NoMatch);
        }

        if rows > 1 {
            warn!(
                "Backfill for {} completed {} rows sharing the timestamp",
                format_timestamp(&timestamp),
                rows
            );
        }

        self.write_records(&records)?;
        Ok(BackfillOutcome::Updated { rows })
    }

    fn recent(&self, limit: usize) -> TrackingResult<Vec<PredictionRecord>> {
        let _guard = self.lock.read().map_err(|_| TrackingError::LockPoisoned)?;
        let _file_lock = self.lock_file(LockMode::Shared)?;

        let mut records = self.read_records()?;
        // Later rows win ties, so reverse before the stable sort
        records.reverse();
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        records.truncate(limit);
        Ok(records)
    }

    fn completed(&self) -> TrackingResult<Vec<PredictionRecord>> {
        let _guard = self.lock.read().map_err(|_| TrackingError::LockPoisoned)?;
        let _file_lock = self.lock_file(LockMode::Shared)?;

        Ok(self
            .read_records()?
            .into_iter()
            .filter(PredictionRecord::is_completed)
            .collect())
    }
}
