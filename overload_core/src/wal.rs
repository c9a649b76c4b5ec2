//! Write-Ahead Log (WAL) for workout logs.
//!
//! Logs are appended to a JSONL (JSON Lines) file with file locking
//! to ensure safe concurrent access.

use crate::{Result, WorkoutLog};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Sink for persisting workout logs
pub trait WorkoutLogSink {
    fn append(&mut self, log: &WorkoutLog) -> Result<()>;

    fn append_all(&mut self, logs: &[WorkoutLog]) -> Result<()> {
        for log in logs {
            self.append(log)?;
        }
        Ok(())
    }
}

/// JSONL-based workout log sink with file locking
pub struct JsonlSink {
    path: PathBuf,
}

impl JsonlSink {
    /// Create a new JSONL sink for the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Ensure the parent directory exists
    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl WorkoutLogSink for JsonlSink {
    fn append(&mut self, log: &WorkoutLog) -> Result<()> {
        self.ensure_parent_dir()?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        file.lock_exclusive()?;

        let mut writer = std::io::BufWriter::new(&file);
        let line = serde_json::to_string(log)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        drop(writer);

        file.unlock()?;

        tracing::debug!("Appended log {} ({}) to WAL", log.id, log.exercise_name);
        Ok(())
    }
}

/// Read all workout logs from a WAL file
///
/// Lines that fail to parse are skipped with a warning.
pub fn read_logs(path: &Path) -> Result<Vec<WorkoutLog>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut logs = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<WorkoutLog>(&line) {
            Ok(log) => logs.push(log),
            Err(e) => {
                tracing::warn!("Failed to parse workout log at line {}: {}", line_num + 1, e);
            }
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} workout logs from WAL", logs.len());
    Ok(logs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn create_test_log(exercise_name: &str) -> WorkoutLog {
        WorkoutLog {
            id: Uuid::new_v4(),
            session_id: Uuid::new_v4(),
            performed_at: Utc::now(),
            day_name: "Push".into(),
            exercise_name: exercise_name.into(),
            weight: 135.0,
            reps: 10,
            sets: 3,
            partial_reps: 1,
            completed: true,
            notes: None,
        }
    }

    #[test]
    fn test_append_and_read_single_log() {
        let temp_dir = tempfile::tempdir().unwrap();
        let wal_path = temp_dir.path().join("test.wal");

        let log = create_test_log("Bench");
        let log_id = log.id;

        let mut sink = JsonlSink::new(&wal_path);
        sink.append(&log).unwrap();

        let logs = read_logs(&wal_path).unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].id, log_id);
        assert_eq!(logs[0].partial_reps, 1);
    }

    #[test]
    fn test_append_all() {
        let temp_dir = tempfile::tempdir().unwrap();
        let wal_path = temp_dir.path().join("test.wal");

        let logs: Vec<_> = ["Bench", "Dips", "Flyes"]
            .iter()
            .map(|name| create_test_log(name))
            .collect();

        let mut sink = JsonlSink::new(&wal_path);
        sink.append_all(&logs).unwrap();

        let read = read_logs(&wal_path).unwrap();
        assert_eq!(read.len(), 3);
        assert_eq!(read[2].exercise_name, "Flyes");
    }

    #[test]
    fn test_corrupt_lines_skipped() {
        let temp_dir = tempfile::tempdir().unwrap();
        let wal_path = temp_dir.path().join("test.wal");

        let mut sink = JsonlSink::new(&wal_path);
        sink.append(&create_test_log("Bench")).unwrap();
        {
            let mut file = OpenOptions::new().append(true).open(&wal_path).unwrap();
            writeln!(file, "{{ not json").unwrap();
        }
        sink.append(&create_test_log("Dips")).unwrap();

        let logs = read_logs(&wal_path).unwrap();
        assert_eq!(logs.len(), 2);
    }

    #[test]
    fn test_read_empty_wal() {
        let temp_dir = tempfile::tempdir().unwrap();
        let wal_path = temp_dir.path().join("nonexistent.wal");

        let logs = read_logs(&wal_path).unwrap();
        assert!(logs.is_empty());
    }
}
