//! Workout history loading.
//!
//! This module loads recent workout logs from both the WAL and the CSV
//! archive and groups them back into sessions.

use crate::csv_rollup::CsvRow;
use crate::growth::total_load;
use crate::{Error, Result, WorkoutLog};
use chrono::{DateTime, Duration, Utc};
use csv::ReaderBuilder;
use std::collections::HashSet;
use std::path::Path;
use uuid::Uuid;

impl TryFrom<CsvRow> for WorkoutLog {
    type Error = Error;

    fn try_from(row: CsvRow) -> Result<Self> {
        let id = Uuid::parse_str(&row.id)
            .map_err(|e| Error::Other(format!("Invalid UUID: {}", e)))?;
        let session_id = Uuid::parse_str(&row.session_id)
            .map_err(|e| Error::Other(format!("Invalid session UUID: {}", e)))?;
        let performed_at = DateTime::parse_from_rfc3339(&row.performed_at)
            .map_err(|e| Error::Other(format!("Invalid date: {}", e)))?
            .with_timezone(&Utc);

        Ok(WorkoutLog {
            id,
            session_id,
            performed_at,
            day_name: row.day_name,
            exercise_name: row.exercise_name,
            weight: row.weight,
            reps: row.reps,
            sets: row.sets,
            partial_reps: row.partial_reps,
            completed: row.completed,
            notes: row.notes,
        })
    }
}

/// Logs of one completed workout
#[derive(Clone, Debug)]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub performed_at: DateTime<Utc>,
    pub day_name: String,
    pub logs: Vec<WorkoutLog>,
}

impl SessionSummary {
    /// Combined total load of every logged exercise
    pub fn total_load(&self) -> f64 {
        self.logs
            .iter()
            .map(|l| total_load(l.weight, l.reps, l.sets, l.partial_reps))
            .sum()
    }
}

/// Load logs from the last N days from both WAL and CSV
///
/// Returns logs sorted by performed_at (newest first).
/// Logs that appear in both WAL and CSV are deduplicated by id.
pub fn load_recent_logs(wal_path: &Path, csv_path: &Path, days: i64) -> Result<Vec<WorkoutLog>> {
    let cutoff = Duration::try_days(days)
        .and_then(|window| Utc::now().checked_sub_signed(window))
        .ok_or_else(|| Error::Other(format!("history window of {} days is out of range", days)))?;
    let mut logs = Vec::new();
    let mut seen_ids = HashSet::new();

    if wal_path.exists() {
        for log in crate::wal::read_logs(wal_path)? {
            if log.performed_at >= cutoff && seen_ids.insert(log.id) {
                logs.push(log);
            }
        }
        tracing::debug!("Loaded {} logs from WAL", logs.len());
    }

    if csv_path.exists() {
        let mut csv_count = 0;
        for log in load_logs_from_csv(csv_path)? {
            if log.performed_at >= cutoff && seen_ids.insert(log.id) {
                logs.push(log);
                csv_count += 1;
            }
        }
        tracing::debug!("Loaded {} logs from CSV", csv_count);
    }

    logs.sort_by(|a, b| b.performed_at.cmp(&a.performed_at));

    tracing::info!("Loaded {} workout logs from last {} days", logs.len(), days);

    Ok(logs)
}

/// Load all logs from a CSV archive, skipping malformed rows
fn load_logs_from_csv(path: &Path) -> Result<Vec<WorkoutLog>> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut logs = Vec::new();

    for (row_num, result) in reader.deserialize::<CsvRow>().enumerate() {
        match result.map_err(Error::from).and_then(WorkoutLog::try_from) {
            Ok(log) => logs.push(log),
            Err(e) => {
                tracing::warn!("Skipping CSV row {}: {}", row_num + 1, e);
            }
        }
    }

    Ok(logs)
}

/// Group logs (newest first) into sessions, preserving that order
pub fn group_sessions(logs: &[WorkoutLog]) -> Vec<SessionSummary> {
    let mut sessions: Vec<SessionSummary> = Vec::new();

    for log in logs {
        match sessions.iter_mut().find(|s| s.session_id == log.session_id) {
            Some(session) => session.logs.push(log.clone()),
            None => sessions.push(SessionSummary {
                session_id: log.session_id,
                performed_at: log.performed_at,
                day_name: log.day_name.clone(),
                logs: vec![log.clone()],
            }),
        }
    }

    sessions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wal::{JsonlSink, WorkoutLogSink};

    fn create_test_log(exercise_name: &str, session_id: Uuid, days_ago: i64) -> WorkoutLog {
        WorkoutLog {
            id: Uuid::new_v4(),
            session_id,
            performed_at: Utc::now() - Duration::days(days_ago),
            day_name: "Pull".into(),
            exercise_name: exercise_name.into(),
            weight: 40.0,
            reps: 10,
            sets: 3,
            partial_reps: 2,
            completed: true,
            notes: None,
        }
    }

    #[test]
    fn test_load_recent_logs_from_wal() {
        let temp_dir = tempfile::tempdir().unwrap();
        let wal_path = temp_dir.path().join("workout_logs.wal");
        let csv_path = temp_dir.path().join("workout_logs.csv");

        let mut sink = JsonlSink::new(&wal_path);
        sink.append(&create_test_log("Row", Uuid::new_v4(), 1)).unwrap();
        sink.append(&create_test_log("Curl", Uuid::new_v4(), 3)).unwrap();
        sink.append(&create_test_log("Old", Uuid::new_v4(), 10)).unwrap();

        let logs = load_recent_logs(&wal_path, &csv_path, 7).unwrap();
        assert_eq!(logs.len(), 2);
    }

    #[test]
    fn test_csv_logs_read_back() {
        let temp_dir = tempfile::tempdir().unwrap();
        let wal_path = temp_dir.path().join("workout_logs.wal");
        let csv_path = temp_dir.path().join("workout_logs.csv");

        let log = create_test_log("Row", Uuid::new_v4(), 1);
        let mut sink = JsonlSink::new(&wal_path);
        sink.append(&log).unwrap();
        crate::csv_rollup::wal_to_csv_and_archive(&wal_path, &csv_path).unwrap();

        let logs = load_recent_logs(&wal_path, &csv_path, 7).unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].id, log.id);
        assert_eq!(logs[0].session_id, log.session_id);
        assert_eq!(logs[0].partial_reps, 2);
        assert_eq!(logs[0].notes, None);
    }

    #[test]
    fn test_deduplication_across_wal_and_csv() {
        let temp_dir = tempfile::tempdir().unwrap();
        let wal_path = temp_dir.path().join("workout_logs.wal");
        let csv_path = temp_dir.path().join("workout_logs.csv");

        let log = create_test_log("Row", Uuid::new_v4(), 1);
        let mut sink = JsonlSink::new(&wal_path);
        sink.append(&log).unwrap();
        crate::csv_rollup::wal_to_csv_and_archive(&wal_path, &csv_path).unwrap();

        // Same log written to the WAL again
        let mut sink = JsonlSink::new(&wal_path);
        sink.append(&log).unwrap();

        let logs = load_recent_logs(&wal_path, &csv_path, 7).unwrap();
        assert_eq!(logs.iter().filter(|l| l.id == log.id).count(), 1);
    }

    #[test]
    fn test_logs_sorted_newest_first() {
        let temp_dir = tempfile::tempdir().unwrap();
        let wal_path = temp_dir.path().join("workout_logs.wal");
        let csv_path = temp_dir.path().join("workout_logs.csv");

        let mut sink = JsonlSink::new(&wal_path);
        sink.append(&create_test_log("old", Uuid::new_v4(), 5)).unwrap();
        sink.append(&create_test_log("new", Uuid::new_v4(), 1)).unwrap();

        let logs = load_recent_logs(&wal_path, &csv_path, 7).unwrap();
        assert_eq!(logs[0].exercise_name, "new");
        assert_eq!(logs[1].exercise_name, "old");
    }

    #[test]
    fn test_out_of_range_window_is_an_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let wal_path = temp_dir.path().join("workout_logs.wal");
        let csv_path = temp_dir.path().join("workout_logs.csv");

        let result = load_recent_logs(&wal_path, &csv_path, i64::MAX);
        assert!(matches!(result, Err(Error::Other(_))));
    }

    #[test]
    fn test_group_sessions() {
        let recent = Uuid::new_v4();
        let older = Uuid::new_v4();
        let logs = vec![
            create_test_log("Row", recent, 1),
            create_test_log("Curl", recent, 1),
            create_test_log("Pulldown", older, 4),
        ];

        let sessions = group_sessions(&logs);
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].session_id, recent);
        assert_eq!(sessions[0].logs.len(), 2);
        // 2 * (40 * 10 * 3 + 40 * 2)
        assert_eq!(sessions[0].total_load(), 2560.0);
        assert_eq!(sessions[1].logs[0].exercise_name, "Pulldown");
    }
}
