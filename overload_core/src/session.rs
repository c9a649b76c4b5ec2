//! Building workout log records for a session.
//!
//! Sessions come from completing a rotation day or from logging an ad-hoc
//! workout with entries such as `Curl=30x12x3+2`.

use crate::{DayExercise, Error, Result, WorkoutLog};
use chrono::{DateTime, NaiveDate, Utc};
use std::str::FromStr;
use uuid::Uuid;

/// One exercise of an ad-hoc session: `NAME=WEIGHTxREPSxSETS[+PARTIAL]`
#[derive(Clone, Debug, PartialEq)]
pub struct LogEntry {
    pub name: String,
    pub weight: f64,
    pub reps: u32,
    pub sets: u32,
    pub partial_reps: u32,
}

impl FromStr for LogEntry {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = |reason: &str| {
            Error::Config(format!(
                "Invalid log entry '{}': {} (expected NAME=WEIGHTxREPSxSETS[+PARTIAL])",
                s, reason
            ))
        };

        let (name, prescription) = s.rsplit_once('=').ok_or_else(|| invalid("missing '='"))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(invalid("empty exercise name"));
        }

        let (main, partial) = match prescription.split_once('+') {
            Some((main, partial)) => (main, Some(partial)),
            None => (prescription, None),
        };

        let mut parts = main.split(['x', 'X']).map(str::trim);
        let (Some(weight), Some(reps), Some(sets), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid("need weight, reps and sets"));
        };

        let weight: f64 = weight.parse().map_err(|_| invalid("bad weight"))?;
        if !weight.is_finite() || weight < 0.0 {
            return Err(invalid("weight must be a non-negative number"));
        }
        let reps = reps.parse().map_err(|_| invalid("bad reps"))?;
        let sets = sets.parse().map_err(|_| invalid("bad sets"))?;
        let partial_reps = match partial {
            Some(p) => p.trim().parse().map_err(|_| invalid("bad partial reps"))?,
            None => 0,
        };

        Ok(LogEntry {
            name: name.to_string(),
            weight,
            reps,
            sets,
            partial_reps,
        })
    }
}

impl From<LogEntry> for DayExercise {
    fn from(entry: LogEntry) -> Self {
        DayExercise {
            completed: true,
            ..DayExercise::new(entry.name, entry.weight, entry.reps, entry.sets)
                .with_partial_reps(entry.partial_reps)
        }
    }
}

/// Parse a `YYYY-MM-DD` session date as midnight UTC
pub fn parse_session_date(s: &str) -> Result<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| Error::Config(format!("Invalid date '{}': {}", s, e)))?;
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
        .ok_or_else(|| Error::Config(format!("Invalid date '{}'", s)))
}

/// One log per exercise, all sharing a fresh session id
pub fn session_logs(
    performed_at: DateTime<Utc>,
    day_name: &str,
    exercises: &[DayExercise],
    notes: Option<String>,
) -> Vec<WorkoutLog> {
    let session_id = Uuid::new_v4();
    tracing::debug!(
        "Building {} logs for session {} ({})",
        exercises.len(),
        session_id,
        day_name
    );
    exercises
        .iter()
        .map(|exercise| {
            WorkoutLog::from_exercise(session_id, performed_at, day_name, exercise, notes.clone())
        })
        .collect()
}
