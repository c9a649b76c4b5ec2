//! Trigger gating: whether a completed workout should progress exercises.

use crate::Frequency;
use chrono::{DateTime, Utc};

/// Days that must pass before a weekly progression triggers
pub const WEEK_DAYS: i64 = 7;

/// Decide whether the workout being completed triggers progression
///
/// - `Day`: always
/// - `Rotation`: only when completing the last day of the cycle
/// - `Week`: when at least seven whole days passed since the last workout
pub fn should_progress(
    last_workout_date: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    current_day_index: usize,
    total_days: usize,
    frequency: Frequency,
) -> bool {
    match frequency {
        Frequency::Day => true,
        Frequency::Rotation => total_days.checked_sub(1) == Some(current_day_index),
        Frequency::Week => match last_workout_date {
            Some(last) => {
                let whole_days = (now - last).num_days();
                tracing::debug!("{} whole days since last workout", whole_days);
                whole_days >= WEEK_DAYS
            }
            None => false,
        },
    }
}
