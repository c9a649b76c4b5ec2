#![forbid(unsafe_code)]

//! Core domain model and business logic for the Overload rotation tracker.
//!
//! This crate provides:
//! - Domain types (day exercises, priority rules, growth settings, rotations)
//! - Progression engine (priority cascade and target-load optimizer)
//! - Trigger gating for progression frequency
//! - Rotation operations (complete workout, plan editing)
//! - Persistence (rotation state, workout log WAL, CSV archive, history)
//! - Ad-hoc session logging and per-exercise recommendations

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod growth;
pub mod progression;
pub mod optimizer;
pub mod schedule;
pub mod rotation;
pub mod state;
pub mod wal;
pub mod csv_rollup;
pub mod history;
pub mod session;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use growth::{total_load, weight_increase};
pub use progression::{progress, Progression, ProgressionStrategy};
pub use schedule::should_progress;
pub use rotation::{CompletionOutcome, ExerciseChange, ExerciseUpdate, Recommendation};
pub use wal::{JsonlSink, WorkoutLogSink};
pub use history::{group_sessions, load_recent_logs, SessionSummary};
pub use session::{parse_session_date, session_logs, LogEntry};
