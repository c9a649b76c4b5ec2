//! Core domain types for the rotation tracker.
//!
//! This module defines the fundamental types used throughout the system:
//! - Day exercises (the unit the progression engine operates on)
//! - Priority rules and growth settings (per-rotation tuning)
//! - Rotations and their days
//! - Workout log records

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Exercise Types
// ============================================================================

/// One exercise inside a rotation day, with its current prescription
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DayExercise {
    pub id: Uuid,
    pub name: String,
    pub weight: f64,
    pub reps: u32,
    pub sets: u32,
    #[serde(default)]
    pub partial_reps: u32,
    #[serde(default)]
    pub completed: bool,
}

impl DayExercise {
    pub fn new(name: impl Into<String>, weight: f64, reps: u32, sets: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            weight,
            reps,
            sets,
            partial_reps: 0,
            completed: false,
        }
    }

    pub fn with_partial_reps(mut self, partial_reps: u32) -> Self {
        self.partial_reps = partial_reps;
        self
    }

    /// Total load (volume) of the current prescription
    pub fn total_load(&self) -> f64 {
        crate::growth::total_load(self.weight, self.reps, self.sets, self.partial_reps)
    }
}

/// Formats as e.g. `40 lb, 13 reps, 4 sets + 1 rep`
impl fmt::Display for DayExercise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} lb, {} reps, {} sets",
            format_weight(self.weight),
            self.reps,
            self.sets
        )?;
        if self.partial_reps > 0 {
            let suffix = if self.partial_reps > 1 { "s" } else { "" };
            write!(f, " + {} rep{}", self.partial_reps, suffix)?;
        }
        Ok(())
    }
}

/// Format a weight without a trailing `.0`, otherwise with one decimal
pub fn format_weight(weight: f64) -> String {
    if weight.fract() == 0.0 {
        format!("{:.0}", weight)
    } else {
        format!("{:.1}", weight)
    }
}

// ============================================================================
// Progression Levers
// ============================================================================

/// A parameter the progression engine can advance
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Lever {
    Rep,
    Set,
    Weight,
    Partial,
}

impl fmt::Display for Lever {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lever::Rep => write!(f, "reps"),
            Lever::Set => write!(f, "sets"),
            Lever::Weight => write!(f, "weight"),
            Lever::Partial => write!(f, "partial reps"),
        }
    }
}

// ============================================================================
// Priority Rules
// ============================================================================

/// Lever ordering and bounds, shared by every exercise in a rotation
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PriorityRules {
    pub rep_priority: u8,
    pub set_priority: u8,
    pub weight_priority: u8,
    pub rep_min: u32,
    pub rep_max: u32,
    pub set_min: u32,
    pub set_max: u32,
    pub reps_to_sets_multiplier: f64,
    pub weight_increment: f64,
    pub weight_range: f64,
    pub over_estimate_tolerance: f64,
}

impl Default for PriorityRules {
    fn default() -> Self {
        Self {
            rep_priority: 1,
            set_priority: 2,
            weight_priority: 3,
            rep_min: 8,
            rep_max: 15,
            set_min: 3,
            set_max: 5,
            reps_to_sets_multiplier: 2.0,
            weight_increment: 2.5,
            weight_range: 10.0,
            over_estimate_tolerance: 0.5,
        }
    }
}

impl PriorityRules {
    /// Rounding unit for weights; non-positive increments fall back to 1
    pub fn effective_increment(&self) -> f64 {
        if self.weight_increment > 0.0 && self.weight_increment.is_finite() {
            self.weight_increment
        } else {
            1.0
        }
    }

    /// True when either the rep or the set bounds are inverted
    pub fn bounds_inverted(&self) -> bool {
        self.rep_min > self.rep_max || self.set_min > self.set_max
    }

    /// Whether `reps` per set is allowed for `sets` sets
    pub fn ratio_allows(&self, reps: u32, sets: u32) -> bool {
        f64::from(reps) > self.reps_to_sets_multiplier * f64::from(sets)
    }

    /// Rep, set and weight levers ordered by priority, partial last.
    ///
    /// Equal priorities keep the rep, set, weight order.
    pub fn lever_order(&self) -> [Lever; 4] {
        let mut ranked = [
            (Lever::Rep, self.rep_priority),
            (Lever::Set, self.set_priority),
            (Lever::Weight, self.weight_priority),
        ];
        ranked.sort_by_key(|(_, priority)| *priority);
        [ranked[0].0, ranked[1].0, ranked[2].0, Lever::Partial]
    }

    /// Report configuration problems. The engine tolerates all of them.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if self.rep_min > self.rep_max {
            problems.push(format!(
                "rep_min {} is greater than rep_max {}",
                self.rep_min, self.rep_max
            ));
        }
        if self.set_min > self.set_max {
            problems.push(format!(
                "set_min {} is greater than set_max {}",
                self.set_min, self.set_max
            ));
        }
        if self.weight_increment <= 0.0 {
            problems.push(format!(
                "weight_increment {} must be positive (using 1)",
                self.weight_increment
            ));
        }
        if self.weight_range <= 0.0 {
            problems.push(format!(
                "weight_range {} must be positive",
                self.weight_range
            ));
        }
        if self.reps_to_sets_multiplier < 0.0 {
            problems.push(format!(
                "reps_to_sets_multiplier {} must not be negative",
                self.reps_to_sets_multiplier
            ));
        }

        let priorities = [self.rep_priority, self.set_priority, self.weight_priority];
        if priorities.iter().any(|p| !(1..=3).contains(p)) {
            problems.push("priorities must be between 1 and 3".to_string());
        }
        if priorities[0] == priorities[1]
            || priorities[0] == priorities[2]
            || priorities[1] == priorities[2]
        {
            problems.push("rep, set and weight priorities must be distinct".to_string());
        }

        problems
    }
}

// ============================================================================
// Growth Settings
// ============================================================================

/// Shape of weight growth over time
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GrowthType {
    Linear,
    Percent,
    Sigmoid,
}

impl FromStr for GrowthType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "linear" => Ok(GrowthType::Linear),
            "percent" => Ok(GrowthType::Percent),
            "sigmoid" => Ok(GrowthType::Sigmoid),
            other => Err(Error::Config(format!("Unknown growth type: {}", other))),
        }
    }
}

impl fmt::Display for GrowthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrowthType::Linear => write!(f, "linear"),
            GrowthType::Percent => write!(f, "percent"),
            GrowthType::Sigmoid => write!(f, "sigmoid"),
        }
    }
}

/// How often a completed workout triggers progression
///
/// Unrecognized stored values read as `Day` so a plan never stalls.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "String", into = "String")]
pub enum Frequency {
    Day,
    Rotation,
    Week,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Day => "day",
            Frequency::Rotation => "rotation",
            Frequency::Week => "week",
        }
    }
}

impl From<&str> for Frequency {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "day" => Frequency::Day,
            "rotation" => Frequency::Rotation,
            "week" => Frequency::Week,
            other => {
                tracing::warn!("Unknown progression frequency '{}', treating as day", other);
                Frequency::Day
            }
        }
    }
}

impl From<String> for Frequency {
    fn from(s: String) -> Self {
        Frequency::from(s.as_str())
    }
}

impl From<Frequency> for String {
    fn from(frequency: Frequency) -> Self {
        frequency.as_str().to_string()
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rate of progression for a rotation
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GrowthSettings {
    pub growth_type: GrowthType,
    pub amount: f64,
    pub frequency: Frequency,
    pub decay_rate: f64,
    pub iteration_count: u32,
}

impl Default for GrowthSettings {
    fn default() -> Self {
        Self {
            growth_type: GrowthType::Percent,
            amount: 5.0,
            frequency: Frequency::Rotation,
            decay_rate: 0.01,
            iteration_count: 0,
        }
    }
}

// ============================================================================
// Rotation Types
// ============================================================================

/// One workout template in a rotation
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RotationDay {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub exercises: Vec<DayExercise>,
}

impl RotationDay {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            exercises: Vec::new(),
        }
    }
}

/// A repeating cycle of workout days with its progression tuning
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Rotation {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub current_day_index: usize,
    #[serde(default)]
    pub last_workout_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub days: Vec<RotationDay>,
    #[serde(default)]
    pub priority_rules: PriorityRules,
    #[serde(default)]
    pub growth_settings: GrowthSettings,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Workout Log
// ============================================================================

/// A logged exercise from a completed workout
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WorkoutLog {
    pub id: Uuid,
    /// Shared by every log written for the same completed workout
    pub session_id: Uuid,
    pub performed_at: DateTime<Utc>,
    pub day_name: String,
    pub exercise_name: String,
    pub weight: f64,
    pub reps: u32,
    pub sets: u32,
    pub partial_reps: u32,
    pub completed: bool,
    pub notes: Option<String>,
}

impl WorkoutLog {
    /// Snapshot an exercise as performed in a session
    pub fn from_exercise(
        session_id: Uuid,
        performed_at: DateTime<Utc>,
        day_name: &str,
        exercise: &DayExercise,
        notes: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            session_id,
            performed_at,
            day_name: day_name.to_string(),
            exercise_name: exercise.name.clone(),
            weight: exercise.weight,
            reps: exercise.reps,
            sets: exercise.sets,
            partial_reps: exercise.partial_reps,
            completed: exercise.completed,
            notes,
        }
    }
}
