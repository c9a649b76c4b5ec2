//! Progression engine for advancing a day exercise.
//!
//! The default strategy is a priority cascade:
//! - Levers (reps, sets, weight) are tried in configured priority order
//! - Partial reps are always tried last and are always eligible
//! - The first eligible lever wins and nothing else changes
//!
//! The closest-target-load search in [`crate::optimizer`] is a separate,
//! explicitly selected strategy.

use crate::growth::{round_weight, weight_increase};
use crate::{DayExercise, Error, GrowthSettings, Lever, PriorityRules, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which algorithm computes the next prescription
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProgressionStrategy {
    /// Greedy priority cascade, one lever per step
    #[default]
    Cascade,
    /// Closest match to a target total load
    Optimize,
}

impl FromStr for ProgressionStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "cascade" => Ok(ProgressionStrategy::Cascade),
            "optimize" | "optimizer" => Ok(ProgressionStrategy::Optimize),
            other => Err(Error::Config(format!(
                "Unknown progression strategy: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for ProgressionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgressionStrategy::Cascade => write!(f, "cascade"),
            ProgressionStrategy::Optimize => write!(f, "optimize"),
        }
    }
}

/// The next prescription and the lever that produced it
#[derive(Clone, Debug, PartialEq)]
pub struct Progression {
    pub exercise: DayExercise,
    /// `None` when the optimizer moved several parameters at once
    pub lever: Option<Lever>,
}

/// Compute the next prescription with the given strategy
pub fn progress(
    exercise: &DayExercise,
    rules: &PriorityRules,
    growth: &GrowthSettings,
    strategy: ProgressionStrategy,
) -> Progression {
    match strategy {
        ProgressionStrategy::Cascade => cascade(exercise, rules, growth),
        ProgressionStrategy::Optimize => Progression {
            exercise: crate::optimizer::optimize(exercise, rules, growth),
            lever: None,
        },
    }
}

/// Advance the first eligible lever in priority order
///
/// Inverted rep or set bounds leave only the partial-rep lever eligible.
pub fn cascade(
    exercise: &DayExercise,
    rules: &PriorityRules,
    growth: &GrowthSettings,
) -> Progression {
    let only_partial = rules.bounds_inverted();
    if only_partial {
        tracing::warn!(
            "Inverted rep/set bounds for '{}', only partial reps can progress",
            exercise.name
        );
    }

    for lever in rules.lever_order() {
        let next = match lever {
            Lever::Partial => Some(advance_partial(exercise)),
            _ if only_partial => None,
            Lever::Rep => advance_reps(exercise, rules),
            Lever::Set => advance_sets(exercise, rules),
            Lever::Weight => advance_weight(exercise, rules, growth),
        };

        if let Some(next) = next {
            tracing::debug!("Progressed '{}' via {}: {}", exercise.name, lever, next);
            return Progression {
                exercise: next,
                lever: Some(lever),
            };
        }
    }

    // lever_order always ends with the partial lever
    Progression {
        exercise: advance_partial(exercise),
        lever: Some(Lever::Partial),
    }
}

fn advance_reps(exercise: &DayExercise, rules: &PriorityRules) -> Option<DayExercise> {
    let reps = exercise.reps.checked_add(1)?;
    if reps > rules.rep_max || !rules.ratio_allows(reps, exercise.sets) {
        return None;
    }

    Some(DayExercise {
        reps,
        ..exercise.clone()
    })
}

/// A new set count restarts reps at the minimum
fn advance_sets(exercise: &DayExercise, rules: &PriorityRules) -> Option<DayExercise> {
    let sets = exercise.sets.checked_add(1)?;
    if sets > rules.set_max || !rules.ratio_allows(exercise.reps, sets) {
        return None;
    }

    Some(DayExercise {
        sets,
        reps: rules.rep_min,
        ..exercise.clone()
    })
}

/// A new load restarts the rep/set ladder and clears partials.
///
/// Eligible whenever the step stays within `weight_range`, including
/// deloads and steps that round back to the current weight.
fn advance_weight(
    exercise: &DayExercise,
    rules: &PriorityRules,
    growth: &GrowthSettings,
) -> Option<DayExercise> {
    let delta = weight_increase(exercise.weight, growth);
    if !delta.is_finite() || delta.abs() > rules.weight_range {
        return None;
    }

    let weight = round_weight(exercise.weight + delta, rules.effective_increment());

    Some(DayExercise {
        weight,
        reps: rules.rep_min,
        sets: rules.set_min,
        partial_reps: 0,
        ..exercise.clone()
    })
}

/// Saturates at `u32::MAX`
fn advance_partial(exercise: &DayExercise) -> DayExercise {
    DayExercise {
        partial_reps: exercise.partial_reps.saturating_add(1),
        ..exercise.clone()
    }
}
