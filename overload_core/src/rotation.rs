//! Rotation operations: completing workouts and editing the plan.
//!
//! Completing a workout is the only place progression is applied:
//! 1. Gate on the rotation's progression frequency
//! 2. Advance every exercise of the current day (or just reset them)
//! 3. Bump the sigmoid iteration counter once per progression event
//! 4. Move to the next day and stamp the workout date

use crate::growth::{round_weight, weight_increase};
use crate::progression::{progress, Progression, ProgressionStrategy};
use crate::schedule::should_progress;
use crate::{
    DayExercise, Error, GrowthSettings, GrowthType, Lever, PriorityRules, Result, Rotation,
    RotationDay,
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// One exercise's prescription before and after progression
#[derive(Clone, Debug, PartialEq)]
pub struct ExerciseChange {
    pub before: DayExercise,
    pub after: DayExercise,
    pub lever: Option<Lever>,
}

/// Result of completing the current day's workout
#[derive(Clone, Debug)]
pub struct CompletionOutcome {
    pub progressed: bool,
    pub completed_day_index: usize,
    pub next_day_index: usize,
    /// The day as it was performed, before any progression
    pub performed: RotationDay,
    pub changes: Vec<ExerciseChange>,
}

/// What one exercise would get at its next progression
#[derive(Clone, Debug, PartialEq)]
pub struct Recommendation {
    pub current: DayExercise,
    pub next: Progression,
    /// Current weight plus one growth step, rounded to the plate increment
    pub next_weight: f64,
    /// Whether completing this day now would trigger progression
    pub due: bool,
}

/// Optional field updates for an exercise
#[derive(Clone, Debug, Default)]
pub struct ExerciseUpdate {
    pub name: Option<String>,
    pub weight: Option<f64>,
    pub reps: Option<u32>,
    pub sets: Option<u32>,
    pub partial_reps: Option<u32>,
}

impl RotationDay {
    /// Find an exercise by case-insensitive name
    pub fn find_exercise(&self, name: &str) -> Option<usize> {
        self.exercises
            .iter()
            .position(|e| e.name.eq_ignore_ascii_case(name))
    }
}

impl Rotation {
    /// Create an empty rotation starting at the first day
    pub fn new(name: impl Into<String>, rules: PriorityRules, growth: GrowthSettings) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            current_day_index: 0,
            last_workout_date: None,
            days: Vec::new(),
            priority_rules: rules,
            growth_settings: growth,
            created_at: Utc::now(),
        }
    }

    /// Index of the current day, falling back to the first day when the
    /// stored index is out of range
    pub fn current_index(&self) -> usize {
        if self.current_day_index < self.days.len() {
            self.current_day_index
        } else {
            0
        }
    }

    pub fn current_day(&self) -> Option<&RotationDay> {
        self.days.get(self.current_index())
    }

    fn day_mut(&mut self, index: usize) -> Result<&mut RotationDay> {
        let count = self.days.len();
        self.days
            .get_mut(index)
            .ok_or_else(|| Error::NotFound(format!("day {} (rotation has {})", index + 1, count)))
    }

    fn exercise_mut(&mut self, day: usize, exercise: usize) -> Result<&mut DayExercise> {
        let day = self.day_mut(day)?;
        let count = day.exercises.len();
        let name = day.name.clone();
        day.exercises.get_mut(exercise).ok_or_else(|| {
            Error::NotFound(format!(
                "exercise {} in '{}' (day has {})",
                exercise + 1,
                name,
                count
            ))
        })
    }

    /// Recommendation for a single exercise of any day
    pub fn recommend(
        &self,
        day: usize,
        exercise: usize,
        strategy: ProgressionStrategy,
        now: DateTime<Utc>,
    ) -> Result<Recommendation> {
        let current = self
            .days
            .get(day)
            .and_then(|d| d.exercises.get(exercise))
            .ok_or_else(|| {
                Error::NotFound(format!("exercise {} of day {}", exercise + 1, day + 1))
            })?
            .clone();

        let next = progress(&current, &self.priority_rules, &self.growth_settings, strategy);
        let next_weight = round_weight(
            current.weight + weight_increase(current.weight, &self.growth_settings),
            self.priority_rules.effective_increment(),
        );
        let due = should_progress(
            self.last_workout_date,
            now,
            day,
            self.days.len(),
            self.growth_settings.frequency,
        );

        Ok(Recommendation {
            current,
            next,
            next_weight,
            due,
        })
    }

    /// Prescriptions the current day would receive if progression fired now
    pub fn preview(&self, strategy: ProgressionStrategy) -> Vec<ExerciseChange> {
        let Some(day) = self.current_day() else {
            return Vec::new();
        };

        day.exercises
            .iter()
            .map(|exercise| {
                let next = progress(
                    exercise,
                    &self.priority_rules,
                    &self.growth_settings,
                    strategy,
                );
                ExerciseChange {
                    before: exercise.clone(),
                    after: DayExercise {
                        completed: false,
                        ..next.exercise
                    },
                    lever: next.lever,
                }
            })
            .collect()
    }

    /// Complete the current day's workout and move to the next day
    pub fn complete_workout(
        &mut self,
        strategy: ProgressionStrategy,
        now: DateTime<Utc>,
    ) -> Result<CompletionOutcome> {
        if self.days.is_empty() {
            return Err(Error::Rotation(format!(
                "rotation '{}' has no days to complete",
                self.name
            )));
        }

        if self.current_day_index >= self.days.len() {
            tracing::warn!(
                "Current day index {} out of range for {} days, using first day",
                self.current_day_index,
                self.days.len()
            );
            self.current_day_index = 0;
        }

        let index = self.current_day_index;
        let total_days = self.days.len();
        let performed = self.days[index].clone();

        let progressed = should_progress(
            self.last_workout_date,
            now,
            index,
            total_days,
            self.growth_settings.frequency,
        );

        let changes = if progressed {
            let changes = self.preview(strategy);
            let day = &mut self.days[index];
            for (exercise, change) in day.exercises.iter_mut().zip(&changes) {
                *exercise = change.after.clone();
            }

            // Rotation-level counter: once per event, not once per exercise
            if self.growth_settings.growth_type == GrowthType::Sigmoid {
                self.growth_settings.iteration_count += 1;
                tracing::debug!(
                    "Sigmoid iteration count now {}",
                    self.growth_settings.iteration_count
                );
            }
            changes
        } else {
            for exercise in &mut self.days[index].exercises {
                exercise.completed = false;
            }
            Vec::new()
        };

        let next_day_index = (index + 1) % total_days;
        self.current_day_index = next_day_index;
        self.last_workout_date = Some(now);

        tracing::info!(
            "Completed '{}' (day {} of {}), progressed: {}, next day {}",
            performed.name,
            index + 1,
            total_days,
            progressed,
            next_day_index + 1
        );

        Ok(CompletionOutcome {
            progressed,
            completed_day_index: index,
            next_day_index,
            performed,
            changes,
        })
    }

    /// Manually choose which day is next
    pub fn select_day(&mut self, index: usize) -> Result<()> {
        if index >= self.days.len() {
            return Err(Error::NotFound(format!(
                "day {} (rotation has {})",
                index + 1,
                self.days.len()
            )));
        }
        self.current_day_index = index;
        tracing::info!("Selected day {} of '{}'", index + 1, self.name);
        Ok(())
    }

    /// Flip an exercise's completed flag, returning the new value
    pub fn toggle_exercise(&mut self, day: usize, exercise: usize) -> Result<bool> {
        let exercise = self.exercise_mut(day, exercise)?;
        exercise.completed = !exercise.completed;
        Ok(exercise.completed)
    }

    /// Append a day, returning its index
    pub fn add_day(&mut self, name: impl Into<String>) -> usize {
        self.days.push(RotationDay::new(name));
        self.days.len() - 1
    }

    /// Remove a day, keeping the current day pointing at the same workout
    /// where possible
    pub fn remove_day(&mut self, index: usize) -> Result<RotationDay> {
        if index >= self.days.len() {
            return Err(Error::NotFound(format!(
                "day {} (rotation has {})",
                index + 1,
                self.days.len()
            )));
        }

        let removed = self.days.remove(index);
        if index < self.current_day_index {
            self.current_day_index -= 1;
        } else if self.current_day_index >= self.days.len() {
            self.current_day_index = 0;
        }

        tracing::info!("Removed day '{}'", removed.name);
        Ok(removed)
    }

    /// Append an exercise to a day, returning its index
    pub fn add_exercise(&mut self, day: usize, exercise: DayExercise) -> Result<usize> {
        let day = self.day_mut(day)?;
        tracing::info!("Added '{}' to '{}': {}", exercise.name, day.name, exercise);
        day.exercises.push(exercise);
        Ok(day.exercises.len() - 1)
    }

    pub fn update_exercise(
        &mut self,
        day: usize,
        exercise: usize,
        update: ExerciseUpdate,
    ) -> Result<&DayExercise> {
        let exercise = self.exercise_mut(day, exercise)?;
        if let Some(name) = update.name {
            exercise.name = name;
        }
        if let Some(weight) = update.weight {
            exercise.weight = weight;
        }
        if let Some(reps) = update.reps {
            exercise.reps = reps;
        }
        if let Some(sets) = update.sets {
            exercise.sets = sets;
        }
        if let Some(partial_reps) = update.partial_reps {
            exercise.partial_reps = partial_reps;
        }
        Ok(exercise)
    }

    pub fn remove_exercise(&mut self, day: usize, exercise: usize) -> Result<DayExercise> {
        self.exercise_mut(day, exercise)?;
        Ok(self.days[day].exercises.remove(exercise))
    }

    pub fn set_priority_rules(&mut self, rules: PriorityRules) {
        for problem in rules.validate() {
            tracing::warn!("Priority rules: {}", problem);
        }
        self.priority_rules = rules;
    }

    /// Replace growth settings; the sigmoid iteration counter carries over
    /// unless `reset_iterations` is set
    pub fn set_growth_settings(&mut self, settings: GrowthSettings, reset_iterations: bool) {
        let iteration_count = if reset_iterations {
            0
        } else {
            self.growth_settings.iteration_count
        };
        self.growth_settings = GrowthSettings {
            iteration_count,
            ..settings
        };
    }
}
