//! Closest-target-load progression search.
//!
//! Enumerates every legal (reps, sets, weight, partial reps) combination
//! within the rotation's bounds and picks the one whose total load lands
//! closest to a growth target. The enumeration is bounded: at most
//! `MAX_REP_VALUES` rep counts, `MAX_SET_VALUES` set counts,
//! `2 * MAX_WEIGHT_STEPS + 1` weights and `MAX_PARTIAL_REPS + 1` partial
//! counts.

use crate::growth::{round_weight, total_load, weight_increase};
use crate::{DayExercise, GrowthSettings, GrowthType, PriorityRules};
use std::cmp::Ordering;
use std::ops::RangeInclusive;

/// Upper bound on partial reps considered per candidate
pub const MAX_PARTIAL_REPS: u32 = 20;

/// Upper bound on weight increments tried on each side of the current weight
pub const MAX_WEIGHT_STEPS: u32 = 20;

/// Rep counts tried, starting at `rep_min`
pub const MAX_REP_VALUES: u32 = 50;

/// Set counts tried, starting at `set_min`
pub const MAX_SET_VALUES: u32 = 20;

#[derive(Clone, Copy, Debug)]
struct Candidate {
    reps: u32,
    sets: u32,
    weight: f64,
    partial_reps: u32,
    load: f64,
    distance: f64,
}

/// Total load the next prescription should reach
///
/// Linear growth adds `amount` per performed rep; percent and sigmoid growth
/// scale the current load by the weight growth fraction.
pub fn target_load(exercise: &DayExercise, growth: &GrowthSettings) -> f64 {
    let current = exercise.total_load();
    match growth.growth_type {
        GrowthType::Linear => {
            let total_reps = f64::from(exercise.reps) * f64::from(exercise.sets)
                + f64::from(exercise.partial_reps);
            current + growth.amount * total_reps
        }
        GrowthType::Percent | GrowthType::Sigmoid => {
            let fraction = if exercise.weight > 0.0 {
                weight_increase(exercise.weight, growth) / exercise.weight
            } else {
                0.0
            };
            current * (1.0 + fraction)
        }
    }
}

/// `min..=max`, cut to at most `count` values
fn bounded_range(min: u32, max: u32, count: u32) -> RangeInclusive<u32> {
    min..=max.min(min.saturating_add(count - 1))
}

/// Weights reachable within `weight_range`, rounded and deduplicated
fn candidate_weights(current: f64, rules: &PriorityRules) -> Vec<f64> {
    let increment = rules.effective_increment();
    let steps = if rules.weight_range.is_finite() && rules.weight_range > 0.0 {
        ((rules.weight_range / increment).floor() as u32).min(MAX_WEIGHT_STEPS)
    } else {
        0
    };

    let mut weights: Vec<f64> = Vec::new();
    let steps = i64::from(steps);
    for k in -steps..=steps {
        let weight = round_weight(current + k as f64 * increment, increment);
        if weight > 0.0 && !weights.iter().any(|w| (w - weight).abs() < 1e-9) {
            weights.push(weight);
        }
    }
    weights
}

/// Closest distance first, then fewer partials, smaller weight change,
/// fewer reps, fewer sets
fn compare(a: &Candidate, b: &Candidate, current_weight: f64) -> Ordering {
    a.distance
        .total_cmp(&b.distance)
        .then(a.partial_reps.cmp(&b.partial_reps))
        .then(
            (a.weight - current_weight)
                .abs()
                .total_cmp(&(b.weight - current_weight).abs()),
        )
        .then(a.reps.cmp(&b.reps))
        .then(a.sets.cmp(&b.sets))
}

fn keep_best(slot: &mut Option<Candidate>, candidate: Candidate, current_weight: f64) {
    let replace = match slot {
        Some(best) => compare(&candidate, best, current_weight) == Ordering::Less,
        None => true,
    };
    if replace {
        *slot = Some(candidate);
    }
}

/// Pick the legal combination whose load is closest to the growth target
///
/// Candidates that meet the target without overshooting it by more than
/// `over_estimate_tolerance` are preferred; when none do, the closest legal
/// combination on either side wins. Returns the exercise unchanged when no
/// combination satisfies the rep/set ratio.
pub fn optimize(
    exercise: &DayExercise,
    rules: &PriorityRules,
    growth: &GrowthSettings,
) -> DayExercise {
    let target = target_load(exercise, growth);
    let ceiling = target * (1.0 + rules.over_estimate_tolerance.max(0.0));
    let weights = candidate_weights(exercise.weight, rules);

    let mut within_tolerance: Option<Candidate> = None;
    let mut closest: Option<Candidate> = None;
    let mut evaluated = 0usize;

    for reps in bounded_range(rules.rep_min, rules.rep_max, MAX_REP_VALUES) {
        for sets in bounded_range(rules.set_min, rules.set_max, MAX_SET_VALUES) {
            if !rules.ratio_allows(reps, sets) {
                continue;
            }
            for &weight in &weights {
                for partial_reps in 0..=MAX_PARTIAL_REPS {
                    let load = total_load(weight, reps, sets, partial_reps);
                    let candidate = Candidate {
                        reps,
                        sets,
                        weight,
                        partial_reps,
                        load,
                        distance: (load - target).abs(),
                    };
                    evaluated += 1;

                    if load >= target && load <= ceiling {
                        keep_best(&mut within_tolerance, candidate, exercise.weight);
                    }
                    keep_best(&mut closest, candidate, exercise.weight);
                }
            }
        }
    }

    tracing::debug!(
        "Optimizer evaluated {} combinations for '{}' (target load {:.1})",
        evaluated,
        exercise.name,
        target
    );

    match within_tolerance.or(closest) {
        Some(best) => DayExercise {
            weight: best.weight,
            reps: best.reps,
            sets: best.sets,
            partial_reps: best.partial_reps,
            ..exercise.clone()
        },
        None => {
            tracing::warn!(
                "No legal combination for '{}', keeping current prescription",
                exercise.name
            );
            exercise.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Frequency;

    fn linear(amount: f64) -> GrowthSettings {
        GrowthSettings {
            growth_type: GrowthType::Linear,
            amount,
            frequency: Frequency::Day,
            decay_rate: 0.0,
            iteration_count: 0,
        }
    }

    /// Reps pinned to 10 and no weight movement
    fn fixed_rules(set_max: u32) -> PriorityRules {
        PriorityRules {
            rep_min: 10,
            rep_max: 10,
            set_min: 3,
            set_max,
            reps_to_sets_multiplier: 2.0,
            weight_range: 0.0,
            ..PriorityRules::default()
        }
    }

    fn exercise() -> DayExercise {
        DayExercise::new("Row", 100.0, 10, 3)
    }

    #[test]
    fn test_target_load_linear() {
        // 3000 + 5 * 30 reps
        assert_eq!(target_load(&exercise(), &linear(5.0)), 3150.0);
    }

    #[test]
    fn test_target_load_percent() {
        let growth = GrowthSettings {
            growth_type: GrowthType::Percent,
            amount: 12.5,
            ..linear(0.0)
        };
        assert_eq!(target_load(&exercise(), &growth), 3375.0);
    }

    #[test]
    fn test_candidate_weights_bounded_and_rounded() {
        let rules = PriorityRules::default();
        let weights = candidate_weights(100.0, &rules);
        assert_eq!(weights.len(), 9);
        assert!(weights.contains(&90.0));
        assert!(weights.contains(&110.0));

        let wide = PriorityRules {
            weight_range: 1000.0,
            ..PriorityRules::default()
        };
        let weights = candidate_weights(100.0, &wide);
        assert!(weights.len() <= (2 * MAX_WEIGHT_STEPS + 1) as usize);
        assert!(weights.iter().all(|w| *w > 0.0));
    }

    #[test]
    fn test_exact_target_match() {
        let result = optimize(&exercise(), &PriorityRules::default(), &linear(5.0));

        assert_eq!(result.weight, 105.0);
        assert_eq!(result.reps, 10);
        assert_eq!(result.sets, 3);
        assert_eq!(result.partial_reps, 0);
        assert_eq!(result.total_load(), 3150.0);
    }

    #[test]
    fn test_partials_fill_gap_above_target() {
        // Target 3030: one partial rep reaches 3100
        let result = optimize(&exercise(), &fixed_rules(3), &linear(1.0));

        assert_eq!(result.weight, 100.0);
        assert_eq!(result.sets, 3);
        assert_eq!(result.partial_reps, 1);
    }

    #[test]
    fn test_zero_tolerance_allows_closest_undershoot() {
        let rules = PriorityRules {
            over_estimate_tolerance: 0.0,
            ..fixed_rules(3)
        };
        // Nothing lands exactly on 3030, 3000 is closer than 3100
        let result = optimize(&exercise(), &rules, &linear(1.0));

        assert_eq!(result.partial_reps, 0);
        assert_eq!(result.total_load(), 3000.0);
    }

    #[test]
    fn test_equal_load_prefers_full_sets() {
        // Target 4200: 3 sets + 12 partials and 4 sets + 2 partials tie
        let result = optimize(&exercise(), &fixed_rules(4), &linear(40.0));

        assert_eq!(result.sets, 4);
        assert_eq!(result.partial_reps, 2);
        assert_eq!(result.total_load(), 4200.0);
    }

    #[test]
    fn test_results_respect_constraints() {
        let rules = PriorityRules::default();
        let start = DayExercise::new("Press", 62.5, 9, 4).with_partial_reps(2);
        let result = optimize(&start, &rules, &linear(2.0));

        assert!(rules.ratio_allows(result.reps, result.sets));
        assert!((rules.rep_min..=rules.rep_max).contains(&result.reps));
        assert!((rules.set_min..=rules.set_max).contains(&result.sets));
        assert!(result.partial_reps <= MAX_PARTIAL_REPS);
        assert!((result.weight - start.weight).abs() <= rules.weight_range);
        assert_eq!(result.id, start.id);
    }

    #[test]
    fn test_no_legal_combination_returns_unchanged() {
        let rules = PriorityRules {
            reps_to_sets_multiplier: 10.0,
            ..PriorityRules::default()
        };
        let start = exercise();
        let result = optimize(&start, &rules, &linear(5.0));

        assert_eq!(result, start);
    }

    #[test]
    fn test_huge_rep_and_set_ranges_are_capped() {
        let rules = PriorityRules {
            rep_max: 1_000_000,
            set_max: 1_000_000,
            ..PriorityRules::default()
        };
        let result = optimize(&exercise(), &rules, &linear(5.0));

        assert!(result.reps < rules.rep_min + MAX_REP_VALUES);
        assert!(result.sets < rules.set_min + MAX_SET_VALUES);
        assert!(rules.ratio_allows(result.reps, result.sets));
    }

    #[test]
    fn test_bounded_range() {
        assert_eq!(bounded_range(8, 15, 50), 8..=15);
        assert_eq!(bounded_range(8, 1_000, 50), 8..=57);
        assert_eq!(bounded_range(u32::MAX - 1, u32::MAX, 50), (u32::MAX - 1)..=u32::MAX);
        assert!(bounded_range(15, 8, 50).is_empty());
    }

    #[test]
    fn test_target_load_with_huge_counts() {
        let start = DayExercise::new("Row", 1.0, u32::MAX, u32::MAX).with_partial_reps(u32::MAX);
        let target = target_load(&start, &linear(1.0));

        assert!(target.is_finite());
        assert!(target > start.total_load());
    }
}
