//! Load and weight-growth formulas shared by both progression strategies.

use crate::{GrowthSettings, GrowthType};

/// Total load (volume): `weight × reps × sets + weight × partial_reps`
pub fn total_load(weight: f64, reps: u32, sets: u32, partial_reps: u32) -> f64 {
    let main = weight * f64::from(reps) * f64::from(sets);
    let partial = weight * f64::from(partial_reps);
    main + partial
}

/// Percentage growth for sigmoid settings after decay, floored at zero
///
/// `max(0, amount - decay_rate × iteration_count)`
pub fn effective_percent(settings: &GrowthSettings) -> f64 {
    (settings.amount - settings.decay_rate * f64::from(settings.iteration_count)).max(0.0)
}

/// Weight delta for one progression step
///
/// - linear: the fixed `amount`
/// - percent: `amount` percent of the current weight
/// - sigmoid: the decayed percentage of the current weight
pub fn weight_increase(current_weight: f64, settings: &GrowthSettings) -> f64 {
    match settings.growth_type {
        GrowthType::Linear => settings.amount,
        GrowthType::Percent => current_weight * (settings.amount / 100.0),
        GrowthType::Sigmoid => current_weight * (effective_percent(settings) / 100.0),
    }
}

/// Round to the nearest multiple of `increment` (e.g. 2.5 lb plates)
///
/// Callers pass an increment already sanitized by
/// [`crate::PriorityRules::effective_increment`].
pub fn round_weight(weight: f64, increment: f64) -> f64 {
    (weight / increment).round() * increment
}
