//! Theoretical sample and query complexity bounds.
//!
//! These give reference curves against which empirical PSP runs are
//! compared:
//!
//! - **Hoeffding**: the non-adaptive baseline that samples every profile
//!   until the Hoeffding width reaches epsilon.
//! - **Asymptotic**: `v / ε² · ln(S / δ)` for a variance norm `v`.
//! - **Predicted PSP**: the complexity PSP would reach if every profile's
//!   sample variance equalled its true variance, obtained by running the
//!   schedule against [`ConfidenceBound::epsilon_for_variance`].
//!
//! Sample complexity is measured with `v_inf` (the largest variance over
//! profiles); query complexity with `v_1_inf` (the sum of variances).

use serde::{Deserialize, Serialize};

use crate::psp::bound::ConfidenceBound;
use crate::psp::config::PspConfig;
use crate::psp::schedule::Schedule;

/// Samples per profile for the Hoeffding baseline: `c² ln(2S/δ) / 2ε²`.
pub fn hoeffding_sample_bound(c: f64, epsilon: f64, delta: f64, size_of_game: usize) -> f64 {
    (2.0 * size_of_game as f64 / delta).ln() * (c * c) / (2.0 * epsilon * epsilon)
}

/// Total queries for the Hoeffding baseline (every profile sampled fully).
pub fn hoeffding_query_bound(c: f64, epsilon: f64, delta: f64, size_of_game: usize) -> f64 {
    hoeffding_sample_bound(c, epsilon, delta, size_of_game) * size_of_game as f64
}

/// Asymptotic bound `variance_norm / ε² · ln(S / δ)`.
///
/// Pass `v_inf` for sample complexity and `v_1_inf` for query complexity.
pub fn asymptotic_bound(variance_norm: f64, epsilon: f64, delta: f64, size_of_game: usize) -> f64 {
    variance_norm / (epsilon * epsilon) * (size_of_game as f64 / delta).ln()
}

/// Round at which a profile with the given variance is expected to be
/// pruned, or `None` if the schedule runs out first.
pub fn predicted_pruning_round(
    schedule: &Schedule,
    bound: &ConfidenceBound,
    variance: f64,
    target_epsilon: f64,
) -> Option<usize> {
    schedule
        .checkpoints
        .iter()
        .position(|&m| bound.epsilon_for_variance(variance, m) <= target_epsilon)
        .map(|i| i + 1)
}

/// Predicted PSP sample complexity for a game whose largest profile
/// variance is `v_inf`.
pub fn predicted_sample_complexity(
    schedule: &Schedule,
    bound: &ConfidenceBound,
    v_inf: f64,
    target_epsilon: f64,
) -> u64 {
    match predicted_pruning_round(schedule, bound, v_inf, target_epsilon) {
        Some(round) => schedule.target(round),
        None => schedule.final_target(),
    }
}

/// Predicted PSP query complexity given every profile's variance.
///
/// Each round charges its marginal samples once per profile still
/// predicted to be active during that round.
pub fn predicted_simulation_complexity(
    schedule: &Schedule,
    bound: &ConfidenceBound,
    variances: &[f64],
    target_epsilon: f64,
) -> u64 {
    let last_round: Vec<usize> = variances
        .iter()
        .map(|&v| predicted_pruning_round(schedule, bound, v, target_epsilon).unwrap_or(schedule.len()))
        .collect();

    (1..=schedule.len())
        .map(|round| {
            let active = last_round.iter().filter(|&&r| r >= round).count() as u64;
            schedule.marginal(round) * active
        })
        .sum()
}

/// Every reference bound for one game and configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplexityBounds {
    /// Hoeffding samples per profile.
    pub hoeffding_samples: f64,
    /// Hoeffding queries over all profiles.
    pub hoeffding_queries: f64,
    /// `v_inf / ε² · ln(S/δ)`.
    pub asymptotic_samples: f64,
    /// `v_1_inf / ε² · ln(S/δ)`.
    pub asymptotic_queries: f64,
    /// Predicted PSP sample complexity.
    pub predicted_samples: u64,
    /// Predicted PSP query complexity.
    pub predicted_queries: u64,
}

impl ComplexityBounds {
    /// Compute all bounds from the per-profile variances of a game.
    pub fn compute(config: &PspConfig, variances: &[f64]) -> Self {
        let size = variances.len();
        let (eps, delta, c) = (config.target_epsilon, config.target_delta, config.c);
        let schedule = Schedule::new(eps, delta, c, config.beta, size);
        let bound = ConfidenceBound::new(c, delta, schedule.len(), size);

        let v_inf = variances.iter().copied().fold(0.0, f64::max);
        let v_1_inf: f64 = variances.iter().sum();

        Self {
            hoeffding_samples: hoeffding_sample_bound(c, eps, delta, size),
            hoeffding_queries: hoeffding_query_bound(c, eps, delta, size),
            asymptotic_samples: asymptotic_bound(v_inf, eps, delta, size),
            asymptotic_queries: asymptotic_bound(v_1_inf, eps, delta, size),
            predicted_samples: predicted_sample_complexity(&schedule, &bound, v_inf, eps),
            predicted_queries: predicted_simulation_complexity(&schedule, &bound, variances, eps),
        }
    }
}
