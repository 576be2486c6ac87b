//! Geometric sampling schedule.
//!
//! PSP samples in rounds. Round `t` brings every active profile up to a
//! cumulative sample count of `m_t = ceil(alpha · beta^t)`, where
//!
//! ```text
//! T     = ceil(log_beta(3c / (4ε)))
//! alpha = (2c / 3ε) · ln(3·T·S / δ)
//! ```
//!
//! After `T` rounds the Hoeffding term alone guarantees the target epsilon,
//! so the schedule never needs to grow further.

use serde::{Deserialize, Serialize};

/// Number of rounds needed to reach `target_epsilon`.
///
/// Never less than one: when `3c / 4ε <= 1` the logarithm is not positive
/// and a single round already reaches the target.
pub fn schedule_length(target_epsilon: f64, c: f64, beta: f64) -> usize {
    let rounds = ((3.0 * c) / (4.0 * target_epsilon)).ln() / beta.ln();
    (rounds.ceil() as i64).max(1) as usize
}

/// Cumulative sample targets for every round of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    /// Scale of the schedule.
    pub alpha: f64,
    /// Growth base.
    pub beta: f64,
    /// Cumulative sample target of round `t` at index `t - 1`.
    pub checkpoints: Vec<u64>,
}

impl Schedule {
    /// Build the schedule for a game of `size_of_game` profiles.
    pub fn new(target_epsilon: f64, target_delta: f64, c: f64, beta: f64, size_of_game: usize) -> Self {
        let rounds = schedule_length(target_epsilon, c, beta);
        let alpha = ((2.0 * c) / (3.0 * target_epsilon))
            * ((3.0 * rounds as f64 * size_of_game as f64) / target_delta).ln();

        let checkpoints = (1..=rounds)
            .map(|t| (alpha * beta.powi(t as i32)).ceil() as u64)
            .collect();

        Self {
            alpha,
            beta,
            checkpoints,
        }
    }

    /// Number of rounds `T`.
    pub fn len(&self) -> usize {
        self.checkpoints.len()
    }

    /// Whether the schedule has no rounds.
    pub fn is_empty(&self) -> bool {
        self.checkpoints.is_empty()
    }

    /// Cumulative target of a 1-based round.
    pub fn target(&self, round: usize) -> u64 {
        self.checkpoints[round - 1]
    }

    /// Samples to draw in a 1-based round on top of the previous round.
    pub fn marginal(&self, round: usize) -> u64 {
        let previous = if round > 1 { self.target(round - 1) } else { 0 };
        self.target(round) - previous
    }

    /// Cumulative target of the last round.
    pub fn final_target(&self) -> u64 {
        self.checkpoints.last().copied().unwrap_or(0)
    }
}
