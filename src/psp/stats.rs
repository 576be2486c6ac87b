//! Per-profile running statistics for the PSP solver.
//!
//! The solver keeps one [`ProfileSlot`] per strategy profile in a table
//! indexed by [`ProfileId`]. Each slot owns its own statistics, so a round
//! can update every active slot in parallel without locking.

use serde::{Deserialize, Serialize};

use crate::psp::game::{PayoffSums, ProfileId};

/// Sufficient statistics of a profile's payoff samples.
///
/// `m` only grows while the profile is active and is never touched after
/// the profile is pruned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SufficientStatistics {
    /// Cumulative sum of payoffs (U).
    pub sum: f64,
    /// Cumulative sum of squared payoffs (V).
    pub sum_squares: f64,
    /// Cumulative number of samples (m).
    pub samples: u64,
}

impl SufficientStatistics {
    /// Fold a batch of payoffs into the running sums and set the sample
    /// count to the round's cumulative target.
    pub fn absorb(&mut self, sums: PayoffSums, cumulative_samples: u64) {
        debug_assert!(cumulative_samples >= self.samples);
        self.sum += sums.sum;
        self.sum_squares += sums.sum_squares;
        self.samples = cumulative_samples;
    }

    /// Empirical mean payoff, or `None` without samples.
    pub fn mean(&self) -> Option<f64> {
        if self.samples == 0 {
            None
        } else {
            Some(self.sum / self.samples as f64)
        }
    }

    /// Unbiased sample variance, or `None` with fewer than two samples.
    ///
    /// Clamped at zero: `V - U²/m` can come out slightly negative in
    /// floating point when every payoff is identical.
    pub fn sample_variance(&self) -> Option<f64> {
        if self.samples < 2 {
            return None;
        }
        let m = self.samples as f64;
        Some(((self.sum_squares - self.sum * self.sum / m) / (m - 1.0)).max(0.0))
    }
}

/// Whether a profile is still being sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProfileStatus {
    /// Still in the active set.
    Active,
    /// Removed from the active set at the given round (1-based).
    Pruned {
        /// Round at which the epsilon estimate reached the target.
        round: usize,
    },
}

/// One row of the solver's profile table.
#[derive(Debug, Clone)]
pub struct ProfileSlot {
    /// Running statistics.
    pub stats: SufficientStatistics,
    /// Latest epsilon estimate; `INFINITY` until two samples exist.
    pub epsilon: f64,
    /// Active or pruned.
    pub status: ProfileStatus,
}

impl Default for ProfileSlot {
    fn default() -> Self {
        Self {
            stats: SufficientStatistics::default(),
            epsilon: f64::INFINITY,
            status: ProfileStatus::Active,
        }
    }
}

impl ProfileSlot {
    /// Whether the slot still receives samples.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.status == ProfileStatus::Active
    }
}

/// Final per-profile result of a PSP run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileReport {
    /// Profile identifier.
    pub id: ProfileId,
    /// Human-readable profile name.
    pub name: String,
    /// Statistics, frozen at pruning time for pruned profiles.
    pub stats: SufficientStatistics,
    /// Final epsilon estimate (may be infinite if never sampled twice).
    #[serde(with = "unbounded")]
    pub epsilon: f64,
    /// Round of pruning, or `None` if still active at the end.
    pub pruned_at: Option<usize>,
}

impl ProfileReport {
    /// Empirical mean payoff for player 1.
    pub fn mean(&self) -> Option<f64> {
        self.stats.mean()
    }
}

/// Serde adapter for epsilons that may be infinite.
///
/// JSON has no infinity, so a non-finite value is written as `null` and
/// `null` reads back as `f64::INFINITY`.
pub mod unbounded {
    use serde::{Deserialize, Deserializer, Serializer};

    /// Write a finite value as a number, anything else as `null`.
    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else {
            serializer.serialize_none()
        }
    }

    /// Read a number, or `null` as infinity.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sums(payoffs: &[f64]) -> PayoffSums {
        let mut sums = PayoffSums::default();
        for &p in payoffs {
            sums.push(p);
        }
        sums
    }

    #[test]
    fn test_absorb_accumulates() {
        let mut stats = SufficientStatistics::default();
        stats.absorb(sums(&[1.0, -1.0, 1.0]), 3);
        stats.absorb(sums(&[0.0, 1.0]), 5);

        assert_eq!(stats.sum, 2.0);
        assert_eq!(stats.sum_squares, 4.0);
        assert_eq!(stats.samples, 5);
        assert_eq!(stats.mean(), Some(0.4));
    }

    #[test]
    fn test_sample_variance() {
        let mut stats = SufficientStatistics::default();
        assert_eq!(stats.sample_variance(), None);

        stats.absorb(sums(&[1.0]), 1);
        assert_eq!(stats.sample_variance(), None);

        stats.absorb(sums(&[-1.0]), 2);
        // Samples {1, -1}: mean 0, unbiased variance 2.
        assert!((stats.sample_variance().unwrap() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_constant_payoffs_have_zero_variance() {
        let mut stats = SufficientStatistics::default();
        stats.absorb(sums(&vec![1.0; 1000]), 1000);
        assert_eq!(stats.sample_variance(), Some(0.0));
    }

    #[test]
    fn test_slot_starts_active_and_unbounded() {
        let slot = ProfileSlot::default();
        assert!(slot.is_active());
        assert!(slot.epsilon.is_infinite());
    }

    #[test]
    fn test_unbounded_epsilon_survives_json() {
        let report = |epsilon: f64| ProfileReport {
            id: ProfileId(3),
            name: "p".to_string(),
            stats: SufficientStatistics::default(),
            epsilon,
            pruned_at: None,
        };

        let json = serde_json::to_string(&report(f64::INFINITY)).unwrap();
        assert!(json.contains("\"epsilon\":null"));
        let back: ProfileReport = serde_json::from_str(&json).unwrap();
        assert!(back.epsilon.is_infinite());

        let json = serde_json::to_string(&report(0.25)).unwrap();
        let back: ProfileReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.epsilon, 0.25);
    }
}
