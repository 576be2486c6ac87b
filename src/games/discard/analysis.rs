//! Exact payoff statistics of a discard game.
//!
//! Every k-card combination of the deck is equally likely, so the true
//! mean and variance of each profile follow from one pass over all
//! combinations. Used to compare PSP estimates and theoretical bounds
//! against ground truth on small games.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::oracle::DiscardPoker;
use super::scorer::ScoreError;
use crate::psp::{PayoffSums, ProfileId, SampledGame};

/// True mean and variance of one profile's payoff.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfileMoments {
    /// Expected payoff to player 1.
    pub mean: f64,
    /// Population variance of the payoff.
    pub variance: f64,
}

impl ProfileMoments {
    /// Moments of `n` equally weighted payoffs.
    pub fn from_sums(sums: PayoffSums, n: usize) -> Self {
        let n = n.max(1) as f64;
        let mean = sums.sum / n;
        let variance = (sums.sum_squares / n - mean * mean).max(0.0);
        Self { mean, variance }
    }
}

/// Exact statistics of every profile of a game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameStats {
    /// Moments indexed by profile id.
    pub profiles: Vec<ProfileMoments>,
    /// Number of draws enumerated.
    pub draws: usize,
}

impl GameStats {
    /// Enumerate every draw and compute each profile's moments.
    pub fn exact(poker: &DiscardPoker) -> Result<Self, ScoreError> {
        let draws = poker.game().all_draws();
        let profiles = (0..poker.num_profiles() as u32)
            .into_par_iter()
            .map(|id| {
                poker
                    .simulate(ProfileId(id), &draws)
                    .map(|sums| ProfileMoments::from_sums(sums, draws.len()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        log::debug!(
            "exact stats over {} draws: v_inf {:.4}, v_1_inf {:.4}",
            draws.len(),
            profiles.iter().map(|p| p.variance).fold(0.0, f64::max),
            profiles.iter().map(|p| p.variance).sum::<f64>()
        );

        Ok(Self {
            profiles,
            draws: draws.len(),
        })
    }

    /// Per-profile variances in id order.
    pub fn variances(&self) -> Vec<f64> {
        self.profiles.iter().map(|p| p.variance).collect()
    }

    /// Largest variance over profiles.
    pub fn v_inf(&self) -> f64 {
        self.profiles.iter().map(|p| p.variance).fold(0.0, f64::max)
    }

    /// Sum of variances over profiles.
    pub fn v_1_inf(&self) -> f64 {
        self.profiles.iter().map(|p| p.variance).sum()
    }
}
