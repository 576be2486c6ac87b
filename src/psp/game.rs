//! Sampled game trait definition for the PSP solver.
//!
//! Any game whose strategy profiles can be evaluated against shared random
//! draws can be estimated with PSP. This keeps the sampling algorithm
//! independent of the game that produces payoffs.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Dense identifier of a strategy profile inside a game.
///
/// Profile ids run from `0` to `num_profiles() - 1` and index the solver's
/// statistics table directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProfileId(pub u32);

impl ProfileId {
    /// Position of this profile in a profile-indexed table.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Aggregated payoffs of one profile over a batch of draws.
///
/// Sums are not averaged so that callers can keep running statistics
/// across rounds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PayoffSums {
    /// Sum of payoffs.
    pub sum: f64,
    /// Sum of squared payoffs.
    pub sum_squares: f64,
}

impl PayoffSums {
    /// Record a single payoff.
    #[inline]
    pub fn push(&mut self, payoff: f64) {
        self.sum += payoff;
        self.sum_squares += payoff * payoff;
    }
}

/// The interface between the PSP solver and a simulation-based game.
///
/// # Example
/// ```ignore
/// struct CoinFlips;
///
/// impl SampledGame for CoinFlips {
///     type Draws = Vec<bool>;
///     type Error = std::convert::Infallible;
///
///     fn num_profiles(&self) -> usize { 2 }
///     fn draw_randomness<R: rand::Rng>(&self, rng: &mut R, m: usize) -> Vec<bool> {
///         (0..m).map(|_| rng.gen()).collect()
///     }
///     fn simulate(&self, id: ProfileId, draws: &Vec<bool>) -> Result<PayoffSums, Self::Error> {
///         // ...
///     }
/// }
/// ```
pub trait SampledGame: Sync {
    /// A batch of random draws shared by every active profile in a round.
    type Draws: Sync;

    /// Error raised when a profile cannot be simulated.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Number of strategy profiles (the size of the game).
    fn num_profiles(&self) -> usize;

    /// Draw `m` independent samples of the game's randomness.
    ///
    /// Called exactly once per round; the result is shared by all
    /// profiles evaluated in that round.
    fn draw_randomness<R: rand::Rng>(&self, rng: &mut R, m: usize) -> Self::Draws;

    /// Evaluate one profile against every draw of a batch.
    fn simulate(&self, id: ProfileId, draws: &Self::Draws) -> Result<PayoffSums, Self::Error>;

    /// Get a human-readable name for a profile.
    ///
    /// Used for reports and logging.
    fn profile_name(&self, id: ProfileId) -> String {
        id.to_string()
    }
}
