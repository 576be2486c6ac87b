//! Empirical-Bernstein confidence bound.
//!
//! Converts a profile's sufficient statistics into a high-probability bound
//! on how far its empirical mean payoff can be from the true mean. The
//! bound is the tighter of a Hoeffding term and an empirical-Bernstein
//! term built on an upper confidence bound of the variance:
//!
//! ```text
//! L       = ln(3 · S · T / δ)
//! v_hat   = (V − U²/m) / (m − 1)
//! v_tilde = v_hat + c²L/(m−1) + sqrt((c²L/(m−1))² + 2c²·v_hat·L/(m−1))
//! ε       = min( c·sqrt(L / 2m),  cL/3m + sqrt(2·v_tilde·L / m) )
//! ```
//!
//! For fixed parameters ε decreases in `m`, which is what makes pruning a
//! profile once ε reaches the target sound.

use crate::psp::stats::SufficientStatistics;

/// Bound parameters shared by every profile of a run.
#[derive(Debug, Clone, Copy)]
pub struct ConfidenceBound {
    c: f64,
    log_term: f64,
}

impl ConfidenceBound {
    /// Create a bound for a run of `rounds` rounds over `size_of_game`
    /// profiles with overall failure probability `delta`.
    pub fn new(c: f64, delta: f64, rounds: usize, size_of_game: usize) -> Self {
        let log_term = (3.0 * size_of_game as f64 * rounds as f64 / delta).ln();
        Self { c, log_term }
    }

    /// The union-bound log term `ln(3·S·T/δ)`.
    pub fn log_term(&self) -> f64 {
        self.log_term
    }

    /// Epsilon estimate for a profile's statistics.
    ///
    /// Returns `f64::INFINITY` while fewer than two samples exist.
    pub fn epsilon(&self, stats: &SufficientStatistics) -> f64 {
        match stats.sample_variance() {
            Some(v_hat) => self.epsilon_for_variance(v_hat, stats.samples),
            None => f64::INFINITY,
        }
    }

    /// Evaluate the bound with a given variance in place of the sample
    /// variance.
    ///
    /// With the true variance of a profile this predicts the epsilon PSP
    /// would report after `samples` samples.
    pub fn epsilon_for_variance(&self, variance: f64, samples: u64) -> f64 {
        if samples < 2 {
            return f64::INFINITY;
        }
        let m = samples as f64;
        let c2 = self.c * self.c;
        let l = self.log_term;

        let width = c2 * l / (m - 1.0);
        let v_tilde = variance + width + (width * width + 2.0 * c2 * variance * l / (m - 1.0)).sqrt();

        let hoeffding = self.c * (l / (2.0 * m)).sqrt();
        let bernstein = self.c * l / (3.0 * m) + (2.0 * v_tilde * l / m).sqrt();
        hoeffding.min(bernstein)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::psp::game::PayoffSums;

    fn stats_from(payoffs: &[f64]) -> SufficientStatistics {
        let mut sums = PayoffSums::default();
        for &p in payoffs {
            sums.push(p);
        }
        let mut stats = SufficientStatistics::default();
        stats.absorb(sums, payoffs.len() as u64);
        stats
    }

    #[test]
    fn test_guard_below_two_samples() {
        let bound = ConfidenceBound::new(2.0, 0.1, 5, 25);
        assert!(bound.epsilon(&SufficientStatistics::default()).is_infinite());
        assert!(bound.epsilon(&stats_from(&[1.0])).is_infinite());
        assert!(bound.epsilon_for_variance(0.5, 1).is_infinite());
    }

    #[test]
    fn test_matches_closed_form() {
        let (c, delta, rounds, size) = (2.0, 0.1, 4, 100);
        let bound = ConfidenceBound::new(c, delta, rounds, size);
        let stats = stats_from(&[1.0, -1.0, 0.0, 1.0, 1.0, -1.0, 0.0, 0.0, 1.0, 1.0]);

        let m = 10.0_f64;
        let (u, v) = (stats.sum, stats.sum_squares);
        let l = (3.0 * size as f64 * rounds as f64 / delta).ln();
        let v_hat = (v - u * u / m) / (m - 1.0);
        let v_tilde = v_hat
            + c * c * l / (m - 1.0)
            + ((c * c * l / (m - 1.0)).powi(2) + 2.0 * c * c * v_hat * l / (m - 1.0)).sqrt();
        let expected = (c * (l / (2.0 * m)).sqrt())
            .min(c * l / (3.0 * m) + (2.0 * v_tilde * l / m).sqrt());

        assert!((bound.epsilon(&stats) - expected).abs() < 1e-12);
        assert!((bound.log_term() - l).abs() < 1e-12);
    }

    #[test]
    fn test_decreases_with_samples() {
        let bound = ConfidenceBound::new(2.0, 0.05, 10, 100);
        for &variance in &[0.0, 0.25, 1.0] {
            let mut previous = f64::INFINITY;
            for m in [2u64, 4, 16, 64, 256, 1024, 4096, 65536] {
                let eps = bound.epsilon_for_variance(variance, m);
                assert!(eps < previous, "epsilon must shrink as m grows");
                previous = eps;
            }
        }
    }

    #[test]
    fn test_low_variance_is_tighter() {
        let bound = ConfidenceBound::new(2.0, 0.05, 10, 100);
        let m = 50_000;
        assert!(bound.epsilon_for_variance(0.0, m) < bound.epsilon_for_variance(1.0, m));
    }
}
