//! Configuration options for the PSP solver.
//!
//! This module provides the parameters that control a PSP run: target
//! accuracy and confidence, the exploration constant of the confidence
//! bound, the growth base of the sampling schedule, and execution options.

use serde::{Deserialize, Serialize};

/// Configuration for the PSP solver.
///
/// # Example
/// ```
/// use psp_sampler::psp::PspConfig;
///
/// let config = PspConfig::new(0.1, 0.1).with_seed(7);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.beta, 2.0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PspConfig {
    /// Target approximation error. A profile is pruned once its epsilon
    /// estimate is at most this value.
    pub target_epsilon: f64,

    /// Failure probability shared by all profiles and rounds, in (0, 1).
    pub target_delta: f64,

    /// Exploration constant of the confidence bound (payoff range).
    ///
    /// Payoffs of the discard game lie in [-1, 1], so the default is 2.0.
    #[serde(default = "default_c")]
    pub c: f64,

    /// Growth base of the sampling schedule. Must be greater than 1.
    #[serde(default = "default_beta")]
    pub beta: f64,

    /// Number of threads used to evaluate active profiles.
    ///
    /// `None` uses the global rayon pool, `Some(0)` or `Some(1)` runs
    /// sequentially, and `Some(n)` builds a dedicated pool of `n` threads.
    #[serde(default)]
    pub num_threads: Option<usize>,

    /// Random seed for reproducibility.
    ///
    /// If `None`, the solver seeds itself from entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_c() -> f64 {
    2.0
}

fn default_beta() -> f64 {
    2.0
}

impl Default for PspConfig {
    fn default() -> Self {
        Self {
            target_epsilon: 0.1,
            target_delta: 0.1,
            c: default_c(),
            beta: default_beta(),
            num_threads: None,
            seed: None,
        }
    }
}

impl PspConfig {
    /// Create a configuration with the given targets and default constants.
    pub fn new(target_epsilon: f64, target_delta: f64) -> Self {
        Self {
            target_epsilon,
            target_delta,
            ..Default::default()
        }
    }

    /// Builder method: set the exploration constant.
    pub fn with_c(mut self, c: f64) -> Self {
        self.c = c;
        self
    }

    /// Builder method: set the schedule growth base.
    pub fn with_beta(mut self, beta: f64) -> Self {
        self.beta = beta;
        self
    }

    /// Builder method: set number of threads.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.num_threads = Some(threads);
        self
    }

    /// Builder method: set random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validate the configuration and return any errors.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.target_epsilon.is_finite() && self.target_epsilon > 0.0) {
            return Err(ConfigError::InvalidEpsilon(self.target_epsilon));
        }

        if !(self.target_delta > 0.0 && self.target_delta < 1.0) {
            return Err(ConfigError::InvalidDelta(self.target_delta));
        }

        if !(self.c.is_finite() && self.c > 0.0) {
            return Err(ConfigError::InvalidExplorationConstant(self.c));
        }

        if !(self.beta.is_finite() && self.beta > 1.0) {
            return Err(ConfigError::InvalidBeta(self.beta));
        }

        Ok(())
    }

    /// Whether per-profile evaluation should fan out across threads.
    pub fn is_parallel(&self) -> bool {
        !matches!(self.num_threads, Some(0) | Some(1))
    }
}

/// Errors that can occur when validating or loading configuration.
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// Target epsilon is not a positive finite number.
    InvalidEpsilon(f64),
    /// Target delta is outside (0, 1).
    InvalidDelta(f64),
    /// Exploration constant is not a positive finite number.
    InvalidExplorationConstant(f64),
    /// Schedule growth base is not greater than 1.
    InvalidBeta(f64),
    /// Field-level problem in an experiment configuration.
    InvalidField(&'static str, String),
    /// Failed to read a configuration file.
    IoError(String),
    /// Failed to parse a configuration file.
    ParseError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidEpsilon(val) => {
                write!(f, "Target epsilon {} must be a positive number", val)
            }
            ConfigError::InvalidDelta(val) => {
                write!(f, "Target delta {} is out of range (0, 1)", val)
            }
            ConfigError::InvalidExplorationConstant(val) => {
                write!(f, "Exploration constant {} must be a positive number", val)
            }
            ConfigError::InvalidBeta(val) => {
                write!(f, "Schedule growth base {} must be greater than 1", val)
            }
            ConfigError::InvalidField(name, reason) => write!(f, "{}: {}", name, reason),
            ConfigError::IoError(msg) => write!(f, "Failed to read config: {}", msg),
            ConfigError::ParseError(msg) => write!(f, "Failed to parse config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = PspConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.c, 2.0);
        assert_eq!(config.beta, 2.0);
        assert!(config.is_parallel());
    }

    #[test]
    fn test_rejects_bad_targets() {
        assert!(matches!(
            PspConfig::new(0.0, 0.1).validate(),
            Err(ConfigError::InvalidEpsilon(_))
        ));
        assert!(matches!(
            PspConfig::new(f64::NAN, 0.1).validate(),
            Err(ConfigError::InvalidEpsilon(_))
        ));
        assert!(matches!(
            PspConfig::new(0.1, 1.0).validate(),
            Err(ConfigError::InvalidDelta(_))
        ));
        assert!(matches!(
            PspConfig::new(0.1, 0.0).validate(),
            Err(ConfigError::InvalidDelta(_))
        ));
    }

    #[test]
    fn test_rejects_bad_constants() {
        assert!(matches!(
            PspConfig::default().with_beta(1.0).validate(),
            Err(ConfigError::InvalidBeta(_))
        ));
        assert!(matches!(
            PspConfig::default().with_c(-1.0).validate(),
            Err(ConfigError::InvalidExplorationConstant(_))
        ));
    }

    #[test]
    fn test_thread_settings() {
        assert!(!PspConfig::default().with_threads(1).is_parallel());
        assert!(!PspConfig::default().with_threads(0).is_parallel());
        assert!(PspConfig::default().with_threads(4).is_parallel());
    }

    #[test]
    fn test_json_defaults() {
        let config: PspConfig =
            serde_json::from_str(r#"{"target_epsilon": 0.05, "target_delta": 0.05}"#).unwrap();
        assert_eq!(config.c, 2.0);
        assert_eq!(config.beta, 2.0);
        assert_eq!(config.seed, None);
    }
}
