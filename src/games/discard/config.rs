//! Experiment configuration.
//!
//! An experiment samples random discard games for each discard count,
//! runs PSP several times on every game and records the outcomes next to
//! exact game statistics and theoretical bounds.
//!
//! ```json
//! {
//!   "name": "discard-eps-0.1",
//!   "psp": { "target_epsilon": 0.1, "target_delta": 0.1, "beta": 1.1 },
//!   "discard_counts": [1, 2],
//!   "bet_grid": ["*"],
//!   "games_per_setting": 5,
//!   "runs_per_game": 3,
//!   "floor": true,
//!   "seed": 42
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::game::BetLabel;
use super::hand::HAND_SIZE;
use super::scorer::{ScoreMode, ScoreSource};
use crate::psp::{ConfigError, PspConfig};

/// Configuration of an experiment run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// Experiment name, copied into the output.
    #[serde(default = "default_name")]
    pub name: String,

    /// PSP parameters shared by every run.
    #[serde(default)]
    pub psp: PspConfig,

    /// Discard counts to sample games for.
    #[serde(default = "default_discard_counts")]
    pub discard_counts: Vec<usize>,

    /// Bet labels available to each player.
    #[serde(default = "default_bet_grid")]
    pub bet_grid: Vec<BetLabel>,

    /// Games sampled per discard count.
    #[serde(default = "default_games")]
    pub games_per_setting: usize,

    /// PSP runs per game.
    #[serde(default = "default_runs")]
    pub runs_per_game: usize,

    /// Floor hand scores before comparing.
    #[serde(default)]
    pub floor: bool,

    /// CSV score table; the built-in evaluator is used when absent.
    #[serde(default)]
    pub score_table: Option<PathBuf>,

    /// Compute exact statistics and bounds for every game.
    #[serde(default = "default_true")]
    pub exact_stats: bool,

    /// Seed for dealing games.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_name() -> String {
    "psp".to_string()
}

fn default_discard_counts() -> Vec<usize> {
    vec![1, 2]
}

fn default_bet_grid() -> Vec<BetLabel> {
    vec![BetLabel::from("*")]
}

fn default_games() -> usize {
    2
}

fn default_runs() -> usize {
    3
}

fn default_true() -> bool {
    true
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            psp: PspConfig::default(),
            discard_counts: default_discard_counts(),
            bet_grid: default_bet_grid(),
            games_per_setting: default_games(),
            runs_per_game: default_runs(),
            floor: false,
            score_table: None,
            exact_stats: true,
            seed: None,
        }
    }
}

impl ExperimentConfig {
    /// Load configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::from_json_str(&content)
    }

    /// Parse configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.psp.validate()?;

        if self.discard_counts.is_empty() {
            return Err(ConfigError::InvalidField("discard_counts", "must not be empty".to_string()));
        }
        if let Some(&k) = self.discard_counts.iter().find(|&&k| k > HAND_SIZE) {
            return Err(ConfigError::InvalidField("discard_counts", format!("{} is not in 0-5", k)));
        }
        if self.bet_grid.is_empty() {
            return Err(ConfigError::InvalidField("bet_grid", "must not be empty".to_string()));
        }
        if self.games_per_setting == 0 {
            return Err(ConfigError::InvalidField("games_per_setting", "must be at least 1".to_string()));
        }
        if self.runs_per_game == 0 {
            return Err(ConfigError::InvalidField("runs_per_game", "must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Score mode selected by the floor flag.
    pub fn score_mode(&self) -> ScoreMode {
        ScoreMode::from_floor(self.floor)
    }

    /// Where hand scores come from.
    pub fn score_source(&self) -> ScoreSource {
        match &self.score_table {
            Some(path) => ScoreSource::CsvFile(path.clone()),
            None => ScoreSource::Evaluator,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ExperimentConfig::from_json_str("{}").unwrap();
        assert_eq!(config.discard_counts, vec![1, 2]);
        assert_eq!(config.bet_grid, vec![BetLabel::from("*")]);
        assert_eq!(config.score_mode(), ScoreMode::Exact);
        assert_eq!(config.score_source(), ScoreSource::Evaluator);
        assert!(config.exact_stats);
        assert_eq!(config.psp.c, 2.0);
    }

    #[test]
    fn test_parse_full() {
        let json = r#"{
            "name": "floored",
            "psp": { "target_epsilon": 0.05, "target_delta": 0.1, "beta": 1.1 },
            "discard_counts": [3],
            "bet_grid": ["1", "2"],
            "games_per_setting": 4,
            "runs_per_game": 2,
            "floor": true,
            "score_table": "ranks.csv",
            "seed": 42
        }"#;
        let config = ExperimentConfig::from_json_str(json).unwrap();
        assert_eq!(config.name, "floored");
        assert_eq!(config.psp.target_epsilon, 0.05);
        assert_eq!(config.psp.beta, 1.1);
        assert_eq!(config.psp.c, 2.0);
        assert_eq!(config.bet_grid.len(), 2);
        assert_eq!(config.score_mode(), ScoreMode::Floor);
        assert_eq!(config.score_source(), ScoreSource::CsvFile(PathBuf::from("ranks.csv")));
        assert_eq!(config.seed, Some(42));
    }

    #[test]
    fn test_validation() {
        assert!(matches!(
            ExperimentConfig::from_json_str(r#"{ "discard_counts": [6] }"#),
            Err(ConfigError::InvalidField("discard_counts", _))
        ));
        assert!(matches!(
            ExperimentConfig::from_json_str(r#"{ "bet_grid": [] }"#),
            Err(ConfigError::InvalidField("bet_grid", _))
        ));
        assert!(matches!(
            ExperimentConfig::from_json_str(r#"{ "runs_per_game": 0 }"#),
            Err(ConfigError::InvalidField("runs_per_game", _))
        ));
        assert!(matches!(
            ExperimentConfig::from_json_str(r#"{ "psp": { "target_epsilon": 0.1, "target_delta": 1.5 } }"#),
            Err(ConfigError::InvalidDelta(_))
        ));
        assert!(matches!(
            ExperimentConfig::from_json_str("not json"),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            ExperimentConfig::from_json_file("/nonexistent/experiment.json"),
            Err(ConfigError::IoError(_))
        ));
    }
}
