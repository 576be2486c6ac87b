//! Experiment result export.
//!
//! Results are written as pretty-printed JSON so that downstream analysis
//! and plotting can read them without this crate.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

use super::analysis::GameStats;
use super::card::Card;
use super::config::ExperimentConfig;
use super::game::DiscardGame;
use crate::psp::{ComplexityBounds, PspOutcome, Termination};

/// Summary of one PSP run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    /// How the run ended.
    pub termination: Termination,
    /// Rounds played.
    pub rounds: usize,
    /// Cumulative samples at the last round.
    pub sample_complexity: u64,
    /// Simulator queries over all rounds.
    pub simulation_complexity: u64,
    /// Active-set size before the first round and after each round.
    pub active_set_history: Vec<usize>,
    /// Largest final epsilon over profiles.
    #[serde(with = "crate::psp::stats::unbounded")]
    pub max_epsilon: f64,
    /// Largest distance between an estimated and a true mean, when the
    /// true means are known.
    pub max_mean_error: Option<f64>,
    /// Profiles whose estimate is farther from the true mean than their
    /// reported epsilon.
    pub bound_violations: Option<usize>,
    /// Wall time of the run.
    pub elapsed_seconds: f64,
}

impl RunRecord {
    /// Summarize a run, comparing against exact statistics if given.
    pub fn from_outcome(outcome: &PspOutcome, stats: Option<&GameStats>) -> Self {
        let errors: Option<Vec<(f64, f64)>> = stats.map(|stats| {
            outcome
                .profiles
                .iter()
                .zip(&stats.profiles)
                .filter_map(|(report, exact)| report.mean().map(|mean| ((mean - exact.mean).abs(), report.epsilon)))
                .collect()
        });

        Self {
            termination: outcome.termination,
            rounds: outcome.rounds,
            sample_complexity: outcome.sample_complexity,
            simulation_complexity: outcome.simulation_complexity,
            active_set_history: outcome.active_set_history.clone(),
            max_epsilon: outcome.max_epsilon(),
            max_mean_error: errors
                .as_ref()
                .map(|errors| errors.iter().map(|&(error, _)| error).fold(0.0, f64::max)),
            bound_violations: errors
                .as_ref()
                .map(|errors| errors.iter().filter(|&&(error, epsilon)| error > epsilon).count()),
            elapsed_seconds: outcome.elapsed_seconds,
        }
    }
}

/// Everything recorded for one sampled game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRecord {
    /// Cards each player discards.
    pub discard_count: usize,
    /// Player 1's dealt hand.
    pub hand_p1: Vec<Card>,
    /// Player 2's dealt hand.
    pub hand_p2: Vec<Card>,
    /// Number of strategy profiles.
    pub size_of_game: usize,
    /// Rounds in the PSP schedule.
    pub schedule_length: usize,
    /// Exact per-profile statistics.
    pub stats: Option<GameStats>,
    /// Theoretical bounds computed from the exact variances.
    pub bounds: Option<ComplexityBounds>,
    /// One record per PSP run.
    pub runs: Vec<RunRecord>,
}

impl GameRecord {
    /// Start a record for a game.
    pub fn new(game: &DiscardGame, schedule_length: usize) -> Self {
        Self {
            discard_count: game.discard_count(),
            hand_p1: game.hand_p1().to_vec(),
            hand_p2: game.hand_p2().to_vec(),
            size_of_game: game.size_of_game(),
            schedule_length,
            stats: None,
            bounds: None,
            runs: Vec::new(),
        }
    }

    /// Mean sample complexity over runs.
    pub fn mean_sample_complexity(&self) -> f64 {
        mean(self.runs.iter().map(|r| r.sample_complexity as f64))
    }

    /// Mean simulation complexity over runs.
    pub fn mean_simulation_complexity(&self) -> f64 {
        mean(self.runs.iter().map(|r| r.simulation_complexity as f64))
    }
}

fn mean<I: Iterator<Item = f64>>(values: I) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Complete experiment output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentOutput {
    /// Experiment name.
    pub name: String,
    /// Configuration the experiment ran with.
    pub config: ExperimentConfig,
    /// Seconds since the Unix epoch when the experiment finished.
    pub timestamp: String,
    /// Total wall time.
    pub elapsed_seconds: f64,
    /// Per-game records.
    pub games: Vec<GameRecord>,
}

impl ExperimentOutput {
    /// Create output for a finished experiment.
    pub fn new(config: &ExperimentConfig, games: Vec<GameRecord>, elapsed_seconds: f64) -> Self {
        Self {
            name: config.name.clone(),
            config: config.clone(),
            timestamp: unix_timestamp(),
            elapsed_seconds,
            games,
        }
    }

    /// Total PSP runs recorded.
    pub fn total_runs(&self) -> usize {
        self.games.iter().map(|g| g.runs.len()).sum()
    }

    /// Save to JSON file.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())
    }
}

/// Simple timestamp without external dependencies.
fn unix_timestamp() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};

    let duration = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();

    format!("{}", duration.as_secs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::discard::analysis::ProfileMoments;
    use crate::psp::{ProfileId, ProfileReport, Schedule, SufficientStatistics};

    fn outcome() -> PspOutcome {
        let report = |sum: f64, samples: u64, epsilon: f64| ProfileReport {
            id: ProfileId(0),
            name: String::new(),
            stats: SufficientStatistics {
                sum,
                sum_squares: samples as f64,
                samples,
            },
            epsilon,
            pruned_at: Some(2),
        };
        PspOutcome {
            termination: Termination::Resolved,
            rounds: 2,
            schedule: Schedule::new(0.1, 0.1, 2.0, 2.0, 2),
            sample_complexity: 200,
            simulation_complexity: 300,
            active_set_history: vec![2, 1, 0],
            profiles: vec![report(50.0, 100, 0.08), report(-20.0, 200, 0.05)],
            elapsed_seconds: 0.5,
        }
    }

    #[test]
    fn test_run_record_errors() {
        let stats = GameStats {
            profiles: vec![
                ProfileMoments { mean: 0.45, variance: 0.7 },
                ProfileMoments { mean: 0.0, variance: 1.0 },
            ],
            draws: 42,
        };
        let record = RunRecord::from_outcome(&outcome(), Some(&stats));

        // Estimates 0.5 and -0.1 against truths 0.45 and 0.0.
        let error = record.max_mean_error.unwrap();
        assert!((error - 0.1).abs() < 1e-12);
        assert_eq!(record.bound_violations, Some(1));
        assert_eq!(record.max_epsilon, 0.08);

        let without = RunRecord::from_outcome(&outcome(), None);
        assert_eq!(without.max_mean_error, None);
        assert_eq!(without.bound_violations, None);
    }

    #[test]
    fn test_unbounded_run_reads_back() {
        let mut outcome = outcome();
        outcome.termination = Termination::Exhausted;
        outcome.profiles[1].epsilon = f64::INFINITY;

        let record = RunRecord::from_outcome(&outcome, None);
        assert!(record.max_epsilon.is_infinite());

        let json = serde_json::to_string(&record).unwrap();
        let back: RunRecord = serde_json::from_str(&json).unwrap();
        assert!(back.max_epsilon.is_infinite());

        let json = serde_json::to_string(&outcome).unwrap();
        let back: PspOutcome = serde_json::from_str(&json).unwrap();
        assert_eq!(back.profiles[0].epsilon, 0.08);
        assert!(back.profiles[1].epsilon.is_infinite());
    }

    #[test]
    fn test_output_round_trips_through_json() {
        let game = DiscardGame::from_hands(
            1,
            &Card::parse_all(&["H2", "H3", "D3", "C7", "D14"]).unwrap(),
            &Card::parse_all(&["D10", "D11", "D12", "D13", "S14"]).unwrap(),
            vec!["*".into()],
        )
        .unwrap();
        let mut record = GameRecord::new(&game, 4);
        record.runs.push(RunRecord::from_outcome(&outcome(), None));
        record.runs.push(RunRecord::from_outcome(&outcome(), None));
        assert_eq!(record.mean_sample_complexity(), 200.0);

        let output = ExperimentOutput::new(&ExperimentConfig::default(), vec![record], 1.0);
        assert_eq!(output.total_runs(), 2);

        let json = serde_json::to_string(&output).unwrap();
        let parsed: ExperimentOutput = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.games[0].hand_p1[4].to_string(), "D14");
        assert_eq!(parsed.games[0].runs[0].termination, Termination::Resolved);
    }
}
