//! Progressive Sampling with Pruning (PSP) solver.
//!
//! PSP estimates every strategy profile of a game to within a target
//! epsilon with probability at least `1 - δ`, while spending samples only
//! on profiles whose estimates are still loose:
//!
//! 1. Compute the schedule `m_1 < … < m_T` from the targets.
//! 2. Each round draws `m_t - m_{t-1}` samples of randomness **once** and
//!    evaluates every active profile against that same batch.
//! 3. Each active profile updates its statistics and epsilon estimate.
//! 4. Profiles whose epsilon reached the target leave the active set.
//!
//! The run ends `Resolved` when the active set empties, or `Exhausted`
//! when round `T` completes with profiles still active.
//!
//! The solver is generic over any game that implements [`SampledGame`].

use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::psp::bound::ConfidenceBound;
use crate::psp::config::{ConfigError, PspConfig};
use crate::psp::game::{ProfileId, SampledGame};
use crate::psp::schedule::Schedule;
use crate::psp::stats::{ProfileReport, ProfileSlot, ProfileStatus};

/// The PSP solver.
///
/// # Type Parameters
/// - `G`: The game type implementing the `SampledGame` trait
///
/// # Example
/// ```ignore
/// use psp_sampler::psp::{PspConfig, PspSolver};
///
/// let config = PspConfig::new(0.1, 0.1).with_seed(42);
/// let mut solver = PspSolver::new(my_game, config)?;
///
/// let outcome = solver.run()?;
/// println!("{:?} after {} samples", outcome.termination, outcome.sample_complexity);
/// ```
pub struct PspSolver<G: SampledGame> {
    /// The game being estimated.
    game: G,

    /// Configuration for the solver.
    config: PspConfig,

    /// Cumulative sample targets per round.
    schedule: Schedule,

    /// Confidence bound shared by all profiles.
    bound: ConfidenceBound,

    /// Random number generator.
    rng: StdRng,

    /// Dedicated thread pool, if a thread count was configured.
    pool: Option<rayon::ThreadPool>,

    /// Number of completed runs.
    runs: u64,
}

/// Mutable state of a single run.
struct RunState {
    slots: Vec<ProfileSlot>,
    active: usize,
    rounds: usize,
    sample_complexity: u64,
    simulation_complexity: u64,
    active_set_history: Vec<usize>,
}

/// Engine state between rounds.
#[derive(Debug, Clone, Copy)]
enum EngineState {
    Running { round: usize },
    Finished(Termination),
}

impl<G: SampledGame> PspSolver<G> {
    /// Create a new PSP solver for the given game.
    ///
    /// # Arguments
    /// * `game` - The game to estimate
    /// * `config` - Configuration options for the solver
    pub fn new(game: G, config: PspConfig) -> Result<Self, PspError<G::Error>> {
        config.validate()?;

        let size_of_game = game.num_profiles();
        if size_of_game == 0 {
            return Err(PspError::EmptyGame);
        }

        let schedule = Schedule::new(
            config.target_epsilon,
            config.target_delta,
            config.c,
            config.beta,
            size_of_game,
        );
        let bound = ConfidenceBound::new(config.c, config.target_delta, schedule.len(), size_of_game);

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let pool = match config.num_threads {
            Some(threads) if threads > 1 => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .map_err(|e| PspError::ThreadPool(e.to_string()))?,
            ),
            _ => None,
        };

        log::debug!(
            "psp schedule: {} rounds, alpha {:.2}, final target {}",
            schedule.len(),
            schedule.alpha,
            schedule.final_target()
        );

        Ok(Self {
            game,
            config,
            schedule,
            bound,
            rng,
            pool,
            runs: 0,
        })
    }

    /// Run PSP to completion.
    pub fn run(&mut self) -> Result<PspOutcome, PspError<G::Error>> {
        self.run_with_callback(|_| {})
    }

    /// Run PSP with a callback invoked after every round.
    ///
    /// Every run starts from fresh statistics; the random stream continues
    /// from where the previous run left off.
    pub fn run_with_callback<F>(&mut self, mut callback: F) -> Result<PspOutcome, PspError<G::Error>>
    where
        F: FnMut(&RoundReport),
    {
        let start_time = Instant::now();
        let size_of_game = self.game.num_profiles();

        let mut run = RunState {
            slots: vec![ProfileSlot::default(); size_of_game],
            active: size_of_game,
            rounds: 0,
            sample_complexity: 0,
            simulation_complexity: 0,
            active_set_history: vec![size_of_game],
        };

        let mut state = EngineState::Running { round: 1 };
        let termination = loop {
            match state {
                EngineState::Running { round } => {
                    let report = self.play_round(&mut run, round)?;
                    callback(&report);

                    state = if run.active == 0 {
                        EngineState::Finished(Termination::Resolved)
                    } else if round == self.schedule.len() {
                        EngineState::Finished(Termination::Exhausted)
                    } else {
                        EngineState::Running { round: round + 1 }
                    };
                }
                EngineState::Finished(termination) => break termination,
            }
        };

        self.runs += 1;
        let elapsed_seconds = start_time.elapsed().as_secs_f64();
        log::info!(
            "psp run {} {:?} after {}/{} rounds: {} samples, {} queries, {} active, {:.2}s",
            self.runs,
            termination,
            run.rounds,
            self.schedule.len(),
            run.sample_complexity,
            run.simulation_complexity,
            run.active,
            elapsed_seconds
        );

        let profiles = run
            .slots
            .iter()
            .enumerate()
            .map(|(index, slot)| {
                let id = ProfileId(index as u32);
                ProfileReport {
                    id,
                    name: self.game.profile_name(id),
                    stats: slot.stats,
                    epsilon: slot.epsilon,
                    pruned_at: match slot.status {
                        ProfileStatus::Pruned { round } => Some(round),
                        ProfileStatus::Active => None,
                    },
                }
            })
            .collect();

        Ok(PspOutcome {
            termination,
            rounds: run.rounds,
            schedule: self.schedule.clone(),
            sample_complexity: run.sample_complexity,
            simulation_complexity: run.simulation_complexity,
            active_set_history: run.active_set_history,
            profiles,
            elapsed_seconds,
        })
    }

    /// Play one round: draw shared randomness, update every active profile,
    /// then prune.
    fn play_round(&mut self, run: &mut RunState, round: usize) -> Result<RoundReport, PspError<G::Error>> {
        let cumulative_samples = self.schedule.target(round);
        let marginal_samples = self.schedule.marginal(round);

        // Barrier 1: one batch of randomness for the whole round.
        let draws = self.game.draw_randomness(&mut self.rng, marginal_samples as usize);

        let active_before = run.active;
        run.sample_complexity = cumulative_samples;
        run.simulation_complexity += marginal_samples * active_before as u64;

        self.update_active(&mut run.slots, &draws, cumulative_samples)?;

        // Barrier 2: pruning reads every updated epsilon of the round.
        let target_epsilon = self.config.target_epsilon;
        let mut max_epsilon: f64 = 0.0;
        for slot in run.slots.iter_mut().filter(|slot| slot.is_active()) {
            if slot.epsilon <= target_epsilon {
                slot.status = ProfileStatus::Pruned { round };
                run.active -= 1;
            } else {
                max_epsilon = max_epsilon.max(slot.epsilon);
            }
        }
        run.rounds = round;
        run.active_set_history.push(run.active);

        log::debug!(
            "round {:>3}/{}: m={} (+{}), active {} -> {}",
            round,
            self.schedule.len(),
            cumulative_samples,
            marginal_samples,
            active_before,
            run.active
        );

        Ok(RoundReport {
            round,
            rounds_total: self.schedule.len(),
            cumulative_samples,
            marginal_samples,
            active_before,
            active_after: run.active,
            max_active_epsilon: max_epsilon,
        })
    }

    /// Simulate and re-bound every active profile against a shared batch.
    ///
    /// Each slot is written only by its own profile, so slots are updated
    /// in parallel without locks.
    fn update_active(
        &self,
        slots: &mut [ProfileSlot],
        draws: &G::Draws,
        cumulative_samples: u64,
    ) -> Result<(), PspError<G::Error>> {
        let game = &self.game;
        let bound = self.bound;

        let update = |(index, slot): (usize, &mut ProfileSlot)| -> Result<(), G::Error> {
            let sums = game.simulate(ProfileId(index as u32), draws)?;
            slot.stats.absorb(sums, cumulative_samples);
            slot.epsilon = bound.epsilon(&slot.stats);
            Ok(())
        };

        let result = if self.config.is_parallel() {
            let mut fan_out = || {
                slots
                    .par_iter_mut()
                    .enumerate()
                    .filter(|(_, slot)| slot.is_active())
                    .try_for_each(&update)
            };
            match &self.pool {
                Some(pool) => pool.install(fan_out),
                None => fan_out(),
            }
        } else {
            slots
                .iter_mut()
                .enumerate()
                .filter(|(_, slot)| slot.is_active())
                .try_for_each(&update)
        };

        result.map_err(PspError::Simulation)
    }

    /// Get the sampling schedule.
    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Get the confidence bound.
    pub fn bound(&self) -> &ConfidenceBound {
        &self.bound
    }

    /// Get reference to the game.
    pub fn game(&self) -> &G {
        &self.game
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &PspConfig {
        &self.config
    }

    /// Number of runs completed so far.
    pub fn runs(&self) -> u64 {
        self.runs
    }
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    /// Every profile reached the target epsilon.
    Resolved,
    /// The schedule ran out with profiles still active.
    Exhausted,
}

/// Progress of a single round, passed to run callbacks.
#[derive(Debug, Clone)]
pub struct RoundReport {
    /// 1-based round number.
    pub round: usize,
    /// Total rounds in the schedule.
    pub rounds_total: usize,
    /// Cumulative samples per active profile after this round.
    pub cumulative_samples: u64,
    /// Samples drawn in this round.
    pub marginal_samples: u64,
    /// Active profiles entering the round.
    pub active_before: usize,
    /// Active profiles after pruning.
    pub active_after: usize,
    /// Largest epsilon among profiles still active (0 if none).
    pub max_active_epsilon: f64,
}

/// Result of a PSP run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PspOutcome {
    /// Whether every profile was resolved.
    pub termination: Termination,
    /// Number of rounds played.
    pub rounds: usize,
    /// The schedule used.
    pub schedule: Schedule,
    /// Total draws of randomness (cumulative samples at the last round).
    pub sample_complexity: u64,
    /// Sum over rounds of draws in the round times active profiles.
    pub simulation_complexity: u64,
    /// Active-set size before the first round and after every round.
    pub active_set_history: Vec<usize>,
    /// Per-profile results, indexed by profile id.
    pub profiles: Vec<ProfileReport>,
    /// Wall time of the run.
    pub elapsed_seconds: f64,
}

impl PspOutcome {
    /// Whether all profiles met the target epsilon.
    pub fn is_resolved(&self) -> bool {
        self.termination == Termination::Resolved
    }

    /// Profiles still active when the run ended.
    pub fn active_profiles(&self) -> impl Iterator<Item = &ProfileReport> {
        self.profiles.iter().filter(|p| p.pruned_at.is_none())
    }

    /// Largest final epsilon over all profiles.
    pub fn max_epsilon(&self) -> f64 {
        self.profiles.iter().map(|p| p.epsilon).fold(0.0, f64::max)
    }
}

/// Errors that can occur while constructing or running the solver.
#[derive(Debug)]
pub enum PspError<E> {
    /// Invalid solver configuration.
    Config(ConfigError),
    /// The game has no strategy profiles.
    EmptyGame,
    /// The dedicated thread pool could not be built.
    ThreadPool(String),
    /// A profile could not be simulated.
    Simulation(E),
}

impl<E> From<ConfigError> for PspError<E> {
    fn from(err: ConfigError) -> Self {
        PspError::Config(err)
    }
}

impl<E: std::fmt::Display> std::fmt::Display for PspError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PspError::Config(err) => write!(f, "Invalid configuration: {}", err),
            PspError::EmptyGame => write!(f, "Game has no strategy profiles"),
            PspError::ThreadPool(msg) => write!(f, "Failed to build thread pool: {}", msg),
            PspError::Simulation(err) => write!(f, "Simulation failed: {}", err),
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for PspError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PspError::Config(err) => Some(err),
            PspError::Simulation(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::psp::game::PayoffSums;
    use rand::Rng;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Profiles with fixed win probabilities over shared uniform draws.
    ///
    /// Profile `i` pays +1 when the shared draw is below `p_i`, else -1.
    /// Probabilities of 0 or 1 give constant payoffs and resolve quickly.
    #[derive(Debug, Clone)]
    struct Thresholds {
        probabilities: Vec<f64>,
    }

    #[derive(Debug)]
    struct NeverFails;

    impl std::fmt::Display for NeverFails {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "never fails")
        }
    }

    impl std::error::Error for NeverFails {}

    impl SampledGame for Thresholds {
        type Draws = Vec<f64>;
        type Error = NeverFails;

        fn num_profiles(&self) -> usize {
            self.probabilities.len()
        }

        fn draw_randomness<R: Rng>(&self, rng: &mut R, m: usize) -> Vec<f64> {
            (0..m).map(|_| rng.gen::<f64>()).collect()
        }

        fn simulate(&self, id: ProfileId, draws: &Vec<f64>) -> Result<PayoffSums, NeverFails> {
            let p = self.probabilities[id.index()];
            let mut sums = PayoffSums::default();
            for &u in draws {
                sums.push(if u < p { 1.0 } else { -1.0 });
            }
            Ok(sums)
        }
    }

    /// Fails for a single profile.
    #[derive(Debug, Clone)]
    struct Broken;

    impl SampledGame for Broken {
        type Draws = usize;
        type Error = NeverFails;

        fn num_profiles(&self) -> usize {
            3
        }

        fn draw_randomness<R: Rng>(&self, _rng: &mut R, m: usize) -> usize {
            m
        }

        fn simulate(&self, id: ProfileId, _draws: &usize) -> Result<PayoffSums, NeverFails> {
            if id.0 == 1 {
                Err(NeverFails)
            } else {
                Ok(PayoffSums::default())
            }
        }
    }

    /// Wraps a game and records every batch of randomness it hands out.
    struct CountingDraws {
        inner: Thresholds,
        calls: AtomicUsize,
        batch_sizes: Mutex<Vec<usize>>,
    }

    impl CountingDraws {
        fn new(inner: Thresholds) -> Self {
            Self {
                inner,
                calls: AtomicUsize::new(0),
                batch_sizes: Mutex::new(Vec::new()),
            }
        }
    }

    impl SampledGame for CountingDraws {
        type Draws = Vec<f64>;
        type Error = NeverFails;

        fn num_profiles(&self) -> usize {
            self.inner.num_profiles()
        }

        fn draw_randomness<R: Rng>(&self, rng: &mut R, m: usize) -> Vec<f64> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let draws = self.inner.draw_randomness(rng, m);
            self.batch_sizes.lock().unwrap().push(draws.len());
            draws
        }

        fn simulate(&self, id: ProfileId, draws: &Vec<f64>) -> Result<PayoffSums, NeverFails> {
            self.inner.simulate(id, draws)
        }
    }

    fn mixed_game() -> Thresholds {
        Thresholds {
            probabilities: vec![0.0, 1.0, 0.5, 0.1, 0.9, 0.3],
        }
    }

    #[test]
    fn test_rejects_invalid_config() {
        let result = PspSolver::new(mixed_game(), PspConfig::new(0.1, 2.0));
        assert!(matches!(result, Err(PspError::Config(ConfigError::InvalidDelta(_)))));
    }

    #[test]
    fn test_rejects_empty_game() {
        let game = Thresholds { probabilities: vec![] };
        assert!(matches!(
            PspSolver::new(game, PspConfig::default()),
            Err(PspError::EmptyGame)
        ));
    }

    #[test]
    fn test_active_set_never_grows() {
        let config = PspConfig::new(0.1, 0.1).with_seed(3);
        let mut solver = PspSolver::new(mixed_game(), config).unwrap();
        let outcome = solver.run().unwrap();

        assert_eq!(outcome.active_set_history[0], 6);
        assert_eq!(outcome.active_set_history.len(), outcome.rounds + 1);
        for pair in outcome.active_set_history.windows(2) {
            assert!(pair[1] <= pair[0]);
        }
    }

    #[test]
    fn test_pruned_profiles_met_target() {
        let config = PspConfig::new(0.1, 0.1).with_seed(11);
        let mut solver = PspSolver::new(mixed_game(), config).unwrap();
        let outcome = solver.run().unwrap();

        for profile in &outcome.profiles {
            if let Some(round) = profile.pruned_at {
                assert!(profile.epsilon <= 0.1);
                assert_eq!(profile.stats.samples, outcome.schedule.target(round));
            } else {
                assert!(profile.epsilon > 0.1);
                assert_eq!(profile.stats.samples, outcome.sample_complexity);
            }
        }
    }

    #[test]
    fn test_terminates_within_schedule() {
        let config = PspConfig::new(0.1, 0.1).with_seed(5);
        let mut solver = PspSolver::new(mixed_game(), config).unwrap();
        let outcome = solver.run().unwrap();

        assert!(outcome.rounds <= outcome.schedule.len());
        match outcome.termination {
            Termination::Resolved => assert_eq!(outcome.active_profiles().count(), 0),
            Termination::Exhausted => {
                assert_eq!(outcome.rounds, outcome.schedule.len());
                assert!(outcome.active_profiles().count() > 0);
            }
        }
    }

    #[test]
    fn test_constant_payoffs_resolve() {
        let game = Thresholds {
            probabilities: vec![0.0, 1.0, 0.0],
        };
        let mut solver = PspSolver::new(game, PspConfig::new(0.1, 0.1).with_seed(1)).unwrap();
        let outcome = solver.run().unwrap();

        assert!(outcome.is_resolved());
        assert_eq!(*outcome.active_set_history.last().unwrap(), 0);
        assert_eq!(outcome.profiles[0].mean(), Some(-1.0));
        assert_eq!(outcome.profiles[1].mean(), Some(1.0));
    }

    #[test]
    fn test_complexity_accounting() {
        let config = PspConfig::new(0.1, 0.1).with_seed(9).with_threads(1);
        let mut solver = PspSolver::new(mixed_game(), config).unwrap();

        let mut expected_queries = 0;
        let outcome = solver
            .run_with_callback(|report| {
                expected_queries += report.marginal_samples * report.active_before as u64;
            })
            .unwrap();

        assert_eq!(outcome.simulation_complexity, expected_queries);
        assert_eq!(outcome.sample_complexity, outcome.schedule.target(outcome.rounds));
        assert!(outcome.simulation_complexity <= outcome.sample_complexity * 6);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let run = |threads: Option<usize>| {
            let mut config = PspConfig::new(0.1, 0.1).with_seed(21);
            config.num_threads = threads;
            let mut solver = PspSolver::new(mixed_game(), config).unwrap();
            solver.run().unwrap()
        };

        let sequential = run(Some(1));
        for parallel in [run(None), run(Some(3))] {
            assert_eq!(parallel.termination, sequential.termination);
            assert_eq!(parallel.active_set_history, sequential.active_set_history);
            for (a, b) in parallel.profiles.iter().zip(&sequential.profiles) {
                assert_eq!(a.stats, b.stats);
                assert_eq!(a.pruned_at, b.pruned_at);
            }
        }
    }

    #[test]
    fn test_repeated_runs_start_fresh() {
        let config = PspConfig::new(0.1, 0.1).with_seed(2);
        let mut solver = PspSolver::new(mixed_game(), config).unwrap();
        let first = solver.run().unwrap();
        let second = solver.run().unwrap();

        assert_eq!(solver.runs(), 2);
        assert_eq!(first.active_set_history[0], second.active_set_history[0]);
        for profile in &second.profiles {
            assert!(profile.stats.samples <= second.schedule.final_target());
        }
    }

    #[test]
    fn test_simulation_errors_propagate() {
        let mut solver = PspSolver::new(Broken, PspConfig::default().with_seed(1)).unwrap();
        assert!(matches!(solver.run(), Err(PspError::Simulation(NeverFails))));
    }

    #[test]
    fn test_one_draw_per_round() {
        for threads in [1, 3] {
            let config = PspConfig::new(0.1, 0.1).with_seed(13).with_threads(threads);
            let mut solver = PspSolver::new(CountingDraws::new(mixed_game()), config).unwrap();
            let outcome = solver.run().unwrap();

            let game = solver.game();
            assert_eq!(game.calls.load(Ordering::SeqCst), outcome.rounds);
            let sizes = game.batch_sizes.lock().unwrap();
            assert_eq!(sizes.len(), outcome.rounds);
            for (t, &size) in sizes.iter().enumerate() {
                assert_eq!(size as u64, outcome.schedule.marginal(t + 1));
            }
        }
    }

    #[test]
    fn test_identical_profiles_share_draws() {
        let game = Thresholds {
            probabilities: vec![0.3, 0.3],
        };
        for threads in [1, 2] {
            let config = PspConfig::new(0.1, 0.1).with_seed(17).with_threads(threads);
            let mut solver = PspSolver::new(game.clone(), config).unwrap();
            let outcome = solver.run().unwrap();

            let (a, b) = (&outcome.profiles[0], &outcome.profiles[1]);
            assert!(a.stats.samples > 0);
            assert_eq!(a.stats, b.stats);
            assert_eq!(a.epsilon, b.epsilon);
            assert_eq!(a.pruned_at, b.pruned_at);
        }
    }

    #[test]
    fn test_unresolved_outcome_reads_back_from_json() {
        // A loose delta and wide epsilon give a one-sample schedule, so the
        // epsilon stays infinite.
        let game = Thresholds { probabilities: vec![0.5] };
        let mut solver = PspSolver::new(game, PspConfig::new(5.0, 0.9).with_seed(4)).unwrap();
        let outcome = solver.run().unwrap();
        assert_eq!(outcome.sample_complexity, 1);
        assert!(outcome.max_epsilon().is_infinite());

        let json = serde_json::to_string(&outcome).unwrap();
        let back: PspOutcome = serde_json::from_str(&json).unwrap();
        assert_eq!(back.termination, outcome.termination);
        assert!(back.profiles[0].epsilon.is_infinite());
    }
}
