//! PSP (Progressive Sampling with Pruning) Module.
//!
//! This module provides a generic implementation of progressive sampling
//! with pruning for estimating the payoffs of every strategy profile of a
//! simulation-based game.
//!
//! # Overview
//!
//! PSP is an adaptive Monte-Carlo procedure that:
//! 1. Samples all profiles on a geometric schedule of cumulative sample counts
//! 2. Bounds each profile's estimation error with an empirical-Bernstein bound
//! 3. Stops sampling profiles whose bound already meets the target epsilon
//!
//! Low-variance profiles are resolved early, so the total number of
//! simulator queries scales with the game's variance rather than with its
//! worst-case payoff range.
//!
//! # Usage
//!
//! 1. Implement the `SampledGame` trait for your game
//! 2. Create a `PspSolver` with your game and a `PspConfig`
//! 3. Call `run()` and inspect the returned `PspOutcome`
//!
//! # Example
//!
//! ```ignore
//! use psp_sampler::psp::{PspConfig, PspSolver, SampledGame};
//!
//! struct MyGame { /* ... */ }
//! impl SampledGame for MyGame { /* ... */ }
//!
//! let config = PspConfig::new(0.05, 0.05).with_seed(42);
//! let mut solver = PspSolver::new(MyGame::new(), config)?;
//! let outcome = solver.run()?;
//!
//! println!(
//!     "{:?}: {} samples, {} queries",
//!     outcome.termination, outcome.sample_complexity, outcome.simulation_complexity
//! );
//! ```
//!
//! # Guarantee
//!
//! With probability at least `1 - δ`, every profile's empirical mean is
//! within its reported epsilon of the true mean at every round. The
//! union bound over `S` profiles, `T` rounds and three concentration
//! events gives the `ln(3·S·T/δ)` term used throughout.
//!
//! # References
//!
//! - Areyan Viqueira, E., Cousins, C., Greenwald, A. "Improved Algorithms for
//!   Learning Equilibria in Simulation-Based Games" (2020)
//! - Maurer, A., Pontil, M. "Empirical Bernstein Bounds and Sample Variance
//!   Penalization" (2009)

pub mod bound;
pub mod bounds;
pub mod config;
pub mod game;
pub mod schedule;
pub mod solver;
pub mod stats;

// Re-export main types for convenient access
pub use bound::ConfidenceBound;
pub use bounds::ComplexityBounds;
pub use config::{ConfigError, PspConfig};
pub use game::{PayoffSums, ProfileId, SampledGame};
pub use schedule::{schedule_length, Schedule};
pub use solver::{PspError, PspOutcome, PspSolver, RoundReport, Termination};
pub use stats::{ProfileReport, ProfileSlot, ProfileStatus, SufficientStatistics};
