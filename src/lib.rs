//! # PSP Sampler
//!
//! Progressive Sampling with Pruning (PSP) for estimating the payoff of
//! every strategy profile of a simulation-based game to a target accuracy,
//! with a simplified discard-poker game as the payoff oracle.
//!
//! ## Features
//!
//! - **Generic PSP Engine**: Works with any game implementing the `SampledGame` trait
//! - **Empirical-Bernstein Bounds**: Variance-adaptive pruning of resolved profiles
//! - **Common Random Numbers**: One shared batch of draws per round for all profiles
//! - **Parallel Evaluation**: Active profiles are evaluated with rayon
//! - **Complexity Bounds**: Hoeffding, asymptotic and predicted PSP references
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use psp_sampler::games::discard::*;
//! use psp_sampler::psp::{PspConfig, PspSolver};
//!
//! // 1. Build a game and a scorer
//! let game = DiscardGame::sample(&mut rng, 2, vec![BetLabel::from("*")])?;
//! let scorer = Arc::new(HandScorer::new(ScoreSource::Evaluator));
//! let poker = DiscardPoker::new(game, PayoffOracle::new(scorer, ScoreMode::Exact));
//!
//! // 2. Create a solver
//! let mut solver = PspSolver::new(poker, PspConfig::new(0.1, 0.1))?;
//!
//! // 3. Run
//! let outcome = solver.run()?;
//! println!("{:?}: {} queries", outcome.termination, outcome.simulation_complexity);
//! ```
//!
//! ## Modules
//!
//! - [`psp`]: Core PSP algorithm, bounds and solver
//! - [`games`]: Game implementations (discard poker)
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      PSP Solver (Generic)                       │
//! │  - Sampling schedule      - Empirical-Bernstein bound           │
//! │  - Shared draws per round - Pruning of resolved profiles        │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//!                               │ implements SampledGame trait
//!                               ▼
//!                      ┌─────────────────┐
//!                      │  Discard Poker  │
//!                      │ game + oracle   │
//!                      └─────────────────┘
//!                               │
//!                               ▼
//!                      ┌─────────────────┐
//!                      │   HandScorer    │
//!                      │  (score table)  │
//!                      └─────────────────┘
//! ```

#![warn(missing_docs)]

/// PSP (Progressive Sampling with Pruning) module.
///
/// This is the core module containing the generic sampling algorithm.
pub mod psp;

/// Game implementations module.
///
/// Contains the discard poker game and its payoff oracle.
pub mod games;

// Re-export commonly used types at crate root for convenience
pub use psp::{PspConfig, PspOutcome, PspSolver, SampledGame, Termination};
