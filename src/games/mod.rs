//! Game implementations for the PSP solver.
//!
//! Each game exposes its strategy profiles and shared randomness through
//! the `SampledGame` trait so the generic solver can estimate its payoffs.
//!
//! ## Available Games
//!
//! - [`discard`]: Two-player discard poker, where each player throws away
//!   `k` cards and both refill from the same shared draw
//!
//! ## Adding New Games
//!
//! To add a new game:
//!
//! 1. Create a new module under `src/games/`
//! 2. Define its draw batch type and payoff simulation
//! 3. Implement the `SampledGame` trait
//! 4. Add tests that verify expected behavior
//!
//! See the [`discard`] module for a complete example.

pub mod discard;
