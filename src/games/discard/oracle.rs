//! Payoff oracle for the discard game.
//!
//! For a profile and a batch of shared draws, both players' retained cards
//! are completed with the same drawn cards and the completed hands are
//! compared. Player 1 receives +1, -1 or 0; the game is zero-sum, so player
//! 2's payoff is the negation and only player 1's is tracked.

use std::sync::Arc;

use rand::Rng;

use super::game::{DiscardGame, DrawBatch};
use super::hand::Hand;
use super::scorer::{HandScorer, ScoreError, ScoreMode};
use crate::psp::{PayoffSums, ProfileId, SampledGame};

/// Evaluates profiles against draws using a shared scorer.
#[derive(Debug, Clone)]
pub struct PayoffOracle {
    scorer: Arc<HandScorer>,
    mode: ScoreMode,
}

impl PayoffOracle {
    /// Create an oracle.
    pub fn new(scorer: Arc<HandScorer>, mode: ScoreMode) -> Self {
        Self { scorer, mode }
    }

    /// Score mode used for comparisons.
    pub fn mode(&self) -> ScoreMode {
        self.mode
    }

    /// The shared scorer.
    pub fn scorer(&self) -> &Arc<HandScorer> {
        &self.scorer
    }

    /// Sum player 1's payoff and squared payoff over every draw.
    pub fn simulate(&self, game: &DiscardGame, id: ProfileId, draws: &DrawBatch) -> Result<PayoffSums, ScoreError> {
        let (p1, p2) = game.retained(id);
        let mut sums = PayoffSums::default();
        for drawn in draws.iter() {
            let p1_hand = Hand::complete(p1, drawn);
            let p2_hand = Hand::complete(p2, drawn);
            let payoff = self.scorer.compare(&p1_hand, &p2_hand, self.mode)?;
            sums.push(payoff as f64);
        }
        Ok(sums)
    }
}

/// A discard game paired with its payoff oracle, ready for PSP.
#[derive(Debug, Clone)]
pub struct DiscardPoker {
    game: DiscardGame,
    oracle: PayoffOracle,
}

impl DiscardPoker {
    /// Pair a game with an oracle.
    pub fn new(game: DiscardGame, oracle: PayoffOracle) -> Self {
        Self { game, oracle }
    }

    /// The underlying game.
    pub fn game(&self) -> &DiscardGame {
        &self.game
    }

    /// The payoff oracle.
    pub fn oracle(&self) -> &PayoffOracle {
        &self.oracle
    }
}

impl SampledGame for DiscardPoker {
    type Draws = DrawBatch;
    type Error = ScoreError;

    fn num_profiles(&self) -> usize {
        self.game.size_of_game()
    }

    fn draw_randomness<R: Rng>(&self, rng: &mut R, m: usize) -> DrawBatch {
        self.game.draw_randomness(rng, m)
    }

    fn simulate(&self, id: ProfileId, draws: &DrawBatch) -> Result<PayoffSums, ScoreError> {
        self.oracle.simulate(&self.game, id, draws)
    }

    fn profile_name(&self, id: ProfileId) -> String {
        self.game.describe(id)
    }
}
