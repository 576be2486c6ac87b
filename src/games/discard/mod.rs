//! Two-player discard poker.
//!
//! Each player is dealt five cards, discards `k` of them, and both refill
//! their hands with the same `k` shared cards drawn from the remaining deck.
//! The better completed hand wins (+1 / -1 / 0 for player 1), so a strategy
//! profile is a pair of discard choices plus a bet label per player.
//!
//! ## Modules
//!
//! - `card`: Card and deck representations
//! - `hand`: Canonical 5-card hands and discard choices
//! - `hand_eval`: 5-card hand evaluation used to tabulate scores
//! - `scorer`: Hand score table and the shared `HandScorer`
//! - `game`: Game model, strategy profiles and shared random draws
//! - `oracle`: Payoff oracle and the `SampledGame` implementation
//! - `analysis`: Exact per-profile payoff statistics
//! - `config`: Experiment configuration
//! - `output`: Experiment result export

pub mod card;
pub mod hand;
pub mod hand_eval;
pub mod scorer;
pub mod game;
pub mod oracle;
pub mod analysis;
pub mod config;
pub mod output;

use std::fmt;

// Re-export commonly used types
pub use card::{Card, Deck};
pub use hand::{DiscardChoice, Hand};
pub use hand_eval::{HandCategory, HandEvaluator, HandRank};
pub use scorer::{HandScorer, ScoreError, ScoreMode, ScoreSource, ScoreTable};
pub use game::{BetLabel, DiscardGame, DrawBatch, StrategyProfile};
pub use oracle::{DiscardPoker, PayoffOracle};
pub use analysis::{GameStats, ProfileMoments};
pub use config::ExperimentConfig;
pub use output::{ExperimentOutput, GameRecord, RunRecord};

/// Errors raised while building cards, hands or games.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    /// A card string could not be parsed.
    InvalidCard(String),
    /// A hand did not contain exactly five cards.
    WrongHandSize(usize),
    /// The same card appears twice in a hand or deck.
    DuplicateCard(Card),
    /// A discard position outside 0-4.
    InvalidDiscardIndex(usize),
    /// Discard count outside 0-5.
    InvalidDiscardCount(usize),
    /// A card is dealt to both players, or is dealt and still in the deck.
    OverlappingCards(Card),
    /// The bet grid has no labels.
    EmptyBetGrid,
    /// The deck cannot supply a draw of the requested size.
    DeckTooSmall {
        /// Cards a draw needs.
        needed: usize,
        /// Cards left in the deck.
        available: usize,
    },
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCard(s) => write!(f, "Invalid card: {:?}", s),
            Self::WrongHandSize(n) => write!(f, "Hand has {} cards (must be 5)", n),
            Self::DuplicateCard(c) => write!(f, "Duplicate card: {}", c),
            Self::InvalidDiscardIndex(i) => write!(f, "Invalid discard position: {} (must be 0-4)", i),
            Self::InvalidDiscardCount(k) => write!(f, "Invalid discard count: {} (must be 0-5)", k),
            Self::OverlappingCards(c) => write!(f, "Card {} is dealt more than once", c),
            Self::EmptyBetGrid => write!(f, "Bet grid is empty"),
            Self::DeckTooSmall { needed, available } => {
                write!(f, "Deck has {} cards, draws need {}", available, needed)
            }
        }
    }
}

impl std::error::Error for GameError {}
