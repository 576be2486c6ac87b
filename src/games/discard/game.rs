//! Discard game model.
//!
//! A [`DiscardGame`] fixes the dealt hands, the number of cards each player
//! discards, the remaining deck and the bet grid, and enumerates every
//! strategy profile:
//!
//! ```text
//! p1 discard × p1 bet × p2 discard × p2 bet
//! ```
//!
//! with discard choices in lexicographic order, so the game has
//! `C(5,k)² · |bets|²` profiles. Profile `ProfileId(i)` is the `i`-th entry
//! of that product.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::card::{Card, CardSet, Deck};
use super::hand::{combinations, DiscardChoice, Hand, HAND_SIZE};
use super::GameError;
use crate::psp::ProfileId;

/// An opaque bet label.
///
/// Bets do not change payoffs; they only multiply the number of profiles.
/// A single sentinel label such as `"*"` removes the bet dimension.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BetLabel(pub String);

impl From<&str> for BetLabel {
    fn from(label: &str) -> Self {
        BetLabel(label.to_string())
    }
}

impl fmt::Display for BetLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One joint choice of both players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StrategyProfile {
    /// Positions player 1 discards.
    pub p1_discard: DiscardChoice,
    /// Index of player 1's bet in the bet grid.
    pub p1_bet: usize,
    /// Positions player 2 discards.
    pub p2_discard: DiscardChoice,
    /// Index of player 2's bet in the bet grid.
    pub p2_bet: usize,
}

/// Cards each player keeps under one profile.
#[derive(Debug, Clone)]
struct Retained {
    p1: Vec<Card>,
    p2: Vec<Card>,
}

/// A batch of draws, each an unordered set of `k` cards from the deck.
#[derive(Debug, Clone, Default)]
pub struct DrawBatch {
    k: usize,
    len: usize,
    cards: Vec<Card>,
}

impl DrawBatch {
    /// Build a batch from consecutive groups of `k` cards.
    pub fn from_cards(k: usize, cards: Vec<Card>) -> Self {
        let len = if k == 0 { 0 } else { cards.len() / k };
        debug_assert_eq!(len * k, cards.len());
        Self { k, len, cards }
    }

    /// Number of draws.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the batch has no draws.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Cards per draw.
    pub fn draw_size(&self) -> usize {
        self.k
    }

    /// Iterate over the draws.
    pub fn iter(&self) -> impl Iterator<Item = &[Card]> + '_ {
        (0..self.len).map(move |i| &self.cards[i * self.k..(i + 1) * self.k])
    }
}

/// A two-player discard game.
#[derive(Debug, Clone)]
pub struct DiscardGame {
    deck: Deck,
    k: usize,
    hand_p1: [Card; HAND_SIZE],
    hand_p2: [Card; HAND_SIZE],
    bet_grid: Vec<BetLabel>,
    profiles: Vec<StrategyProfile>,
    retained: Vec<Retained>,
}

impl DiscardGame {
    /// Build a game.
    ///
    /// # Arguments
    /// * `deck` - Cards the shared draws come from; must not contain a dealt card
    /// * `k` - Number of cards each player discards (0-5)
    /// * `hand_p1`, `hand_p2` - Five distinct cards each, in dealt order
    /// * `bet_grid` - Bet labels available to each player
    pub fn new(
        deck: Deck,
        k: usize,
        hand_p1: &[Card],
        hand_p2: &[Card],
        bet_grid: Vec<BetLabel>,
    ) -> Result<Self, GameError> {
        if k > HAND_SIZE {
            return Err(GameError::InvalidDiscardCount(k));
        }
        // Validates size and duplicates within each hand.
        Hand::new(hand_p1)?;
        Hand::new(hand_p2)?;

        let mut dealt = CardSet::default();
        for &card in hand_p1.iter().chain(hand_p2) {
            if !dealt.insert(card) || deck.contains(card) {
                return Err(GameError::OverlappingCards(card));
            }
        }
        if bet_grid.is_empty() {
            return Err(GameError::EmptyBetGrid);
        }
        if deck.len() < k {
            return Err(GameError::DeckTooSmall {
                needed: k,
                available: deck.len(),
            });
        }

        let hand_p1: [Card; HAND_SIZE] = [hand_p1[0], hand_p1[1], hand_p1[2], hand_p1[3], hand_p1[4]];
        let hand_p2: [Card; HAND_SIZE] = [hand_p2[0], hand_p2[1], hand_p2[2], hand_p2[3], hand_p2[4]];

        let choices = DiscardChoice::all(k);
        let bets = bet_grid.len();
        let size = choices.len() * choices.len() * bets * bets;
        let mut profiles = Vec::with_capacity(size);
        let mut retained = Vec::with_capacity(size);

        for &p1_discard in &choices {
            for p1_bet in 0..bets {
                for &p2_discard in &choices {
                    for p2_bet in 0..bets {
                        profiles.push(StrategyProfile {
                            p1_discard,
                            p1_bet,
                            p2_discard,
                            p2_bet,
                        });
                        retained.push(Retained {
                            p1: p1_discard.retain(&hand_p1),
                            p2: p2_discard.retain(&hand_p2),
                        });
                    }
                }
            }
        }

        Ok(Self {
            deck,
            k,
            hand_p1,
            hand_p2,
            bet_grid,
            profiles,
            retained,
        })
    }

    /// Build a game whose deck is the standard deck minus both hands.
    pub fn from_hands(
        k: usize,
        hand_p1: &[Card],
        hand_p2: &[Card],
        bet_grid: Vec<BetLabel>,
    ) -> Result<Self, GameError> {
        let dealt: Vec<Card> = hand_p1.iter().chain(hand_p2).copied().collect();
        Self::new(Deck::without(&dealt), k, hand_p1, hand_p2, bet_grid)
    }

    /// Deal a random game from the standard deck.
    ///
    /// Both hands are dealt in canonical order.
    pub fn sample<R: Rng + ?Sized>(rng: &mut R, k: usize, bet_grid: Vec<BetLabel>) -> Result<Self, GameError> {
        let mut dealt = Deck::standard().sample(rng, 2 * HAND_SIZE);
        dealt[..HAND_SIZE].sort_unstable();
        dealt[HAND_SIZE..].sort_unstable();
        Self::from_hands(k, &dealt[..HAND_SIZE], &dealt[HAND_SIZE..], bet_grid)
    }

    /// Number of strategy profiles.
    pub fn size_of_game(&self) -> usize {
        self.profiles.len()
    }

    /// Number of cards each player discards.
    pub fn discard_count(&self) -> usize {
        self.k
    }

    /// The deck draws come from.
    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    /// Player 1's dealt hand.
    pub fn hand_p1(&self) -> &[Card; HAND_SIZE] {
        &self.hand_p1
    }

    /// Player 2's dealt hand.
    pub fn hand_p2(&self) -> &[Card; HAND_SIZE] {
        &self.hand_p2
    }

    /// The bet grid.
    pub fn bet_grid(&self) -> &[BetLabel] {
        &self.bet_grid
    }

    /// Get a profile by id.
    pub fn profile(&self, id: ProfileId) -> &StrategyProfile {
        &self.profiles[id.index()]
    }

    /// All profiles in id order.
    pub fn profiles(&self) -> &[StrategyProfile] {
        &self.profiles
    }

    /// Cards kept by player 1 and player 2 under a profile.
    #[inline]
    pub fn retained(&self, id: ProfileId) -> (&[Card], &[Card]) {
        let retained = &self.retained[id.index()];
        (&retained.p1, &retained.p2)
    }

    /// Describe a profile with its bet labels.
    pub fn describe(&self, id: ProfileId) -> String {
        let profile = self.profile(id);
        format!(
            "p1 discard {} bet {} / p2 discard {} bet {}",
            profile.p1_discard,
            self.bet_grid[profile.p1_bet],
            profile.p2_discard,
            self.bet_grid[profile.p2_bet]
        )
    }

    /// Draw `m` independent k-card combinations from the deck.
    pub fn draw_randomness<R: Rng + ?Sized>(&self, rng: &mut R, m: usize) -> DrawBatch {
        let mut cards = Vec::with_capacity(m * self.k);
        for _ in 0..m {
            self.deck.sample_into(rng, self.k, &mut cards);
        }
        DrawBatch {
            k: self.k,
            len: m,
            cards,
        }
    }

    /// Every k-card combination of the deck, each exactly once.
    pub fn all_draws(&self) -> DrawBatch {
        let deck = self.deck.cards();
        let combos = combinations(deck.len(), self.k);
        let len = combos.len();
        let cards = combos.into_iter().flatten().map(|i| deck[i]).collect();
        DrawBatch { k: self.k, len, cards }
    }

    /// Every completed hand any profile can reach, without duplicates.
    pub fn reachable_hands(&self) -> Vec<Hand> {
        let draws = self.all_draws();
        let mut partials: Vec<Vec<Card>> = Vec::new();
        for choice in DiscardChoice::all(self.k) {
            partials.push(choice.retain(&self.hand_p1));
            partials.push(choice.retain(&self.hand_p2));
        }

        let mut hands: Vec<Hand> = partials
            .iter()
            .flat_map(|kept| draws.iter().map(move |drawn| Hand::complete(kept, drawn)))
            .collect();
        hands.sort_unstable();
        hands.dedup();
        hands
    }
}
