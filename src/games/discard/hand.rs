//! Five-card hands and discard choices.
//!
//! A [`Hand`] is always kept in canonical (sorted) order so it can be used
//! directly as a score-table key: any permutation of the same five cards
//! builds the same value. A [`DiscardChoice`] picks which positions of a
//! dealt hand a player throws away.

use std::fmt;

use super::card::{Card, CardSet};
use super::GameError;

/// Number of cards in a hand.
pub const HAND_SIZE: usize = 5;

/// A canonical 5-card hand.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Hand([Card; HAND_SIZE]);

impl Hand {
    /// Build a hand from exactly five distinct cards in any order.
    pub fn new(cards: &[Card]) -> Result<Self, GameError> {
        if cards.len() != HAND_SIZE {
            return Err(GameError::WrongHandSize(cards.len()));
        }
        let mut seen = CardSet::default();
        for &card in cards {
            if !seen.insert(card) {
                return Err(GameError::DuplicateCard(card));
            }
        }
        let mut sorted = [cards[0]; HAND_SIZE];
        sorted.copy_from_slice(cards);
        sorted.sort_unstable();
        Ok(Self(sorted))
    }

    /// Complete a retained partial hand with drawn cards.
    ///
    /// `retained.len() + drawn.len()` must be five and the cards must be
    /// distinct; the game model guarantees both by drawing from a deck
    /// that excludes every dealt card.
    #[inline]
    pub fn complete(retained: &[Card], drawn: &[Card]) -> Self {
        debug_assert_eq!(retained.len() + drawn.len(), HAND_SIZE);
        let mut cards = [Card::from_id(0); HAND_SIZE];
        cards[..retained.len()].copy_from_slice(retained);
        cards[retained.len()..].copy_from_slice(drawn);
        cards.sort_unstable();
        Self(cards)
    }

    /// Parse a score-table key.
    ///
    /// Accepts whitespace or comma separated cards, optionally wrapped in
    /// brackets and quotes: `['S3' 'C4' 'D7' 'C11' 'D12']`, `S3 C4 D7 C11 D12`.
    pub fn parse(key: &str) -> Result<Self, GameError> {
        let cards = key
            .split(|c: char| c.is_whitespace() || matches!(c, ',' | '[' | ']' | '\'' | '"'))
            .filter(|token| !token.is_empty())
            .map(Card::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(&cards)
    }

    /// Cards in canonical order.
    pub fn cards(&self) -> &[Card; HAND_SIZE] {
        &self.0
    }
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, card) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", card)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self)
    }
}

/// Positions of a dealt hand that a player discards.
///
/// Stored as a bitmask over positions 0-4, so out-of-range indices cannot
/// be represented.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct DiscardChoice(u8);

impl DiscardChoice {
    /// Build a choice from hand positions.
    pub fn from_indices(indices: &[usize]) -> Result<Self, GameError> {
        let mut mask = 0u8;
        for &i in indices {
            if i >= HAND_SIZE {
                return Err(GameError::InvalidDiscardIndex(i));
            }
            mask |= 1 << i;
        }
        Ok(Self(mask))
    }

    /// Every choice of exactly `k` positions, in lexicographic order of
    /// the sorted index lists.
    pub fn all(k: usize) -> Vec<Self> {
        combinations(HAND_SIZE, k)
            .into_iter()
            .map(|indices| {
                Self(indices.iter().fold(0u8, |mask, &i| mask | (1 << i)))
            })
            .collect()
    }

    /// Number of discarded positions.
    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Whether nothing is discarded.
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Whether a position is discarded.
    #[inline]
    pub fn discards(&self, position: usize) -> bool {
        self.0 & (1 << position) != 0
    }

    /// Discarded positions in increasing order.
    pub fn indices(&self) -> Vec<usize> {
        (0..HAND_SIZE).filter(|&i| self.discards(i)).collect()
    }

    /// Cards kept from a dealt hand, preserving their relative order.
    pub fn retain(&self, dealt: &[Card; HAND_SIZE]) -> Vec<Card> {
        dealt
            .iter()
            .enumerate()
            .filter(|&(i, _)| !self.discards(i))
            .map(|(_, &card)| card)
            .collect()
    }
}

impl fmt::Display for DiscardChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.indices())
    }
}

impl fmt::Debug for DiscardChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Discard{}", self)
    }
}

/// All `k`-subsets of `0..n` as sorted index lists, in lexicographic order.
pub fn combinations(n: usize, k: usize) -> Vec<Vec<usize>> {
    if k > n {
        return Vec::new();
    }
    let mut result = Vec::new();
    let mut indices: Vec<usize> = (0..k).collect();
    loop {
        result.push(indices.clone());

        // Find the rightmost index that can still move right.
        let mut i = k;
        loop {
            if i == 0 {
                return result;
            }
            i -= 1;
            if indices[i] != i + n - k {
                break;
            }
        }
        indices[i] += 1;
        for j in i + 1..k {
            indices[j] = indices[j - 1] + 1;
        }
    }
}

/// Binomial coefficient `C(n, k)`.
pub fn binomial(n: usize, k: usize) -> usize {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    (0..k).fold(1usize, |acc, i| acc * (n - i) / (i + 1))
}
