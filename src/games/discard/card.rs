//! Card representation for the discard game.
//!
//! This module provides the card types used throughout the game model:
//! - `Card`: A single playing card with rank and suit
//! - `Deck`: A set of unique cards that random draws are taken from
//!
//! Cards are written suit first, then numeric rank: `H2`, `S10`, `D14`
//! (ace). Ordering is by rank, with suit as a fixed tiebreak
//! `H < S < C < D`; the order exists only to give every hand one canonical
//! form.

use rand::seq::SliceRandom;
use rand::Rng;
use std::fmt;

use super::GameError;

/// Lowest rank (deuce).
pub const RANK_MIN: u8 = 2;
/// Highest rank (ace).
pub const RANK_MAX: u8 = 14;

/// Hearts, lowest in the suit tiebreak.
pub const SUIT_HEARTS: u8 = 0;
/// Spades.
pub const SUIT_SPADES: u8 = 1;
/// Clubs.
pub const SUIT_CLUBS: u8 = 2;
/// Diamonds, highest in the suit tiebreak.
pub const SUIT_DIAMONDS: u8 = 3;

/// Suit characters for display, indexed by suit.
const SUIT_CHARS: [char; 4] = ['H', 'S', 'C', 'D'];

/// A single playing card.
///
/// The id `(rank - 2) * 4 + suit` makes the derived ordering the canonical
/// card order.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Card {
    /// Card index 0-51.
    id: u8,
}

impl Card {
    /// Create a new card from rank (2-14) and suit (0-3).
    ///
    /// Unchecked outside debug builds; callers must pass in-range values.
    #[inline]
    pub(crate) fn new(rank: u8, suit: u8) -> Self {
        debug_assert!((RANK_MIN..=RANK_MAX).contains(&rank), "rank must be 2-14");
        debug_assert!(suit < 4, "suit must be 0-3");
        Self {
            id: (rank - RANK_MIN) * 4 + suit,
        }
    }

    /// Create a card from its ID (0-51). Unchecked outside debug builds.
    #[inline]
    pub(crate) fn from_id(id: u8) -> Self {
        debug_assert!(id < 52, "card id must be 0-51");
        Self { id }
    }

    /// Create a card from rank (2-14) and suit (0-3), rejecting values
    /// out of range.
    pub fn try_new(rank: u8, suit: u8) -> Result<Self, GameError> {
        if !(RANK_MIN..=RANK_MAX).contains(&rank) || suit >= 4 {
            return Err(GameError::InvalidCard(format!("rank {} suit {}", rank, suit)));
        }
        Ok(Self::new(rank, suit))
    }

    /// Parse a card from a string like "H2", "C11", "D14".
    pub fn parse(s: &str) -> Result<Self, GameError> {
        let invalid = || GameError::InvalidCard(s.to_string());

        let mut chars = s.trim().chars();
        let suit_char = chars.next().ok_or_else(invalid)?.to_ascii_uppercase();
        let suit = SUIT_CHARS.iter().position(|&c| c == suit_char).ok_or_else(invalid)?;
        let rank: u8 = chars.as_str().parse().map_err(|_| invalid())?;

        Self::try_new(rank, suit as u8).map_err(|_| invalid())
    }

    /// Parse a list of cards.
    pub fn parse_all<S: AsRef<str>>(cards: &[S]) -> Result<Vec<Self>, GameError> {
        cards.iter().map(|c| Self::parse(c.as_ref())).collect()
    }

    /// Get the card's ID (0-51).
    #[inline]
    pub fn id(&self) -> u8 {
        self.id
    }

    /// Get the card's rank (2-14).
    #[inline]
    pub fn rank(&self) -> u8 {
        self.id / 4 + RANK_MIN
    }

    /// Get the card's rank as a 0-based index (0 = deuce, 12 = ace).
    #[inline]
    pub fn rank_index(&self) -> u8 {
        self.id / 4
    }

    /// Get the card's suit (0-3).
    #[inline]
    pub fn suit(&self) -> u8 {
        self.id % 4
    }

    /// Get suit character for display.
    pub fn suit_char(&self) -> char {
        SUIT_CHARS[self.suit() as usize]
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.suit_char(), self.rank())
    }
}

impl fmt::Debug for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl serde::Serialize for Card {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for Card {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Card::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Bitmask over card ids.
#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub struct CardSet(u64);

impl CardSet {
    /// Insert a card, returning `false` if it was already present.
    #[inline]
    pub fn insert(&mut self, card: Card) -> bool {
        let bit = 1u64 << card.id();
        let fresh = self.0 & bit == 0;
        self.0 |= bit;
        fresh
    }

    /// Check if the set contains a card.
    #[inline]
    pub fn contains(&self, card: Card) -> bool {
        self.0 & (1u64 << card.id()) != 0
    }
}

/// A set of unique cards that random draws are taken from.
#[derive(Clone, PartialEq, Eq)]
pub struct Deck {
    /// Cards in canonical order.
    cards: Vec<Card>,
}

impl Deck {
    /// The standard 52-card deck (4 suits × 13 ranks).
    pub fn standard() -> Self {
        Self {
            cards: (0..52).map(Card::from_id).collect(),
        }
    }

    /// Build a deck from explicit cards, rejecting duplicates.
    pub fn from_cards(cards: Vec<Card>) -> Result<Self, GameError> {
        let mut seen = CardSet::default();
        for &card in &cards {
            if !seen.insert(card) {
                return Err(GameError::DuplicateCard(card));
            }
        }
        let mut cards = cards;
        cards.sort_unstable();
        Ok(Self { cards })
    }

    /// The standard deck with specific cards removed.
    pub fn without(dead_cards: &[Card]) -> Self {
        let mut dead = CardSet::default();
        for &card in dead_cards {
            dead.insert(card);
        }
        Self {
            cards: (0..52).map(Card::from_id).filter(|&c| !dead.contains(c)).collect(),
        }
    }

    /// Number of cards in the deck.
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Check if the deck is empty.
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Get the cards as a slice.
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Check if a card is in the deck.
    pub fn contains(&self, card: Card) -> bool {
        self.cards.binary_search(&card).is_ok()
    }

    /// Sample `k` distinct cards uniformly, appending them to `out`.
    ///
    /// The cards form an unordered combination; their order in `out` is
    /// irrelevant to callers.
    #[inline]
    pub fn sample_into<R: Rng + ?Sized>(&self, rng: &mut R, k: usize, out: &mut Vec<Card>) {
        out.extend(self.cards.choose_multiple(rng, k).copied());
    }

    /// Sample `k` distinct cards uniformly.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R, k: usize) -> Vec<Card> {
        let mut out = Vec::with_capacity(k);
        self.sample_into(rng, k, &mut out);
        out
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Debug for Deck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Deck({} cards)", self.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_card_creation() {
        let ace_diamonds = Card::new(14, SUIT_DIAMONDS);
        assert_eq!(ace_diamonds.rank(), 14);
        assert_eq!(ace_diamonds.rank_index(), 12);
        assert_eq!(ace_diamonds.suit(), SUIT_DIAMONDS);
        assert_eq!(ace_diamonds.to_string(), "D14");

        let two_hearts = Card::new(2, SUIT_HEARTS);
        assert_eq!(two_hearts.id(), 0);
        assert_eq!(two_hearts.to_string(), "H2");
    }

    #[test]
    fn test_checked_construction() {
        assert_eq!(Card::try_new(14, SUIT_DIAMONDS), Ok(Card::new(14, SUIT_DIAMONDS)));
        assert_eq!(Card::try_new(2, SUIT_HEARTS).unwrap().id(), 0);
        assert!(matches!(Card::try_new(15, SUIT_HEARTS), Err(GameError::InvalidCard(_))));
        assert!(matches!(Card::try_new(1, SUIT_HEARTS), Err(GameError::InvalidCard(_))));
        assert!(matches!(Card::try_new(0, SUIT_HEARTS), Err(GameError::InvalidCard(_))));
        assert!(matches!(Card::try_new(2, 4), Err(GameError::InvalidCard(_))));
    }

    #[test]
    fn test_card_parsing() {
        assert_eq!(Card::parse("H2").unwrap().to_string(), "H2");
        assert_eq!(Card::parse("C11").unwrap().to_string(), "C11");
        assert_eq!(Card::parse("s10").unwrap().to_string(), "S10");
        assert!(Card::parse("X5").is_err());
        assert!(Card::parse("H1").is_err());
        assert!(Card::parse("H15").is_err());
        assert!(Card::parse("H").is_err());
        assert!(Card::parse("").is_err());
    }

    #[test]
    fn test_canonical_order() {
        let s3 = Card::parse("S3").unwrap();
        let c3 = Card::parse("C3").unwrap();
        let h4 = Card::parse("H4").unwrap();
        let d2 = Card::parse("D2").unwrap();

        // Rank first, then H < S < C < D.
        assert!(d2 < s3);
        assert!(s3 < c3);
        assert!(c3 < h4);
    }

    #[test]
    fn test_deck() {
        let deck = Deck::standard();
        assert_eq!(deck.len(), 52);
        assert!(deck.contains(Card::parse("D14").unwrap()));

        let dead = Card::parse_all(&["D14", "H2"]).unwrap();
        let deck = Deck::without(&dead);
        assert_eq!(deck.len(), 50);
        assert!(!deck.contains(dead[0]));
        assert!(!deck.contains(dead[1]));
    }

    #[test]
    fn test_deck_rejects_duplicates() {
        let cards = Card::parse_all(&["H2", "S9", "H2"]).unwrap();
        assert!(matches!(Deck::from_cards(cards), Err(GameError::DuplicateCard(_))));
    }

    #[test]
    fn test_sample_distinct() {
        let mut rng = StdRng::seed_from_u64(42);
        let deck = Deck::without(&Card::parse_all(&["H2", "H3"]).unwrap());
        for _ in 0..100 {
            let drawn = deck.sample(&mut rng, 5);
            assert_eq!(drawn.len(), 5);
            let mut seen = CardSet::default();
            for card in drawn {
                assert!(deck.contains(card));
                assert!(seen.insert(card));
            }
        }
    }
}
