//! Five-card hand evaluation.
//!
//! Used to tabulate a score table when no precomputed dataset is supplied.
//! Each hand gets a score `category + 1 + kickers / 2^20`: the integer part
//! is the hand category (1 = high card … 9 = straight flush) and the
//! fraction breaks ties inside a category, so every score lies in (0, 10)
//! and flooring a score keeps only the category.

use std::cmp::Ordering;

use super::card::Card;
use super::hand::Hand;

/// Hand rank categories, ordered from worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HandCategory {
    /// No pair.
    HighCard = 0,
    /// Two cards of one rank.
    OnePair = 1,
    /// Two pairs.
    TwoPair = 2,
    /// Three cards of one rank.
    ThreeOfAKind = 3,
    /// Five consecutive ranks, ace low or high.
    Straight = 4,
    /// Five cards of one suit.
    Flush = 5,
    /// Three of a kind plus a pair.
    FullHouse = 6,
    /// Four cards of one rank.
    FourOfAKind = 7,
    /// A straight in one suit.
    StraightFlush = 8,
}

impl HandCategory {
    /// Get the category name.
    pub fn name(&self) -> &'static str {
        match self {
            HandCategory::HighCard => "High Card",
            HandCategory::OnePair => "One Pair",
            HandCategory::TwoPair => "Two Pair",
            HandCategory::ThreeOfAKind => "Three of a Kind",
            HandCategory::Straight => "Straight",
            HandCategory::Flush => "Flush",
            HandCategory::FullHouse => "Full House",
            HandCategory::FourOfAKind => "Four of a Kind",
            HandCategory::StraightFlush => "Straight Flush",
        }
    }
}

/// Bits below the category in a packed rank.
const KICKER_BITS: u32 = 20;

/// A hand rank that can be compared.
/// Higher values are better hands.
/// Format: category (4 bits) | kicker1 (4 bits) | kicker2 (4 bits) | ...
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandRank(u32);

impl HandRank {
    /// Create a new hand rank.
    fn new(category: HandCategory, kickers: &[u8]) -> Self {
        let mut value = (category as u32) << KICKER_BITS;
        for (i, &k) in kickers.iter().take(5).enumerate() {
            value |= (k as u32) << (16 - i * 4);
        }
        Self(value)
    }

    /// Get the raw rank value for comparison.
    pub fn value(&self) -> u32 {
        self.0
    }

    /// Get the hand category.
    pub fn category(&self) -> HandCategory {
        match self.0 >> KICKER_BITS {
            0 => HandCategory::HighCard,
            1 => HandCategory::OnePair,
            2 => HandCategory::TwoPair,
            3 => HandCategory::ThreeOfAKind,
            4 => HandCategory::Straight,
            5 => HandCategory::Flush,
            6 => HandCategory::FullHouse,
            7 => HandCategory::FourOfAKind,
            8 => HandCategory::StraightFlush,
            _ => HandCategory::HighCard,
        }
    }

    /// Score-table value of this rank, in (0, 10).
    pub fn score(&self) -> f64 {
        let kickers = self.0 & ((1 << KICKER_BITS) - 1);
        (self.0 >> KICKER_BITS) as f64 + 1.0 + kickers as f64 / (1u32 << KICKER_BITS) as f64
    }
}

impl PartialOrd for HandRank {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HandRank {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

/// Hand evaluator for 5-card hands.
#[derive(Debug, Clone, Default)]
pub struct HandEvaluator;

impl HandEvaluator {
    /// Create a new hand evaluator.
    pub fn new() -> Self {
        Self
    }

    /// Evaluate a 5-card hand.
    pub fn evaluate(&self, hand: &Hand) -> HandRank {
        self.evaluate_5(hand.cards())
    }

    /// Evaluate five cards.
    pub fn evaluate_5(&self, cards: &[Card; 5]) -> HandRank {
        // Build rank counts and suit counts
        let mut rank_counts = [0u8; 13];
        let mut suit_counts = [0u8; 4];
        let mut rank_bits = 0u16; // Bitmask of ranks present

        for card in cards {
            rank_counts[card.rank_index() as usize] += 1;
            suit_counts[card.suit() as usize] += 1;
            rank_bits |= 1 << card.rank_index();
        }

        let is_flush = suit_counts.iter().any(|&c| c == 5);
        let straight_high = self.find_straight(rank_bits);

        if is_flush {
            if let Some(high) = straight_high {
                return HandRank::new(HandCategory::StraightFlush, &[high]);
            }
        }

        // Group ranks by multiplicity, highest rank first
        let mut quads = Vec::with_capacity(1);
        let mut trips = Vec::with_capacity(1);
        let mut pairs = Vec::with_capacity(2);
        let mut singles = Vec::with_capacity(5);

        for rank in (0..13u8).rev() {
            match rank_counts[rank as usize] {
                4 => quads.push(rank),
                3 => trips.push(rank),
                2 => pairs.push(rank),
                1 => singles.push(rank),
                _ => {}
            }
        }

        if let Some(&quad) = quads.first() {
            let kicker = singles.first().copied().unwrap_or(0);
            return HandRank::new(HandCategory::FourOfAKind, &[quad, kicker]);
        }

        if let (Some(&trip), Some(&pair)) = (trips.first(), pairs.first()) {
            return HandRank::new(HandCategory::FullHouse, &[trip, pair]);
        }

        if is_flush {
            // Singles already hold all five ranks in descending order.
            return HandRank::new(HandCategory::Flush, &singles);
        }

        if let Some(high) = straight_high {
            return HandRank::new(HandCategory::Straight, &[high]);
        }

        if let Some(&trip) = trips.first() {
            let mut kickers = vec![trip];
            kickers.extend(singles.iter().take(2));
            return HandRank::new(HandCategory::ThreeOfAKind, &kickers);
        }

        if pairs.len() == 2 {
            let kicker = singles.first().copied().unwrap_or(0);
            return HandRank::new(HandCategory::TwoPair, &[pairs[0], pairs[1], kicker]);
        }

        if let Some(&pair) = pairs.first() {
            let mut kickers = vec![pair];
            kickers.extend(singles.iter().take(3));
            return HandRank::new(HandCategory::OnePair, &kickers);
        }

        HandRank::new(HandCategory::HighCard, &singles)
    }

    /// Find the highest straight from a rank bitmask.
    /// Returns the high card index of the straight, or None if no straight.
    fn find_straight(&self, rank_bits: u16) -> Option<u8> {
        // Ace-high down to six-high
        for high in (4..=12u8).rev() {
            let mask = 0b11111u16 << (high - 4);
            if rank_bits & mask == mask {
                return Some(high);
            }
        }

        // Wheel: A-2-3-4-5, five-high
        let wheel = 0b1_0000_0000_1111u16;
        if rank_bits & wheel == wheel {
            return Some(3);
        }

        None
    }

    /// Compare two hands. Returns 1 if `left` wins, -1 if `right` wins, 0 for tie.
    pub fn compare(&self, left: &Hand, right: &Hand) -> i32 {
        match self.evaluate(left).cmp(&self.evaluate(right)) {
            Ordering::Greater => 1,
            Ordering::Less => -1,
            Ordering::Equal => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hand(s: &str) -> Hand {
        Hand::parse(s).unwrap()
    }

    #[test]
    fn test_categories() {
        let eval = HandEvaluator::new();
        let cases = [
            ("S14 D13 H12 C11 S9", HandCategory::HighCard),
            ("S14 D14 H13 C12 S11", HandCategory::OnePair),
            ("S14 D14 H13 C13 S11", HandCategory::TwoPair),
            ("S14 D14 H14 C13 S11", HandCategory::ThreeOfAKind),
            ("S10 D9 H8 C7 S6", HandCategory::Straight),
            ("S14 D13 H12 C11 S10", HandCategory::Straight),
            ("S5 D4 H3 C2 S14", HandCategory::Straight),
            ("S14 S13 S9 S7 S2", HandCategory::Flush),
            ("S14 D14 H14 C13 D13", HandCategory::FullHouse),
            ("S14 D14 H14 C14 S13", HandCategory::FourOfAKind),
            ("S9 S8 S7 S6 S5", HandCategory::StraightFlush),
            ("D10 D11 D12 D13 D14", HandCategory::StraightFlush),
        ];
        for (cards, category) in cases {
            assert_eq!(eval.evaluate(&hand(cards)).category(), category, "{}", cards);
        }
    }

    #[test]
    fn test_wheel_is_lowest_straight() {
        let eval = HandEvaluator::new();
        let wheel = hand("S5 D4 H3 C2 S14");
        let six_high = hand("S6 D5 H4 C3 S2");
        assert_eq!(eval.compare(&six_high, &wheel), 1);
    }

    #[test]
    fn test_kickers_break_ties() {
        let eval = HandEvaluator::new();
        let better = hand("S14 D14 H13 C9 S4");
        let worse = hand("C14 H14 D12 S11 D10");
        assert_eq!(eval.compare(&better, &worse), 1);
        assert_eq!(eval.compare(&worse, &better), -1);

        // Same ranks, different suits.
        let a = hand("S14 D13 H12 C11 S9");
        let b = hand("H14 C13 S12 D11 C9");
        assert_eq!(eval.compare(&a, &b), 0);
    }

    #[test]
    fn test_score_range_and_floor() {
        let eval = HandEvaluator::new();
        let royal = eval.evaluate(&hand("D10 D11 D12 D13 D14")).score();
        let low = eval.evaluate(&hand("S7 D5 H4 C3 S2")).score();
        assert!(low > 0.0 && low < 2.0);
        assert!(royal > 9.0 && royal < 10.0);
        assert_eq!(low.floor(), 1.0);

        let pair = eval.evaluate(&hand("S14 D14 H13 C12 S11")).score();
        assert_eq!(pair.floor(), 2.0);
    }

    #[test]
    fn test_score_order_matches_rank_order() {
        let eval = HandEvaluator::new();
        let flush = eval.evaluate(&hand("D7 D11 D12 D13 D14"));
        let royal = eval.evaluate(&hand("D10 D11 D12 D13 D14"));
        assert!(flush < royal);
        assert!(flush.score() < royal.score());
    }
}
