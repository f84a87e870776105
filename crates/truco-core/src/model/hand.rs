use crate::model::card::Card;
use serde::{Deserialize, Serialize};

pub const HAND_SIZE: usize = 3;

/// Cards held by one player during a hand, in the order they were dealt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hand {
    cards: Vec<Card>,
}

impl Hand {
    pub fn new() -> Self {
        Self { cards: Vec::new() }
    }

    pub fn with_cards(cards: Vec<Card>) -> Self {
        Self { cards }
    }

    pub fn remove(&mut self, card: Card) -> bool {
        if let Some(index) = self.cards.iter().position(|&c| c == card) {
            self.cards.remove(index);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, card: Card) -> bool {
        self.cards.contains(&card)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Cards sorted strongest first for the given vira.
    pub fn sorted_by_strength(&self, vira: Card) -> Vec<Card> {
        let mut sorted = self.cards.clone();
        sorted.sort_by(|a, b| b.compare_value_with(*a, vira));
        sorted
    }
}

#[cfg(test)]
mod tests {
    use super::Hand;
    use crate::model::card::Card;

    fn cards(symbols: &[&str]) -> Vec<Card> {
        symbols.iter().map(|s| s.parse().unwrap()).collect()
    }

    #[test]
    fn remove_only_drops_present_cards() {
        let mut hand = Hand::with_cards(cards(&["4D", "AS", "2C"]));
        assert!(hand.remove("AS".parse().unwrap()));
        assert!(!hand.remove("AS".parse().unwrap()));
        assert_eq!(hand.cards(), cards(&["4D", "2C"]).as_slice());
    }

    #[test]
    fn keeps_deal_order() {
        let hand = Hand::with_cards(cards(&["KS", "4D", "3H"]));
        assert_eq!(hand.cards()[0], "KS".parse().unwrap());
    }

    #[test]
    fn sorted_by_strength_puts_manilhas_first() {
        let hand = Hand::with_cards(cards(&["3H", "5C", "KS"]));
        let vira: Card = "4D".parse().unwrap();
        assert_eq!(hand.sorted_by_strength(vira), cards(&["5C", "3H", "KS"]));
    }
}
