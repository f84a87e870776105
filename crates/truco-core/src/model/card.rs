use crate::model::rank::Rank;
use crate::model::suit::Suit;
use core::cmp::Ordering;
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }

    /// The face-down card shown in place of a discard.
    pub const fn hidden() -> Self {
        Self::new(Rank::Hidden, Suit::Hidden)
    }

    pub const fn is_hidden(self) -> bool {
        self.rank.is_hidden() || self.suit.is_hidden()
    }

    pub fn is_manilha(self, vira: Card) -> bool {
        !self.is_hidden() && !vira.is_hidden() && self.rank == vira.rank.next()
    }

    /// Strength of this card in a hand with the given vira.
    ///
    /// Hidden cards are worth 0, ordinary cards 1..=9 by nominal rank with the
    /// manilha rank removed from the sequence, and manilhas 10..=13 by suit.
    pub fn relative_value(self, vira: Card) -> u8 {
        if self.is_hidden() {
            return 0;
        }
        if self.is_manilha(vira) {
            return self.suit.manilha_value();
        }
        let manilha_rank = vira.rank.next();
        if self.rank.value() > manilha_rank.value() {
            self.rank.value() - 1
        } else {
            self.rank.value()
        }
    }

    pub fn compare_value_with(self, other: Card, vira: Card) -> Ordering {
        self.relative_value(vira).cmp(&other.relative_value(vira))
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank, self.suit)
    }
}

/// A card picked by a strategy, shown face up or played covered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardToPlay {
    card: Card,
    discard: bool,
}

impl CardToPlay {
    pub const fn of(card: Card) -> Self {
        Self {
            card,
            discard: false,
        }
    }

    pub const fn discard(card: Card) -> Self {
        Self {
            card,
            discard: true,
        }
    }

    pub const fn card(self) -> Card {
        self.card
    }

    pub const fn is_discard(self) -> bool {
        self.discard
    }

    /// What the opponent sees once the card is on the table.
    pub const fn shown(self) -> Card {
        if self.discard { Card::hidden() } else { self.card }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CardError {
    #[error("card '{0}' must be a rank symbol followed by a suit symbol")]
    Malformed(String),
    #[error("unknown rank symbol '{0}'")]
    UnknownRank(char),
    #[error("unknown suit symbol '{0}'")]
    UnknownSuit(char),
    #[error("card '{0}' mixes a hidden rank or suit with a visible one")]
    PartiallyHidden(String),
}

impl FromStr for Card {
    type Err = CardError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let mut chars = value.trim().chars();
        let (Some(rank), Some(suit), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(CardError::Malformed(value.to_string()));
        };
        let rank = Rank::from_symbol(rank).ok_or(CardError::UnknownRank(rank))?;
        let suit = Suit::from_symbol(suit).ok_or(CardError::UnknownSuit(suit))?;
        if rank.is_hidden() != suit.is_hidden() {
            return Err(CardError::PartiallyHidden(value.to_string()));
        }
        Ok(Card::new(rank, suit))
    }
}

impl TryFrom<String> for Card {
    type Error = CardError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Card> for String {
    fn from(card: Card) -> Self {
        card.to_string()
    }
}
