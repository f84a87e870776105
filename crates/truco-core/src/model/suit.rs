use core::fmt;
use serde::{Deserialize, Serialize};

/// Card suit. The declaration order is the manilha tiebreak order, so
/// `Clubs` (the zap) outranks every other manilha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Suit {
    Hidden = 0,
    Diamonds = 1,
    Spades = 2,
    Hearts = 3,
    Clubs = 4,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Diamonds, Suit::Spades, Suit::Hearts, Suit::Clubs];

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Suit::Diamonds),
            1 => Some(Suit::Spades),
            2 => Some(Suit::Hearts),
            3 => Some(Suit::Clubs),
            _ => None,
        }
    }

    /// Strength of a manilha of this suit.
    pub const fn manilha_value(self) -> u8 {
        match self {
            Suit::Hidden => 0,
            Suit::Diamonds => 10,
            Suit::Spades => 11,
            Suit::Hearts => 12,
            Suit::Clubs => 13,
        }
    }

    pub const fn is_hidden(self) -> bool {
        matches!(self, Suit::Hidden)
    }

    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol.to_ascii_uppercase() {
            'D' => Some(Suit::Diamonds),
            'S' => Some(Suit::Spades),
            'H' => Some(Suit::Hearts),
            'C' => Some(Suit::Clubs),
            'X' => Some(Suit::Hidden),
            _ => None,
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Suit::Hidden => "X",
            Suit::Diamonds => "D",
            Suit::Spades => "S",
            Suit::Hearts => "H",
            Suit::Clubs => "C",
        };
        f.write_str(symbol)
    }
}
