use core::fmt;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Seat {
    One = 0,
    Two = 1,
}

impl Seat {
    pub const BOTH: [Seat; 2] = [Seat::One, Seat::Two];

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Seat::One),
            1 => Some(Seat::Two),
            _ => None,
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn opponent(self) -> Seat {
        match self {
            Seat::One => Seat::Two,
            Seat::Two => Seat::One,
        }
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Seat::One => "one",
            Seat::Two => "two",
        };
        f.write_str(label)
    }
}

/// A participant. The rule engine owns players; the bot engine only reads them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    uuid: Uuid,
    username: String,
    is_bot: bool,
}

impl Player {
    pub fn new(uuid: Uuid, username: impl Into<String>, is_bot: bool) -> Self {
        Self {
            uuid,
            username: username.into(),
            is_bot,
        }
    }

    /// An automated player; `username` selects its strategy.
    pub fn bot(username: impl Into<String>) -> Self {
        Self::new(Uuid::new_v4(), username, true)
    }

    pub fn human(username: impl Into<String>) -> Self {
        Self::new(Uuid::new_v4(), username, false)
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn is_bot(&self) -> bool {
        self.is_bot
    }
}

#[cfg(test)]
mod tests {
    use super::{Player, Seat};

    #[test]
    fn opponent_swaps_seats() {
        assert_eq!(Seat::One.opponent(), Seat::Two);
        assert_eq!(Seat::Two.opponent(), Seat::One);
    }

    #[test]
    fn index_roundtrip() {
        for (i, seat) in Seat::BOTH.iter().enumerate() {
            assert_eq!(Seat::from_index(i), Some(*seat));
            assert_eq!(seat.index(), i);
        }
        assert_eq!(Seat::from_index(2), None);
    }

    #[test]
    fn constructors_flag_automation() {
        let bot = Player::bot("dummy");
        let human = Player::human("alice");
        assert!(bot.is_bot());
        assert!(!human.is_bot());
        assert_ne!(bot.uuid(), human.uuid());
        assert_eq!(bot.username(), "dummy");
    }
}
