use crate::model::player::Seat;
use serde::{Deserialize, Serialize};

pub const WINNING_SCORE: u8 = 12;
pub const MAO_DE_ONZE_SCORE: u8 = 11;

/// Stake of the hand being played.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum HandPoints {
    One = 1,
    Three = 3,
    Six = 6,
    Nine = 9,
    Twelve = 12,
}

impl HandPoints {
    pub const fn get(self) -> u8 {
        self as u8
    }

    /// Next step of the raise ladder, or `None` when the stake is already maximal.
    pub const fn next(self) -> Option<HandPoints> {
        match self {
            HandPoints::One => Some(HandPoints::Three),
            HandPoints::Three => Some(HandPoints::Six),
            HandPoints::Six => Some(HandPoints::Nine),
            HandPoints::Nine => Some(HandPoints::Twelve),
            HandPoints::Twelve => None,
        }
    }

    pub const fn is_max(self) -> bool {
        matches!(self, HandPoints::Twelve)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScoreBoard {
    totals: [u8; 2],
}

impl ScoreBoard {
    pub const fn new() -> Self {
        Self { totals: [0; 2] }
    }

    pub const fn with_totals(totals: [u8; 2]) -> Self {
        Self { totals }
    }

    pub fn add_points(&mut self, seat: Seat, points: u8) {
        let total = &mut self.totals[seat.index()];
        *total = total.saturating_add(points).min(WINNING_SCORE);
    }

    pub fn score(&self, seat: Seat) -> u8 {
        self.totals[seat.index()]
    }

    pub fn standings(&self) -> &[u8; 2] {
        &self.totals
    }

    pub fn winner(&self) -> Option<Seat> {
        Seat::BOTH
            .iter()
            .copied()
            .find(|seat| self.score(*seat) >= WINNING_SCORE)
    }

    /// The seat playing a mão de onze: exactly one side sits on eleven.
    pub fn mao_de_onze_seat(&self) -> Option<Seat> {
        match (
            self.score(Seat::One) == MAO_DE_ONZE_SCORE,
            self.score(Seat::Two) == MAO_DE_ONZE_SCORE,
        ) {
            (true, false) => Some(Seat::One),
            (false, true) => Some(Seat::Two),
            _ => None,
        }
    }

    /// Raising is forbidden once either side reaches eleven.
    pub fn raising_allowed(&self) -> bool {
        self.totals.iter().all(|&score| score < MAO_DE_ONZE_SCORE)
    }
}

#[cfg(test)]
mod tests {
    use super::{HandPoints, ScoreBoard};
    use crate::model::player::Seat;

    #[test]
    fn ladder_climbs_to_twelve() {
        let mut stake = HandPoints::One;
        let mut steps = vec![stake.get()];
        while let Some(next) = stake.next() {
            stake = next;
            steps.push(stake.get());
        }
        assert_eq!(steps, vec![1, 3, 6, 9, 12]);
        assert!(stake.is_max());
    }

    #[test]
    fn scores_cap_at_twelve() {
        let mut board = ScoreBoard::with_totals([10, 0]);
        board.add_points(Seat::One, 6);
        assert_eq!(board.score(Seat::One), 12);
        assert_eq!(board.winner(), Some(Seat::One));
    }

    #[test]
    fn mao_de_onze_requires_exactly_one_side_on_eleven() {
        assert_eq!(ScoreBoard::with_totals([11, 4]).mao_de_onze_seat(), Some(Seat::One));
        assert_eq!(ScoreBoard::with_totals([3, 11]).mao_de_onze_seat(), Some(Seat::Two));
        assert_eq!(ScoreBoard::with_totals([11, 11]).mao_de_onze_seat(), None);
        assert!(!ScoreBoard::with_totals([11, 11]).raising_allowed());
        assert!(ScoreBoard::with_totals([10, 9]).raising_allowed());
    }
}
