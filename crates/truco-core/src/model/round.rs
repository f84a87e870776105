use crate::model::card::Card;
use crate::model::player::Seat;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One of the (up to three) rounds of a hand: each seat shows a single card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Round {
    leader: Seat,
    plays: Vec<Play>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Play {
    pub seat: Seat,
    pub card: Card,
}

/// How a completed round ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundOutcome {
    Won(Seat),
    Drawn,
}

/// A completed round seen from one player's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundResult {
    Won,
    Lost,
    Drew,
}

impl RoundOutcome {
    pub fn winner(self) -> Option<Seat> {
        match self {
            RoundOutcome::Won(seat) => Some(seat),
            RoundOutcome::Drawn => None,
        }
    }

    pub fn result_for(self, seat: Seat) -> RoundResult {
        match self {
            RoundOutcome::Won(winner) if winner == seat => RoundResult::Won,
            RoundOutcome::Won(_) => RoundResult::Lost,
            RoundOutcome::Drawn => RoundResult::Drew,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoundError {
    #[error("round already complete")]
    RoundComplete,
    #[error("expected seat {expected} to play next but got {actual}")]
    OutOfTurn { expected: Seat, actual: Seat },
}

impl Round {
    pub fn new(leader: Seat) -> Self {
        Self {
            leader,
            plays: Vec::with_capacity(2),
        }
    }

    pub fn leader(&self) -> Seat {
        self.leader
    }

    pub fn plays(&self) -> &[Play] {
        &self.plays
    }

    pub fn is_complete(&self) -> bool {
        self.plays.len() == 2
    }

    /// The card already on the table that the next seat has to beat.
    pub fn card_to_beat(&self) -> Option<Play> {
        match self.plays.as_slice() {
            [first] => Some(*first),
            _ => None,
        }
    }

    pub fn expected_seat(&self) -> Seat {
        self.plays
            .last()
            .map(|play| play.seat.opponent())
            .unwrap_or(self.leader)
    }

    pub fn play(&mut self, seat: Seat, card: Card) -> Result<(), RoundError> {
        if self.is_complete() {
            return Err(RoundError::RoundComplete);
        }

        let expected = self.expected_seat();
        if expected != seat {
            return Err(RoundError::OutOfTurn {
                expected,
                actual: seat,
            });
        }

        self.plays.push(Play { seat, card });
        Ok(())
    }

    pub fn outcome(&self, vira: Card) -> Option<RoundOutcome> {
        let [first, second] = self.plays.as_slice() else {
            return None;
        };
        let outcome = match first.card.compare_value_with(second.card, vira) {
            core::cmp::Ordering::Greater => RoundOutcome::Won(first.seat),
            core::cmp::Ordering::Less => RoundOutcome::Won(second.seat),
            core::cmp::Ordering::Equal => RoundOutcome::Drawn,
        };
        Some(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::{Round, RoundError, RoundOutcome, RoundResult};
    use crate::model::card::Card;
    use crate::model::player::Seat;

    fn card(text: &str) -> Card {
        text.parse().unwrap()
    }

    #[test]
    fn enforces_alternating_turns() {
        let mut round = Round::new(Seat::Two);
        assert_eq!(
            round.play(Seat::One, card("4D")),
            Err(RoundError::OutOfTurn {
                expected: Seat::Two,
                actual: Seat::One
            })
        );
        round.play(Seat::Two, card("4D")).unwrap();
        assert_eq!(round.card_to_beat().map(|p| p.card), Some(card("4D")));
        round.play(Seat::One, card("5D")).unwrap();
        assert!(round.card_to_beat().is_none());
        assert_eq!(round.play(Seat::Two, card("6D")), Err(RoundError::RoundComplete));
    }

    #[test]
    fn stronger_card_wins() {
        let vira = card("7S");
        let mut round = Round::new(Seat::One);
        round.play(Seat::One, card("3C")).unwrap();
        round.play(Seat::Two, card("QD")).unwrap();
        assert_eq!(round.outcome(vira), Some(RoundOutcome::Won(Seat::Two)));
    }

    #[test]
    fn equal_ordinary_cards_draw() {
        let vira = card("7S");
        let mut round = Round::new(Seat::One);
        round.play(Seat::One, card("AC")).unwrap();
        assert_eq!(round.outcome(vira), None);
        round.play(Seat::Two, card("AD")).unwrap();
        assert_eq!(round.outcome(vira), Some(RoundOutcome::Drawn));
    }

    #[test]
    fn covered_cards_lose_to_anything_visible() {
        let vira = card("7S");
        let mut round = Round::new(Seat::One);
        round.play(Seat::One, Card::hidden()).unwrap();
        round.play(Seat::Two, card("4D")).unwrap();
        assert_eq!(round.outcome(vira), Some(RoundOutcome::Won(Seat::Two)));
    }

    #[test]
    fn results_follow_perspective() {
        let outcome = RoundOutcome::Won(Seat::One);
        assert_eq!(outcome.result_for(Seat::One), RoundResult::Won);
        assert_eq!(outcome.result_for(Seat::Two), RoundResult::Lost);
        assert_eq!(RoundOutcome::Drawn.result_for(Seat::Two), RoundResult::Drew);
    }
}
