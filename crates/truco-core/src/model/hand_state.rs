use crate::model::card::{Card, CardToPlay};
use crate::model::deck::Deck;
use crate::model::hand::{HAND_SIZE, Hand};
use crate::model::player::Seat;
use crate::model::round::{Round, RoundError, RoundOutcome};
use crate::model::score::{HandPoints, ScoreBoard};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Lifecycle of a single hand (three rounds at most).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandPhase {
    WaitingMaoDeOnze,
    NoCard,
    OneCard,
    WaitingRaiseResponse,
    Done,
}

impl fmt::Display for HandPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            HandPhase::WaitingMaoDeOnze => "waiting mao de onze",
            HandPhase::NoCard => "no card",
            HandPhase::OneCard => "one card",
            HandPhase::WaitingRaiseResponse => "waiting raise response",
            HandPhase::Done => "done",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRaise {
    pub raiser: Seat,
    pub points: HandPoints,
}

/// Final result of a hand. `winner` is `None` when every round was drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandResult {
    pub winner: Option<Seat>,
    pub points: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandError {
    #[error("hand is already finished")]
    HandDone,
    #[error("seat {actual} cannot act now; seat {expected} is expected")]
    NotYourTurn { expected: Seat, actual: Seat },
    #[error("cannot {action} while the hand is in phase '{phase}'")]
    UnexpectedPhase {
        phase: HandPhase,
        action: &'static str,
    },
    #[error("card {0} is not in the player's hand")]
    CardNotInHand(Card),
    #[error("cards cannot be discarded in the first round")]
    DiscardInFirstRound,
    #[error("stake is already at its maximum")]
    MaxStake,
    #[error("seat {0} made the last raise and must wait for the opponent")]
    ConsecutiveRaise(Seat),
    #[error("raising is disabled while a side has eleven points")]
    RaisingDisabled,
    #[error("deck has {available} cards but dealing needs {needed}")]
    DeckExhausted { needed: usize, available: usize },
    #[error(transparent)]
    Round(#[from] RoundError),
}

#[derive(Debug, Clone)]
pub struct HandState {
    vira: Card,
    hands: [Hand; 2],
    first_to_play: Seat,
    current_round: Round,
    outcomes: Vec<RoundOutcome>,
    open_cards: Vec<Card>,
    points: HandPoints,
    pending: Option<PendingRaise>,
    last_raiser: Option<Seat>,
    mao_de_onze_seat: Option<Seat>,
    raising_allowed: bool,
    phase: HandPhase,
    result: Option<HandResult>,
}

impl HandState {
    /// Deals three cards to each seat (seat one first) and turns up the vira.
    pub fn deal(deck: &Deck, first_to_play: Seat, scores: &ScoreBoard) -> Result<Self, HandError> {
        let needed = HAND_SIZE * 2 + 1;
        let cards = deck.cards();
        if cards.len() < needed {
            return Err(HandError::DeckExhausted {
                needed,
                available: cards.len(),
            });
        }

        let hands = [
            Hand::with_cards(cards[..HAND_SIZE].to_vec()),
            Hand::with_cards(cards[HAND_SIZE..HAND_SIZE * 2].to_vec()),
        ];
        Ok(Self::from_hands(hands, cards[HAND_SIZE * 2], first_to_play, scores))
    }

    pub fn from_hands(hands: [Hand; 2], vira: Card, first_to_play: Seat, scores: &ScoreBoard) -> Self {
        let mao_de_onze_seat = scores.mao_de_onze_seat();
        let phase = if mao_de_onze_seat.is_some() {
            HandPhase::WaitingMaoDeOnze
        } else {
            HandPhase::NoCard
        };

        Self {
            vira,
            hands,
            first_to_play,
            current_round: Round::new(first_to_play),
            outcomes: Vec::with_capacity(3),
            open_cards: vec![vira],
            points: HandPoints::One,
            pending: None,
            last_raiser: None,
            mao_de_onze_seat,
            raising_allowed: scores.raising_allowed(),
            phase,
            result: None,
        }
    }

    pub fn vira(&self) -> Card {
        self.vira
    }

    pub fn hand(&self, seat: Seat) -> &Hand {
        &self.hands[seat.index()]
    }

    pub fn phase(&self) -> HandPhase {
        self.phase
    }

    pub fn points(&self) -> HandPoints {
        self.points
    }

    pub fn pending_raise(&self) -> Option<PendingRaise> {
        self.pending
    }

    pub fn last_raiser(&self) -> Option<Seat> {
        self.last_raiser
    }

    pub fn first_to_play(&self) -> Seat {
        self.first_to_play
    }

    pub fn current_round(&self) -> &Round {
        &self.current_round
    }

    pub fn round_outcomes(&self) -> &[RoundOutcome] {
        &self.outcomes
    }

    /// Every card shown during the hand, vira included.
    pub fn open_cards(&self) -> &[Card] {
        &self.open_cards
    }

    pub fn is_mao_de_onze(&self) -> bool {
        self.mao_de_onze_seat.is_some()
    }

    pub fn raising_allowed(&self) -> bool {
        self.raising_allowed
    }

    pub fn result(&self) -> Option<HandResult> {
        self.result
    }

    pub fn is_done(&self) -> bool {
        matches!(self.phase, HandPhase::Done)
    }

    /// The seat that owes the next action, if any.
    pub fn current_seat(&self) -> Option<Seat> {
        match self.phase {
            HandPhase::WaitingMaoDeOnze => self.mao_de_onze_seat,
            HandPhase::NoCard | HandPhase::OneCard => Some(self.current_round.expected_seat()),
            HandPhase::WaitingRaiseResponse => self.pending.map(|p| p.raiser.opponent()),
            HandPhase::Done => None,
        }
    }

    pub fn can_raise(&self, seat: Seat) -> bool {
        matches!(self.phase, HandPhase::NoCard | HandPhase::OneCard)
            && self.current_seat() == Some(seat)
            && self.raising_allowed
            && !self.points.is_max()
            && self.last_raiser != Some(seat)
    }

    pub fn play(&mut self, seat: Seat, choice: CardToPlay) -> Result<(), HandError> {
        self.expect_phase(&[HandPhase::NoCard, HandPhase::OneCard], "play a card")?;
        self.expect_turn(seat)?;

        let card = choice.card();
        if card.is_hidden() || !self.hands[seat.index()].contains(card) {
            return Err(HandError::CardNotInHand(card));
        }
        if choice.is_discard() && self.outcomes.is_empty() {
            return Err(HandError::DiscardInFirstRound);
        }

        let shown = choice.shown();
        self.current_round.play(seat, shown)?;
        self.hands[seat.index()].remove(card);
        self.open_cards.push(shown);

        let Some(outcome) = self.current_round.outcome(self.vira) else {
            self.phase = HandPhase::OneCard;
            return Ok(());
        };

        self.outcomes.push(outcome);
        if let Some(winner) = hand_winner(&self.outcomes) {
            self.finish(winner, self.points.get());
            return Ok(());
        }

        let next_leader = outcome.winner().unwrap_or(self.current_round.leader());
        self.current_round = Round::new(next_leader);
        self.phase = HandPhase::NoCard;
        Ok(())
    }

    pub fn raise(&mut self, seat: Seat) -> Result<(), HandError> {
        match self.phase {
            HandPhase::WaitingRaiseResponse => {
                self.expect_turn(seat)?;
                let Some(pending) = self.pending else {
                    return Err(HandError::UnexpectedPhase {
                        phase: self.phase,
                        action: "raise",
                    });
                };
                let next = pending.points.next().ok_or(HandError::MaxStake)?;
                self.points = pending.points;
                self.pending = Some(PendingRaise {
                    raiser: seat,
                    points: next,
                });
                self.last_raiser = Some(seat);
                Ok(())
            }
            HandPhase::NoCard | HandPhase::OneCard => {
                self.expect_turn(seat)?;
                if !self.raising_allowed {
                    return Err(HandError::RaisingDisabled);
                }
                if self.last_raiser == Some(seat) {
                    return Err(HandError::ConsecutiveRaise(seat));
                }
                let next = self.points.next().ok_or(HandError::MaxStake)?;
                self.pending = Some(PendingRaise {
                    raiser: seat,
                    points: next,
                });
                self.last_raiser = Some(seat);
                self.phase = HandPhase::WaitingRaiseResponse;
                Ok(())
            }
            HandPhase::Done => Err(HandError::HandDone),
            phase => Err(HandError::UnexpectedPhase {
                phase,
                action: "raise",
            }),
        }
    }

    /// Accepts the mão de onze or the pending raise.
    pub fn accept(&mut self, seat: Seat) -> Result<(), HandError> {
        self.expect_phase(
            &[HandPhase::WaitingMaoDeOnze, HandPhase::WaitingRaiseResponse],
            "accept",
        )?;
        self.expect_turn(seat)?;

        if self.phase == HandPhase::WaitingMaoDeOnze {
            self.points = HandPoints::Three;
        } else if let Some(pending) = self.pending.take() {
            self.points = pending.points;
        }
        self.phase = self.play_phase();
        Ok(())
    }

    /// Declines the mão de onze or the pending raise, conceding the hand.
    pub fn quit(&mut self, seat: Seat) -> Result<(), HandError> {
        self.expect_phase(
            &[HandPhase::WaitingMaoDeOnze, HandPhase::WaitingRaiseResponse],
            "quit",
        )?;
        self.expect_turn(seat)?;

        let points = if self.phase == HandPhase::WaitingMaoDeOnze {
            HandPoints::One.get()
        } else {
            self.points.get()
        };
        self.pending = None;
        self.finish(Some(seat.opponent()), points);
        Ok(())
    }

    fn play_phase(&self) -> HandPhase {
        if self.current_round.plays().is_empty() {
            HandPhase::NoCard
        } else {
            HandPhase::OneCard
        }
    }

    fn finish(&mut self, winner: Option<Seat>, points: u8) {
        self.result = Some(HandResult { winner, points });
        self.phase = HandPhase::Done;
    }

    fn expect_phase(&self, allowed: &[HandPhase], action: &'static str) -> Result<(), HandError> {
        if self.phase == HandPhase::Done {
            return Err(HandError::HandDone);
        }
        if allowed.contains(&self.phase) {
            Ok(())
        } else {
            Err(HandError::UnexpectedPhase {
                phase: self.phase,
                action,
            })
        }
    }

    fn expect_turn(&self, seat: Seat) -> Result<(), HandError> {
        match self.current_seat() {
            Some(expected) if expected == seat => Ok(()),
            Some(expected) => Err(HandError::NotYourTurn {
                expected,
                actual: seat,
            }),
            None => Err(HandError::HandDone),
        }
    }
}

/// Decides the hand from the rounds played so far.
///
/// Returns `None` while the hand is still open and `Some(None)` when all three
/// rounds were drawn.
fn hand_winner(outcomes: &[RoundOutcome]) -> Option<Option<Seat>> {
    use RoundOutcome::{Drawn, Won};

    match *outcomes {
        [Won(a), Won(b)] if a == b => Some(Some(a)),
        [Won(a), Drawn] | [Drawn, Won(a)] => Some(Some(a)),
        [Won(a), Won(_), Drawn] => Some(Some(a)),
        [_, _, Won(c)] => Some(Some(c)),
        [_, _, Drawn] => Some(None),
        _ => None,
    }
}
