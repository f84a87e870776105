use crate::game::intel::Intel;
use crate::model::card::CardToPlay;
use crate::model::deck::Deck;
use crate::model::hand::{HAND_SIZE, Hand};
use crate::model::hand_state::{HandError, HandState};
use crate::model::player::{Player, Seat};
use crate::model::score::ScoreBoard;
use rand::SeedableRng;
use rand::rngs::StdRng;
use thiserror::Error;
use tracing::{Level, event};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("game is already over")]
    GameOver,
    #[error("player {0} is not seated in this game")]
    UnknownPlayer(Uuid),
    #[error("player {0} is not the current player")]
    NotCurrentPlayer(Uuid),
    #[error("unknown raise response code {0}; expected -1, 0 or 1")]
    UnknownRaiseResponse(i32),
    #[error(transparent)]
    Hand(#[from] HandError),
}

/// A two-player game played to twelve points.
///
/// `Game` is the single authority on game state: every submission is
/// validated here and a rejected one leaves the state untouched.
#[derive(Debug, Clone)]
pub struct Game {
    uuid: Uuid,
    players: [Player; 2],
    scores: ScoreBoard,
    hand: HandState,
    hand_number: u32,
    rng: StdRng,
    seed: u64,
}

impl Game {
    pub fn new(player_one: Player, player_two: Player) -> Self {
        let seed: u64 = rand::random();
        Self::with_seed(player_one, player_two, seed)
    }

    pub fn with_seed(player_one: Player, player_two: Player, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let scores = ScoreBoard::new();
        let hand = deal_fresh(&mut rng, Seat::One, &scores);
        Self {
            uuid: Uuid::new_v4(),
            players: [player_one, player_two],
            scores,
            hand,
            hand_number: 1,
            rng,
            seed,
        }
    }

    /// Starts from given scores with the first hand dealt from `deck`.
    /// Later hands are shuffled from `seed`.
    pub fn from_parts(
        players: [Player; 2],
        scores: ScoreBoard,
        deck: &Deck,
        first_to_play: Seat,
        seed: u64,
    ) -> Result<Self, GameError> {
        if scores.winner().is_some() {
            return Err(GameError::GameOver);
        }
        let hand = HandState::deal(deck, first_to_play, &scores)?;
        Ok(Self {
            uuid: Uuid::new_v4(),
            players,
            scores,
            hand,
            hand_number: 1,
            rng: StdRng::seed_from_u64(seed),
            seed,
        })
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn players(&self) -> &[Player; 2] {
        &self.players
    }

    pub fn player(&self, seat: Seat) -> &Player {
        &self.players[seat.index()]
    }

    pub fn seat_of(&self, uuid: Uuid) -> Option<Seat> {
        Seat::BOTH
            .iter()
            .copied()
            .find(|seat| self.player(*seat).uuid() == uuid)
    }

    pub fn scores(&self) -> &ScoreBoard {
        &self.scores
    }

    pub fn hand(&self) -> &HandState {
        &self.hand
    }

    pub fn hand_number(&self) -> u32 {
        self.hand_number
    }

    pub fn is_done(&self) -> bool {
        self.scores.winner().is_some()
    }

    pub fn winner(&self) -> Option<&Player> {
        self.scores.winner().map(|seat| self.player(seat))
    }

    /// The player who owes the next action, `None` once the game is over.
    pub fn current_player(&self) -> Option<&Player> {
        if self.is_done() {
            return None;
        }
        self.hand.current_seat().map(|seat| self.player(seat))
    }

    pub fn intel(&self) -> Intel {
        Intel::capture(self)
    }

    pub fn play_card(&mut self, uuid: Uuid, choice: CardToPlay) -> Result<(), GameError> {
        let seat = self.acting_seat(uuid)?;
        self.hand.play(seat, choice)?;
        self.settle_hand();
        Ok(())
    }

    pub fn raise(&mut self, uuid: Uuid) -> Result<(), GameError> {
        let seat = self.acting_seat(uuid)?;
        self.hand.raise(seat)?;
        Ok(())
    }

    pub fn accept(&mut self, uuid: Uuid) -> Result<(), GameError> {
        let seat = self.acting_seat(uuid)?;
        self.hand.accept(seat)?;
        Ok(())
    }

    pub fn quit(&mut self, uuid: Uuid) -> Result<(), GameError> {
        let seat = self.acting_seat(uuid)?;
        self.hand.quit(seat)?;
        self.settle_hand();
        Ok(())
    }

    fn acting_seat(&self, uuid: Uuid) -> Result<Seat, GameError> {
        if self.is_done() {
            return Err(GameError::GameOver);
        }
        self.seat_of(uuid).ok_or(GameError::UnknownPlayer(uuid))
    }

    /// Scores a finished hand and deals the next one unless the game is over.
    fn settle_hand(&mut self) {
        let Some(result) = self.hand.result() else {
            return;
        };

        if let Some(winner) = result.winner {
            self.scores.add_points(winner, result.points);
        }
        event!(
            target: "truco_core::game",
            Level::DEBUG,
            game = %self.uuid,
            hand = self.hand_number,
            winner = ?result.winner,
            points = result.points,
            scores = ?self.scores.standings(),
            "hand finished"
        );

        if self.is_done() {
            return;
        }

        let next_first = self.hand.first_to_play().opponent();
        self.hand = deal_fresh(&mut self.rng, next_first, &self.scores);
        self.hand_number += 1;
    }
}

fn deal_fresh(rng: &mut StdRng, first_to_play: Seat, scores: &ScoreBoard) -> HandState {
    let deck = Deck::shuffled(rng);
    let cards = deck.cards();
    let hands = [
        Hand::with_cards(cards[..HAND_SIZE].to_vec()),
        Hand::with_cards(cards[HAND_SIZE..HAND_SIZE * 2].to_vec()),
    ];
    HandState::from_hands(hands, cards[HAND_SIZE * 2], first_to_play, scores)
}

#[cfg(test)]
mod tests {
    use super::{Game, GameError};
    use crate::model::card::{Card, CardToPlay};
    use crate::model::deck::Deck;
    use crate::model::hand_state::{HandError, HandPhase};
    use crate::model::player::{Player, Seat};
    use crate::model::score::ScoreBoard;
    use uuid::Uuid;

    fn card(text: &str) -> Card {
        text.parse().unwrap()
    }

    fn deck(symbols: &[&str]) -> Deck {
        Deck::stacked(symbols.iter().map(|s| card(s)).collect())
    }

    fn scripted(scores: [u8; 2]) -> Game {
        Game::from_parts(
            [Player::bot("one"), Player::bot("two")],
            ScoreBoard::with_totals(scores),
            &deck(&["3C", "3H", "2S", "4D", "6S", "7H", "KD"]),
            Seat::One,
            5,
        )
        .unwrap()
    }

    fn uuid(game: &Game, seat: Seat) -> Uuid {
        game.player(seat).uuid()
    }

    #[test]
    fn same_seed_deals_same_hand() {
        let a = Game::with_seed(Player::bot("a"), Player::bot("b"), 11);
        let b = Game::with_seed(Player::bot("a"), Player::bot("b"), 11);
        assert_eq!(a.hand().vira(), b.hand().vira());
        assert_eq!(a.hand().hand(Seat::One), b.hand().hand(Seat::One));
        assert_eq!(a.current_player().map(Player::username), Some("a"));
    }

    #[test]
    fn finished_hand_scores_and_deals_next() {
        let mut game = scripted([0, 0]);
        let (one, two) = (uuid(&game, Seat::One), uuid(&game, Seat::Two));
        game.play_card(one, CardToPlay::of(card("3C"))).unwrap();
        game.play_card(two, CardToPlay::of(card("4D"))).unwrap();
        game.play_card(one, CardToPlay::of(card("3H"))).unwrap();
        game.play_card(two, CardToPlay::of(card("6S"))).unwrap();

        assert_eq!(game.scores().score(Seat::One), 1);
        assert_eq!(game.hand_number(), 2);
        assert_eq!(game.hand().first_to_play(), Seat::Two);
        assert_eq!(game.hand().hand(Seat::One).len(), 3);
        assert_eq!(game.current_player().map(Player::uuid), Some(two));
    }

    #[test]
    fn reaching_twelve_ends_the_game() {
        let mut game = scripted([10, 0]);
        let (one, two) = (uuid(&game, Seat::One), uuid(&game, Seat::Two));
        game.raise(one).unwrap();
        game.accept(two).unwrap();
        game.play_card(one, CardToPlay::of(card("3C"))).unwrap();
        game.play_card(two, CardToPlay::of(card("4D"))).unwrap();
        game.play_card(one, CardToPlay::of(card("3H"))).unwrap();
        game.play_card(two, CardToPlay::of(card("6S"))).unwrap();

        assert!(game.is_done());
        assert_eq!(game.winner().map(Player::uuid), Some(one));
        assert!(game.current_player().is_none());
        assert_eq!(game.quit(two), Err(GameError::GameOver));
    }

    #[test]
    fn declined_mao_de_onze_pays_one_point() {
        let mut game = scripted([3, 11]);
        assert_eq!(game.hand().phase(), HandPhase::WaitingMaoDeOnze);
        let two = uuid(&game, Seat::Two);
        assert_eq!(game.current_player().map(Player::uuid), Some(two));
        game.quit(two).unwrap();
        assert_eq!(game.scores().standings(), &[4, 11]);
        assert_eq!(game.hand_number(), 2);
    }

    #[test]
    fn rejects_strangers_and_illegal_moves() {
        let mut game = scripted([0, 0]);
        let stranger = Uuid::new_v4();
        assert_eq!(
            game.raise(stranger),
            Err(GameError::UnknownPlayer(stranger))
        );
        let two = uuid(&game, Seat::Two);
        assert_eq!(
            game.play_card(two, CardToPlay::of(card("4D"))),
            Err(GameError::Hand(HandError::NotYourTurn {
                expected: Seat::One,
                actual: Seat::Two
            }))
        );
        assert_eq!(game.hand().hand(Seat::Two).len(), 3);
    }

    #[test]
    fn from_parts_rejects_finished_scores() {
        let result = Game::from_parts(
            [Player::bot("one"), Player::bot("two")],
            ScoreBoard::with_totals([12, 3]),
            &Deck::standard(),
            Seat::One,
            0,
        );
        assert!(matches!(result, Err(GameError::GameOver)));
    }
}
