use crate::game::match_state::Game;
use crate::model::card::Card;
use crate::model::hand_state::HandPhase;
use crate::model::player::Seat;
use crate::model::round::{Play, RoundOutcome, RoundResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What one seat looks like in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatIntel {
    pub seat: Seat,
    pub uuid: Uuid,
    pub username: String,
    pub is_bot: bool,
    pub score: u8,
    pub cards: Vec<Card>,
}

/// Immutable snapshot of a game, taken after every change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intel {
    game_uuid: Uuid,
    hand_number: u32,
    vira: Card,
    hand_points: u8,
    pending_raise_points: Option<u8>,
    last_raiser: Option<Uuid>,
    phase: HandPhase,
    seats: [SeatIntel; 2],
    card_to_beat: Option<Play>,
    open_cards: Vec<Card>,
    round_outcomes: Vec<RoundOutcome>,
    current_player_uuid: Option<Uuid>,
    mao_de_onze: bool,
    raising_allowed: bool,
    may_raise: Option<Uuid>,
    game_done: bool,
    winner: Option<Uuid>,
}

impl Intel {
    pub fn capture(game: &Game) -> Self {
        let hand = game.hand();
        let seats = Seat::BOTH.map(|seat| {
            let player = game.player(seat);
            SeatIntel {
                seat,
                uuid: player.uuid(),
                username: player.username().to_string(),
                is_bot: player.is_bot(),
                score: game.scores().score(seat),
                cards: hand.hand(seat).cards().to_vec(),
            }
        });

        Self {
            game_uuid: game.uuid(),
            hand_number: game.hand_number(),
            vira: hand.vira(),
            hand_points: hand.points().get(),
            pending_raise_points: hand.pending_raise().map(|p| p.points.get()),
            last_raiser: hand.last_raiser().map(|seat| game.player(seat).uuid()),
            phase: hand.phase(),
            seats,
            card_to_beat: hand.current_round().card_to_beat(),
            open_cards: hand.open_cards().to_vec(),
            round_outcomes: hand.round_outcomes().to_vec(),
            current_player_uuid: game.current_player().map(|p| p.uuid()),
            mao_de_onze: hand.is_mao_de_onze(),
            raising_allowed: hand.raising_allowed(),
            may_raise: hand
                .current_seat()
                .filter(|&seat| hand.can_raise(seat))
                .map(|seat| game.player(seat).uuid()),
            game_done: game.is_done(),
            winner: game.winner().map(|p| p.uuid()),
        }
    }

    pub fn game_uuid(&self) -> Uuid {
        self.game_uuid
    }

    pub fn hand_number(&self) -> u32 {
        self.hand_number
    }

    pub fn vira(&self) -> Card {
        self.vira
    }

    pub fn hand_points(&self) -> u8 {
        self.hand_points
    }

    pub fn pending_raise_points(&self) -> Option<u8> {
        self.pending_raise_points
    }

    pub fn last_raiser(&self) -> Option<Uuid> {
        self.last_raiser
    }

    pub fn phase(&self) -> HandPhase {
        self.phase
    }

    pub fn seats(&self) -> &[SeatIntel; 2] {
        &self.seats
    }

    pub fn seat(&self, seat: Seat) -> &SeatIntel {
        &self.seats[seat.index()]
    }

    pub fn card_to_beat(&self) -> Option<Card> {
        self.card_to_beat.map(|play| play.card)
    }

    pub fn open_cards(&self) -> &[Card] {
        &self.open_cards
    }

    pub fn round_outcomes(&self) -> &[RoundOutcome] {
        &self.round_outcomes
    }

    pub fn current_player_uuid(&self) -> Option<Uuid> {
        self.current_player_uuid
    }

    pub fn is_mao_de_onze(&self) -> bool {
        self.mao_de_onze
    }

    pub fn raising_allowed(&self) -> bool {
        self.raising_allowed
    }

    /// True when `uuid` owes the next card and may raise the stake first.
    pub fn can_raise(&self, uuid: Uuid) -> bool {
        self.may_raise == Some(uuid)
    }

    pub fn is_game_done(&self) -> bool {
        self.game_done
    }

    pub fn winner(&self) -> Option<Uuid> {
        self.winner
    }

    pub fn seat_of(&self, uuid: Uuid) -> Option<Seat> {
        self.seats.iter().find(|s| s.uuid == uuid).map(|s| s.seat)
    }

    /// The part of the snapshot the player with `uuid` is allowed to see.
    pub fn view_for(&self, uuid: Uuid) -> Option<GameIntel> {
        let seat = self.seat_of(uuid)?;
        let own = self.seat(seat);
        let opponent = self.seat(seat.opponent());
        let opponent_card = self
            .card_to_beat
            .filter(|play| play.seat != seat)
            .map(|play| play.card);

        Some(GameIntel {
            cards: own.cards.clone(),
            opponent_card,
            vira: self.vira,
            round_results: self
                .round_outcomes
                .iter()
                .map(|outcome| outcome.result_for(seat))
                .collect(),
            open_cards: self.open_cards.clone(),
            score: own.score,
            opponent_score: opponent.score,
            hand_points: self.hand_points,
            pending_raise_points: self.pending_raise_points,
            mao_de_onze: self.mao_de_onze,
        })
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// A strategy's view of the game: its own cards plus public information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameIntel {
    pub cards: Vec<Card>,
    pub opponent_card: Option<Card>,
    pub vira: Card,
    pub round_results: Vec<RoundResult>,
    pub open_cards: Vec<Card>,
    pub score: u8,
    pub opponent_score: u8,
    pub hand_points: u8,
    pub pending_raise_points: Option<u8>,
    pub mao_de_onze: bool,
}

impl GameIntel {
    pub fn is_first_round(&self) -> bool {
        self.round_results.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use crate::game::match_state::Game;
    use crate::model::card::{Card, CardToPlay};
    use crate::model::deck::Deck;
    use crate::model::hand_state::HandPhase;
    use crate::model::player::{Player, Seat};
    use crate::model::round::RoundResult;
    use crate::model::score::{HandPoints, ScoreBoard};
    use uuid::Uuid;

    fn card(text: &str) -> Card {
        text.parse().unwrap()
    }

    fn game() -> Game {
        let deck = Deck::stacked(
            ["3C", "4H", "2S", "4D", "6S", "7H", "KD"]
                .iter()
                .map(|s| card(s))
                .collect(),
        );
        Game::from_parts(
            [Player::bot("one"), Player::human("two")],
            ScoreBoard::with_totals([2, 5]),
            &deck,
            Seat::One,
            1,
        )
        .unwrap()
    }

    #[test]
    fn snapshot_reflects_the_table() {
        let mut game = game();
        let one = game.player(Seat::One).uuid();
        game.play_card(one, CardToPlay::of(card("2S"))).unwrap();

        let intel = game.intel();
        assert_eq!(intel.phase(), HandPhase::OneCard);
        assert_eq!(intel.card_to_beat(), Some(card("2S")));
        assert_eq!(intel.open_cards(), &[card("KD"), card("2S")]);
        assert_eq!(intel.current_player_uuid(), Some(game.player(Seat::Two).uuid()));
        assert_eq!(intel.seat(Seat::One).cards.len(), 2);
        assert!(!intel.seat(Seat::Two).is_bot);
        assert!(!intel.is_game_done());
    }

    #[test]
    fn view_hides_opponent_cards_and_flips_perspective() {
        let mut game = game();
        let (one, two) = (game.player(Seat::One).uuid(), game.player(Seat::Two).uuid());
        game.play_card(one, CardToPlay::of(card("4H"))).unwrap();
        game.play_card(two, CardToPlay::of(card("6S"))).unwrap();

        let intel = game.intel();
        let view_two = intel.view_for(two).unwrap();
        assert_eq!(view_two.cards, vec![card("4D"), card("7H")]);
        assert_eq!(view_two.round_results, vec![RoundResult::Won]);
        assert_eq!((view_two.score, view_two.opponent_score), (5, 2));
        assert!(!view_two.is_first_round());

        let view_one = intel.view_for(one).unwrap();
        assert_eq!(view_one.round_results, vec![RoundResult::Lost]);
        assert_eq!(view_one.opponent_card, None);
        assert!(intel.view_for(Uuid::new_v4()).is_none());
    }

    #[test]
    fn snapshot_serializes_to_json() {
        let json = game().intel().to_json().unwrap();
        assert!(json.contains("\"vira\": \"KD\""));
        assert!(json.contains("\"phase\": \"NoCard\""));
    }

    #[test]
    fn leader_answering_a_raise_sees_no_opponent_card() {
        let mut game = game();
        let (one, two) = (game.player(Seat::One).uuid(), game.player(Seat::Two).uuid());
        game.play_card(one, CardToPlay::of(card("2S"))).unwrap();
        game.raise(two).unwrap();

        let intel = game.intel();
        assert_eq!(intel.current_player_uuid(), Some(one));
        assert_eq!(intel.card_to_beat(), Some(card("2S")));

        let view_one = intel.view_for(one).unwrap();
        assert_eq!(view_one.cards, vec![card("3C"), card("4H")]);
        assert_eq!(view_one.opponent_card, None);
        assert_eq!(view_one.pending_raise_points, Some(HandPoints::Three.get()));

        let view_two = intel.view_for(two).unwrap();
        assert_eq!(view_two.opponent_card, Some(card("2S")));
    }

    #[test]
    fn raise_eligibility_follows_the_hand() {
        let mut game = game();
        let (one, two) = (game.player(Seat::One).uuid(), game.player(Seat::Two).uuid());
        let intel = game.intel();
        assert!(intel.can_raise(one));
        assert!(!intel.can_raise(two));

        game.raise(one).unwrap();
        game.accept(two).unwrap();
        assert!(!game.intel().can_raise(one));
    }
}
