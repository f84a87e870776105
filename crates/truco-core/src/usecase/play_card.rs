use super::ensure_current;
use crate::game::intel::Intel;
use crate::game::match_state::{Game, GameError};
use crate::model::card::{Card, CardToPlay};
use tracing::{Level, event};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default)]
pub struct PlayCardUseCase;

impl PlayCardUseCase {
    pub fn new() -> Self {
        Self
    }

    pub fn play_card(&self, game: &mut Game, uuid: Uuid, card: Card) -> Result<Intel, GameError> {
        self.submit(game, uuid, CardToPlay::of(card))
    }

    /// Plays `card` face down.
    pub fn discard(&self, game: &mut Game, uuid: Uuid, card: Card) -> Result<Intel, GameError> {
        self.submit(game, uuid, CardToPlay::discard(card))
    }

    pub fn submit(&self, game: &mut Game, uuid: Uuid, choice: CardToPlay) -> Result<Intel, GameError> {
        ensure_current(game, uuid)?;
        game.play_card(uuid, choice)?;
        event!(
            target: "truco_core::usecase",
            Level::DEBUG,
            game = %game.uuid(),
            player = %uuid,
            card = %choice.card(),
            discard = choice.is_discard(),
            "card played"
        );
        Ok(game.intel())
    }
}
