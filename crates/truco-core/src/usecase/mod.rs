//! Entry points through which players (human or automated) change a game.
//!
//! Each use case checks that the acting player sits at the table and owes the
//! next action before delegating to [`Game`], then returns a fresh [`Intel`](crate::game::intel::Intel).

mod play_card;
mod score_proposal;

pub use play_card::PlayCardUseCase;
pub use score_proposal::ScoreProposalUseCase;

use crate::game::match_state::{Game, GameError};
use uuid::Uuid;

fn ensure_current(game: &Game, uuid: Uuid) -> Result<(), GameError> {
    if game.is_done() {
        return Err(GameError::GameOver);
    }
    if game.seat_of(uuid).is_none() {
        return Err(GameError::UnknownPlayer(uuid));
    }
    match game.current_player() {
        Some(player) if player.uuid() == uuid => Ok(()),
        _ => Err(GameError::NotCurrentPlayer(uuid)),
    }
}
