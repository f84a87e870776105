use super::ensure_current;
use crate::game::intel::Intel;
use crate::game::match_state::{Game, GameError};
use tracing::{Level, event};
use uuid::Uuid;

/// Answers to mão de onze and raise proposals, and new raises.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreProposalUseCase;

impl ScoreProposalUseCase {
    pub fn new() -> Self {
        Self
    }

    pub fn accept(&self, game: &mut Game, uuid: Uuid) -> Result<Intel, GameError> {
        ensure_current(game, uuid)?;
        game.accept(uuid)?;
        log_proposal(game, uuid, "accept");
        Ok(game.intel())
    }

    pub fn quit(&self, game: &mut Game, uuid: Uuid) -> Result<Intel, GameError> {
        ensure_current(game, uuid)?;
        game.quit(uuid)?;
        log_proposal(game, uuid, "quit");
        Ok(game.intel())
    }

    pub fn raise(&self, game: &mut Game, uuid: Uuid) -> Result<Intel, GameError> {
        ensure_current(game, uuid)?;
        game.raise(uuid)?;
        log_proposal(game, uuid, "raise");
        Ok(game.intel())
    }
}

fn log_proposal(game: &Game, uuid: Uuid, action: &'static str) {
    event!(
        target: "truco_core::usecase",
        Level::DEBUG,
        game = %game.uuid(),
        player = %uuid,
        action,
        hand_points = game.hand().points().get(),
        pending = ?game.hand().pending_raise().map(|p| p.points.get()),
        "score proposal"
    );
}

#[cfg(test)]
mod tests {
    use super::ScoreProposalUseCase;
    use crate::game::match_state::{Game, GameError};
    use crate::model::hand_state::HandPhase;
    use crate::model::player::{Player, Seat};

    fn game() -> Game {
        Game::with_seed(Player::bot("one"), Player::bot("two"), 3)
    }

    #[test]
    fn raise_then_accept_moves_stake() {
        let mut game = game();
        let (one, two) = (game.player(Seat::One).uuid(), game.player(Seat::Two).uuid());
        let usecase = ScoreProposalUseCase::new();

        let intel = usecase.raise(&mut game, one).unwrap();
        assert_eq!(intel.phase(), HandPhase::WaitingRaiseResponse);
        assert_eq!(intel.pending_raise_points(), Some(3));
        assert_eq!(intel.current_player_uuid(), Some(two));
        assert_eq!(intel.last_raiser(), Some(one));

        let intel = usecase.accept(&mut game, two).unwrap();
        assert_eq!(intel.hand_points(), 3);
        assert_eq!(intel.pending_raise_points(), None);
        assert_eq!(intel.current_player_uuid(), Some(one));
    }

    #[test]
    fn only_the_current_player_may_answer() {
        let mut game = game();
        let one = game.player(Seat::One).uuid();
        let usecase = ScoreProposalUseCase::new();
        usecase.raise(&mut game, one).unwrap();
        assert_eq!(
            usecase.accept(&mut game, one),
            Err(GameError::NotCurrentPlayer(one))
        );
        assert_eq!(game.hand().phase(), HandPhase::WaitingRaiseResponse);
    }

    #[test]
    fn quitting_a_raise_scores_the_raiser() {
        let mut game = game();
        let (one, two) = (game.player(Seat::One).uuid(), game.player(Seat::Two).uuid());
        let usecase = ScoreProposalUseCase::new();
        usecase.raise(&mut game, one).unwrap();
        let intel = usecase.quit(&mut game, two).unwrap();
        assert_eq!(intel.seat(Seat::One).score, 1);
        assert_eq!(intel.hand_number(), 2);
    }
}
