use super::{Decision, DecisionHandler};
use crate::dispatch::BotError;
use truco_core::game::match_state::Game;
use truco_core::model::hand_state::HandPhase;
use truco_core::usecase::PlayCardUseCase;

pub struct CardPlayingHandler<'a> {
    usecase: PlayCardUseCase,
    decision: Decision<'a>,
}

impl<'a> CardPlayingHandler<'a> {
    pub fn new(usecase: PlayCardUseCase, decision: Decision<'a>) -> Self {
        Self { usecase, decision }
    }

    fn applies(&self) -> bool {
        let intel = &self.decision.intel;
        intel.pending_raise_points().is_none()
            && matches!(intel.phase(), HandPhase::NoCard | HandPhase::OneCard)
    }
}

impl DecisionHandler for CardPlayingHandler<'_> {
    fn name(&self) -> &'static str {
        "card_playing"
    }

    fn handle(&self, game: &mut Game) -> Result<bool, BotError> {
        if !self.applies() {
            return Ok(false);
        }

        let view = self.decision.view()?;
        let choice = self
            .decision
            .strategy
            .choose_card(&view)
            .map_err(|e| self.decision.strategy_failed(e))?;

        let uuid = self.decision.player.uuid();
        if choice.is_discard() {
            self.usecase.discard(game, uuid, choice.card())?;
        } else {
            self.usecase.play_card(game, uuid, choice.card())?;
        }
        self.decision.log(self.name(), &choice.card().to_string());
        Ok(true)
    }
}
