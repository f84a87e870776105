use super::{Decision, DecisionHandler};
use crate::dispatch::BotError;
use truco_core::game::match_state::Game;
use truco_core::model::hand_state::HandPhase;
use truco_core::usecase::ScoreProposalUseCase;

/// Plays or concedes a mão de onze hand.
pub struct MaoDeOnzeHandler<'a> {
    usecase: ScoreProposalUseCase,
    decision: Decision<'a>,
}

impl<'a> MaoDeOnzeHandler<'a> {
    pub fn new(usecase: ScoreProposalUseCase, decision: Decision<'a>) -> Self {
        Self { usecase, decision }
    }

    fn applies(&self) -> bool {
        let intel = &self.decision.intel;
        intel.is_mao_de_onze() && intel.phase() == HandPhase::WaitingMaoDeOnze
    }
}

impl DecisionHandler for MaoDeOnzeHandler<'_> {
    fn name(&self) -> &'static str {
        "mao_de_onze"
    }

    fn handle(&self, game: &mut Game) -> Result<bool, BotError> {
        if !self.applies() {
            return Ok(false);
        }

        let view = self.decision.view()?;
        let accept = self
            .decision
            .strategy
            .mao_de_onze_response(&view)
            .map_err(|e| self.decision.strategy_failed(e))?;

        let uuid = self.decision.player.uuid();
        if accept {
            self.usecase.accept(game, uuid)?;
        } else {
            self.usecase.quit(game, uuid)?;
        }
        self.decision
            .log(self.name(), if accept { "accept" } else { "quit" });
        Ok(true)
    }
}
