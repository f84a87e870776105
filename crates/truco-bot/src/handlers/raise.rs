use super::{Decision, DecisionHandler};
use crate::dispatch::BotError;
use truco_core::game::match_state::Game;
use truco_core::usecase::ScoreProposalUseCase;

/// Offers the strategy a chance to raise before it plays a card.
pub struct RaiseHandler<'a> {
    usecase: ScoreProposalUseCase,
    decision: Decision<'a>,
}

impl<'a> RaiseHandler<'a> {
    pub fn new(usecase: ScoreProposalUseCase, decision: Decision<'a>) -> Self {
        Self { usecase, decision }
    }

    fn applies(&self) -> bool {
        self.decision.intel.can_raise(self.decision.player.uuid())
    }
}

impl DecisionHandler for RaiseHandler<'_> {
    fn name(&self) -> &'static str {
        "raise"
    }

    fn handle(&self, game: &mut Game) -> Result<bool, BotError> {
        if !self.applies() {
            return Ok(false);
        }

        let view = self.decision.view()?;
        let raises = self
            .decision
            .strategy
            .decide_if_raises(&view)
            .map_err(|e| self.decision.strategy_failed(e))?;
        if !raises {
            return Ok(false);
        }

        self.usecase.raise(game, self.decision.player.uuid())?;
        self.decision.log(self.name(), "raise");
        Ok(true)
    }
}
