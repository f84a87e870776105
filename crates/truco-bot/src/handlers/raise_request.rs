use super::{Decision, DecisionHandler};
use crate::dispatch::BotError;
use truco_core::game::match_state::Game;
use truco_core::game::response::RaiseResponse;
use truco_core::model::hand_state::HandPhase;
use truco_core::usecase::ScoreProposalUseCase;

/// Answers the opponent's raise: quit, accept or raise again.
pub struct RaiseRequestHandler<'a> {
    usecase: ScoreProposalUseCase,
    decision: Decision<'a>,
}

impl<'a> RaiseRequestHandler<'a> {
    pub fn new(usecase: ScoreProposalUseCase, decision: Decision<'a>) -> Self {
        Self { usecase, decision }
    }

    fn applies(&self) -> bool {
        self.decision.intel.phase() == HandPhase::WaitingRaiseResponse
    }
}

impl DecisionHandler for RaiseRequestHandler<'_> {
    fn name(&self) -> &'static str {
        "raise_request"
    }

    fn handle(&self, game: &mut Game) -> Result<bool, BotError> {
        if !self.applies() {
            return Ok(false);
        }

        let view = self.decision.view()?;
        let response = self
            .decision
            .strategy
            .raise_response(&view)
            .map_err(|e| self.decision.strategy_failed(e))?;

        let uuid = self.decision.player.uuid();
        let action = match response {
            RaiseResponse::Quit => {
                self.usecase.quit(game, uuid)?;
                "quit"
            }
            RaiseResponse::Accept => {
                self.usecase.accept(game, uuid)?;
                "accept"
            }
            RaiseResponse::Raise => {
                self.usecase.raise(game, uuid)?;
                "raise"
            }
        };
        self.decision.log(self.name(), action);
        Ok(true)
    }
}
