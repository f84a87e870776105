use crate::handlers::{
    CardPlayingHandler, Decision, DecisionHandler, MaoDeOnzeHandler, RaiseHandler,
    RaiseRequestHandler,
};
use crate::registry::{self, StrategyRegistry};
use crate::strategy::StrategyError;
use std::sync::Arc;
use thiserror::Error;
use tracing::{Level, event};
use truco_core::game::intel::Intel;
use truco_core::game::match_state::{Game, GameError};
use truco_core::usecase::{PlayCardUseCase, ScoreProposalUseCase};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BotError {
    #[error("no strategy is registered for bot '{0}'")]
    UnknownStrategy(String),
    #[error("strategy '{strategy}' failed")]
    Strategy {
        strategy: String,
        #[source]
        source: StrategyError,
    },
    #[error("game rejected the bot's decision")]
    Rule(#[from] GameError),
}

/// Makes the current player act when it is a bot.
///
/// Drivers call [`BotUseCase::play_when_necessary`] after every state change.
/// Each call submits at most one action, so a driver loops until the returned
/// snapshot shows a human on turn or a finished game.
#[derive(Debug, Clone)]
pub struct BotUseCase {
    registry: Arc<StrategyRegistry>,
    score_proposal: ScoreProposalUseCase,
    play_card: PlayCardUseCase,
}

impl Default for BotUseCase {
    fn default() -> Self {
        Self::new()
    }
}

impl BotUseCase {
    /// A dispatcher backed by the process-wide registry.
    pub fn new() -> Self {
        Self::with_registry(registry::global())
    }

    pub fn with_registry(registry: Arc<StrategyRegistry>) -> Self {
        Self {
            registry,
            score_proposal: ScoreProposalUseCase::new(),
            play_card: PlayCardUseCase::new(),
        }
    }

    pub fn play_when_necessary(&self, game: &mut Game) -> Result<Intel, BotError> {
        let intel = game.intel();
        let Some(player) = game.current_player().cloned() else {
            return Ok(intel);
        };
        if intel.is_game_done()
            || !player.is_bot()
            || intel.current_player_uuid() != Some(player.uuid())
        {
            return Ok(intel);
        }

        let strategy = self.registry.load(player.username())?;
        let decision = Decision::new(strategy.as_ref(), &player, intel);

        let handlers: [Box<dyn DecisionHandler + '_>; 4] = [
            Box::new(MaoDeOnzeHandler::new(self.score_proposal, decision.clone())),
            Box::new(RaiseHandler::new(self.score_proposal, decision.clone())),
            Box::new(CardPlayingHandler::new(self.play_card, decision.clone())),
            Box::new(RaiseRequestHandler::new(self.score_proposal, decision)),
        ];

        for handler in &handlers {
            if handler.handle(game)? {
                event!(
                    target: "truco_bot::dispatch",
                    Level::DEBUG,
                    game = %game.uuid(),
                    bot = %player.username(),
                    handler = handler.name(),
                    "bot acted"
                );
                break;
            }
        }

        Ok(game.intel())
    }

    /// Names of the strategies in the process-wide registry.
    pub fn available_bots() -> Vec<String> {
        registry::global().provider_names()
    }

    /// Names of the strategies this dispatcher can drive.
    pub fn bot_names(&self) -> Vec<String> {
        self.registry.provider_names()
    }
}
