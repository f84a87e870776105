//! One handler per kind of decision a bot can owe.
//!
//! A handler first checks whether its decision applies to the snapshot it was
//! built with. Only then does it consult the strategy, and it submits at most
//! one action to the game.

mod card_playing;
mod mao_de_onze;
mod raise;
mod raise_request;

pub use card_playing::CardPlayingHandler;
pub use mao_de_onze::MaoDeOnzeHandler;
pub use raise::RaiseHandler;
pub use raise_request::RaiseRequestHandler;

use crate::dispatch::BotError;
use crate::strategy::{Strategy, StrategyError};
use tracing::{Level, event};
use truco_core::game::intel::{GameIntel, Intel};
use truco_core::game::match_state::{Game, GameError};
use truco_core::model::player::Player;

pub trait DecisionHandler {
    fn name(&self) -> &'static str;

    /// Returns `Ok(true)` when an action was submitted to `game`.
    fn handle(&self, game: &mut Game) -> Result<bool, BotError>;
}

/// What every handler is bound to for one dispatch cycle.
#[derive(Clone)]
pub struct Decision<'a> {
    pub strategy: &'a dyn Strategy,
    pub player: &'a Player,
    pub intel: Intel,
}

impl<'a> Decision<'a> {
    pub fn new(strategy: &'a dyn Strategy, player: &'a Player, intel: Intel) -> Self {
        Self {
            strategy,
            player,
            intel,
        }
    }

    fn view(&self) -> Result<GameIntel, BotError> {
        let uuid = self.player.uuid();
        self.intel
            .view_for(uuid)
            .ok_or(BotError::Rule(GameError::UnknownPlayer(uuid)))
    }

    fn strategy_failed(&self, source: StrategyError) -> BotError {
        BotError::Strategy {
            strategy: self.strategy.name().to_string(),
            source,
        }
    }

    fn log(&self, handler: &'static str, action: &str) {
        event!(
            target: "truco_bot::handlers",
            Level::DEBUG,
            handler,
            player = %self.player.username(),
            uuid = %self.player.uuid(),
            hand = self.intel.hand_number(),
            action,
            "decision submitted"
        );
    }
}
