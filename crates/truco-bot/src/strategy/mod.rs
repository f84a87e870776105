mod dummy;
mod hand_strength;
mod random;

pub use dummy::DummyStrategy;
pub use hand_strength::{HandStrengthParams, HandStrengthStrategy};
pub use random::RandomStrategy;

use thiserror::Error;
use truco_core::game::intel::GameIntel;
use truco_core::game::match_state::GameError;
use truco_core::game::response::RaiseResponse;
use truco_core::model::card::CardToPlay;

/// Failure raised by a strategy while deciding. Passed through to the caller
/// untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StrategyError {
    #[error("strategy failed: {0}")]
    Failed(String),
    #[error("strategy produced an invalid response: {0}")]
    InvalidResponse(String),
    #[error(transparent)]
    Contract(#[from] GameError),
}

/// Decision-making contract for an automated player.
///
/// Strategies only see the player's [`GameIntel`]. They are shared between
/// games, so implementations keep any mutable state behind a lock.
pub trait Strategy: Send + Sync {
    /// Name under which the strategy is registered; bots whose username
    /// matches it are driven by this strategy.
    fn name(&self) -> &str;

    /// Play a mão de onze hand (`true`) or concede it (`false`).
    fn mao_de_onze_response(&self, intel: &GameIntel) -> Result<bool, StrategyError>;

    /// Propose a raise on the player's turn.
    fn decide_if_raises(&self, intel: &GameIntel) -> Result<bool, StrategyError>;

    /// Answer an opponent's raise.
    fn raise_response(&self, intel: &GameIntel) -> Result<RaiseResponse, StrategyError>;

    /// Pick a card from `intel.cards`, face up or as a discard.
    fn choose_card(&self, intel: &GameIntel) -> Result<CardToPlay, StrategyError>;
}
