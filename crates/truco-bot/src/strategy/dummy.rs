use super::{Strategy, StrategyError};
use truco_core::game::intel::GameIntel;
use truco_core::game::response::RaiseResponse;
use truco_core::model::card::CardToPlay;

/// Plays along with everything and throws its first card.
#[derive(Debug, Clone, Copy, Default)]
pub struct DummyStrategy;

impl DummyStrategy {
    pub const NAME: &'static str = "dummy";
}

impl Strategy for DummyStrategy {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn mao_de_onze_response(&self, _intel: &GameIntel) -> Result<bool, StrategyError> {
        Ok(true)
    }

    fn decide_if_raises(&self, _intel: &GameIntel) -> Result<bool, StrategyError> {
        Ok(false)
    }

    fn raise_response(&self, _intel: &GameIntel) -> Result<RaiseResponse, StrategyError> {
        Ok(RaiseResponse::Accept)
    }

    fn choose_card(&self, intel: &GameIntel) -> Result<CardToPlay, StrategyError> {
        intel
            .cards
            .first()
            .copied()
            .map(CardToPlay::of)
            .ok_or_else(|| StrategyError::Failed("no cards left to play".to_string()))
    }
}
