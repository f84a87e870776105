use super::{Strategy, StrategyError};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use truco_core::game::intel::GameIntel;
use truco_core::game::response::RaiseResponse;
use truco_core::model::card::CardToPlay;
use truco_core::model::score::HandPoints;

/// Coin-flip decisions; handy as a sparring partner in benchmarks.
#[derive(Debug)]
pub struct RandomStrategy {
    rng: Mutex<StdRng>,
    raise_probability: f64,
}

impl RandomStrategy {
    pub const NAME: &'static str = "random";

    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rng: Mutex::new(rng),
            raise_probability: 0.15,
        }
    }
}

impl Default for RandomStrategy {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Strategy for RandomStrategy {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn mao_de_onze_response(&self, _intel: &GameIntel) -> Result<bool, StrategyError> {
        Ok(self.rng.lock().gen_bool(0.5))
    }

    fn decide_if_raises(&self, _intel: &GameIntel) -> Result<bool, StrategyError> {
        Ok(self.rng.lock().gen_bool(self.raise_probability))
    }

    fn raise_response(&self, intel: &GameIntel) -> Result<RaiseResponse, StrategyError> {
        let can_raise_again = intel
            .pending_raise_points
            .is_some_and(|points| points < HandPoints::Twelve.get());
        let roll = self.rng.lock().gen_range(0..10);
        Ok(match roll {
            0..=2 => RaiseResponse::Quit,
            3 if can_raise_again => RaiseResponse::Raise,
            _ => RaiseResponse::Accept,
        })
    }

    fn choose_card(&self, intel: &GameIntel) -> Result<CardToPlay, StrategyError> {
        if intel.cards.is_empty() {
            return Err(StrategyError::Failed("no cards left to play".to_string()));
        }
        let mut rng = self.rng.lock();
        let card = intel.cards[rng.gen_range(0..intel.cards.len())];
        if !intel.is_first_round() && rng.gen_bool(0.1) {
            Ok(CardToPlay::discard(card))
        } else {
            Ok(CardToPlay::of(card))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::RandomStrategy;
    use crate::strategy::Strategy;
    use truco_core::game::intel::GameIntel;
    use truco_core::model::card::Card;

    fn view() -> GameIntel {
        let cards: Vec<Card> = ["4D", "AS", "2C"].iter().map(|c| c.parse().unwrap()).collect();
        GameIntel {
            cards,
            opponent_card: None,
            vira: "5H".parse().unwrap(),
            round_results: Vec::new(),
            open_cards: Vec::new(),
            score: 0,
            opponent_score: 0,
            hand_points: 1,
            pending_raise_points: None,
            mao_de_onze: false,
        }
    }

    #[test]
    fn seeded_strategies_agree() {
        let a = RandomStrategy::new(Some(42));
        let b = RandomStrategy::new(Some(42));
        let view = view();
        for _ in 0..20 {
            assert_eq!(a.choose_card(&view).unwrap(), b.choose_card(&view).unwrap());
        }
    }

    #[test]
    fn never_discards_in_the_first_round() {
        let strategy = RandomStrategy::new(Some(7));
        let view = view();
        for _ in 0..100 {
            let choice = strategy.choose_card(&view).unwrap();
            assert!(!choice.is_discard());
            assert!(view.cards.contains(&choice.card()));
        }
    }
}
