use super::{Strategy, StrategyError};
use tracing::{Level, event};
use truco_core::game::intel::GameIntel;
use truco_core::game::response::RaiseResponse;
use truco_core::model::card::{Card, CardToPlay};
use truco_core::model::rank::Rank;
use truco_core::model::score::HandPoints;

/// Thresholds for [`HandStrengthStrategy`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandStrengthParams {
    /// Raise when the average relative value of the hand reaches this.
    raise_average: f64,
    /// Raise whenever the opponent leads by at least this many points.
    trailing_gap: u8,
}

impl HandStrengthParams {
    pub const fn new(raise_average: f64, trailing_gap: u8) -> Self {
        Self {
            raise_average,
            trailing_gap,
        }
    }

    pub fn from_env() -> Self {
        Self::from_reader(|key| std::env::var(key).ok())
    }

    pub const fn raise_average(self) -> f64 {
        self.raise_average
    }

    pub const fn trailing_gap(self) -> u8 {
        self.trailing_gap
    }

    fn from_reader<F>(mut read: F) -> Self
    where
        F: FnMut(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let raise_average = read("TRUCO_RAISE_AVERAGE")
            .and_then(|raw| raw.trim().parse::<f64>().ok())
            .filter(|value| value.is_finite() && (0.0..=13.0).contains(value))
            .unwrap_or(defaults.raise_average);

        let trailing_gap = read("TRUCO_RAISE_TRAILING")
            .and_then(|raw| raw.trim().parse::<u8>().ok())
            .filter(|value| (1..=12).contains(value))
            .unwrap_or(defaults.trailing_gap);

        Self {
            raise_average,
            trailing_gap,
        }
    }
}

impl Default for HandStrengthParams {
    fn default() -> Self {
        Self {
            raise_average: 9.0,
            trailing_gap: 8,
        }
    }
}

/// Decides from manilhas, high cards (three, two, ace) and the average
/// relative value of the cards in hand.
#[derive(Debug, Clone, Default)]
pub struct HandStrengthStrategy {
    params: HandStrengthParams,
}

impl HandStrengthStrategy {
    pub const NAME: &'static str = "hand-strength";

    pub fn new(params: HandStrengthParams) -> Self {
        Self { params }
    }

    pub fn from_env() -> Self {
        Self::new(HandStrengthParams::from_env())
    }

    pub fn params(&self) -> HandStrengthParams {
        self.params
    }
}

struct HandProfile {
    manilhas: usize,
    high_cards: usize,
    average: f64,
}

impl HandProfile {
    fn of(intel: &GameIntel) -> Self {
        let vira = intel.vira;
        let manilhas = intel.cards.iter().filter(|c| c.is_manilha(vira)).count();
        let high_cards = intel
            .cards
            .iter()
            .filter(|c| !c.is_manilha(vira))
            .filter(|c| matches!(c.rank, Rank::Three | Rank::Two | Rank::Ace))
            .count();
        let average = if intel.cards.is_empty() {
            0.0
        } else {
            let total: u32 = intel
                .cards
                .iter()
                .map(|c| u32::from(c.relative_value(vira)))
                .sum();
            f64::from(total) / intel.cards.len() as f64
        };
        Self {
            manilhas,
            high_cards,
            average,
        }
    }
}

fn sorted_by_strength(cards: &[Card], vira: Card) -> Vec<Card> {
    let mut sorted = cards.to_vec();
    sorted.sort_by(|a, b| b.compare_value_with(*a, vira));
    sorted
}

impl Strategy for HandStrengthStrategy {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn mao_de_onze_response(&self, intel: &GameIntel) -> Result<bool, StrategyError> {
        let profile = HandProfile::of(intel);
        let accept = profile.manilhas >= 2
            || (profile.manilhas == 1 && profile.high_cards >= 2)
            || profile.high_cards == 3;
        log_decision("mao_de_onze", &profile, accept);
        Ok(accept)
    }

    fn decide_if_raises(&self, intel: &GameIntel) -> Result<bool, StrategyError> {
        let profile = HandProfile::of(intel);
        let trailing = intel.opponent_score.saturating_sub(intel.score) >= self.params.trailing_gap;
        let raise = trailing
            || (profile.manilhas == 1 && profile.high_cards == 1)
            || profile.average >= self.params.raise_average;
        log_decision("raise", &profile, raise);
        Ok(raise)
    }

    fn raise_response(&self, intel: &GameIntel) -> Result<RaiseResponse, StrategyError> {
        let profile = HandProfile::of(intel);
        let can_raise_again = intel
            .pending_raise_points
            .is_some_and(|points| points < HandPoints::Twelve.get());

        let response = if can_raise_again
            && (profile.manilhas >= 2 || profile.average >= self.params.raise_average)
        {
            RaiseResponse::Raise
        } else if profile.manilhas >= 1 || profile.high_cards >= 2 {
            RaiseResponse::Accept
        } else {
            RaiseResponse::Quit
        };
        log_decision("raise_response", &profile, response != RaiseResponse::Quit);
        Ok(response)
    }

    fn choose_card(&self, intel: &GameIntel) -> Result<CardToPlay, StrategyError> {
        let sorted = sorted_by_strength(&intel.cards, intel.vira);
        // Keep the best card for later rounds when leading off the hand.
        let pick = if intel.is_first_round() {
            sorted.get(1).or_else(|| sorted.first())
        } else {
            sorted.first()
        };
        pick.copied()
            .map(CardToPlay::of)
            .ok_or_else(|| StrategyError::Failed("no cards left to play".to_string()))
    }
}

fn log_decision(decision: &'static str, profile: &HandProfile, outcome: bool) {
    if !tracing::enabled!(Level::DEBUG) {
        return;
    }
    event!(
        target: "truco_bot::hand_strength",
        Level::DEBUG,
        decision,
        manilhas = profile.manilhas,
        high_cards = profile.high_cards,
        average = profile.average,
        outcome,
    );
}

#[cfg(test)]
mod tests {
    use super::{HandStrengthParams, HandStrengthStrategy};
    use crate::strategy::Strategy;
    use std::collections::HashMap;
    use truco_core::game::intel::GameIntel;
    use truco_core::game::response::RaiseResponse;
    use truco_core::model::card::{Card, CardToPlay};
    use truco_core::model::round::RoundResult;

    fn card(text: &str) -> Card {
        text.parse().unwrap()
    }

    fn intel(cards: &[&str], vira: &str) -> GameIntel {
        GameIntel {
            cards: cards.iter().map(|c| card(c)).collect(),
            opponent_card: None,
            vira: card(vira),
            round_results: Vec::new(),
            open_cards: vec![card(vira)],
            score: 0,
            opponent_score: 0,
            hand_points: 1,
            pending_raise_points: None,
            mao_de_onze: false,
        }
    }

    #[test]
    fn mao_de_onze_needs_a_strong_hand() {
        let strategy = HandStrengthStrategy::default();
        // vira 4D: fives are manilhas
        assert!(strategy.mao_de_onze_response(&intel(&["5C", "5H", "4S"], "4D")).unwrap());
        assert!(strategy.mao_de_onze_response(&intel(&["5C", "3H", "2S"], "4D")).unwrap());
        assert!(strategy.mao_de_onze_response(&intel(&["3C", "2H", "AS"], "4D")).unwrap());
        assert!(!strategy.mao_de_onze_response(&intel(&["5C", "3H", "4S"], "4D")).unwrap());
        assert!(!strategy.mao_de_onze_response(&intel(&["6C", "7H", "QS"], "4D")).unwrap());
    }

    #[test]
    fn raises_when_far_behind_or_strong() {
        let strategy = HandStrengthStrategy::default();
        let mut weak = intel(&["6C", "7H", "QS"], "4D");
        assert!(!strategy.decide_if_raises(&weak).unwrap());
        weak.opponent_score = 9;
        weak.score = 1;
        assert!(strategy.decide_if_raises(&weak).unwrap());

        assert!(strategy.decide_if_raises(&intel(&["5C", "3H", "4S"], "4D")).unwrap());
        // all manilhas average well above nine
        assert!(strategy.decide_if_raises(&intel(&["5C", "5H", "5S"], "4D")).unwrap());
    }

    #[test]
    fn answers_raises_by_strength() {
        let strategy = HandStrengthStrategy::default();
        let mut strong = intel(&["5C", "5H", "4S"], "4D");
        strong.pending_raise_points = Some(3);
        assert_eq!(strategy.raise_response(&strong).unwrap(), RaiseResponse::Raise);
        strong.pending_raise_points = Some(12);
        assert_eq!(strategy.raise_response(&strong).unwrap(), RaiseResponse::Accept);

        let mut weak = intel(&["6C", "7H", "QS"], "4D");
        weak.pending_raise_points = Some(3);
        assert_eq!(strategy.raise_response(&weak).unwrap(), RaiseResponse::Quit);
    }

    #[test]
    fn plays_second_best_first_then_best() {
        let strategy = HandStrengthStrategy::default();
        let mut view = intel(&["4D", "AS", "2C"], "5H");
        assert_eq!(strategy.choose_card(&view).unwrap(), CardToPlay::of(card("AS")));

        view.round_results = vec![RoundResult::Lost];
        assert_eq!(strategy.choose_card(&view).unwrap(), CardToPlay::of(card("2C")));

        view.cards = vec![card("4D")];
        view.round_results = vec![RoundResult::Won, RoundResult::Lost];
        assert_eq!(strategy.choose_card(&view).unwrap(), CardToPlay::of(card("4D")));

        view.cards.clear();
        assert!(strategy.choose_card(&view).is_err());
    }

    #[test]
    fn params_read_from_environment_reader() {
        let vars: HashMap<&str, &str> = [
            ("TRUCO_RAISE_AVERAGE", "7.5"),
            ("TRUCO_RAISE_TRAILING", "40"),
        ]
        .into_iter()
        .collect();
        let params = HandStrengthParams::from_reader(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(params.raise_average(), 7.5);
        assert_eq!(params.trailing_gap(), HandStrengthParams::default().trailing_gap());
    }
}
