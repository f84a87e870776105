//! Strategy lookup by name.
//!
//! Bots are matched to strategies through their username: a player called
//! `"hand-strength"` is driven by the strategy registered under that name.
//! [`global`] holds the built-in strategies; callers that need isolation
//! build their own [`StrategyRegistry`] and hand it to the dispatcher.

use crate::dispatch::BotError;
use crate::strategy::{DummyStrategy, HandStrengthStrategy, RandomStrategy, Strategy};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{Level, event};

pub type SharedStrategy = Arc<dyn Strategy + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("a strategy named '{0}' is already registered")]
    Duplicate(String),
    #[error("strategy names must not be empty")]
    EmptyName,
    #[error("strategy name '{0}' has leading or trailing whitespace")]
    PaddedName(String),
}

#[derive(Default)]
pub struct StrategyRegistry {
    providers: RwLock<BTreeMap<String, SharedStrategy>>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding `dummy`, `hand-strength` and `random`.
    pub fn with_builtins() -> Self {
        let builtins: [SharedStrategy; 3] = [
            Arc::new(DummyStrategy),
            Arc::new(HandStrengthStrategy::from_env()),
            Arc::new(RandomStrategy::default()),
        ];
        let providers = builtins
            .into_iter()
            .map(|provider| (provider.name().to_string(), provider))
            .collect();
        Self {
            providers: RwLock::new(providers),
        }
    }

    pub fn register(&self, provider: SharedStrategy) -> Result<(), RegistryError> {
        let name = provider.name().to_string();
        if name.trim().is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if name.trim() != name {
            return Err(RegistryError::PaddedName(name));
        }

        let mut providers = self.providers.write();
        if providers.contains_key(&name) {
            return Err(RegistryError::Duplicate(name));
        }
        event!(target: "truco_bot::registry", Level::DEBUG, strategy = %name, "registered");
        providers.insert(name, provider);
        Ok(())
    }

    pub fn resolve(&self, name: &str) -> Option<SharedStrategy> {
        self.providers.read().get(name).cloned()
    }

    pub fn load(&self, name: &str) -> Result<SharedStrategy, BotError> {
        self.resolve(name)
            .ok_or_else(|| BotError::UnknownStrategy(name.to_string()))
    }

    /// Registered names, sorted.
    pub fn provider_names(&self) -> Vec<String> {
        self.providers.read().keys().cloned().collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.providers.read().contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.providers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.read().is_empty()
    }
}

impl std::fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrategyRegistry")
            .field("providers", &self.provider_names())
            .finish()
    }
}

static GLOBAL: Lazy<Arc<StrategyRegistry>> = Lazy::new(|| Arc::new(StrategyRegistry::with_builtins()));

/// Process-wide registry, initialised with the built-ins on first use.
pub fn global() -> Arc<StrategyRegistry> {
    Arc::clone(&GLOBAL)
}

#[cfg(test)]
mod tests {
    use super::{RegistryError, StrategyRegistry, global};
    use crate::dispatch::BotError;
    use crate::strategy::{
        DummyStrategy, HandStrengthStrategy, RandomStrategy, Strategy, StrategyError,
    };
    use std::sync::Arc;
    use truco_core::game::intel::GameIntel;
    use truco_core::game::response::RaiseResponse;
    use truco_core::model::card::CardToPlay;

    struct Named(&'static str);

    impl Strategy for Named {
        fn name(&self) -> &str {
            self.0
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
            Ok(CardToPlay::of(intel.cards[0]))
        }
    }

    #[test]
    fn builtins_are_listed_sorted() {
        let registry = StrategyRegistry::with_builtins();
        assert_eq!(
            registry.provider_names(),
            vec![
                DummyStrategy::NAME.to_string(),
                HandStrengthStrategy::NAME.to_string(),
                RandomStrategy::NAME.to_string(),
            ]
        );
    }

    #[test]
    fn duplicates_are_rejected() {
        let registry = StrategyRegistry::new();
        registry.register(Arc::new(DummyStrategy)).unwrap();
        assert_eq!(
            registry.register(Arc::new(DummyStrategy)),
            Err(RegistryError::Duplicate("dummy".to_string()))
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn names_are_kept_exactly_as_given() {
        let registry = StrategyRegistry::new();
        assert_eq!(
            registry.register(Arc::new(Named(" x"))),
            Err(RegistryError::PaddedName(" x".to_string()))
        );
        assert_eq!(
            registry.register(Arc::new(Named("  "))),
            Err(RegistryError::EmptyName)
        );
        assert!(registry.is_empty());

        registry.register(Arc::new(Named("x y"))).unwrap();
        assert_eq!(registry.provider_names(), vec!["x y".to_string()]);
        assert!(registry.load("x y").is_ok());
    }

    #[test]
    fn unknown_names_fail_to_load() {
        let registry = StrategyRegistry::new();
        assert!(registry.is_empty());
        assert!(matches!(
            registry.load("nobody"),
            Err(BotError::UnknownStrategy(name)) if name == "nobody"
        ));
        assert!(registry.resolve("nobody").is_none());
    }

    #[test]
    fn global_registry_is_shared() {
        assert!(Arc::ptr_eq(&global(), &global()));
        assert!(global().contains(DummyStrategy::NAME));
    }
}
