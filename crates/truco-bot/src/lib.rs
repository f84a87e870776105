pub mod dispatch;
pub mod handlers;
pub mod registry;
pub mod strategy;

pub use dispatch::{BotError, BotUseCase};
pub use handlers::DecisionHandler;
pub use registry::{RegistryError, SharedStrategy, StrategyRegistry};
pub use strategy::{
    DummyStrategy, HandStrengthParams, HandStrengthStrategy, RandomStrategy, Strategy,
    StrategyError,
};
