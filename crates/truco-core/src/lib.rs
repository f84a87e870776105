#![deny(warnings)]
pub mod game;
pub mod model;
pub mod usecase;

pub use game::intel::{GameIntel, Intel, SeatIntel};
pub use game::match_state::{Game, GameError};
pub use game::response::RaiseResponse;
pub use model::card::{Card, CardError, CardToPlay};
pub use model::hand_state::{HandError, HandPhase};
pub use model::player::{Player, Seat};
pub use model::round::RoundResult;
pub use usecase::{PlayCardUseCase, ScoreProposalUseCase};

pub struct AppInfo;

impl AppInfo {
    pub const fn name() -> &'static str {
        "truco"
    }

    pub const fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}
