use crate::game::match_state::GameError;
use serde::{Deserialize, Serialize};

/// Answer to a pending raise.
///
/// Integer-speaking clients use the codes `-1` (quit), `0` (accept) and
/// `1` (raise again).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum RaiseResponse {
    Quit,
    Accept,
    Raise,
}

impl RaiseResponse {
    pub const fn code(self) -> i32 {
        match self {
            RaiseResponse::Quit => -1,
            RaiseResponse::Accept => 0,
            RaiseResponse::Raise => 1,
        }
    }
}

impl TryFrom<i32> for RaiseResponse {
    type Error = GameError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            -1 => Ok(RaiseResponse::Quit),
            0 => Ok(RaiseResponse::Accept),
            1 => Ok(RaiseResponse::Raise),
            other => Err(GameError::UnknownRaiseResponse(other)),
        }
    }
}

impl From<RaiseResponse> for i32 {
    fn from(response: RaiseResponse) -> Self {
        response.code()
    }
}

#[cfg(test)]
mod tests {
    use super::RaiseResponse;
    use crate::game::match_state::GameError;

    #[test]
    fn codes_map_both_ways() {
        for response in [RaiseResponse::Quit, RaiseResponse::Accept, RaiseResponse::Raise] {
            assert_eq!(RaiseResponse::try_from(response.code()), Ok(response));
        }
    }

    #[test]
    fn unknown_codes_are_contract_violations() {
        assert_eq!(
            RaiseResponse::try_from(2),
            Err(GameError::UnknownRaiseResponse(2))
        );
        assert!(serde_json::from_str::<RaiseResponse>("7").is_err());
        assert_eq!(serde_json::to_string(&RaiseResponse::Quit).unwrap(), "-1");
    }
}
