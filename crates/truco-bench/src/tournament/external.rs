use std::io::Write;
use std::process::{Command, Stdio};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{Level, event};
use truco_bot::registry::SharedStrategy;
use truco_bot::{Strategy, StrategyError};
use truco_core::game::intel::GameIntel;
use truco_core::game::response::RaiseResponse;
use truco_core::model::card::{Card, CardToPlay};

use super::ExternalOptions;

/// Asks an external process for every decision: one JSON request on stdin,
/// one JSON response on stdout.
pub struct ExternalStrategy {
    name: String,
    options: ExternalOptions,
    fallback: Option<SharedStrategy>,
}

impl ExternalStrategy {
    pub fn new(name: String, options: ExternalOptions, fallback: Option<SharedStrategy>) -> Self {
        if options.command.is_none() {
            event!(
                target: "truco_bench::external",
                Level::WARN,
                agent = %name,
                "no external command configured; using fallback strategy"
            );
        }
        Self {
            name,
            options,
            fallback,
        }
    }

    fn invoke<Response>(
        &self,
        action: &'static str,
        intel: &GameIntel,
    ) -> Result<Response, ExternalInvokeError>
    where
        Response: for<'de> Deserialize<'de>,
    {
        let command = match &self.options.command {
            Some(cmd) if !cmd.is_empty() => cmd,
            _ => return Err(ExternalInvokeError::NoCommand),
        };

        let mut cmd = Command::new(command);
        if !self.options.args.is_empty() {
            cmd.args(&self.options.args);
        }
        if let Some(dir) = &self.options.working_dir {
            cmd.current_dir(dir);
        }
        cmd.stdin(Stdio::piped()).stdout(Stdio::piped());

        let start = Instant::now();
        let mut child = cmd
            .spawn()
            .map_err(|err| ExternalInvokeError::Spawn(err.to_string()))?;
        {
            let mut stdin = child
                .stdin
                .take()
                .ok_or_else(|| ExternalInvokeError::Io("stdin".into()))?;
            serde_json::to_writer(&mut stdin, &DecisionRequest { action, intel })
                .map_err(|err| ExternalInvokeError::Protocol(err.to_string()))?;
            stdin
                .write_all(b"\n")
                .map_err(|err| ExternalInvokeError::Io(err.to_string()))?;
        }

        let output = child
            .wait_with_output()
            .map_err(|err| ExternalInvokeError::Io(err.to_string()))?;

        if !output.status.success() {
            return Err(ExternalInvokeError::Status(format!(
                "exit status {}",
                output.status
            )));
        }

        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
        if let Some(timeout) = self.options.timeout_ms
            && elapsed_ms > timeout as f64
        {
            event!(
                target: "truco_bench::external",
                Level::WARN,
                agent = %self.name,
                action,
                elapsed_ms,
                timeout_ms = timeout,
                "external invocation exceeded timeout"
            );
        }

        serde_json::from_slice(&output.stdout)
            .map_err(|err| ExternalInvokeError::Protocol(err.to_string()))
    }

    /// Run `decide` against the external process, handing over to the
    /// fallback strategy when the process fails or answers nonsense.
    fn decide<Response, T>(
        &self,
        action: &'static str,
        intel: &GameIntel,
        interpret: impl FnOnce(Response) -> Result<T, String>,
        fallback: impl FnOnce(&dyn Strategy) -> Result<T, StrategyError>,
    ) -> Result<T, StrategyError>
    where
        Response: for<'de> Deserialize<'de>,
    {
        let failure = match self.invoke::<Response>(action, intel) {
            Ok(response) => match interpret(response) {
                Ok(value) => return Ok(value),
                Err(reason) => StrategyError::InvalidResponse(reason),
            },
            Err(err) => StrategyError::Failed(err.to_string()),
        };

        match &self.fallback {
            Some(strategy) => {
                event!(
                    target: "truco_bench::external",
                    Level::WARN,
                    agent = %self.name,
                    action,
                    error = %failure,
                    fallback = %strategy.name(),
                    "external decision failed; falling back"
                );
                fallback(strategy.as_ref())
            }
            None => Err(failure),
        }
    }
}

impl Strategy for ExternalStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn mao_de_onze_response(&self, intel: &GameIntel) -> Result<bool, StrategyError> {
        self.decide(
            "mao_de_onze",
            intel,
            |response: AcceptResponse| Ok(response.accept),
            |fallback| fallback.mao_de_onze_response(intel),
        )
    }

    fn decide_if_raises(&self, intel: &GameIntel) -> Result<bool, StrategyError> {
        self.decide(
            "raise",
            intel,
            |response: RaiseDecisionResponse| Ok(response.raise),
            |fallback| fallback.decide_if_raises(intel),
        )
    }

    fn raise_response(&self, intel: &GameIntel) -> Result<RaiseResponse, StrategyError> {
        self.decide(
            "raise_response",
            intel,
            |response: CodeResponse| {
                RaiseResponse::try_from(response.code).map_err(|err| err.to_string())
            },
            |fallback| fallback.raise_response(intel),
        )
    }

    fn choose_card(&self, intel: &GameIntel) -> Result<CardToPlay, StrategyError> {
        self.decide(
            "card",
            intel,
            |response: CardResponse| {
                let card: Card = response.card.parse().map_err(|err| format!("{err}"))?;
                if !intel.cards.contains(&card) {
                    return Err(format!("card {card} is not in hand"));
                }
                Ok(if response.discard {
                    CardToPlay::discard(card)
                } else {
                    CardToPlay::of(card)
                })
            },
            |fallback| fallback.choose_card(intel),
        )
    }
}

#[derive(Debug, Error)]
enum ExternalInvokeError {
    #[error("no command configured")]
    NoCommand,
    #[error("failed to spawn process: {0}")]
    Spawn(String),
    #[error("I/O error: {0}")]
    Io(String),
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error("non-zero exit status: {0}")]
    Status(String),
}

#[derive(Serialize)]
struct DecisionRequest<'a> {
    action: &'static str,
    intel: &'a GameIntel,
}

#[derive(Deserialize)]
struct AcceptResponse {
    accept: bool,
}

#[derive(Deserialize)]
struct RaiseDecisionResponse {
    raise: bool,
}

#[derive(Deserialize)]
struct CodeResponse {
    code: i32,
}

#[derive(Deserialize)]
struct CardResponse {
    card: String,
    #[serde(default)]
    discard: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tournament::ExternalFallback;
    use std::sync::Arc;
    use truco_bot::HandStrengthStrategy;

    fn options(command: &str, fallback: ExternalFallback) -> ExternalOptions {
        ExternalOptions {
            command: Some(command.to_string()),
            args: Vec::new(),
            working_dir: None,
            timeout_ms: Some(50),
            fallback,
        }
    }

    fn view() -> GameIntel {
        GameIntel {
            cards: ["4D", "AS", "2C"].iter().map(|c| c.parse().unwrap()).collect(),
            opponent_card: None,
            vira: "5H".parse().unwrap(),
            round_results: Vec::new(),
            open_cards: vec!["5H".parse().unwrap()],
            score: 0,
            opponent_score: 0,
            hand_points: 1,
            pending_raise_points: None,
            mao_de_onze: false,
        }
    }

    #[test]
    fn fallback_invoked_when_command_missing() {
        let strategy = ExternalStrategy::new(
            "remote".into(),
            options(
                "__truco_bench_missing__",
                ExternalFallback::Builtin(HandStrengthStrategy::NAME.into()),
            ),
            Some(Arc::new(HandStrengthStrategy::default())),
        );
        let view = view();
        let choice = strategy.choose_card(&view).expect("fallback plays");
        assert!(view.cards.contains(&choice.card()));
        assert!(strategy.raise_response(&view).is_ok());
    }

    #[test]
    fn missing_command_without_fallback_is_a_strategy_failure() {
        let strategy = ExternalStrategy::new(
            "remote".into(),
            options("__truco_bench_missing__", ExternalFallback::Error),
            None,
        );
        assert!(matches!(
            strategy.decide_if_raises(&view()),
            Err(StrategyError::Failed(_))
        ));
    }

    #[test]
    fn request_carries_action_and_intel() {
        let view = view();
        let json = serde_json::to_value(DecisionRequest {
            action: "card",
            intel: &view,
        })
        .unwrap();
        assert_eq!(json["action"], "card");
        assert_eq!(json["intel"]["vira"], "5H");
        assert_eq!(json["intel"]["cards"][1], "AS");
    }

    #[test]
    fn card_response_discard_defaults_to_false() {
        let response: CardResponse = serde_json::from_str(r#"{"card":"AS"}"#).unwrap();
        assert_eq!(response.card, "AS");
        assert!(!response.discard);
    }
}
