mod external;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::analytics::{AnalyticsCollector, AnalyticsError};
use external::ExternalStrategy;
use parking_lot::Mutex;
use rand::{RngCore, SeedableRng, rngs::StdRng};
use serde::Serialize;
use thiserror::Error;
use tracing::{Level, event};
use truco_bot::registry::{self, RegistryError, SharedStrategy, StrategyRegistry};
use truco_bot::{BotError, BotUseCase, RandomStrategy, Strategy, StrategyError};
use truco_core::game::intel::GameIntel;
use truco_core::game::match_state::Game;
use truco_core::game::response::RaiseResponse;
use truco_core::model::card::CardToPlay;
use truco_core::model::player::{Player, Seat};

use crate::config::{AgentConfig, AgentKind, BenchmarkConfig, ResolvedOutputs};

/// Plays head-to-head games between the two configured agents.
pub struct TournamentRunner {
    config: BenchmarkConfig,
    outputs: ResolvedOutputs,
    agents: Vec<AgentBlueprint>,
    logging_enabled: bool,
}

/// Summary details returned after a run.
pub struct RunSummary {
    pub games_played: usize,
    pub rows_written: usize,
    pub jsonl_path: PathBuf,
    pub summary_path: PathBuf,
    pub telemetry_path: Option<PathBuf>,
}

impl TournamentRunner {
    /// Build a runner from a validated configuration.
    pub fn new(config: BenchmarkConfig, outputs: ResolvedOutputs) -> Result<Self, RunnerError> {
        let agents = AgentBlueprint::from_configs(&config.agents)?;

        if agents.len() != 2 {
            return Err(RunnerError::SeatCount {
                found: agents.len(),
            });
        }

        Ok(Self {
            logging_enabled: config.logging.enable_structured,
            config,
            outputs,
            agents,
        })
    }

    /// Execute the tournament, streaming JSONL rows to disk.
    pub fn run(&self) -> Result<RunSummary, RunnerError> {
        ensure_parent(self.outputs.jsonl.parent())?;
        ensure_parent(self.outputs.summary_md.parent())?;

        let mut writer = BufWriter::new(File::create(&self.outputs.jsonl)?);
        let mut rng = StdRng::seed_from_u64(self.config.matches.seed.unwrap_or(0));
        let mut rows_written = 0usize;
        let mut analytics = AnalyticsCollector::new(&self.config)?;

        let budget = Duration::from_millis(self.config.metrics.latency_budget_ms);
        let registry = StrategyRegistry::new();
        let mut metered = Vec::with_capacity(self.agents.len());
        for agent in &self.agents {
            let strategy = Arc::new(MeteredStrategy::new(
                agent.name.clone(),
                agent.spawn_strategy(self.config.matches.seed)?,
                budget,
            ));
            registry.register(strategy.clone())?;
            metered.push(strategy);
        }
        let bots = BotUseCase::with_registry(Arc::new(registry));

        for game_index in 0..self.config.matches.games {
            let game_seed = rng.next_u64();
            let seating = self.seating_for(game_index);
            let outcome = self.play_game(&bots, &metered, game_index, game_seed, seating)?;
            analytics.record_game(game_index, &outcome)?;
            rows_written += write_game_rows(&mut writer, &self.config, game_index, game_seed, &outcome)?;
        }

        writer.flush()?;

        let summary = analytics.finalize()?;
        summary.write_markdown(&self.outputs.summary_md)?;

        let telemetry_path = self.logging_enabled.then(|| {
            self.outputs
                .summary_md
                .parent()
                .filter(|dir| !dir.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."))
                .join("telemetry.jsonl")
        });

        Ok(RunSummary {
            games_played: self.config.matches.games,
            rows_written,
            jsonl_path: self.outputs.jsonl.clone(),
            summary_path: self.outputs.summary_md.clone(),
            telemetry_path,
        })
    }

    /// Agent index sitting in seat one and seat two for a given game.
    fn seating_for(&self, game_index: usize) -> [usize; 2] {
        if self.config.matches.swap_seats && game_index % 2 == 1 {
            [1, 0]
        } else {
            [0, 1]
        }
    }

    fn play_game(
        &self,
        bots: &BotUseCase,
        metered: &[Arc<MeteredStrategy>],
        game_index: usize,
        game_seed: u64,
        seating: [usize; 2],
    ) -> Result<GameOutcome, RunnerError> {
        let [first, second] = seating.map(|idx| Player::bot(self.agents[idx].name.as_str()));
        let mut game = Game::with_seed(first, second, game_seed);
        for strategy in metered {
            strategy.reset();
        }

        let max_cycles = self.config.matches.max_cycles;
        let mut cycles = 0usize;
        while !game.is_done() {
            if cycles == max_cycles {
                return Err(RunnerError::Stalled {
                    game_index,
                    cycles,
                    reason: "cycle limit reached",
                });
            }
            let before = game.intel();
            let after = bots.play_when_necessary(&mut game)?;
            cycles += 1;
            if after == before {
                return Err(RunnerError::Stalled {
                    game_index,
                    cycles,
                    reason: "no bot acted",
                });
            }
        }

        let winner = game.winner().map(|player| player.uuid());
        let seat_results = Seat::BOTH
            .iter()
            .zip(seating)
            .map(|(&seat, agent_idx)| {
                let player = game.player(seat);
                SeatResult {
                    agent_name: player.username().to_string(),
                    seat,
                    points: game.scores().score(seat),
                    won: winner == Some(player.uuid()),
                    metrics: metered[agent_idx].summary(),
                }
            })
            .collect::<Vec<_>>();

        if self.logging_enabled && tracing::enabled!(Level::INFO) {
            event!(
                target: "truco_bench::game",
                Level::INFO,
                run_id = %self.config.run_id,
                game_index = game_index as u32,
                seed = game_seed,
                hands = game.hand_number(),
                cycles = cycles as u32,
                winner = %game.winner().map(|p| p.username()).unwrap_or("-"),
                "game finished"
            );
        }

        Ok(GameOutcome {
            seating: seat_results
                .iter()
                .map(|seat| SeatSnapshot {
                    seat: seat_label(seat.seat).to_string(),
                    bot: seat.agent_name.clone(),
                })
                .collect(),
            hands: game.hand_number(),
            seat_results,
        })
    }
}

fn ensure_parent(path: Option<&Path>) -> Result<(), RunnerError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

fn write_game_rows(
    writer: &mut BufWriter<File>,
    config: &BenchmarkConfig,
    game_index: usize,
    game_seed: u64,
    outcome: &GameOutcome,
) -> Result<usize, RunnerError> {
    let game_id = game_id(game_index);

    let mut rows_written = 0usize;
    for seat_result in &outcome.seat_results {
        let row = GameLogRow {
            run_id: config.run_id.clone(),
            game_id: game_id.clone(),
            game_index,
            game_seed,
            seat: seat_label(seat_result.seat).to_string(),
            bot: seat_result.agent_name.clone(),
            seating: outcome.seating.clone(),
            points: seat_result.points,
            won: seat_result.won,
            hands: outcome.hands,
            speed_ms_decision: seat_result.metrics.avg_ms_per_decision,
            decisions: seat_result.metrics.decisions,
        };

        serde_json::to_writer(&mut *writer, &row)?;
        writer.write_all(b"\n")?;
        rows_written += 1;
    }

    Ok(rows_written)
}

pub(crate) fn game_id(game_index: usize) -> String {
    format!("G{game_index:05}")
}

fn seat_label(seat: Seat) -> &'static str {
    match seat {
        Seat::One => "one",
        Seat::Two => "two",
    }
}

pub struct GameOutcome {
    pub seating: Vec<SeatSnapshot>,
    pub seat_results: Vec<SeatResult>,
    pub hands: u32,
}

#[derive(Clone, Serialize)]
pub struct SeatSnapshot {
    pub seat: String,
    pub bot: String,
}

pub struct SeatResult {
    pub agent_name: String,
    pub seat: Seat,
    pub points: u8,
    pub won: bool,
    pub metrics: DecisionSummary,
}

#[derive(Default)]
struct DecisionMetrics {
    total: Duration,
    decisions: u32,
}

impl DecisionMetrics {
    fn record(&mut self, duration: Duration) -> f64 {
        self.total += duration;
        self.decisions += 1;
        duration.as_secs_f64() * 1000.0
    }

    fn summary(&self) -> DecisionSummary {
        let avg_ms = if self.decisions == 0 {
            0.0
        } else {
            self.total.as_secs_f64() * 1000.0 / f64::from(self.decisions)
        };

        DecisionSummary {
            decisions: self.decisions,
            avg_ms_per_decision: avg_ms,
            total_ms: self.total.as_secs_f64() * 1000.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DecisionSummary {
    pub decisions: u32,
    pub avg_ms_per_decision: f64,
    pub total_ms: f64,
}

/// Registers a strategy under the agent's name and times each decision.
///
/// The agent name is also the bot's username, so the dispatcher finds this
/// wrapper for the seat the agent occupies.
struct MeteredStrategy {
    name: String,
    inner: SharedStrategy,
    budget: Duration,
    metrics: Mutex<DecisionMetrics>,
}

impl MeteredStrategy {
    fn new(name: String, inner: SharedStrategy, budget: Duration) -> Self {
        Self {
            name,
            inner,
            budget,
            metrics: Mutex::new(DecisionMetrics::default()),
        }
    }

    fn reset(&self) {
        *self.metrics.lock() = DecisionMetrics::default();
    }

    fn summary(&self) -> DecisionSummary {
        self.metrics.lock().summary()
    }

    fn timed<T>(
        &self,
        action: &'static str,
        decide: impl FnOnce() -> Result<T, StrategyError>,
    ) -> Result<T, StrategyError> {
        let start = Instant::now();
        let result = decide();
        let elapsed = start.elapsed();
        let elapsed_ms = self.metrics.lock().record(elapsed);

        if elapsed > self.budget {
            event!(
                target: "truco_bench::latency",
                Level::WARN,
                agent = %self.name,
                action,
                elapsed_ms,
                budget_ms = self.budget.as_millis() as u64,
                "decision exceeded latency budget"
            );
        } else if tracing::enabled!(Level::TRACE) {
            event!(
                target: "truco_bench::latency",
                Level::TRACE,
                agent = %self.name,
                action,
                elapsed_ms
            );
        }

        result
    }
}

impl Strategy for MeteredStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn mao_de_onze_response(&self, intel: &GameIntel) -> Result<bool, StrategyError> {
        self.timed("mao_de_onze", || self.inner.mao_de_onze_response(intel))
    }

    fn decide_if_raises(&self, intel: &GameIntel) -> Result<bool, StrategyError> {
        self.timed("raise", || self.inner.decide_if_raises(intel))
    }

    fn raise_response(&self, intel: &GameIntel) -> Result<RaiseResponse, StrategyError> {
        self.timed("raise_response", || self.inner.raise_response(intel))
    }

    fn choose_card(&self, intel: &GameIntel) -> Result<CardToPlay, StrategyError> {
        self.timed("card", || self.inner.choose_card(intel))
    }
}

#[derive(Serialize)]
struct GameLogRow {
    run_id: String,
    game_id: String,
    game_index: usize,
    game_seed: u64,
    seat: String,
    bot: String,
    seating: Vec<SeatSnapshot>,
    points: u8,
    won: bool,
    hands: u32,
    speed_ms_decision: f64,
    decisions: u32,
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("{0}")]
    Agent(#[from] AgentError),
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("failed to serialize log row: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
    #[error("bot dispatch failed: {0}")]
    Bot(#[from] BotError),
    #[error("failed to register agent strategy: {0}")]
    Registry(#[from] RegistryError),
    #[error("game {game_index} stalled after {cycles} cycles: {reason}")]
    Stalled {
        game_index: usize,
        cycles: usize,
        reason: &'static str,
    },
    #[error("configuration requires exactly 2 agents but found {found}")]
    SeatCount { found: usize },
    #[error("analytics error: {0}")]
    Analytics(#[from] AnalyticsError),
}

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("unknown builtin strategy '{strategy}' for agent '{name}'")]
    UnknownStrategy { name: String, strategy: String },
    #[error("invalid builtin parameter for agent '{name}': {message}")]
    InvalidBuiltinParam { name: String, message: String },
    #[error("invalid external parameter for agent '{name}': {message}")]
    InvalidExternalParam { name: String, message: String },
}

struct AgentBlueprint {
    name: String,
    implementation: AgentImplementation,
}

enum AgentImplementation {
    Builtin(BuiltinOptions),
    External(ExternalOptions),
}

impl AgentBlueprint {
    fn from_configs(configs: &[AgentConfig]) -> Result<Vec<Self>, AgentError> {
        configs.iter().map(Self::from_config).collect()
    }

    fn from_config(config: &AgentConfig) -> Result<Self, AgentError> {
        let implementation = match config.kind {
            AgentKind::Builtin => {
                AgentImplementation::Builtin(BuiltinOptions::from_params(&config.name, &config.params)?)
            }
            AgentKind::External => AgentImplementation::External(ExternalOptions::from_params(
                &config.name,
                &config.params,
            )?),
        };

        Ok(Self {
            name: config.name.clone(),
            implementation,
        })
    }

    fn spawn_strategy(&self, match_seed: Option<u64>) -> Result<SharedStrategy, AgentError> {
        match &self.implementation {
            AgentImplementation::Builtin(opts) => opts.spawn_strategy(&self.name, match_seed),
            AgentImplementation::External(opts) => {
                let fallback = match &opts.fallback {
                    ExternalFallback::Builtin(strategy) => {
                        Some(resolve_builtin(&self.name, strategy)?)
                    }
                    ExternalFallback::Error => None,
                };
                Ok(Arc::new(ExternalStrategy::new(
                    self.name.clone(),
                    opts.clone(),
                    fallback,
                )))
            }
        }
    }
}

fn resolve_builtin(agent: &str, strategy: &str) -> Result<SharedStrategy, AgentError> {
    registry::global()
        .resolve(strategy)
        .ok_or_else(|| AgentError::UnknownStrategy {
            name: agent.to_string(),
            strategy: strategy.to_string(),
        })
}

struct BuiltinOptions {
    strategy: String,
    seed: Option<u64>,
}

impl BuiltinOptions {
    fn from_params(name: &str, params: &serde_yaml::Value) -> Result<Self, AgentError> {
        let mut options = Self {
            strategy: name.to_string(),
            seed: None,
        };
        if params.is_null() {
            return options.checked(name);
        }

        let mapping = params
            .as_mapping()
            .ok_or_else(|| AgentError::InvalidBuiltinParam {
                name: name.to_string(),
                message: "expected mapping for builtin params".to_string(),
            })?;

        for (key, value) in mapping {
            match key.as_str() {
                Some("strategy") => {
                    options.strategy = value
                        .as_str()
                        .ok_or_else(|| AgentError::InvalidBuiltinParam {
                            name: name.to_string(),
                            message: "strategy must be a string".to_string(),
                        })?
                        .to_string();
                }
                Some("seed") => {
                    options.seed =
                        Some(value.as_u64().ok_or_else(|| AgentError::InvalidBuiltinParam {
                            name: name.to_string(),
                            message: "seed must be an unsigned integer".to_string(),
                        })?);
                }
                _ => {}
            }
        }

        options.checked(name)
    }

    fn checked(self, name: &str) -> Result<Self, AgentError> {
        resolve_builtin(name, &self.strategy)?;
        Ok(self)
    }

    /// Random strategies get their own seeded generator so runs replay.
    fn spawn_strategy(
        &self,
        name: &str,
        match_seed: Option<u64>,
    ) -> Result<SharedStrategy, AgentError> {
        if self.strategy == RandomStrategy::NAME {
            return Ok(Arc::new(RandomStrategy::new(self.seed.or(match_seed))));
        }
        resolve_builtin(name, &self.strategy)
    }
}

#[derive(Debug, Clone)]
pub(super) enum ExternalFallback {
    Builtin(String),
    Error,
}

#[derive(Debug, Clone)]
pub(super) struct ExternalOptions {
    pub(super) command: Option<String>,
    pub(super) args: Vec<String>,
    pub(super) working_dir: Option<PathBuf>,
    pub(super) timeout_ms: Option<u64>,
    pub(super) fallback: ExternalFallback,
}

impl ExternalOptions {
    fn from_params(name: &str, params: &serde_yaml::Value) -> Result<Self, AgentError> {
        let mut options = Self {
            command: None,
            args: Vec::new(),
            working_dir: None,
            timeout_ms: None,
            fallback: ExternalFallback::Builtin(truco_bot::HandStrengthStrategy::NAME.to_string()),
        };

        if params.is_null() {
            return Ok(options);
        }

        let mapping = params
            .as_mapping()
            .ok_or_else(|| AgentError::InvalidExternalParam {
                name: name.to_string(),
                message: "expected mapping for external params".to_string(),
            })?;

        for (key, value) in mapping {
            match key.as_str() {
                Some("command") => {
                    options.command = value.as_str().map(|s| s.to_string());
                    if options.command.is_none() {
                        return Err(AgentError::InvalidExternalParam {
                            name: name.to_string(),
                            message: "command must be a string".to_string(),
                        });
                    }
                }
                Some("args") => {
                    let Some(seq) = value.as_sequence() else {
                        return Err(AgentError::InvalidExternalParam {
                            name: name.to_string(),
                            message: "args must be an array of strings".to_string(),
                        });
                    };
                    options.args = seq
                        .iter()
                        .filter_map(|v| v.as_str().map(|s| s.to_string()))
                        .collect();
                }
                Some("working_dir") => {
                    options.working_dir = value.as_str().map(PathBuf::from);
                }
                Some("timeout_ms") => {
                    options.timeout_ms = value.as_u64();
                }
                Some("fallback") => {
                    let Some(fallback) = value.as_str() else {
                        return Err(AgentError::InvalidExternalParam {
                            name: name.to_string(),
                            message: "fallback must be a string".to_string(),
                        });
                    };
                    options.fallback = match fallback.to_ascii_lowercase().as_str() {
                        "error" | "none" => ExternalFallback::Error,
                        other if registry::global().contains(other) => {
                            ExternalFallback::Builtin(other.to_string())
                        }
                        other => {
                            return Err(AgentError::InvalidExternalParam {
                                name: name.to_string(),
                                message: format!("unknown fallback '{other}'"),
                            });
                        }
                    };
                }
                _ => {}
            }
        }

        Ok(options)
    }
}
