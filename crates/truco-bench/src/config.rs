use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::Level;

const DEFAULT_LATENCY_BUDGET_MS: u64 = 250;
const DEFAULT_MAX_CYCLES: usize = 2_000;
const NAME_CHARS: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789._-";

/// A head-to-head run: two agents, how many games, where the results go.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BenchmarkConfig {
    pub run_id: String,
    pub matches: MatchConfig,
    pub agents: Vec<AgentConfig>,
    pub outputs: OutputsConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl BenchmarkConfig {
    /// Parses and validates a YAML run file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref().to_path_buf();
        let mut cfg = match File::open(&path) {
            Ok(file) => serde_yaml::from_reader::<_, BenchmarkConfig>(BufReader::new(file))
                .map_err(|source| ConfigError::Parse {
                    source,
                    path: path.clone(),
                })?,
            Err(source) => return Err(ConfigError::Read { source, path }),
        };
        match cfg.validate() {
            Ok(()) => Ok(cfg),
            Err(source) => Err(ConfigError::Invalid { path, source }),
        }
    }

    /// Checks every block and fills in defaults. Touches no files.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        check_name("run_id", &self.run_id)?;
        self.matches.validate()?;
        validate_agents(&mut self.agents)?;
        self.outputs.validate(&self.run_id)?;
        self.metrics.validate(&self.agents)?;
        if self.logging.tracing_level.trim().is_empty() {
            self.logging.tracing_level = default_tracing_level();
        }
        Ok(())
    }

    pub fn resolved_outputs(&self) -> ResolvedOutputs {
        ResolvedOutputs {
            jsonl: substitute_run_id(&self.run_id, &self.outputs.jsonl),
            summary_md: substitute_run_id(&self.run_id, &self.outputs.summary_md),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MatchConfig {
    pub seed: Option<u64>,
    pub games: usize,
    /// Alternate which agent sits in seat one (and so leads the first hand).
    #[serde(default = "default_swap_seats")]
    pub swap_seats: bool,
    /// Dispatch cycles allowed per game before it is declared stalled.
    #[serde(default = "default_max_cycles")]
    pub max_cycles: usize,
}

impl MatchConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.games == 0 {
            return Err(invalid("matches.games", "at least one game is required"));
        }
        if self.max_cycles == 0 {
            return Err(invalid("matches.max_cycles", "a game needs at least one cycle"));
        }
        Ok(())
    }
}

fn default_swap_seats() -> bool {
    true
}

fn default_max_cycles() -> usize {
    DEFAULT_MAX_CYCLES
}

/// A seat at the table. The agent name doubles as the bot's username.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AgentConfig {
    pub name: String,
    pub kind: AgentKind,
    #[serde(default)]
    pub params: serde_yaml::Value,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    Builtin,
    External,
}

/// Path templates; `{run_id}` is substituted.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OutputsConfig {
    pub jsonl: String,
    pub summary_md: String,
}

impl OutputsConfig {
    fn validate(&self, run_id: &str) -> Result<(), ValidationError> {
        for (field, template) in [
            ("outputs.jsonl", &self.jsonl),
            ("outputs.summary_md", &self.summary_md),
        ] {
            if template.trim().is_empty() {
                return Err(invalid(field, "an output path is required"));
            }
            if substitute_run_id(run_id, template).file_name().is_none() {
                return Err(invalid(field, "output path must name a file"));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MetricsConfig {
    /// Agent the other one is compared against in the summary.
    #[serde(default)]
    pub baseline: Option<String>,
    #[serde(default = "default_latency_budget_ms")]
    pub latency_budget_ms: u64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            baseline: None,
            latency_budget_ms: DEFAULT_LATENCY_BUDGET_MS,
        }
    }
}

impl MetricsConfig {
    fn validate(&self, agents: &[AgentConfig]) -> Result<(), ValidationError> {
        let baseline = self
            .baseline
            .as_deref()
            .ok_or_else(|| invalid("metrics.baseline", "name the baseline agent"))?;
        if agents.iter().all(|agent| agent.name != baseline) {
            return Err(invalid(
                "metrics.baseline",
                format!("no agent is called '{baseline}'"),
            ));
        }
        if self.latency_budget_ms == 0 {
            return Err(invalid("metrics.latency_budget_ms", "budget must be positive"));
        }
        Ok(())
    }
}

fn default_latency_budget_ms() -> u64 {
    DEFAULT_LATENCY_BUDGET_MS
}

/// Structured logs are off unless enabled.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enable_structured: bool,
    #[serde(default = "default_tracing_level")]
    pub tracing_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable_structured: false,
            tracing_level: default_tracing_level(),
        }
    }
}

impl LoggingConfig {
    /// `None` for a level name tracing does not know.
    pub fn level(&self) -> Option<Level> {
        match self.tracing_level.to_ascii_lowercase().as_str() {
            "warning" => Some(Level::WARN),
            other => other.parse().ok(),
        }
    }
}

fn default_tracing_level() -> String {
    "info".to_string()
}

/// Run ids and agent names end up in paths and usernames.
fn check_name(field: &str, name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(invalid(field, "must not be empty"));
    }
    if let Some(bad) = name.chars().find(|c| !NAME_CHARS.contains(*c)) {
        return Err(invalid(
            field,
            format!("'{bad}' is not allowed; use letters, digits, '.', '_' or '-'"),
        ));
    }
    Ok(())
}

fn validate_agents(agents: &mut [AgentConfig]) -> Result<(), ValidationError> {
    if agents.len() != 2 {
        return Err(invalid(
            "agents",
            format!("exactly two agents are required, found {}", agents.len()),
        ));
    }

    let mut names = HashSet::new();
    for (index, agent) in agents.iter_mut().enumerate() {
        check_name(&format!("agents[{index}].name"), &agent.name)?;
        if !names.insert(agent.name.clone()) {
            return Err(invalid(
                "agents",
                format!("'{}' appears twice", agent.name),
            ));
        }
        if agent.params.is_null() {
            agent.params = serde_yaml::Value::Mapping(Default::default());
        }
    }
    Ok(())
}

fn substitute_run_id(run_id: &str, template: &str) -> PathBuf {
    PathBuf::from(template.replace("{run_id}", run_id))
}

fn invalid(field: &str, message: impl Into<String>) -> ValidationError {
    ValidationError::InvalidField {
        field: field.to_string(),
        message: message.into(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOutputs {
    pub jsonl: PathBuf,
    pub summary_md: PathBuf,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path:?}: {source}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("cannot parse {path:?}: {source}")]
    Parse {
        #[source]
        source: serde_yaml::Error,
        path: PathBuf,
    },
    #[error("{path:?} is not a usable run: {source}")]
    Invalid {
        path: PathBuf,
        source: ValidationError,
    },
}

impl ConfigError {
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. }
            | ConfigError::Parse { path, .. }
            | ConfigError::Invalid { path, .. } => path,
        }
    }
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
}
