//! Configuration loading and typed config structures.
//!
//! The canonical configuration lives in `reclaim-config.yaml` at the project
//! root. Every field has a default, so an empty file (or no file at all)
//! yields the standard 15x9 run with one robot and four waste units per
//! tier.

use std::path::{Path, PathBuf};

use reclaim_agents::{MovementMode, RobotTuning, Variant};
use reclaim_types::{PerTier, Tier};
use serde::Deserialize;

use crate::world::{AgentOrder, WorldParams};

/// Environment variable overriding `world.seed`.
pub const SEED_ENV: &str = "RECLAIM_SEED";

/// Environment variable overriding `simulation.max_ticks`.
pub const MAX_TICKS_ENV: &str = "RECLAIM_MAX_TICKS";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// An environment override did not parse.
    #[error("invalid value {value:?} for {var}")]
    InvalidOverride {
        /// The variable name.
        var: &'static str,
        /// The value found.
        value: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration, mirroring `reclaim-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SimulationConfig {
    /// Grid size, seed, and turn order.
    #[serde(default)]
    pub world: WorldConfig,

    /// Initial waste per tier.
    #[serde(default)]
    pub waste: WasteConfig,

    /// Robots per tier.
    #[serde(default)]
    pub agents: AgentsConfig,

    /// Robot tuning shared by every robot.
    #[serde(default)]
    pub robot: RobotTuning,

    /// Run bounds and pacing.
    #[serde(default)]
    pub simulation: SimulationBounds,

    /// Logging.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Final report output.
    #[serde(default)]
    pub report: ReportConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file, then apply environment
    /// overrides (`RECLAIM_SEED`, `RECLAIM_MAX_TICKS`).
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Parse configuration from a YAML string. No overrides are applied.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Override YAML values from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|var| std::env::var(var).ok())
    }

    /// Override YAML values from `lookup`, which maps a variable name to
    /// its value when set.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(seed) = parse_override(&lookup, SEED_ENV)? {
            self.world.seed = seed;
        }
        if let Some(max_ticks) = parse_override(&lookup, MAX_TICKS_ENV)? {
            self.simulation.max_ticks = max_ticks;
        }
        Ok(())
    }

    /// The plain parameters a world is built from.
    pub fn world_params(&self) -> WorldParams {
        WorldParams {
            width: self.world.width,
            height: self.world.height,
            waste: PerTier::new(self.waste.green, self.waste.yellow, self.waste.red),
            agents: PerTier::new(
                self.agents.green.count,
                self.agents.yellow.count,
                self.agents.red.count,
            ),
            variants: PerTier::new(
                self.agents.green.variant_for(Tier::Green),
                self.agents.yellow.variant_for(Tier::Yellow),
                self.agents.red.variant_for(Tier::Red),
            ),
            movement: PerTier::new(
                self.agents.green.movement,
                self.agents.yellow.movement,
                self.agents.red.movement,
            ),
            seed: self.world.seed,
            agent_order: self.world.agent_order,
            tuning: self.robot,
        }
    }
}

fn parse_override(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<u64>, ConfigError> {
    lookup(var)
        .map(|value| {
            value
                .trim()
                .parse::<u64>()
                .map_err(|_e| ConfigError::InvalidOverride { var, value })
        })
        .transpose()
}

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Grid columns; at least 3 (one per zone).
    #[serde(default = "default_width")]
    pub width: u32,

    /// Grid rows.
    #[serde(default = "default_height")]
    pub height: u32,

    /// Random seed for reproducibility.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Turn order within a tick.
    #[serde(default)]
    pub agent_order: AgentOrder,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            seed: default_seed(),
            agent_order: AgentOrder::default(),
        }
    }
}

/// Initial waste units per tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct WasteConfig {
    /// Green units, seeded in z1.
    #[serde(default = "default_waste")]
    pub green: u32,

    /// Yellow units, seeded in z2.
    #[serde(default = "default_waste")]
    pub yellow: u32,

    /// Red units, seeded in z3.
    #[serde(default = "default_waste")]
    pub red: u32,
}

impl Default for WasteConfig {
    fn default() -> Self {
        Self {
            green: default_waste(),
            yellow: default_waste(),
            red: default_waste(),
        }
    }
}

/// Robots of one tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct AgentGroup {
    /// How many; each gets its own horizontal strip.
    #[serde(default = "default_agent_count")]
    pub count: u32,

    /// Role. Unset means gather for green and yellow, courier for red.
    #[serde(default)]
    pub variant: Option<Variant>,

    /// Sweep orientation.
    #[serde(default)]
    pub movement: MovementMode,
}

impl AgentGroup {
    /// The configured variant, or the tier's default.
    pub fn variant_for(&self, tier: Tier) -> Variant {
        self.variant.unwrap_or(match tier {
            Tier::Green | Tier::Yellow => Variant::Gather,
            Tier::Red => Variant::Courier,
        })
    }
}

impl Default for AgentGroup {
    fn default() -> Self {
        Self {
            count: default_agent_count(),
            variant: None,
            movement: MovementMode::default(),
        }
    }
}

/// Robots per tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct AgentsConfig {
    /// Green robots.
    #[serde(default)]
    pub green: AgentGroup,

    /// Yellow robots.
    #[serde(default)]
    pub yellow: AgentGroup,

    /// Red robots.
    #[serde(default)]
    pub red: AgentGroup,
}

/// Run bounds and pacing. A value of 0 for either limit means unlimited.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SimulationBounds {
    /// Maximum ticks before the run ends (0 = unlimited).
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u64,

    /// Maximum wall-clock seconds before the run ends (0 = unlimited).
    #[serde(default)]
    pub max_real_time_seconds: u64,

    /// Real-time milliseconds slept between ticks.
    #[serde(default)]
    pub tick_interval_ms: u64,
}

impl Default for SimulationBounds {
    fn default() -> Self {
        Self {
            max_ticks: default_max_ticks(),
            max_real_time_seconds: 0,
            tick_interval_ms: 0,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error) when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,

    /// Ticks between progress lines (0 = only log disposals).
    #[serde(default = "default_progress_interval")]
    pub progress_interval: u64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            progress_interval: default_progress_interval(),
        }
    }
}

/// Final report output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReportConfig {
    /// Where to write the JSON report. Unset means no file.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

const fn default_width() -> u32 {
    15
}

const fn default_height() -> u32 {
    9
}

const fn default_seed() -> u64 {
    42
}

const fn default_waste() -> u32 {
    4
}

const fn default_agent_count() -> u32 {
    1
}

const fn default_max_ticks() -> u64 {
    500
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_progress_interval() -> u64 {
    25
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_standard_run() {
        let config = SimulationConfig::default();
        assert_eq!(config.world.width, 15);
        assert_eq!(config.world.height, 9);
        assert_eq!(config.simulation.max_ticks, 500);
        assert_eq!(config.world_params(), WorldParams::default());
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
world:
  width: 21
  height: 12
  seed: 7
  agent_order: fixed

waste:
  green: 6
  yellow: 2
  red: 0

agents:
  green:
    count: 3
  yellow:
    count: 2
    movement: sweep_vertical
  red:
    count: 2
    variant: courier

robot:
  stuck_threshold: 3
  diagonal_recovery: false
  backlog_capacity: 4
  seen_capacity: 16

simulation:
  max_ticks: 1000
  max_real_time_seconds: 30
  tick_interval_ms: 10

logging:
  level: "debug"
  json: true

report:
  path: "out/report.json"
"#;
        let config = SimulationConfig::parse(yaml).unwrap();
        assert_eq!(config.world.width, 21);
        assert_eq!(config.world.agent_order, AgentOrder::Fixed);
        assert_eq!(config.waste.red, 0);
        assert_eq!(config.agents.yellow.movement, MovementMode::SweepVertical);
        assert_eq!(config.robot.stuck_threshold, 3);
        assert!(!config.robot.diagonal_recovery);
        assert_eq!(config.robot.perception_radius, 1);
        assert_eq!(config.simulation.tick_interval_ms, 10);
        assert!(config.logging.json);
        assert_eq!(config.logging.progress_interval, 25);
        assert_eq!(config.report.path, Some(PathBuf::from("out/report.json")));

        let params = config.world_params();
        assert_eq!(params.agents, PerTier::new(3, 2, 2));
        assert_eq!(
            params.variants,
            PerTier::new(Variant::Gather, Variant::Gather, Variant::Courier)
        );
    }

    #[test]
    fn parse_minimal_yaml() {
        let config = SimulationConfig::parse("world:\n  seed: 9\n").unwrap();
        assert_eq!(config.world.seed, 9);
        assert_eq!(config.world.width, 15);
        assert_eq!(config.waste, WasteConfig::default());
        assert_eq!(config.agents.red.count, 1);
    }

    #[test]
    fn parse_empty_yaml() {
        assert!(SimulationConfig::parse("").is_ok());
    }

    #[test]
    fn overrides_replace_yaml_values() {
        let mut config = SimulationConfig::parse("world:\n  seed: 9\n").unwrap();
        config
            .apply_overrides(|var| match var {
                SEED_ENV => Some("1234".to_owned()),
                MAX_TICKS_ENV => Some(" 80 ".to_owned()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.world.seed, 1234);
        assert_eq!(config.simulation.max_ticks, 80);
    }

    #[test]
    fn bad_override_is_reported() {
        let mut config = SimulationConfig::default();
        let result = config.apply_overrides(|var| (var == SEED_ENV).then(|| "soon".to_owned()));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidOverride { var: SEED_ENV, .. })
        ));
        assert_eq!(config.world.seed, 42);
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("reclaim-config.yaml");
        if path.exists() {
            let config = SimulationConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }
}
