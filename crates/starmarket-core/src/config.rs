//! Configuration loading: the engine YAML file and the constants table.
//!
//! The embedding application reads `starmarket-config.yaml` into
//! [`EngineConfig`]. Simulation tunables live separately in
//! `constants.json` and reach the simulation through a [`ConstantsSource`],
//! so they can be reloaded while the engine runs.

use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Deserialize;
use starmarket_catalog::csv_map::parse_decimal;
use starmarket_catalog::{CatalogPaths, ResourceRoles};
use starmarket_types::SimulationConstants;
use tracing::{debug, warn};

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read a configuration file from disk.
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

    /// Failed to parse JSON content.
    #[error("failed to parse constants JSON: {source}")]
    Json {
        /// The underlying JSON parse error.
        source: serde_json::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(source: serde_json::Error) -> Self {
        Self::Json { source }
    }
}

// ---------------------------------------------------------------------------
// Engine configuration (YAML)
// ---------------------------------------------------------------------------

/// Top-level engine configuration.
///
/// Mirrors the structure of `starmarket-config.yaml`. Every section and
/// field has a default, so an empty file is valid.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EngineConfig {
    /// Catalog table locations.
    #[serde(default)]
    pub data: CatalogPaths,

    /// Frame loop settings.
    #[serde(default)]
    pub engine: EngineSettings,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Currency and population resource ids.
    #[serde(default)]
    pub roles: ResourceRoles,
}

impl EngineConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yml::from_str(yaml)?)
    }
}

/// Frame loop settings for the embedding application.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EngineSettings {
    /// Real milliseconds between frames.
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,

    /// Multiplier applied to real frame time before it reaches the clock.
    #[serde(default = "default_time_scale")]
    pub time_scale: f64,

    /// Stop after this many ticks (0 = run until interrupted).
    #[serde(default)]
    pub max_ticks: u64,

    /// Log a summary every this many ticks (0 = never).
    #[serde(default = "default_summary_interval_ticks")]
    pub summary_interval_ticks: u64,

    /// How often to check the constants file for changes.
    #[serde(default = "default_constants_poll_interval_ms")]
    pub constants_poll_interval_ms: u64,

    /// Where to write the final state snapshot, if anywhere.
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: Option<PathBuf>,
}

const fn default_frame_interval_ms() -> u64 {
    100
}

const fn default_time_scale() -> f64 {
    1.0
}

const fn default_summary_interval_ticks() -> u64 {
    10
}

const fn default_constants_poll_interval_ms() -> u64 {
    500
}

fn default_snapshot_path() -> Option<PathBuf> {
    Some(PathBuf::from("starmarket-snapshot.json"))
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            frame_interval_ms: default_frame_interval_ms(),
            time_scale: default_time_scale(),
            max_ticks: 0,
            summary_interval_ticks: default_summary_interval_ticks(),
            constants_poll_interval_ms: default_constants_poll_interval_ms(),
            snapshot_path: default_snapshot_path(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default `tracing` filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_owned()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ---------------------------------------------------------------------------
// Constants table (JSON)
// ---------------------------------------------------------------------------

/// One row of `constants.json`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConstantEntry {
    /// Tunable name, e.g. `seconds_per_tick`.
    pub name: String,
    /// Number or numeric string.
    pub value: serde_json::Value,
    /// Free-form explanation for humans.
    #[serde(default)]
    pub description: Option<String>,
}

fn decimal_value(value: &serde_json::Value) -> Option<Decimal> {
    match value {
        serde_json::Value::Number(number) => parse_decimal(&number.to_string()),
        serde_json::Value::String(text) => parse_decimal(text),
        _ => None,
    }
}

/// Build a constants snapshot from table rows.
///
/// Entries missing from the table keep their defaults. Unknown names are
/// ignored. Values that are not numbers, or are negative, fall back to the
/// default for that entry.
pub fn constants_from_entries(entries: &[ConstantEntry]) -> SimulationConstants {
    let mut constants = SimulationConstants::default();
    for entry in entries {
        let Some(value) = decimal_value(&entry.value).filter(|v| *v >= Decimal::ZERO) else {
            warn!(name = %entry.name, value = %entry.value, "invalid constant, keeping default");
            continue;
        };
        let name = entry.name.trim();
        match name {
            "seconds_per_tick" => constants.seconds_per_tick = value,
            "min_resource_share" => constants.min_resource_share = value,
            "credit_decay_per_tick" => constants.credit_decay_per_tick = value,
            "population_decay_per_tick" => constants.population_decay_per_tick = value,
            "reserve_ticks_ahead" => constants.reserve_ticks_ahead = value,
            "reserve_penalty_ticks_ahead" => constants.reserve_penalty_ticks_ahead = value,
            "price_decrease_per_tick" => constants.price_decrease_per_tick = value,
            "price_increase_per_tick" => constants.price_increase_per_tick = value,
            "min_price_multiplier" => constants.min_price_multiplier = value,
            "max_price_multiplier" => constants.max_price_multiplier = value,
            "average_price_collect_ticks" => {
                if let Some(ticks) = value.trunc().to_u64() {
                    constants.average_price_collect_ticks = ticks;
                }
            }
            "max_processes_per_tick" => {
                if let Some(starts) = value.trunc().to_u32() {
                    constants.max_processes_per_tick = starts;
                }
            }
            _ => debug!(name, "unknown constant ignored"),
        }
    }
    constants
}

/// Parse a constants table held in memory.
///
/// # Errors
///
/// Returns [`ConfigError::Json`] if the content is not a JSON array of
/// constant rows.
pub fn parse_constants(json: &str) -> Result<SimulationConstants, ConfigError> {
    let entries: Vec<ConstantEntry> = serde_json::from_str(json)?;
    Ok(constants_from_entries(&entries))
}

/// Where a simulation gets its constants from.
///
/// The returned snapshot's `version` is ignored; the simulation numbers
/// snapshots itself.
pub trait ConstantsSource: Send {
    /// Produce a fresh constants snapshot.
    fn load(&self) -> Result<SimulationConstants, ConfigError>;

    /// Short human-readable description for logs.
    fn describe(&self) -> String;
}

/// Constants read from a JSON table on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonFileConstants {
    path: PathBuf,
}

impl JsonFileConstants {
    /// Read constants from `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the table.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConstantsSource for JsonFileConstants {
    fn load(&self) -> Result<SimulationConstants, ConfigError> {
        let contents = std::fs::read_to_string(&self.path)?;
        parse_constants(&contents)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// A fixed constants snapshot, for tests and embedded defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticConstants(pub SimulationConstants);

impl ConstantsSource for StaticConstants {
    fn load(&self) -> Result<SimulationConstants, ConfigError> {
        Ok(self.0.clone())
    }

    fn describe(&self) -> String {
        "static".to_owned()
    }
}
