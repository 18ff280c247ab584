//! Configuration loading and typed config structures for the Launchpad
//! simulation.
//!
//! The canonical configuration lives in `launchpad-config.yaml` at the
//! project root. Each engine crate owns the struct for its own section;
//! this module stitches them together under one [`GameConfig`] and adds
//! the session and logging sections. Every field has a default, so a
//! partial or empty file is valid.

use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::warn;

use launchpad_combo::ComboConfig;
use launchpad_difficulty::DifficultyConfig;
use launchpad_events::{Event, EventCatalog, EventConfig, EventError};
use launchpad_ledger::{LedgerConfig, LedgerError};

/// Environment variable that overrides `session.seed`.
pub const SEED_ENV: &str = "LAUNCHPAD_SEED";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read a configuration or catalog file from disk.
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

    /// The `economy` section describes impossible resource bounds.
    #[error("invalid economy section: {source}")]
    Economy {
        /// The underlying ledger error.
        #[from]
        source: LedgerError,
    },

    /// The event catalog failed validation.
    #[error("invalid event catalog: {source}")]
    Catalog {
        /// The underlying event error.
        #[from]
        source: EventError,
    },

    /// A value is outside its allowed range.
    #[error("invalid value for {field}: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level game configuration.
///
/// Mirrors the structure of `launchpad-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GameConfig {
    /// Resource bounds and starting levels.
    #[serde(default)]
    pub economy: LedgerConfig,

    /// Event trigger tuning and catalog source.
    #[serde(default)]
    pub events: EventsSection,

    /// Synergy window.
    #[serde(default)]
    pub combo: ComboConfig,

    /// Challenge history retention.
    #[serde(default)]
    pub difficulty: DifficultyConfig,

    /// Seed and per-session caps.
    #[serde(default)]
    pub session: SessionConfig,

    /// Log level and output format.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl GameConfig {
    /// Load configuration from a YAML file at the given path, with
    /// overrides from the process environment.
    ///
    /// # Errors
    ///
    /// See [`load`](Self::load).
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        Self::load(path, |key| std::env::var(key).ok())
    }

    /// Load configuration from a YAML file, then apply overrides from
    /// `lookup`.
    ///
    /// A relative `events.catalog_path` is resolved against the file's
    /// directory. `LAUNCHPAD_SEED` overrides `session.seed`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or a
    /// validation error from [`validate`](Self::validate).
    pub fn load(path: &Path, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.apply_overrides(lookup);
        if let Some(catalog) = &config.events.catalog_path
            && catalog.is_relative()
            && let Some(dir) = path.parent()
        {
            config.events.catalog_path = Some(dir.join(catalog));
        }
        Ok(config)
    }

    /// Parse configuration from a YAML string. No overrides are applied.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or a
    /// validation error from [`validate`](Self::validate).
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a key lookup (the process environment in
    /// production). Unparsable values are ignored with a warning.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(raw) = lookup(SEED_ENV) {
            match raw.trim().parse() {
                Ok(seed) => self.session.seed = seed,
                Err(_) => warn!(value = %raw, "ignoring unparsable {SEED_ENV}"),
            }
        }
    }

    /// Check cross-field constraints serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Economy`] for inconsistent resource bounds or
    /// [`ConfigError::Invalid`] for an out-of-range value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.economy.validate()?;

        let p = self.events.engine.trigger_probability;
        if p < Decimal::ZERO || p > Decimal::ONE {
            return Err(ConfigError::Invalid {
                field: "events.trigger_probability",
                reason: format!("{p} is outside [0, 1]"),
            });
        }
        if self.combo.window_size == 0 {
            return Err(ConfigError::Invalid {
                field: "combo.window_size",
                reason: "must be at least 1".to_owned(),
            });
        }
        if self.session.skill_log_cap < self.combo.window_size {
            return Err(ConfigError::Invalid {
                field: "session.skill_log_cap",
                reason: format!(
                    "{} is smaller than combo.window_size {}",
                    self.session.skill_log_cap, self.combo.window_size
                ),
            });
        }
        Ok(())
    }

    /// Build the event catalog: the YAML file at `events.catalog_path` if
    /// set, otherwise the built-in startup catalog.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] or [`ConfigError::Yaml`] for an unreadable
    /// file, or [`ConfigError::Catalog`] if an event fails validation.
    pub fn event_catalog(&self) -> Result<EventCatalog, ConfigError> {
        self.events
            .catalog_path
            .as_deref()
            .map_or_else(|| EventCatalog::builtin().map_err(ConfigError::from), load_catalog)
    }
}

/// Read an event catalog from a YAML file.
///
/// The file holds a top-level `events:` sequence of event templates.
///
/// # Errors
///
/// See [`GameConfig::event_catalog`].
pub fn load_catalog(path: &Path) -> Result<EventCatalog, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    parse_catalog(&contents)
}

/// Parse an event catalog from a YAML string.
///
/// # Errors
///
/// See [`GameConfig::event_catalog`].
pub fn parse_catalog(yaml: &str) -> Result<EventCatalog, ConfigError> {
    #[derive(Deserialize)]
    struct CatalogFile {
        events: Vec<Event>,
    }
    let file: CatalogFile = serde_yml::from_str(yaml)?;
    Ok(EventCatalog::new(file.events)?)
}

/// The `events` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EventsSection {
    /// Trigger probability, rarity weights, history cap, repeat window.
    #[serde(flatten)]
    pub engine: EventConfig,

    /// Optional YAML catalog replacing the built-in events.
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,
}

/// The `session` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionConfig {
    /// Seed for the session RNG.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Skill uses retained in the session log.
    #[serde(default = "default_skill_log_cap")]
    pub skill_log_cap: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            skill_log_cap: default_skill_log_cap(),
        }
    }
}

const fn default_seed() -> u64 {
    42
}

const fn default_skill_log_cap() -> usize {
    100
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// The `logging` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_owned()
}
