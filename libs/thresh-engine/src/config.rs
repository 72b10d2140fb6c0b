//! Engine configuration
//!
//! Sources, lowest to highest priority:
//! 1. Built-in defaults
//! 2. Optional config file (TOML, YAML or JSON, chosen by extension)
//! 3. Environment variables prefixed with `THRESH_` (e.g. `THRESH_MIN_DELAY_SECS=30`)

use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

use thresh_stats::TimeResolution;

use crate::error::{EngineError, Result};

/// Prefix of environment variables that override file settings
pub const ENV_PREFIX: &str = "THRESH_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Slots kept past the view end for samples that arrive early
    pub num_future_slots: usize,
    /// Grace period after a view ends before it is evaluated, in seconds
    pub min_delay_secs: i64,
    /// Timestamp granularity; `absolute` takes timestamps in seconds,
    /// `seconds` and `minutes` take milliseconds
    pub resolution: TimeResolution,
    /// Default log filter, overridden by `RUST_LOG`
    pub log_level: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            num_future_slots: 2,
            min_delay_secs: 10,
            resolution: TimeResolution::Absolute,
            log_level: "info".to_string(),
        }
    }
}

impl EngineConfig {
    /// Timestamp units per second
    pub fn time_unit(&self) -> i64 {
        match self.resolution {
            TimeResolution::Absolute => 1,
            TimeResolution::Seconds | TimeResolution::Minutes => 1_000,
        }
    }

    /// Grace period in timestamp units
    pub fn min_delay(&self) -> i64 {
        self.min_delay_secs.saturating_mul(self.time_unit())
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_delay_secs < 0 {
            return Err(EngineError::config(format!(
                "min_delay_secs must not be negative, got {}",
                self.min_delay_secs
            )));
        }
        if self.log_level.trim().is_empty() {
            return Err(EngineError::config("log_level must not be empty"));
        }
        Ok(())
    }
}

/// Load configuration from defaults, an optional file and the environment
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let mut figment = Figment::from(Serialized::defaults(EngineConfig::default()));
    if let Some(path) = path {
        figment = merge_file(figment, path)?;
    }

    let config: EngineConfig = figment
        .merge(Env::prefixed(ENV_PREFIX))
        .extract()
        .map_err(|e| EngineError::config(format!("Failed to load configuration: {}", e)))?;
    config.validate()?;
    Ok(config)
}

/// Load configuration from a specific file, without environment overrides
pub fn load_config_from_file<P: AsRef<Path>>(path: P) -> Result<EngineConfig> {
    let figment = merge_file(
        Figment::from(Serialized::defaults(EngineConfig::default())),
        path.as_ref(),
    )?;

    let config: EngineConfig = figment.extract().map_err(|e| {
        EngineError::config(format!("Failed to load configuration from file: {}", e))
    })?;
    config.validate()?;
    Ok(config)
}

fn merge_file(figment: Figment, path: &Path) -> Result<Figment> {
    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .ok_or_else(|| EngineError::config("Config file must have an extension"))?;

    if !path.exists() {
        return Err(EngineError::config(format!(
            "Config file not found: {}",
            path.display()
        )));
    }

    match extension {
        "toml" => Ok(figment.merge(Toml::file(path))),
        "yaml" | "yml" => Ok(figment.merge(Yaml::file(path))),
        "json" => Ok(figment.merge(Json::file(path))),
        _ => Err(EngineError::config(format!(
            "Unsupported config file format: {}",
            extension
        ))),
    }
}
