//! Widget settings.
//!
//! The host owns the settings store; every operation receives a `Settings`
//! value read once per request. Values are sanitised while deserializing so a
//! hand-edited settings file can never produce an unusable configuration.

use anyhow::{Context, Result, anyhow};
use log::debug;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::runtime::Runtime;

/// Environment variable that overrides the API key from the settings file.
pub const API_KEY_ENV: &str = "WEATHER_COMPACT_API_KEY";

pub const DEFAULT_CACHE_MINUTES: u64 = 30;

/// Measurement system requested from the weather API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }

    pub fn temperature_suffix(&self) -> &'static str {
        match self {
            Units::Metric => "°C",
            Units::Imperial => "°F",
        }
    }

    pub fn speed_suffix(&self) -> &'static str {
        match self {
            Units::Metric => "m/s",
            Units::Imperial => "mph",
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Units {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "metric" => Ok(Units::Metric),
            "imperial" => Ok(Units::Imperial),
            _ => Err(anyhow!(
                "Unknown units: {}. Expected metric or imperial.",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api_key: String,
    pub location_name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(deserialize_with = "lenient_units")]
    pub units: Units,
    /// Weather cache lifetime in minutes.
    #[serde(deserialize_with = "at_least_one_minute")]
    pub cache_duration: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            location_name: "Albury".to_string(),
            latitude: 51.8614,
            longitude: -0.6833,
            units: Units::Metric,
            cache_duration: DEFAULT_CACHE_MINUTES,
        }
    }
}

impl Settings {
    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// Lifetime of a cached weather snapshot, never shorter than one minute.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_duration.max(1).saturating_mul(60))
    }

    /// Loads settings from `path`, falling back to defaults when the file does
    /// not exist. The API key environment variable wins over the file.
    #[tracing::instrument(skip(runtime))]
    pub fn load<R: Runtime>(runtime: &R, path: &Path) -> Result<Self> {
        let mut settings = if runtime.exists(path) {
            let content = runtime
                .read_to_string(path)
                .with_context(|| format!("Failed to read settings from {:?}", path))?;
            serde_json::from_str::<Settings>(&content)
                .with_context(|| format!("Failed to parse settings file {:?}", path))?
        } else {
            debug!("No settings file at {:?}, using defaults", path);
            Settings::default()
        };

        if let Ok(key) = runtime.env_var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                debug!("Using API key from {}", API_KEY_ENV);
                settings.api_key = key.trim().to_string();
            }
        }

        Ok(settings)
    }
}

/// `<config dir>/weather-compact/settings.json`
pub fn default_settings_path<R: Runtime>(runtime: &R) -> Result<PathBuf> {
    runtime
        .config_dir()
        .map(|dir| dir.join("weather-compact").join("settings.json"))
        .ok_or_else(|| anyhow!("Could not determine the configuration directory"))
}

/// Unknown or mistyped units fall back to metric.
fn lenient_units<'de, D>(deserializer: D) -> Result<Units, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(match raw.as_str().map(str::parse) {
        Some(Ok(units)) => units,
        _ => {
            debug!("Ignoring units setting {}, using metric", raw);
            Units::default()
        }
    })
}

/// Whole minutes, at least one. Numeric strings are accepted; anything else
/// falls back to the default duration.
fn at_least_one_minute<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    let minutes = match &raw {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_i64().map(|m| m.max(0) as u64))
            .or_else(|| n.as_f64().map(|m| m.max(0.0) as u64)),
        Value::String(s) => s.trim().parse::<i64>().ok().map(|m| m.max(0) as u64),
        _ => None,
    };

    match minutes {
        Some(minutes) => Ok(minutes.max(1)),
        None => {
            debug!("Ignoring cache_duration setting {}, using default", raw);
            Ok(DEFAULT_CACHE_MINUTES)
        }
    }
}
