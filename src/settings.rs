//! Layered settings: built-in defaults, an optional TOML file, then
//! `AEROPULSE_*` environment variables.
//!
//! ```toml
//! base_url = "http://localhost:8000"
//! unit_id = 34
//! retention = "5s"
//! sweep_interval = "1s"
//! warning_band = 0.2
//!
//! [[sensors]]
//! name = "Core_Speed"
//! group = "speed"
//! min = 9000.0
//! max = 9100.0
//! label = "Core Speed"
//! unit = "rpm"
//! ```

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment, File, Map};
use serde::Deserialize;

use crate::data::duration;
use crate::data::thresholds::{SensorThreshold, ThresholdConfig, DEFAULT_WARNING_BAND};
use crate::source::ReconnectPolicy;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "AEROPULSE";

/// Backend address used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// HTTP base of the backend; the telemetry socket lives at `/ws`.
    pub base_url: String,
    /// Engine unit to select on start.
    #[serde(default)]
    pub unit_id: Option<u32>,
    #[serde(deserialize_with = "duration::deserialize")]
    pub retention: Duration,
    #[serde(deserialize_with = "duration::deserialize")]
    pub sweep_interval: Duration,
    /// Pacing of recorded frames in replay mode.
    #[serde(deserialize_with = "duration::deserialize")]
    pub replay_interval: Duration,
    pub warning_band: f64,
    /// Reconnect the telemetry socket after it drops.
    pub reconnect: bool,
    /// Replaces the built-in channel table when non-empty.
    #[serde(default)]
    pub sensors: Vec<SensorThreshold>,
}

impl Settings {
    /// Load settings, reading `path` when given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::build(path, None)
    }

    fn build(path: Option<&Path>, env: Option<Map<String, String>>) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("base_url", DEFAULT_BASE_URL)?
            .set_default("retention", "5000ms")?
            .set_default("sweep_interval", "1000ms")?
            .set_default("replay_interval", "300ms")?
            .set_default("warning_band", DEFAULT_WARNING_BAND)?
            .set_default("reconnect", true)?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        let config = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .source(env),
            )
            .build()
            .context("Failed to read settings")?;

        let settings: Settings = config
            .try_deserialize()
            .context("Invalid settings")?;

        if !(0.0..=1.0).contains(&settings.warning_band) {
            anyhow::bail!(
                "warning_band must be between 0 and 1, got {}",
                settings.warning_band
            );
        }

        Ok(settings)
    }

    /// Threshold table with the configured warning band.
    pub fn thresholds(&self) -> ThresholdConfig {
        let config = if self.sensors.is_empty() {
            ThresholdConfig::cmapss()
        } else {
            ThresholdConfig::new(self.sensors.clone())
        };
        config.with_warning_band(self.warning_band)
    }

    /// Telemetry socket address derived from the HTTP base.
    pub fn ws_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        let base = if let Some(rest) = base.strip_prefix("https://") {
            format!("wss://{}", rest)
        } else if let Some(rest) = base.strip_prefix("http://") {
            format!("ws://{}", rest)
        } else {
            base.to_string()
        };
        format!("{}/ws", base)
    }

    pub fn reconnect_policy(&self) -> ReconnectPolicy {
        if self.reconnect {
            ReconnectPolicy::default()
        } else {
            ReconnectPolicy::disabled()
        }
    }
}
