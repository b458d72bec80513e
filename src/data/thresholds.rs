//! Per-channel sensor thresholds.
//!
//! The default table covers the turbofan channels streamed by the backend
//! (NASA C-MAPSS naming). It can be replaced from the settings file.

use serde::{Deserialize, Serialize};

/// Fraction of the `[min, max]` band below `max` that counts as a warning.
pub const DEFAULT_WARNING_BAND: f64 = 0.2;

/// Display group a channel belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorGroup {
    Temperature,
    Pressure,
    Speed,
    Flow,
    Bleed,
}

impl SensorGroup {
    pub const ALL: [SensorGroup; 5] = [
        SensorGroup::Temperature,
        SensorGroup::Pressure,
        SensorGroup::Speed,
        SensorGroup::Flow,
        SensorGroup::Bleed,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            SensorGroup::Temperature => "Temperature Sensors",
            SensorGroup::Pressure => "Pressure Systems",
            SensorGroup::Speed => "Rotational Speeds",
            SensorGroup::Flow => "Flow & Ratios",
            SensorGroup::Bleed => "Bleed & Enthalpy",
        }
    }
}

/// Static configuration for one monitored channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorThreshold {
    /// Channel identifier as it appears in frame `sensors`.
    pub name: String,
    pub group: SensorGroup,
    /// Upper safe bound; readings above it are critical.
    pub max: f64,
    /// Lower bound of the nominal band, enabling warning detection.
    #[serde(default)]
    pub min: Option<f64>,
    pub label: String,
    #[serde(default)]
    pub unit: String,
    /// Hex color (`#RRGGBB`) for charts.
    #[serde(default)]
    pub color: Option<String>,
}

impl SensorThreshold {
    fn new(
        name: &str,
        group: SensorGroup,
        (min, max): (f64, f64),
        label: &str,
        unit: &str,
        color: &str,
    ) -> Self {
        Self {
            name: name.to_string(),
            group,
            max,
            min: Some(min),
            label: label.to_string(),
            unit: unit.to_string(),
            color: Some(color.to_string()),
        }
    }
}

/// The full channel table plus the warning policy.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdConfig {
    channels: Vec<SensorThreshold>,
    warning_band: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self::cmapss()
    }
}

impl ThresholdConfig {
    /// Build a config from an explicit channel table.
    pub fn new(channels: Vec<SensorThreshold>) -> Self {
        Self {
            channels,
            warning_band: DEFAULT_WARNING_BAND,
        }
    }

    /// Turbofan channel limits derived from the training data.
    pub fn cmapss() -> Self {
        use SensorGroup::*;

        Self::new(vec![
            SensorThreshold::new("LPC_Outlet_Temp", Temperature, (640.0, 644.0), "LPC Temp", "°R", "#3B82F6"),
            SensorThreshold::new("HPC_Outlet_Temp", Temperature, (1580.0, 1590.0), "HPC Temp", "°R", "#8B5CF6"),
            SensorThreshold::new("LPT_Outlet_Temp", Temperature, (1390.0, 1420.0), "LPT Temp", "°R", "#EF4444"),
            SensorThreshold::new("HPC_Outlet_Pressure", Pressure, (545.0, 555.0), "HPC Press", "psia", "#10B981"),
            SensorThreshold::new("Combustion_Pressure", Pressure, (36.0, 48.5), "Combustion Press", "psia", "#F59E0B"),
            SensorThreshold::new("Fan_Speed", Speed, (2380.0, 2400.0), "Fan Speed", "rpm", "#06B6D4"),
            SensorThreshold::new("Core_Speed", Speed, (9000.0, 9100.0), "Core Speed", "rpm", "#8B5CF6"),
            SensorThreshold::new("Corrected_Fan_Speed", Speed, (2380.0, 2390.0), "Corr Fan", "rpm", "#14B8A6"),
            SensorThreshold::new("Corrected_Core_Speed", Speed, (8100.0, 8150.0), "Corr Core", "rpm", "#A855F7"),
            SensorThreshold::new("Bypass_Ratio", Flow, (8.3, 8.5), "Bypass Ratio", "--", "#EC4899"),
            SensorThreshold::new("Fuel_Flow_Ratio", Flow, (128.0, 537.0), "Fuel Flow φ", "temp-like", "#F59E0B"),
            SensorThreshold::new("Bleed_Enthalpy", Bleed, (390.0, 395.0), "Bleed Enthalpy", "--", "#6366F1"),
            SensorThreshold::new("HPT_Coolant_Bleed", Bleed, (38.5, 39.5), "HPT Coolant", "lbm/s", "#F43F5E"),
            SensorThreshold::new("LPT_Coolant_Bleed", Bleed, (23.0, 23.5), "LPT Coolant (Vib)", "lbm/s", "#EF4444"),
        ])
    }

    /// Override the warning band fraction.
    pub fn with_warning_band(mut self, warning_band: f64) -> Self {
        self.warning_band = warning_band;
        self
    }

    pub fn warning_band(&self) -> f64 {
        self.warning_band
    }

    /// All channels in table order.
    pub fn channels(&self) -> &[SensorThreshold] {
        &self.channels
    }

    /// Look up one channel.
    pub fn get(&self, name: &str) -> Option<&SensorThreshold> {
        self.channels.iter().find(|c| c.name == name)
    }

    /// Groups that have at least one channel, in display order.
    pub fn groups(&self) -> Vec<SensorGroup> {
        SensorGroup::ALL
            .into_iter()
            .filter(|g| self.channels.iter().any(|c| c.group == *g))
            .collect()
    }

    /// Channels in one group, in table order.
    pub fn channels_in(&self, group: SensorGroup) -> Vec<&SensorThreshold> {
        self.channels.iter().filter(|c| c.group == group).collect()
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table() {
        let config = ThresholdConfig::default();
        assert_eq!(config.len(), 14);
        assert_eq!(config.warning_band(), DEFAULT_WARNING_BAND);

        let lpc = config.get("LPC_Outlet_Temp").unwrap();
        assert_eq!(lpc.max, 644.0);
        assert_eq!(lpc.min, Some(640.0));
        assert_eq!(lpc.group, SensorGroup::Temperature);

        assert!(config.get("Nope").is_none());
        assert_eq!(config.groups(), SensorGroup::ALL.to_vec());
        assert_eq!(config.channels_in(SensorGroup::Speed).len(), 4);
    }

    #[test]
    fn test_groups_skip_empty() {
        let config = ThresholdConfig::new(vec![SensorThreshold {
            name: "Bypass_Ratio".to_string(),
            group: SensorGroup::Flow,
            max: 8.5,
            min: None,
            label: "Bypass".to_string(),
            unit: String::new(),
            color: None,
        }])
        .with_warning_band(0.1);

        assert_eq!(config.groups(), vec![SensorGroup::Flow]);
        assert_eq!(config.warning_band(), 0.1);
    }

    #[test]
    fn test_deserialize_threshold() {
        let json = r#"{"name":"Fan_Speed","group":"speed","max":2400,"label":"Fan"}"#;
        let threshold: SensorThreshold = serde_json::from_str(json).unwrap();
        assert_eq!(threshold.group, SensorGroup::Speed);
        assert!(threshold.min.is_none());
        assert!(threshold.unit.is_empty());
    }
}
