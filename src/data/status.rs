//! Per-channel status derivation.
//!
//! [`compute_statuses`] is a pure function of the latest frame, the history
//! window and the threshold table. It is re-run on every new frame.

use std::collections::BTreeMap;

use super::history::FrameHistory;
use super::thresholds::ThresholdConfig;
use crate::source::TelemetryFrame;

/// Classification of a single reading against its limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SensorLevel {
    Normal,
    Warning,
    Critical,
}

impl SensorLevel {
    pub fn symbol(&self) -> &'static str {
        match self {
            SensorLevel::Normal => "OK",
            SensorLevel::Warning => "WARN",
            SensorLevel::Critical => "CRIT",
        }
    }
}

/// Direction of a reading relative to the previous frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trend {
    Up,
    Down,
    Stable,
}

impl Trend {
    pub fn arrow(&self) -> &'static str {
        match self {
            Trend::Up => "↑",
            Trend::Down => "↓",
            Trend::Stable => "→",
        }
    }
}

/// Derived status of one channel.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorStatus {
    pub channel: String,
    pub value: f64,
    /// Percentage distance from `max`.
    pub deviation: f64,
    pub level: SensorLevel,
    pub trend: Trend,
}

/// Statuses keyed by channel name.
pub type SensorStatuses = BTreeMap<String, SensorStatus>;

/// Classify every configured channel in `latest`.
///
/// Returns an empty map when no frame has arrived yet.
pub fn compute_statuses(
    latest: Option<&TelemetryFrame>,
    history: &FrameHistory,
    config: &ThresholdConfig,
) -> SensorStatuses {
    let Some(latest) = latest else {
        return SensorStatuses::new();
    };

    let previous = history.previous();

    config
        .channels()
        .iter()
        .map(|c| {
            let value = latest.reading(&c.name);

            let deviation = if c.max == 0.0 {
                0.0
            } else {
                ((value - c.max) / c.max).abs() * 100.0
            };

            let is_critical = value > c.max;
            let is_warning = c
                .min
                .is_some_and(|min| value > c.max - (c.max - min) * config.warning_band());

            let level = if is_critical {
                SensorLevel::Critical
            } else if is_warning {
                SensorLevel::Warning
            } else {
                SensorLevel::Normal
            };

            // Compare against the prior frame's own reading; an absent
            // channel there means no trend, not a jump from zero.
            let trend = match previous.and_then(|p| p.sensors.get(&c.name)) {
                Some(&prior) if value > prior => Trend::Up,
                Some(&prior) if value < prior => Trend::Down,
                _ => Trend::Stable,
            };

            let status = SensorStatus {
                channel: c.name.clone(),
                value,
                deviation,
                level,
                trend,
            };
            (c.name.clone(), status)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::thresholds::{SensorGroup, SensorThreshold};
    use crate::source::EngineStatus;

    fn config(min: Option<f64>) -> ThresholdConfig {
        ThresholdConfig::new(vec![SensorThreshold {
            name: "X".to_string(),
            group: SensorGroup::Temperature,
            max: 100.0,
            min,
            label: "X".to_string(),
            unit: String::new(),
            color: None,
        }])
    }

    fn frame(cycle: u64, readings: &[(&str, f64)]) -> TelemetryFrame {
        TelemetryFrame {
            cycle,
            rul: 50.0,
            status: EngineStatus::Healthy,
            sensors: readings.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            failure_reasons: None,
            finished: false,
            data_quality: None,
            warnings: Vec::new(),
        }
    }

    /// Feed readings through a history and classify the last one.
    fn status_after(readings: &[f64], config: &ThresholdConfig) -> SensorStatus {
        let mut history = FrameHistory::new();
        for (i, v) in readings.iter().enumerate() {
            history.push(frame(i as u64, &[("X", *v)]));
        }
        let statuses = compute_statuses(history.latest(), &history, config);
        statuses["X"].clone()
    }

    #[test]
    fn test_critical_above_max() {
        let config = config(None);

        let over = status_after(&[101.0], &config);
        assert_eq!(over.level, SensorLevel::Critical);
        assert!((over.deviation - 1.0).abs() < 1e-9);

        let at = status_after(&[100.0], &config);
        assert_ne!(at.level, SensorLevel::Critical);
        assert_eq!(at.deviation, 0.0);
    }

    #[test]
    fn test_warning_band() {
        let config = config(Some(80.0));
        assert_eq!(status_after(&[97.0], &config).level, SensorLevel::Warning);
        assert_eq!(status_after(&[90.0], &config).level, SensorLevel::Normal);
        assert_eq!(status_after(&[96.0], &config).level, SensorLevel::Normal);
    }

    #[test]
    fn test_warning_band_is_configurable() {
        let config = config(Some(80.0)).with_warning_band(0.5);
        assert_eq!(status_after(&[91.0], &config).level, SensorLevel::Warning);
    }

    #[test]
    fn test_no_min_skips_warning() {
        let config = config(None);
        assert_eq!(status_after(&[99.9], &config).level, SensorLevel::Normal);
    }

    #[test]
    fn test_trend() {
        let config = config(None);
        assert_eq!(status_after(&[50.0, 60.0], &config).trend, Trend::Up);
        assert_eq!(status_after(&[60.0, 50.0], &config).trend, Trend::Down);
        assert_eq!(status_after(&[60.0, 60.0], &config).trend, Trend::Stable);
        assert_eq!(status_after(&[60.0], &config).trend, Trend::Stable);
    }

    #[test]
    fn test_trend_stable_when_prior_reading_absent() {
        let config = config(None);
        let mut history = FrameHistory::new();
        history.push(frame(1, &[]));
        history.push(frame(2, &[("X", 10.0)]));

        let statuses = compute_statuses(history.latest(), &history, &config);
        assert_eq!(statuses["X"].trend, Trend::Stable);
    }

    #[test]
    fn test_missing_reading_defaults_to_zero() {
        let config = config(Some(80.0));
        let mut history = FrameHistory::new();
        history.push(frame(1, &[]));

        let statuses = compute_statuses(history.latest(), &history, &config);
        assert_eq!(statuses["X"].value, 0.0);
        assert_eq!(statuses["X"].level, SensorLevel::Normal);
        assert!((statuses["X"].deviation - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_max_has_zero_deviation() {
        let mut channels = config(None).channels().to_vec();
        channels[0].max = 0.0;
        let zeroed = ThresholdConfig::new(channels);

        let status = status_after(&[5.0], &zeroed);
        assert_eq!(status.deviation, 0.0);
        assert_eq!(status.level, SensorLevel::Critical);
    }

    #[test]
    fn test_no_frame_no_statuses() {
        let statuses = compute_statuses(None, &FrameHistory::new(), &config(None));
        assert!(statuses.is_empty());
    }

    #[test]
    fn test_compute_is_idempotent() {
        let config = ThresholdConfig::default();
        let mut history = FrameHistory::new();
        history.push(frame(1, &[("LPC_Outlet_Temp", 643.0), ("Core_Speed", 9150.0)]));
        history.push(frame(2, &[("LPC_Outlet_Temp", 645.0), ("Core_Speed", 9080.0)]));

        let first = compute_statuses(history.latest(), &history, &config);
        let second = compute_statuses(history.latest(), &history, &config);
        assert_eq!(first, second);
        assert_eq!(first.len(), config.len());
        assert_eq!(first["LPC_Outlet_Temp"].level, SensorLevel::Critical);
        assert_eq!(first["Core_Speed"].trend, Trend::Down);
    }
}
