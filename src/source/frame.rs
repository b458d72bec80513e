//! Wire types for the telemetry stream.
//!
//! These types match the JSON frames pushed by the prediction backend on its
//! `/ws` endpoint, one per simulated engine cycle.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Overall engine health as reported by the backend's RUL model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EngineStatus {
    Healthy,
    Warning,
    Critical,
}

impl EngineStatus {
    /// Returns a short symbol for display.
    pub fn symbol(&self) -> &'static str {
        match self {
            EngineStatus::Healthy => "OK",
            EngineStatus::Warning => "WARN",
            EngineStatus::Critical => "CRIT",
        }
    }

    /// Returns the label used by the backend.
    pub fn label(&self) -> &'static str {
        match self {
            EngineStatus::Healthy => "Healthy",
            EngineStatus::Warning => "Warning",
            EngineStatus::Critical => "Critical",
        }
    }
}

/// One telemetry update from the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryFrame {
    /// Monotonic engine cycle counter.
    pub cycle: u64,

    /// Predicted remaining useful life, in cycles.
    #[serde(rename = "RUL")]
    pub rul: f64,

    /// Engine status derived from the RUL prediction.
    pub status: EngineStatus,

    /// Raw sensor readings keyed by channel name.
    ///
    /// Readings sent as `null` decode to `0.0`.
    #[serde(deserialize_with = "readings_or_zero")]
    pub sensors: BTreeMap<String, f64>,

    /// Human-readable reasons behind the current prediction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reasons: Option<Vec<String>>,

    /// Set once the simulated unit has failed and the stream is exhausted.
    #[serde(default)]
    pub finished: bool,

    /// Backend validation verdict for this frame ("valid" or "anomaly").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_quality: Option<String>,

    /// Out-of-range readings flagged by backend validation.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl TelemetryFrame {
    /// Reading for a channel, or `0.0` when the channel is absent.
    pub fn reading(&self, channel: &str) -> f64 {
        self.sensors.get(channel).copied().unwrap_or(0.0)
    }

    /// Decode a raw stream message.
    ///
    /// A message carrying `"finished": true` is a [`Payload::Finished`] marker
    /// regardless of any other fields; everything else must be a full frame.
    pub fn decode(bytes: &[u8]) -> Result<Payload, serde_json::Error> {
        let value: Value = serde_json::from_slice(bytes)?;
        if value.get("finished").and_then(Value::as_bool) == Some(true) {
            return Ok(Payload::Finished);
        }
        serde_json::from_value(value).map(Payload::Frame)
    }
}

/// A decoded stream message.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// A regular telemetry frame.
    Frame(TelemetryFrame),
    /// The unit has failed; no further frames will arrive for it.
    Finished,
}

fn readings_or_zero<'de, D>(deserializer: D) -> Result<BTreeMap<String, f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, Option<f64>>::deserialize(deserializer)?;
    Ok(raw.into_iter().map(|(channel, value)| (channel, value.unwrap_or(0.0))).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_frame() {
        let json = r#"{
            "finished": false,
            "cycle": 42,
            "RUL": 87.25,
            "status": "Warning",
            "sensors": {
                "LPC_Outlet_Temp": 642.1,
                "Core_Speed": 9050.0
            },
            "failure_reasons": ["High LPC temperature"],
            "data_quality": "valid",
            "alert": null
        }"#;

        let Payload::Frame(frame) = TelemetryFrame::decode(json.as_bytes()).unwrap() else {
            panic!("expected a frame");
        };
        assert_eq!(frame.cycle, 42);
        assert_eq!(frame.rul, 87.25);
        assert_eq!(frame.status, EngineStatus::Warning);
        assert_eq!(frame.reading("LPC_Outlet_Temp"), 642.1);
        assert_eq!(
            frame.failure_reasons,
            Some(vec!["High LPC temperature".to_string()])
        );
        assert_eq!(frame.data_quality.as_deref(), Some("valid"));
        assert!(!frame.finished);
    }

    #[test]
    fn test_missing_and_null_readings_default_to_zero() {
        let json = r#"{"cycle":1,"RUL":100,"status":"Healthy","sensors":{"Fan_Speed":null}}"#;

        let Payload::Frame(frame) = TelemetryFrame::decode(json.as_bytes()).unwrap() else {
            panic!("expected a frame");
        };
        assert_eq!(frame.reading("Fan_Speed"), 0.0);
        assert_eq!(frame.reading("Bypass_Ratio"), 0.0);
        assert!(frame.failure_reasons.is_none());
    }

    #[test]
    fn test_decode_finished_marker() {
        let payload = TelemetryFrame::decode(br#"{"finished": true}"#).unwrap();
        assert_eq!(payload, Payload::Finished);
    }

    #[test]
    fn test_decode_rejects_malformed_payloads() {
        assert!(TelemetryFrame::decode(b"not json").is_err());
        assert!(TelemetryFrame::decode(br#"{"cycle": 3}"#).is_err());
        assert!(TelemetryFrame::decode(br#"{"finished": false}"#).is_err());
        assert!(
            TelemetryFrame::decode(br#"{"cycle":1,"RUL":5,"status":"Dead","sensors":{}}"#)
                .is_err()
        );
    }
}
