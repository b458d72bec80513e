//! Derived dashboard state.
//!
//! This module turns the raw telemetry stream into what the views display.
//!
//! ## Submodules
//!
//! - [`telemetry`]: Stream consumer state ([`TelemetryState`]): latest frame,
//!   bounded history, connection flag
//! - [`history`]: The 50-frame sliding window with series/sparkline helpers
//! - [`thresholds`]: Per-channel limits ([`ThresholdConfig`])
//! - [`status`]: Per-channel classification ([`compute_statuses`])
//! - [`sticky`]: Time-based retention of critical alerts ([`StickyAlerts`])
//! - [`clock`]: Injectable time source
//! - [`report`]: Batch analysis rows and CSV export
//! - [`duration`]: Parsing and formatting of duration strings
//!
//! ## Data Flow
//!
//! ```text
//! StreamEvent
//!        │
//!        ▼
//! TelemetryState::apply()  ──▶ latest frame + FrameHistory
//!        │
//!        ▼
//! compute_statuses()       ──▶ SensorStatuses (per channel)
//!        │
//!        ▼
//! StickyAlerts::observe()  ──▶ critical_sensors() (alert list)
//!        ▲
//!        └── StickyAlerts::evaluate() on the periodic sweep
//! ```

pub mod clock;
pub mod duration;
pub mod history;
pub mod report;
pub mod status;
pub mod sticky;
pub mod telemetry;
pub mod thresholds;

pub use clock::{Clock, ManualClock, SystemClock};
pub use history::{FrameHistory, MAX_HISTORY_SIZE};
pub use report::{Report, ReportRow, ReportStats};
pub use status::{compute_statuses, SensorLevel, SensorStatus, SensorStatuses, Trend};
pub use sticky::{CriticalAlert, StickyAlerts, StickyEntry, RETENTION_WINDOW, SWEEP_INTERVAL};
pub use telemetry::{TelemetryState, Update};
pub use thresholds::{SensorGroup, SensorThreshold, ThresholdConfig, DEFAULT_WARNING_BAND};
