//! # aeropulse
//!
//! A terminal dashboard and library for monitoring turbofan engine telemetry
//! streamed by a remaining-useful-life (RUL) prediction backend.
//!
//! The backend replays NASA C-MAPSS engine data one cycle at a time over a
//! WebSocket, attaching a predicted RUL and an overall engine status to every
//! frame. This crate consumes that stream, derives a per-channel status
//! (deviation from the channel's limit, warning band, trend) and keeps
//! critical channels on screen for a short retention window after they
//! recover, so that brief excursions are not missed.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Application                          │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐    ┌─────────┐ │
//! │  │  app    │───▶│   data   │───▶│   ui    │───▶│ Terminal│ │
//! │  │ (state) │    │(statuses)│    │(render) │    │         │ │
//! │  └────┬────┘    └──────────┘    └─────────┘    └─────────┘ │
//! │       │                                                     │
//! │       ├──────▶ source ◀── WebSocket | File | Stream | Channel│
//! │       │                                                     │
//! │       └──────▶ client ──▶ REST backend (login, engine, upload)│
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`app`]**: Application state, view navigation, and user interaction logic
//! - **[`source`]**: Telemetry source abstraction ([`DataSource`] trait) with
//!   implementations for the live socket, recorded files, byte streams and channels
//! - **[`data`]**: Threshold table, derived channel statuses, frame history
//!   and sticky critical alerts
//! - **[`client`]**: REST client, token storage and login session
//! - **[`settings`]**: Layered configuration (defaults, TOML file, environment)
//! - **[`ui`]**: Terminal rendering using ratatui
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Watch the live stream of a local backend
//! aeropulse --url http://localhost:8000
//!
//! # Log in once, then switch the simulated engine
//! aeropulse --login admin
//! aeropulse --engine 50
//!
//! # Replay a recorded session
//! aeropulse --replay session.jsonl
//! ```
//!
//! ### As a library with channel source
//!
//! ```
//! use aeropulse::{App, ChannelSource, StreamEvent, ThresholdConfig};
//!
//! let (tx, source) = ChannelSource::create("embedded");
//! let mut app = App::new(Box::new(source), ThresholdConfig::cmapss());
//!
//! tx.send(StreamEvent::Connected).unwrap();
//! assert!(app.reload_data());
//! assert!(app.telemetry.is_connected());
//! ```
//!
//! ### As a library with file source
//!
//! ```
//! use aeropulse::{App, FileSource, ThresholdConfig};
//!
//! let source = Box::new(FileSource::new("session.jsonl"));
//! let app = App::new(source, ThresholdConfig::cmapss());
//! ```
//!
//! ### Bridging from another transport
//!
//! ```no_run
//! use aeropulse::StreamSource;
//! use tokio::sync::mpsc;
//!
//! # tokio_test::block_on(async {
//! let (tx, rx) = mpsc::channel::<Vec<u8>>(16);
//! let source = StreamSource::from_bytes_channel(rx, "bridge");
//! # });
//! ```

pub mod app;
pub mod client;
pub mod data;
pub mod events;
pub mod settings;
pub mod source;
pub mod ui;

// Re-export main types for convenience
pub use app::{App, EngineControl, View};
pub use client::{ApiClient, ApiError, Backend, Session, TokenStore, UserProfile};
pub use data::{
    compute_statuses, CriticalAlert, Report, ReportRow, ReportStats, SensorGroup, SensorLevel,
    SensorStatus, SensorStatuses, SensorThreshold, StickyAlerts, TelemetryState, ThresholdConfig,
    Trend,
};
pub use settings::Settings;
pub use source::{
    ChannelSource, DataSource, EngineStatus, FileSource, Payload, ReconnectPolicy, StreamEvent,
    StreamSource, TelemetryFrame, WebSocketSource,
};
