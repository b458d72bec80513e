//! Data source abstraction for receiving telemetry frames.
//!
//! This module provides a trait-based abstraction for consuming the backend's
//! telemetry stream from various sources (the live WebSocket, recorded files,
//! arbitrary byte streams, in-memory channels).

mod channel;
mod file;
mod frame;
mod stream;
mod websocket;

pub use channel::ChannelSource;
pub use file::FileSource;
pub use frame::{EngineStatus, Payload, TelemetryFrame};
pub use stream::StreamSource;
pub use websocket::{ReconnectPolicy, WebSocketSource};

use std::fmt::Debug;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;

/// An event produced by a telemetry source.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// The underlying connection was opened.
    Connected,
    /// A telemetry frame arrived.
    Frame(TelemetryFrame),
    /// The backend reported that the current unit has failed.
    Finished,
    /// The connection was closed or lost.
    Disconnected(String),
}

/// Trait for consuming telemetry from various sources.
///
/// Sources are polled from the UI loop, which stays the single mutator of
/// all derived state. Any network IO happens on background tasks that
/// forward [`StreamEvent`]s.
///
/// # Example
///
/// ```
/// use aeropulse::{ChannelSource, DataSource, StreamEvent};
///
/// let (tx, mut source) = ChannelSource::create("test");
/// tx.send(StreamEvent::Connected).unwrap();
/// assert_eq!(source.poll(), Some(StreamEvent::Connected));
/// ```
pub trait DataSource: Send + Debug {
    /// Poll for the next event.
    ///
    /// Returns `Some(event)` if one is pending, `None` otherwise.
    /// This method must not block.
    fn poll(&mut self) -> Option<StreamEvent>;

    /// Returns a human-readable description of the source.
    ///
    /// Used for display in the TUI status bar.
    fn description(&self) -> &str;

    /// Returns the most recent error reported by the source, if any.
    fn error(&self) -> Option<String>;
}

/// Error slot shared between a source and its background task.
pub(crate) type ErrorSlot = Arc<Mutex<Option<String>>>;

/// Decode one raw message and forward it as an event.
///
/// Malformed payloads are dropped and recorded in `last_error`. Returns
/// `false` once the receiving side has gone away.
pub(crate) fn forward_payload(
    bytes: &[u8],
    tx: &mpsc::UnboundedSender<StreamEvent>,
    last_error: &ErrorSlot,
) -> bool {
    let event = match TelemetryFrame::decode(bytes) {
        Ok(Payload::Frame(frame)) => StreamEvent::Frame(frame),
        Ok(Payload::Finished) => StreamEvent::Finished,
        Err(e) => {
            tracing::warn!(error = %e, "Dropping malformed telemetry frame");
            *last_error.lock() = Some(format!("Parse error: {}", e));
            return true;
        }
    };
    tx.send(event).is_ok()
}
