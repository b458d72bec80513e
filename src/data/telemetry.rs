//! Stream consumer state: the latest frame, the history window and the
//! connection flag.

use super::history::FrameHistory;
use crate::source::{StreamEvent, TelemetryFrame};

/// What an applied event changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Update {
    /// A new frame replaced the latest one; derived state must be recomputed.
    Frame,
    /// Only connection state or the finished flag changed.
    State,
    /// Nothing changed.
    None,
}

/// Live telemetry state republished to the dashboard.
#[derive(Debug, Clone, Default)]
pub struct TelemetryState {
    latest: Option<TelemetryFrame>,
    history: FrameHistory,
    connected: bool,
    frames_received: u64,
}

impl TelemetryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent frame, if any arrived yet.
    pub fn latest(&self) -> Option<&TelemetryFrame> {
        self.latest.as_ref()
    }

    pub fn history(&self) -> &FrameHistory {
        &self.history
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Whether the backend reported the current unit as failed.
    pub fn is_finished(&self) -> bool {
        self.latest.as_ref().is_some_and(|f| f.finished)
    }

    /// Total frames accepted since start.
    pub fn frames_received(&self) -> u64 {
        self.frames_received
    }

    /// Apply one stream event.
    pub fn apply(&mut self, event: StreamEvent) -> Update {
        match event {
            StreamEvent::Connected => {
                self.connected = true;
                Update::State
            }
            StreamEvent::Disconnected(_) => {
                self.connected = false;
                Update::State
            }
            StreamEvent::Finished => match self.latest.as_mut() {
                Some(latest) if !latest.finished => {
                    latest.finished = true;
                    Update::State
                }
                _ => Update::None,
            },
            StreamEvent::Frame(frame) => {
                self.history.push(frame.clone());
                self.latest = Some(frame);
                self.frames_received += 1;
                Update::Frame
            }
        }
    }
}
