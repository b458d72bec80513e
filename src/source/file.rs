//! File-based data source.
//!
//! Replays a recorded telemetry session: a file of newline-delimited JSON
//! frames, as captured from the backend's WebSocket.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use super::{DataSource, Payload, StreamEvent, TelemetryFrame};

/// Default pacing between replayed frames, matching the backend's tick.
const DEFAULT_REPLAY_INTERVAL: Duration = Duration::from_millis(300);

/// A data source that replays telemetry frames from a file.
///
/// The file is read on first poll. One frame is released per replay
/// interval; malformed lines are skipped and reported via `error()`.
/// The end of the recording is reported as a disconnect.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    description: String,
    interval: Duration,
    last_error: Option<String>,
    lines: Option<std::vec::IntoIter<String>>,
    last_emit: Option<Instant>,
    exhausted: bool,
}

impl FileSource {
    /// Create a new file source for the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let description = format!("replay: {}", path.display());
        Self {
            path,
            description,
            interval: DEFAULT_REPLAY_INTERVAL,
            last_error: None,
            lines: None,
            last_emit: None,
            exhausted: false,
        }
    }

    /// Set the pacing between replayed frames.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Returns the path being replayed.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the recording into memory.
    fn open(&mut self) -> Option<StreamEvent> {
        match fs::read_to_string(&self.path) {
            Ok(content) => {
                let lines: Vec<String> = content
                    .lines()
                    .map(str::trim)
                    .filter(|l| !l.is_empty())
                    .map(str::to_string)
                    .collect();
                tracing::info!(path = %self.path.display(), frames = lines.len(), "Replaying recording");
                self.lines = Some(lines.into_iter());
                Some(StreamEvent::Connected)
            }
            Err(e) => {
                self.last_error = Some(format!("Read error: {}", e));
                self.exhausted = true;
                None
            }
        }
    }

    /// Next decodable event from the recording.
    fn next_event(&mut self) -> Option<StreamEvent> {
        let lines = self.lines.as_mut()?;
        for line in lines.by_ref() {
            match TelemetryFrame::decode(line.as_bytes()) {
                Ok(Payload::Frame(frame)) => return Some(StreamEvent::Frame(frame)),
                Ok(Payload::Finished) => return Some(StreamEvent::Finished),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping malformed line in recording");
                    self.last_error = Some(format!("Parse error: {}", e));
                }
            }
        }
        None
    }
}

impl DataSource for FileSource {
    fn poll(&mut self) -> Option<StreamEvent> {
        if self.exhausted {
            return None;
        }

        if self.lines.is_none() {
            return self.open();
        }

        if let Some(last) = self.last_emit {
            if last.elapsed() < self.interval {
                return None;
            }
        }

        match self.next_event() {
            Some(event) => {
                self.last_emit = Some(Instant::now());
                Some(event)
            }
            None => {
                self.exhausted = true;
                Some(StreamEvent::Disconnected("End of recording".to_string()))
            }
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<String> {
        self.last_error.clone()
    }
}
