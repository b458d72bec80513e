//! Channel-based data source.
//!
//! Receives stream events via a tokio channel. This is useful for embedding
//! the dashboard in a process that already owns the backend connection, and
//! for driving the app deterministically in tests.

use tokio::sync::mpsc;

use super::{DataSource, StreamEvent};

/// A data source that receives stream events via a channel.
///
/// Unlike a watch channel, every event is delivered: the history window
/// depends on seeing each frame exactly once.
///
/// # Example
///
/// ```
/// use aeropulse::ChannelSource;
///
/// let (tx, source) = ChannelSource::create("embedded");
/// ```
#[derive(Debug)]
pub struct ChannelSource {
    receiver: mpsc::UnboundedReceiver<StreamEvent>,
    description: String,
    closed: bool,
}

impl ChannelSource {
    /// Create a new channel source.
    ///
    /// # Arguments
    ///
    /// * `receiver` - The receiving end of an unbounded channel
    /// * `source_description` - A description of where events come from
    pub fn new(receiver: mpsc::UnboundedReceiver<StreamEvent>, source_description: &str) -> Self {
        Self {
            receiver,
            description: format!("channel: {}", source_description),
            closed: false,
        }
    }

    /// Create a channel pair for sending events to a ChannelSource.
    ///
    /// Returns (sender, source).
    pub fn create(source_description: &str) -> (mpsc::UnboundedSender<StreamEvent>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Self::new(rx, source_description))
    }
}

impl DataSource for ChannelSource {
    fn poll(&mut self) -> Option<StreamEvent> {
        match self.receiver.try_recv() {
            Ok(event) => Some(event),
            Err(mpsc::error::TryRecvError::Empty) => None,
            Err(mpsc::error::TryRecvError::Disconnected) => {
                // Report the producer going away exactly once.
                if self.closed {
                    None
                } else {
                    self.closed = true;
                    Some(StreamEvent::Disconnected("Channel closed".to_string()))
                }
            }
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<String> {
        self.closed.then(|| "Channel closed".to_string())
    }
}
