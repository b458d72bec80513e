//! WebSocket data source.
//!
//! Consumes the backend's live telemetry endpoint (`ws://<host>/ws`). The
//! socket is owned by a background task, which reconnects with exponential
//! backoff and is aborted when the source is dropped.

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use super::{forward_payload, DataSource, ErrorSlot, StreamEvent};

/// Reconnect behaviour after the socket closes or fails to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Whether to reconnect at all.
    pub enabled: bool,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Upper bound for the doubling delay.
    pub max_delay: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl ReconnectPolicy {
    /// A policy that never reconnects.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Delay to use after `current`.
    pub fn next_delay(&self, current: Duration) -> Duration {
        current.saturating_mul(2).min(self.max_delay)
    }
}

/// A data source backed by the backend's telemetry WebSocket.
///
/// Must be created from within a tokio runtime context.
///
/// # Example
///
/// ```no_run
/// use aeropulse::{ReconnectPolicy, WebSocketSource};
///
/// # tokio_test::block_on(async {
/// let source = WebSocketSource::connect("ws://localhost:8000/ws", ReconnectPolicy::default());
/// # });
/// ```
#[derive(Debug)]
pub struct WebSocketSource {
    receiver: mpsc::UnboundedReceiver<StreamEvent>,
    description: String,
    last_error: ErrorSlot,
    task: JoinHandle<()>,
}

impl WebSocketSource {
    /// Start consuming the given WebSocket URL.
    pub fn connect(url: &str, policy: ReconnectPolicy) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let last_error: ErrorSlot = Arc::default();
        let task = tokio::spawn(run_socket(url.to_string(), policy, tx, last_error.clone()));

        Self {
            receiver: rx,
            description: format!("ws: {}", url),
            last_error,
            task,
        }
    }
}

async fn run_socket(
    url: String,
    policy: ReconnectPolicy,
    tx: mpsc::UnboundedSender<StreamEvent>,
    last_error: ErrorSlot,
) {
    let mut delay = policy.initial_delay;

    loop {
        match connect_async(url.as_str()).await {
            Ok((mut socket, _response)) => {
                tracing::info!(%url, "Connected to telemetry stream");
                delay = policy.initial_delay;
                *last_error.lock() = None;
                if tx.send(StreamEvent::Connected).is_err() {
                    return;
                }

                let reason = loop {
                    match socket.next().await {
                        Some(Ok(Message::Text(text))) => {
                            if !forward_payload(text.as_bytes(), &tx, &last_error) {
                                return;
                            }
                        }
                        Some(Ok(Message::Binary(bytes))) => {
                            if !forward_payload(&bytes, &tx, &last_error) {
                                return;
                            }
                        }
                        Some(Ok(Message::Close(frame))) => {
                            break frame
                                .map(|f| f.reason.to_string())
                                .filter(|r| !r.is_empty())
                                .unwrap_or_else(|| "Closed by server".to_string());
                        }
                        // Ping/pong is answered by tungstenite itself
                        Some(Ok(_)) => {}
                        Some(Err(e)) => break format!("Read error: {}", e),
                        None => break "Connection closed".to_string(),
                    }
                };

                tracing::warn!(%url, %reason, "Disconnected from telemetry stream");
                *last_error.lock() = Some(reason.clone());
                if tx.send(StreamEvent::Disconnected(reason)).is_err() {
                    return;
                }
            }
            Err(e) => {
                tracing::warn!(%url, error = %e, "Failed to connect to telemetry stream");
                *last_error.lock() = Some(format!("Connect error: {}", e));
                if tx.is_closed() {
                    return;
                }
            }
        }

        if !policy.enabled {
            break;
        }
        tracing::debug!(?delay, "Reconnecting to telemetry stream");
        tokio::time::sleep(delay).await;
        delay = policy.next_delay(delay);
    }
}

impl DataSource for WebSocketSource {
    fn poll(&mut self) -> Option<StreamEvent> {
        self.receiver.try_recv().ok()
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<String> {
        self.last_error.lock().clone()
    }
}

impl Drop for WebSocketSource {
    fn drop(&mut self) {
        self.task.abort();
    }
}
