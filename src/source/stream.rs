//! Stream-based data source.
//!
//! Receives telemetry frames from an async byte stream. This is useful for
//! network sources other than the backend's WebSocket (a raw TCP relay, a
//! piped recording) or for bridging frames pushed from another transport.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::{forward_payload, DataSource, ErrorSlot, StreamEvent};

/// A data source that receives telemetry frames from an async stream.
///
/// This source spawns a background task that reads newline-delimited JSON
/// from the provided async reader and makes events available via `poll()`.
/// The task is aborted when the source is dropped.
///
/// # Example with a byte stream
///
/// ```
/// use std::io::Cursor;
/// use aeropulse::StreamSource;
///
/// # tokio_test::block_on(async {
/// let data = b"{\"finished\":true}\n";
/// let stream = Cursor::new(data.to_vec());
/// let source = StreamSource::spawn(stream, "example");
/// # });
/// ```
#[derive(Debug)]
pub struct StreamSource {
    receiver: mpsc::UnboundedReceiver<StreamEvent>,
    description: String,
    last_error: ErrorSlot,
    task: JoinHandle<()>,
}

impl StreamSource {
    /// Spawn a background task that reads from the given async reader.
    ///
    /// The reader should provide newline-delimited JSON frames. The reader
    /// is treated as already connected; end of input is reported as a
    /// disconnect.
    pub fn spawn<R>(reader: R, description: &str) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let last_error: ErrorSlot = Arc::default();
        let error_handle = last_error.clone();

        let task = tokio::spawn(async move {
            if tx.send(StreamEvent::Connected).is_err() {
                return;
            }

            let mut reader = BufReader::new(reader);
            let mut line = String::new();

            let reason = loop {
                line.clear();
                match reader.read_line(&mut line).await {
                    Ok(0) => break "Connection closed".to_string(),
                    Ok(_) => {
                        let trimmed = line.trim();
                        if trimmed.is_empty() {
                            continue;
                        }
                        if !forward_payload(trimmed.as_bytes(), &tx, &error_handle) {
                            // Receiver dropped
                            return;
                        }
                    }
                    Err(e) => break format!("Read error: {}", e),
                }
            };

            tracing::warn!(%reason, "Telemetry stream ended");
            *error_handle.lock() = Some(reason.clone());
            let _ = tx.send(StreamEvent::Disconnected(reason));
        });

        Self {
            receiver: rx,
            description: format!("stream: {}", description),
            last_error,
            task,
        }
    }

    /// Create a StreamSource from a raw bytes channel.
    ///
    /// Each message on the channel is one complete JSON frame.
    pub fn from_bytes_channel(mut rx: mpsc::Receiver<Vec<u8>>, description: &str) -> Self {
        let (tx, event_rx) = mpsc::unbounded_channel();
        let last_error: ErrorSlot = Arc::default();
        let error_handle = last_error.clone();

        let task = tokio::spawn(async move {
            if tx.send(StreamEvent::Connected).is_err() {
                return;
            }
            while let Some(bytes) = rx.recv().await {
                if !forward_payload(&bytes, &tx, &error_handle) {
                    return;
                }
            }
            let _ = tx.send(StreamEvent::Disconnected("Channel closed".to_string()));
        });

        Self {
            receiver: event_rx,
            description: format!("stream: {}", description),
            last_error,
            task,
        }
    }
}

impl DataSource for StreamSource {
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

impl Drop for StreamSource {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sample_json(cycle: u64) -> String {
        format!(
            r#"{{"cycle":{},"RUL":110.5,"status":"Healthy","sensors":{{"Fan_Speed":2388.1}}}}"#,
            cycle
        )
    }

    fn drain(source: &mut StreamSource) -> Vec<StreamEvent> {
        std::iter::from_fn(|| source.poll()).collect()
    }

    #[tokio::test]
    async fn test_stream_source_spawn() {
        let data = format!("{}\n", sample_json(1));
        let mut source = StreamSource::spawn(Cursor::new(data), "test");

        // Give the background task time to process
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

        let events = drain(&mut source);
        assert_eq!(events.len(), 3);
        assert_eq!(events[0], StreamEvent::Connected);
        assert!(matches!(&events[1], StreamEvent::Frame(f) if f.cycle == 1));
        assert_eq!(
            events[2],
            StreamEvent::Disconnected("Connection closed".to_string())
        );
    }

    #[tokio::test]
    async fn test_stream_source_preserves_order() {
        let data = format!("{}\n\n{}\n", sample_json(7), sample_json(8));
        let mut source = StreamSource::spawn(Cursor::new(data), "test");

        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

        let cycles: Vec<u64> = drain(&mut source)
            .into_iter()
            .filter_map(|e| match e {
                StreamEvent::Frame(f) => Some(f.cycle),
                _ => None,
            })
            .collect();
        assert_eq!(cycles, vec![7, 8]);
    }

    #[tokio::test]
    async fn test_stream_source_description() {
        let source = StreamSource::spawn(Cursor::new(""), "tcp://localhost:9090");
        assert_eq!(source.description(), "stream: tcp://localhost:9090");
    }

    #[tokio::test]
    async fn test_stream_source_skips_invalid_json() {
        let data = format!("not valid json\n{}\n", sample_json(2));
        let mut source = StreamSource::spawn(Cursor::new(data), "test");

        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

        let frames = drain(&mut source)
            .into_iter()
            .filter(|e| matches!(e, StreamEvent::Frame(_)))
            .count();
        assert_eq!(frames, 1);
    }

    #[tokio::test]
    async fn test_stream_source_from_bytes_channel() {
        let (tx, rx) = mpsc::channel::<Vec<u8>>(16);
        let mut source = StreamSource::from_bytes_channel(rx, "test-channel");

        tx.send(sample_json(3).into_bytes()).await.unwrap();
        tx.send(br#"{"finished":true}"#.to_vec()).await.unwrap();
        drop(tx);

        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

        let events = drain(&mut source);
        assert_eq!(events[0], StreamEvent::Connected);
        assert!(matches!(&events[1], StreamEvent::Frame(f) if f.cycle == 3));
        assert_eq!(events[2], StreamEvent::Finished);
        assert!(matches!(events[3], StreamEvent::Disconnected(_)));
    }
}
