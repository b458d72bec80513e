//! Bounded frame history for trend detection, sparklines and charts.

use std::collections::VecDeque;

use crate::source::TelemetryFrame;

/// Maximum number of frames to keep.
pub const MAX_HISTORY_SIZE: usize = 50;

/// Sliding window over the most recent telemetry frames.
///
/// Insertion is append-only; once the window is full the oldest frame is
/// evicted. Frames stay in arrival order.
#[derive(Debug, Clone)]
pub struct FrameHistory {
    frames: VecDeque<TelemetryFrame>,
    capacity: usize,
}

impl Default for FrameHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameHistory {
    /// Create an empty history holding up to [`MAX_HISTORY_SIZE`] frames.
    pub fn new() -> Self {
        Self::with_capacity(MAX_HISTORY_SIZE)
    }

    /// Create an empty history with a custom bound.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            frames: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Append a frame, evicting from the front past the bound.
    pub fn push(&mut self, frame: TelemetryFrame) {
        self.frames.push_back(frame);
        while self.frames.len() > self.capacity {
            self.frames.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterate frames from oldest to newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &TelemetryFrame> + ExactSizeIterator {
        self.frames.iter()
    }

    /// The newest frame.
    pub fn latest(&self) -> Option<&TelemetryFrame> {
        self.frames.back()
    }

    /// The frame before the newest one, used for trend comparison.
    pub fn previous(&self) -> Option<&TelemetryFrame> {
        self.frames.len().checked_sub(2).and_then(|i| self.frames.get(i))
    }

    /// Readings for one channel across the window, oldest first.
    pub fn series(&self, channel: &str) -> Vec<f64> {
        self.frames.iter().map(|f| f.reading(channel)).collect()
    }

    /// `(cycle, reading)` points for charting one channel.
    pub fn channel_points(&self, channel: &str) -> Vec<(f64, f64)> {
        self.frames.iter().map(|f| (f.cycle as f64, f.reading(channel))).collect()
    }

    /// `(cycle, RUL)` points for charting the prediction.
    pub fn rul_points(&self) -> Vec<(f64, f64)> {
        self.frames.iter().map(|f| (f.cycle as f64, f.rul)).collect()
    }

    /// Sparkline data for a channel (normalized to 0-7 for 8 bar levels).
    ///
    /// Returns an empty Vec if there's not enough history.
    pub fn sparkline(&self, channel: &str) -> Vec<u8> {
        normalize_sparkline(&self.series(channel))
    }
}

/// Normalize values to 0-7 range for sparkline display.
fn normalize_sparkline(values: &[f64]) -> Vec<u8> {
    if values.len() < 2 {
        return Vec::new();
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    values
        .iter()
        .map(|&v| {
            if range <= f64::EPSILON {
                return 0;
            }
            let normalized = ((v - min) / range * 7.0).round() as u8;
            normalized.min(7)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::EngineStatus;
    use std::collections::BTreeMap;

    fn frame(cycle: u64, fan: f64) -> TelemetryFrame {
        TelemetryFrame {
            cycle,
            rul: 200.0 - cycle as f64,
            status: EngineStatus::Healthy,
            sensors: BTreeMap::from([("Fan_Speed".to_string(), fan)]),
            failure_reasons: None,
            finished: false,
            data_quality: None,
            warnings: Vec::new(),
        }
    }

    #[test]
    fn test_history_is_bounded_fifo() {
        let mut history = FrameHistory::new();
        for cycle in 1..=120 {
            history.push(frame(cycle, 0.0));
            assert_eq!(history.len(), (cycle as usize).min(MAX_HISTORY_SIZE));
        }

        // The 50 most recent frames, in arrival order
        let cycles: Vec<u64> = history.iter().map(|f| f.cycle).collect();
        assert_eq!(cycles, (71..=120).collect::<Vec<_>>());
        assert_eq!(history.latest().unwrap().cycle, 120);
        assert_eq!(history.previous().unwrap().cycle, 119);
    }

    #[test]
    fn test_previous_needs_two_frames() {
        let mut history = FrameHistory::new();
        assert!(history.previous().is_none());
        history.push(frame(1, 0.0));
        assert!(history.previous().is_none());
    }

    #[test]
    fn test_series_and_points() {
        let mut history = FrameHistory::with_capacity(3);
        history.push(frame(1, 10.0));
        history.push(frame(2, 20.0));

        assert_eq!(history.series("Fan_Speed"), vec![10.0, 20.0]);
        assert_eq!(history.series("Core_Speed"), vec![0.0, 0.0]);
        assert_eq!(history.rul_points(), vec![(1.0, 199.0), (2.0, 198.0)]);
        assert_eq!(
            history.channel_points("Fan_Speed"),
            vec![(1.0, 10.0), (2.0, 20.0)]
        );
    }

    #[test]
    fn test_sparkline_normalization() {
        let mut history = FrameHistory::new();
        assert!(history.sparkline("Fan_Speed").is_empty());

        for (cycle, fan) in [(1, 100.0), (2, 150.0), (3, 200.0)] {
            history.push(frame(cycle, fan));
        }
        assert_eq!(history.sparkline("Fan_Speed"), vec![0, 4, 7]);

        // Flat series stays at the baseline
        assert_eq!(history.sparkline("Core_Speed"), vec![0, 0, 0]);
    }
}
