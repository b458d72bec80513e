//! Sticky critical alerts.
//!
//! A channel that goes critical stays on the alert list for at least the
//! retention window, so a reading oscillating around its limit does not make
//! the list flicker. Every critical observation pushes the expiry out again.
//!
//! ```text
//!            critical (refresh expiry)
//!              ┌──────┐
//!              ▼      │
//! Absent ──▶ Tracked ─┘
//!   ▲          │
//!   └──────────┘ now >= expiry && not critical
//! ```

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use super::status::{SensorLevel, SensorStatus, SensorStatuses};

/// Minimum time a critical channel stays listed.
pub const RETENTION_WINDOW: Duration = Duration::from_millis(5000);

/// Interval of the periodic expiry sweep.
pub const SWEEP_INTERVAL: Duration = Duration::from_millis(1000);

/// A retained critical status.
#[derive(Debug, Clone, PartialEq)]
pub struct StickyEntry {
    /// Status as of the last critical observation.
    pub status: SensorStatus,
    pub expiry: Instant,
}

/// An entry on the displayed alert list.
#[derive(Debug, Clone, PartialEq)]
pub struct CriticalAlert {
    pub status: SensorStatus,
    /// True when the channel is critical in the latest frame; false when it
    /// is only listed because of retention.
    pub live: bool,
    pub expiry: Option<Instant>,
}

/// Tracks critical channels across frames.
#[derive(Debug, Clone)]
pub struct StickyAlerts {
    entries: BTreeMap<String, StickyEntry>,
    retention: Duration,
}

impl Default for StickyAlerts {
    fn default() -> Self {
        Self::new(RETENTION_WINDOW)
    }
}

impl StickyAlerts {
    pub fn new(retention: Duration) -> Self {
        Self {
            entries: BTreeMap::new(),
            retention,
        }
    }

    pub fn retention(&self) -> Duration {
        self.retention
    }

    /// Record freshly computed statuses.
    ///
    /// Critical channels get an entry expiring one retention window from
    /// `now`; then expired entries are swept.
    pub fn observe(&mut self, now: Instant, statuses: &SensorStatuses) {
        for (channel, status) in statuses {
            if status.level == SensorLevel::Critical {
                self.entries.insert(
                    channel.clone(),
                    StickyEntry {
                        status: status.clone(),
                        expiry: now + self.retention,
                    },
                );
            }
        }
        self.evaluate(now, statuses);
    }

    /// Drop entries that have expired and are no longer critical.
    ///
    /// Called on every observation and on the periodic sweep. Returns the
    /// number of entries removed.
    pub fn evaluate(&mut self, now: Instant, statuses: &SensorStatuses) -> usize {
        let before = self.entries.len();
        self.entries.retain(|channel, entry| {
            let still_critical =
                statuses.get(channel).is_some_and(|s| s.level == SensorLevel::Critical);
            now < entry.expiry || still_critical
        });
        before - self.entries.len()
    }

    /// Whether a channel currently has a retained entry.
    pub fn contains(&self, channel: &str) -> bool {
        self.entries.contains_key(channel)
    }

    pub fn get(&self, channel: &str) -> Option<&StickyEntry> {
        self.entries.get(channel)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forget all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// The displayable alert list.
    ///
    /// Union of unexpired entries and currently critical channels, where the
    /// current status replaces the retained one. Entries past their expiry
    /// are left out even before the next sweep removes them. Sorted by
    /// deviation, largest first.
    pub fn critical_sensors(&self, now: Instant, statuses: &SensorStatuses) -> Vec<CriticalAlert> {
        let mut merged: BTreeMap<&str, CriticalAlert> = self
            .entries
            .iter()
            .filter(|(_, entry)| now < entry.expiry)
            .map(|(channel, entry)| {
                let alert = CriticalAlert {
                    status: entry.status.clone(),
                    live: false,
                    expiry: Some(entry.expiry),
                };
                (channel.as_str(), alert)
            })
            .collect();

        for (channel, status) in statuses {
            if status.level == SensorLevel::Critical {
                let expiry = self.entries.get(channel).map(|e| e.expiry);
                merged.insert(
                    channel.as_str(),
                    CriticalAlert {
                        status: status.clone(),
                        live: true,
                        expiry,
                    },
                );
            }
        }

        let mut alerts: Vec<CriticalAlert> = merged.into_values().collect();
        alerts.sort_by(|a, b| b.status.deviation.total_cmp(&a.status.deviation));
        alerts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::status::Trend;

    fn status(channel: &str, level: SensorLevel, deviation: f64) -> SensorStatus {
        SensorStatus {
            channel: channel.to_string(),
            value: 100.0 + deviation,
            deviation,
            level,
            trend: Trend::Stable,
        }
    }

    fn statuses(entries: &[(&str, SensorLevel, f64)]) -> SensorStatuses {
        entries
            .iter()
            .map(|(c, l, d)| (c.to_string(), status(c, *l, *d)))
            .collect()
    }

    fn listed(sticky: &StickyAlerts, at: Instant, current: &SensorStatuses) -> Vec<String> {
        sticky.critical_sensors(at, current).into_iter().map(|a| a.status.channel).collect()
    }

    #[test]
    fn test_retained_after_recovery_until_expiry() {
        let t0 = Instant::now();
        let ms = |n: u64| t0 + Duration::from_millis(n);
        let mut sticky = StickyAlerts::default();

        let critical = statuses(&[("X", SensorLevel::Critical, 3.0)]);
        let normal = statuses(&[("X", SensorLevel::Normal, 0.5)]);

        sticky.observe(ms(0), &critical);
        assert_eq!(sticky.get("X").unwrap().expiry, ms(5000));

        sticky.observe(ms(1000), &normal);
        assert!(sticky.contains("X"));

        sticky.evaluate(ms(4999), &normal);
        assert_eq!(listed(&sticky, ms(4999), &normal), vec!["X"]);

        // Hidden from the list before any sweep runs
        assert!(listed(&sticky, ms(5001), &normal).is_empty());
        assert!(sticky.contains("X"));

        assert_eq!(sticky.evaluate(ms(5001), &normal), 1);
        assert!(listed(&sticky, ms(5001), &normal).is_empty());
    }

    #[test]
    fn test_expires_exactly_at_deadline() {
        let t0 = Instant::now();
        let mut sticky = StickyAlerts::default();
        let normal = statuses(&[("X", SensorLevel::Normal, 0.0)]);

        sticky.observe(t0, &statuses(&[("X", SensorLevel::Critical, 1.0)]));
        sticky.evaluate(t0 + RETENTION_WINDOW, &normal);
        assert!(sticky.is_empty());
    }

    #[test]
    fn test_continuous_criticality_refreshes_expiry() {
        let t0 = Instant::now();
        let mut sticky = StickyAlerts::default();
        let critical = statuses(&[("X", SensorLevel::Critical, 2.0)]);

        for step in 0..=12u64 {
            sticky.observe(t0 + Duration::from_millis(step * 500), &critical);
        }

        let at = t0 + Duration::from_millis(6000);
        sticky.evaluate(at, &critical);
        assert_eq!(listed(&sticky, at, &critical), vec!["X"]);
        assert_eq!(sticky.get("X").unwrap().expiry, at + RETENTION_WINDOW);
    }

    #[test]
    fn test_not_removed_while_still_critical() {
        let t0 = Instant::now();
        let mut sticky = StickyAlerts::default();
        let critical = statuses(&[("X", SensorLevel::Critical, 2.0)]);

        sticky.observe(t0, &critical);
        // Periodic sweep long after expiry, channel still critical
        assert_eq!(sticky.evaluate(t0 + Duration::from_secs(60), &critical), 0);
        assert!(sticky.contains("X"));
    }

    #[test]
    fn test_sweep_without_new_frames() {
        let t0 = Instant::now();
        let mut sticky = StickyAlerts::new(Duration::from_millis(2000));

        sticky.observe(t0, &statuses(&[("X", SensorLevel::Critical, 2.0)]));
        let normal = statuses(&[("X", SensorLevel::Normal, 0.0)]);
        sticky.observe(t0 + Duration::from_millis(100), &normal);

        // No frames arrive; only the sweep runs
        let mut removed = 0;
        for tick in 1..=3u64 {
            removed += sticky.evaluate(t0 + SWEEP_INTERVAL * tick as u32, &normal);
        }
        assert_eq!(removed, 1);
        assert!(sticky.is_empty());
    }

    #[test]
    fn test_merge_prefers_current_and_sorts_by_deviation() {
        let t0 = Instant::now();
        let mut sticky = StickyAlerts::default();

        sticky.observe(
            t0,
            &statuses(&[
                ("A", SensorLevel::Critical, 1.0),
                ("B", SensorLevel::Critical, 4.0),
            ]),
        );

        // A recovers, B keeps rising, C newly critical
        let current = statuses(&[
            ("A", SensorLevel::Normal, 0.2),
            ("B", SensorLevel::Critical, 9.0),
            ("C", SensorLevel::Critical, 5.0),
        ]);

        let alerts = sticky.critical_sensors(t0 + Duration::from_millis(100), &current);
        let order: Vec<&str> = alerts.iter().map(|a| a.status.channel.as_str()).collect();
        assert_eq!(order, vec!["B", "C", "A"]);

        // B shows the fresh status, A the retained one
        assert!(alerts[0].live);
        assert_eq!(alerts[0].status.deviation, 9.0);
        assert!(!alerts[2].live);
        assert_eq!(alerts[2].status.level, SensorLevel::Critical);
        assert_eq!(alerts[2].expiry, Some(t0 + RETENTION_WINDOW));
        // C has not been observed yet
        assert!(alerts[1].expiry.is_none());
    }
}
