//! Application state and navigation logic.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::runtime::Handle;
use tokio::sync::mpsc;

use crate::client::Backend;
use crate::data::report::DEFAULT_REPORT_FILE;
use crate::data::{
    compute_statuses, Clock, CriticalAlert, Report, SensorGroup, SensorStatuses, StickyAlerts,
    SystemClock, TelemetryState, ThresholdConfig, Update, SWEEP_INTERVAL,
};
use crate::source::{DataSource, StreamEvent};
use crate::ui::Theme;

/// Lowest engine unit in the simulator dataset.
pub const MIN_UNIT_ID: u32 = 1;
/// Highest engine unit in the simulator dataset.
pub const MAX_UNIT_ID: u32 = 100;
/// Unit the backend streams when nothing was selected.
pub const DEFAULT_UNIT_ID: u32 = 34;

/// How long status bar messages stay visible.
const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(3);

/// The current view/tab in the TUI.
///
/// Channel detail is shown as an overlay (controlled by `App::show_detail_overlay`)
/// rather than as a separate view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Per-group channel table with limits, deviation and trend.
    Sensors,
    /// Sticky critical alerts and the backend's failure reasons.
    Alerts,
    /// RUL and channel history charts.
    Trends,
    /// Batch analysis results.
    Report,
}

impl View {
    pub const ALL: [View; 4] = [View::Sensors, View::Alerts, View::Trends, View::Report];

    /// Cycle to the next view.
    pub fn next(self) -> Self {
        match self {
            View::Sensors => View::Alerts,
            View::Alerts => View::Trends,
            View::Trends => View::Report,
            View::Report => View::Sensors,
        }
    }

    /// Cycle to the previous view.
    pub fn prev(self) -> Self {
        match self {
            View::Sensors => View::Report,
            View::Alerts => View::Sensors,
            View::Trends => View::Alerts,
            View::Report => View::Trends,
        }
    }

    /// Returns the display label for this view.
    pub fn label(&self) -> &'static str {
        match self {
            View::Sensors => "Sensors",
            View::Alerts => "Alerts",
            View::Trends => "Trends",
            View::Report => "Report",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            View::Sensors => 0,
            View::Alerts => 1,
            View::Trends => 2,
            View::Report => 3,
        }
    }
}

/// Outcome of a background engine switch.
type EngineResult = Result<String, String>;

/// Switches the streamed engine unit through the backend.
///
/// Requests run on the tokio runtime; results are picked up by
/// [`App::tick`] and shown in the status bar.
#[derive(Debug)]
pub struct EngineControl {
    runtime: Handle,
    backend: Arc<dyn Backend>,
    token: Option<String>,
    unit_id: u32,
    sender: mpsc::UnboundedSender<EngineResult>,
    results: mpsc::UnboundedReceiver<EngineResult>,
}

impl EngineControl {
    pub fn new(runtime: Handle, backend: Arc<dyn Backend>, token: Option<String>, unit_id: u32) -> Self {
        let (sender, results) = mpsc::unbounded_channel();
        Self {
            runtime,
            backend,
            token,
            unit_id,
            sender,
            results,
        }
    }

    /// The most recently requested unit.
    pub fn unit_id(&self) -> u32 {
        self.unit_id
    }

    /// Ask the backend to stream `unit_id`.
    pub fn request(&mut self, unit_id: u32) {
        self.unit_id = unit_id;

        let backend = Arc::clone(&self.backend);
        let token = self.token.clone();
        let sender = self.sender.clone();
        self.runtime.spawn(async move {
            let result = backend
                .set_engine(token.as_deref(), unit_id)
                .await
                .map_err(|e| {
                    tracing::warn!(unit_id, error = %e, "Engine switch failed");
                    format!("Engine {} switch failed: {}", unit_id, e)
                });
            let _ = sender.send(result);
        });
    }

    fn poll_result(&mut self) -> Option<EngineResult> {
        self.results.try_recv().ok()
    }
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,
    pub show_detail_overlay: bool,

    // Stream consumer and derived state
    source: Box<dyn DataSource>,
    pub telemetry: TelemetryState,
    pub thresholds: ThresholdConfig,
    pub statuses: SensorStatuses,
    pub sticky: StickyAlerts,
    pub load_error: Option<String>,
    clock: Arc<dyn Clock>,
    sweep_interval: Duration,
    last_sweep: Instant,

    // Navigation state
    pub selected_group: usize,
    pub selected_channel: usize,
    pub selected_alert: usize,
    pub selected_row: usize,

    // Batch analysis
    pub report: Option<Report>,
    pub report_path: PathBuf,

    engine: Option<EngineControl>,

    // UI
    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create a new App with the given data source and thresholds.
    pub fn new(source: Box<dyn DataSource>, thresholds: ThresholdConfig) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let now = clock.now();
        Self {
            running: true,
            current_view: View::Sensors,
            show_help: false,
            show_detail_overlay: false,
            source,
            telemetry: TelemetryState::new(),
            thresholds,
            statuses: SensorStatuses::new(),
            sticky: StickyAlerts::default(),
            load_error: None,
            clock,
            sweep_interval: SWEEP_INTERVAL,
            last_sweep: now,
            selected_group: 0,
            selected_channel: 0,
            selected_alert: 0,
            selected_row: 0,
            report: None,
            report_path: PathBuf::from(DEFAULT_REPORT_FILE),
            engine: None,
            theme: Theme::dark(),
            status_message: None,
        }
    }

    /// Use a different time source for retention and sweeps.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.last_sweep = clock.now();
        self.clock = clock;
        self
    }

    /// Minimum time a critical channel stays on the alert list.
    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.sticky = StickyAlerts::new(retention);
        self
    }

    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn with_engine_control(mut self, engine: EngineControl) -> Self {
        self.engine = Some(engine);
        self
    }

    pub fn with_report(mut self, report: Report) -> Self {
        self.report = Some(report);
        self
    }

    pub fn with_report_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.report_path = path.into();
        self
    }

    /// Returns a description of the current data source.
    pub fn source_description(&self) -> &str {
        self.source.description()
    }

    /// Current instant on the app's clock.
    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    /// Engine unit currently requested, when engine control is available.
    pub fn engine_unit(&self) -> Option<u32> {
        self.engine.as_ref().map(|e| e.unit_id())
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired.
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < STATUS_MESSAGE_TTL {
                return Some(msg);
            }
        }
        None
    }

    /// Drain pending stream events.
    ///
    /// Statuses are recomputed and the sticky alerts observed once per
    /// frame, in arrival order. Returns true if anything changed.
    pub fn reload_data(&mut self) -> bool {
        let mut changed = false;

        while let Some(event) = self.source.poll() {
            match &event {
                StreamEvent::Connected => {
                    tracing::info!(source = self.source.description(), "Stream connected");
                }
                StreamEvent::Disconnected(reason) => {
                    tracing::warn!(source = self.source.description(), %reason, "Stream disconnected");
                }
                StreamEvent::Finished => {
                    tracing::info!("Engine reached end of life");
                }
                StreamEvent::Frame(_) => {}
            }

            match self.telemetry.apply(event) {
                Update::Frame => {
                    self.statuses = compute_statuses(
                        self.telemetry.latest(),
                        self.telemetry.history(),
                        &self.thresholds,
                    );
                    self.sticky.observe(self.clock.now(), &self.statuses);
                    changed = true;
                }
                Update::State => changed = true,
                Update::None => {}
            }
        }

        self.load_error = self.source.error();
        if changed {
            self.clamp_selection();
        }
        changed
    }

    /// Periodic housekeeping: the sticky expiry sweep and engine switch results.
    ///
    /// Returns the number of sticky entries removed.
    pub fn tick(&mut self) -> usize {
        let mut removed = 0;
        let now = self.clock.now();
        if now.saturating_duration_since(self.last_sweep) >= self.sweep_interval {
            self.last_sweep = now;
            removed = self.sticky.evaluate(now, &self.statuses);
            if removed > 0 {
                tracing::debug!(removed, remaining = self.sticky.len(), "Expired sticky alerts");
                self.clamp_selection();
            }
        }

        let results: Vec<EngineResult> = match self.engine.as_mut() {
            Some(engine) => std::iter::from_fn(|| engine.poll_result()).collect(),
            None => Vec::new(),
        };
        for result in results {
            self.set_status_message(result.unwrap_or_else(|e| e));
        }

        removed
    }

    /// The alert list: sticky entries merged with live criticals.
    pub fn critical_sensors(&self) -> Vec<CriticalAlert> {
        self.sticky.critical_sensors(self.clock.now(), &self.statuses)
    }

    /// The sensor group selected in the Sensors view.
    pub fn current_group(&self) -> Option<SensorGroup> {
        self.thresholds.groups().get(self.selected_group).copied()
    }

    /// Name of the channel the cursor is on, in the Sensors, Trends, or Alerts view.
    pub fn selected_channel_name(&self) -> Option<String> {
        match self.current_view {
            View::Alerts => self
                .critical_sensors()
                .get(self.selected_alert)
                .map(|a| a.status.channel.clone()),
            View::Sensors | View::Trends => {
                let group = self.current_group()?;
                self.thresholds
                    .channels_in(group)
                    .get(self.selected_channel)
                    .map(|c| c.name.clone())
            }
            View::Report => None,
        }
    }

    fn list_len(&self) -> usize {
        match self.current_view {
            View::Sensors | View::Trends => self
                .current_group()
                .map(|g| self.thresholds.channels_in(g).len())
                .unwrap_or(0),
            View::Alerts => self.critical_sensors().len(),
            View::Report => self.report.as_ref().map(|r| r.rows.len()).unwrap_or(0),
        }
    }

    fn selection_mut(&mut self) -> &mut usize {
        match self.current_view {
            View::Sensors | View::Trends => &mut self.selected_channel,
            View::Alerts => &mut self.selected_alert,
            View::Report => &mut self.selected_row,
        }
    }

    fn clamp_selection(&mut self) {
        let alerts = self.critical_sensors().len();
        if self.selected_alert >= alerts {
            self.selected_alert = alerts.saturating_sub(1);
        }
    }

    /// Switch to the next view.
    pub fn next_view(&mut self) {
        self.current_view = self.current_view.next();
    }

    /// Switch to the previous view.
    pub fn prev_view(&mut self) {
        self.current_view = self.current_view.prev();
    }

    /// Switch to a specific view.
    pub fn set_view(&mut self, view: View) {
        self.current_view = view;
    }

    /// Move selection down by one item.
    pub fn select_next(&mut self) {
        self.select_next_n(1);
    }

    /// Move selection up by one item.
    pub fn select_prev(&mut self) {
        self.select_prev_n(1);
    }

    /// Move selection down by n items.
    pub fn select_next_n(&mut self, n: usize) {
        let max = self.list_len().saturating_sub(1);
        let selected = self.selection_mut();
        *selected = (*selected + n).min(max);
    }

    /// Move selection up by n items.
    pub fn select_prev_n(&mut self, n: usize) {
        let selected = self.selection_mut();
        *selected = selected.saturating_sub(n);
    }

    /// Jump to the first item in the list.
    pub fn select_first(&mut self) {
        *self.selection_mut() = 0;
    }

    /// Jump to the last item in the list.
    pub fn select_last(&mut self) {
        let last = self.list_len().saturating_sub(1);
        *self.selection_mut() = last;
    }

    /// Cycle to the next sensor group.
    pub fn next_group(&mut self) {
        let groups = self.thresholds.groups().len();
        if groups > 0 {
            self.selected_group = (self.selected_group + 1) % groups;
            self.selected_channel = 0;
        }
    }

    /// Open the detail overlay for the selected channel.
    pub fn enter_detail(&mut self) {
        if self.selected_channel_name().is_some() {
            self.show_detail_overlay = true;
        }
    }

    /// Navigate back: close overlays first, then return to the Sensors view.
    pub fn go_back(&mut self) {
        if self.show_detail_overlay {
            self.show_detail_overlay = false;
        } else if self.show_help {
            self.show_help = false;
        } else {
            self.current_view = View::Sensors;
        }
    }

    /// Close the detail overlay if open.
    pub fn close_overlay(&mut self) {
        self.show_detail_overlay = false;
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Request the engine unit `delta` steps away from the current one.
    pub fn switch_engine(&mut self, delta: i64) {
        let Some(engine) = self.engine.as_mut() else {
            self.set_status_message("Engine selection needs a live backend".to_string());
            return;
        };

        let target = (engine.unit_id() as i64 + delta).clamp(MIN_UNIT_ID as i64, MAX_UNIT_ID as i64) as u32;
        if target == engine.unit_id() {
            return;
        }
        engine.request(target);
        self.set_status_message(format!("Switching to Engine {}...", target));
    }

    /// Write the batch report to `report_path`.
    pub fn export_report(&mut self) {
        let path = self.report_path.clone();
        match self.report.as_ref() {
            Some(report) if !report.is_empty() => match report.export_csv(&path) {
                Ok(()) => self.set_status_message(format!("Exported to {}", path.display())),
                Err(e) => self.set_status_message(format!("Export failed: {}", e)),
            },
            _ => self.set_status_message("No report to export".to_string()),
        }
    }

    /// Path the report is exported to.
    pub fn report_path(&self) -> &Path {
        &self.report_path
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }
}
