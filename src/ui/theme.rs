//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection. The
//! `healthy`/`warning`/`critical` colors carry both the per-channel
//! [`SensorLevel`] and the engine-wide [`EngineStatus`]; channels may override
//! their series color with a hex value from the threshold table.

use std::str::FromStr;

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use crate::data::{SensorLevel, SensorThreshold};
use crate::source::EngineStatus;

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for highlights and active elements.
    pub highlight: Color,
    /// Color for warning-level readings and engines.
    pub warning: Color,
    /// Color for critical readings and engines.
    pub critical: Color,
    /// Color for normal readings and healthy engines.
    pub healthy: Color,
    /// Color for borders and separators.
    pub border: Color,
    /// Style for header rows in tables.
    pub header: Style,
    /// Style for selected/highlighted rows.
    pub selected: Style,
    /// Style for the active tab.
    pub tab_active: Style,
    /// Style for inactive tabs.
    pub tab_inactive: Style,
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            warning: Color::Yellow,
            critical: Color::Red,
            healthy: Color::Green,
            border: Color::Gray,
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::Gray),
            border_type: BorderType::Rounded,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            warning: Color::Yellow,
            critical: Color::Red,
            healthy: Color::Green,
            border: Color::DarkGray,
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::LightBlue).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::DarkGray),
            border_type: BorderType::Rounded,
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        // Use terminal-light crate to detect background luminance
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Style for a channel classification.
    pub fn level_style(&self, level: SensorLevel) -> Style {
        match level {
            SensorLevel::Normal => Style::default().fg(self.healthy),
            SensorLevel::Warning => Style::default().fg(self.warning),
            SensorLevel::Critical => {
                Style::default().fg(self.critical).add_modifier(Modifier::BOLD)
            }
        }
    }

    /// Style for the backend's overall engine status.
    pub fn engine_style(&self, status: EngineStatus) -> Style {
        match status {
            EngineStatus::Healthy => self.level_style(SensorLevel::Normal),
            EngineStatus::Warning => self.level_style(SensorLevel::Warning),
            EngineStatus::Critical => self.level_style(SensorLevel::Critical),
        }
    }

    /// Chart color for a channel, falling back to the highlight color.
    pub fn channel_color(&self, channel: &SensorThreshold) -> Color {
        channel
            .color
            .as_deref()
            .and_then(|hex| Color::from_str(hex).ok())
            .unwrap_or(self.highlight)
    }
}
