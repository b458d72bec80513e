//! Detail overlay rendering.
//!
//! Displays a modal overlay with the limits, current status and history of
//! the selected channel.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Sparkline},
    Frame,
};

use crate::app::App;
use crate::data::duration::format_duration;
use crate::ui::sensors::format_reading;

/// Minimum width required for the detail overlay to render properly.
const MIN_OVERLAY_WIDTH: u16 = 50;
/// Minimum height required for the detail overlay to render properly.
const MIN_OVERLAY_HEIGHT: u16 = 14;

/// Render the channel detail as a modal overlay.
pub fn render_overlay(frame: &mut Frame, app: &App, area: Rect) {
    // Skip rendering if terminal is too small for the overlay
    if area.width < MIN_OVERLAY_WIDTH || area.height < MIN_OVERLAY_HEIGHT {
        return;
    }

    let Some(name) = app.selected_channel_name() else {
        return;
    };
    let Some(channel) = app.thresholds.get(&name) else {
        return;
    };

    let overlay_width = (area.width * 80 / 100).clamp(MIN_OVERLAY_WIDTH, 90);
    let overlay_height = (area.height * 70 / 100).clamp(MIN_OVERLAY_HEIGHT, 24);

    let x = area.x + (area.width.saturating_sub(overlay_width)) / 2;
    let y = area.y + (area.height.saturating_sub(overlay_height)) / 2;
    let overlay_area = Rect::new(x, y, overlay_width, overlay_height);

    frame.render_widget(Clear, overlay_area);

    let chunks = Layout::vertical([
        Constraint::Length(8), // Channel info
        Constraint::Min(4),    // History sparkline
        Constraint::Length(1), // Footer
    ])
    .split(overlay_area);

    // ===== HEADER SECTION =====
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let dim = Style::default().add_modifier(Modifier::DIM);

    let mut lines = vec![
        Line::from(vec![
            Span::styled(format!(" {} ", channel.label), bold.fg(app.theme.channel_color(channel))),
            Span::styled(format!("{} │ {}", channel.name, channel.group.title()), dim),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::raw(" Max: "),
            Span::styled(format!("{} {}", format_reading(channel.max), channel.unit), bold),
            Span::raw("    Min: "),
            Span::styled(
                channel
                    .min
                    .map(|m| format!("{} {}", format_reading(m), channel.unit))
                    .unwrap_or_else(|| "-".to_string()),
                bold,
            ),
        ]),
    ];

    match app.statuses.get(&name) {
        Some(status) => {
            let level_style = app.theme.level_style(status.level);
            lines.push(Line::from(vec![
                Span::raw(" Value: "),
                Span::styled(format!("{} {}", format_reading(status.value), channel.unit), level_style),
                Span::raw(format!(" {}", status.trend.arrow())),
                Span::raw("    Deviation: "),
                Span::styled(format!("{:.2}%", status.deviation), bold),
                Span::raw("    Status: "),
                Span::styled(status.level.symbol(), level_style.add_modifier(Modifier::BOLD)),
            ]));
        }
        None => lines.push(Line::from(Span::styled(" No reading yet", dim))),
    }

    if let Some(entry) = app.sticky.get(&name) {
        let remaining = entry.expiry.saturating_duration_since(app.now());
        lines.push(Line::from(vec![
            Span::raw(" Alert held for "),
            Span::styled(format_duration(remaining), Style::default().fg(app.theme.warning)),
            Span::raw(format!(" (peak {:.2}%)", entry.status.deviation)),
        ]));
    }

    let header = Paragraph::new(lines).block(
        Block::default()
            .title(" Channel Detail ")
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(Style::default().fg(app.theme.highlight)),
    );
    frame.render_widget(header, chunks[0]);

    // ===== HISTORY SECTION =====
    let history = app.telemetry.history();
    let series = history.series(&name);
    let floor = series.iter().copied().fold(f64::INFINITY, f64::min);
    // Sparkline takes unsigned bars; shift by the window minimum and keep 3 decimals
    let bars: Vec<u64> = series
        .iter()
        .map(|v| ((v - floor) * 1_000.0).round().max(0.0) as u64)
        .collect();

    let sparkline = Sparkline::default()
        .block(
            Block::default()
                .title(format!(" Last {} frames ", series.len()))
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .data(&bars)
        .style(Style::default().fg(app.theme.channel_color(channel)));
    frame.render_widget(sparkline, chunks[1]);

    // ===== FOOTER =====
    let footer = Paragraph::new(Line::from(vec![Span::styled(" Press Esc to close ", dim)]));
    frame.render_widget(footer, chunks[2]);
}
