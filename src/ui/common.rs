//! Common UI components shared across views.
//!
//! This module contains the header bar, tab bar, status bar, and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
    Frame,
};

use crate::app::{App, View};

/// Render the header bar with connection and engine overview.
///
/// Displays: connection state, engine unit, cycle, RUL, engine status, and
/// the end-of-life marker.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let title = Span::styled(" AEROPULSE ", Style::default().add_modifier(Modifier::BOLD));

    let engine = app
        .engine_unit()
        .map(|unit| format!("Engine #{} │ ", unit))
        .unwrap_or_default();

    if !app.telemetry.is_connected() && !app.telemetry.is_finished() {
        let line = Line::from(vec![
            Span::styled(" ○", Style::default().fg(app.theme.warning)),
            title,
            Span::raw("│ "),
            Span::raw(engine),
            Span::styled("Connecting...", Style::default().fg(app.theme.warning)),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    }

    let Some(latest) = app.telemetry.latest() else {
        let line = Line::from(vec![
            Span::styled(" ●", Style::default().fg(app.theme.healthy)),
            title,
            Span::raw("│ "),
            Span::raw(engine),
            Span::raw("Waiting for telemetry..."),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    };

    let status_style = app.theme.engine_style(latest.status);
    let live = app.critical_sensors().iter().filter(|a| a.live).count();

    let mut spans = vec![
        Span::styled(" ●", status_style),
        title,
        Span::raw("│ "),
        Span::raw(engine),
        Span::raw("Cycle "),
        Span::styled(
            latest.cycle.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" │ RUL "),
        Span::styled(
            format!("{:.0}", latest.rul),
            status_style.add_modifier(Modifier::BOLD),
        ),
        Span::raw(" │ "),
        Span::styled(latest.status.label(), status_style),
        Span::raw(" │ "),
        if live > 0 {
            Span::styled(
                format!("{} crit", live),
                Style::default().fg(app.theme.critical).add_modifier(Modifier::BOLD),
            )
        } else {
            Span::styled("0 crit", Style::default().add_modifier(Modifier::DIM))
        },
    ];

    if latest.finished {
        spans.push(Span::raw(" │ "));
        spans.push(Span::styled(
            "FINISHED",
            Style::default().fg(app.theme.critical).add_modifier(Modifier::BOLD | Modifier::REVERSED),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render the tab bar showing available views.
///
/// Highlights the currently active view.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = View::ALL
        .iter()
        .enumerate()
        .map(|(i, view)| Line::from(format!(" {}:{} ", i + 1, view.label())))
        .collect();

    let tabs = Tabs::new(titles)
        .select(app.current_view.index())
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Render the status bar at the bottom.
///
/// Shows: data source, frame count, available controls.
/// Also displays temporary status messages and errors.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    // Check for temporary status message first
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let controls = match app.current_view {
        View::Sensors => "g:group ↑↓:select Enter:detail +/-:engine ?:help q:quit",
        View::Alerts => "↑↓:select Enter:detail Tab:switch ?:help q:quit",
        View::Trends => "g:group ↑↓:channel Tab:switch ?:help q:quit",
        View::Report => "↑↓:select e:export Tab:switch ?:help q:quit",
    };

    let status = if let Some(ref err) = app.load_error {
        format!(" {} | Error: {} | {}", app.source_description(), err, controls)
    } else {
        format!(
            " {} | {} frames | {}",
            app.source_description(),
            app.telemetry.frames_received(),
            controls
        )
    };

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));

    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let section = |title: &'static str| {
        Line::from(vec![Span::styled(
            title,
            Style::default().add_modifier(Modifier::BOLD),
        )])
    };

    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        section(" Navigation"),
        Line::from("  ←/→ Tab     Switch views"),
        Line::from("  1-4         Jump to view"),
        Line::from("  ↑/↓ j/k     Navigate list"),
        Line::from("  PgUp/PgDn   Jump 10 items"),
        Line::from("  Enter       Channel detail"),
        Line::from("  Esc         Go back"),
        Line::from(""),
        section(" Sensors & Trends"),
        Line::from("  g           Next sensor group"),
        Line::from(""),
        section(" General"),
        Line::from("  + / -       Next/previous engine"),
        Line::from("  e           Export report to CSV"),
        Line::from("  q           Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    // Center the help overlay - responsive to terminal size
    let help_width = 42u16.min(area.width.saturating_sub(4));
    let help_height = 22u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    frame.render_widget(Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
