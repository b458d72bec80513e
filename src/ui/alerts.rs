//! Alerts view rendering.
//!
//! Lists critical channels, including ones retained after recovering, ordered
//! by deviation, next to the backend's failure reasons for the latest frame.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

use crate::app::App;
use crate::data::duration::format_duration;
use crate::ui::sensors::format_reading;

/// Render the alerts view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::horizontal([Constraint::Fill(3), Constraint::Fill(2)]).split(area);

    render_alert_table(frame, app, chunks[0]);
    render_diagnostics(frame, app, chunks[1]);
}

fn render_alert_table(frame: &mut Frame, app: &App, area: Rect) {
    let alerts = app.critical_sensors();

    if alerts.is_empty() {
        render_clear_message(frame, app, area);
        return;
    }

    let header = Row::new(vec![
        Cell::from("State"),
        Cell::from("Channel"),
        Cell::from("Value"),
        Cell::from("Max"),
        Cell::from("Dev %"),
        Cell::from("Trend"),
        Cell::from("Held"),
    ])
    .height(1)
    .style(app.theme.header);

    let now = app.now();
    let critical_style = app.theme.level_style(crate::data::SensorLevel::Critical);

    let rows: Vec<Row> = alerts
        .iter()
        .map(|alert| {
            let status = &alert.status;
            let threshold = app.thresholds.get(&status.channel);
            let label = threshold
                .map(|t| t.label.clone())
                .unwrap_or_else(|| status.channel.clone());
            let max = threshold.map(|t| format_reading(t.max)).unwrap_or_else(|| "-".to_string());

            let (state, state_style) = if alert.live {
                ("LIVE", critical_style)
            } else {
                ("HELD", Style::default().fg(app.theme.warning))
            };

            let held = alert
                .expiry
                .map(|expiry| format_duration(expiry.saturating_duration_since(now)))
                .unwrap_or_else(|| "-".to_string());

            Row::new(vec![
                Cell::from(state).style(state_style),
                Cell::from(label).style(Style::default().add_modifier(Modifier::BOLD)),
                Cell::from(format_reading(status.value)).style(critical_style),
                Cell::from(max),
                Cell::from(format!("{:.2}", status.deviation)).style(critical_style),
                Cell::from(status.trend.arrow()),
                Cell::from(held).style(Style::default().add_modifier(Modifier::DIM)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(6),  // State
        Constraint::Fill(2),    // Channel
        Constraint::Fill(1),    // Value
        Constraint::Fill(1),    // Max
        Constraint::Length(7),  // Deviation
        Constraint::Length(5),  // Trend
        Constraint::Length(7),  // Held
    ];

    let live = alerts.iter().filter(|a| a.live).count();
    let selected = app.selected_alert.min(alerts.len().saturating_sub(1));
    let title = format!(
        " Critical ({} live, {} held) [{}/{}] ",
        live,
        alerts.len() - live,
        selected + 1,
        alerts.len()
    );

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.critical)),
        )
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(Some(selected));

    frame.render_stateful_widget(table, area, &mut state);
}

fn render_clear_message(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Critical ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.healthy));

    let lines = vec![
        Line::from(""),
        Line::from(""),
        Line::from(vec![
            Span::styled("    ✓ ", Style::default().fg(app.theme.healthy)),
            Span::styled(
                "All channels within limits",
                Style::default().fg(app.theme.healthy).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(""),
        Line::from(vec![Span::styled(
            "      No channel has exceeded its maximum recently.",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Failure reasons, data quality and backend warnings for the latest frame.
fn render_diagnostics(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Diagnostics ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    let Some(latest) = app.telemetry.latest() else {
        let paragraph = Paragraph::new(Span::styled(
            " No telemetry yet",
            Style::default().add_modifier(Modifier::DIM),
        ))
        .block(block);
        frame.render_widget(paragraph, area);
        return;
    };

    let bold = Style::default().add_modifier(Modifier::BOLD);
    let mut lines = vec![Line::from(Span::styled(" Failure reasons", bold))];

    match latest.failure_reasons.as_deref() {
        Some(reasons) if !reasons.is_empty() => {
            for reason in reasons {
                lines.push(Line::from(vec![
                    Span::styled("  • ", app.theme.engine_style(latest.status)),
                    Span::raw(reason.clone()),
                ]));
            }
        }
        _ => lines.push(Line::from(Span::styled(
            "  none reported",
            Style::default().add_modifier(Modifier::DIM),
        ))),
    }

    if let Some(quality) = &latest.data_quality {
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled(" Data quality: ", bold),
            Span::raw(quality.clone()),
        ]));
    }

    if !latest.warnings.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(" Warnings", bold)));
        for warning in &latest.warnings {
            lines.push(Line::from(vec![
                Span::styled("  ! ", Style::default().fg(app.theme.warning)),
                Span::raw(warning.clone()),
            ]));
        }
    }

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}
