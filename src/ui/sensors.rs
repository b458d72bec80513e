//! Sensors view rendering.
//!
//! Displays the channels of the selected group with their reading, limits,
//! deviation from max, trend, and a sparkline of the history window.

use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::data::SensorLevel;

/// Sparkline characters (8 levels of height).
const SPARKLINE_CHARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Number of history points shown in a table sparkline.
const SPARKLINE_WIDTH: usize = 12;

/// Render the Sensors view for the selected group.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(group) = app.current_group() else {
        return;
    };
    let channels = app.thresholds.channels_in(group);

    if app.statuses.is_empty() {
        render_waiting(frame, app, area, group.title());
        return;
    }

    let header = Row::new(vec![
        Cell::from("Channel"),
        Cell::from("Value"),
        Cell::from("Min"),
        Cell::from("Max"),
        Cell::from("Dev %"),
        Cell::from("Trend"),
        Cell::from("History"),
        Cell::from("Status"),
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = channels
        .iter()
        .filter_map(|c| {
            let status = app.statuses.get(&c.name)?;
            let level_style = app.theme.level_style(status.level);
            let sparkline = render_sparkline(&app.telemetry.history().sparkline(&c.name));

            let held = app.sticky.get(&c.name).is_some_and(|e| app.now() < e.expiry);
            let sticky_marker = if status.level != SensorLevel::Critical && held {
                "*"
            } else {
                ""
            };

            Some(Row::new(vec![
                Cell::from(Line::from(vec![
                    Span::styled(c.label.clone(), Style::default().fg(app.theme.channel_color(c))),
                    Span::styled(
                        format!(" {}", c.unit),
                        Style::default().add_modifier(Modifier::DIM),
                    ),
                ])),
                Cell::from(format_reading(status.value)).style(level_style),
                Cell::from(c.min.map(format_reading).unwrap_or_else(|| "-".to_string())),
                Cell::from(format_reading(c.max)),
                Cell::from(format!("{:.2}", status.deviation)),
                Cell::from(status.trend.arrow()),
                Cell::from(sparkline),
                Cell::from(format!("{}{}", status.level.symbol(), sticky_marker)).style(level_style),
            ]))
        })
        .collect();

    let widths = [
        Constraint::Fill(3),                        // Channel
        Constraint::Fill(1),                        // Value
        Constraint::Fill(1),                        // Min
        Constraint::Fill(1),                        // Max
        Constraint::Length(7),                      // Deviation
        Constraint::Length(5),                      // Trend
        Constraint::Length(SPARKLINE_WIDTH as u16), // History
        Constraint::Length(6),                      // Status
    ];

    let critical = channels
        .iter()
        .filter(|c| app.statuses.get(&c.name).is_some_and(|s| s.level == SensorLevel::Critical))
        .count();
    let border_color = if critical > 0 {
        app.theme.critical
    } else {
        app.theme.border
    };

    let selected = app.selected_channel.min(rows.len().saturating_sub(1));
    let groups = app.thresholds.groups().len();
    let title = format!(
        " {} ({}/{}) [g:group] [{}/{}] ",
        group.title(),
        app.selected_group + 1,
        groups,
        selected + 1,
        rows.len()
    );

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(border_color)),
        )
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(Some(selected));

    frame.render_stateful_widget(table, area, &mut state);
}

fn render_waiting(frame: &mut Frame, app: &App, area: Rect, title: &str) {
    let block = Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    let message = if app.telemetry.is_connected() {
        "  Waiting for the first telemetry frame..."
    } else {
        "  Connecting to the telemetry stream..."
    };

    let paragraph = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(message, Style::default().add_modifier(Modifier::DIM))),
    ])
    .block(block);
    frame.render_widget(paragraph, area);
}

/// Format a reading with precision suited to its magnitude.
pub fn format_reading(value: f64) -> String {
    if value.abs() >= 1_000.0 {
        format!("{:.1}", value)
    } else if value.abs() >= 100.0 {
        format!("{:.2}", value)
    } else {
        format!("{:.3}", value)
    }
}

pub(crate) fn render_sparkline(data: &[u8]) -> String {
    if data.is_empty() {
        return " ".repeat(SPARKLINE_WIDTH);
    }

    let skip = data.len().saturating_sub(SPARKLINE_WIDTH);
    data[skip..].iter().map(|&v| SPARKLINE_CHARS[v.min(7) as usize]).collect()
}
