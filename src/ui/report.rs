//! Report view rendering.
//!
//! Shows the batch RUL analysis of an uploaded test file: fleet counts and
//! one row per engine.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;

/// Render the report view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(report) = app.report.as_ref().filter(|r| !r.is_empty()) else {
        render_no_report(frame, app, area);
        return;
    };

    let chunks = Layout::vertical([Constraint::Length(3), Constraint::Min(5)]).split(area);

    if let Some(stats) = report.stats() {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let line = Line::from(vec![
            Span::raw(" Engines "),
            Span::styled(stats.total.to_string(), bold),
            Span::raw(" │ "),
            Span::styled(stats.critical.to_string(), Style::default().fg(app.theme.critical).add_modifier(Modifier::BOLD)),
            Span::raw(" critical "),
            Span::styled(stats.warning.to_string(), Style::default().fg(app.theme.warning)),
            Span::raw(" warning "),
            Span::styled(stats.healthy.to_string(), Style::default().fg(app.theme.healthy)),
            Span::raw(" healthy │ Avg RUL "),
            Span::styled(format!("{:.0}", stats.average_rul), bold),
        ]);
        let summary = Paragraph::new(line).block(
            Block::default()
                .title(" Fleet Summary ")
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        );
        frame.render_widget(summary, chunks[0]);
    }

    let header = Row::new(vec![
        Cell::from("Engine"),
        Cell::from("Cycle"),
        Cell::from("RUL"),
        Cell::from("Fails At"),
        Cell::from("Status"),
        Cell::from("Reason"),
        Cell::from("Conf %"),
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = report
        .rows
        .iter()
        .map(|r| {
            let status_style = app.theme.engine_style(r.status);
            let reason_style = if r.warnings.is_empty() {
                Style::default()
            } else {
                Style::default().fg(app.theme.warning)
            };
            Row::new(vec![
                Cell::from(format!("#{}", r.engine_id)),
                Cell::from(r.current_cycle.to_string()),
                Cell::from(format!("{:.1}", r.predicted_rul)).style(status_style),
                Cell::from(r.estimated_failure_cycle.to_string()),
                Cell::from(r.status.label()).style(status_style),
                Cell::from(r.failure_reason.clone()).style(reason_style),
                Cell::from(format!("{:.1}", r.confidence)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(7),  // Engine
        Constraint::Length(6),  // Cycle
        Constraint::Length(7),  // RUL
        Constraint::Length(9),  // Fails at
        Constraint::Length(9),  // Status
        Constraint::Fill(1),    // Reason
        Constraint::Length(7),  // Confidence
    ];

    let selected = app.selected_row.min(report.rows.len().saturating_sub(1));
    let title = format!(
        " Analysis [{}/{}] [e:export {}] ",
        selected + 1,
        report.rows.len(),
        app.report_path().display()
    );

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(Some(selected));

    frame.render_stateful_widget(table, chunks[1], &mut state);
}

fn render_no_report(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Analysis ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    let dim = Style::default().add_modifier(Modifier::DIM);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("  No batch analysis loaded.", dim)),
        Line::from(""),
        Line::from(Span::styled(
            "  Run with --upload <test_FD001.txt> to analyze a C-MAPSS test file.",
            dim,
        )),
    ];

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
