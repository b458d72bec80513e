//! Trends view rendering.
//!
//! Charts predicted RUL and the selected channel over the history window.
//! The channel chart draws its max (and min, when configured) as flat lines.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    symbols::Marker,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use crate::app::App;
use crate::ui::sensors::format_reading;

/// Render the trends view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let history = app.telemetry.history();

    if history.len() < 2 {
        let block = Block::default()
            .title(" Trends ")
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(Style::default().fg(app.theme.border));
        let paragraph = Paragraph::new(Span::styled(
            format!(" Collecting history ({}/2 frames)...", history.len()),
            Style::default().add_modifier(Modifier::DIM),
        ))
        .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let chunks = Layout::vertical([Constraint::Percentage(45), Constraint::Percentage(55)]).split(area);

    render_rul_chart(frame, app, chunks[0]);
    render_channel_chart(frame, app, chunks[1]);
}

fn render_rul_chart(frame: &mut Frame, app: &App, area: Rect) {
    let points = app.telemetry.history().rul_points();
    let x_range = x_bounds(&points);
    let y_range = y_bounds(&points, &[0.0]);

    let style = app
        .telemetry
        .latest()
        .map(|f| app.theme.engine_style(f.status))
        .unwrap_or_default();

    let dataset = Dataset::default()
        .name("RUL")
        .marker(Marker::Braille)
        .graph_type(GraphType::Line)
        .style(style)
        .data(&points);

    let chart = Chart::new(vec![dataset])
        .block(
            Block::default()
                .title(" Remaining Useful Life ")
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .x_axis(axis("Cycle", x_range, |v| format!("{:.0}", v)))
        .y_axis(axis("Cycles", y_range, |v| format!("{:.0}", v)));

    frame.render_widget(chart, area);
}

fn render_channel_chart(frame: &mut Frame, app: &App, area: Rect) {
    let Some(channel) = app.selected_channel_name().and_then(|name| app.thresholds.get(&name)) else {
        return;
    };

    let points = app.telemetry.history().channel_points(&channel.name);
    let x_range = x_bounds(&points);

    let max_line = vec![(x_range[0], channel.max), (x_range[1], channel.max)];
    let min_line: Vec<(f64, f64)> = channel
        .min
        .map(|min| vec![(x_range[0], min), (x_range[1], min)])
        .unwrap_or_default();

    let mut limits = vec![channel.max];
    limits.extend(channel.min);
    let y_range = y_bounds(&points, &limits);

    let mut datasets = vec![
        Dataset::default()
            .name(channel.label.clone())
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(app.theme.channel_color(channel)))
            .data(&points),
        Dataset::default()
            .name("max")
            .marker(Marker::Dot)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(app.theme.critical))
            .data(&max_line),
    ];
    if !min_line.is_empty() {
        datasets.push(
            Dataset::default()
                .name("min")
                .marker(Marker::Dot)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(app.theme.border))
                .data(&min_line),
        );
    }

    let title = format!(" {} ({}) [g:group ↑↓:channel] ", channel.label, channel.unit);
    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .x_axis(axis("Cycle", x_range, |v| format!("{:.0}", v)))
        .y_axis(axis(&channel.unit, y_range, format_reading));

    frame.render_widget(chart, area);
}

fn axis<'a>(title: &str, bounds: [f64; 2], label: impl Fn(f64) -> String) -> Axis<'a> {
    let mid = (bounds[0] + bounds[1]) / 2.0;
    Axis::default()
        .title(Span::styled(
            title.to_string(),
            Style::default().add_modifier(Modifier::DIM),
        ))
        .bounds(bounds)
        .labels([label(bounds[0]), label(mid), label(bounds[1])])
}

/// Cycle range over all points; cycles restart after an engine switch.
fn x_bounds(points: &[(f64, f64)]) -> [f64; 2] {
    let (min, max) = points.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
        (lo.min(p.0), hi.max(p.0))
    });

    if !min.is_finite() {
        [0.0, 1.0]
    } else if max > min {
        [min, max]
    } else {
        [min, min + 1.0]
    }
}

/// Y range covering the points and `extra` values, with 5% padding.
fn y_bounds(points: &[(f64, f64)], extra: &[f64]) -> [f64; 2] {
    let values = points.iter().map(|p| p.1).chain(extra.iter().copied());
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });

    if !min.is_finite() || !max.is_finite() {
        return [0.0, 1.0];
    }

    let pad = ((max - min) * 0.05).max(f64::EPSILON.max(max.abs() * 1e-3));
    [min - pad, max + pad]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_x_bounds() {
        assert_eq!(x_bounds(&[(10.0, 1.0), (20.0, 2.0)]), [10.0, 20.0]);
        assert_eq!(x_bounds(&[(10.0, 1.0)]), [10.0, 11.0]);
        assert_eq!(x_bounds(&[]), [0.0, 1.0]);
    }

    #[test]
    fn test_x_bounds_after_cycle_restart() {
        // New unit starts back at cycle 1 while older frames are still in history
        let points = [(140.0, 1.0), (141.0, 2.0), (1.0, 3.0), (2.0, 4.0)];
        assert_eq!(x_bounds(&points), [1.0, 141.0]);
    }

    #[test]
    fn test_y_bounds_include_limits() {
        let [lo, hi] = y_bounds(&[(1.0, 641.0), (2.0, 642.0)], &[644.0]);
        assert!(lo < 641.0);
        assert!(hi > 644.0);

        let [lo, hi] = y_bounds(&[], &[]);
        assert_eq!((lo, hi), (0.0, 1.0));
    }
}
