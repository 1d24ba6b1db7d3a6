// services/console-dash/src/components/charts.rs
//
// Delay trend (session data) plus two reference bar charts whose series are
// fixed representative figures, not fetched.
//

use ratatui::prelude::*;
use ratatui::symbols::Marker;
use ratatui::widgets::*;

use svckit::types::DelayPoint;

use super::{colors, panel};
use crate::view::DashboardView;

pub const EMPTY_TREND_MESSAGE: &str = "No delay data yet";

/// kg CO2e per representative shipment, by mode.
pub const EMISSIONS_BY_MODE: [(&str, u64); 4] = [("Road", 120), ("Rail", 55), ("Sea", 40), ("Air", 180)];

/// Average delay in minutes, road-only baseline against the optimised plan.
pub const DELAY_COMPARISON: [(&str, u64); 2] = [("Baseline", 80), ("Optimised", 44)];

pub fn draw(frame: &mut Frame, area: Rect, view: &DashboardView) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(50),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
        ])
        .split(area);

    draw_delay_trend(frame, chunks[0], &view.delay_trend);
    draw_bars(frame, chunks[1], "EMISSIONS BY MODE (kg)", &EMISSIONS_BY_MODE, colors::TEAL);
    draw_bars(frame, chunks[2], "DELAY COMPARISON (min)", &DELAY_COMPARISON, colors::AMBER);
}

/// Y axis upper bound: the largest point plus headroom, never below 10 minutes.
fn y_ceiling(points: &[DelayPoint]) -> f64 {
    let max = points.iter().map(|p| p.expected_delay_min).fold(0.0, f64::max);
    (max * 1.2).max(10.0).ceil()
}

fn draw_delay_trend(frame: &mut Frame, area: Rect, points: &[DelayPoint]) {
    let block = panel("DELAY TREND", colors::CYAN);

    if points.is_empty() {
        let empty = Paragraph::new(Span::styled(EMPTY_TREND_MESSAGE, Style::default().fg(colors::SLATE)))
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let data: Vec<(f64, f64)> = points
        .iter()
        .enumerate()
        .map(|(i, p)| (i as f64, p.expected_delay_min))
        .collect();
    let x_max = (points.len().saturating_sub(1)).max(1) as f64;
    let y_max = y_ceiling(points);

    let first = points.first().map_or("", |p| p.time.as_str());
    let last = points.last().map_or("", |p| p.time.as_str());

    let dataset = Dataset::default()
        .name("expected delay")
        .marker(Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(colors::CYAN))
        .data(&data);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .style(Style::default().fg(colors::SLATE))
                .bounds([0.0, x_max])
                .labels([first.to_string(), last.to_string()]),
        )
        .y_axis(
            Axis::default()
                .title("Delay (min)")
                .style(Style::default().fg(colors::SLATE))
                .bounds([0.0, y_max])
                .labels(["0".to_string(), format!("{:.0}", y_max)]),
        );

    frame.render_widget(chart, area);
}

fn draw_bars(frame: &mut Frame, area: Rect, title: &str, series: &[(&str, u64)], color: Color) {
    let chart = BarChart::default()
        .block(panel(title, color))
        .data(series)
        .bar_width(7)
        .bar_gap(1)
        .bar_style(Style::default().fg(color))
        .value_style(Style::default().fg(colors::BG_DARK).bg(color).bold())
        .label_style(Style::default().fg(colors::SLATE));

    frame.render_widget(chart, area);
}
