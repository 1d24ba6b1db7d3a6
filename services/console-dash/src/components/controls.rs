use ratatui::prelude::*;
use ratatui::widgets::*;

use super::{colors, panel};
use crate::view::DashboardView;

pub fn draw_selection(frame: &mut Frame, area: Rect, view: &DashboardView) {
    let selection = &view.selection;

    let (button, button_style) = if selection.computing {
        ("Computing...", Style::default().fg(colors::BG_DARK).bg(colors::AMBER))
    } else if selection.can_compute {
        ("Compute route", Style::default().fg(colors::BG_DARK).bg(colors::TEAL).bold())
    } else {
        (
            "Compute route",
            Style::default().fg(colors::SLATE).add_modifier(Modifier::DIM),
        )
    };

    let field = |label: &'static str, value: String| {
        Line::from(vec![
            Span::styled(format!("{:<12}", label), Style::default().fg(colors::SLATE)),
            Span::styled(value, Style::default().fg(colors::WHITE).bold()),
        ])
    };

    let mut lines = vec![
        field("Origin", selection.origin.clone()),
        field("Destination", selection.destination.clone()),
        field("Mode", selection.mode.to_string()),
        Line::from(Span::styled(format!(" {} ", button), button_style)),
    ];
    for (panel_name, message) in &view.errors {
        lines.push(Line::from(Span::styled(
            format!("{}: {}", panel_name, message),
            Style::default().fg(colors::ERROR),
        )));
    }

    frame.render_widget(
        Paragraph::new(lines).block(panel("ROUTE PLANNER", colors::TEAL)).wrap(Wrap { trim: true }),
        area,
    );
}

pub fn draw_activity(frame: &mut Frame, area: Rect, view: &DashboardView) {
    let logs: Vec<Line> = view
        .activity
        .iter()
        .map(|entry| {
            let (prefix, color) = match entry.level.as_str() {
                "ERROR" => ("[ERR]", colors::ERROR),
                "WARN" => ("[WRN]", colors::AMBER),
                "INFO" => ("[INF]", colors::SUCCESS),
                _ => ("[---]", colors::SLATE),
            };

            Line::from(vec![
                Span::styled(
                    format!("{} ", entry.timestamp.format("%H:%M:%S")),
                    Style::default().fg(colors::SLATE).add_modifier(Modifier::DIM),
                ),
                Span::styled(format!("{} ", prefix), Style::default().fg(color)),
                Span::styled(entry.message.as_str(), Style::default().fg(colors::WHITE)),
            ])
        })
        .collect();

    frame.render_widget(
        Paragraph::new(logs).block(panel("ACTIVITY LOG", colors::WHITE)).wrap(Wrap { trim: true }),
        area,
    );
}

pub fn draw_footer(frame: &mut Frame, area: Rect) {
    let key = |k: &'static str, bg: Color| Span::styled(k, Style::default().fg(colors::BG_DARK).bg(bg));
    let label = |l: &'static str| Span::styled(l, Style::default().fg(colors::SLATE));

    let help = Line::from(vec![
        key(" [Q] ", colors::ERROR),
        label(" Quit  "),
        key(" [O/D] ", colors::TEAL),
        label(" Origin/Destination  "),
        key(" [M] ", colors::TEAL),
        label(" Mode  "),
        key(" [C] ", colors::AMBER),
        label(" Compute  "),
        key(" [R] ", colors::WHITE),
        label(" Refresh events  "),
        key(" [T/S] ", colors::SLATE),
        label(" Type/Severity filter "),
    ]);

    frame.render_widget(
        Paragraph::new(help).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(Style::default().fg(colors::DARK_TEAL))
                .style(Style::default().bg(colors::BG_DARK)),
        ),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::testing::render;

    #[test]
    fn test_selection_shows_placeholders_and_errors() {
        let mut view = DashboardView::default();
        view.errors = vec![("Route", "Request timed out after 15s".to_string())];
        let text = render(70, 10, |frame| {
            let area = frame.area();
            draw_selection(frame, area, &view)
        });
        assert!(text.contains("Origin"));
        assert!(text.contains("Destination"));
        assert!(text.contains("road"));
        assert!(text.contains("Route: Request timed out after 15s"));
    }

    #[test]
    fn test_computing_label() {
        let mut view = DashboardView::default();
        view.selection.computing = true;
        let text = render(70, 8, |frame| {
            let area = frame.area();
            draw_selection(frame, area, &view)
        });
        assert!(text.contains("Computing..."));
    }
}
