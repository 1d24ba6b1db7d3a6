use ratatui::prelude::*;
use ratatui::widgets::*;

use super::colors;
use crate::view::DashboardView;

pub const BRAND: &str = "OmniRoute Console";

pub fn draw(frame: &mut Frame, area: Rect, view: &DashboardView, demo_mode: bool) {
    let (mode_text, mode_color) = if demo_mode {
        ("DEMO", colors::AMBER)
    } else if view.errors.iter().any(|(panel, _)| *panel == "Network") {
        ("DISCONNECTED", colors::ERROR)
    } else {
        ("LIVE", colors::SUCCESS)
    };

    let status = if view.loading_network {
        Span::styled("Loading network...", Style::default().fg(colors::SLATE))
    } else if view.selection.computing {
        Span::styled("Computing route...", Style::default().fg(colors::AMBER))
    } else {
        Span::styled(
            format!("{} locations", view.locations.len()),
            Style::default().fg(colors::SLATE),
        )
    };

    let title = Line::from(vec![
        Span::styled(
            format!(" {} ", BRAND),
            Style::default().fg(colors::BG_DARK).bg(colors::TEAL).bold(),
        ),
        Span::raw("  "),
        Span::styled("Multimodal Routing Ops", Style::default().fg(colors::WHITE).bold()),
        Span::raw("  "),
        Span::styled(format!("[{}]", mode_text), Style::default().fg(mode_color).bold()),
        Span::raw("  "),
        status,
    ]);

    let header = Paragraph::new(title).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(colors::DARK_TEAL))
            .style(Style::default().bg(colors::BG_DARK)),
    );

    frame.render_widget(header, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::testing::render;

    #[test]
    fn test_demo_badge() {
        let view = DashboardView::default();
        let text = render(100, 3, |frame| {
            let area = frame.area();
            draw(frame, area, &view, true)
        });
        assert!(text.contains("[DEMO]"));
        assert!(text.contains(BRAND));
    }

    #[test]
    fn test_network_error_shows_disconnected() {
        let mut view = DashboardView::default();
        view.loading_network = false;
        view.errors = vec![("Network", "Network error - backend unreachable".to_string())];
        let text = render(100, 3, |frame| {
            let area = frame.area();
            draw(frame, area, &view, false)
        });
        assert!(text.contains("[DISCONNECTED]"));
    }
}
