// services/console-dash/src/components/mod.rs
//
// Presentational layer. Every widget reads DashboardView and nothing else.
//

use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::view::DashboardView;

pub mod charts;
pub mod controls;
pub mod events;
pub mod kpis;
pub mod map;
pub mod navbar;

pub use map::MapModel;

// Color palette: Teal, Slate, Amber
pub mod colors {
    use ratatui::style::Color;

    pub const TEAL: Color = Color::Rgb(45, 212, 191);
    pub const DARK_TEAL: Color = Color::Rgb(17, 94, 89);
    pub const CYAN: Color = Color::Rgb(56, 189, 248);
    pub const WHITE: Color = Color::Rgb(241, 245, 249);
    pub const SLATE: Color = Color::Rgb(148, 163, 184);
    pub const AMBER: Color = Color::Rgb(251, 191, 36);
    pub const BG_DARK: Color = Color::Rgb(15, 23, 42);
    pub const BG_PANEL: Color = Color::Rgb(30, 41, 59);
    pub const SUCCESS: Color = Color::Rgb(16, 185, 129);
    pub const ERROR: Color = Color::Rgb(239, 68, 68);
}

pub fn draw(frame: &mut Frame, view: &DashboardView, map: &MapModel, demo_mode: bool) {
    let area = frame.area();

    frame.render_widget(Block::default().style(Style::default().bg(colors::BG_DARK)), area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),  // Navbar
            Constraint::Length(5),  // KPI cards
            Constraint::Min(12),    // Map + events
            Constraint::Length(12), // Charts
            Constraint::Length(8),  // Controls + activity
            Constraint::Length(2),  // Footer
        ])
        .split(area);

    navbar::draw(frame, chunks[0], view, demo_mode);
    kpis::draw(frame, chunks[1], view);

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[2]);
    map::draw(frame, middle[0], view, map);
    events::draw(frame, middle[1], &view.events);

    charts::draw(frame, chunks[3], view);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(chunks[4]);
    controls::draw_selection(frame, bottom[0], view);
    controls::draw_activity(frame, bottom[1], view);

    controls::draw_footer(frame, chunks[5]);
}

/// Rounded panel with a bold title, shared by every component.
pub(crate) fn panel<'a>(title: &'a str, accent: Color) -> Block<'a> {
    Block::default()
        .title(Span::styled(format!(" {} ", title), Style::default().fg(accent).bold()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors::SLATE))
        .border_type(BorderType::Rounded)
        .style(Style::default().bg(colors::BG_PANEL))
}


#[cfg(test)]
mod tests {
    use super::*;
    use svckit::types::{Coord, Location, LocationType, Mode, Route, RouteLeg};

    use crate::feed::{FeedSnapshot, FeedStatus};
    use crate::state::DashboardState;
    use svckit::types::EventsQuery;

    fn computed_view() -> DashboardView {
        let mut state = DashboardState::new();
        state.network_settled = true;
        state.locations = vec![
            Location {
                id: 1,
                name: "Peenya Depot".to_string(),
                kind: LocationType::Depot,
                lat: 13.02,
                lon: 77.51,
            },
            Location {
                id: 2,
                name: "Chennai Port".to_string(),
                kind: LocationType::Port,
                lat: 13.08,
                lon: 80.28,
            },
        ];
        state.route = Some(Route {
            distance_km: 120.0,
            time_min: 90.0,
            co2e_kg: 30.0,
            legs: vec![RouteLeg {
                mode: Mode::Road,
                from_coord: Coord { lat: 13.02, lon: 77.51 },
                to_coord: Coord { lat: 13.08, lon: 80.28 },
                distance_km: 120.0,
                time_min: 90.0,
                co2e_kg: 30.0,
                polyline: None,
            }],
            kpis: None,
        });
        let snapshot = FeedSnapshot {
            status: FeedStatus::Ready,
            data: vec![],
            error: None,
            last_updated: None,
            fetches: 1,
        };
        DashboardView::derive(&state, &snapshot, &EventsQuery::default())
    }

    #[test]
    fn test_full_dashboard_renders() {
        let view = computed_view();
        let mut map = MapModel::default();
        map.sync(&view.locations, view.route.as_ref());

        let text = testing::render(180, 60, |frame| draw(frame, &view, &map, true));
        assert!(text.contains("OmniRoute Console"));
        assert!(text.contains("120.00 km"));
        assert!(text.contains("90 min"));
        assert!(text.contains("30.00 kg"));
        assert!(text.contains("No recent events."));
        assert!(text.contains("No delay data yet"));
    }

    #[test]
    fn test_empty_dashboard_renders_placeholders() {
        let view = DashboardView::default();
        let map = MapModel::default();
        let text = testing::render(180, 60, |frame| draw(frame, &view, &map, false));
        assert!(text.contains("Loading network"));
        assert!(!text.contains(" km"));
    }
}
