// services/console-dash/src/components/map.rs
//
// Network map drawn on a braille canvas. Geometry lives in MapModel and is
// only rebuilt when the locations or the route actually change.
//

use ratatui::prelude::*;
use ratatui::symbols::Marker;
use ratatui::widgets::canvas::{Canvas, Line as CanvasLine, Points};
use ratatui::widgets::*;

use svckit::types::{Coord, Location, LocationType, Route};

use super::{colors, panel};
use crate::polyline;
use crate::view::DashboardView;

const DEFAULT_CENTER: Coord = Coord { lat: 12.9716, lon: 77.5946 };
const DEFAULT_SPAN_DEG: f64 = 0.1;
const MIN_SPAN_DEG: f64 = 0.02;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl Bounds {
    fn around(center: Coord, half_span: f64) -> Self {
        Self {
            south: center.lat - half_span,
            west: center.lon - half_span,
            north: center.lat + half_span,
            east: center.lon + half_span,
        }
    }

    /// Tight box around the locations, padded so markers sit off the border.
    pub fn of(locations: &[Location]) -> Option<Self> {
        let first = locations.first()?;
        let mut b = Self {
            south: first.lat,
            west: first.lon,
            north: first.lat,
            east: first.lon,
        };
        for l in &locations[1..] {
            b.south = b.south.min(l.lat);
            b.north = b.north.max(l.lat);
            b.west = b.west.min(l.lon);
            b.east = b.east.max(l.lon);
        }

        let pad_lat = ((b.north - b.south) * 0.1).max(MIN_SPAN_DEG);
        let pad_lon = ((b.east - b.west) * 0.1).max(MIN_SPAN_DEG);
        Some(Self {
            south: b.south - pad_lat,
            west: b.west - pad_lon,
            north: b.north + pad_lat,
            east: b.east + pad_lon,
        })
    }
}

#[derive(Debug, Default)]
pub struct MapModel {
    locations: Vec<Location>,
    route: Option<Route>,
    bounds: Option<Bounds>,
    path: Vec<Coord>,
    revision: u64,
}

impl MapModel {
    /// Rebuild derived geometry if either input changed. Returns whether it did.
    pub fn sync(&mut self, locations: &[Location], route: Option<&Route>) -> bool {
        let mut changed = false;

        if self.locations != locations {
            self.locations = locations.to_vec();
            self.bounds = Bounds::of(&self.locations);
            changed = true;
        }
        if self.route.as_ref() != route {
            self.route = route.cloned();
            self.path = self.route.as_ref().map(route_path).unwrap_or_default();
            changed = true;
        }

        if changed {
            self.revision += 1;
        }
        changed
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
            .unwrap_or_else(|| Bounds::around(DEFAULT_CENTER, DEFAULT_SPAN_DEG))
    }

    pub fn path(&self) -> &[Coord] {
        &self.path
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }
}

/// Path of the first leg: its encoded geometry when present and valid,
/// otherwise a straight segment between its endpoints.
fn route_path(route: &Route) -> Vec<Coord> {
    let Some(leg) = route.legs.first() else {
        return Vec::new();
    };

    leg.polyline
        .as_deref()
        .and_then(polyline::decode)
        .filter(|points| points.len() >= 2)
        .unwrap_or_else(|| vec![leg.from_coord, leg.to_coord])
}

fn marker_color(kind: LocationType) -> Color {
    match kind {
        LocationType::Depot => colors::CYAN,
        _ => colors::SUCCESS,
    }
}

pub fn draw(frame: &mut Frame, area: Rect, view: &DashboardView, model: &MapModel) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(6), Constraint::Length(6)])
        .split(area);

    draw_canvas(frame, chunks[0], view, model);
    draw_route_summary(frame, chunks[1], view);
}

fn draw_canvas(frame: &mut Frame, area: Rect, view: &DashboardView, model: &MapModel) {
    let block = panel("NETWORK MAP", colors::TEAL);

    if view.loading_network {
        let loading = Paragraph::new(Line::from(Span::styled(
            "Loading network...",
            Style::default().fg(colors::SLATE),
        )))
        .alignment(Alignment::Center)
        .block(block);
        frame.render_widget(loading, area);
        return;
    }

    let bounds = model.bounds();
    let canvas = Canvas::default()
        .block(block)
        .background_color(colors::BG_PANEL)
        .marker(Marker::Braille)
        .x_bounds([bounds.west, bounds.east])
        .y_bounds([bounds.south, bounds.north])
        .paint(|ctx| {
            for pair in model.path().windows(2) {
                ctx.draw(&CanvasLine {
                    x1: pair[0].lon,
                    y1: pair[0].lat,
                    x2: pair[1].lon,
                    y2: pair[1].lat,
                    color: colors::AMBER,
                });
            }
            ctx.layer();

            for location in model.locations() {
                ctx.draw(&Points {
                    coords: &[(location.lon, location.lat)],
                    color: marker_color(location.kind),
                });
                ctx.print(
                    location.lon,
                    location.lat,
                    Span::styled(format!(" {}", location.name), Style::default().fg(colors::WHITE)),
                );
            }
        });

    frame.render_widget(canvas, area);
}

fn draw_route_summary(frame: &mut Frame, area: Rect, view: &DashboardView) {
    let block = panel("ROUTE", colors::AMBER);

    let Some(summary) = &view.route_summary else {
        let hint = Paragraph::new(Line::from(Span::styled(
            "Select origin and destination, then compute.",
            Style::default().fg(colors::SLATE),
        )))
        .block(block);
        frame.render_widget(hint, area);
        return;
    };

    let header = Line::from(vec![
        Span::styled("Distance ", Style::default().fg(colors::SLATE)),
        Span::styled(summary.distance.as_str(), Style::default().fg(colors::WHITE).bold()),
        Span::raw("   "),
        Span::styled("Time ", Style::default().fg(colors::SLATE)),
        Span::styled(summary.time.as_str(), Style::default().fg(colors::WHITE).bold()),
        Span::raw("   "),
        Span::styled("CO2e ", Style::default().fg(colors::SLATE)),
        Span::styled(summary.co2e.as_str(), Style::default().fg(colors::WHITE).bold()),
    ]);

    let mut lines = vec![header];
    for (i, leg) in summary.legs.iter().enumerate() {
        lines.push(Line::from(Span::styled(
            format!("  {}. {:<5} {}  {}  {}", i + 1, leg.mode, leg.distance, leg.time, leg.co2e),
            Style::default().fg(colors::SLATE),
        )));
    }

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use svckit::types::{Mode, RouteLeg};

    fn location(id: i64, lat: f64, lon: f64) -> Location {
        Location {
            id,
            name: format!("L{}", id),
            kind: LocationType::Depot,
            lat,
            lon,
        }
    }

    fn route(polyline: Option<&str>) -> Route {
        Route {
            distance_km: 10.0,
            time_min: 12.0,
            co2e_kg: 8.5,
            legs: vec![RouteLeg {
                mode: Mode::Road,
                from_coord: Coord { lat: 12.9, lon: 77.5 },
                to_coord: Coord { lat: 13.0, lon: 77.6 },
                distance_km: 10.0,
                time_min: 12.0,
                co2e_kg: 8.5,
                polyline: polyline.map(str::to_string),
            }],
            kpis: None,
        }
    }

    #[test]
    fn test_memo_skips_unchanged_inputs() {
        let mut model = MapModel::default();
        let locations = vec![location(1, 12.9, 77.5), location(2, 13.1, 77.7)];

        assert!(model.sync(&locations, None));
        assert_eq!(model.revision(), 1);
        assert!(!model.sync(&locations, None));
        assert_eq!(model.revision(), 1);

        let r = route(None);
        assert!(model.sync(&locations, Some(&r)));
        assert!(!model.sync(&locations, Some(&r)));
        assert_eq!(model.revision(), 2);
    }

    #[test]
    fn test_bounds_cover_locations() {
        let mut model = MapModel::default();
        model.sync(&[location(1, 12.9, 77.5), location(2, 13.1, 77.7)], None);
        let b = model.bounds();
        assert!(b.south < 12.9 && b.north > 13.1);
        assert!(b.west < 77.5 && b.east > 77.7);
    }

    #[test]
    fn test_empty_network_centres_on_default() {
        let b = MapModel::default().bounds();
        assert!(b.south < DEFAULT_CENTER.lat && b.north > DEFAULT_CENTER.lat);
        assert!(b.west < DEFAULT_CENTER.lon && b.east > DEFAULT_CENTER.lon);
    }

    #[test]
    fn test_single_location_gets_nonzero_span() {
        let b = Bounds::of(&[location(1, 12.9, 77.5)]).unwrap();
        assert!(b.north - b.south >= MIN_SPAN_DEG);
        assert!(b.east - b.west >= MIN_SPAN_DEG);
        assert!(b.south < 12.9 && b.north > 12.9);
        assert!(b.west < 77.5 && b.east > 77.5);
    }

    #[test]
    fn test_collinear_locations_keep_minimum_span() {
        let b = Bounds::of(&[location(1, 12.9, 77.5), location(2, 12.9, 77.7)]).unwrap();
        assert!(b.north - b.south >= MIN_SPAN_DEG);
        assert!(b.east - b.west > 0.2);
    }

    #[test]
    fn test_path_prefers_encoded_geometry() {
        let encoded = polyline::encode(&[
            Coord { lat: 12.9, lon: 77.5 },
            Coord { lat: 12.95, lon: 77.52 },
            Coord { lat: 13.0, lon: 77.6 },
        ]);
        assert_eq!(route_path(&route(Some(&encoded))).len(), 3);
    }

    #[test]
    fn test_path_falls_back_to_endpoints() {
        let path = route_path(&route(Some("not a polyline")));
        assert_eq!(path, vec![Coord { lat: 12.9, lon: 77.5 }, Coord { lat: 13.0, lon: 77.6 }]);
        assert_eq!(route_path(&route(None)).len(), 2);
    }
}
