// services/console-dash/src/view.rs
//
// Derived view state. Recomputed from DashboardState and the events
// snapshot every time either changes; nothing here is cached separately.
//

use svckit::types::{DelayPoint, Event, EventsQuery, Location, Mode, Route};

use crate::events::EventsView;
use crate::feed::FeedSnapshot;
use crate::format;
use crate::state::{DashboardState, LogEntry};

const ACTIVITY_TAIL: usize = 20;

#[derive(Debug, Clone, PartialEq)]
pub struct KpiCard {
    pub title: &'static str,
    pub value: String,
    pub sub: Option<String>,
}

impl KpiCard {
    fn new(title: &'static str, value: impl Into<String>) -> Self {
        Self {
            title,
            value: value.into(),
            sub: None,
        }
    }

    fn with_sub(mut self, sub: Option<&str>) -> Self {
        self.sub = sub.map(str::to_string);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegSummary {
    pub mode: Mode,
    pub distance: String,
    pub time: String,
    pub co2e: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RouteSummary {
    pub distance: String,
    pub time: String,
    pub co2e: String,
    pub legs: Vec<LegSummary>,
}

impl RouteSummary {
    pub fn from_route(route: &Route) -> Self {
        Self {
            distance: format::km(Some(route.distance_km)),
            time: format::mins(Some(route.time_min)),
            co2e: format::kg(Some(route.co2e_kg)),
            legs: route
                .legs
                .iter()
                .map(|leg| LegSummary {
                    mode: leg.mode,
                    distance: format::km(Some(leg.distance_km)),
                    time: format::mins(Some(leg.time_min)),
                    co2e: format::kg(Some(leg.co2e_kg)),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectionView {
    pub origin: String,
    pub destination: String,
    pub mode: Mode,
    pub can_compute: bool,
    pub computing: bool,
}

#[derive(Debug, Clone)]
pub struct DashboardView {
    pub kpis: Vec<KpiCard>,
    pub route_summary: Option<RouteSummary>,
    pub loading_network: bool,
    pub locations: Vec<Location>,
    pub route: Option<Route>,
    pub delay_trend: Vec<DelayPoint>,
    pub events: EventsView,
    pub selection: SelectionView,
    pub errors: Vec<(&'static str, String)>,
    pub activity: Vec<LogEntry>,
}

impl DashboardView {
    pub fn derive(state: &DashboardState, events: &FeedSnapshot<Event>, query: &EventsQuery) -> Self {
        Self {
            kpis: kpis(state, events),
            route_summary: state.route.as_ref().map(RouteSummary::from_route),
            loading_network: !state.network_settled,
            locations: state.locations.clone(),
            route: state.route.clone(),
            delay_trend: state.delay_trend.clone(),
            events: EventsView::from_snapshot(events, query),
            selection: SelectionView {
                origin: location_label(state.origin(), "Origin"),
                destination: location_label(state.destination(), "Destination"),
                mode: state.mode,
                can_compute: state.can_compute(),
                computing: state.computing,
            },
            errors: state.errors.active(),
            activity: state
                .activity_log
                .iter()
                .rev()
                .take(ACTIVITY_TAIL)
                .cloned()
                .collect(),
        }
    }

    pub fn show_route_summary(&self) -> bool {
        self.route_summary.is_some()
    }

    pub fn kpi(&self, title: &str) -> Option<&KpiCard> {
        self.kpis.iter().find(|k| k.title == title)
    }
}

impl Default for DashboardView {
    fn default() -> Self {
        let state = DashboardState::new();
        Self::derive(
            &state,
            &FeedSnapshot {
                status: crate::feed::FeedStatus::Idle,
                data: Vec::new(),
                error: None,
                last_updated: None,
                fetches: 0,
            },
            &EventsQuery::default(),
        )
    }
}

fn location_label(location: Option<&Location>, placeholder: &str) -> String {
    location.map_or_else(
        || placeholder.to_string(),
        |l| format!("{} ({})", l.name, l.kind),
    )
}

fn kpis(state: &DashboardState, events: &FeedSnapshot<Event>) -> Vec<KpiCard> {
    let delay_prob = state.plan.as_ref().and_then(|p| p.delay_prob);
    let expected_delay = state.plan.as_ref().and_then(|p| p.expected_delay_min);

    let mut cards = vec![
        KpiCard::new("Shipments", state.shipments_total.to_string()),
        KpiCard::new("Locations", state.locations.len().to_string()),
        KpiCard::new("Last Event", format::dt(events.data.first().map(|e| e.ts.as_str()))),
        KpiCard::new(
            "Delay Risk",
            delay_prob.map_or_else(|| format::MISSING.to_string(), format::probability),
        )
        .with_sub(format::risk_label(delay_prob)),
        KpiCard::new(
            "Expected Delay",
            expected_delay.map_or_else(|| format::MISSING.to_string(), |m| format!("{} min", m)),
        ),
    ];

    // A freshly computed route carries its own comparison against the
    // road-only baseline; prefer it over the global evaluation run.
    let route_kpis = state.route.as_ref().and_then(|r| r.kpis.as_ref());
    let evaluation = state.evaluation.as_ref();

    let delay_reduced = route_kpis
        .map(|k| k.delay_reduction_pct)
        .or(evaluation.map(|e| e.delay_reduction_pct));
    let emissions_saved = route_kpis
        .map(|k| k.emissions_saved_pct)
        .or(evaluation.map(|e| e.emissions_saved_pct));
    let cost_change = route_kpis
        .map(|k| k.cost_change_pct)
        .or(evaluation.map(|e| e.cost_change_pct));

    if let Some(v) = delay_reduced {
        cards.push(KpiCard::new("Delay Reduced", format::pct(v)).with_sub(Some("vs baseline")));
    }
    if let Some(v) = emissions_saved {
        cards.push(KpiCard::new("Emissions Saved", format::pct(v)).with_sub(Some("CO2 reduction")));
    }
    if let Some(v) = cost_change {
        cards.push(KpiCard::new("Cost Change", format::pct(v)).with_sub(Some("optimised vs baseline")));
    }
    if let Some(e) = evaluation {
        cards.push(KpiCard::new("Reroutes", e.reroutes_count.to_string()).with_sub(Some("event-triggered")));
    }

    cards
}
