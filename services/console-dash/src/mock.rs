// services/console-dash/src/mock.rs
//
// In-process backend for demo mode. Answers every LogisticsApi call with
// generated data so the console can run without the routing service.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use parking_lot::Mutex;
use rand::Rng;
use serde_json::{json, Map, Value};

use svckit::errors::ApiError;
use svckit::types::{
    Coord, EvaluationMetrics, Event, EventType, EventsQuery, Location, LocationList, LocationType, Mode, Plan,
    PlanCreate, Route, RouteKpis, RouteLeg, RoutingRequest, Severity, Shipment, ShipmentList,
};
use svckit::LogisticsApi;

const EARTH_RADIUS_KM: f64 = 6371.0;
const MAX_EVENTS: usize = 200;

const NETWORK: [(&str, LocationType, f64, f64); 6] = [
    ("Peenya Depot", LocationType::Depot, 13.0285, 77.5197),
    ("Whitefield Hub", LocationType::Customer, 12.9698, 77.7500),
    ("Bengaluru City Rail", LocationType::Rail, 12.9784, 77.5695),
    ("Kempegowda Airport", LocationType::Airport, 13.1986, 77.7066),
    ("Chennai Port", LocationType::Port, 13.0827, 80.2883),
    ("Mangaluru Port", LocationType::Port, 12.9141, 74.8560),
];

fn speed_kph(mode: Mode) -> f64 {
    match mode {
        Mode::Road => 50.0,
        Mode::Rail => 80.0,
        Mode::Sea => 30.0,
        Mode::Air => 700.0,
        Mode::Transfer => 3.0,
    }
}

fn co2e_per_km(mode: Mode) -> f64 {
    match mode {
        Mode::Road => 0.85,
        Mode::Rail => 0.25,
        Mode::Sea => 0.15,
        Mode::Air => 2.5,
        Mode::Transfer => 0.0,
    }
}

fn cost_per_km(mode: Mode) -> f64 {
    if mode == Mode::Rail {
        6.0
    } else {
        12.0
    }
}

pub fn haversine_km(a: Coord, b: Coord) -> f64 {
    let (lat1, lon1, lat2, lon2) = (a.lat.to_radians(), a.lon.to_radians(), b.lat.to_radians(), b.lon.to_radians());
    let h = ((lat2 - lat1) / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * ((lon2 - lon1) / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

fn round_to(v: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (v * factor).round() / factor
}

/// Reduction from `baseline` to `optimised`, in percent of the baseline.
fn reduction_pct(baseline: f64, optimised: f64) -> f64 {
    round_to((baseline - optimised) / baseline.max(1.0) * 100.0, 2)
}

/// Single-leg route against a road-only baseline.
pub fn plan_route(origin: Coord, destination: Coord, mode: Mode) -> Route {
    let distance = haversine_km(origin, destination);

    let base_time = distance / speed_kph(Mode::Road) * 60.0;
    let base_co2e = co2e_per_km(Mode::Road) * distance;
    let base_cost = cost_per_km(Mode::Road) * distance;
    let base_delay = base_time * 0.35;

    let time = distance / speed_kph(mode) * 60.0;
    let co2e = co2e_per_km(mode) * distance;
    let cost = cost_per_km(mode) * distance;
    let delay = time * 0.15;

    let leg = RouteLeg {
        mode,
        from_coord: origin,
        to_coord: destination,
        distance_km: round_to(distance, 3),
        time_min: round_to(time, 1),
        co2e_kg: round_to(co2e, 3),
        polyline: Some(crate::polyline::encode(&[origin, midpoint(origin, destination), destination])),
    };

    Route {
        distance_km: leg.distance_km,
        time_min: leg.time_min,
        co2e_kg: leg.co2e_kg,
        legs: vec![leg],
        kpis: Some(RouteKpis {
            delay_reduction_pct: reduction_pct(base_delay, delay),
            emissions_saved_pct: reduction_pct(base_co2e, co2e),
            cost_change_pct: round_to((cost - base_cost) / base_cost.max(1.0) * 100.0, 2),
        }),
    }
}

fn midpoint(a: Coord, b: Coord) -> Coord {
    Coord {
        lat: (a.lat + b.lat) / 2.0,
        lon: (a.lon + b.lon) / 2.0,
    }
}

struct MockState {
    next_event_id: i64,
    next_plan_id: u64,
    events: Vec<Event>,
    last_route: Option<Route>,
}

pub struct MockBackend {
    locations: Vec<Location>,
    shipments: Vec<Shipment>,
    latency: Duration,
    state: Mutex<MockState>,
}

impl MockBackend {
    pub fn new() -> Self {
        let locations: Vec<Location> = NETWORK
            .iter()
            .enumerate()
            .map(|(i, (name, kind, lat, lon))| Location {
                id: i as i64 + 1,
                name: name.to_string(),
                kind: *kind,
                lat: *lat,
                lon: *lon,
            })
            .collect();

        let shipments = (1..=8)
            .map(|n| {
                let origin = ((n - 1) % locations.len()) as i64 + 1;
                let destination = (n % locations.len()) as i64 + 1;
                Shipment {
                    id: format!("SHP-{:04}", n),
                    origin_id: origin,
                    destination_id: destination,
                    volume_m3: 2.5 * n as f64,
                    weight_kg: 400.0 * n as f64,
                    ready_time: "2025-03-01T08:00:00Z".to_string(),
                    due_time: "2025-03-02T18:00:00Z".to_string(),
                    priority: (n % 3) as i32,
                }
            })
            .collect();

        Self {
            locations,
            shipments,
            latency: Duration::from_millis(250),
            state: Mutex::new(MockState {
                next_event_id: 1,
                next_plan_id: 1,
                events: Vec::new(),
                last_route: None,
            }),
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    async fn delay(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    /// Add a couple of events, newest first, the way the ingest workers would.
    fn ingest(&self) {
        let mut rng = rand::thread_rng();
        let mut state = self.state.lock();
        let count = rng.gen_range(1..=3);

        for _ in 0..count {
            let location = &self.locations[rng.gen_range(0..self.locations.len())];
            let kind = EventType::ALL[rng.gen_range(0..EventType::ALL.len())];
            let severity = Severity::ALL[rng.gen_range(0..Severity::ALL.len())];
            let (source, payload) = event_payload(kind, location, &mut rng);

            let event = Event {
                id: state.next_event_id,
                kind,
                ts: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
                plan_id: None,
                source: Some(source.to_string()),
                severity: Some(severity),
                payload,
            };
            state.next_event_id += 1;
            state.events.insert(0, event);
        }
        state.events.truncate(MAX_EVENTS);
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn event_payload(kind: EventType, location: &Location, rng: &mut impl Rng) -> (&'static str, Map<String, Value>) {
    let (source, payload) = match kind {
        EventType::Weather => (
            "open-meteo",
            json!({
                "location_name": location.name,
                "temperature_c": round_to(rng.gen_range(18.0..34.0), 1),
                "precipitation_mm": round_to(rng.gen_range(0.0..12.0), 1),
                "wind_speed_mps": round_to(rng.gen_range(0.5..9.0), 1),
            }),
        ),
        EventType::Traffic => (
            "tomtom",
            json!({
                "location_name": location.name,
                "congestion_index": round_to(rng.gen_range(0.1..0.95), 2),
                "avg_speed_kph": round_to(rng.gen_range(12.0..55.0), 1),
            }),
        ),
        EventType::FuelPrice => (
            "fuel-feed",
            json!({ "diesel_inr_per_litre": round_to(rng.gen_range(88.0..96.0), 2) }),
        ),
        EventType::Breakdown => (
            "fleet",
            json!({
                "location_name": location.name,
                "note": "vehicle reported breakdown",
            }),
        ),
    };
    (source, payload.as_object().cloned().unwrap_or_default())
}

fn event_matches(event: &Event, query: &EventsQuery) -> bool {
    query.kind.map_or(true, |k| event.kind == k)
        && query.severity.map_or(true, |s| event.severity == Some(s))
        && query
            .source
            .as_ref()
            .map_or(true, |s| event.source.as_deref() == Some(s.as_str()))
}

#[async_trait]
impl LogisticsApi for MockBackend {
    async fn locations(&self) -> Result<LocationList, ApiError> {
        self.delay().await;
        Ok(LocationList {
            total: self.locations.len() as u64,
            data: self.locations.clone(),
        })
    }

    async fn shipments(&self) -> Result<ShipmentList, ApiError> {
        self.delay().await;
        Ok(ShipmentList {
            total: self.shipments.len() as u64,
            data: self.shipments.clone(),
        })
    }

    async fn events(&self, query: &EventsQuery) -> Result<Vec<Event>, ApiError> {
        self.delay().await;
        self.ingest();

        let limit = query.limit.unwrap_or(50) as usize;
        let state = self.state.lock();
        Ok(state
            .events
            .iter()
            .filter(|e| event_matches(e, query))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn evaluation_metrics(&self) -> Result<EvaluationMetrics, ApiError> {
        self.delay().await;
        Ok(EvaluationMetrics {
            delay_reduction_pct: 42.86,
            emissions_saved_pct: 23.5,
            cost_change_pct: -8.2,
            reroutes_count: 3,
        })
    }

    async fn compute_route(&self, request: &RoutingRequest) -> Result<Route, ApiError> {
        self.delay().await;
        let (Some(origin), Some(destination)) = (request.origins.first(), request.destinations.first()) else {
            return Err(ApiError::Http {
                status: 422,
                message: "origins and destinations are required".to_string(),
            });
        };
        let Some(mode) = request.modes.first().copied() else {
            return Err(ApiError::Http {
                status: 400,
                message: "At least one mode is required".to_string(),
            });
        };

        let route = plan_route(*origin, *destination, mode);
        self.state.lock().last_route = Some(route.clone());
        Ok(route)
    }

    async fn create_plan(&self, request: &PlanCreate) -> Result<Plan, ApiError> {
        self.delay().await;
        if request.shipment_ids.is_empty() {
            return Err(ApiError::Http {
                status: 400,
                message: "shipment_ids cannot be empty".to_string(),
            });
        }

        let mut rng = rand::thread_rng();
        let mut state = self.state.lock();
        let id = format!("plan_{}", state.next_plan_id);
        state.next_plan_id += 1;

        let (distance, time, co2e) = state
            .last_route
            .as_ref()
            .map_or((0.0, 0.0, 0.0), |r| (r.distance_km, r.time_min, r.co2e_kg));
        let delay_prob: f64 = round_to(rng.gen_range(0.05..0.85), 2);
        let expected_delay_min = round_to(delay_prob * (time * 0.35).max(10.0), 1);

        Ok(Plan {
            id,
            total_distance_km: distance,
            total_time_min: time,
            total_co2e_kg: co2e,
            delay_prob: Some(delay_prob),
            expected_delay_min: Some(expected_delay_min),
        })
    }

    fn name(&self) -> &str {
        "demo backend"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> MockBackend {
        MockBackend::new().with_latency(Duration::ZERO)
    }

    #[test]
    fn test_haversine_bengaluru_chennai() {
        let d = haversine_km(Coord { lat: 12.9716, lon: 77.5946 }, Coord { lat: 13.0827, lon: 80.2707 });
        assert!((d - 290.0).abs() < 5.0, "got {}", d);
    }

    #[test]
    fn test_rail_route_beats_road_baseline() {
        let a = Coord { lat: 12.9716, lon: 77.5946 };
        let b = Coord { lat: 13.0827, lon: 80.2707 };
        let route = plan_route(a, b, Mode::Rail);
        let kpis = route.kpis.unwrap();
        // rail: 0.25 vs 0.85 kg/km, half the cost, 80 vs 50 kph
        assert_eq!(kpis.emissions_saved_pct, 70.59);
        assert_eq!(kpis.cost_change_pct, -50.0);
        assert_eq!(kpis.delay_reduction_pct, 73.21);
        assert_eq!(route.legs.len(), 1);
        assert!(route.legs[0].polyline.is_some());
    }

    #[test]
    fn test_road_route_matches_baseline() {
        let route = plan_route(Coord { lat: 12.9, lon: 77.5 }, Coord { lat: 13.2, lon: 77.7 }, Mode::Road);
        let kpis = route.kpis.unwrap();
        assert_eq!(kpis.emissions_saved_pct, 0.0);
        assert_eq!(kpis.cost_change_pct, 0.0);
    }

    #[tokio::test]
    async fn test_events_are_newest_first_and_filtered() {
        let api = backend();
        for _ in 0..5 {
            api.events(&EventsQuery::default()).await.unwrap();
        }
        let all = api.events(&EventsQuery::default()).await.unwrap();
        assert!(all.windows(2).all(|w| w[0].id > w[1].id));

        let query = EventsQuery {
            kind: Some(EventType::Weather),
            limit: Some(3),
            ..Default::default()
        };
        let weather = api.events(&query).await.unwrap();
        assert!(weather.len() <= 3);
        assert!(weather.iter().all(|e| e.kind == EventType::Weather));
    }

    #[tokio::test]
    async fn test_plan_rejects_empty_shipments() {
        let err = backend().create_plan(&PlanCreate::default()).await.unwrap_err();
        assert_eq!(err.user_message(), "shipment_ids cannot be empty (400)");
    }

    #[tokio::test]
    async fn test_plan_carries_delay_prediction() {
        let api = backend();
        let route = api
            .compute_route(&RoutingRequest {
                origins: vec![Coord { lat: 12.97, lon: 77.59 }],
                destinations: vec![Coord { lat: 13.08, lon: 80.27 }],
                modes: vec![Mode::Road],
                objective: None,
                constraints: None,
            })
            .await
            .unwrap();
        let plan = api
            .create_plan(&PlanCreate {
                shipment_ids: vec!["SHP-0001".to_string()],
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(plan.id, "plan_1");
        assert_eq!(plan.total_distance_km, route.distance_km);
        let p = plan.delay_prob.unwrap();
        assert!((0.0..=1.0).contains(&p));
        assert!(plan.expected_delay_min.unwrap() > 0.0);
    }
}
