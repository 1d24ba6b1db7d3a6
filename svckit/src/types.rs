use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

// ---- Locations

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LocationType {
    Depot,
    Port,
    Rail,
    Airport,
    Customer,
}

impl LocationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocationType::Depot => "depot",
            LocationType::Port => "port",
            LocationType::Rail => "rail",
            LocationType::Airport => "airport",
            LocationType::Customer => "customer",
        }
    }
}

impl fmt::Display for LocationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: LocationType,
    pub lat: f64,
    pub lon: f64,
}

impl Location {
    pub fn coord(&self) -> Coord {
        Coord { lat: self.lat, lon: self.lon }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocationList {
    pub data: Vec<Location>,
    pub total: u64,
}

// ---- Shipments

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Shipment {
    pub id: String,
    pub origin_id: i64,
    pub destination_id: i64,
    pub volume_m3: f64,
    pub weight_kg: f64,
    pub ready_time: String,
    pub due_time: String,
    #[serde(default)]
    pub priority: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShipmentList {
    pub data: Vec<Shipment>,
    pub total: u64,
}

// ---- Events

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Traffic,
    Weather,
    FuelPrice,
    Breakdown,
}

impl EventType {
    pub const ALL: [EventType; 4] = [
        EventType::Traffic,
        EventType::Weather,
        EventType::FuelPrice,
        EventType::Breakdown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Traffic => "traffic",
            EventType::Weather => "weather",
            EventType::FuelPrice => "fuel_price",
            EventType::Breakdown => "breakdown",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Moderate,
    High,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::Low, Severity::Moderate, Severity::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Moderate => "moderate",
            Severity::High => "high",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Newest-first by server contract; never re-sorted client side.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: EventType,
    pub ts: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(default)]
    pub payload: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EventsQuery {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<EventType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub since: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub until: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

// ---- Metrics

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EvaluationMetrics {
    pub delay_reduction_pct: f64,
    pub emissions_saved_pct: f64,
    pub cost_change_pct: f64,
    pub reroutes_count: u64,
}

// ---- Routing

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Road,
    Rail,
    Sea,
    Air,
    Transfer,
}

impl Mode {
    /// Modes offered in the selector; `transfer` only appears inside computed legs.
    pub const SELECTABLE: [Mode; 4] = [Mode::Road, Mode::Rail, Mode::Sea, Mode::Air];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Road => "road",
            Mode::Rail => "rail",
            Mode::Sea => "sea",
            Mode::Air => "air",
            Mode::Transfer => "transfer",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coord {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Objective {
    pub cost: f64,
    pub time: f64,
    pub co2e: f64,
}

impl Default for Objective {
    fn default() -> Self {
        Self {
            cost: 0.5,
            time: 0.3,
            co2e: 0.2,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Constraints {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefer_low_emission_within_pct: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depart_after: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoutingRequest {
    pub origins: Vec<Coord>,
    pub destinations: Vec<Coord>,
    pub modes: Vec<Mode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub objective: Option<Objective>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraints: Option<Constraints>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RouteLeg {
    pub mode: Mode,
    pub from_coord: Coord,
    pub to_coord: Coord,
    pub distance_km: f64,
    pub time_min: f64,
    pub co2e_kg: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polyline: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RouteKpis {
    pub delay_reduction_pct: f64,
    pub emissions_saved_pct: f64,
    pub cost_change_pct: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Route {
    pub distance_km: f64,
    pub time_min: f64,
    pub co2e_kg: f64,
    pub legs: Vec<RouteLeg>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kpis: Option<RouteKpis>,
}

// ---- Plans

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PlanCreate {
    pub shipment_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub objective: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modes: Option<Vec<Mode>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Plan {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub total_distance_km: f64,
    #[serde(default)]
    pub total_time_min: f64,
    #[serde(default)]
    pub total_co2e_kg: f64,
    #[serde(default)]
    pub delay_prob: Option<f64>,
    #[serde(default)]
    pub expected_delay_min: Option<f64>,
}

/// One point of the session-local delay trend. Never fetched, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DelayPoint {
    pub time: String,
    pub expected_delay_min: f64,
}
