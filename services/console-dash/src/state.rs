// services/console-dash/src/state.rs
//
// Dashboard state owned by the orchestrator

use chrono::{DateTime, Local};

use svckit::types::{DelayPoint, EvaluationMetrics, Location, Mode, Plan, Route};

const MAX_LOG_ENTRIES: usize = 100;

#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    // Reference data
    pub locations: Vec<Location>,
    pub network_settled: bool,
    pub shipments_total: u64,
    pub shipment_ids: Vec<String>,
    pub evaluation: Option<EvaluationMetrics>,

    // Selection
    pub origin_id: Option<i64>,
    pub destination_id: Option<i64>,
    pub mode: Mode,

    // Route action
    pub route: Option<Route>,
    pub plan: Option<Plan>,
    pub computing: bool,

    // Session-local, append only
    pub delay_trend: Vec<DelayPoint>,

    pub errors: PanelErrors,

    // Activity log
    pub activity_log: Vec<LogEntry>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PanelErrors {
    pub network: Option<String>,
    pub shipments: Option<String>,
    pub metrics: Option<String>,
    pub route: Option<String>,
    pub plan: Option<String>,
}

impl PanelErrors {
    /// (panel, message) pairs for every panel currently in error.
    pub fn active(&self) -> Vec<(&'static str, String)> {
        [
            ("Network", &self.network),
            ("Shipments", &self.shipments),
            ("Metrics", &self.metrics),
            ("Route", &self.route),
            ("Plan", &self.plan),
        ]
        .into_iter()
        .filter_map(|(panel, msg)| msg.clone().map(|m| (panel, m)))
        .collect()
    }
}

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub level: String, // INFO, WARN, ERROR
    pub message: String,
}

impl DashboardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_log(&mut self, level: &str, message: &str) {
        self.activity_log.push(LogEntry {
            timestamp: Local::now(),
            level: level.to_string(),
            message: message.to_string(),
        });

        if self.activity_log.len() > MAX_LOG_ENTRIES {
            self.activity_log.remove(0);
        }
    }

    pub fn location(&self, id: Option<i64>) -> Option<&Location> {
        let id = id?;
        self.locations.iter().find(|l| l.id == id)
    }

    pub fn origin(&self) -> Option<&Location> {
        self.location(self.origin_id)
    }

    pub fn destination(&self) -> Option<&Location> {
        self.location(self.destination_id)
    }

    pub fn can_compute(&self) -> bool {
        self.origin().is_some() && self.destination().is_some() && !self.computing
    }

    /// Step through the location list; `None` stands for "nothing selected".
    pub fn next_location(&self, current: Option<i64>) -> Option<i64> {
        let ids: Vec<i64> = self.locations.iter().map(|l| l.id).collect();
        match current.and_then(|c| ids.iter().position(|id| *id == c)) {
            None => ids.first().copied(),
            Some(i) => ids.get(i + 1).copied(),
        }
    }

    pub fn next_mode(&self) -> Mode {
        let modes = Mode::SELECTABLE;
        let i = modes.iter().position(|m| *m == self.mode).unwrap_or(0);
        modes[(i + 1) % modes.len()]
    }
}
