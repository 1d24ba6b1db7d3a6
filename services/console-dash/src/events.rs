// services/console-dash/src/events.rs
//
// Events feed: a polling feed over GET /events plus its row rendering.
//

use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use svckit::config::FeedConfig;
use svckit::types::{Event, EventType, EventsQuery, Severity};
use svckit::LogisticsApi;

use crate::feed::{FeedSnapshot, PollingFeed};
use crate::format;

pub const EMPTY_EVENTS_MESSAGE: &str = "No recent events.";

const PREVIEW_KEYS: [&str; 7] = [
    "location_name",
    "temperature_c",
    "precipitation_mm",
    "wind_speed_mps",
    "congestion_index",
    "avg_speed_kph",
    "note",
];

#[derive(Clone)]
pub struct EventsFeed {
    feed: PollingFeed<EventsQuery, Event>,
}

impl EventsFeed {
    pub fn new(api: Arc<dyn LogisticsApi>, config: &FeedConfig) -> Self {
        let query = EventsQuery {
            limit: Some(config.limit),
            ..Default::default()
        };
        let feed = PollingFeed::new("events", query, config.period(), config.cap, move |q: EventsQuery| {
            let api = api.clone();
            async move { api.events(&q).await }
        });
        Self { feed }
    }

    pub fn start(&self) {
        self.feed.start();
    }

    pub fn stop(&self) {
        self.feed.stop();
    }

    pub fn refresh(&self) -> Option<JoinHandle<()>> {
        self.feed.refresh()
    }

    pub fn subscribe(&self) -> watch::Receiver<FeedSnapshot<Event>> {
        self.feed.subscribe()
    }

    pub fn snapshot(&self) -> FeedSnapshot<Event> {
        self.feed.snapshot()
    }

    pub fn query(&self) -> EventsQuery {
        self.feed.query()
    }

    pub fn set_query(&self, query: EventsQuery) {
        self.feed.set_query(query);
    }

    /// all -> traffic -> weather -> fuel_price -> breakdown -> all
    pub fn cycle_type_filter(&self) {
        let mut query = self.query();
        query.kind = cycle(&EventType::ALL, query.kind);
        self.set_query(query);
    }

    /// all -> low -> moderate -> high -> all
    pub fn cycle_severity_filter(&self) {
        let mut query = self.query();
        query.severity = cycle(&Severity::ALL, query.severity);
        self.set_query(query);
    }
}

fn cycle<T: Copy + PartialEq>(all: &[T], current: Option<T>) -> Option<T> {
    match current {
        None => all.first().copied(),
        Some(c) => all
            .iter()
            .position(|v| *v == c)
            .and_then(|i| all.get(i + 1))
            .copied(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventRow {
    pub id: i64,
    pub header: String,
    pub preview: String,
    pub severity: Option<Severity>,
    pub when: String,
}

impl EventRow {
    pub fn from_event(event: &Event) -> Self {
        let header = match &event.source {
            Some(source) => format!("{} · {}", event.kind, source),
            None => event.kind.to_string(),
        };
        Self {
            id: event.id,
            header,
            preview: preview_payload(&event.payload),
            severity: event.severity,
            when: format::dt(Some(&event.ts)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventsBody {
    Empty,
    List(Vec<EventRow>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventsView {
    pub body: EventsBody,
    pub error: Option<String>,
    pub loading: bool,
    pub filter: String,
}

impl EventsView {
    pub fn from_snapshot(snapshot: &FeedSnapshot<Event>, query: &EventsQuery) -> Self {
        let body = if snapshot.data.is_empty() {
            EventsBody::Empty
        } else {
            EventsBody::List(snapshot.data.iter().map(EventRow::from_event).collect())
        };
        Self {
            body,
            error: snapshot.error.clone(),
            loading: snapshot.is_loading(),
            filter: filter_label(query),
        }
    }
}

impl Default for EventsView {
    fn default() -> Self {
        Self {
            body: EventsBody::Empty,
            error: None,
            loading: false,
            filter: filter_label(&EventsQuery::default()),
        }
    }
}

pub fn filter_label(query: &EventsQuery) -> String {
    let kind = query.kind.map_or("all", |k| k.as_str());
    let severity = query.severity.map_or("any", |s| s.as_str());
    format!("type: {} | severity: {}", kind, severity)
}

pub fn preview_payload(payload: &Map<String, Value>) -> String {
    let parts: Vec<String> = PREVIEW_KEYS
        .iter()
        .filter_map(|key| payload.get(*key).map(|v| format!("{}: {}", key, scalar(v))))
        .collect();

    if parts.is_empty() {
        serde_json::to_string(payload).unwrap_or_default()
    } else {
        parts.join(" · ")
    }
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
