// services/console-dash/src/dashboard.rs
//
// Dashboard orchestrator: loads reference data, owns the selection and the
// compute-route action, and republishes the derived view whenever any of
// its sources change.
//

use std::sync::{Arc, Weak};

use chrono::Local;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use svckit::errors::ApiError;
use svckit::types::{DelayPoint, EvaluationMetrics, LocationList, Mode, Objective, PlanCreate, RoutingRequest, ShipmentList};
use svckit::LogisticsApi;

use crate::events::EventsFeed;
use crate::format;
use crate::state::DashboardState;
use crate::view::DashboardView;

pub type Clock = Arc<dyn Fn() -> String + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComputeOutcome {
    /// Nothing issued: selection incomplete or a computation already running.
    Skipped,
    RouteFailed,
    /// Route is displayed; delay metrics are missing.
    PlanFailed,
    Completed,
}

struct Shared {
    api: Arc<dyn LogisticsApi>,
    events: EventsFeed,
    state: Mutex<DashboardState>,
    view: watch::Sender<DashboardView>,
    clock: Clock,
    subscription: Mutex<Option<JoinHandle<()>>>,
}

#[derive(Clone)]
pub struct Dashboard {
    shared: Arc<Shared>,
}

impl Dashboard {
    pub fn new(api: Arc<dyn LogisticsApi>, events: EventsFeed) -> Self {
        Self::with_clock(api, events, Arc::new(|| format::clock_label(Local::now())))
    }

    pub fn with_clock(api: Arc<dyn LogisticsApi>, events: EventsFeed, clock: Clock) -> Self {
        let (view, _) = watch::channel(DashboardView::default());
        Self {
            shared: Arc::new(Shared {
                api,
                events,
                state: Mutex::new(DashboardState::new()),
                view,
                clock,
                subscription: Mutex::new(None),
            }),
        }
    }

    /// Start the events feed and load reference data. Each dataset settles
    /// on its own; a failure in one leaves the others untouched.
    pub async fn mount(&self) {
        self.update(|state| state.add_log("INFO", &format!("Connecting to {}", self.shared.api.name())));
        self.follow_events();
        self.shared.events.start();

        let api = self.shared.api.clone();
        tokio::join!(
            async {
                let result = api.locations().await;
                self.apply_locations(result);
            },
            async {
                let result = api.shipments().await;
                self.apply_shipments(result);
            },
            async {
                let result = api.evaluation_metrics().await;
                self.apply_metrics(result);
            },
        );
    }

    /// Stop polling and detach from the events feed.
    pub fn unmount(&self) {
        self.shared.events.stop();
        if let Some(task) = self.shared.subscription.lock().take() {
            task.abort();
        }
        info!("Dashboard unmounted");
    }

    pub fn subscribe(&self) -> watch::Receiver<DashboardView> {
        self.shared.view.subscribe()
    }

    pub fn view(&self) -> DashboardView {
        self.shared.view.borrow().clone()
    }

    pub fn events(&self) -> &EventsFeed {
        &self.shared.events
    }

    pub fn select_origin(&self, id: Option<i64>) {
        self.update(|state| state.origin_id = id);
    }

    pub fn select_destination(&self, id: Option<i64>) {
        self.update(|state| state.destination_id = id);
    }

    pub fn select_mode(&self, mode: Mode) {
        self.update(|state| state.mode = mode);
    }

    pub fn cycle_origin(&self) {
        self.update(|state| state.origin_id = state.next_location(state.origin_id));
    }

    pub fn cycle_destination(&self) {
        self.update(|state| state.destination_id = state.next_location(state.destination_id));
    }

    pub fn cycle_mode(&self) {
        self.update(|state| state.mode = state.next_mode());
    }

    pub fn can_compute(&self) -> bool {
        self.shared.state.lock().can_compute()
    }

    /// Route request, then the dependent plan request. Each step keeps
    /// whatever the previous one produced; nothing is rolled back.
    pub async fn compute_route(&self) -> ComputeOutcome {
        let Some((request, shipment_ids)) = self.begin_compute() else {
            return ComputeOutcome::Skipped;
        };
        let mode = request.modes.first().copied().unwrap_or_default();

        let route = match self.shared.api.compute_route(&request).await {
            Ok(route) => route,
            Err(e) => {
                warn!("Route computation failed: {}", e);
                self.update(|state| {
                    state.computing = false;
                    state.errors.route = Some(e.user_message());
                    state.add_log("ERROR", &format!("Route computation failed: {}", e));
                });
                return ComputeOutcome::RouteFailed;
            }
        };

        info!(
            "Route computed: {:.2} km, {:.0} min, {:.2} kg CO2e",
            route.distance_km, route.time_min, route.co2e_kg
        );
        self.update(|state| {
            state.add_log(
                "INFO",
                &format!("Route computed: {} legs, {}", route.legs.len(), format::km(Some(route.distance_km))),
            );
            state.route = Some(route);
            state.plan = None;
            state.errors.route = None;
        });

        let plan_request = PlanCreate {
            shipment_ids,
            objective: None,
            modes: Some(vec![mode]),
        };

        match self.shared.api.create_plan(&plan_request).await {
            Ok(plan) => {
                let label = (self.shared.clock)();
                self.update(|state| {
                    state.computing = false;
                    state.errors.plan = None;
                    match plan.expected_delay_min {
                        Some(minutes) => {
                            state.delay_trend.push(DelayPoint {
                                time: label,
                                expected_delay_min: minutes,
                            });
                            state.add_log("INFO", &format!("Plan {} predicts {} min delay", plan.id, minutes));
                        }
                        None => state.add_log("WARN", &format!("Plan {} carries no delay prediction", plan.id)),
                    }
                    state.plan = Some(plan);
                });
                ComputeOutcome::Completed
            }
            Err(e) => {
                warn!("Plan creation failed: {}", e);
                self.update(|state| {
                    state.computing = false;
                    state.errors.plan = Some(e.user_message());
                    state.add_log("ERROR", &format!("Plan creation failed: {}", e));
                });
                ComputeOutcome::PlanFailed
            }
        }
    }

    fn begin_compute(&self) -> Option<(RoutingRequest, Vec<String>)> {
        let mut state = self.shared.state.lock();
        if !state.can_compute() {
            return None;
        }
        let (origin, destination) = (state.origin()?.clone(), state.destination()?.clone());

        let request = RoutingRequest {
            origins: vec![origin.coord()],
            destinations: vec![destination.coord()],
            modes: vec![state.mode],
            objective: Some(Objective::default()),
            constraints: None,
        };
        let shipment_ids = if state.shipment_ids.is_empty() {
            vec![format!("route-{}-{}", origin.id, destination.id)]
        } else {
            state.shipment_ids.clone()
        };

        let message = format!("Computing {} route {} -> {}", state.mode, origin.name, destination.name);
        state.computing = true;
        state.add_log("INFO", &message);
        self.publish(&state);
        Some((request, shipment_ids))
    }

    fn apply_locations(&self, result: Result<LocationList, ApiError>) {
        self.update(|state| {
            state.network_settled = true;
            match result {
                Ok(list) => {
                    info!("Loaded {} locations", list.data.len());
                    state.add_log("INFO", &format!("Loaded {} locations", list.data.len()));
                    state.locations = list.data;
                    state.errors.network = None;
                }
                Err(e) => {
                    warn!("Failed to load locations: {}", e);
                    state.add_log("ERROR", &format!("Failed to load locations: {}", e));
                    state.errors.network = Some(e.user_message());
                }
            }
        });
    }

    fn apply_shipments(&self, result: Result<ShipmentList, ApiError>) {
        self.update(|state| match result {
            Ok(list) => {
                info!("Shipments total: {}", list.total);
                state.shipments_total = list.total;
                state.shipment_ids = list.data.into_iter().map(|s| s.id).collect();
                state.errors.shipments = None;
            }
            Err(e) => {
                warn!("Failed to load shipments: {}", e);
                state.add_log("ERROR", &format!("Failed to load shipments: {}", e));
                state.errors.shipments = Some(e.user_message());
            }
        });
    }

    fn apply_metrics(&self, result: Result<EvaluationMetrics, ApiError>) {
        self.update(|state| match result {
            Ok(metrics) => {
                state.evaluation = Some(metrics);
                state.errors.metrics = None;
            }
            Err(e) => {
                warn!("Failed to load evaluation metrics: {}", e);
                state.add_log("WARN", &format!("Evaluation metrics unavailable: {}", e));
                state.errors.metrics = Some(e.user_message());
            }
        });
    }

    /// Republish the view every time the events feed publishes.
    fn follow_events(&self) {
        let mut rx = self.shared.events.subscribe();
        let weak: Weak<Shared> = Arc::downgrade(&self.shared);
        let task = tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let Some(shared) = weak.upgrade() else {
                    break;
                };
                let state = shared.state.lock();
                shared.publish(&state);
            }
        });

        if let Some(previous) = self.shared.subscription.lock().replace(task) {
            previous.abort();
        }
    }

    fn update(&self, f: impl FnOnce(&mut DashboardState)) {
        let mut state = self.shared.state.lock();
        f(&mut state);
        self.shared.publish(&state);
    }

    fn publish(&self, state: &DashboardState) {
        self.shared.publish(state);
    }
}

impl Shared {
    fn publish(&self, state: &DashboardState) {
        let view = DashboardView::derive(state, &self.events.snapshot(), &self.events.query());
        self.view.send_replace(view);
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        if let Some(task) = self.subscription.get_mut().take() {
            task.abort();
        }
    }
}
