// svckit/src/resources.rs
//
// Typed accessors for the REST resources the console reads and writes.
// No validation, transformation or caching happens here.
//

use async_trait::async_trait;

use crate::errors::ApiError;
use crate::http::HttpClient;
use crate::types::{
    EvaluationMetrics, Event, EventsQuery, LocationList, Plan, PlanCreate, Route, RoutingRequest,
    ShipmentList,
};

pub const LOCATIONS_PATH: &str = "/network/locations";
pub const SHIPMENTS_PATH: &str = "/shipments";
pub const EVENTS_PATH: &str = "/events";
pub const EVALUATION_PATH: &str = "/metrics/evaluation";
pub const ROUTING_PATH: &str = "/routing/multimodal";
pub const PLANS_PATH: &str = "/plans";

#[async_trait]
pub trait LogisticsApi: Send + Sync {
    async fn locations(&self) -> Result<LocationList, ApiError>;

    async fn shipments(&self) -> Result<ShipmentList, ApiError>;

    async fn events(&self, query: &EventsQuery) -> Result<Vec<Event>, ApiError>;

    async fn evaluation_metrics(&self) -> Result<EvaluationMetrics, ApiError>;

    async fn compute_route(&self, request: &RoutingRequest) -> Result<Route, ApiError>;

    async fn create_plan(&self, request: &PlanCreate) -> Result<Plan, ApiError>;

    fn name(&self) -> &str;
}

#[async_trait]
impl LogisticsApi for HttpClient {
    async fn locations(&self) -> Result<LocationList, ApiError> {
        self.get(LOCATIONS_PATH).await
    }

    async fn shipments(&self) -> Result<ShipmentList, ApiError> {
        self.get(SHIPMENTS_PATH).await
    }

    async fn events(&self, query: &EventsQuery) -> Result<Vec<Event>, ApiError> {
        self.get_with_query(EVENTS_PATH, query).await
    }

    async fn evaluation_metrics(&self) -> Result<EvaluationMetrics, ApiError> {
        self.get(EVALUATION_PATH).await
    }

    async fn compute_route(&self, request: &RoutingRequest) -> Result<Route, ApiError> {
        self.post(ROUTING_PATH, request).await
    }

    async fn create_plan(&self, request: &PlanCreate) -> Result<Plan, ApiError> {
        self.post(PLANS_PATH, request).await
    }

    fn name(&self) -> &str {
        self.base_url().as_str()
    }
}
