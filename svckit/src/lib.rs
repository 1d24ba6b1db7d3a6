// svckit/src/lib.rs
//
// Shared kit for the OmniRoute console: configuration, wire types,
// the REST client adapter and its typed resource accessors.
//

pub mod config;
pub mod errors;
pub mod http;
pub mod metrics;
pub mod resources;
pub mod types;

pub use config::{ApiConfig, FeedConfig, ObservabilityConfig};
pub use errors::ApiError;
pub use http::HttpClient;
pub use resources::LogisticsApi;
