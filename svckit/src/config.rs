use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::ApiError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base path of the REST surface. Relative values are resolved against `origin`.
    pub base_url: String,
    pub origin: String,
    pub timeout_secs: u64,
    pub dev_mode: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "/api/v1".to_string(),
            origin: "http://localhost:8000".to_string(),
            timeout_secs: 15,
            dev_mode: false,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Absolute base URL, always ending in `/` so resource paths join underneath it.
    pub fn resolve_base(&self) -> Result<Url, ApiError> {
        let raw = self.base_url.trim();
        let mut url = match Url::parse(raw) {
            Ok(url) => url,
            Err(_) => {
                let origin = Url::parse(self.origin.trim())
                    .map_err(|e| ApiError::Config(format!("origin '{}': {}", self.origin, e)))?;
                origin
                    .join(raw)
                    .map_err(|e| ApiError::Config(format!("base_url '{}': {}", raw, e)))?
            }
        };

        if url.cannot_be_a_base() {
            return Err(ApiError::Config(format!("base_url '{}' cannot be a base", raw)));
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub poll_secs: u64,
    pub limit: u32,
    pub cap: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            poll_secs: 60,
            limit: 50,
            cap: 50,
        }
    }
}

impl FeedConfig {
    pub fn period(&self) -> Duration {
        Duration::from_secs(self.poll_secs.max(1))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub log_level: String,
    pub log_file: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_file: "console-dash.log".to_string(),
        }
    }
}
