// svckit/src/http.rs
//
// HTTP client adapter: fixed base URL, fixed timeout, single attempt.
// Every outbound call of the console goes through here.
//

use std::time::{Duration, Instant};

use reqwest::{RequestBuilder, StatusCode, Url};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error, warn};

use crate::config::ApiConfig;
use crate::errors::ApiError;
use crate::metrics::record_request;

#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    base_url: Url,
    timeout: Duration,
    dev_mode: bool,
}

impl HttpClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let base_url = config.resolve_base()?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ApiError::Config(format!("http client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            timeout: config.timeout(),
            dev_mode: config.dev_mode,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.url(path)?;
        self.send(path, self.client.get(url)).await
    }

    pub async fn get_with_query<T, Q>(&self, path: &str, query: &Q) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let url = self.url(path)?;
        self.send(path, self.client.get(url).query(query)).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path)?;
        self.send(path, self.client.post(url).json(body)).await
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::Config(format!("path '{}': {}", path, e)))
    }

    async fn send<T: DeserializeOwned>(&self, resource: &str, request: RequestBuilder) -> Result<T, ApiError> {
        let started = Instant::now();
        let result = self.execute(request).await;
        let elapsed = started.elapsed();
        record_request(resource, result.is_ok(), elapsed.as_secs_f64());

        match &result {
            Ok(_) => debug!("{} ok in {:?}", resource, elapsed),
            Err(e) => {
                warn!("{} failed after {:?}: {}", resource, elapsed, e);
                if self.dev_mode {
                    error!("[API ERROR] {}{}: {:?}", self.base_url, resource.trim_start_matches('/'), e);
                }
            }
        }

        result
    }

    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await.map_err(|e| self.classify(e))?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Http {
                status: status.as_u16(),
                message: error_detail(&body, status),
            });
        }

        response.json::<T>().await.map_err(|e| self.classify(e))
    }

    fn classify(&self, err: reqwest::Error) -> ApiError {
        match ApiError::from(err) {
            ApiError::Timeout(_) => ApiError::Timeout(self.timeout),
            other => other,
        }
    }
}

/// FastAPI-style `{"detail": "..."}` bodies carry the useful message.
fn error_detail(body: &str, status: StatusCode) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(str::to_string))
        .unwrap_or_else(|| status.canonical_reason().unwrap_or_default().to_string())
}
