use lazy_static::lazy_static;
use prometheus::{register_histogram_vec, register_int_counter_vec, HistogramVec, IntCounterVec};

lazy_static! {
    pub static ref API_REQUEST_DURATION: HistogramVec = register_histogram_vec!(
        "api_request_duration_seconds",
        "REST request duration in seconds",
        &["resource", "status"]
    ).unwrap();

    pub static ref API_REQUEST_COUNTER: IntCounterVec = register_int_counter_vec!(
        "api_requests_total",
        "Total number of REST requests",
        &["resource", "status"]
    ).unwrap();
}

pub fn record_request(resource: &str, success: bool, duration: f64) {
    let status = if success { "success" } else { "failure" };
    API_REQUEST_DURATION
        .with_label_values(&[resource, status])
        .observe(duration);
    API_REQUEST_COUNTER
        .with_label_values(&[resource, status])
        .inc();
}
