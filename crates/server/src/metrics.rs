//! Per-endpoint request counters and the middleware that feeds them.

use std::collections::BTreeMap;
use std::time::Instant;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use parking_lot::Mutex;
use serde::Serialize;
use tracing::info;

use crate::api::AppState;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct EndpointStats {
    pub count: u64,
    /// Milliseconds
    pub total_latency: f64,
    pub avg_latency: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MetricsReport {
    pub endpoints: BTreeMap<String, EndpointStats>,
}

/// In-process request metrics keyed by request path
#[derive(Debug, Default)]
pub struct Metrics {
    endpoints: Mutex<BTreeMap<String, EndpointStats>>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, path: &str, latency_ms: f64) {
        let mut endpoints = self.endpoints.lock();
        let stats = endpoints.entry(path.to_string()).or_default();
        stats.count += 1;
        stats.total_latency += latency_ms;
        stats.avg_latency = stats.total_latency / stats.count as f64;
    }

    pub fn report(&self) -> MetricsReport {
        MetricsReport {
            endpoints: self.endpoints.lock().clone(),
        }
    }
}

/// Time every request, log it and record it under its path.
pub async fn track_metrics(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    state.metrics.record(&path, latency_ms);
    info!(
        "{} {} -> status={} latency={:.2}ms",
        method,
        path,
        response.status().as_u16(),
        latency_ms
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_accumulates_per_path() {
        let metrics = Metrics::new();
        metrics.record("/recommend", 10.0);
        metrics.record("/recommend", 30.0);
        metrics.record("/health", 1.0);

        let report = metrics.report();
        let recommend = report.endpoints["/recommend"];
        assert_eq!(recommend.count, 2);
        assert_eq!(recommend.total_latency, 40.0);
        assert_eq!(recommend.avg_latency, 20.0);
        assert_eq!(report.endpoints["/health"].count, 1);
    }

    #[test]
    fn test_empty_report_serializes() {
        let json = serde_json::to_value(Metrics::new().report()).unwrap();
        assert_eq!(json, serde_json::json!({ "endpoints": {} }));
    }
}
