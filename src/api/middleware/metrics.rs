//! Prometheus metrics for the card board.
//!
//! Every matched route is counted and timed by [`track_metrics`]; the
//! registry is owned by the application state so independent routers never
//! share counters.

use axum::{
    extract::{MatchedPath, Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use prometheus::{
    histogram_opts, opts, Encoder, HistogramVec, IntCounterVec, Registry, TextEncoder,
};
use std::{sync::Arc, time::Instant};

use crate::error::Result;

/// Routes whose series are exported from startup, before any traffic
const ROUTES: &[(&str, &str)] = &[
    ("GET", "/health"),
    ("GET", "/metrics"),
    ("GET", "/cards"),
    ("POST", "/cards"),
    ("GET", "/cards/:id"),
    ("DELETE", "/cards/:id/:token"),
    ("GET", "/verify/:token"),
];

pub struct Metrics {
    registry: Registry,
    requests_total: IntCounterVec,
    response_seconds: HistogramVec,
}

impl Metrics {
    pub fn new() -> std::result::Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let requests_total = IntCounterVec::new(
            opts!("card_requests_total", "Total requests by endpoint"),
            &["method", "endpoint"],
        )?;

        let response_seconds = HistogramVec::new(
            histogram_opts!(
                "card_response_seconds",
                "Response time in seconds by endpoint",
                vec![0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]
            ),
            &["endpoint"],
        )?;

        registry.register(Box::new(requests_total.clone()))?;
        registry.register(Box::new(response_seconds.clone()))?;

        for &(method, endpoint) in ROUTES {
            requests_total.with_label_values(&[method, endpoint]);
            response_seconds.with_label_values(&[endpoint]);
        }

        Ok(Self {
            registry,
            requests_total,
            response_seconds,
        })
    }

    pub fn observe(&self, method: &str, endpoint: &str, elapsed_secs: f64) {
        self.requests_total
            .with_label_values(&[method, endpoint])
            .inc();
        self.response_seconds
            .with_label_values(&[endpoint])
            .observe(elapsed_secs);
    }

    /// Encodes the registry in the Prometheus text format
    pub fn encode(&self) -> std::result::Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

/// Records count and latency for the matched route
pub async fn track_metrics(
    State(metrics): State<Arc<Metrics>>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;

    metrics.observe(&method, &endpoint, start.elapsed().as_secs_f64());

    tracing::debug!(
        method = %method,
        endpoint = %endpoint,
        status = response.status().as_u16(),
        "Request recorded"
    );

    response
}

/// `GET /metrics`
pub async fn render(State(metrics): State<Arc<Metrics>>) -> Result<Response> {
    let body = metrics.encode()?;

    Ok(([(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)], body).into_response())
}
