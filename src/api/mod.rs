// API module - HTTP endpoints

pub mod cards;
pub mod health;
pub mod middleware;
pub mod verification;

use axum::{
    body::Body,
    extract::FromRef,
    http::Request,
    middleware::from_fn_with_state,
    routing::get,
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::store::CardStore;
use self::middleware::metrics::{self, Metrics};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub store: CardStore,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(store: CardStore) -> Result<Self, prometheus::Error> {
        Ok(Self {
            store,
            metrics: Arc::new(Metrics::new()?),
        })
    }
}

impl FromRef<AppState> for CardStore {
    fn from_ref(state: &AppState) -> CardStore {
        state.store.clone()
    }
}

impl FromRef<AppState> for Arc<Metrics> {
    fn from_ref(state: &AppState) -> Arc<Metrics> {
        state.metrics.clone()
    }
}

/// Builds the full application router with metrics, request ids and tracing
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/metrics", get(metrics::render))
        .merge(cards::router())
        .merge(verification::router())
        .route_layer(from_fn_with_state(
            state.metrics.clone(),
            metrics::track_metrics,
        ))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(|request: &Request<Body>| {
                            let request_id = request
                                .headers()
                                .get("x-request-id")
                                .and_then(|value| value.to_str().ok())
                                .unwrap_or("-");

                            tracing::info_span!(
                                "request",
                                method = %request.method(),
                                uri = %request.uri(),
                                request_id = %request_id,
                            )
                        })
                        .on_response(DefaultOnResponse::new().level(Level::INFO)),
                )
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
        .with_state(state)
}
