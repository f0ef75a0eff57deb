//! HTTP API server for the canteen ordering system.
//!
//! Provides REST endpoints for order placement, lifecycle transitions,
//! assignment, payment evidence, and delivery-performance reads, with
//! structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use lifecycle::{InMemoryDispatcher, InMemoryUserDirectory, LifecycleEngine};
use metrics_exporter_prometheus::PrometheusHandle;
use order_store::OrderStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::orders::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: OrderStore + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::render))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/orders", post(routes::orders::place::<S>))
        .route("/orders", get(routes::orders::list::<S>))
        .route("/orders/{id}", get(routes::orders::get::<S>))
        .route("/orders/{id}/history", get(routes::orders::history::<S>))
        .route("/orders/{id}/transition", post(routes::orders::transition::<S>))
        .route("/orders/{id}/assign", post(routes::orders::assign::<S>))
        .route(
            "/orders/{id}/payment/proof",
            post(routes::orders::payment_proof::<S>),
        )
        .route(
            "/orders/{id}/payment/status",
            post(routes::orders::payment_status::<S>),
        )
        .route(
            "/staff/{id}/performance",
            get(routes::staff::performance::<S>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the default application state with in-memory collaborators.
///
/// The returned directory and dispatcher handles share state with the
/// engine, so callers can register users and observe notifications.
pub fn create_default_state<S: OrderStore + 'static>(
    store: S,
) -> (Arc<AppState<S>>, InMemoryUserDirectory, InMemoryDispatcher) {
    let directory = InMemoryUserDirectory::new();
    let dispatcher = InMemoryDispatcher::new();

    let engine = LifecycleEngine::new(
        store,
        Arc::new(directory.clone()),
        Arc::new(dispatcher.clone()),
    );

    (Arc::new(AppState { engine }), directory, dispatcher)
}
