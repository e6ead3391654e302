//! copilot-api — HTTP surface of the Copilot exporter.
//!
//! # Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/metrics` | Refresh (cache-gated) and return Prometheus exposition |
//! | GET | `/test_metrics` | Bump the request and `test` failure counters |
//! | GET | `/healthz` | Liveness |

pub mod handlers;
pub mod pipeline;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;

pub use pipeline::{BuildError, Exporter, ExporterConfig};

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub exporter: Arc<Exporter>,
}

/// Build the exporter router.
pub fn build_router(exporter: Arc<Exporter>) -> Router {
    let state = ApiState { exporter };

    Router::new()
        .route("/metrics", get(handlers::prometheus_metrics))
        .route("/test_metrics", get(handlers::test_metrics))
        .route("/healthz", get(handlers::health))
        .with_state(state)
}
