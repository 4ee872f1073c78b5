//! mxs-api — HTTP surface of the MaxScale exporter.
//!
//! # Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/metrics` | Prometheus exposition, one upstream round-trip per request |
//! | GET | `/healthz` | Liveness, never touches the upstream |

pub mod handlers;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use mxs_metrics::Registry;

/// Shared state for handlers.
#[derive(Clone)]
pub struct ApiState {
    pub registry: Arc<Registry>,
}

/// Build the exporter router.
pub fn build_router(registry: Arc<Registry>) -> Router {
    let state = ApiState { registry };

    Router::new()
        .route("/metrics", get(handlers::prometheus_metrics))
        .route("/healthz", get(handlers::healthz))
        .with_state(state)
}
