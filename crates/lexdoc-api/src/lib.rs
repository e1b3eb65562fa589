//! # lexdoc-api: HTTP Service
//!
//! Axum front end for the document lifecycle core. Handlers parse and
//! validate requests, resolve the calling [`Actor`](lexdoc_lifecycle::Actor)
//! and delegate to [`Lifecycle`](lexdoc_lifecycle::Lifecycle); no lifecycle
//! rule lives here.
//!
//! ## Routes
//!
//! - `/v1/documents/*`: documents, versions, locks, signatures
//! - `/v1/versions/*`: version lookup, restore, archive, compare
//! - `/v1/workflows/*`: approval workflows
//! - `/v1/signers/{id}/public-key`
//! - `/openapi.json`
//! - `/health/*`, `/metrics`: unauthenticated
//!
//! ## Middleware Stack (Tower)
//!
//! Extension(AuthConfig) → TraceLayer → AuthLayer → MetricsLayer (per route)
//!
//! Every lifecycle error maps to a structured body through [`AppError`].

pub mod auth;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod scheduler;
pub mod state;

use axum::middleware::from_fn;
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::auth::AuthConfig;

pub use error::AppError;
pub use state::{AppConfig, AppState};

/// Assemble the application router.
///
/// Health probes and `/metrics` sit outside the auth middleware.
pub fn app(state: AppState) -> Router {
    let auth_config = AuthConfig {
        token: state.config.auth_token.clone(),
    };
    let metrics_handle = state.metrics.clone();

    let api = Router::new()
        .merge(routes::router())
        .merge(openapi::router())
        .route_layer(from_fn(middleware::metrics::metrics_middleware))
        .layer(from_fn(auth::auth_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(axum::Extension(auth_config))
        .with_state(state);

    let mut public = Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness));
    if let Some(handle) = metrics_handle {
        public = public.route(
            "/metrics",
            get(move || {
                let handle = handle.clone();
                async move { handle.render() }
            }),
        );
    }

    Router::new().merge(public).merge(api)
}

/// Always 200 while the process runs.
async fn liveness() -> &'static str {
    "ok"
}

async fn readiness() -> &'static str {
    "ready"
}
