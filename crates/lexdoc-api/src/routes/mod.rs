//! # Route Modules
//!
//! One module per lifecycle area. Each exposes `router()`; [`crate::app`]
//! merges them under the authenticated stack.

pub mod documents;
pub mod locks;
pub mod signatures;
pub mod versions;
pub mod workflows;

use axum::Router;

use crate::state::AppState;

/// All `/v1` routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(documents::router())
        .merge(versions::router())
        .merge(locks::router())
        .merge(workflows::router())
        .merge(signatures::router())
}
