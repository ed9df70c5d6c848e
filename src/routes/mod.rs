//! HTTP route handlers for the diagnostic endpoints.
//!
//! Three read-only JSON routes (`/`, `/health`, `/system`) plus a fallback that
//! answers every other path or method with a 404 listing the available routes.
//!
//! Every response passes through the same stack: a request-id span outermost,
//! then `Cache-Control: no-store`, then a panic boundary that turns a panicking
//! handler into the 500 error document instead of dropping the connection.

pub mod fallback;
pub mod health;
pub mod home;
pub mod system;

use axum::{middleware, routing::get, Router};
use chrono::{SecondsFormat, Utc};
use http::header::{HeaderValue, CACHE_CONTROL};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::config::CACHE_CONTROL_NO_STORE;
use crate::middleware::request_id_layer;
use crate::state::AppState;

/// Current wall-clock time as ISO-8601 UTC with millisecond precision,
/// e.g. `2024-05-01T12:00:00.000Z`.
pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Creates the Axum router with all routes and response layers.
pub fn create_router(state: AppState) -> Router {
    // Non-GET methods on known paths get the same 404 as unknown paths
    Router::new()
        .route("/", get(home::index).fallback(fallback::not_found))
        .route("/health", get(health::health).fallback(fallback::not_found))
        .route("/system", get(system::system).fallback(fallback::not_found))
        .fallback(fallback::not_found)
        .with_state(state)
        .layer(CatchPanicLayer::custom(fallback::handle_panic))
        .layer(SetResponseHeaderLayer::overriding(
            CACHE_CONTROL,
            HeaderValue::from_static(CACHE_CONTROL_NO_STORE),
        ))
        // Request ID middleware - creates root span with request_id for correlation
        .layer(middleware::from_fn(request_id_layer))
}
