//! Unmatched routes and panicking handlers.

use std::any::Any;
use std::backtrace::Backtrace;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::error::{AppError, ErrorDoc};

/// Fallback for any path or method without a handler.
pub async fn not_found() -> AppError {
    AppError::RouteNotFound
}

/// Convert a caught handler panic into the 500 error document.
pub fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else {
        "handler panicked".to_string()
    };

    // Captured here, so this is the unwind site rather than the panic site
    let backtrace = Backtrace::force_capture();
    tracing::error!(panic = %message, %backtrace, "Handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorDoc::internal(message)),
    )
        .into_response()
}
