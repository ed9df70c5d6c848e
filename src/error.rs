//! Request-time errors and the JSON error document.
//!
//! Handlers return `Result<_, AppError>`. Conversion into a response is the
//! single place where failures turn into status codes: the full error chain is
//! logged, the client only sees the top-level message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::probe::ProbeError;

/// Routes advertised in the 404 body, in this order.
pub const AVAILABLE_ROUTES: [&str; 3] = ["/", "/health", "/system"];

pub const NOT_FOUND_ERROR: &str = "Route not found";
pub const INTERNAL_ERROR: &str = "Internal server error";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Route not found")]
    RouteNotFound,

    #[error(transparent)]
    Probe(#[from] ProbeError),
}

/// Body of every non-2xx response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDoc {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_routes: Option<Vec<String>>,
}

impl ErrorDoc {
    pub fn not_found() -> Self {
        Self {
            error: NOT_FOUND_ERROR.to_string(),
            message: None,
            available_routes: Some(AVAILABLE_ROUTES.iter().map(|r| r.to_string()).collect()),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            error: INTERNAL_ERROR.to_string(),
            message: Some(message.into()),
            available_routes: None,
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::RouteNotFound => StatusCode::NOT_FOUND,
            AppError::Probe(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            AppError::RouteNotFound => ErrorDoc::not_found(),
            AppError::Probe(_) => {
                tracing::error!(error = ?self, "Internal error: {}", self);
                ErrorDoc::internal(self.to_string())
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_doc_shape() {
        let value = serde_json::to_value(ErrorDoc::not_found()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "error": "Route not found",
                "availableRoutes": ["/", "/health", "/system"],
            })
        );
    }

    #[test]
    fn test_internal_doc_shape() {
        let value = serde_json::to_value(ErrorDoc::internal("boom")).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "error": "Internal server error",
                "message": "boom",
            })
        );
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::RouteNotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::from(ProbeError::InvalidPrefix {
                interface: "eth0".to_string(),
                prefix: 40,
            })
            .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::from(ProbeError::ProcessNotFound(7)).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_metric_error_message_passes_through() {
        let err = AppError::from(ProbeError::ProcessNotFound(42));
        assert_eq!(err.to_string(), "process 42 is not visible to the host");
    }
}
