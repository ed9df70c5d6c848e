//! Root greeting.

use axum::{extract::State, Json};
use serde::Serialize;
use tracing::instrument;

use super::timestamp;
use crate::state::AppState;

pub const WELCOME_MESSAGE: &str = "Healthcheck server is running!";

#[derive(Debug, Serialize)]
pub struct RootDoc {
    pub message: &'static str,
    pub timestamp: String,
    /// Seconds since process start
    pub uptime: f64,
    pub environment: String,
}

/// `GET /`
#[instrument(name = "home::index", skip(state))]
pub async fn index(State(state): State<AppState>) -> Json<RootDoc> {
    Json(RootDoc {
        message: WELCOME_MESSAGE,
        timestamp: timestamp(),
        uptime: state.uptime().as_secs_f64(),
        environment: state.environment().to_string(),
    })
}
