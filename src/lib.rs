//! vitals: process and host diagnostics over HTTP.
//!
//! Serves three read-only JSON endpoints: a greeting at `/`, process health at
//! `/health` and a host dump at `/system`. Everything is read fresh from the OS
//! on each request.

pub mod config;
pub mod error;
pub mod http;
pub mod middleware;
pub mod probe;
pub mod routes;
pub mod state;

pub use config::AppConfig;
pub use error::{AppError, ErrorDoc};
pub use routes::create_router;
pub use state::AppState;
