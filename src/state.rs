//! Shared application state for request handlers.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::AppConfig;
use crate::probe::Probe;

/// Shared application state, cloneable across handlers via Arc-wrapped fields.
///
/// Everything here is fixed at startup. Handlers only read it.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub probe: Arc<dyn Probe>,
    started_at: Instant,
}

impl AppState {
    /// Creates the state, recording now as the process start instant.
    pub fn new(config: AppConfig, probe: impl Probe) -> Self {
        Self::with_start(config, Arc::new(probe), Instant::now())
    }

    pub fn with_start(config: AppConfig, probe: Arc<dyn Probe>, started_at: Instant) -> Self {
        Self {
            config: Arc::new(config),
            probe,
            started_at,
        }
    }

    /// Time elapsed since the recorded start instant.
    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    pub fn environment(&self) -> &str {
        &self.config.environment
    }
}
