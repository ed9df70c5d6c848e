//! Health check endpoint for container orchestration.
//!
//! Returns 200 with process memory and host vitals whenever the process can
//! answer HTTP. Used by Kubernetes, ECS, systemd and load balancers as a
//! liveness probe. A metric read failure turns into a 500 error document.

use std::time::Duration;

use axum::{extract::State, Json};
use serde::Serialize;
use tracing::instrument;

use super::timestamp;
use crate::error::AppError;
use crate::probe::{bytes_to_megabytes, HostSummary, ProcessMemory};
use crate::state::AppState;

pub const STATUS_OK: &str = "OK";

#[derive(Debug, Serialize)]
pub struct HealthDoc {
    pub status: &'static str,
    pub timestamp: String,
    /// Seconds since process start
    pub uptime: f64,
    pub memory: MemoryDoc,
    pub system: SystemSummaryDoc,
    pub environment: String,
}

/// Process memory in whole megabytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MemoryDoc {
    pub used: u64,
    pub total: u64,
    pub external: u64,
}

impl From<ProcessMemory> for MemoryDoc {
    fn from(memory: ProcessMemory) -> Self {
        Self {
            used: bytes_to_megabytes(memory.heap_used),
            total: bytes_to_megabytes(memory.heap_total),
            external: bytes_to_megabytes(memory.external),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemSummaryDoc {
    pub platform: String,
    pub arch: String,
    pub cpus: usize,
    pub hostname: String,
    pub load_average: [f64; 3],
}

impl From<HostSummary> for SystemSummaryDoc {
    fn from(host: HostSummary) -> Self {
        Self {
            platform: host.platform,
            arch: host.arch,
            cpus: host.cpu_count,
            hostname: host.hostname,
            load_average: host.load_average.to_array(),
        }
    }
}

impl HealthDoc {
    pub fn new(
        memory: ProcessMemory,
        host: HostSummary,
        uptime: Duration,
        environment: &str,
    ) -> Self {
        Self {
            status: STATUS_OK,
            timestamp: timestamp(),
            uptime: uptime.as_secs_f64(),
            memory: memory.into(),
            system: host.into(),
            environment: environment.to_string(),
        }
    }
}

/// `GET /health`
#[instrument(name = "health::health", skip(state))]
pub async fn health(State(state): State<AppState>) -> Result<Json<HealthDoc>, AppError> {
    let memory = state.probe.process_memory()?;
    let host = state.probe.host_summary()?;

    Ok(Json(HealthDoc::new(
        memory,
        host,
        state.uptime(),
        state.environment(),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::LoadAverage;

    fn summary() -> HostSummary {
        HostSummary {
            platform: "linux".to_string(),
            arch: "x86_64".to_string(),
            hostname: "probe-host".to_string(),
            cpu_count: 4,
            load_average: LoadAverage {
                one: 0.25,
                five: 0.5,
                fifteen: 0.75,
            },
        }
    }

    #[test]
    fn test_memory_doc_floors_to_megabytes() {
        let doc = MemoryDoc::from(ProcessMemory {
            heap_used: 2_097_152,
            heap_total: 3_145_727,
            external: 1_048_575,
        });
        assert_eq!(
            doc,
            MemoryDoc {
                used: 2,
                total: 2,
                external: 0
            }
        );
    }

    #[test]
    fn test_memory_serializes_as_integers() {
        let doc = MemoryDoc::from(ProcessMemory {
            heap_used: 2_097_152,
            heap_total: 4_194_304,
            external: 0,
        });
        let json = serde_json::to_string(&doc).unwrap();
        assert_eq!(json, r#"{"used":2,"total":4,"external":0}"#);
    }

    #[test]
    fn test_health_doc_shape() {
        let memory = ProcessMemory {
            heap_used: 0,
            heap_total: 0,
            external: 0,
        };
        let doc = HealthDoc::new(memory, summary(), Duration::from_millis(1500), "staging");
        let value = serde_json::to_value(&doc).unwrap();

        assert_eq!(value["status"], "OK");
        assert_eq!(value["uptime"], 1.5);
        assert_eq!(value["environment"], "staging");
        assert_eq!(value["system"]["cpus"], 4);
        assert_eq!(value["system"]["hostname"], "probe-host");
        assert_eq!(
            value["system"]["loadAverage"],
            serde_json::json!([0.25, 0.5, 0.75])
        );
    }
}
