//! Detailed host and runtime information.

use std::collections::BTreeMap;

use axum::{extract::State, Json};
use serde::Serialize;
use tracing::instrument;

use crate::error::AppError;
use crate::probe::{bytes_to_gigabytes, CpuInfo, HostDetails, NetworkAddress};
use crate::state::AppState;

/// Version of the compiler that built this binary, captured by the build script.
pub const RUNTIME_VERSION: &str = env!("VITALS_RUSTC_VERSION");

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemInfoDoc {
    pub runtime_version: &'static str,
    pub platform: String,
    pub arch: String,
    pub hostname: String,
    /// Host uptime in whole seconds
    pub uptime: u64,
    /// Whole gigabytes
    pub total_memory: u64,
    /// Whole gigabytes
    pub free_memory: u64,
    pub cpus: Vec<CpuDoc>,
    pub network_interfaces: BTreeMap<String, Vec<NetworkAddress>>,
    pub load_average: [f64; 3],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CpuDoc {
    pub model: String,
    #[serde(rename = "speedMHz")]
    pub speed_mhz: u64,
}

impl From<CpuInfo> for CpuDoc {
    fn from(cpu: CpuInfo) -> Self {
        Self {
            model: cpu.model,
            speed_mhz: cpu.speed_mhz,
        }
    }
}

impl From<HostDetails> for SystemInfoDoc {
    fn from(host: HostDetails) -> Self {
        Self {
            runtime_version: RUNTIME_VERSION,
            platform: host.platform,
            arch: host.arch,
            hostname: host.hostname,
            uptime: host.uptime_secs,
            total_memory: bytes_to_gigabytes(host.total_memory),
            free_memory: bytes_to_gigabytes(host.free_memory),
            cpus: host.cpus.into_iter().map(CpuDoc::from).collect(),
            network_interfaces: host.network_interfaces,
            load_average: host.load_average.to_array(),
        }
    }
}

/// `GET /system`
#[instrument(name = "system::system", skip(state))]
pub async fn system(State(state): State<AppState>) -> Result<Json<SystemInfoDoc>, AppError> {
    let host = state.probe.host_details()?;
    tracing::debug!(
        cpus = host.cpus.len(),
        interfaces = host.network_interfaces.len(),
        "Collected host details"
    );
    Ok(Json(host.into()))
}
