//! Operating-system backed probe built on `sysinfo`.
//!
//! Each call builds its own `System` and refreshes only what it reads, so
//! concurrent requests share nothing.
//!
//! Platform gaps:
//! - load averages are zero on Windows (the host has no such metric)
//! - CPU model is an empty string and speed is 0 when the host does not expose them
//! - hostname falls back to `unknown`

use std::collections::BTreeMap;
use std::net::IpAddr;

use ipnet::IpNet;
use sysinfo::{
    CpuRefreshKind, MemoryRefreshKind, Networks, Pid, ProcessRefreshKind, ProcessesToUpdate,
    RefreshKind, System,
};

use super::{
    arch, platform, CpuInfo, HeapStats, HostDetails, HostSummary, LoadAverage, NetworkAddress,
    Probe, ProbeError, ProcessMemory,
};

const UNKNOWN_HOSTNAME: &str = "unknown";

/// Probe reading live values from the host.
#[derive(Debug, Clone)]
pub struct SysinfoProbe {
    pid: Pid,
}

impl SysinfoProbe {
    /// Create a probe for the current process.
    pub fn new() -> Result<Self, ProbeError> {
        let pid = sysinfo::get_current_pid().map_err(ProbeError::CurrentPid)?;
        Ok(Self { pid })
    }

    fn hostname() -> String {
        System::host_name().unwrap_or_else(|| UNKNOWN_HOSTNAME.to_string())
    }

    fn load_average() -> LoadAverage {
        let load = System::load_average();
        LoadAverage {
            one: load.one,
            five: load.five,
            fifteen: load.fifteen,
        }
    }
}

impl Probe for SysinfoProbe {
    fn process_memory(&self) -> Result<ProcessMemory, ProbeError> {
        let mut system = System::new();
        system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[self.pid]),
            true,
            ProcessRefreshKind::nothing().with_memory(),
        );
        let process = system
            .process(self.pid)
            .ok_or(ProbeError::ProcessNotFound(self.pid.as_u32()))?;

        Ok(ProcessMemory::from_parts(
            HeapStats::current(),
            process.memory(),
        ))
    }

    fn host_summary(&self) -> Result<HostSummary, ProbeError> {
        let system = System::new_with_specifics(
            RefreshKind::nothing().with_cpu(CpuRefreshKind::nothing()),
        );

        Ok(HostSummary {
            platform: platform().to_string(),
            arch: arch().to_string(),
            hostname: Self::hostname(),
            cpu_count: system.cpus().len(),
            load_average: Self::load_average(),
        })
    }

    fn host_details(&self) -> Result<HostDetails, ProbeError> {
        let system = System::new_with_specifics(
            RefreshKind::nothing()
                .with_cpu(CpuRefreshKind::nothing().with_frequency())
                .with_memory(MemoryRefreshKind::nothing().with_ram()),
        );

        let cpus = system
            .cpus()
            .iter()
            .map(|cpu| CpuInfo {
                model: cpu.brand().trim().to_string(),
                speed_mhz: cpu.frequency(),
            })
            .collect();

        let networks = Networks::new_with_refreshed_list();
        let network_interfaces = collect_interfaces(
            networks.list().iter().map(|(name, data)| {
                let mac = data.mac_address().to_string();
                let addresses = data
                    .ip_networks()
                    .iter()
                    .map(|network| (network.addr, network.prefix))
                    .collect::<Vec<_>>();
                (name.as_str(), mac, addresses)
            }),
        )?;

        Ok(HostDetails {
            platform: platform().to_string(),
            arch: arch().to_string(),
            hostname: Self::hostname(),
            uptime_secs: System::uptime(),
            total_memory: system.total_memory(),
            // Memory obtainable without swapping, not just never-touched pages
            free_memory: system.available_memory().min(system.total_memory()),
            cpus,
            network_interfaces,
            load_average: Self::load_average(),
        })
    }
}

/// Build the interface map from raw `(name, mac, [(addr, prefix)])` tuples.
///
/// Interfaces without any assigned address are left out.
fn collect_interfaces<'a, I>(
    interfaces: I,
) -> Result<BTreeMap<String, Vec<NetworkAddress>>, ProbeError>
where
    I: IntoIterator<Item = (&'a str, String, Vec<(IpAddr, u8)>)>,
{
    let mut map = BTreeMap::new();
    for (name, mac, addresses) in interfaces {
        if addresses.is_empty() {
            continue;
        }
        let records = addresses
            .into_iter()
            .map(|(addr, prefix)| network_address(name, &mac, addr, prefix))
            .collect::<Result<Vec<_>, _>>()?;
        map.insert(name.to_string(), records);
    }
    Ok(map)
}

fn network_address(
    interface: &str,
    mac: &str,
    addr: IpAddr,
    prefix: u8,
) -> Result<NetworkAddress, ProbeError> {
    let net = IpNet::new(addr, prefix).map_err(|_| ProbeError::InvalidPrefix {
        interface: interface.to_string(),
        prefix,
    })?;

    Ok(NetworkAddress {
        address: addr.to_string(),
        netmask: net.netmask().to_string(),
        family: match addr {
            IpAddr::V4(_) => "IPv4",
            IpAddr::V6(_) => "IPv6",
        },
        mac: mac.to_string(),
        internal: addr.is_loopback(),
        cidr: net.to_string(),
    })
}
