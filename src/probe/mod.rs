//! Process and host metric collection.
//!
//! Handlers never talk to the operating system directly. They read through the
//! [`Probe`] trait, which the binary backs with [`SysinfoProbe`] and tests back
//! with canned values. Every call takes a fresh reading; nothing is cached
//! between requests.
//!
//! All byte quantities in this module are raw bytes. Conversion to the whole
//! megabytes / gigabytes reported over HTTP happens through
//! [`bytes_to_megabytes`] and [`bytes_to_gigabytes`], which truncate.

mod alloc;
pub mod host;

use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::{BYTES_PER_GIGABYTE, BYTES_PER_MEGABYTE};

pub use alloc::{CountingAllocator, HeapStats};
pub use host::SysinfoProbe;

/// Source of process and host metrics.
pub trait Probe: Send + Sync + 'static {
    /// Memory held by the running process.
    fn process_memory(&self) -> Result<ProcessMemory, ProbeError>;

    /// Vitals summarized by the health document.
    fn host_summary(&self) -> Result<HostSummary, ProbeError>;

    /// Full host dump for the system document.
    fn host_details(&self) -> Result<HostDetails, ProbeError>;
}

/// Errors raised while reading metrics.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("cannot determine current process id: {0}")]
    CurrentPid(&'static str),

    #[error("process {0} is not visible to the host")]
    ProcessNotFound(u32),

    #[error("interface {interface} reported invalid prefix length {prefix}")]
    InvalidPrefix { interface: String, prefix: u8 },
}

/// Memory held by the process, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessMemory {
    /// Live heap bytes
    pub heap_used: u64,
    /// Heap high-water mark; never below `heap_used`
    pub heap_total: u64,
    /// Resident memory not accounted for by the heap
    pub external: u64,
}

impl ProcessMemory {
    /// Combine allocator counters with the resident set size reported by the OS.
    pub fn from_parts(heap: HeapStats, resident_bytes: u64) -> Self {
        let heap_total = heap.peak_bytes.max(heap.live_bytes);
        Self {
            heap_used: heap.live_bytes,
            heap_total,
            external: resident_bytes.saturating_sub(heap_total),
        }
    }
}

/// 1, 5 and 15 minute load averages. Zero on hosts without the concept.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoadAverage {
    pub one: f64,
    pub five: f64,
    pub fifteen: f64,
}

impl LoadAverage {
    pub fn to_array(self) -> [f64; 3] {
        [self.one, self.five, self.fifteen]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HostSummary {
    pub platform: String,
    pub arch: String,
    pub hostname: String,
    /// Logical CPU count
    pub cpu_count: usize,
    pub load_average: LoadAverage,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HostDetails {
    pub platform: String,
    pub arch: String,
    pub hostname: String,
    /// Host uptime in whole seconds
    pub uptime_secs: u64,
    pub total_memory: u64,
    pub free_memory: u64,
    /// One entry per logical CPU
    pub cpus: Vec<CpuInfo>,
    pub network_interfaces: BTreeMap<String, Vec<NetworkAddress>>,
    pub load_average: LoadAverage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpuInfo {
    pub model: String,
    pub speed_mhz: u64,
}

/// One address assigned to a network interface, as the host reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkAddress {
    pub address: String,
    pub netmask: String,
    /// `IPv4` or `IPv6`
    pub family: &'static str,
    pub mac: String,
    /// Loopback address
    pub internal: bool,
    pub cidr: String,
}

/// Operating system name of the running binary (`linux`, `macos`, `windows`, ...).
pub fn platform() -> &'static str {
    std::env::consts::OS
}

/// CPU architecture of the running binary (`x86_64`, `aarch64`, ...).
pub fn arch() -> &'static str {
    std::env::consts::ARCH
}

/// Whole megabytes, truncating: `floor(bytes / 1048576)`.
pub fn bytes_to_megabytes(bytes: u64) -> u64 {
    bytes / BYTES_PER_MEGABYTE
}

/// Whole gigabytes, truncating: `floor(bytes / 1073741824)`.
pub fn bytes_to_gigabytes(bytes: u64) -> u64 {
    bytes / BYTES_PER_GIGABYTE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_to_megabytes_truncates() {
        assert_eq!(bytes_to_megabytes(0), 0);
        assert_eq!(bytes_to_megabytes(1_048_575), 0);
        assert_eq!(bytes_to_megabytes(2_097_152), 2);
        assert_eq!(bytes_to_megabytes(3_145_727), 2);
    }

    #[test]
    fn test_bytes_to_gigabytes_truncates() {
        assert_eq!(bytes_to_gigabytes(1_073_741_823), 0);
        assert_eq!(bytes_to_gigabytes(1_073_741_824), 1);
        assert_eq!(bytes_to_gigabytes(16 * 1_073_741_824 - 1), 15);
    }

    #[test]
    fn test_process_memory_total_never_below_used() {
        let heap = HeapStats {
            live_bytes: 4096,
            peak_bytes: 1024,
        };
        let memory = ProcessMemory::from_parts(heap, 10_000);
        assert_eq!(memory.heap_used, 4096);
        assert_eq!(memory.heap_total, 4096);
        assert_eq!(memory.external, 10_000 - 4096);
    }

    #[test]
    fn test_process_memory_external_saturates() {
        let heap = HeapStats {
            live_bytes: 2_097_152,
            peak_bytes: 3_000_000,
        };
        let memory = ProcessMemory::from_parts(heap, 1_000);
        assert_eq!(memory.heap_total, 3_000_000);
        assert_eq!(memory.external, 0);
    }

    #[test]
    fn test_load_average_order() {
        let load = LoadAverage {
            one: 0.5,
            five: 1.5,
            fifteen: 2.5,
        };
        assert_eq!(load.to_array(), [0.5, 1.5, 2.5]);
        assert_eq!(LoadAverage::default().to_array(), [0.0; 3]);
    }

    #[test]
    fn test_platform_and_arch_not_empty() {
        assert!(!platform().is_empty());
        assert!(!arch().is_empty());
    }
}
