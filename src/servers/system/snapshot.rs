//! Point-in-time readings of the host, gathered through `sysinfo`.
//!
//! Collection and presentation are kept apart: everything here produces
//! plain data, and the tools only format it.

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use std::cmp::Ordering;
use std::path::Path;
use sysinfo::{Components, Disks, Networks, System, MINIMUM_CPU_UPDATE_INTERVAL};

#[derive(Debug, Clone, Serialize)]
pub struct HostInfo {
    pub os: String,
    pub kernel: String,
    pub architecture: String,
    pub hostname: String,
    pub boot_time: Option<DateTime<Utc>>,
    pub uptime_seconds: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CpuReading {
    pub brand: String,
    pub physical_cores: Option<usize>,
    pub logical_cores: usize,
    pub usage_percent: f32,
    pub per_core_percent: Vec<f32>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct MemoryReading {
    pub total: u64,
    pub available: u64,
    pub used: u64,
    pub swap_total: u64,
    pub swap_used: u64,
}

impl MemoryReading {
    pub fn percent(&self) -> f64 {
        percent_of(self.used, self.total)
    }

    pub fn swap_percent(&self) -> f64 {
        percent_of(self.swap_used, self.swap_total)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DiskReading {
    pub device: String,
    pub mount_point: String,
    pub file_system: String,
    pub total: u64,
    pub available: u64,
}

impl DiskReading {
    pub fn used(&self) -> u64 {
        self.total.saturating_sub(self.available)
    }

    pub fn percent(&self) -> f64 {
        percent_of(self.used(), self.total)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessReading {
    pub pid: u32,
    pub name: String,
    pub cpu_percent: f32,
    pub memory: u64,
    pub memory_percent: f64,
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct InterfaceReading {
    pub name: String,
    pub mac_address: String,
    pub received: u64,
    pub transmitted: u64,
    pub packets_received: u64,
    pub packets_transmitted: u64,
    pub errors_received: u64,
    pub errors_transmitted: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TemperatureReading {
    pub label: String,
    pub celsius: f32,
}

/// Process ordering accepted by `get_processes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessSort {
    Cpu,
    Memory,
    Pid,
}

impl ProcessSort {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "cpu" => Some(Self::Cpu),
            "memory" | "mem" => Some(Self::Memory),
            "pid" => Some(Self::Pid),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Cpu => "cpu",
            Self::Memory => "memory",
            Self::Pid => "pid",
        }
    }
}

pub fn percent_of(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Blocks for one CPU sampling interval so usage figures are meaningful.
fn sampled_system() -> System {
    let mut system = System::new_all();
    std::thread::sleep(MINIMUM_CPU_UPDATE_INTERVAL);
    system.refresh_cpu();
    system.refresh_processes();
    system.refresh_memory();
    system
}

pub fn host_info() -> HostInfo {
    let boot_time = Utc.timestamp_opt(System::boot_time() as i64, 0).single();
    HostInfo {
        os: System::long_os_version()
            .or_else(System::name)
            .unwrap_or_else(|| "Unknown".to_string()),
        kernel: System::kernel_version().unwrap_or_else(|| "Unknown".to_string()),
        architecture: System::cpu_arch().unwrap_or_else(|| std::env::consts::ARCH.to_string()),
        hostname: System::host_name().unwrap_or_else(|| "Unknown".to_string()),
        boot_time,
        uptime_seconds: System::uptime(),
    }
}

fn cpu_reading(system: &System) -> CpuReading {
    let cpus = system.cpus();
    CpuReading {
        brand: cpus
            .first()
            .map(|cpu| cpu.brand().trim().to_string())
            .filter(|brand| !brand.is_empty())
            .unwrap_or_else(|| "Unknown".to_string()),
        physical_cores: system.physical_core_count(),
        logical_cores: cpus.len(),
        usage_percent: system.global_cpu_info().cpu_usage(),
        per_core_percent: cpus.iter().map(|cpu| cpu.cpu_usage()).collect(),
    }
}

fn memory_reading(system: &System) -> MemoryReading {
    MemoryReading {
        total: system.total_memory(),
        available: system.available_memory(),
        used: system.used_memory(),
        swap_total: system.total_swap(),
        swap_used: system.used_swap(),
    }
}

pub fn cpu_and_memory() -> (CpuReading, MemoryReading) {
    let system = sampled_system();
    (cpu_reading(&system), memory_reading(&system))
}

pub fn disks() -> Vec<DiskReading> {
    let disks = Disks::new_with_refreshed_list();
    let mut readings: Vec<DiskReading> = disks
        .list()
        .iter()
        .map(|disk| DiskReading {
            device: disk.name().to_string_lossy().to_string(),
            mount_point: disk.mount_point().display().to_string(),
            file_system: disk.file_system().to_string_lossy().to_string(),
            total: disk.total_space(),
            available: disk.available_space(),
        })
        .collect();
    readings.sort_by(|a, b| a.mount_point.cmp(&b.mount_point));
    readings
}

/// The disk holding the filesystem root, or the largest one when no
/// mount point is exactly `/`.
pub fn root_disk(disks: &[DiskReading]) -> Option<&DiskReading> {
    let root = Path::new("/");
    disks
        .iter()
        .find(|disk| Path::new(&disk.mount_point) == root)
        .or_else(|| disks.iter().max_by_key(|disk| disk.total))
}

pub fn processes(sort: ProcessSort, limit: usize) -> Vec<ProcessReading> {
    let system = sampled_system();
    let total_memory = system.total_memory();

    let mut readings: Vec<ProcessReading> = system
        .processes()
        .values()
        .map(|process| ProcessReading {
            pid: process.pid().as_u32(),
            name: process.name().to_string(),
            cpu_percent: process.cpu_usage(),
            memory: process.memory(),
            memory_percent: percent_of(process.memory(), total_memory),
            status: process.status().to_string(),
        })
        .collect();

    sort_processes(&mut readings, sort);
    readings.truncate(limit);
    readings
}

pub fn sort_processes(readings: &mut [ProcessReading], sort: ProcessSort) {
    match sort {
        ProcessSort::Cpu => readings.sort_by(|a, b| {
            b.cpu_percent
                .partial_cmp(&a.cpu_percent)
                .unwrap_or(Ordering::Equal)
                .then(a.pid.cmp(&b.pid))
        }),
        ProcessSort::Memory => {
            readings.sort_by(|a, b| b.memory.cmp(&a.memory).then(a.pid.cmp(&b.pid)))
        }
        ProcessSort::Pid => readings.sort_by_key(|reading| reading.pid),
    }
}

pub fn interfaces() -> Vec<InterfaceReading> {
    let networks = Networks::new_with_refreshed_list();
    let mut readings: Vec<InterfaceReading> = networks
        .iter()
        .map(|(name, data)| InterfaceReading {
            name: name.clone(),
            mac_address: data.mac_address().to_string(),
            received: data.total_received(),
            transmitted: data.total_transmitted(),
            packets_received: data.total_packets_received(),
            packets_transmitted: data.total_packets_transmitted(),
            errors_received: data.total_errors_on_received(),
            errors_transmitted: data.total_errors_on_transmitted(),
        })
        .collect();
    readings.sort_by(|a, b| a.name.cmp(&b.name));
    readings
}

pub fn temperatures() -> Vec<TemperatureReading> {
    let components = Components::new_with_refreshed_list();
    components
        .list()
        .iter()
        .map(|component| TemperatureReading {
            label: component.label().to_string(),
            celsius: component.temperature(),
        })
        .filter(|reading| reading.celsius.is_finite())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn process(pid: u32, cpu: f32, memory: u64) -> ProcessReading {
        ProcessReading {
            pid,
            name: format!("proc{}", pid),
            cpu_percent: cpu,
            memory,
            memory_percent: 0.0,
            status: "Run".to_string(),
        }
    }

    #[test]
    fn test_parse_sort_key() {
        assert_eq!(ProcessSort::parse("CPU"), Some(ProcessSort::Cpu));
        assert_eq!(ProcessSort::parse(" memory "), Some(ProcessSort::Memory));
        assert_eq!(ProcessSort::parse("pid"), Some(ProcessSort::Pid));
        assert_eq!(ProcessSort::parse("name"), None);
    }

    #[test]
    fn test_sort_processes() {
        let mut readings = vec![
            process(30, 5.0, 100),
            process(10, 50.0, 10),
            process(20, 5.0, 900),
        ];

        sort_processes(&mut readings, ProcessSort::Cpu);
        let pids: Vec<u32> = readings.iter().map(|p| p.pid).collect();
        assert_eq!(pids, vec![10, 20, 30]);

        sort_processes(&mut readings, ProcessSort::Memory);
        let pids: Vec<u32> = readings.iter().map(|p| p.pid).collect();
        assert_eq!(pids, vec![20, 30, 10]);

        sort_processes(&mut readings, ProcessSort::Pid);
        let pids: Vec<u32> = readings.iter().map(|p| p.pid).collect();
        assert_eq!(pids, vec![10, 20, 30]);
    }

    #[test]
    fn test_percent_of_zero_total() {
        assert_eq!(percent_of(5, 0), 0.0);
        assert_eq!(percent_of(1, 4), 25.0);
    }

    #[test]
    fn test_root_disk_prefers_slash() {
        let disk = |mount: &str, total: u64| DiskReading {
            device: "dev".to_string(),
            mount_point: mount.to_string(),
            file_system: "ext4".to_string(),
            total,
            available: total / 2,
        };
        let disks = vec![disk("/data", 1000), disk("/", 10)];
        assert_eq!(root_disk(&disks).map(|d| d.mount_point.as_str()), Some("/"));

        let disks = vec![disk("C:\\", 10), disk("D:\\", 1000)];
        assert_eq!(root_disk(&disks).map(|d| d.mount_point.as_str()), Some("D:\\"));
        assert!(root_disk(&[]).is_none());
    }

    #[test]
    fn test_host_info_is_populated() {
        let info = host_info();
        assert!(!info.architecture.is_empty());
        assert!(!info.os.is_empty());
    }
}
