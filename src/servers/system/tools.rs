use super::snapshot::{
    self, CpuReading, DiskReading, HostInfo, InterfaceReading, MemoryReading, ProcessReading,
    ProcessSort, TemperatureReading,
};
use crate::tool::{parse_arguments, Tool};
use crate::utils::{format_size, format_timestamp};
use anyhow::Result;
use serde_json::{json, Value};

const MAX_PROCESSES: usize = 500;
const BAR_WIDTH: usize = 20;

/// "3d 4h 5m", "4h 5m" or "5m 6s"
pub fn format_uptime(seconds: u64) -> String {
    let days = seconds / 86_400;
    let hours = (seconds % 86_400) / 3_600;
    let minutes = (seconds % 3_600) / 60;
    let secs = seconds % 60;

    if days > 0 {
        format!("{}d {}h {}m", days, hours, minutes)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m {}s", minutes, secs)
    }
}

pub fn usage_bar(percent: f64) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * BAR_WIDTH as f64) as usize;
    format!("[{}{}]", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

fn truncate_name(name: &str, max: usize) -> String {
    if name.chars().count() <= max {
        name.to_string()
    } else {
        name.chars().take(max).collect()
    }
}

async fn blocking<T, F>(collect: F) -> Result<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    Ok(tokio::task::spawn_blocking(collect).await?)
}

/// OS, CPU, memory and root disk overview
pub struct SystemInfoTool;

impl SystemInfoTool {
    pub fn new() -> Self {
        Self
    }

    fn render(
        host: &HostInfo,
        cpu: &CpuReading,
        memory: &MemoryReading,
        disk: Option<&DiskReading>,
    ) -> String {
        let mut lines = vec![
            "System Information".to_string(),
            "=".repeat(50),
            String::new(),
            "System Details:".to_string(),
            format!("  OS: {}", host.os),
            format!("  Kernel: {}", host.kernel),
            format!("  Architecture: {}", host.architecture),
            format!("  Processor: {}", cpu.brand),
            format!("  Hostname: {}", host.hostname),
        ];
        if let Some(boot_time) = &host.boot_time {
            lines.push(format!("  Boot Time: {}", format_timestamp(boot_time)));
        }
        lines.push(format!("  Uptime: {}", format_uptime(host.uptime_seconds)));

        lines.push(String::new());
        lines.push("CPU Information:".to_string());
        lines.push(format!(
            "  Physical Cores: {}",
            cpu.physical_cores
                .map(|n| n.to_string())
                .unwrap_or_else(|| "Unknown".to_string())
        ));
        lines.push(format!("  Logical Cores: {}", cpu.logical_cores));
        lines.push(format!("  CPU Usage: {:.1}%", cpu.usage_percent));
        let per_core: Vec<String> = cpu
            .per_core_percent
            .iter()
            .map(|usage| format!("{:.1}%", usage))
            .collect();
        lines.push(format!("  Per-Core Usage: {}", per_core.join(", ")));

        lines.push(String::new());
        lines.push("Memory Information:".to_string());
        lines.push(format!("  Total RAM: {}", format_size(memory.total)));
        lines.push(format!("  Available RAM: {}", format_size(memory.available)));
        lines.push(format!("  Used RAM: {}", format_size(memory.used)));
        lines.push(format!("  RAM Usage: {:.1}%", memory.percent()));
        lines.push(format!("  Swap Total: {}", format_size(memory.swap_total)));
        lines.push(format!("  Swap Used: {}", format_size(memory.swap_used)));
        lines.push(format!("  Swap Usage: {:.1}%", memory.swap_percent()));

        lines.push(String::new());
        lines.push("Disk Information:".to_string());
        match disk {
            Some(disk) => {
                lines.push(format!("  Mount Point: {}", disk.mount_point));
                lines.push(format!("  Total Disk: {}", format_size(disk.total)));
                lines.push(format!("  Used Disk: {}", format_size(disk.used())));
                lines.push(format!("  Free Disk: {}", format_size(disk.available)));
                lines.push(format!("  Disk Usage: {:.1}%", disk.percent()));
            }
            None => lines.push("  No disks reported.".to_string()),
        }

        lines.join("\n")
    }
}

#[async_trait::async_trait]
impl Tool for SystemInfoTool {
    fn name(&self) -> &str {
        "get_system_info"
    }

    fn description(&self) -> &str {
        "Get an overview of the host: OS, uptime, CPU cores and usage, memory, swap and root disk usage."
    }

    fn parameters(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, _arguments: &str) -> Result<String> {
        let (host, (cpu, memory), disks) = blocking(|| {
            (
                snapshot::host_info(),
                snapshot::cpu_and_memory(),
                snapshot::disks(),
            )
        })
        .await?;

        Ok(Self::render(
            &host,
            &cpu,
            &memory,
            snapshot::root_disk(&disks),
        ))
    }
}

/// Running processes ordered by CPU, memory or pid
pub struct ProcessesTool;

#[derive(serde::Deserialize)]
struct ProcessesParams {
    #[serde(default = "default_process_limit")]
    limit: usize,
    #[serde(default = "default_sort")]
    sort_by: String,
}

fn default_process_limit() -> usize {
    10
}

fn default_sort() -> String {
    "cpu".to_string()
}

impl ProcessesTool {
    pub fn new() -> Self {
        Self
    }

    fn render(sort: ProcessSort, processes: &[ProcessReading]) -> String {
        let mut lines = vec![
            format!(
                "Top {} Processes (sorted by {}):",
                processes.len(),
                sort.label()
            ),
            "=".repeat(80),
            format!(
                "{:<8} {:<25} {:<8} {:<10} {:<12} {:<10}",
                "PID", "Name", "CPU%", "Memory%", "Memory", "Status"
            ),
            "-".repeat(80),
        ];
        for process in processes {
            lines.push(format!(
                "{:<8} {:<25} {:<8} {:<10} {:<12} {:<10}",
                process.pid,
                truncate_name(&process.name, 24),
                format!("{:.1}%", process.cpu_percent),
                format!("{:.1}%", process.memory_percent),
                format_size(process.memory),
                process.status
            ));
        }
        lines.join("\n")
    }
}

#[async_trait::async_trait]
impl Tool for ProcessesTool {
    fn name(&self) -> &str {
        "get_processes"
    }

    fn description(&self) -> &str {
        "List running processes with CPU, memory and status, sorted by cpu, memory or pid."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "limit": {
                    "type": "integer",
                    "minimum": 1,
                    "description": "Number of processes to return (default: 10)"
                },
                "sort_by": {
                    "type": "string",
                    "enum": ["cpu", "memory", "pid"],
                    "description": "Sort order (default: cpu)"
                }
            }
        })
    }

    async fn execute(&self, arguments: &str) -> Result<String> {
        let params: ProcessesParams = parse_arguments(self.name(), arguments)?;
        let sort = ProcessSort::parse(&params.sort_by).ok_or_else(|| {
            anyhow::anyhow!(
                "Invalid sort_by '{}': expected cpu, memory or pid",
                params.sort_by
            )
        })?;
        let limit = params.limit.clamp(1, MAX_PROCESSES);

        let processes = blocking(move || snapshot::processes(sort, limit)).await?;
        Ok(Self::render(sort, &processes))
    }
}

/// Per-mount capacity with usage bars
pub struct DiskUsageTool;

impl DiskUsageTool {
    pub fn new() -> Self {
        Self
    }

    fn render(disks: &[DiskReading]) -> String {
        if disks.is_empty() {
            return "Disk Usage Information\n\nNo disks reported.".to_string();
        }

        let mut output = format!("Disk Usage Information\n{}\n", "=".repeat(60));
        for disk in disks {
            output.push_str(&format!(
                "\nDrive: {}\n  Mount Point: {}\n  File System: {}\n  Total Size: {}\n  Used: {}\n  Free: {}\n  Usage: {:.1}%\n  Progress: {} {:.1}%\n",
                disk.device,
                disk.mount_point,
                disk.file_system,
                format_size(disk.total),
                format_size(disk.used()),
                format_size(disk.available),
                disk.percent(),
                usage_bar(disk.percent()),
                disk.percent()
            ));
        }
        output.trim_end().to_string()
    }
}

#[async_trait::async_trait]
impl Tool for DiskUsageTool {
    fn name(&self) -> &str {
        "get_disk_usage"
    }

    fn description(&self) -> &str {
        "Get capacity, used and free space for every mounted disk."
    }

    fn parameters(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, _arguments: &str) -> Result<String> {
        let disks = blocking(snapshot::disks).await?;
        Ok(Self::render(&disks))
    }
}

/// Interface addresses and traffic counters
pub struct NetworkInfoTool;

impl NetworkInfoTool {
    pub fn new() -> Self {
        Self
    }

    fn render(interfaces: &[InterfaceReading]) -> String {
        let mut output = format!(
            "Network Information\n{}\n\nNetwork Interfaces:\n",
            "=".repeat(50)
        );
        if interfaces.is_empty() {
            output.push_str("  No network interfaces found.\n");
        }
        for interface in interfaces {
            output.push_str(&format!(
                "  {}:\n    MAC: {}\n    Received: {} ({} packets, {} errors)\n    Transmitted: {} ({} packets, {} errors)\n\n",
                interface.name,
                interface.mac_address,
                format_size(interface.received),
                interface.packets_received,
                interface.errors_received,
                format_size(interface.transmitted),
                interface.packets_transmitted,
                interface.errors_transmitted
            ));
        }

        let received: u64 = interfaces.iter().map(|i| i.received).sum();
        let transmitted: u64 = interfaces.iter().map(|i| i.transmitted).sum();
        let packets_in: u64 = interfaces.iter().map(|i| i.packets_received).sum();
        let packets_out: u64 = interfaces.iter().map(|i| i.packets_transmitted).sum();
        output.push_str(&format!(
            "Network I/O Statistics:\n  Bytes Sent: {}\n  Bytes Received: {}\n  Packets Sent: {}\n  Packets Received: {}",
            format_size(transmitted),
            format_size(received),
            packets_out,
            packets_in
        ));
        output
    }
}

#[async_trait::async_trait]
impl Tool for NetworkInfoTool {
    fn name(&self) -> &str {
        "get_network_info"
    }

    fn description(&self) -> &str {
        "Get network interfaces with MAC addresses and traffic totals."
    }

    fn parameters(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, _arguments: &str) -> Result<String> {
        let interfaces = blocking(snapshot::interfaces).await?;
        Ok(Self::render(&interfaces))
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct HealthReport {
    pub normal: Vec<String>,
    pub alerts: Vec<String>,
    pub warnings: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Thresholds: CPU >80 alert, >60 warning; memory >90 critical, >80 alert,
/// >70 warning; disk >95 critical, >90 alert, >80 warning; sensors >80°C
/// alert, >70°C warning.
pub fn assess_health(
    cpu_percent: f64,
    memory_percent: f64,
    disk_percent: Option<f64>,
    temperatures: &[TemperatureReading],
) -> HealthReport {
    let mut report = HealthReport::default();

    if cpu_percent > 80.0 {
        report.alerts.push(format!("High CPU usage: {:.1}%", cpu_percent));
    } else if cpu_percent > 60.0 {
        report.warnings.push(format!("Moderate CPU usage: {:.1}%", cpu_percent));
    } else {
        report.normal.push(format!("CPU usage: {:.1}% (Normal)", cpu_percent));
    }

    if memory_percent > 90.0 {
        report.alerts.push(format!("Critical memory usage: {:.1}%", memory_percent));
    } else if memory_percent > 80.0 {
        report.alerts.push(format!("High memory usage: {:.1}%", memory_percent));
    } else if memory_percent > 70.0 {
        report.warnings.push(format!("Moderate memory usage: {:.1}%", memory_percent));
    } else {
        report.normal.push(format!("Memory usage: {:.1}% (Normal)", memory_percent));
    }

    match disk_percent {
        Some(disk) if disk > 95.0 => {
            report.alerts.push(format!("Critical disk usage: {:.1}%", disk));
        }
        Some(disk) if disk > 90.0 => {
            report.alerts.push(format!("High disk usage: {:.1}%", disk));
        }
        Some(disk) if disk > 80.0 => {
            report.warnings.push(format!("Moderate disk usage: {:.1}%", disk));
        }
        Some(disk) => report.normal.push(format!("Disk usage: {:.1}% (Normal)", disk)),
        // No disk reported at all
        None => {}
    }

    for sensor in temperatures {
        if sensor.celsius > 80.0 {
            report.alerts.push(format!(
                "High temperature on {}: {:.1}°C",
                sensor.label, sensor.celsius
            ));
        } else if sensor.celsius > 70.0 {
            report.warnings.push(format!(
                "Elevated temperature on {}: {:.1}°C",
                sensor.label, sensor.celsius
            ));
        }
    }

    if cpu_percent > 60.0 {
        report.recommendations.push("Consider closing unnecessary applications".to_string());
    }
    if memory_percent > 70.0 {
        report.recommendations.push("Close unused programs to free up memory".to_string());
    }
    if disk_percent.is_some_and(|disk| disk > 80.0) {
        report
            .recommendations
            .push("Clean up disk space by removing unnecessary files".to_string());
    }

    report
}

/// Threshold-based health summary with alerts and recommendations
pub struct SystemHealthTool;

impl SystemHealthTool {
    pub fn new() -> Self {
        Self
    }

    fn render(report: &HealthReport) -> String {
        let mut output = format!("System Health Check\n{}\n\n", "=".repeat(40));
        for line in &report.normal {
            output.push_str(&format!("{}\n", line));
        }
        if !report.alerts.is_empty() {
            output.push_str("\nALERTS:\n");
            for alert in &report.alerts {
                output.push_str(&format!("  {}\n", alert));
            }
        }
        if !report.warnings.is_empty() {
            output.push_str("\nWARNINGS:\n");
            for warning in &report.warnings {
                output.push_str(&format!("  {}\n", warning));
            }
        }
        if report.alerts.is_empty() && report.warnings.is_empty() {
            output.push_str("\nSystem is running optimally!\n");
        }
        if !report.recommendations.is_empty() {
            output.push_str("\nRecommendations:\n");
            for recommendation in &report.recommendations {
                output.push_str(&format!("  - {}\n", recommendation));
            }
        }
        output.trim_end().to_string()
    }
}

#[async_trait::async_trait]
impl Tool for SystemHealthTool {
    fn name(&self) -> &str {
        "get_system_health"
    }

    fn description(&self) -> &str {
        "Check CPU, memory, disk and temperature against thresholds and report alerts, warnings and recommendations."
    }

    fn parameters(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, _arguments: &str) -> Result<String> {
        let report = blocking(|| {
            let (cpu, memory) = snapshot::cpu_and_memory();
            let disks = snapshot::disks();
            let disk_percent = snapshot::root_disk(&disks).map(DiskReading::percent);
            assess_health(
                f64::from(cpu.usage_percent),
                memory.percent(),
                disk_percent,
                &snapshot::temperatures(),
            )
        })
        .await?;

        if !report.alerts.is_empty() {
            log::warn!("System health alerts: {}", report.alerts.join("; "));
        }
        Ok(Self::render(&report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sensor(label: &str, celsius: f32) -> TemperatureReading {
        TemperatureReading {
            label: label.to_string(),
            celsius,
        }
    }

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(59), "0m 59s");
        assert_eq!(format_uptime(3_725), "1h 2m");
        assert_eq!(format_uptime(3 * 86_400 + 4 * 3_600 + 5 * 60), "3d 4h 5m");
    }

    #[test]
    fn test_usage_bar() {
        assert_eq!(usage_bar(0.0), format!("[{}]", "░".repeat(20)));
        assert_eq!(usage_bar(50.0), format!("[{}{}]", "█".repeat(10), "░".repeat(10)));
        assert_eq!(usage_bar(150.0), format!("[{}]", "█".repeat(20)));
    }

    #[test]
    fn test_healthy_system() {
        let report = assess_health(10.0, 40.0, Some(50.0), &[sensor("cpu", 45.0)]);
        assert!(report.alerts.is_empty());
        assert!(report.warnings.is_empty());
        assert!(report.recommendations.is_empty());
        assert_eq!(report.normal.len(), 3);

        let output = SystemHealthTool::render(&report);
        assert!(output.contains("CPU usage: 10.0% (Normal)"));
        assert!(output.contains("System is running optimally!"));
    }

    #[test]
    fn test_health_thresholds() {
        let report = assess_health(85.0, 92.0, Some(85.0), &[sensor("gpu", 75.0)]);
        assert_eq!(
            report.alerts,
            vec![
                "High CPU usage: 85.0%".to_string(),
                "Critical memory usage: 92.0%".to_string()
            ]
        );
        assert_eq!(
            report.warnings,
            vec![
                "Moderate disk usage: 85.0%".to_string(),
                "Elevated temperature on gpu: 75.0°C".to_string()
            ]
        );
        assert_eq!(report.recommendations.len(), 3);

        let output = SystemHealthTool::render(&report);
        assert!(output.contains("ALERTS:\n  High CPU usage: 85.0%"));
        assert!(!output.contains("optimally"));
    }

    #[test]
    fn test_health_boundaries_are_exclusive() {
        let report = assess_health(60.0, 70.0, Some(80.0), &[sensor("cpu", 70.0)]);
        assert!(report.alerts.is_empty());
        assert!(report.warnings.is_empty());
        assert!(report.recommendations.is_empty());
    }

    #[test]
    fn test_process_table() {
        let processes = vec![ProcessReading {
            pid: 42,
            name: "a-process-with-a-really-long-name".to_string(),
            cpu_percent: 12.5,
            memory: 2048,
            memory_percent: 1.25,
            status: "Run".to_string(),
        }];
        let output = ProcessesTool::render(ProcessSort::Memory, &processes);

        assert!(output.starts_with("Top 1 Processes (sorted by memory):"));
        assert!(output.contains("42       a-process-with-a-really-  12.5%"));
        assert!(output.contains("2.0 KB"));
    }

    #[test]
    fn test_disk_render() {
        let disks = vec![DiskReading {
            device: "/dev/sda1".to_string(),
            mount_point: "/".to_string(),
            file_system: "ext4".to_string(),
            total: 4096,
            available: 1024,
        }];
        let output = DiskUsageTool::render(&disks);
        assert!(output.contains("Drive: /dev/sda1"));
        assert!(output.contains("  Used: 3.0 KB"));
        assert!(output.contains("  Usage: 75.0%"));
        assert_eq!(DiskUsageTool::render(&[]), "Disk Usage Information\n\nNo disks reported.");
    }

    #[tokio::test]
    async fn test_invalid_sort_is_error() {
        let err = ProcessesTool::new()
            .execute(r#"{"sort_by": "name"}"#)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Invalid sort_by 'name'"));
    }

    #[tokio::test]
    async fn test_live_processes_respect_limit() {
        let output = ProcessesTool::new()
            .execute(r#"{"limit": 3, "sort_by": "pid"}"#)
            .await
            .unwrap();
        assert!(output.starts_with("Top "));
        // header, rule, columns, rule, then at most three rows
        assert!(output.lines().count() <= 7);
    }

    #[tokio::test]
    async fn test_live_system_info() {
        let output = SystemInfoTool::new().execute("").await.unwrap();
        assert!(output.starts_with("System Information"));
        assert!(output.contains("Logical Cores:"));
        assert!(output.contains("Total RAM:"));
    }
}
