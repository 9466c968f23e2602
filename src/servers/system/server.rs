use super::tools::{
    DiskUsageTool, NetworkInfoTool, ProcessesTool, SystemHealthTool, SystemInfoTool,
};
use crate::server::{register, Server, ToolMap};

/// Host resource metrics read through `sysinfo`
pub struct SystemMonitorServer {
    tools: ToolMap,
}

impl SystemMonitorServer {
    pub fn new() -> Self {
        let mut tools = ToolMap::new();

        register(&mut tools, SystemInfoTool::new());
        register(&mut tools, ProcessesTool::new());
        register(&mut tools, DiskUsageTool::new());
        register(&mut tools, NetworkInfoTool::new());
        register(&mut tools, SystemHealthTool::new());

        log::debug!("System monitor registered {} tools", tools.len());
        Self { tools }
    }
}

impl Default for SystemMonitorServer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Server for SystemMonitorServer {
    fn name(&self) -> &str {
        "system_monitor"
    }

    fn description(&self) -> &str {
        "Host metrics: OS and uptime, CPU and memory, processes, disks, network interfaces and a health check."
    }

    fn tools(&self) -> &ToolMap {
        &self.tools
    }
}
