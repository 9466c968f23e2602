use crate::tool::{tools_to_json, Tool};
use serde_json::Value;
use std::collections::BTreeMap;

pub type ToolMap = BTreeMap<String, Box<dyn Tool>>;

/// Register a tool under its own name
pub fn register(tools: &mut ToolMap, tool: impl Tool + 'static) {
    tools.insert(tool.name().to_string(), Box::new(tool));
}

/// A named group of tools exposed to the calling host
#[async_trait::async_trait]
pub trait Server: Send + Sync {
    /// Get the name of the server
    fn name(&self) -> &str;

    /// Get the description of what this server handles
    fn description(&self) -> &str;

    /// Tools offered by this server, keyed by tool name
    fn tools(&self) -> &ToolMap;

    fn tool(&self, name: &str) -> Option<&dyn Tool> {
        self.tools().get(name).map(|tool| tool.as_ref())
    }

    fn tool_schemas(&self) -> Vec<Value> {
        let tool_refs: Vec<&dyn Tool> = self.tools().values().map(|t| t.as_ref()).collect();
        tools_to_json(&tool_refs)
    }

    /// Dispatch a tool call. Failures come back as text so nothing escapes
    /// to the host.
    async fn call(&self, tool_name: &str, arguments: &str) -> String {
        log::info!("Server call: {} -> {}", self.name(), tool_name);

        match self.tools().get(tool_name) {
            Some(tool) => match tool.call(arguments).await {
                Ok(result) => result,
                Err(e) => format!("Tool execution failed: {}", e),
            },
            None => {
                log::warn!("Server {} has no tool named {}", self.name(), tool_name);
                format!("Tool not found: {}", tool_name)
            }
        }
    }
}

/// Describe servers and their tools as JSON
pub fn servers_to_json(servers: &[&dyn Server]) -> Vec<Value> {
    servers
        .iter()
        .map(|server| {
            serde_json::json!({
                "name": server.name(),
                "description": server.description(),
                "tools": server.tool_schemas()
            })
        })
        .collect()
}
