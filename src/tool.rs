use anyhow::Result;
use serde_json::Value;

/// Core Tool trait that every exposed operation implements
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    /// Get the name of the tool
    fn name(&self) -> &str;

    /// Get the description of the tool
    fn description(&self) -> &str;

    /// Get the parameters schema for the tool
    fn parameters(&self) -> Value;

    /// Entry point for tool execution with logging
    async fn call(&self, arguments: &str) -> Result<String> {
        log::info!("Tool call start: {} - args: {}", self.name(), arguments);

        let result = self.execute(arguments).await;

        match &result {
            Ok(response) => log::info!(
                "Tool call success: {} - {} bytes of output",
                self.name(),
                response.len()
            ),
            Err(e) => log::error!("Tool call error: {} - error: {}", self.name(), e),
        }

        result
    }

    /// Actual implementation of the tool execution
    async fn execute(&self, arguments: &str) -> Result<String>;
}

/// Describe tools as `{name, description, input_schema}` objects
pub fn tools_to_json(tools: &[&dyn Tool]) -> Vec<Value> {
    tools
        .iter()
        .map(|tool| {
            serde_json::json!({
                "name": tool.name(),
                "description": tool.description(),
                "input_schema": tool.parameters()
            })
        })
        .collect()
}

/// Parse tool arguments, treating an empty string as `{}`
pub fn parse_arguments<T: serde::de::DeserializeOwned>(tool: &str, arguments: &str) -> Result<T> {
    let arguments = if arguments.trim().is_empty() {
        "{}"
    } else {
        arguments
    };
    serde_json::from_str(arguments)
        .map_err(|e| anyhow::anyhow!("Failed to parse {} arguments: {}", tool, e))
}
