//! Named lookup over the tools exposed to an agent.

use std::sync::Arc;

use crate::{Tool, ToolError, ToolInput, ToolOutput, ToolResult};

#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tool. Names are unique within a registry.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> ToolResult<()> {
        if self.get_tool(tool.name()).is_some() {
            return Err(ToolError::InvalidInput(format!("tool already registered: {}", tool.name())));
        }
        tracing::debug!(tool = tool.name(), "tool registered");
        self.tools.push(tool);
        Ok(())
    }

    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> ToolResult<Self> {
        self.register(tool)?;
        Ok(self)
    }

    #[must_use]
    pub fn get_tool(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name).cloned()
    }

    /// Tools in registration order.
    #[must_use]
    pub fn list_tools(&self) -> Vec<&dyn Tool> {
        self.tools.iter().map(AsRef::as_ref).collect()
    }

    pub async fn invoke(&self, name: &str, input: ToolInput) -> ToolResult<ToolOutput> {
        let tool = self
            .get_tool(name)
            .ok_or_else(|| ToolError::InvalidInput(format!("unknown tool: {name}")))?;
        let result = tool.invoke(input).await;
        if let Err(e) = &result {
            tracing::warn!(tool = name, error = %e, "tool call failed");
        }
        result
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
