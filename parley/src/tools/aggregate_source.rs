use async_trait::async_trait;
use serde_json::Value;

use crate::tool_source::{ToolCallContent, ToolSource, ToolSourceError, ToolSpec};
use crate::tools::{Tool, ToolRegistry};

/// Implements `ToolSource` over a [`ToolRegistry`].
///
/// Tools are added while building the source; afterwards the set is fixed.
///
/// ```
/// # #[tokio::main]
/// # async fn main() {
/// use parley::tools::{AggregateToolSource, TavilySearchTool};
/// use parley::tool_source::ToolSource;
///
/// let source = AggregateToolSource::new().with_tool(Box::new(TavilySearchTool::new("tvly-key")));
/// assert_eq!(source.list_tools().await.unwrap().len(), 1);
/// # }
/// ```
#[derive(Default)]
pub struct AggregateToolSource {
    registry: ToolRegistry,
}

impl AggregateToolSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_registry(registry: ToolRegistry) -> Self {
        Self { registry }
    }

    pub fn with_tool(mut self, tool: Box<dyn Tool>) -> Self {
        self.registry.register(tool);
        self
    }
}

#[async_trait]
impl ToolSource for AggregateToolSource {
    async fn list_tools(&self) -> Result<Vec<ToolSpec>, ToolSourceError> {
        Ok(self.registry.list())
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: Value,
    ) -> Result<ToolCallContent, ToolSourceError> {
        self.registry.call(name, arguments).await
    }
}
