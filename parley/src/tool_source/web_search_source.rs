//! Web search as a tool source: one-line setup for the chat agent.

use async_trait::async_trait;
use serde_json::Value;

use crate::tool_source::{ToolCallContent, ToolSource, ToolSourceError, ToolSpec};
use crate::tools::{AggregateToolSource, TavilySearchTool};

/// Tool source exposing `tavily_search`.
///
/// **Interaction**: Pass to `ActNode::new` and bind `list_tools()` to the LLM client.
pub struct WebSearchToolsSource {
    source: AggregateToolSource,
}

impl WebSearchToolsSource {
    pub fn new(api_key: impl Into<String>, max_results: u32) -> Self {
        Self::with_tool(TavilySearchTool::new(api_key).with_max_results(max_results))
    }

    /// Wraps a preconfigured search tool (custom endpoint, client, ...).
    pub fn with_tool(tool: TavilySearchTool) -> Self {
        Self {
            source: AggregateToolSource::new().with_tool(Box::new(tool)),
        }
    }
}

#[async_trait]
impl ToolSource for WebSearchToolsSource {
    async fn list_tools(&self) -> Result<Vec<ToolSpec>, ToolSourceError> {
        self.source.list_tools().await
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: Value,
    ) -> Result<ToolCallContent, ToolSourceError> {
        self.source.call_tool(name, arguments).await
    }
}
