//! Mock tool source for tests: fixed tool list and a canned result.

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::tool_source::{ToolCallContent, ToolSource, ToolSourceError, ToolSpec};
use crate::tools::TOOL_TAVILY_SEARCH;

/// Mock ToolSource: every listed tool returns `result`, unknown names are `NotFound`.
///
/// Records each `(name, arguments)` it was called with.
pub struct MockToolSource {
    tools: Vec<ToolSpec>,
    result: String,
    fail_with: Option<String>,
    calls: Mutex<Vec<(String, Value)>>,
}

impl MockToolSource {
    pub fn new(tools: Vec<ToolSpec>, result: impl Into<String>) -> Self {
        Self {
            tools,
            result: result.into(),
            fail_with: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// One search tool named like the real one, returning `result`.
    pub fn search_tool(result: impl Into<String>) -> Self {
        Self::new(
            vec![ToolSpec {
                name: TOOL_TAVILY_SEARCH.to_string(),
                description: Some("Search the web.".to_string()),
                input_schema: serde_json::json!({
                    "type": "object",
                    "properties": { "query": { "type": "string" } },
                    "required": ["query"]
                }),
            }],
            result,
        )
    }

    /// Known tools fail with a transport error instead of returning the result.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.fail_with = Some(message.into());
        self
    }

    pub async fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl ToolSource for MockToolSource {
    async fn list_tools(&self) -> Result<Vec<ToolSpec>, ToolSourceError> {
        Ok(self.tools.clone())
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: Value,
    ) -> Result<ToolCallContent, ToolSourceError> {
        self.calls.lock().await.push((name.to_string(), arguments));
        if !self.tools.iter().any(|t| t.name == name) {
            return Err(ToolSourceError::NotFound(name.to_string()));
        }
        match &self.fail_with {
            Some(msg) => Err(ToolSourceError::Transport(msg.clone())),
            None => Ok(ToolCallContent {
                text: self.result.clone(),
            }),
        }
    }
}
