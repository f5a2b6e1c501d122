//! Tool source abstraction: list tools and call a tool.
//!
//! The chat agent depends on `ToolSource` instead of a concrete registry. Implementations:
//! `MockToolSource` (tests), `AggregateToolSource` (registry of `Tool`s) and
//! `WebSearchToolsSource` (Tavily search behind one constructor).

mod mock;
mod web_search_source;

pub use mock::MockToolSource;
pub use web_search_source::WebSearchToolsSource;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Tool specification: what the model is told about a tool.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ToolSpec {
    pub name: String,
    /// Human-readable description for the LLM.
    pub description: Option<String>,
    /// JSON Schema of the arguments object.
    pub input_schema: Value,
}

/// Text result of a single tool call.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallContent {
    pub text: String,
}

/// Errors from listing or calling tools.
///
/// **Interaction**: ActNode renders every variant into a tool-result message; none of them
/// aborts a turn.
#[derive(Debug, Error)]
pub enum ToolSourceError {
    #[error("tool not found: {0}")]
    NotFound(String),
    #[error("invalid arguments: {0}")]
    InvalidInput(String),
    #[error("transport error: {0}")]
    Transport(String),
}

/// Tool source: list tools and call a tool by name with JSON arguments.
///
/// **Interaction**: `list_tools` feeds the specs bound to the LLM client at startup;
/// ActNode uses `call_tool` for every requested call.
#[async_trait]
pub trait ToolSource: Send + Sync {
    async fn list_tools(&self) -> Result<Vec<ToolSpec>, ToolSourceError>;

    async fn call_tool(&self, name: &str, arguments: Value)
        -> Result<ToolCallContent, ToolSourceError>;
}
