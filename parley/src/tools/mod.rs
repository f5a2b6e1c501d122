//! Tools the chat agent can call, and the registry that exposes them as a `ToolSource`.

mod aggregate_source;
mod registry;
mod tavily;
mod r#trait;

pub use aggregate_source::AggregateToolSource;
pub use r#trait::Tool;
pub use registry::ToolRegistry;
pub use tavily::{SearchResult, TavilySearchTool, TAVILY_SEARCH_URL, TOOL_TAVILY_SEARCH};
