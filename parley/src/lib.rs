//! # Parley
//!
//! A small tool-using chat agent: the whole conversation goes to an LLM, the model may ask
//! for web searches, tool results are fed back, and the final reply is stored per thread in
//! an in-memory session store.
//!
//! ## Main modules
//!
//! - [`agent::chat`]: [`ThinkNode`], [`ActNode`], [`tools_condition`], [`ChatRunner`].
//! - [`llm`]: [`LlmClient`], [`MockLlm`], [`ChatOpenAI`] (OpenAI / Azure OpenAI).
//! - [`tool_source`] / [`tools`]: [`ToolSource`], [`AggregateToolSource`], [`TavilySearchTool`].
//! - [`memory`]: [`Checkpointer`], [`MemorySaver`], [`RunnableConfig`].
//! - [`stream`]: [`StreamEvent`] emitted while a turn runs.
//! - [`graph`]: pipeline topology and DOT/PNG export.
//! - [`config`]: [`ChatConfig`] read from the environment at startup.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use parley::{ChatRunner, MockLlm, RunnableConfig};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), parley::AgentError> {
//! let runner = ChatRunner::in_memory(Arc::new(MockLlm::with_no_tool_calls("Hello!")), None);
//! let cfg = RunnableConfig::for_thread("main_thread");
//! let outcome = runner.run_turn(&cfg, "Hi").await?;
//! assert_eq!(outcome.reply, "Hello!");
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod config;
pub mod error;
pub mod graph;
pub mod llm;
pub mod memory;
pub mod message;
pub mod state;
pub mod stream;
pub mod tool_source;
pub mod tools;

pub use agent::chat::{
    build_chat_runner, tools_condition, ActNode, ChatRunner, ThinkNode,
    ToolsConditionResult, TurnOutcome, CHATBOT_NODE, DEFAULT_MAX_TOOL_ROUNDS, TOOLS_NODE,
};
pub use config::{ChatConfig, ConfigError, Provider};
pub use error::AgentError;
pub use graph::{generate_dot, generate_text, render_graph_image, GraphTopology, END, START};
pub use llm::{ChatOpenAI, LlmClient, LlmResponse, LlmUsage, MockLlm, ToolChoiceMode};
pub use memory::{Checkpoint, CheckpointError, Checkpointer, MemorySaver, RunnableConfig};
pub use message::{Message, Role};
pub use state::{ChatState, ToolCall};
pub use stream::StreamEvent;
pub use tool_source::{
    MockToolSource, ToolCallContent, ToolSource, ToolSourceError, ToolSpec, WebSearchToolsSource,
};
pub use tools::{AggregateToolSource, TavilySearchTool, Tool, ToolRegistry};

#[cfg(test)]
mod test_logging {
    use tracing_subscriber::EnvFilter;

    #[ctor::ctor]
    fn init_test_logging() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    }
}
