//! Tool-using chat agent: Think (model step) → tools_condition → Act (tool invoker) → Think ...
//!
//! # Nodes
//!
//! - **[`ThinkNode`]** (`chatbot`): sends the whole history to the LLM, appends exactly one
//!   assistant message.
//! - **[`ActNode`]** (`tools`): runs every tool call of the latest assistant message and
//!   appends one tool message per call, in request order.
//! - **[`tools_condition`]**: routes to `tools` when the latest message carries tool calls,
//!   otherwise to `__end__`.
//!
//! [`ChatRunner`] drives the loop for one user turn and owns the session store.

mod act_node;
mod build;
mod runner;
mod think_node;

pub use act_node::{ActNode, DEFAULT_EXECUTION_ERROR_TEMPLATE};
pub use build::build_chat_runner;
pub use runner::{ChatRunner, TurnOutcome, DEFAULT_MAX_TOOL_ROUNDS};
pub use think_node::{ThinkNode, EMPTY_RESPONSE_FALLBACK};

use crate::graph::END;
use crate::state::ChatState;

/// Node id of the model step.
pub const CHATBOT_NODE: &str = "chatbot";
/// Node id of the tool invoker.
pub const TOOLS_NODE: &str = "tools";

/// Output of [`tools_condition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolsConditionResult {
    /// Route to the tool invoker.
    Tools,
    /// End the turn.
    End,
}

impl ToolsConditionResult {
    /// `Tools` -> `"tools"`, `End` -> `"__end__"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tools => TOOLS_NODE,
            Self::End => END,
        }
    }
}

/// Routes to `Tools` iff the latest message is an assistant message with at least one
/// tool call. Pure; reads nothing but `state.messages`.
pub fn tools_condition(state: &ChatState) -> ToolsConditionResult {
    if state.pending_tool_calls().is_empty() {
        ToolsConditionResult::End
    } else {
        ToolsConditionResult::Tools
    }
}
