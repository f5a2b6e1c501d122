//! Conversation state and tool call types.

mod chat_state;

pub use chat_state::{add_messages, ChatState, ToolCall};
