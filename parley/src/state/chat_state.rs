//! Chat state: the append-only message log plus accumulated token usage.
//!
//! ThinkNode appends one assistant message per call, ActNode appends one tool message per
//! requested call. Nothing ever removes messages from a live state; `clear` drops the
//! whole session from the store instead.

use serde::{Deserialize, Serialize};

use crate::llm::LlmUsage;
use crate::message::Message;

/// A single tool invocation requested by the model.
///
/// `id` links the request to the `Message::Tool` that answers it. `arguments` is the raw
/// JSON text the model produced; ActNode parses it right before calling the tool.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: String,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }
}

/// State of one conversation (one thread id).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatState {
    /// Chronological conversation history.
    pub messages: Vec<Message>,
    /// Token usage summed over every model call of the session, when the provider reports it.
    #[serde(default)]
    pub total_usage: Option<LlmUsage>,
}

/// Append reducer for message lists: `left` followed by `right`, order preserved.
pub fn add_messages(mut left: Vec<Message>, right: impl IntoIterator<Item = Message>) -> Vec<Message> {
    left.extend(right);
    left
}

impl ChatState {
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Appends messages through [`add_messages`].
    pub fn push_messages(&mut self, new: impl IntoIterator<Item = Message>) {
        let messages = std::mem::take(&mut self.messages);
        self.messages = add_messages(messages, new);
    }

    /// Content of the chronologically last assistant message. An assistant message that
    /// only carried tool calls yields `Some("")`; `None` when there is none at all.
    pub fn last_assistant_reply(&self) -> Option<&str> {
        self.messages.iter().rev().find_map(|m| match m {
            Message::Assistant { content, .. } => Some(content.as_str()),
            _ => None,
        })
    }

    /// Tool calls still waiting for results: those of the latest message, if it is an
    /// assistant message.
    pub fn pending_tool_calls(&self) -> &[ToolCall] {
        self.messages.last().map(Message::tool_calls).unwrap_or(&[])
    }

    pub(crate) fn add_usage(&mut self, usage: &LlmUsage) {
        self.total_usage
            .get_or_insert_with(LlmUsage::default)
            .accumulate(usage);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_messages_appends_in_order() {
        let merged = add_messages(
            vec![Message::user("a")],
            vec![Message::assistant("b"), Message::user("c")],
        );
        let contents: Vec<_> = merged.iter().map(Message::content).collect();
        assert_eq!(contents, ["a", "b", "c"]);
    }

    /// **Scenario**: last_assistant_reply skips tool messages and returns "" for tool-only replies.
    #[test]
    fn last_assistant_reply_semantics() {
        let mut state = ChatState::default();
        assert_eq!(state.last_assistant_reply(), None);
        state.push_messages([
            Message::user("q"),
            Message::assistant_with_tool_calls("", vec![ToolCall::new("c1", "t", "{}")]),
            Message::tool("c1", "t", "out"),
        ]);
        assert_eq!(state.last_assistant_reply(), Some(""));
        state.push_messages([Message::assistant("done")]);
        assert_eq!(state.last_assistant_reply(), Some("done"));
    }

    /// **Scenario**: pending tool calls exist only while the assistant message is the last one.
    #[test]
    fn pending_tool_calls_only_on_last_assistant() {
        let mut state = ChatState::default();
        state.push_messages([
            Message::user("q"),
            Message::assistant_with_tool_calls("", vec![ToolCall::new("c1", "t", "{}")]),
        ]);
        assert_eq!(state.pending_tool_calls().len(), 1);
        state.push_messages([Message::tool("c1", "t", "out")]);
        assert!(state.pending_tool_calls().is_empty());
    }

    #[test]
    fn add_usage_accumulates() {
        let mut state = ChatState::default();
        let u = LlmUsage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        };
        state.add_usage(&u);
        state.add_usage(&u);
        assert_eq!(state.total_usage.as_ref().map(|u| u.total_tokens), Some(30));
    }

    /// **Scenario**: a long session's running total stops at the counter limit instead of overflowing.
    #[test]
    fn add_usage_saturates_session_total() {
        let mut state = ChatState {
            total_usage: Some(LlmUsage {
                prompt_tokens: u32::MAX,
                completion_tokens: u32::MAX - 3,
                total_tokens: u32::MAX,
            }),
            ..Default::default()
        };
        state.add_usage(&LlmUsage {
            prompt_tokens: 1,
            completion_tokens: 1,
            total_tokens: 2,
        });
        let total = state.total_usage.unwrap();
        assert_eq!(total.prompt_tokens, u32::MAX);
        assert_eq!(total.completion_tokens, u32::MAX - 2);
        assert_eq!(total.total_tokens, u32::MAX);
    }
}
