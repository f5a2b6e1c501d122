//! Think node: send the whole history to the LLM, append one assistant message.

use std::sync::Arc;

use tracing::debug;

use crate::error::AgentError;
use crate::llm::{LlmClient, LlmUsage};
use crate::message::Message;
use crate::state::ChatState;

/// Assistant text used when the model returns neither content nor tool calls.
pub const EMPTY_RESPONSE_FALLBACK: &str = "(The model returned an empty response.)";

/// Think node (`chatbot`): one model step.
///
/// **Interaction**: Driven by `ChatRunner`; holds `Arc<dyn LlmClient>`.
pub struct ThinkNode {
    llm: Arc<dyn LlmClient>,
    system_prompt: Option<String>,
}

impl ThinkNode {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            llm,
            system_prompt: None,
        }
    }

    /// Sent as a leading system message on every call; never stored in the state.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn id(&self) -> &'static str {
        super::CHATBOT_NODE
    }

    /// Calls the LLM with the full history and appends exactly one assistant message.
    /// Tool calls without an id get a generated one. Returns the call's usage when reported.
    ///
    /// On error nothing is appended; the caller discards the working state.
    pub async fn run(&self, mut state: ChatState) -> Result<(ChatState, Option<LlmUsage>), AgentError> {
        let response = match &self.system_prompt {
            Some(prompt) => {
                let mut messages = Vec::with_capacity(state.messages.len() + 1);
                messages.push(Message::system(prompt.as_str()));
                messages.extend(state.messages.iter().cloned());
                self.llm.invoke(&messages).await?
            }
            None => self.llm.invoke(&state.messages).await?,
        };

        let mut tool_calls = response.tool_calls;
        for tc in tool_calls.iter_mut().filter(|tc| tc.id.is_empty()) {
            tc.id = format!("call_{}", uuid::Uuid::new_v4().simple());
        }
        let content = if response.content.is_empty() && tool_calls.is_empty() {
            EMPTY_RESPONSE_FALLBACK.to_string()
        } else {
            response.content
        };
        debug!(
            history = state.messages.len(),
            tool_calls = tool_calls.len(),
            content_len = content.len(),
            "think"
        );

        state.push_messages([Message::assistant_with_tool_calls(content, tool_calls)]);
        if let Some(usage) = &response.usage {
            state.add_usage(usage);
        }
        Ok((state, response.usage))
    }
}
