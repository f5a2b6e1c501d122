//! Mock LLM for tests and offline runs.
//!
//! Returns scripted responses in order, repeating the last one, or fails every call.
//! Records the history it received so tests can check that the whole context is sent.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::AgentError;
use crate::llm::{LlmClient, LlmResponse};
use crate::message::Message;
use crate::state::ToolCall;
use crate::tools::TOOL_TAVILY_SEARCH;

/// Mock LLM with a fixed script of responses.
///
/// **Interaction**: Implements `LlmClient`; used by ThinkNode in tests.
pub struct MockLlm {
    script: Vec<LlmResponse>,
    fail_with: Option<String>,
    calls: AtomicUsize,
    received: Mutex<Vec<Vec<Message>>>,
}

fn search_call(query: &str) -> ToolCall {
    ToolCall::new(
        "call-1",
        TOOL_TAVILY_SEARCH,
        serde_json::json!({ "query": query }).to_string(),
    )
}

impl MockLlm {
    /// Script of responses; call `n` gets `script[n]`, calls past the end repeat the last entry.
    pub fn scripted(script: Vec<LlmResponse>) -> Self {
        Self {
            script,
            fail_with: None,
            calls: AtomicUsize::new(0),
            received: Mutex::new(Vec::new()),
        }
    }

    /// Every call returns this content and these tool calls.
    pub fn new(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self::scripted(vec![LlmResponse {
            content: content.into(),
            tool_calls,
            usage: None,
        }])
    }

    /// Every call returns plain text (END path).
    pub fn with_no_tool_calls(content: impl Into<String>) -> Self {
        Self::new(content, vec![])
    }

    /// Every call requests one web search; never finishes a turn on its own.
    pub fn with_search_call(query: &str) -> Self {
        Self::new("Let me search for that.", vec![search_call(query)])
    }

    /// First call requests a web search, later calls answer in plain text.
    pub fn first_tools_then_end() -> Self {
        Self::scripted(vec![
            LlmResponse {
                content: String::new(),
                tool_calls: vec![search_call("weather today")],
                usage: None,
            },
            LlmResponse {
                content: "Here is what I found.".to_string(),
                tool_calls: vec![],
                usage: None,
            },
        ])
    }

    /// Every call fails with `ExecutionFailed(message)`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            fail_with: Some(message.into()),
            ..Self::scripted(vec![])
        }
    }

    /// Number of `invoke` calls so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Message histories received, one entry per call.
    pub async fn received(&self) -> Vec<Vec<Message>> {
        self.received.lock().await.clone()
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, AgentError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        self.received.lock().await.push(messages.to_vec());
        if let Some(msg) = &self.fail_with {
            return Err(AgentError::ExecutionFailed(msg.clone()));
        }
        let idx = n.min(self.script.len().saturating_sub(1));
        self.script
            .get(idx)
            .cloned()
            .ok_or_else(|| AgentError::ExecutionFailed("mock llm has an empty script".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_repeats_last_response() {
        let llm = MockLlm::first_tools_then_end();
        let first = llm.invoke(&[Message::user("q")]).await.unwrap();
        assert_eq!(first.tool_calls.len(), 1);
        for _ in 0..2 {
            let next = llm.invoke(&[Message::user("q")]).await.unwrap();
            assert!(next.tool_calls.is_empty());
            assert_eq!(next.content, "Here is what I found.");
        }
        assert_eq!(llm.call_count(), 3);
    }

    #[tokio::test]
    async fn failing_returns_execution_failed() {
        let llm = MockLlm::failing("401 unauthorized");
        let err = llm.invoke(&[]).await.unwrap_err();
        assert!(err.to_string().contains("401 unauthorized"));
        assert_eq!(llm.call_count(), 1);
    }

    #[tokio::test]
    async fn records_received_history() {
        let llm = MockLlm::with_no_tool_calls("ok");
        llm.invoke(&[Message::user("a")]).await.unwrap();
        llm.invoke(&[Message::user("a"), Message::assistant("ok"), Message::user("b")])
            .await
            .unwrap();
        let seen = llm.received().await;
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1].len(), 3);
    }

    #[tokio::test]
    async fn empty_script_is_an_error() {
        let llm = MockLlm::scripted(vec![]);
        assert!(llm.invoke(&[]).await.is_err());
    }
}
