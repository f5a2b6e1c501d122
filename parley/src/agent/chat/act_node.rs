//! Act node: run the tool calls of the latest assistant message, append tool messages.
//!
//! Tool failures never abort a turn. Each error (unknown tool, bad arguments, transport)
//! becomes a tool message with `is_error = true`, rendered from
//! [`DEFAULT_EXECUTION_ERROR_TEMPLATE`].

use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::message::Message;
use crate::state::ChatState;
use crate::tool_source::{ToolSource, ToolSourceError};

/// Error text for a failed tool call, with tool name and arguments.
pub const DEFAULT_EXECUTION_ERROR_TEMPLATE: &str =
    "Error executing tool '{tool_name}' with kwargs {tool_kwargs} with error:\n {error}\n Please fix the error and try again.";

fn truncate_for_log(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        format!("{}...", s.chars().take(max_len).collect::<String>())
    }
}

/// Parses `ToolCall.arguments` to JSON. Empty or malformed input becomes `{}`; a JSON string
/// that itself contains JSON is unwrapped once.
pub(crate) fn parse_tool_arguments(arguments: &str) -> Value {
    let raw = if arguments.trim().is_empty() {
        serde_json::json!({})
    } else {
        match serde_json::from_str(arguments) {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, arguments = %truncate_for_log(arguments, 200), "tool arguments JSON parse failed, using empty object");
                serde_json::json!({})
            }
        }
    };
    match raw.as_str() {
        Some(s) => serde_json::from_str(s).unwrap_or(raw),
        None => raw,
    }
}

/// Act node (`tools`): the tool invoker.
///
/// **Interaction**: Driven by `ChatRunner` after `tools_condition` returned `Tools`.
pub struct ActNode {
    tools: Box<dyn ToolSource>,
}

fn render_tool_error(error: &ToolSourceError, tool_name: &str, tool_args: &Value) -> String {
    DEFAULT_EXECUTION_ERROR_TEMPLATE
        .replace("{tool_name}", tool_name)
        .replace("{tool_kwargs}", &tool_args.to_string())
        .replace("{error}", &error.to_string())
}

impl ActNode {
    pub fn new(tools: Box<dyn ToolSource>) -> Self {
        Self { tools }
    }

    pub fn id(&self) -> &'static str {
        super::TOOLS_NODE
    }

    /// Appends one tool message per pending tool call, in request order, each linked by id.
    /// Calls run sequentially. A state without pending calls is returned unchanged.
    pub async fn run(&self, mut state: ChatState) -> ChatState {
        let calls = state.pending_tool_calls().to_vec();
        let mut results = Vec::with_capacity(calls.len());
        for tc in &calls {
            let args = parse_tool_arguments(&tc.arguments);
            debug!(tool = %tc.name, args = ?args, "Calling tool");
            match self.tools.call_tool(&tc.name, args.clone()).await {
                Ok(content) => {
                    trace!(
                        tool = %tc.name,
                        result_len = content.text.len(),
                        result_preview = %truncate_for_log(&content.text, 200),
                        "Tool returned"
                    );
                    results.push(Message::tool(&tc.id, &tc.name, content.text));
                }
                Err(e) => {
                    warn!(tool = %tc.name, error = %e, "Tool call failed");
                    let text = render_tool_error(&e, &tc.name, &args);
                    results.push(Message::tool_error(&tc.id, &tc.name, text));
                }
            }
        }
        state.push_messages(results);
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ToolCall;
    use crate::tool_source::MockToolSource;

    fn pending(calls: Vec<ToolCall>) -> ChatState {
        ChatState {
            messages: vec![
                Message::user("q"),
                Message::assistant_with_tool_calls("", calls),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn parse_tool_arguments_fallbacks() {
        assert_eq!(parse_tool_arguments(""), serde_json::json!({}));
        assert_eq!(parse_tool_arguments("{not json"), serde_json::json!({}));
        assert_eq!(
            parse_tool_arguments(r#"{"query":"rust"}"#),
            serde_json::json!({ "query": "rust" })
        );
        assert_eq!(
            parse_tool_arguments(r#""{\"query\":\"rust\"}""#),
            serde_json::json!({ "query": "rust" })
        );
        assert_eq!(parse_tool_arguments(r#""plain""#), serde_json::json!("plain"));
    }

    /// **Scenario**: N calls produce N tool messages in request order with matching ids.
    #[tokio::test]
    async fn results_keep_request_order_and_ids() {
        let node = ActNode::new(Box::new(MockToolSource::search_tool("sunny")));
        let calls = vec![
            ToolCall::new("a", "tavily_search", r#"{"query":"one"}"#),
            ToolCall::new("b", "tavily_search", r#"{"query":"two"}"#),
            ToolCall::new("c", "tavily_search", r#"{"query":"three"}"#),
        ];
        let state = node.run(pending(calls)).await;
        let ids: Vec<_> = state.messages[2..]
            .iter()
            .map(|m| match m {
                Message::Tool { tool_call_id, content, .. } => {
                    assert_eq!(content, "sunny");
                    tool_call_id.as_str()
                }
                other => panic!("expected tool message, got {:?}", other),
            })
            .collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    /// **Scenario**: an unknown tool yields an error tool message rendered from the template.
    #[tokio::test]
    async fn unknown_tool_becomes_error_message() {
        let node = ActNode::new(Box::new(MockToolSource::search_tool("sunny")));
        let state = node
            .run(pending(vec![ToolCall::new("x", "launch_rockets", r#"{"n":1}"#)]))
            .await;
        match state.messages.last() {
            Some(Message::Tool { tool_call_id, is_error, content, .. }) => {
                assert_eq!(tool_call_id, "x");
                assert!(*is_error);
                assert!(content.contains("Error executing tool 'launch_rockets'"), "{}", content);
                assert!(content.contains("tool not found"), "{}", content);
            }
            other => panic!("expected tool message, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn transport_error_is_rendered_with_arguments() {
        let node = ActNode::new(Box::new(
            MockToolSource::search_tool("unused").failing("quota exceeded"),
        ));
        let state = node
            .run(pending(vec![ToolCall::new("a", "tavily_search", r#"{"query":"q"}"#)]))
            .await;
        assert_eq!(
            state.messages.last().map(Message::content),
            Some(
                "Error executing tool 'tavily_search' with kwargs {\"query\":\"q\"} with error:\n transport error: quota exceeded\n Please fix the error and try again."
            )
        );
    }

    #[tokio::test]
    async fn no_pending_calls_is_noop() {
        let node = ActNode::new(Box::new(MockToolSource::search_tool("x")));
        let state = ChatState {
            messages: vec![Message::user("q"), Message::assistant("a")],
            ..Default::default()
        };
        let out = node.run(state.clone()).await;
        assert_eq!(out, state);
    }
}
