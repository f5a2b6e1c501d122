//! Terminal formatting for turn events and the `memory` command.

use parley::{ChatState, LlmUsage, Message, StreamEvent};

/// Tool output longer than this is cut in the live view (the model still sees all of it).
pub const TOOL_OUTPUT_MAX_CHARS: usize = 1000;

/// Truncates to at most `max` chars, appending "..." when cut. UTF-8 safe.
pub fn truncate_display(s: &str, max: usize) -> String {
    const SUFFIX: &str = "...";
    if s.chars().count() <= max {
        return s.to_string();
    }
    if max <= SUFFIX.len() {
        return s.chars().take(max).collect();
    }
    format!(
        "{}{}",
        s.chars().take(max - SUFFIX.len()).collect::<String>(),
        SUFFIX
    )
}

/// Startup banner.
pub fn banner(thread_id: &str, web_search: bool) -> String {
    let mut lines = vec![
        "Starting parley chat...".to_string(),
        format!(
            "[Memory Status] In-memory session '{}': state will be lost when program exits",
            thread_id
        ),
    ];
    if !web_search {
        lines.push("[Web search disabled: set TAVILY_API_KEY to enable it]".to_string());
    }
    lines.push(
        "Type 'memory' to see conversation history, 'clear' to clear memory, or 'exit' to quit"
            .to_string(),
    );
    lines.join("\n")
}

/// Live output for one event, or `None` when the event is not shown.
///
/// Tool requests print `[Using Tool: name]` and `Tool Input: args`; tool results print
/// `Tool Output: ...` (failures included, their text says what went wrong); the final reply
/// prints `Assistant: ...`.
pub fn format_event(event: &StreamEvent) -> Option<String> {
    match event {
        StreamEvent::Message { message, .. } => match message {
            Message::Assistant {
                content,
                tool_calls,
            } if !tool_calls.is_empty() => {
                let mut lines = Vec::new();
                if !content.trim().is_empty() {
                    lines.push(format!("Assistant: {}", content.trim()));
                }
                for tc in tool_calls {
                    lines.push(format!("[Using Tool: {}]", tc.name));
                    lines.push(format!("Tool Input: {}", tc.arguments));
                }
                Some(lines.join("\n"))
            }
            Message::Assistant { content, .. } => Some(format!("\nAssistant: {}", content)),
            Message::Tool { content, .. } => Some(format!(
                "Tool Output: {}",
                truncate_display(content, TOOL_OUTPUT_MAX_CHARS)
            )),
            Message::User(_) | Message::System(_) => None,
        },
        StreamEvent::Usage(_) | StreamEvent::NodeEnter { .. } => None,
    }
}

/// Token usage line printed after a reply in verbose mode.
pub fn format_usage(usage: &LlmUsage) -> String {
    format!(
        "[Usage] prompt={} completion={} total={}",
        usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
    )
}

/// One history line for the `memory` command.
pub fn format_history_line(message: &Message) -> String {
    match message {
        Message::System(s) => format!("System: {}", s),
        Message::User(s) => format!("User: {}", s),
        Message::Assistant {
            content,
            tool_calls,
        } => {
            if tool_calls.is_empty() {
                format!("Assistant: {}", content)
            } else {
                let calls: Vec<String> = tool_calls
                    .iter()
                    .map(|tc| format!("{}({})", tc.name, tc.arguments))
                    .collect();
                if content.is_empty() {
                    format!("Assistant: [tool calls: {}]", calls.join(", "))
                } else {
                    format!("Assistant: {} [tool calls: {}]", content, calls.join(", "))
                }
            }
        }
        Message::Tool { name, content, .. } => {
            format!("Tool({}): {}", name, truncate_display(content, TOOL_OUTPUT_MAX_CHARS))
        }
    }
}

/// Output of the `memory` command.
pub fn format_memory(state: &ChatState) -> String {
    if state.is_empty() {
        return "\n[Memory State] No messages in memory yet".to_string();
    }
    let mut out = format!(
        "\n[Memory State]\nTotal messages: {}\n\nConversation history:",
        state.len()
    );
    for m in &state.messages {
        out.push('\n');
        out.push_str(&format_history_line(m));
    }
    if let Some(u) = &state.total_usage {
        out.push_str(&format!("\n\nTokens used: {}", u.total_tokens));
    }
    out
}
