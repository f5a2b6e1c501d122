//! Events emitted while a turn runs.
//!
//! Informational only: an event for a message does not mean the turn was committed.

use tokio::sync::mpsc;

use crate::llm::LlmUsage;
use crate::message::Message;

/// One event of a running turn, in the order things happened.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// A node is about to run (`chatbot` or `tools`).
    NodeEnter { node: String },
    /// A message was appended to the working state. `node` is `__start__` for the user input.
    Message { node: String, message: Message },
    /// Token usage of one model call.
    Usage(LlmUsage),
}

/// Sends `event` if a consumer is attached. A dropped receiver is ignored.
pub(crate) async fn emit(tx: Option<&mpsc::Sender<StreamEvent>>, event: StreamEvent) {
    if let Some(tx) = tx {
        let _ = tx.send(event).await;
    }
}
