//! Agent execution error types.

use thiserror::Error;

use crate::memory::CheckpointError;

/// Error of a single chat turn.
///
/// Any variant aborts the turn; the runner commits nothing for a failed turn.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Execution failed with a message (LLM call failed, malformed response, ...).
    #[error("execution failed: {0}")]
    ExecutionFailed(String),

    /// The model kept requesting tools past the per-turn limit.
    #[error("model requested more than {limit} tool rounds in one turn")]
    MaxToolRoundsExceeded { limit: usize },

    /// Loading or saving the session failed.
    #[error("session store: {0}")]
    Checkpoint(#[from] CheckpointError),
}
