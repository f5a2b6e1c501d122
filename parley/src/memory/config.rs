//! Per-call config identifying the session.

/// Identifies the conversation a turn belongs to.
///
/// **Interaction**: Passed to `ChatRunner::run_turn` and to every `Checkpointer` call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunnableConfig {
    /// Required by every checkpointer operation.
    pub thread_id: Option<String>,
}

impl RunnableConfig {
    pub fn for_thread(thread_id: impl Into<String>) -> Self {
        Self {
            thread_id: Some(thread_id.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_has_no_thread() {
        assert!(RunnableConfig::default().thread_id.is_none());
        assert_eq!(
            RunnableConfig::for_thread("main_thread").thread_id.as_deref(),
            Some("main_thread")
        );
    }
}
