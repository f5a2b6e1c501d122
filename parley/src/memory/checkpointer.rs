use async_trait::async_trait;
use thiserror::Error;

use crate::memory::checkpoint::Checkpoint;
use crate::memory::config::RunnableConfig;

#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("thread_id required")]
    ThreadIdRequired,
    #[error("storage: {0}")]
    Storage(String),
}

/// Stores the latest checkpoint of each thread.
///
/// **Interaction**: Owned by `ChatRunner` as `Arc<dyn Checkpointer<ChatState>>`; `get` before a
/// turn, `put` only after the turn succeeded, `delete_thread` for the `clear` command.
#[async_trait]
pub trait Checkpointer<S>: Send + Sync
where
    S: Clone + Send + Sync + 'static,
{
    /// Replaces the thread's checkpoint. Returns the checkpoint id.
    async fn put(&self, config: &RunnableConfig, checkpoint: &Checkpoint<S>)
        -> Result<String, CheckpointError>;

    /// Latest checkpoint, `None` for a thread never written (or cleared).
    async fn get(&self, config: &RunnableConfig) -> Result<Option<Checkpoint<S>>, CheckpointError>;

    /// Forgets the thread. Returns whether anything was stored.
    async fn delete_thread(&self, config: &RunnableConfig) -> Result<bool, CheckpointError>;
}
