//! Session store: conversation state keyed by thread id.
//!
//! `Checkpointer` is the seam; `MemorySaver` keeps everything in process memory and loses it
//! on exit.

mod checkpoint;
mod checkpointer;
mod config;
mod memory_saver;

pub use checkpoint::Checkpoint;
pub use checkpointer::{CheckpointError, Checkpointer};
pub use config::RunnableConfig;
pub use memory_saver::MemorySaver;
