//! Terminal front end for parley: the interactive loop, its output formatting, and logging.

pub mod display;
pub mod logging;
pub mod repl;

pub use repl::{Repl, ReplCommand, ReplError, DEFAULT_THREAD_ID};
