//! Interactive loop: read a line, run a turn or a command, print the result.

use std::future::Future;
use std::io::Write;

use parley::{ChatRunner, RunnableConfig, StreamEvent};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;

use crate::display;

pub const DEFAULT_THREAD_ID: &str = "main_thread";

const PROMPT: &str = "User: ";
const EVENT_BUFFER: usize = 64;

#[derive(Debug, thiserror::Error)]
pub enum ReplError {
    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// One parsed input line. Command words are matched case-insensitively after trimming.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReplCommand {
    Exit,
    Memory,
    Clear,
    Empty,
    Chat(String),
}

impl ReplCommand {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return ReplCommand::Empty;
        }
        match trimmed.to_lowercase().as_str() {
            "exit" | "quit" => ReplCommand::Exit,
            "memory" => ReplCommand::Memory,
            "clear" => ReplCommand::Clear,
            _ => ReplCommand::Chat(trimmed.to_string()),
        }
    }
}

enum Step {
    Continue,
    Stop,
}

/// REPL bound to one runner and one session thread.
pub struct Repl {
    runner: ChatRunner,
    config: RunnableConfig,
    verbose: bool,
}

impl Repl {
    pub fn new(runner: ChatRunner, thread_id: impl Into<String>) -> Self {
        Self {
            runner,
            config: RunnableConfig::for_thread(thread_id),
            verbose: false,
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn runner(&self) -> &ChatRunner {
        &self.runner
    }

    pub fn config(&self) -> &RunnableConfig {
        &self.config
    }

    /// Runs until `exit`/`quit`, end of input, or `interrupt` resolves (Ctrl-C in the binary).
    ///
    /// A failed turn prints `Error: ...` and the loop keeps going; only terminal I/O errors
    /// end it early.
    pub async fn run<R, W, F>(&self, input: R, out: &mut W, interrupt: F) -> Result<(), ReplError>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
        F: Future<Output = ()>,
    {
        tokio::pin!(interrupt);
        let mut lines = input.lines();
        loop {
            write!(out, "\n{}", PROMPT)?;
            out.flush()?;
            let line = tokio::select! {
                _ = &mut interrupt => None,
                next = lines.next_line() => next?,
            };
            let Some(line) = line else {
                writeln!(out, "\nExiting...")?;
                return Ok(());
            };
            let step = match ReplCommand::parse(&line) {
                ReplCommand::Empty => Step::Continue,
                ReplCommand::Exit => {
                    writeln!(out, "Exiting...")?;
                    Step::Stop
                }
                ReplCommand::Memory => {
                    self.show_memory(out).await?;
                    Step::Continue
                }
                ReplCommand::Clear => {
                    self.clear(out).await?;
                    Step::Continue
                }
                ReplCommand::Chat(text) => self.chat(&text, out, &mut interrupt).await?,
            };
            if let Step::Stop = step {
                return Ok(());
            }
        }
    }

    async fn show_memory<W: Write>(&self, out: &mut W) -> Result<(), ReplError> {
        match self.runner.get_state(&self.config).await {
            Ok(state) => writeln!(out, "{}", display::format_memory(&state))?,
            Err(e) => writeln!(out, "Error: {}", e)?,
        }
        Ok(())
    }

    async fn clear<W: Write>(&self, out: &mut W) -> Result<(), ReplError> {
        match self.runner.clear(&self.config).await {
            Ok(_) => writeln!(out, "\n[Memory cleared]")?,
            Err(e) => writeln!(out, "Error: {}", e)?,
        }
        Ok(())
    }

    /// One turn with live event output. Events are printed in emission order, before the
    /// turn result is handled.
    async fn chat<W, F>(
        &self,
        text: &str,
        out: &mut W,
        interrupt: &mut std::pin::Pin<&mut F>,
    ) -> Result<Step, ReplError>
    where
        W: Write,
        F: Future<Output = ()>,
    {
        let (tx, mut rx) = mpsc::channel::<StreamEvent>(EVENT_BUFFER);
        let turn = self.runner.run_turn_stream(&self.config, text, Some(tx));
        tokio::pin!(turn);

        let result = loop {
            tokio::select! {
                biased;
                Some(event) = rx.recv() => self.print_event(out, &event)?,
                res = &mut turn => break Some(res),
                _ = interrupt.as_mut() => break None,
            }
        };
        while let Ok(event) = rx.try_recv() {
            self.print_event(out, &event)?;
        }

        match result {
            None => {
                writeln!(out, "\nExiting...")?;
                Ok(Step::Stop)
            }
            Some(Ok(outcome)) => {
                tracing::debug!(
                    tool_rounds = outcome.tool_rounds,
                    new_messages = outcome.new_messages.len(),
                    "turn finished"
                );
                if self.verbose {
                    if let Some(usage) = &outcome.usage {
                        writeln!(out, "{}", display::format_usage(usage))?;
                    }
                }
                Ok(Step::Continue)
            }
            Some(Err(e)) => {
                tracing::warn!(error = %e, "turn failed");
                writeln!(out, "Error: {}", e)?;
                Ok(Step::Continue)
            }
        }
    }

    fn print_event<W: Write>(&self, out: &mut W, event: &StreamEvent) -> Result<(), ReplError> {
        if let Some(text) = display::format_event(event) {
            writeln!(out, "{}", text)?;
            out.flush()?;
        }
        Ok(())
    }
}
