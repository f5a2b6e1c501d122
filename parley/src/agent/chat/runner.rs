//! Turn driver: user input → Think → (Act → Think)* → commit.
//!
//! A turn works on a copy of the stored state and is committed to the checkpointer only
//! when it ends normally. Model errors and the tool-round cap abort the turn and leave the
//! session exactly as it was.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, warn};

use super::{tools_condition, ActNode, ThinkNode, ToolsConditionResult};
use crate::error::AgentError;
use crate::graph::{GraphTopology, START};
use crate::llm::{LlmClient, LlmUsage};
use crate::memory::{Checkpoint, Checkpointer, MemorySaver, RunnableConfig};
use crate::message::Message;
use crate::state::ChatState;
use crate::stream::{emit, StreamEvent};
use crate::tool_source::ToolSource;
use crate::tools::AggregateToolSource;

/// Tool rounds allowed per turn unless configured otherwise.
pub const DEFAULT_MAX_TOOL_ROUNDS: usize = 10;

/// Result of a committed turn.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// Content of the final assistant message.
    pub reply: String,
    /// Messages this turn appended, user input first.
    pub new_messages: Vec<Message>,
    /// Number of Act rounds that ran.
    pub tool_rounds: usize,
    /// Usage summed over this turn's model calls, when reported.
    pub usage: Option<LlmUsage>,
    /// Session state after the commit.
    pub state: ChatState,
}

/// Runs chat turns and owns the session store.
///
/// Turns on the same thread id are serialized; different threads never share state.
///
/// **Interaction**: Built by `build_chat_runner` (or by hand in tests); driven by the CLI REPL.
pub struct ChatRunner {
    think: ThinkNode,
    act: ActNode,
    has_tools: bool,
    checkpointer: Arc<dyn Checkpointer<ChatState>>,
    max_tool_rounds: usize,
    turn_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl ChatRunner {
    /// `tools = None` runs a plain chatbot; any tool call the model still makes is answered
    /// with a not-found error message.
    pub fn new(
        llm: Arc<dyn LlmClient>,
        tools: Option<Box<dyn ToolSource>>,
        checkpointer: Arc<dyn Checkpointer<ChatState>>,
    ) -> Self {
        let has_tools = tools.is_some();
        let tools = tools.unwrap_or_else(|| Box::new(AggregateToolSource::new()));
        Self {
            think: ThinkNode::new(llm),
            act: ActNode::new(tools),
            has_tools,
            checkpointer,
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
            turn_locks: DashMap::new(),
        }
    }

    /// Runner with a fresh in-memory store.
    pub fn in_memory(llm: Arc<dyn LlmClient>, tools: Option<Box<dyn ToolSource>>) -> Self {
        Self::new(llm, tools, Arc::new(MemorySaver::new()))
    }

    pub fn with_max_tool_rounds(mut self, max_tool_rounds: usize) -> Self {
        self.max_tool_rounds = max_tool_rounds;
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.think = self.think.with_system_prompt(prompt);
        self
    }

    pub fn max_tool_rounds(&self) -> usize {
        self.max_tool_rounds
    }

    pub fn has_tools(&self) -> bool {
        self.has_tools
    }

    /// Pipeline shape for visualization.
    pub fn topology(&self) -> GraphTopology {
        GraphTopology::chat(self.think.id(), self.has_tools.then(|| self.act.id()))
    }

    /// Stored state of the thread; empty when the thread was never used or was cleared.
    pub async fn get_state(&self, config: &RunnableConfig) -> Result<ChatState, AgentError> {
        Ok(self
            .checkpointer
            .get(config)
            .await?
            .map(|cp| cp.state)
            .unwrap_or_default())
    }

    /// Forgets the thread. Returns whether it had any stored state.
    pub async fn clear(&self, config: &RunnableConfig) -> Result<bool, AgentError> {
        let lock = self.thread_lock(config);
        let _guard = lock.lock().await;
        Ok(self.checkpointer.delete_thread(config).await?)
    }

    fn thread_lock(&self, config: &RunnableConfig) -> Arc<Mutex<()>> {
        let key = config.thread_id.clone().unwrap_or_default();
        self.turn_locks.entry(key).or_default().clone()
    }

    /// Runs one turn without streaming.
    pub async fn run_turn(
        &self,
        config: &RunnableConfig,
        input: &str,
    ) -> Result<TurnOutcome, AgentError> {
        self.run_turn_stream(config, input, None).await
    }

    /// Runs one turn, emitting [`StreamEvent`]s to `events` as messages are appended.
    pub async fn run_turn_stream(
        &self,
        config: &RunnableConfig,
        input: &str,
        events: Option<mpsc::Sender<StreamEvent>>,
    ) -> Result<TurnOutcome, AgentError> {
        let lock = self.thread_lock(config);
        let _guard = lock.lock().await;
        let events = events.as_ref();

        let previous = self.checkpointer.get(config).await?;
        let step = previous.as_ref().map(|cp| cp.step).unwrap_or(0) + 1;
        let mut state = previous.map(|cp| cp.state).unwrap_or_default();
        let start_len = state.len();

        let user = Message::user(input);
        state.push_messages([user.clone()]);
        emit(
            events,
            StreamEvent::Message {
                node: START.to_string(),
                message: user,
            },
        )
        .await;

        let mut tool_rounds = 0;
        let mut usage: Option<LlmUsage> = None;
        loop {
            emit(events, StreamEvent::NodeEnter { node: self.think.id().to_string() }).await;
            let (next, call_usage) = self.think.run(state).await?;
            state = next;
            if let Some(u) = call_usage {
                usage.get_or_insert_with(LlmUsage::default).accumulate(&u);
                emit(events, StreamEvent::Usage(u)).await;
            }
            if let Some(msg) = state.messages.last() {
                emit(
                    events,
                    StreamEvent::Message {
                        node: self.think.id().to_string(),
                        message: msg.clone(),
                    },
                )
                .await;
            }

            if tools_condition(&state) == ToolsConditionResult::End {
                break;
            }
            if tool_rounds >= self.max_tool_rounds {
                warn!(
                    thread_id = ?config.thread_id,
                    limit = self.max_tool_rounds,
                    "tool round limit reached, turn discarded"
                );
                return Err(AgentError::MaxToolRoundsExceeded {
                    limit: self.max_tool_rounds,
                });
            }

            emit(events, StreamEvent::NodeEnter { node: self.act.id().to_string() }).await;
            let before = state.len();
            state = self.act.run(state).await;
            tool_rounds += 1;
            for msg in &state.messages[before..] {
                emit(
                    events,
                    StreamEvent::Message {
                        node: self.act.id().to_string(),
                        message: msg.clone(),
                    },
                )
                .await;
            }
            debug!(round = tool_rounds, results = state.len() - before, "tool round done");
        }

        self.checkpointer
            .put(config, &Checkpoint::new(state.clone(), step))
            .await?;
        info!(
            thread_id = ?config.thread_id,
            step,
            appended = state.len() - start_len,
            tool_rounds,
            "turn committed"
        );

        Ok(TurnOutcome {
            reply: state.last_assistant_reply().unwrap_or_default().to_string(),
            new_messages: state.messages[start_len..].to_vec(),
            tool_rounds,
            usage,
            state,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlm;
    use crate::tool_source::MockToolSource;

    #[test]
    fn topology_follows_tool_binding() {
        let plain = ChatRunner::in_memory(Arc::new(MockLlm::with_no_tool_calls("x")), None);
        assert_eq!(plain.topology().nodes, vec!["chatbot".to_string()]);
        let with_tools = ChatRunner::in_memory(
            Arc::new(MockLlm::with_no_tool_calls("x")),
            Some(Box::new(MockToolSource::search_tool("r"))),
        );
        assert_eq!(with_tools.topology().nodes.len(), 2);
        assert!(with_tools.has_tools());
        assert_eq!(with_tools.max_tool_rounds(), DEFAULT_MAX_TOOL_ROUNDS);
    }

    #[tokio::test]
    async fn outcome_reports_new_messages_and_rounds() {
        let runner = ChatRunner::in_memory(
            Arc::new(MockLlm::first_tools_then_end()),
            Some(Box::new(MockToolSource::search_tool("sunny"))),
        );
        let cfg = RunnableConfig::for_thread("t");
        let out = runner.run_turn(&cfg, "weather?").await.unwrap();
        assert_eq!(out.tool_rounds, 1);
        assert_eq!(out.new_messages.len(), 4);
        assert_eq!(out.reply, "Here is what I found.");
        assert_eq!(out.state.len(), 4);
    }

    #[tokio::test]
    async fn missing_thread_id_fails_before_model_call() {
        let llm = Arc::new(MockLlm::with_no_tool_calls("x"));
        let runner = ChatRunner::in_memory(llm.clone(), None);
        let err = runner
            .run_turn(&RunnableConfig::default(), "hi")
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::Checkpoint(_)));
        assert_eq!(llm.call_count(), 0);
    }
}
