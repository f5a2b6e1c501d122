//! Chat Completions client implementing `LlmClient` for OpenAI and Azure OpenAI.
//!
//! The client is generic over the `async_openai` config: `OpenAIConfig` targets
//! `{base}/chat/completions`, `AzureConfig` targets
//! `{endpoint}/openai/deployments/{deployment}/chat/completions?api-version=..`.
//! Full history is mapped on every call, including assistant tool calls and tool results,
//! so the provider can pair each `tool` message with the call that produced it.

use async_openai::{
    config::{AzureConfig, Config, OpenAIConfig},
    types::chat::{
        ChatCompletionMessageToolCall, ChatCompletionMessageToolCalls,
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessage, ChatCompletionRequestToolMessageArgs,
        ChatCompletionRequestUserMessage, ChatCompletionTool, ChatCompletionToolChoiceOption,
        ChatCompletionTools, CreateChatCompletionRequestArgs, FunctionCall, FunctionObject,
        ToolChoiceOptions,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{debug, trace};

use super::ToolChoiceMode;
use crate::error::AgentError;
use crate::llm::{LlmClient, LlmResponse, LlmUsage};
use crate::message::Message;
use crate::state::ToolCall;
use crate::tool_source::ToolSpec;

/// Chat Completions client (OpenAI or Azure OpenAI, chosen by the config type).
///
/// **Interaction**: Implements `LlmClient`; used by ThinkNode. Tools set with
/// [`with_tools`](Self::with_tools) are sent with every request.
pub struct ChatOpenAI<C: Config = OpenAIConfig> {
    client: Client<C>,
    model: String,
    tools: Option<Vec<ToolSpec>>,
    temperature: Option<f32>,
    tool_choice: Option<ToolChoiceMode>,
}

impl ChatOpenAI<OpenAIConfig> {
    /// Default OpenAI config (API key from `OPENAI_API_KEY`).
    pub fn new(model: impl Into<String>) -> Self {
        Self::with_config(OpenAIConfig::default(), model)
    }
}

impl ChatOpenAI<AzureConfig> {
    /// Azure OpenAI deployment. `model` is only reported in logs; Azure routes by deployment.
    pub fn azure(
        endpoint: &str,
        api_key: &str,
        deployment: &str,
        api_version: &str,
        model: impl Into<String>,
    ) -> Self {
        let config = AzureConfig::new()
            .with_api_base(endpoint)
            .with_api_key(api_key)
            .with_deployment_id(deployment)
            .with_api_version(api_version);
        Self::with_config(config, model)
    }
}

impl<C: Config> ChatOpenAI<C> {
    pub fn with_config(config: C, model: impl Into<String>) -> Self {
        Self {
            client: Client::with_config(config),
            model: model.into(),
            tools: None,
            temperature: None,
            tool_choice: None,
        }
    }

    /// Set tools for every completion (enables tool_calls in responses).
    /// An empty list is treated as no tools.
    pub fn with_tools(mut self, tools: Vec<ToolSpec>) -> Self {
        self.tools = (!tools.is_empty()).then_some(tools);
        self
    }

    /// Set temperature (0–2). Lower values are more deterministic.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set tool choice mode. Without it the provider default (auto) applies.
    pub fn with_tool_choice(mut self, mode: ToolChoiceMode) -> Self {
        self.tool_choice = Some(mode);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn tools_count(&self) -> usize {
        self.tools.as_ref().map(Vec::len).unwrap_or(0)
    }
}

/// Maps our `Message` list to Chat Completions request messages.
fn messages_to_request(
    messages: &[Message],
) -> Result<Vec<ChatCompletionRequestMessage>, AgentError> {
    let build_err =
        |e: async_openai::error::OpenAIError| AgentError::ExecutionFailed(format!("OpenAI request build failed: {}", e));
    messages
        .iter()
        .map(|m| match m {
            Message::System(s) => Ok(ChatCompletionRequestMessage::System(
                ChatCompletionRequestSystemMessage::from(s.as_str()),
            )),
            Message::User(s) => Ok(ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessage::from(s.as_str()),
            )),
            Message::Assistant {
                content,
                tool_calls,
            } => {
                let mut b = ChatCompletionRequestAssistantMessageArgs::default();
                if !content.is_empty() || tool_calls.is_empty() {
                    b.content(content.as_str());
                }
                if !tool_calls.is_empty() {
                    b.tool_calls(
                        tool_calls
                            .iter()
                            .map(|tc| {
                                ChatCompletionMessageToolCalls::Function(
                                    ChatCompletionMessageToolCall {
                                        id: tc.id.clone(),
                                        function: FunctionCall {
                                            name: tc.name.clone(),
                                            arguments: tc.arguments.clone(),
                                        },
                                    },
                                )
                            })
                            .collect::<Vec<_>>(),
                    );
                }
                b.build().map(Into::into).map_err(build_err)
            }
            Message::Tool {
                tool_call_id,
                content,
                ..
            } => ChatCompletionRequestToolMessageArgs::default()
                .content(content.as_str())
                .tool_call_id(tool_call_id.as_str())
                .build()
                .map(Into::into)
                .map_err(build_err),
        })
        .collect()
}

fn tools_to_request(tools: &[ToolSpec]) -> Vec<ChatCompletionTools> {
    tools
        .iter()
        .map(|t| {
            ChatCompletionTools::Function(ChatCompletionTool {
                function: FunctionObject {
                    name: t.name.clone(),
                    description: t.description.clone(),
                    parameters: Some(t.input_schema.clone()),
                    ..Default::default()
                },
            })
        })
        .collect()
}

#[async_trait]
impl<C: Config + Send + Sync> LlmClient for ChatOpenAI<C> {
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, AgentError> {
        let trace_id = uuid::Uuid::new_v4().to_string();
        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(self.model.clone());
        args.messages(messages_to_request(messages)?);

        if let Some(ref tools) = self.tools {
            args.tools(tools_to_request(tools));
            if let Some(mode) = self.tool_choice {
                let opt = match mode {
                    ToolChoiceMode::Auto => ToolChoiceOptions::Auto,
                    ToolChoiceMode::None => ToolChoiceOptions::None,
                    ToolChoiceMode::Required => ToolChoiceOptions::Required,
                };
                args.tool_choice(ChatCompletionToolChoiceOption::Mode(opt));
            }
        }
        if let Some(t) = self.temperature {
            args.temperature(t);
        }

        let request = args.build().map_err(|e| {
            AgentError::ExecutionFailed(format!("OpenAI request build failed: {}", e))
        })?;

        debug!(
            trace_id = %trace_id,
            model = %self.model,
            message_count = messages.len(),
            tools_count = self.tools_count(),
            temperature = ?self.temperature,
            tool_choice = ?self.tool_choice,
            "chat completion create"
        );
        if let Ok(js) = serde_json::to_string_pretty(&request) {
            trace!(trace_id = %trace_id, request = %js, "chat completion request body");
        }

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| AgentError::ExecutionFailed(format!("OpenAI API error: {}", e)))?;

        if let Ok(js) = serde_json::to_string_pretty(&response) {
            trace!(trace_id = %trace_id, response = %js, "chat completion response body");
        }

        let choice = response.choices.into_iter().next().ok_or_else(|| {
            AgentError::ExecutionFailed("OpenAI returned no choices".to_string())
        })?;

        let msg = choice.message;
        let tool_calls: Vec<ToolCall> = msg
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .filter_map(|tc| match tc {
                ChatCompletionMessageToolCalls::Function(f) => Some(ToolCall {
                    id: f.id,
                    name: f.function.name,
                    arguments: f.function.arguments,
                }),
                _ => None,
            })
            .collect();

        let usage = response.usage.map(|u| LlmUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });
        debug!(
            trace_id = %trace_id,
            tool_calls = tool_calls.len(),
            total_tokens = ?usage.as_ref().map(|u| u.total_tokens),
            "chat completion done"
        );
        Ok(LlmResponse {
            content: msg.content.unwrap_or_default(),
            tool_calls,
            usage,
        })
    }
}
