//! Builds a `ChatRunner` from `ChatConfig`: provider client, optional web search, store.

use std::sync::Arc;

use async_openai::config::OpenAIConfig;
use tracing::{info, warn};

use super::ChatRunner;
use crate::config::{ChatConfig, Provider};
use crate::error::AgentError;
use crate::llm::{ChatOpenAI, LlmClient};
use crate::memory::MemorySaver;
use crate::tool_source::{ToolSource, ToolSpec, WebSearchToolsSource};

fn configure<C>(client: ChatOpenAI<C>, config: &ChatConfig, tools: Vec<ToolSpec>) -> ChatOpenAI<C>
where
    C: async_openai::config::Config,
{
    let mut client = client.with_tools(tools);
    if let Some(t) = config.temperature {
        client = client.with_temperature(t);
    }
    if let Some(mode) = config.tool_choice {
        client = client.with_tool_choice(mode);
    }
    client
}

/// Wires the LLM client (OpenAI or Azure OpenAI), the Tavily tool when a key is configured,
/// and an in-memory session store.
pub async fn build_chat_runner(config: &ChatConfig) -> Result<ChatRunner, AgentError> {
    let tool_source: Option<Box<dyn ToolSource>> = match &config.tavily_api_key {
        Some(key) => Some(Box::new(WebSearchToolsSource::new(
            key.as_str(),
            config.search_max_results,
        ))),
        None => {
            warn!("TAVILY_API_KEY not set, web search disabled");
            None
        }
    };
    let tool_specs = match &tool_source {
        Some(source) => source
            .list_tools()
            .await
            .map_err(|e| AgentError::ExecutionFailed(format!("list tools: {}", e)))?,
        None => Vec::new(),
    };

    let llm: Arc<dyn LlmClient> = match &config.provider {
        Provider::AzureOpenAi {
            endpoint,
            api_key,
            deployment,
            api_version,
        } => Arc::new(configure(
            ChatOpenAI::azure(endpoint, api_key, deployment, api_version, config.model.as_str()),
            config,
            tool_specs.clone(),
        )),
        Provider::OpenAi { api_key, base_url } => {
            let mut openai = OpenAIConfig::new().with_api_key(api_key.as_str());
            if let Some(base) = base_url {
                openai = openai.with_api_base(base.as_str());
            }
            Arc::new(configure(
                ChatOpenAI::with_config(openai, config.model.as_str()),
                config,
                tool_specs.clone(),
            ))
        }
    };
    info!(
        provider = config.provider.name(),
        model = %config.model,
        tools = ?tool_specs.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(),
        max_tool_rounds = config.max_tool_rounds,
        "chat runner ready"
    );

    let mut runner = ChatRunner::new(llm, tool_source, Arc::new(MemorySaver::new()))
        .with_max_tool_rounds(config.max_tool_rounds);
    if let Some(prompt) = &config.system_prompt {
        runner = runner.with_system_prompt(prompt.as_str());
    }
    Ok(runner)
}
