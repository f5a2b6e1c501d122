//! Tavily web search tool (`tavily_search`).
//!
//! POSTs to the Tavily search API with bearer auth and returns ordered results
//! (title, snippet, url). Failures become `ToolSourceError`s, which ActNode turns into
//! tool-result messages so the model can react.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::tool_source::{ToolCallContent, ToolSourceError, ToolSpec};
use crate::tools::Tool;

pub const TOOL_TAVILY_SEARCH: &str = "tavily_search";
pub const TAVILY_SEARCH_URL: &str = "https://api.tavily.com/search";

const DEFAULT_MAX_RESULTS: u32 = 2;
const MAX_RESULTS_LIMIT: u32 = 20;
const SNIPPET_MAX_CHARS: usize = 1000;

const TOPICS: &[&str] = &["general", "news", "finance"];
const TIME_RANGES: &[&str] = &["day", "week", "month", "year"];
const SEARCH_DEPTHS: &[&str] = &["basic", "advanced"];

/// One search hit, in the order the API ranked it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub title: String,
    #[serde(default, rename = "content")]
    pub snippet: String,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Serialize)]
struct SearchParams {
    query: String,
    max_results: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    topic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    time_range: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    search_depth: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    include_domains: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    exclude_domains: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

fn optional_choice(
    args: &Value,
    key: &str,
    allowed: &[&str],
) -> Result<Option<String>, ToolSourceError> {
    let Some(v) = args.get(key).filter(|v| !v.is_null()) else {
        return Ok(None);
    };
    let s = v
        .as_str()
        .ok_or_else(|| ToolSourceError::InvalidInput(format!("{} must be a string", key)))?;
    if allowed.contains(&s) {
        Ok(Some(s.to_string()))
    } else {
        Err(ToolSourceError::InvalidInput(format!(
            "{} must be one of {}, got '{}'",
            key,
            allowed.join(", "),
            s
        )))
    }
}

fn string_list(args: &Value, key: &str) -> Result<Vec<String>, ToolSourceError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| {
                v.as_str().map(str::to_string).ok_or_else(|| {
                    ToolSourceError::InvalidInput(format!("{} must contain only strings", key))
                })
            })
            .collect(),
        Some(_) => Err(ToolSourceError::InvalidInput(format!(
            "{} must be an array of strings",
            key
        ))),
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

/// Renders results for the tool-result message.
pub(crate) fn format_results(query: &str, results: &[SearchResult]) -> String {
    if results.is_empty() {
        return format!("No results found for '{}'.", query);
    }
    let mut s = String::new();
    for (i, r) in results.iter().enumerate() {
        let title = if r.title.is_empty() { "(no title)" } else { &r.title };
        s.push_str(&format!("[{}] {}\n  URL: {}\n", i + 1, title, r.url));
        let snippet = r.snippet.trim();
        if !snippet.is_empty() {
            s.push_str(&format!(
                "  {}\n",
                truncate_chars(snippet, SNIPPET_MAX_CHARS).replace('\n', " ")
            ));
        }
        s.push('\n');
    }
    s.trim_end().to_string()
}

/// Tavily search tool.
///
/// `max_results` is fixed per tool instance (not chosen by the model).
pub struct TavilySearchTool {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    max_results: u32,
}

impl TavilySearchTool {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            endpoint: TAVILY_SEARCH_URL.to_string(),
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    /// Clamped to 1..=20.
    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results.clamp(1, MAX_RESULTS_LIMIT);
        self
    }

    /// Overrides the search URL (proxies, tests).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn max_results(&self) -> u32 {
        self.max_results
    }

    fn params_from_args(&self, args: &Value) -> Result<SearchParams, ToolSourceError> {
        let query = args
            .get("query")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .ok_or_else(|| ToolSourceError::InvalidInput("missing query".to_string()))?;
        Ok(SearchParams {
            query: query.to_string(),
            max_results: self.max_results,
            topic: optional_choice(args, "topic", TOPICS)?,
            time_range: optional_choice(args, "time_range", TIME_RANGES)?,
            search_depth: optional_choice(args, "search_depth", SEARCH_DEPTHS)?,
            include_domains: string_list(args, "include_domains")?,
            exclude_domains: string_list(args, "exclude_domains")?,
        })
    }

    async fn request(&self, params: &SearchParams) -> Result<Vec<SearchResult>, ToolSourceError> {
        debug!(query = %params.query, max_results = params.max_results, "tavily search");
        let res = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(params)
            .send()
            .await
            .map_err(|e| ToolSourceError::Transport(e.to_string()))?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(ToolSourceError::Transport(format!(
                "Tavily API error {}: {}",
                status, body
            )));
        }
        let body: SearchResponse = res
            .json()
            .await
            .map_err(|e| ToolSourceError::Transport(format!("invalid Tavily response: {}", e)))?;
        Ok(body.results)
    }

    /// Plain query with default options.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>, ToolSourceError> {
        let params = self.params_from_args(&json!({ "query": query }))?;
        self.request(&params).await
    }
}

#[async_trait]
impl Tool for TavilySearchTool {
    fn name(&self) -> &str {
        TOOL_TAVILY_SEARCH
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: TOOL_TAVILY_SEARCH.to_string(),
            description: Some(
                "Search the web for current information. Returns ranked results with title, \
                 URL and a content snippet. Use for recent events or facts you are unsure about."
                    .to_string(),
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": { "type": "string", "description": "Search query" },
                    "topic": {
                        "type": "string",
                        "enum": TOPICS,
                        "description": "Search category; news for current events"
                    },
                    "time_range": {
                        "type": "string",
                        "enum": TIME_RANGES,
                        "description": "Only results from this recent period"
                    },
                    "search_depth": {
                        "type": "string",
                        "enum": SEARCH_DEPTHS,
                        "description": "advanced is slower but more thorough"
                    },
                    "include_domains": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Restrict results to these domains"
                    },
                    "exclude_domains": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Drop results from these domains"
                    }
                },
                "required": ["query"]
            }),
        }
    }

    async fn call(&self, args: Value) -> Result<ToolCallContent, ToolSourceError> {
        let params = self.params_from_args(&args)?;
        let results = self.request(&params).await?;
        Ok(ToolCallContent {
            text: format_results(&params.query, &results),
        })
    }
}
