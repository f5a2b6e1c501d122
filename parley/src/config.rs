//! Typed startup configuration, read once from the environment.
//!
//! Env files are merged into the process environment beforehand by the `config` crate
//! (`load_and_apply("parley", ..)`); this module only reads and validates variables.

use std::fmt;

use thiserror::Error;

use crate::agent::chat::DEFAULT_MAX_TOOL_ROUNDS;
use crate::llm::ToolChoiceMode;

pub const DEFAULT_MODEL: &str = "o4-mini";
pub const DEFAULT_SEARCH_MAX_RESULTS: u32 = 2;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} is required for provider {provider}")]
    Missing { provider: &'static str, var: &'static str },
    #[error("invalid {var}={value}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
    #[error("unknown provider '{0}' (use azure-openai or openai)")]
    UnknownProvider(String),
}

/// Model provider with its credentials.
#[derive(Clone, PartialEq, Eq)]
pub enum Provider {
    AzureOpenAi {
        endpoint: String,
        api_key: String,
        deployment: String,
        api_version: String,
    },
    OpenAi {
        api_key: String,
        base_url: Option<String>,
    },
}

impl Provider {
    pub fn name(&self) -> &'static str {
        match self {
            Provider::AzureOpenAi { .. } => "azure-openai",
            Provider::OpenAi { .. } => "openai",
        }
    }
}

// Keys stay out of logs.
impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::AzureOpenAi {
                endpoint,
                deployment,
                api_version,
                ..
            } => f
                .debug_struct("AzureOpenAi")
                .field("endpoint", endpoint)
                .field("deployment", deployment)
                .field("api_version", api_version)
                .finish_non_exhaustive(),
            Provider::OpenAi { base_url, .. } => f
                .debug_struct("OpenAi")
                .field("base_url", base_url)
                .finish_non_exhaustive(),
        }
    }
}

/// Everything needed to build a `ChatRunner`.
#[derive(Clone, PartialEq)]
pub struct ChatConfig {
    pub provider: Provider,
    pub model: String,
    /// `None` disables web search; the model then gets no tools.
    pub tavily_api_key: Option<String>,
    pub search_max_results: u32,
    pub max_tool_rounds: usize,
    pub temperature: Option<f32>,
    pub tool_choice: Option<ToolChoiceMode>,
    pub system_prompt: Option<String>,
}

impl fmt::Debug for ChatConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("web_search", &self.tavily_api_key.is_some())
            .field("search_max_results", &self.search_max_results)
            .field("max_tool_rounds", &self.max_tool_rounds)
            .field("temperature", &self.temperature)
            .field("tool_choice", &self.tool_choice)
            .field("system_prompt", &self.system_prompt.is_some())
            .finish()
    }
}

fn parse_number<T: std::str::FromStr>(
    var: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError>
where
    T::Err: fmt::Display,
{
    match value {
        None => Ok(default),
        Some(v) => v.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            value: v.clone(),
            reason: e.to_string(),
        }),
    }
}

impl ChatConfig {
    /// Reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads variables through `lookup`; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let provider_name = get("PARLEY_PROVIDER").unwrap_or_else(|| {
            if get("AZURE_OPENAI_ENDPOINT").is_some() {
                "azure-openai".to_string()
            } else {
                "openai".to_string()
            }
        });
        let provider = match provider_name.trim().to_lowercase().as_str() {
            "azure-openai" | "azure" => {
                let require = |var: &'static str| {
                    get(var).ok_or(ConfigError::Missing {
                        provider: "azure-openai",
                        var,
                    })
                };
                Provider::AzureOpenAi {
                    endpoint: require("AZURE_OPENAI_ENDPOINT")?,
                    api_key: require("AZURE_OPENAI_API_KEY")?,
                    deployment: require("AZURE_OPENAI_DEPLOYMENT_NAME")?,
                    api_version: require("AZURE_OPENAI_API_VERSION")?,
                }
            }
            "openai" => Provider::OpenAi {
                api_key: get("OPENAI_API_KEY").ok_or(ConfigError::Missing {
                    provider: "openai",
                    var: "OPENAI_API_KEY",
                })?,
                base_url: get("OPENAI_BASE_URL"),
            },
            other => return Err(ConfigError::UnknownProvider(other.to_string())),
        };

        let tool_choice = match get("PARLEY_TOOL_CHOICE") {
            None => None,
            Some(v) => Some(v.parse::<ToolChoiceMode>().map_err(|reason| {
                ConfigError::Invalid {
                    var: "PARLEY_TOOL_CHOICE",
                    value: v.clone(),
                    reason,
                }
            })?),
        };
        let temperature = match get("PARLEY_TEMPERATURE") {
            None => None,
            Some(v) => Some(parse_number("PARLEY_TEMPERATURE", Some(v), 0.0f32)?),
        };

        Ok(Self {
            provider,
            model: get("PARLEY_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            tavily_api_key: get("TAVILY_API_KEY"),
            search_max_results: parse_number(
                "PARLEY_SEARCH_MAX_RESULTS",
                get("PARLEY_SEARCH_MAX_RESULTS"),
                DEFAULT_SEARCH_MAX_RESULTS,
            )?,
            max_tool_rounds: parse_number(
                "PARLEY_MAX_TOOL_ROUNDS",
                get("PARLEY_MAX_TOOL_ROUNDS"),
                DEFAULT_MAX_TOOL_ROUNDS,
            )?,
            temperature,
            tool_choice,
            system_prompt: get("PARLEY_SYSTEM_PROMPT"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    const AZURE: &[(&str, &str)] = &[
        ("AZURE_OPENAI_ENDPOINT", "https://example.openai.azure.com"),
        ("AZURE_OPENAI_API_KEY", "az-key"),
        ("AZURE_OPENAI_DEPLOYMENT_NAME", "o4-mini"),
        ("AZURE_OPENAI_API_VERSION", "2024-12-01-preview"),
    ];

    /// **Scenario**: Azure endpoint in env selects azure with defaults for everything else.
    #[test]
    fn azure_inferred_from_endpoint() {
        let cfg = ChatConfig::from_lookup(lookup(AZURE)).unwrap();
        assert_eq!(cfg.provider.name(), "azure-openai");
        assert_eq!(cfg.model, DEFAULT_MODEL);
        assert_eq!(cfg.search_max_results, 2);
        assert_eq!(cfg.max_tool_rounds, DEFAULT_MAX_TOOL_ROUNDS);
        assert!(cfg.tavily_api_key.is_none());
    }

    #[test]
    fn azure_missing_version_is_reported() {
        let cfg = ChatConfig::from_lookup(lookup(&AZURE[..3]));
        assert_eq!(
            cfg.unwrap_err(),
            ConfigError::Missing {
                provider: "azure-openai",
                var: "AZURE_OPENAI_API_VERSION"
            }
        );
    }

    #[test]
    fn openai_requires_key() {
        let err = ChatConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
        let cfg = ChatConfig::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_BASE_URL", "http://localhost:8080/v1"),
            ("TAVILY_API_KEY", "tvly-x"),
            ("PARLEY_MAX_TOOL_ROUNDS", "3"),
            ("PARLEY_TOOL_CHOICE", "auto"),
            ("PARLEY_TEMPERATURE", "0.2"),
        ]))
        .unwrap();
        assert_eq!(
            cfg.provider,
            Provider::OpenAi {
                api_key: "sk-test".into(),
                base_url: Some("http://localhost:8080/v1".into())
            }
        );
        assert_eq!(cfg.max_tool_rounds, 3);
        assert_eq!(cfg.tool_choice, Some(ToolChoiceMode::Auto));
        assert_eq!(cfg.temperature, Some(0.2));
        assert_eq!(cfg.tavily_api_key.as_deref(), Some("tvly-x"));
    }

    #[test]
    fn invalid_numbers_and_provider() {
        let mut pairs = AZURE.to_vec();
        pairs.push(("PARLEY_SEARCH_MAX_RESULTS", "many"));
        let err = ChatConfig::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "PARLEY_SEARCH_MAX_RESULTS", .. }));

        let err = ChatConfig::from_lookup(lookup(&[("PARLEY_PROVIDER", "bedrock")])).unwrap_err();
        assert_eq!(err, ConfigError::UnknownProvider("bedrock".into()));
    }

    #[test]
    fn empty_values_count_as_unset() {
        let mut pairs = AZURE.to_vec();
        pairs.push(("TAVILY_API_KEY", "  "));
        let cfg = ChatConfig::from_lookup(lookup(&pairs)).unwrap();
        assert!(cfg.tavily_api_key.is_none());
    }

    #[test]
    fn debug_hides_keys() {
        let mut pairs = AZURE.to_vec();
        pairs.push(("TAVILY_API_KEY", "tvly-secret"));
        let cfg = ChatConfig::from_lookup(lookup(&pairs)).unwrap();
        let s = format!("{:?}", cfg);
        assert!(!s.contains("az-key"), "{}", s);
        assert!(!s.contains("tvly-secret"), "{}", s);
        assert!(s.contains("example.openai.azure.com"));
    }
}
