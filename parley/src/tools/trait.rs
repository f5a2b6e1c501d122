use async_trait::async_trait;
use serde_json::Value;

use crate::tool_source::{ToolCallContent, ToolSourceError, ToolSpec};

/// A single tool that can be called by the LLM.
///
/// Tools are registered once at startup in a [`ToolRegistry`](crate::tools::ToolRegistry)
/// and never change afterwards.
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use serde_json::Value;
/// use parley::tools::Tool;
/// use parley::tool_source::{ToolCallContent, ToolSourceError, ToolSpec};
///
/// struct Echo;
///
/// #[async_trait]
/// impl Tool for Echo {
///     fn name(&self) -> &str {
///         "echo"
///     }
///
///     fn spec(&self) -> ToolSpec {
///         ToolSpec {
///             name: "echo".to_string(),
///             description: Some("Echo the arguments back".to_string()),
///             input_schema: serde_json::json!({ "type": "object" }),
///         }
///     }
///
///     async fn call(&self, args: Value) -> Result<ToolCallContent, ToolSourceError> {
///         Ok(ToolCallContent { text: args.to_string() })
///     }
/// }
/// ```
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique name within a registry; the model calls the tool by this name.
    fn name(&self) -> &str;

    /// Description and JSON schema sent to the model.
    fn spec(&self) -> ToolSpec;

    /// Executes the tool. Errors are reported back to the model, not to the user.
    async fn call(&self, args: Value) -> Result<ToolCallContent, ToolSourceError>;
}
