//! Tool trait and metadata definitions
//!
//! Each tool declares its name, description, input schema and behavioral
//! annotations, and turns a raw argument bag into one Mochi API call.

use super::result::ToolError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Tool metadata for LLM-friendly discovery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolMetadata {
    /// Tool name (unique identifier)
    pub name: String,

    /// Short human-readable title
    pub title: Option<String>,

    /// Human-readable description
    pub description: String,

    /// When should the LLM use this tool?
    pub usage_hints: Vec<String>,

    /// What the tool returns
    pub returns: Option<String>,
}

impl ToolMetadata {
    /// Create new metadata with required fields
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: None,
            description: description.into(),
            usage_hints: Vec::new(),
            returns: None,
        }
    }

    /// Set the display title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Add a usage hint
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.usage_hints.push(hint.into());
        self
    }

    /// Set return description
    pub fn with_returns(mut self, returns: impl Into<String>) -> Self {
        self.returns = Some(returns.into());
        self
    }

    /// Description as advertised in `tools/list`: the summary, then hints and
    /// the return shape on their own lines.
    pub fn render_description(&self) -> String {
        let mut out = self.description.clone();
        for hint in &self.usage_hints {
            out.push_str("\n- ");
            out.push_str(hint);
        }
        if let Some(returns) = &self.returns {
            out.push_str("\nReturns: ");
            out.push_str(returns);
        }
        out
    }
}

/// JSON Schema for tool parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSchema {
    /// JSON Schema for input parameters
    pub parameters: Value,
}

impl ToolSchema {
    /// Create a schema from a JSON Schema value
    pub fn new(parameters: Value) -> Self {
        Self { parameters }
    }

    /// Create an empty schema (tool takes no parameters)
    pub fn empty() -> Self {
        Self {
            parameters: serde_json::json!({
                "type": "object",
                "properties": {}
            }),
        }
    }
}

/// Behavioral hints advertised to MCP clients. Advisory only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolAnnotations {
    pub read_only_hint: bool,
    pub destructive_hint: bool,
    pub idempotent_hint: bool,
    pub open_world_hint: bool,
}

impl ToolAnnotations {
    /// Read-only, idempotent call against the remote service
    pub const fn read_only() -> Self {
        Self {
            read_only_hint: true,
            destructive_hint: false,
            idempotent_hint: true,
            open_world_hint: true,
        }
    }

    /// Mutating, non-idempotent call against the remote service
    pub const fn mutating() -> Self {
        Self {
            read_only_hint: false,
            destructive_hint: false,
            idempotent_hint: false,
            open_world_hint: true,
        }
    }

    pub const fn destructive(mut self) -> Self {
        self.destructive_hint = true;
        self
    }
}

impl Default for ToolAnnotations {
    fn default() -> Self {
        Self::mutating()
    }
}

/// Context provided to tool execution
#[derive(Debug, Clone)]
pub struct ToolExecutionContext {
    /// Trace ID for log correlation
    pub trace_id: String,
}

impl Default for ToolExecutionContext {
    fn default() -> Self {
        Self {
            trace_id: uuid::Uuid::new_v4().to_string(),
        }
    }
}

impl ToolExecutionContext {
    /// Create a new context with a fresh trace ID
    pub fn new() -> Self {
        Self::default()
    }

    /// Set trace ID
    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = trace_id.into();
        self
    }
}

/// Core tool trait
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get tool metadata
    fn metadata(&self) -> &ToolMetadata;

    /// Get tool name (convenience method)
    fn name(&self) -> &str {
        &self.metadata().name
    }

    /// Get tool description (convenience method)
    fn description(&self) -> &str {
        &self.metadata().description
    }

    /// Get the JSON schema for this tool's parameters
    fn schema(&self) -> ToolSchema;

    /// Behavioral hints for clients
    fn annotations(&self) -> ToolAnnotations {
        ToolAnnotations::default()
    }

    /// Validate `args`, perform the call, and return the shaped result.
    ///
    /// Arguments are narrowed before any remote call; a validation failure
    /// never reaches the network.
    async fn execute(&self, args: Value, ctx: &ToolExecutionContext) -> Result<Value, ToolError>;
}

/// Type alias for boxed tools
pub type BoxedTool = Arc<dyn Tool>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_builder() {
        let metadata = ToolMetadata::new("list-decks", "List decks")
            .with_title("List decks")
            .with_hint("Use to find a deck id")
            .with_returns("bookmark and docs");

        let rendered = metadata.render_description();
        assert!(rendered.starts_with("List decks"));
        assert!(rendered.contains("\n- Use to find a deck id"));
        assert!(rendered.ends_with("Returns: bookmark and docs"));
    }

    #[test]
    fn test_annotations_serialize_camel_case() {
        let json = serde_json::to_value(ToolAnnotations::read_only()).unwrap();
        assert_eq!(json["readOnlyHint"], true);
        assert_eq!(json["idempotentHint"], true);
        assert_eq!(json["destructiveHint"], false);
        assert_eq!(json["openWorldHint"], true);

        let json = serde_json::to_value(ToolAnnotations::mutating().destructive()).unwrap();
        assert_eq!(json["readOnlyHint"], false);
        assert_eq!(json["destructiveHint"], true);
    }

    #[test]
    fn test_contexts_get_distinct_trace_ids() {
        let a = ToolExecutionContext::new();
        let b = ToolExecutionContext::new();
        assert_ne!(a.trace_id, b.trace_id);
        assert_eq!(a.with_trace_id("t1").trace_id, "t1");
    }
}
