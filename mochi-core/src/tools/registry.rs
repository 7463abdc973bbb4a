//! Tool registry for registration, lookup, and MCP listing
//!
//! # Example
//!
//! ```rust,ignore
//! use mochi_core::tools::ToolRegistry;
//!
//! let mut registry = ToolRegistry::new();
//! registry.register(Arc::new(ListDecksTool::new(api.clone())))?;
//!
//! let tool = registry.get("list-decks").unwrap();
//! ```

use super::tool::Tool;
use crate::mcp::McpTool;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

/// Error type for registry operations
#[derive(Debug, Clone, Error)]
pub enum RegistryError {
    /// Tool with this name already exists
    #[error("Tool '{0}' is already registered")]
    DuplicateTool(String),
}

/// Name-keyed set of tools
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateTool` if a tool with the same name exists.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<(), RegistryError> {
        let name = tool.name().to_string();
        if self.tools.contains_key(&name) {
            return Err(RegistryError::DuplicateTool(name));
        }
        self.tools.insert(name, tool);
        Ok(())
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    /// Check if a tool exists
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Registered tool names, sorted
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Tool definitions for `tools/list`, sorted by name
    pub fn mcp_tools(&self) -> Vec<McpTool> {
        self.tools
            .values()
            .map(|tool| {
                let metadata = tool.metadata();
                McpTool {
                    name: metadata.name.clone(),
                    title: metadata.title.clone(),
                    description: metadata.render_description(),
                    input_schema: tool.schema().parameters,
                    annotations: Some(tool.annotations()),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{ToolAnnotations, ToolError, ToolExecutionContext, ToolMetadata, ToolSchema};
    use async_trait::async_trait;
    use serde_json::{json, Value};

    struct NamedTool {
        metadata: ToolMetadata,
    }

    impl NamedTool {
        fn new(name: &str) -> Arc<dyn Tool> {
            Arc::new(Self {
                metadata: ToolMetadata::new(name, format!("The {} tool", name)).with_title(name),
            })
        }
    }

    #[async_trait]
    impl Tool for NamedTool {
        fn metadata(&self) -> &ToolMetadata {
            &self.metadata
        }

        fn schema(&self) -> ToolSchema {
            ToolSchema::empty()
        }

        fn annotations(&self) -> ToolAnnotations {
            ToolAnnotations::read_only()
        }

        async fn execute(&self, _args: Value, _ctx: &ToolExecutionContext) -> Result<Value, ToolError> {
            Ok(json!({}))
        }
    }

    #[test]
    fn test_register_and_get() {
        let mut registry = ToolRegistry::new();
        registry.register(NamedTool::new("list-decks")).unwrap();

        assert!(registry.contains("list-decks"));
        assert_eq!(registry.get("list-decks").unwrap().name(), "list-decks");
        assert!(registry.get("list-cards").is_none());
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut registry = ToolRegistry::new();
        registry.register(NamedTool::new("list-decks")).unwrap();

        let err = registry.register(NamedTool::new("list-decks")).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateTool(name) if name == "list-decks"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_mcp_tools_sorted_with_annotations() {
        let mut registry = ToolRegistry::new();
        registry.register(NamedTool::new("list-decks")).unwrap();
        registry.register(NamedTool::new("create-card")).unwrap();

        let tools = registry.mcp_tools();
        assert_eq!(tools[0].name, "create-card");
        assert_eq!(tools[1].name, "list-decks");
        assert_eq!(tools[1].title.as_deref(), Some("list-decks"));
        assert_eq!(tools[1].annotations, Some(ToolAnnotations::read_only()));
        assert_eq!(tools[1].input_schema["type"], "object");
    }
}
