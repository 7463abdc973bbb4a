//! Tool catalog exposed over MCP
//!
//! Each tool wraps one [`FlashcardApi`] operation: it narrows the argument
//! bag into a request type, performs exactly one remote call, and returns
//! the validated response as JSON. Failures come back as a [`ToolError`]
//! whose kind drives the message the caller sees.
//!
//! # Example
//!
//! ```rust,ignore
//! use mochi_core::tools::mochi_tools;
//!
//! let registry = mochi_tools(Arc::new(MochiClient::new(token)?));
//! let tool = registry.get("list-decks").unwrap();
//! let page = tool.execute(json!({}), &ToolExecutionContext::new()).await?;
//! ```

mod cards;
mod decks;
mod registry;
mod result;
mod templates;
mod tool;

pub use cards::{CreateCardTool, ListCardsTool, UpdateCardTool};
pub use decks::ListDecksTool;
pub use registry::{RegistryError, ToolRegistry};
pub use result::{ToolError, ToolProvenance};
pub use templates::{GetTemplateTool, ListTemplatesTool};
pub use tool::{BoxedTool, Tool, ToolAnnotations, ToolExecutionContext, ToolMetadata, ToolSchema};

use crate::client::FlashcardApi;
use std::sync::Arc;

/// Registry holding every Mochi tool, all sharing one client
pub fn mochi_tools(api: Arc<dyn FlashcardApi>) -> ToolRegistry {
    let tools: [BoxedTool; 6] = [
        Arc::new(CreateCardTool::new(Arc::clone(&api))),
        Arc::new(UpdateCardTool::new(Arc::clone(&api))),
        Arc::new(ListCardsTool::new(Arc::clone(&api))),
        Arc::new(ListDecksTool::new(Arc::clone(&api))),
        Arc::new(ListTemplatesTool::new(Arc::clone(&api))),
        Arc::new(GetTemplateTool::new(api)),
    ];

    let mut registry = ToolRegistry::new();
    for tool in tools {
        if let Err(e) = registry.register(tool) {
            tracing::warn!(error = %e, "Skipping tool");
        }
    }
    registry
}
