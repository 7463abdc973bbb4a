//! Deck tools: `list-decks`

use super::result::{to_output, ToolError};
use super::tool::{Tool, ToolAnnotations, ToolExecutionContext, ToolMetadata, ToolSchema};
use crate::client::FlashcardApi;
use crate::schema::ListDecksParams;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

/// List the decks that are not archived
pub struct ListDecksTool {
    api: Arc<dyn FlashcardApi>,
    metadata: ToolMetadata,
}

impl ListDecksTool {
    pub fn new(api: Arc<dyn FlashcardApi>) -> Self {
        Self {
            api,
            metadata: ToolMetadata::new("list-decks", "List all decks that are not archived.")
                .with_title("List decks")
                .with_hint("Use to find the deck-id needed by create-card and list-cards")
                .with_returns("{ bookmark, docs: [deck] }; no bookmark means no more pages"),
        }
    }
}

#[async_trait]
impl Tool for ListDecksTool {
    fn metadata(&self) -> &ToolMetadata {
        &self.metadata
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new(json!({
            "type": "object",
            "properties": {
                "bookmark": {
                    "type": "string",
                    "description": "Cursor from a previous page"
                }
            }
        }))
    }

    fn annotations(&self) -> ToolAnnotations {
        ToolAnnotations::read_only()
    }

    async fn execute(&self, args: Value, _ctx: &ToolExecutionContext) -> Result<Value, ToolError> {
        let params = ListDecksParams::from_args(&args)?;
        let page = self.api.list_decks(&params).await?;
        to_output(&page)
    }
}
