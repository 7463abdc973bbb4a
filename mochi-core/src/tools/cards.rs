//! Card tools: `create-card`, `update-card`, `list-cards`

use super::result::{to_output, ToolError};
use super::tool::{Tool, ToolAnnotations, ToolExecutionContext, ToolMetadata, ToolSchema};
use crate::client::FlashcardApi;
use crate::schema::{CreateCardRequest, ListCardsParams, UpdateCardRequest, MAX_LIST_LIMIT};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

fn fields_schema() -> Value {
    json!({
        "type": "object",
        "description": "Template field values keyed by field id; each entry is {\"id\", \"value\"}",
        "additionalProperties": {
            "type": "object",
            "properties": {
                "id": { "type": "string" },
                "value": { "type": "string" }
            },
            "required": ["id", "value"]
        }
    })
}

/// Create a new flashcard
pub struct CreateCardTool {
    api: Arc<dyn FlashcardApi>,
    metadata: ToolMetadata,
}

impl CreateCardTool {
    pub fn new(api: Arc<dyn FlashcardApi>) -> Self {
        Self {
            api,
            metadata: ToolMetadata::new("create-card", "Create a new flashcard in a deck.")
                .with_title("Create card")
                .with_hint("Separate front and back with a line containing only ---")
                .with_hint("Use {{cloze text}} markers for cloze deletions")
                .with_hint("Set template-id and fields only when the card uses a template; field ids come from get-template")
                .with_returns("the created card, including its id"),
        }
    }
}

#[async_trait]
impl Tool for CreateCardTool {
    fn metadata(&self) -> &ToolMetadata {
        &self.metadata
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new(json!({
            "type": "object",
            "properties": {
                "content": {
                    "type": "string",
                    "description": "Markdown content of the card"
                },
                "deck-id": {
                    "type": "string",
                    "description": "Deck the card is created in"
                },
                "template-id": {
                    "type": ["string", "null"],
                    "description": "Optional template id"
                },
                "manual-tags": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Tags without the leading #"
                },
                "fields": fields_schema()
            },
            "required": ["content", "deck-id"]
        }))
    }

    fn annotations(&self) -> ToolAnnotations {
        ToolAnnotations::mutating()
    }

    async fn execute(&self, args: Value, _ctx: &ToolExecutionContext) -> Result<Value, ToolError> {
        let request = CreateCardRequest::from_args(&args)?;
        let card = self.api.create_card(&request).await?;
        to_output(&card)
    }
}

/// Update or soft-delete a flashcard
pub struct UpdateCardTool {
    api: Arc<dyn FlashcardApi>,
    metadata: ToolMetadata,
}

impl UpdateCardTool {
    pub fn new(api: Arc<dyn FlashcardApi>) -> Self {
        Self {
            api,
            metadata: ToolMetadata::new(
                "update-card",
                "Update an existing flashcard. Only the supplied fields are changed.",
            )
            .with_title("Update card")
            .with_hint("Set trashed? to \"true\" to delete the card")
            .with_hint("Set archived? to true to archive the card")
            .with_returns("the updated card"),
        }
    }
}

#[async_trait]
impl Tool for UpdateCardTool {
    fn metadata(&self) -> &ToolMetadata {
        &self.metadata
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new(json!({
            "type": "object",
            "properties": {
                "card-id": {
                    "type": "string",
                    "description": "Id of the card to update"
                },
                "content": { "type": "string" },
                "deck-id": { "type": "string" },
                "template-id": { "type": "string" },
                "archived?": { "type": "boolean" },
                "trashed?": {
                    "type": "string",
                    "enum": ["true"],
                    "description": "Moves the card to the trash"
                },
                "fields": fields_schema()
            },
            "required": ["card-id"]
        }))
    }

    fn annotations(&self) -> ToolAnnotations {
        ToolAnnotations::mutating().destructive()
    }

    async fn execute(&self, args: Value, _ctx: &ToolExecutionContext) -> Result<Value, ToolError> {
        let (card_id, request) = UpdateCardRequest::from_args(&args)?;
        let card = self.api.update_card(&card_id, &request).await?;
        to_output(&card)
    }
}

/// List cards, optionally within one deck
pub struct ListCardsTool {
    api: Arc<dyn FlashcardApi>,
    metadata: ToolMetadata,
}

impl ListCardsTool {
    pub fn new(api: Arc<dyn FlashcardApi>) -> Self {
        Self {
            api,
            metadata: ToolMetadata::new("list-cards", "List flashcards, one page at a time.")
                .with_title("List cards")
                .with_hint("Pass the returned bookmark to fetch the next page")
                .with_returns("{ bookmark, docs: [card] }; no bookmark means no more pages"),
        }
    }
}

#[async_trait]
impl Tool for ListCardsTool {
    fn metadata(&self) -> &ToolMetadata {
        &self.metadata
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new(json!({
            "type": "object",
            "properties": {
                "deck-id": {
                    "type": "string",
                    "description": "Only list cards in this deck"
                },
                "limit": {
                    "type": "integer",
                    "minimum": 1,
                    "maximum": MAX_LIST_LIMIT,
                    "description": "Page size"
                },
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
        let params = ListCardsParams::from_args(&args)?;
        let page = self.api.list_cards(&params).await?;
        to_output(&page)
    }
}
