//! Template tools: `list-templates`, `get-template`

use super::result::{to_output, ToolError};
use super::tool::{Tool, ToolAnnotations, ToolExecutionContext, ToolMetadata, ToolSchema};
use crate::client::FlashcardApi;
use crate::schema::{template_id_from_args, ListTemplatesParams};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

/// List card templates
pub struct ListTemplatesTool {
    api: Arc<dyn FlashcardApi>,
    metadata: ToolMetadata,
}

impl ListTemplatesTool {
    pub fn new(api: Arc<dyn FlashcardApi>) -> Self {
        Self {
            api,
            metadata: ToolMetadata::new("list-templates", "List card templates.")
                .with_title("List templates")
                .with_returns("{ bookmark, docs: [template] }; no bookmark means no more pages"),
        }
    }
}

#[async_trait]
impl Tool for ListTemplatesTool {
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
        let params = ListTemplatesParams::from_args(&args)?;
        let page = self.api.list_templates(&params).await?;
        to_output(&page)
    }
}

/// Fetch one template with its field definitions
pub struct GetTemplateTool {
    api: Arc<dyn FlashcardApi>,
    metadata: ToolMetadata,
}

impl GetTemplateTool {
    pub fn new(api: Arc<dyn FlashcardApi>) -> Self {
        Self {
            api,
            metadata: ToolMetadata::new("get-template", "Get a card template by id.")
                .with_title("Get template")
                .with_hint("The keys of fields are the ids to use in create-card fields")
                .with_returns("the template with its fields"),
        }
    }
}

#[async_trait]
impl Tool for GetTemplateTool {
    fn metadata(&self) -> &ToolMetadata {
        &self.metadata
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new(json!({
            "type": "object",
            "properties": {
                "template-id": {
                    "type": "string",
                    "description": "Id of the template"
                }
            },
            "required": ["template-id"]
        }))
    }

    fn annotations(&self) -> ToolAnnotations {
        ToolAnnotations::read_only()
    }

    async fn execute(&self, args: Value, _ctx: &ToolExecutionContext) -> Result<Value, ToolError> {
        let template_id = template_id_from_args(&args)?;
        let template = self.api.get_template(&template_id).await?;
        to_output(&template)
    }
}
