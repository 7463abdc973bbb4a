//! Request shapes sent to the Mochi API
//!
//! Each request type has a `from_args` constructor that narrows the raw tool
//! argument bag into a checked value, or fails with every violation found.
//! Serialization produces the exact body or query the API expects.

use super::args::ArgReader;
use super::FieldValue;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Largest page size the API accepts for card listings
pub const MAX_LIST_LIMIT: u32 = 100;

/// Body of `POST cards/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateCardRequest {
    /// Markdown content (`---` separates front and back)
    pub content: String,

    #[serde(rename = "deck-id")]
    pub deck_id: String,

    /// Always serialized; `null` when no template is used
    #[serde(rename = "template-id", default)]
    pub template_id: Option<String>,

    #[serde(rename = "manual-tags", default, skip_serializing_if = "Option::is_none")]
    pub manual_tags: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<String, FieldValue>>,
}

impl CreateCardRequest {
    pub fn new(content: impl Into<String>, deck_id: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            deck_id: deck_id.into(),
            template_id: None,
            manual_tags: None,
            fields: None,
        }
    }

    pub fn from_args(args: &Value) -> Result<Self> {
        let mut reader = ArgReader::new(args)?;
        let content = reader.required_str("content");
        let deck_id = reader.required_str("deck-id");
        let template_id = reader.optional_non_empty_str("template-id");
        let manual_tags = reader.optional_str_list("manual-tags");
        let fields = reader.optional_field_values("fields");
        reader.finish()?;

        Ok(Self {
            content: content.unwrap_or_default(),
            deck_id: deck_id.unwrap_or_default(),
            template_id,
            manual_tags,
            fields,
        })
    }
}

/// Body of `POST cards/{id}`; only supplied fields are serialized
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateCardRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(rename = "deck-id", default, skip_serializing_if = "Option::is_none")]
    pub deck_id: Option<String>,

    #[serde(rename = "template-id", default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,

    #[serde(rename = "archived?", default, skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,

    /// Soft-delete marker; the API expects the literal string `"true"`
    #[serde(rename = "trashed?", default, skip_serializing_if = "Option::is_none")]
    pub trashed: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<String, FieldValue>>,
}

impl UpdateCardRequest {
    /// A request that only moves the card to the trash
    pub fn trash() -> Self {
        Self {
            trashed: Some("true".to_string()),
            ..Default::default()
        }
    }

    /// Parse `card-id` plus the partial update from a tool argument bag
    pub fn from_args(args: &Value) -> Result<(String, Self)> {
        let mut reader = ArgReader::new(args)?;
        let card_id = reader.required_path_id("card-id");
        let content = reader.optional_non_empty_str("content");
        let deck_id = reader.optional_non_empty_str("deck-id");
        let template_id = reader.optional_non_empty_str("template-id");
        let archived = reader.optional_bool("archived?");
        let trashed = reader.optional_literal("trashed?", "true");
        let fields = reader.optional_field_values("fields");
        reader.finish()?;

        Ok((
            card_id.unwrap_or_default(),
            Self {
                content,
                deck_id,
                template_id,
                archived,
                trashed,
                fields,
            },
        ))
    }
}

/// Query of `GET cards/`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListCardsParams {
    #[serde(rename = "deck-id", default, skip_serializing_if = "Option::is_none")]
    pub deck_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bookmark: Option<String>,
}

impl ListCardsParams {
    pub fn for_deck(deck_id: impl Into<String>) -> Self {
        Self {
            deck_id: Some(deck_id.into()),
            ..Default::default()
        }
    }

    pub fn from_args(args: &Value) -> Result<Self> {
        let mut reader = ArgReader::new(args)?;
        let deck_id = reader.optional_non_empty_str("deck-id");
        let limit = reader.optional_int_in("limit", 1, MAX_LIST_LIMIT);
        let bookmark = reader.optional_str("bookmark");
        reader.finish()?;

        Ok(Self {
            deck_id,
            limit,
            bookmark,
        })
    }
}

/// Query of `GET decks/` and `GET templates/`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bookmark: Option<String>,
}

impl PageParams {
    pub fn from_args(args: &Value) -> Result<Self> {
        let mut reader = ArgReader::new(args)?;
        let bookmark = reader.optional_str("bookmark");
        reader.finish()?;
        Ok(Self { bookmark })
    }
}

pub type ListDecksParams = PageParams;
pub type ListTemplatesParams = PageParams;

/// Parse the `template-id` argument of `get-template`
pub fn template_id_from_args(args: &Value) -> Result<String> {
    let mut reader = ArgReader::new(args)?;
    let template_id = reader.required_path_id("template-id");
    reader.finish()?;
    Ok(template_id.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    #[test]
    fn test_create_card_defaults_null_template() {
        let req = CreateCardRequest::from_args(&json!({
            "content": "What is 2+2?\n---\n4",
            "deck-id": "deck1"
        }))
        .unwrap();

        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(body["template-id"], Value::Null);
        assert_eq!(body["deck-id"], "deck1");
        assert!(body.get("manual-tags").is_none());
        assert!(body.get("fields").is_none());
    }

    #[test]
    fn test_create_card_missing_required_fields() {
        let err = CreateCardRequest::from_args(&json!({ "manual-tags": ["x"] })).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        let message = err.to_string();
        assert!(message.contains("field 'content' is missing"));
        assert!(message.contains("field 'deck-id' is missing"));
    }

    #[test]
    fn test_create_card_empty_content() {
        let err = CreateCardRequest::from_args(&json!({ "content": "", "deck-id": "d" }))
            .unwrap_err();
        assert_eq!(err.violations().len(), 1);
        assert_eq!(err.violations()[0].field, "content");
    }

    #[test]
    fn test_create_card_with_template_fields() {
        let req = CreateCardRequest::from_args(&json!({
            "content": "",
            "deck-id": "deck1",
            "template-id": "tmpl1",
            "fields": { "f1": { "id": "f1", "value": "front" } }
        }));
        // content is still required even when a template supplies the layout
        assert!(req.is_err());

        let req = CreateCardRequest::from_args(&json!({
            "content": "<< f1 >>",
            "deck-id": "deck1",
            "template-id": "tmpl1",
            "manual-tags": ["geo"],
            "fields": { "f1": { "id": "f1", "value": "front" } }
        }))
        .unwrap();
        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(body["template-id"], "tmpl1");
        assert_eq!(body["manual-tags"], json!(["geo"]));
        assert_eq!(body["fields"]["f1"], json!({ "id": "f1", "value": "front" }));
    }

    #[test]
    fn test_update_card_trash_only() {
        let (card_id, req) =
            UpdateCardRequest::from_args(&json!({ "card-id": "abc", "trashed?": "true" })).unwrap();
        assert_eq!(card_id, "abc");
        assert_eq!(req, UpdateCardRequest::trash());
        assert_eq!(serde_json::to_value(&req).unwrap(), json!({ "trashed?": "true" }));
    }

    #[test]
    fn test_update_card_rejects_other_trashed_values() {
        let err = UpdateCardRequest::from_args(&json!({ "card-id": "abc", "trashed?": true }))
            .unwrap_err();
        assert_eq!(err.violations()[0].field, "trashed?");
    }

    #[test]
    fn test_update_card_requires_card_id() {
        let err = UpdateCardRequest::from_args(&json!({ "content": "x" })).unwrap_err();
        assert!(err.to_string().contains("field 'card-id' is missing"));

        let err = UpdateCardRequest::from_args(&json!({ "card-id": "" })).unwrap_err();
        assert!(err.to_string().contains("field 'card-id' must not be empty"));

        let err = UpdateCardRequest::from_args(&json!({ "card-id": ".", "content": "x" }))
            .unwrap_err();
        assert_eq!(err.violations()[0].field, "card-id");
    }

    #[test]
    fn test_list_cards_limit_bounds() {
        assert!(ListCardsParams::from_args(&json!({ "limit": 1 })).is_ok());
        assert!(ListCardsParams::from_args(&json!({ "limit": 100 })).is_ok());

        let err = ListCardsParams::from_args(&json!({ "limit": 0 })).unwrap_err();
        assert!(err.to_string().contains("between 1 and 100"));
        assert!(ListCardsParams::from_args(&json!({ "limit": 101 })).is_err());
        assert!(ListCardsParams::from_args(&json!({ "limit": "10" })).is_err());
        assert!(ListCardsParams::from_args(&json!({ "limit": 2.5 })).is_err());
    }

    #[test]
    fn test_page_params_bookmark() {
        let params = PageParams::from_args(&json!({ "bookmark": "g1AAAA" })).unwrap();
        assert_eq!(params.bookmark.as_deref(), Some("g1AAAA"));
        assert_eq!(PageParams::from_args(&Value::Null).unwrap(), PageParams::default());
    }

    #[test]
    fn test_template_id_required() {
        assert_eq!(template_id_from_args(&json!({ "template-id": "t1" })).unwrap(), "t1");
        assert!(template_id_from_args(&json!({})).is_err());
        assert!(template_id_from_args(&json!({ "template-id": ".." })).is_err());
    }
}
