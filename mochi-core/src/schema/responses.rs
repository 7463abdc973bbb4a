//! Response shapes returned by the Mochi API
//!
//! Every payload is checked against a declarative shape before it is
//! deserialized, so a bad payload reports each offending field by path
//! (`docs[2].deck-id`) rather than the first serde error. Properties the
//! shapes do not mention are dropped.

use super::FieldValue;
use crate::error::{FieldViolation, MochiError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::collections::BTreeMap;

/// Expected JSON type of a property
#[derive(Debug, Clone, Copy)]
pub(crate) enum Kind {
    String,
    Number,
    Bool,
    StringList,
    /// Nested object with its own shape
    Object(&'static [FieldSpec]),
    /// Object whose values all share one shape
    MapOf(&'static [FieldSpec]),
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct FieldSpec {
    name: &'static str,
    kind: Kind,
    required: bool,
}

const fn req(name: &'static str, kind: Kind) -> FieldSpec {
    FieldSpec {
        name,
        kind,
        required: true,
    }
}

const fn opt(name: &'static str, kind: Kind) -> FieldSpec {
    FieldSpec {
        name,
        kind,
        required: false,
    }
}

const CARD_FIELD: &[FieldSpec] = &[req("id", Kind::String), req("value", Kind::String)];

const CARD: &[FieldSpec] = &[
    req("id", Kind::String),
    req("tags", Kind::StringList),
    req("content", Kind::String),
    req("name", Kind::String),
    req("deck-id", Kind::String),
    opt("fields", Kind::MapOf(CARD_FIELD)),
];

const DECK: &[FieldSpec] = &[
    req("id", Kind::String),
    req("sort", Kind::Number),
    req("name", Kind::String),
    opt("archived?", Kind::Bool),
];

const FIELD_OPTIONS: &[FieldSpec] = &[opt("multi-line?", Kind::Bool)];

const TEMPLATE_FIELD: &[FieldSpec] = &[
    req("id", Kind::String),
    req("name", Kind::String),
    req("pos", Kind::String),
    opt("options", Kind::Object(FIELD_OPTIONS)),
];

const TEMPLATE: &[FieldSpec] = &[
    req("id", Kind::String),
    req("name", Kind::String),
    req("content", Kind::String),
    req("pos", Kind::String),
    req("fields", Kind::MapOf(TEMPLATE_FIELD)),
];

fn join(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", path, name)
    }
}

fn check_object(
    value: &Value,
    path: &str,
    shape: &[FieldSpec],
    violations: &mut Vec<FieldViolation>,
) {
    let Some(object) = value.as_object() else {
        let field = if path.is_empty() { "(root)" } else { path };
        violations.push(FieldViolation::invalid(field, "an object"));
        return;
    };

    for spec in shape {
        let field = join(path, spec.name);
        match object.get(spec.name) {
            None | Some(Value::Null) if spec.required => {
                violations.push(FieldViolation::missing(field));
            }
            None | Some(Value::Null) => {}
            Some(v) => check_kind(v, &field, spec.kind, violations),
        }
    }
}

fn check_kind(value: &Value, field: &str, kind: Kind, violations: &mut Vec<FieldViolation>) {
    let ok = match kind {
        Kind::String => value.is_string(),
        Kind::Number => value.is_number(),
        Kind::Bool => value.is_boolean(),
        Kind::StringList => value
            .as_array()
            .is_some_and(|items| items.iter().all(Value::is_string)),
        Kind::Object(shape) => {
            check_object(value, field, shape, violations);
            return;
        }
        Kind::MapOf(shape) => match value.as_object() {
            Some(map) => {
                for (key, entry) in map {
                    check_object(entry, &join(field, key), shape, violations);
                }
                return;
            }
            None => false,
        },
    };

    if !ok {
        let expected = match kind {
            Kind::String => "a string",
            Kind::Number => "a number",
            Kind::Bool => "a boolean",
            Kind::StringList => "an array of strings",
            Kind::Object(_) | Kind::MapOf(_) => "an object",
        };
        violations.push(FieldViolation::invalid(field, expected));
    }
}

/// A payload shape that can be validated before use
pub trait ResponseSchema: DeserializeOwned {
    /// Name used in `SchemaViolation` messages
    const NAME: &'static str;

    /// Append one violation per offending property under `path`
    fn check(value: &Value, path: &str, violations: &mut Vec<FieldViolation>);
}

/// Validate `value` against `T`'s shape, then deserialize it
pub fn decode<T: ResponseSchema>(value: Value) -> Result<T> {
    let mut violations = Vec::new();
    T::check(&value, "", &mut violations);
    if !violations.is_empty() {
        return Err(MochiError::SchemaViolation {
            context: T::NAME.to_string(),
            violations,
        });
    }

    serde_json::from_value(value).map_err(|e| MochiError::SchemaViolation {
        context: T::NAME.to_string(),
        violations: vec![FieldViolation::new(T::NAME, e.to_string())],
    })
}

/// A flashcard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    pub tags: Vec<String>,
    pub content: String,
    pub name: String,
    #[serde(rename = "deck-id")]
    pub deck_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<String, FieldValue>>,
}

impl ResponseSchema for Card {
    const NAME: &'static str = "card";

    fn check(value: &Value, path: &str, violations: &mut Vec<FieldViolation>) {
        check_object(value, path, CARD, violations);
    }
}

/// A deck of cards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    pub id: String,
    pub sort: Number,
    pub name: String,
    #[serde(rename = "archived?", default, skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
}

impl Deck {
    pub fn is_archived(&self) -> bool {
        self.archived.unwrap_or(false)
    }
}

impl ResponseSchema for Deck {
    const NAME: &'static str = "deck";

    fn check(value: &Value, path: &str, violations: &mut Vec<FieldViolation>) {
        check_object(value, path, DECK, violations);
    }
}

/// Options on a template field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldOptions {
    #[serde(rename = "multi-line?", default, skip_serializing_if = "Option::is_none")]
    pub multi_line: Option<bool>,
}

/// A field declared by a template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateField {
    pub id: String,
    pub name: String,
    pub pos: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<FieldOptions>,
}

/// A card template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    pub name: String,
    pub content: String,
    pub pos: String,
    pub fields: BTreeMap<String, TemplateField>,
}

impl ResponseSchema for Template {
    const NAME: &'static str = "template";

    fn check(value: &Value, path: &str, violations: &mut Vec<FieldViolation>) {
        check_object(value, path, TEMPLATE, violations);
    }
}

/// A page of a paginated listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
pub struct ListResponse<T> {
    /// Cursor for the next page; absent on the last page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bookmark: Option<String>,
    pub docs: Vec<T>,
}

impl<T: ResponseSchema> ResponseSchema for ListResponse<T> {
    const NAME: &'static str = "list response";

    fn check(value: &Value, path: &str, violations: &mut Vec<FieldViolation>) {
        let Some(object) = value.as_object() else {
            let field = if path.is_empty() { "(root)" } else { path };
            violations.push(FieldViolation::invalid(field, "an object"));
            return;
        };

        if let Some(bookmark) = object.get("bookmark").filter(|v| !v.is_null()) {
            check_kind(bookmark, &join(path, "bookmark"), Kind::String, violations);
        }

        let docs_path = join(path, "docs");
        match object.get("docs") {
            None | Some(Value::Null) => violations.push(FieldViolation::missing(docs_path)),
            Some(Value::Array(docs)) => {
                for (i, doc) in docs.iter().enumerate() {
                    T::check(doc, &format!("{}[{}]", docs_path, i), violations);
                }
            }
            Some(_) => violations.push(FieldViolation::invalid(docs_path, "an array")),
        }
    }
}

pub type ListCardsResponse = ListResponse<Card>;
pub type ListDecksResponse = ListResponse<Deck>;
pub type ListTemplatesResponse = ListResponse<Template>;

impl ListDecksResponse {
    /// Drop archived decks, keeping the order of the rest
    pub fn without_archived(mut self) -> Self {
        self.docs.retain(|deck| !deck.is_archived());
        self
    }
}
