//! Request and response shapes for the Mochi API
//!
//! Inbound tool arguments are narrowed into request types through their
//! `from_args` constructors before anything is sent; remote payloads go
//! through [`decode`] before anything is returned. Both directions report
//! offending fields as [`FieldViolation`](crate::error::FieldViolation)s.

mod args;
mod requests;
mod responses;

use serde::{Deserialize, Serialize};

pub(crate) use args::check_path_id;

pub use requests::{
    template_id_from_args, CreateCardRequest, ListCardsParams, ListDecksParams,
    ListTemplatesParams, PageParams, UpdateCardRequest, MAX_LIST_LIMIT,
};
pub use responses::{
    decode, Card, Deck, FieldOptions, ListCardsResponse, ListDecksResponse, ListResponse,
    ListTemplatesResponse, ResponseSchema, Template, TemplateField,
};

/// Value bound to a template field on a card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldValue {
    /// Template field id
    pub id: String,
    pub value: String,
}

impl FieldValue {
    pub fn new(id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            value: value.into(),
        }
    }
}
