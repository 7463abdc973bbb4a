//! Remote client for the Mochi REST API
//!
//! [`FlashcardApi`] is the seam the tools and resources talk to;
//! [`MochiClient`] is the authenticated `reqwest` implementation.
//! No call is retried: a failure surfaces immediately as a
//! [`MochiError`](crate::error::MochiError).

mod http;
#[cfg(test)]
pub(crate) mod stub;

use crate::error::Result;
use crate::schema::{
    Card, CreateCardRequest, ListCardsParams, ListCardsResponse, ListDecksParams,
    ListDecksResponse, ListTemplatesParams, ListTemplatesResponse, Template, UpdateCardRequest,
};
use async_trait::async_trait;

pub use http::MochiClient;

/// One method per Mochi API operation
#[async_trait]
pub trait FlashcardApi: Send + Sync {
    /// `POST cards/`
    async fn create_card(&self, request: &CreateCardRequest) -> Result<Card>;

    /// `POST cards/{id}`; also used for soft-delete via `trashed?`
    async fn update_card(&self, card_id: &str, request: &UpdateCardRequest) -> Result<Card>;

    /// `GET decks/`, with archived decks removed
    async fn list_decks(&self, params: &ListDecksParams) -> Result<ListDecksResponse>;

    /// `GET cards/`, returned as the API paginates it
    async fn list_cards(&self, params: &ListCardsParams) -> Result<ListCardsResponse>;

    /// `GET templates/`
    async fn list_templates(&self, params: &ListTemplatesParams) -> Result<ListTemplatesResponse>;

    /// `GET templates/{id}`
    async fn get_template(&self, template_id: &str) -> Result<Template>;
}
