//! In-memory [`FlashcardApi`] for unit tests

use super::FlashcardApi;
use crate::error::{MochiError, Result};
use crate::schema::{
    Card, CreateCardRequest, Deck, ListCardsParams, ListCardsResponse, ListDecksParams,
    ListDecksResponse, ListResponse, ListTemplatesParams, ListTemplatesResponse, Template,
    UpdateCardRequest,
};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Mutex;

/// Serves fixed data and records every call as `"<operation> <detail>"`
#[derive(Default)]
pub(crate) struct StubApi {
    pub decks: Vec<Deck>,
    pub cards: Vec<Card>,
    pub templates: Vec<Template>,
    pub bookmark: Option<String>,
    pub fail_with: Option<(u16, String)>,
    pub calls: Mutex<Vec<String>>,
}

impl StubApi {
    pub fn with_decks(decks: Vec<Deck>) -> Self {
        Self {
            decks,
            ..Default::default()
        }
    }

    pub fn failing(status: u16, message: &str) -> Self {
        Self {
            fail_with: Some((status, message.to_string())),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        match &self.fail_with {
            Some((status, message)) => Err(MochiError::RemoteApi {
                status: *status,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }

    fn page<T: Clone>(&self, docs: &[T]) -> ListResponse<T> {
        ListResponse {
            bookmark: self.bookmark.clone(),
            docs: docs.to_vec(),
        }
    }
}

pub(crate) fn deck(id: &str, name: &str, archived: Option<bool>) -> Deck {
    serde_json::from_value(json!({
        "id": id,
        "sort": 1,
        "name": name,
        "archived?": archived
    }))
    .unwrap()
}

pub(crate) fn card(id: &str, deck_id: &str, content: &str) -> Card {
    Card {
        id: id.to_string(),
        tags: Vec::new(),
        content: content.to_string(),
        name: content.lines().next().unwrap_or_default().to_string(),
        deck_id: deck_id.to_string(),
        fields: None,
    }
}

#[async_trait]
impl FlashcardApi for StubApi {
    async fn create_card(&self, request: &CreateCardRequest) -> Result<Card> {
        self.record(format!("create_card {}", request.deck_id))?;
        Ok(card("new-card", &request.deck_id, &request.content))
    }

    async fn update_card(&self, card_id: &str, request: &UpdateCardRequest) -> Result<Card> {
        self.record(format!("update_card {}", card_id))?;
        Ok(card(
            card_id,
            request.deck_id.as_deref().unwrap_or("deck1"),
            request.content.as_deref().unwrap_or("updated"),
        ))
    }

    async fn list_decks(&self, params: &ListDecksParams) -> Result<ListDecksResponse> {
        self.record(format!("list_decks {:?}", params.bookmark))?;
        Ok(self.page(&self.decks).without_archived())
    }

    async fn list_cards(&self, params: &ListCardsParams) -> Result<ListCardsResponse> {
        self.record(format!("list_cards {:?}", params.deck_id))?;
        let cards: Vec<Card> = self
            .cards
            .iter()
            .filter(|c| params.deck_id.as_deref().is_none_or(|d| d == c.deck_id))
            .cloned()
            .collect();
        Ok(self.page(&cards))
    }

    async fn list_templates(&self, params: &ListTemplatesParams) -> Result<ListTemplatesResponse> {
        self.record(format!("list_templates {:?}", params.bookmark))?;
        Ok(self.page(&self.templates))
    }

    async fn get_template(&self, template_id: &str) -> Result<Template> {
        self.record(format!("get_template {}", template_id))?;
        self.templates
            .iter()
            .find(|t| t.id == template_id)
            .cloned()
            .ok_or_else(|| MochiError::RemoteApi {
                status: 404,
                message: "Not Found".to_string(),
            })
    }
}
