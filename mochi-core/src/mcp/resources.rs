//! MCP Resource Providers
//!
//! Resources are read-only data sources that can be exposed via MCP.

use super::protocol::{McpResource, McpResourceTemplate, ResourceContent};
use crate::client::FlashcardApi;
use crate::error::Result;
use crate::schema::{ListCardsParams, ListDecksParams, ListTemplatesParams};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

const JSON_MIME: &str = "application/json";

/// Trait for providing MCP resources
#[async_trait]
pub trait ResourceProvider: Send + Sync {
    /// List available resources
    async fn list_resources(&self) -> Vec<McpResource>;

    /// Parameterized URIs this provider can read
    fn resource_templates(&self) -> Vec<McpResourceTemplate> {
        Vec::new()
    }

    /// Read a resource by URI.
    ///
    /// `Ok(None)` means the URI is not one this provider serves.
    async fn read_resource(&self, uri: &str) -> Result<Option<ResourceContent>>;
}

/// Parsed `mochi://` URI
#[derive(Debug, Clone, PartialEq, Eq)]
enum MochiUri {
    Decks,
    Templates,
    DeckCards { deck_id: String },
}

impl MochiUri {
    fn parse(uri: &str) -> Option<Self> {
        let path = uri.strip_prefix("mochi://")?;
        match path {
            "decks" => Some(Self::Decks),
            "templates" => Some(Self::Templates),
            _ => {
                let encoded = path.strip_prefix("decks/")?;
                if encoded.is_empty() || encoded.contains('/') {
                    return None;
                }
                let deck_id = urlencoding::decode(encoded).ok()?.into_owned();
                Some(Self::DeckCards { deck_id })
            }
        }
    }
}

/// Deck, template, and per-deck card listings under `mochi://`
pub struct MochiResources {
    api: Arc<dyn FlashcardApi>,
}

impl MochiResources {
    pub fn new(api: Arc<dyn FlashcardApi>) -> Self {
        Self { api }
    }

    fn deck_uri(deck_id: &str) -> String {
        format!("mochi://decks/{}", urlencoding::encode(deck_id))
    }
}

fn json_content<T: Serialize>(uri: &str, value: &T) -> Result<ResourceContent> {
    Ok(ResourceContent::json(uri, serde_json::to_string_pretty(value)?))
}

#[async_trait]
impl ResourceProvider for MochiResources {
    async fn list_resources(&self) -> Vec<McpResource> {
        let mut resources = vec![
            McpResource {
                uri: "mochi://decks".to_string(),
                name: "All decks".to_string(),
                description: Some("Every deck that is not archived".to_string()),
                mime_type: Some(JSON_MIME.to_string()),
            },
            McpResource {
                uri: "mochi://templates".to_string(),
                name: "All templates".to_string(),
                description: Some("Every card template with its fields".to_string()),
                mime_type: Some(JSON_MIME.to_string()),
            },
        ];

        match self.api.list_decks(&ListDecksParams::default()).await {
            Ok(page) => resources.extend(page.docs.into_iter().map(|deck| McpResource {
                uri: Self::deck_uri(&deck.id),
                description: Some(format!("Cards in deck '{}'", deck.name)),
                name: deck.name,
                mime_type: Some(JSON_MIME.to_string()),
            })),
            Err(e) => {
                tracing::warn!(error = %e, "Listing decks for resources failed; returning collections only");
            }
        }

        resources
    }

    fn resource_templates(&self) -> Vec<McpResourceTemplate> {
        vec![McpResourceTemplate {
            uri_template: "mochi://decks/{deckId}".to_string(),
            name: "Deck cards".to_string(),
            description: Some("Cards in one deck".to_string()),
            mime_type: Some(JSON_MIME.to_string()),
        }]
    }

    async fn read_resource(&self, uri: &str) -> Result<Option<ResourceContent>> {
        let Some(parsed) = MochiUri::parse(uri) else {
            return Ok(None);
        };

        let content = match parsed {
            MochiUri::Decks => {
                let page = self.api.list_decks(&ListDecksParams::default()).await?;
                json_content(uri, &page)?
            }
            MochiUri::Templates => {
                let page = self.api.list_templates(&ListTemplatesParams::default()).await?;
                json_content(uri, &page)?
            }
            MochiUri::DeckCards { deck_id } => {
                let page = self.api.list_cards(&ListCardsParams::for_deck(deck_id)).await?;
                json_content(uri, &page)?
            }
        };

        Ok(Some(content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::stub::{card, deck, StubApi};

    #[test]
    fn test_parse_uris() {
        assert_eq!(MochiUri::parse("mochi://decks"), Some(MochiUri::Decks));
        assert_eq!(MochiUri::parse("mochi://templates"), Some(MochiUri::Templates));
        assert_eq!(
            MochiUri::parse("mochi://decks/a%20b"),
            Some(MochiUri::DeckCards {
                deck_id: "a b".to_string()
            })
        );
        assert_eq!(MochiUri::parse("mochi://bogus"), None);
        assert_eq!(MochiUri::parse("mochi://decks/"), None);
        assert_eq!(MochiUri::parse("mochi://decks/a/b"), None);
        assert_eq!(MochiUri::parse("file:///etc/passwd"), None);
    }

    #[tokio::test]
    async fn test_list_includes_one_entry_per_deck() {
        let api = Arc::new(StubApi::with_decks(vec![
            deck("d1", "Geography", None),
            deck("d2", "Old", Some(true)),
        ]));
        let resources = MochiResources::new(api);

        let uris: Vec<String> = resources
            .list_resources()
            .await
            .into_iter()
            .map(|r| r.uri)
            .collect();
        assert_eq!(uris, vec!["mochi://decks", "mochi://templates", "mochi://decks/d1"]);
    }

    #[tokio::test]
    async fn test_list_survives_remote_failure() {
        let resources = MochiResources::new(Arc::new(StubApi::failing(500, "down")));
        assert_eq!(resources.list_resources().await.len(), 2);
    }

    #[tokio::test]
    async fn test_read_deck_cards() {
        let api = Arc::new(StubApi {
            cards: vec![card("c1", "d1", "a"), card("c2", "d2", "b")],
            ..Default::default()
        });
        let resources = MochiResources::new(api.clone());

        let content = resources.read_resource("mochi://decks/d2").await.unwrap().unwrap();
        assert_eq!(content.uri, "mochi://decks/d2");
        assert_eq!(content.mime_type.as_deref(), Some("application/json"));

        let page: serde_json::Value = serde_json::from_str(content.text.as_deref().unwrap()).unwrap();
        assert_eq!(page["docs"][0]["id"], "c2");
        assert_eq!(api.calls(), vec!["list_cards Some(\"d2\")"]);
    }

    #[tokio::test]
    async fn test_unknown_uri_is_none_without_call() {
        let api = Arc::new(StubApi::default());
        let resources = MochiResources::new(api.clone());

        assert!(resources.read_resource("mochi://bogus").await.unwrap().is_none());
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_read_propagates_remote_failure() {
        let resources = MochiResources::new(Arc::new(StubApi::failing(401, "Unauthorized")));
        let err = resources.read_resource("mochi://templates").await.unwrap_err();
        assert_eq!(err.status(), Some(401));
    }
}
