//! `reqwest` implementation of [`FlashcardApi`]

use super::FlashcardApi;
use crate::config::{MochiConfig, DEFAULT_BASE_URL};
use crate::error::{MochiError, Result};
use crate::schema::{
    check_path_id, decode, Card, CreateCardRequest, ListCardsParams, ListCardsResponse, ListDecksParams,
    ListDecksResponse, ListTemplatesParams, ListTemplatesResponse, ResponseSchema, Template,
    UpdateCardRequest,
};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Method, Request, StatusCode, Url};
use serde_json::Value;
use std::time::Duration;

/// Authenticated client bound to one Mochi API root
#[derive(Clone)]
pub struct MochiClient {
    client: reqwest::Client,
    base_url: Url,
    token: String,
    timeout: Duration,
}

impl std::fmt::Debug for MochiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MochiClient")
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl MochiClient {
    /// Create a client for the public Mochi API.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is empty.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        Self::with_options(token, DEFAULT_BASE_URL, Duration::from_secs(30))
    }

    /// Create a client from configuration; the token must be set.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is missing or the API settings are invalid.
    pub fn from_config(config: &MochiConfig) -> Result<Self> {
        let token = config.token().ok_or_else(|| {
            MochiError::Configuration("Mochi API token is not set".to_string())
        })?;
        Self::with_options(token, &config.api.base_url, config.api.request_timeout)
    }

    /// Create a client with an explicit base URL and request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is empty, the URL does not parse, or the
    /// HTTP client cannot be built.
    pub fn with_options(
        token: impl Into<String>,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(MochiError::Configuration(
                "Mochi API token must not be empty".to_string(),
            ));
        }

        // `Url::join` drops the last segment unless the base ends with '/'
        let base = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        let base_url = Url::parse(&base).map_err(|e| {
            MochiError::Configuration(format!("Invalid Mochi base URL '{}': {}", base, e))
        })?;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MochiError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            token,
            timeout,
        })
    }

    /// The API root every path is resolved against
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn authorized(&self, method: Method, url: Url) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .basic_auth(&self.token, Some(""))
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
    }

    fn collection_url(&self, collection: &str) -> Result<Url> {
        self.base_url.join(collection).map_err(|e| {
            MochiError::Other(format!("Failed to build URL for '{}': {}", collection, e))
        })
    }

    /// `{collection}/{id}`, with `id` pushed as one literal path segment
    fn item_url(&self, collection: &str, field: &str, id: &str) -> Result<Url> {
        check_path_id(field, id).map_err(MochiError::validation)?;

        let mut url = self.collection_url(collection)?;
        url.path_segments_mut()
            .map_err(|_| {
                MochiError::Configuration(format!(
                    "Mochi base URL '{}' cannot carry a path",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .push(id);
        Ok(url)
    }

    pub(crate) fn create_card_request(&self, request: &CreateCardRequest) -> Result<Request> {
        let url = self.collection_url("cards/")?;
        Ok(self.authorized(Method::POST, url).json(request).build()?)
    }

    pub(crate) fn update_card_request(
        &self,
        card_id: &str,
        request: &UpdateCardRequest,
    ) -> Result<Request> {
        let url = self.item_url("cards/", "card-id", card_id)?;
        Ok(self.authorized(Method::POST, url).json(request).build()?)
    }

    pub(crate) fn list_decks_request(&self, params: &ListDecksParams) -> Result<Request> {
        let url = self.collection_url("decks/")?;
        Ok(self.authorized(Method::GET, url).query(params).build()?)
    }

    pub(crate) fn list_cards_request(&self, params: &ListCardsParams) -> Result<Request> {
        let url = self.collection_url("cards/")?;
        Ok(self.authorized(Method::GET, url).query(params).build()?)
    }

    pub(crate) fn list_templates_request(&self, params: &ListTemplatesParams) -> Result<Request> {
        let url = self.collection_url("templates/")?;
        Ok(self.authorized(Method::GET, url).query(params).build()?)
    }

    pub(crate) fn get_template_request(&self, template_id: &str) -> Result<Request> {
        let url = self.item_url("templates/", "template-id", template_id)?;
        Ok(self.authorized(Method::GET, url).build()?)
    }

    /// Execute `request` and validate the body as `T`
    async fn send<T: ResponseSchema>(&self, request: Request) -> Result<T> {
        let method = request.method().clone();
        let path = request.url().path().to_string();
        tracing::debug!(%method, %path, "Mochi API request");

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            let err = remote_error(status, &body);
            tracing::warn!(%method, %path, status = status.as_u16(), error = %err, "Mochi API call failed");
            return Err(err);
        }

        let value: Value = serde_json::from_str(&body)?;
        decode(value)
    }

    fn transport_error(&self, err: reqwest::Error) -> MochiError {
        if err.is_timeout() {
            MochiError::Timeout(self.timeout)
        } else {
            MochiError::Http(err)
        }
    }
}

/// Translate a non-2xx response into a `RemoteApi` error.
///
/// The API answers failures with either an array of messages or an object
/// mapping field name to message; both are joined into one line.
pub(crate) fn remote_error(status: StatusCode, body: &str) -> MochiError {
    fn text(value: &Value) -> String {
        match value {
            Value::String(s) => s.clone(),
            Value::Array(items) => items.iter().map(text).collect::<Vec<_>>().join(", "),
            other => other.to_string(),
        }
    }

    let message = match serde_json::from_str::<Value>(body) {
        Ok(Value::Array(items)) if !items.is_empty() => {
            items.iter().map(text).collect::<Vec<_>>().join("; ")
        }
        Ok(Value::Object(map)) if !map.is_empty() => map
            .iter()
            .map(|(field, reason)| format!("{}: {}", field, text(reason)))
            .collect::<Vec<_>>()
            .join("; "),
        _ if !body.trim().is_empty() => body.trim().to_string(),
        _ => status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string(),
    };

    MochiError::RemoteApi {
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl FlashcardApi for MochiClient {
    async fn create_card(&self, request: &CreateCardRequest) -> Result<Card> {
        self.send(self.create_card_request(request)?).await
    }

    async fn update_card(&self, card_id: &str, request: &UpdateCardRequest) -> Result<Card> {
        self.send(self.update_card_request(card_id, request)?).await
    }

    async fn list_decks(&self, params: &ListDecksParams) -> Result<ListDecksResponse> {
        let page: ListDecksResponse = self.send(self.list_decks_request(params)?).await?;
        Ok(page.without_archived())
    }

    async fn list_cards(&self, params: &ListCardsParams) -> Result<ListCardsResponse> {
        self.send(self.list_cards_request(params)?).await
    }

    async fn list_templates(&self, params: &ListTemplatesParams) -> Result<ListTemplatesResponse> {
        self.send(self.list_templates_request(params)?).await
    }

    async fn get_template(&self, template_id: &str) -> Result<Template> {
        self.send(self.get_template_request(template_id)?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use reqwest::header::AUTHORIZATION;
    use serde_json::json;

    fn client() -> MochiClient {
        MochiClient::with_options("abc", "http://localhost:9999/api", Duration::from_secs(5))
            .unwrap()
    }

    fn body_json(request: &Request) -> Value {
        let bytes = request.body().and_then(|b| b.as_bytes()).unwrap();
        serde_json::from_slice(bytes).unwrap()
    }

    #[test]
    fn test_empty_token_rejected() {
        assert!(MochiClient::new("").is_err());
        assert!(MochiClient::new("  ").is_err());
    }

    #[test]
    fn test_from_config_requires_token() {
        let err = MochiClient::from_config(&MochiConfig::default()).unwrap_err();
        assert!(matches!(err, MochiError::Configuration(_)));

        let client = MochiClient::from_config(&MochiConfig::default().with_token("t")).unwrap();
        assert_eq!(client.base_url().as_str(), DEFAULT_BASE_URL);
    }

    #[test]
    fn test_headers_on_every_request() {
        let client = client();
        let request = client.list_decks_request(&ListDecksParams::default()).unwrap();

        // base64("abc:")
        assert_eq!(request.headers()[AUTHORIZATION], "Basic YWJjOg==");
        assert_eq!(request.headers()[CONTENT_TYPE], "application/json");
    }

    #[test]
    fn test_base_url_without_trailing_slash() {
        let request = client().list_decks_request(&ListDecksParams::default()).unwrap();
        assert_eq!(request.url().as_str(), "http://localhost:9999/api/decks/");
    }

    #[test]
    fn test_create_card_request() {
        let req = CreateCardRequest::new("Q\n---\nA", "deck1");
        let request = client().create_card_request(&req).unwrap();

        assert_eq!(request.method(), Method::POST);
        assert_eq!(request.url().path(), "/api/cards/");
        assert_eq!(
            body_json(&request),
            json!({ "content": "Q\n---\nA", "deck-id": "deck1", "template-id": null })
        );
    }

    #[test]
    fn test_update_card_request_encodes_id() {
        let request = client()
            .update_card_request("a/b", &UpdateCardRequest::trash())
            .unwrap();
        assert_eq!(request.url().path(), "/api/cards/a%2Fb");
        assert_eq!(body_json(&request), json!({ "trashed?": "true" }));
    }

    #[test]
    fn test_dot_segment_ids_rejected() {
        for id in [".", "..", ""] {
            let err = client()
                .update_card_request(id, &UpdateCardRequest::trash())
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation);
            assert_eq!(err.violations()[0].field, "card-id");

            let err = client().get_template_request(id).unwrap_err();
            assert_eq!(err.violations()[0].field, "template-id");
        }

        let request = client()
            .update_card_request("v1.2", &UpdateCardRequest::trash())
            .unwrap();
        assert_eq!(request.url().path(), "/api/cards/v1.2");
    }

    #[test]
    fn test_list_cards_query() {
        let params = ListCardsParams {
            deck_id: Some("deck1".into()),
            limit: Some(10),
            bookmark: Some("bm 1".into()),
        };
        let request = client().list_cards_request(&params).unwrap();
        assert_eq!(request.method(), Method::GET);
        assert_eq!(request.url().query(), Some("deck-id=deck1&limit=10&bookmark=bm+1"));

        let request = client().list_cards_request(&ListCardsParams::default()).unwrap();
        assert_eq!(request.url().query(), None);
    }

    #[test]
    fn test_get_template_request() {
        let request = client().get_template_request("tmpl1").unwrap();
        assert_eq!(request.url().path(), "/api/templates/tmpl1");
        assert!(request.body().is_none());
    }

    #[test]
    fn test_remote_error_object_body() {
        let err = remote_error(StatusCode::UNPROCESSABLE_ENTITY, r#"{"deck-id": "is required"}"#);
        assert_eq!(err.kind(), ErrorKind::RemoteApi);
        assert_eq!(err.status(), Some(422));
        assert!(err.to_string().contains("deck-id: is required"));
    }

    #[test]
    fn test_remote_error_array_body() {
        let err = remote_error(StatusCode::BAD_REQUEST, r#"["content is blank", "deck missing"]"#);
        match err {
            MochiError::RemoteApi { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "content is blank; deck missing");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_remote_error_fallbacks() {
        let err = remote_error(StatusCode::BAD_GATEWAY, "upstream down");
        assert!(err.to_string().contains("upstream down"));

        let err = remote_error(StatusCode::NOT_FOUND, "");
        assert!(err.to_string().contains("Not Found"));
    }
}
