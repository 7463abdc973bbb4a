//! In-process axum server standing in for the Mochi API.
//!
//! Every request lands on one fallback handler, which records it and answers
//! with the next queued response.

#![allow(dead_code)]

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use mochi_core::client::MochiClient;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub const TOKEN: &str = "test-token";

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    /// Header names are lowercased
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl RecordedRequest {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).expect("request body is not JSON")
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    /// Decoded query pairs, in order
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let Some(query) = &self.query else {
            return Vec::new();
        };
        query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .map(|(k, v)| {
                let decode = |s: &str| {
                    urlencoding::decode(&s.replace('+', " "))
                        .map(|c| c.into_owned())
                        .unwrap_or_else(|_| s.to_string())
                };
                (decode(k), decode(v))
            })
            .collect()
    }
}

#[derive(Debug, Clone)]
struct MockResponse {
    status: u16,
    body: String,
    delay: Option<Duration>,
}

#[derive(Default)]
struct MockState {
    responses: VecDeque<MockResponse>,
    requests: Vec<RecordedRequest>,
}

type SharedState = Arc<Mutex<MockState>>;

pub struct MockServer {
    addr: SocketAddr,
    state: SharedState,
    task: JoinHandle<()>,
}

impl MockServer {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let state = SharedState::default();

        let router = Router::new()
            .fallback(record_and_respond)
            .with_state(Arc::clone(&state));
        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Self { addr, state, task }
    }

    /// Queue a JSON response
    pub fn respond(&self, status: u16, body: Value) -> &Self {
        self.respond_raw(status, &body.to_string())
    }

    pub fn respond_raw(&self, status: u16, body: &str) -> &Self {
        self.push(MockResponse {
            status,
            body: body.to_string(),
            delay: None,
        })
    }

    /// Queue a response that is only sent after `delay`
    pub fn respond_after(&self, delay: Duration, status: u16, body: Value) -> &Self {
        self.push(MockResponse {
            status,
            body: body.to_string(),
            delay: Some(delay),
        })
    }

    fn push(&self, response: MockResponse) -> &Self {
        self.state.lock().unwrap().responses.push_back(response);
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn base_url(&self) -> String {
        format!("http://{}/api/", self.addr)
    }

    pub fn client(&self) -> MochiClient {
        self.client_with_timeout(Duration::from_secs(5))
    }

    pub fn client_with_timeout(&self, timeout: Duration) -> MochiClient {
        MochiClient::with_options(TOKEN, &self.base_url(), timeout).unwrap()
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn record_and_respond(
    State(state): State<SharedState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let response = {
        let mut state = state.lock().unwrap();
        state.requests.push(RecordedRequest {
            method: method.to_string(),
            path: uri.path().to_string(),
            query: uri.query().map(str::to_string),
            headers: headers
                .iter()
                .map(|(name, value)| {
                    let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
                    (name.as_str().to_string(), value)
                })
                .collect::<HashMap<_, _>>(),
            body: String::from_utf8_lossy(&body).into_owned(),
        });
        state.responses.pop_front().unwrap_or(MockResponse {
            status: 500,
            body: r#"["no response queued"]"#.to_string(),
            delay: None,
        })
    };

    if let Some(delay) = response.delay {
        tokio::time::sleep(delay).await;
    }

    let status = StatusCode::from_u16(response.status).unwrap();
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        response.body,
    )
        .into_response()
}

pub fn card_json(id: &str, deck_id: &str) -> Value {
    serde_json::json!({
        "id": id,
        "tags": [],
        "content": "Question\n---\nAnswer",
        "name": "Question",
        "deck-id": deck_id,
        "created-at": { "date": "2024-01-01T00:00:00.000Z" },
        "reviews": []
    })
}

pub fn deck_json(id: &str, name: &str, archived: Option<bool>) -> Value {
    let mut deck = serde_json::json!({ "id": id, "sort": 1, "name": name });
    if let Some(archived) = archived {
        deck["archived?"] = Value::Bool(archived);
    }
    deck
}

pub fn template_json(id: &str) -> Value {
    serde_json::json!({
        "id": id,
        "name": "Basic",
        "content": "<< Front >>\n---\n<< Back >>",
        "pos": "a",
        "fields": {
            "name": { "id": "name", "name": "Front", "pos": "a" },
            "back": { "id": "back", "name": "Back", "pos": "b", "options": { "multi-line?": true } }
        }
    })
}
