//! # Mochi MCP
//!
//! A Model Context Protocol adapter for the [Mochi](https://mochi.cards)
//! flashcard API. LLM clients create, update and list cards, decks and
//! templates through MCP tool calls instead of raw HTTP.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mochi_core::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = MochiConfig::load()?.with_token("my-api-key");
//!     let client = Arc::new(MochiClient::from_config(&config)?);
//!
//!     let server = McpServer::from_config(&config, client);
//!     server.run(StdioTransport::new()).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **schema**: request parsing and response validation for every payload
//! - **client**: the authenticated HTTP client behind [`client::FlashcardApi`]
//! - **tools**: one MCP tool per Mochi operation
//! - **mcp**: JSON-RPC types, transports, resources, prompts and the server

pub mod client;
pub mod config;
pub mod error;
pub mod mcp;
pub mod schema;
pub mod tools;

/// Current library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Re-export commonly used types
pub mod prelude {
    pub use crate::client::{FlashcardApi, MochiClient};
    pub use crate::config::MochiConfig;
    pub use crate::error::{ErrorKind, MochiError, Result};
    pub use crate::mcp::{McpServer, McpServerBuilder, StdioTransport, Transport};
    pub use crate::schema::{
        Card, CreateCardRequest, Deck, ListCardsParams, Template, UpdateCardRequest,
    };
    pub use crate::tools::{mochi_tools, Tool, ToolError, ToolRegistry};
}
