//! Model Context Protocol (MCP) server
//!
//! Exposes the Mochi tools, resources, and prompts to MCP clients over
//! JSON-RPC 2.0.
//!
//! # Example
//!
//! ```rust,ignore
//! use mochi_core::mcp::{McpServer, StdioTransport};
//!
//! let api = Arc::new(MochiClient::from_config(&config)?);
//! let server = McpServer::from_config(&config, api);
//!
//! server.run(StdioTransport::new()).await?;
//! ```
//!
//! # Protocol Overview
//!
//! - `initialize` / `notifications/initialized` - Connection setup
//! - `ping` - Liveness check
//! - `tools/list` / `tools/call` - The Mochi tool catalog
//! - `resources/list` / `resources/templates/list` / `resources/read` - `mochi://` URIs
//! - `prompts/list` / `prompts/get` - Flashcard writing prompts

mod prompts;
mod protocol;
mod resources;
mod server;
mod transport;

pub use prompts::{mochi_prompts, write_flashcard, PromptTemplate};
pub use protocol::*;
pub use resources::{MochiResources, ResourceProvider};
pub use server::{McpServer, McpServerBuilder, McpServerConfig};
pub use transport::{MemoryTransport, StdioTransport, Transport};
