//! MCP Transport Implementations
//!
//! Transports handle the I/O for MCP communication.

use super::protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, RequestId};
use crate::error::{MochiError, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Stdin, Stdout};

/// Transport trait for MCP communication
#[async_trait]
pub trait Transport: Send + Sync {
    /// Receive the next request; `None` once the peer has gone away
    async fn receive(&mut self) -> Result<Option<JsonRpcRequest>>;

    /// Send a response through the transport
    async fn send(&mut self, response: JsonRpcResponse) -> Result<()>;
}

/// Stdio transport for MCP
///
/// Messages are newline-delimited JSON. A line that is not a JSON-RPC
/// request is answered with a parse error and skipped.
pub struct StdioTransport<R = BufReader<Stdin>, W = Stdout> {
    reader: R,
    writer: W,
}

impl StdioTransport {
    /// Create a transport over the process stdin and stdout
    pub fn new() -> Self {
        Self::from_io(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

impl Default for StdioTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl<R, W> StdioTransport<R, W>
where
    R: AsyncBufRead + Unpin + Send + Sync,
    W: AsyncWrite + Unpin + Send + Sync,
{
    /// Create a transport over any line reader and writer
    pub fn from_io(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Give back the writer, e.g. to inspect what was sent
    pub fn into_writer(self) -> W {
        self.writer
    }

    async fn write_line(&mut self, response: &JsonRpcResponse) -> Result<()> {
        let mut json = serde_json::to_string(response)?;
        json.push('\n');

        self.writer
            .write_all(json.as_bytes())
            .await
            .map_err(|e| MochiError::Transport(format!("Failed to write response: {}", e)))?;
        self.writer
            .flush()
            .await
            .map_err(|e| MochiError::Transport(format!("Failed to flush response: {}", e)))
    }
}

#[async_trait]
impl<R, W> Transport for StdioTransport<R, W>
where
    R: AsyncBufRead + Unpin + Send + Sync,
    W: AsyncWrite + Unpin + Send + Sync,
{
    async fn receive(&mut self) -> Result<Option<JsonRpcRequest>> {
        loop {
            let mut line = Vec::new();
            let read = self
                .reader
                .read_until(b'\n', &mut line)
                .await
                .map_err(|e| MochiError::Transport(format!("Failed to read request: {}", e)))?;

            if read == 0 {
                return Ok(None);
            }

            let error = match std::str::from_utf8(&line) {
                Ok(text) if text.trim().is_empty() => continue,
                Ok(text) => match serde_json::from_str::<serde_json::Value>(text.trim()) {
                    Ok(value) => match serde_json::from_value::<JsonRpcRequest>(value) {
                        Ok(request) => return Ok(Some(request)),
                        Err(e) => JsonRpcError::invalid_request().with_data(e.to_string().into()),
                    },
                    Err(e) => JsonRpcError::parse_error().with_data(e.to_string().into()),
                },
                Err(e) => JsonRpcError::parse_error().with_data(e.to_string().into()),
            };

            tracing::warn!(code = error.code, "Discarding malformed JSON-RPC message");
            self.write_line(&JsonRpcResponse::error(RequestId::Null, error))
                .await?;
        }
    }

    async fn send(&mut self, response: JsonRpcResponse) -> Result<()> {
        self.write_line(&response).await
    }
}

/// In-memory transport for testing
#[derive(Default)]
pub struct MemoryTransport {
    requests: VecDeque<JsonRpcRequest>,
    responses: Vec<JsonRpcResponse>,
}

impl MemoryTransport {
    /// Create a new memory transport
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a request to be received
    pub fn push_request(&mut self, request: JsonRpcRequest) {
        self.requests.push_back(request);
    }

    /// Get all sent responses
    pub fn responses(&self) -> &[JsonRpcResponse] {
        &self.responses
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn receive(&mut self) -> Result<Option<JsonRpcRequest>> {
        Ok(self.requests.pop_front())
    }

    async fn send(&mut self, response: JsonRpcResponse) -> Result<()> {
        self.responses.push(response);
        Ok(())
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for &mut T {
    async fn receive(&mut self) -> Result<Option<JsonRpcRequest>> {
        (**self).receive().await
    }

    async fn send(&mut self, response: JsonRpcResponse) -> Result<()> {
        (**self).send(response).await
    }
}
