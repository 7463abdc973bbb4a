//! MCP Server Implementation
//!
//! The main server that handles MCP requests and dispatches to tools and resources.

use super::prompts::{mochi_prompts, PromptTemplate};
use super::protocol::*;
use super::resources::{MochiResources, ResourceProvider};
use super::transport::Transport;
use crate::client::FlashcardApi;
use crate::config::{MochiConfig, ServerConfig};
use crate::error::MochiError;
use crate::tools::{mochi_tools, Tool, ToolError, ToolExecutionContext, ToolProvenance, ToolRegistry};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::Instrument;

/// MCP Server configuration
#[derive(Debug, Clone)]
pub struct McpServerConfig {
    /// Server name
    pub name: String,
    /// Server version
    pub version: String,
    /// Whether to expose tools
    pub enable_tools: bool,
    /// Whether to expose resources
    pub enable_resources: bool,
    /// Whether to expose prompts
    pub enable_prompts: bool,
    /// Tool allowlist (None = allow all registered tools)
    pub tool_allowlist: Option<Vec<String>>,
}

impl Default for McpServerConfig {
    fn default() -> Self {
        Self::from(&ServerConfig::default())
    }
}

impl From<&ServerConfig> for McpServerConfig {
    fn from(config: &ServerConfig) -> Self {
        Self {
            name: config.name.clone(),
            version: config.version.clone(),
            enable_tools: true,
            enable_resources: config.enable_resources,
            enable_prompts: config.enable_prompts,
            tool_allowlist: config.tool_allowlist.clone(),
        }
    }
}

/// MCP Server state
pub struct McpServer {
    config: McpServerConfig,
    tools: ToolRegistry,
    resources: Vec<Box<dyn ResourceProvider>>,
    prompts: BTreeMap<String, PromptTemplate>,
}

impl std::fmt::Debug for McpServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("McpServer")
            .field("config", &self.config)
            .field("tools", &self.tools)
            .field("resource_providers", &self.resources.len())
            .field("prompts", &self.prompts.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl McpServer {
    /// Create a new MCP server builder
    pub fn builder() -> McpServerBuilder {
        McpServerBuilder::new()
    }

    /// Server exposing every Mochi tool, resource, and prompt over `api`,
    /// shaped by the `server` section of `config`
    pub fn from_config(config: &MochiConfig, api: Arc<dyn FlashcardApi>) -> Self {
        let mut builder = Self::builder()
            .config(McpServerConfig::from(&config.server))
            .with_tools(mochi_tools(Arc::clone(&api)))
            .with_resource_provider(Box::new(MochiResources::new(api)));

        for prompt in mochi_prompts() {
            builder = builder.with_prompt(prompt);
        }

        builder.build()
    }

    /// Server configuration
    pub fn config(&self) -> &McpServerConfig {
        &self.config
    }

    /// Tool registry
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Handle an incoming JSON-RPC message.
    ///
    /// Returns `None` for notifications, which are never answered.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let Some(id) = request.id.clone() else {
            self.handle_notification(&request);
            return None;
        };

        tracing::debug!(method = %request.method, ?id, "MCP request");

        let result = match request.method.as_str() {
            "initialize" => self.handle_initialize(request.params),
            "ping" => Ok(Value::Object(Default::default())),
            "tools/list" => self.handle_tools_list(),
            "tools/call" => self.handle_tools_call(request.params).await,
            "resources/list" => self.handle_resources_list().await,
            "resources/templates/list" => self.handle_resource_templates_list(),
            "resources/read" => self.handle_resources_read(request.params).await,
            "prompts/list" => self.handle_prompts_list(),
            "prompts/get" => self.handle_prompts_get(request.params),
            _ => Err(JsonRpcError::method_not_found()),
        };

        Some(match result {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(error) => JsonRpcResponse::error(id, error),
        })
    }

    fn handle_notification(&self, request: &JsonRpcRequest) {
        match request.method.as_str() {
            "notifications/initialized" | "initialized" => {
                tracing::info!("MCP client initialized");
            }
            method => tracing::debug!(%method, "Ignoring notification"),
        }
    }

    /// Handle initialize request
    fn handle_initialize(&self, params: Option<Value>) -> Result<Value, JsonRpcError> {
        if params.is_some() {
            let params: InitializeParams = parse_params(params, "initialize")?;
            tracing::info!(
                client = %params.client_info.name,
                client_version = %params.client_info.version,
                protocol_version = %params.protocol_version,
                "MCP client connected"
            );
        }

        to_result(&InitializeResult {
            protocol_version: MCP_PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities::new(
                self.config.enable_tools,
                self.config.enable_resources,
                self.config.enable_prompts,
            ),
            server_info: ServerInfo {
                name: self.config.name.clone(),
                version: self.config.version.clone(),
            },
        })
    }

    fn tool_allowed(&self, name: &str) -> bool {
        self.config
            .tool_allowlist
            .as_ref()
            .is_none_or(|allowlist| allowlist.iter().any(|allowed| allowed == name))
    }

    /// Handle tools/list request
    fn handle_tools_list(&self) -> Result<Value, JsonRpcError> {
        if !self.config.enable_tools {
            return Err(JsonRpcError::capability_disabled("Tools"));
        }

        let tools = self
            .tools
            .mcp_tools()
            .into_iter()
            .filter(|tool| self.tool_allowed(&tool.name))
            .collect();

        to_result(&ToolsListResult { tools })
    }

    /// Handle tools/call request
    ///
    /// Every tool-level failure, unknown names included, is reported inside
    /// a successful response with `isError` set.
    async fn handle_tools_call(&self, params: Option<Value>) -> Result<Value, JsonRpcError> {
        if !self.config.enable_tools {
            return Err(JsonRpcError::capability_disabled("Tools"));
        }

        let params: ToolCallParams = parse_params(params, "tools/call")?;

        let tool = match self.tools.get(&params.name) {
            Some(tool) if self.tool_allowed(&params.name) => Arc::clone(tool),
            _ => {
                tracing::warn!(tool = %params.name, "Call to unknown tool");
                let message = MochiError::UnknownTool(params.name).to_string();
                return to_result(&ToolCallResult::error(message));
            }
        };

        let ctx = ToolExecutionContext::new();
        let span = tracing::info_span!("tool_call", tool = %params.name, trace_id = %ctx.trace_id);
        let result = self
            .call_tool(tool.as_ref(), params.arguments, &ctx)
            .instrument(span)
            .await;

        to_result(&result)
    }

    async fn call_tool(
        &self,
        tool: &dyn Tool,
        arguments: Value,
        ctx: &ToolExecutionContext,
    ) -> ToolCallResult {
        let provenance = ToolProvenance::start(tool.name(), &arguments, ctx.trace_id.as_str());
        let outcome = tool.execute(arguments, ctx).await;
        let provenance = provenance.finish();

        match outcome {
            Ok(value) => {
                tracing::debug!(
                    args_hash = %provenance.args_hash,
                    duration_ms = provenance.duration.as_millis() as u64,
                    "Tool call succeeded"
                );
                match serde_json::to_string_pretty(&value) {
                    Ok(text) => ToolCallResult::text(text),
                    Err(e) => ToolCallResult::error(ToolError::from(MochiError::from(e)).display_text()),
                }
            }
            Err(error) => {
                tracing::debug!(
                    args_hash = %provenance.args_hash,
                    duration_ms = provenance.duration.as_millis() as u64,
                    kind = ?error.kind,
                    "Tool call failed"
                );
                ToolCallResult::error(error.display_text())
            }
        }
    }

    /// Handle resources/list request
    async fn handle_resources_list(&self) -> Result<Value, JsonRpcError> {
        if !self.config.enable_resources {
            return Err(JsonRpcError::capability_disabled("Resources"));
        }

        let mut resources = Vec::new();
        for provider in &self.resources {
            resources.extend(provider.list_resources().await);
        }

        to_result(&ResourcesListResult { resources })
    }

    /// Handle resources/templates/list request
    fn handle_resource_templates_list(&self) -> Result<Value, JsonRpcError> {
        if !self.config.enable_resources {
            return Err(JsonRpcError::capability_disabled("Resources"));
        }

        let resource_templates = self
            .resources
            .iter()
            .flat_map(|provider| provider.resource_templates())
            .collect();

        to_result(&ResourceTemplatesListResult { resource_templates })
    }

    /// Handle resources/read request
    async fn handle_resources_read(&self, params: Option<Value>) -> Result<Value, JsonRpcError> {
        if !self.config.enable_resources {
            return Err(JsonRpcError::capability_disabled("Resources"));
        }

        let params: ResourceReadParams = parse_params(params, "resources/read")?;

        for provider in &self.resources {
            match provider.read_resource(&params.uri).await {
                Ok(Some(content)) => {
                    return to_result(&ResourceReadResult {
                        contents: vec![content],
                    });
                }
                Ok(None) => continue,
                Err(e) => {
                    tracing::warn!(uri = %params.uri, error = %e, "Resource read failed");
                    return Err(JsonRpcError::internal_error(ToolError::from(e).display_text()));
                }
            }
        }

        Err(JsonRpcError::resource_not_found(&params.uri))
    }

    /// Handle prompts/list request
    fn handle_prompts_list(&self) -> Result<Value, JsonRpcError> {
        if !self.config.enable_prompts {
            return Err(JsonRpcError::capability_disabled("Prompts"));
        }

        let prompts = self.prompts.values().map(PromptTemplate::to_mcp).collect();
        to_result(&PromptsListResult { prompts })
    }

    /// Handle prompts/get request
    fn handle_prompts_get(&self, params: Option<Value>) -> Result<Value, JsonRpcError> {
        if !self.config.enable_prompts {
            return Err(JsonRpcError::capability_disabled("Prompts"));
        }

        let params: PromptGetParams = parse_params(params, "prompts/get")?;

        let Some(prompt) = self.prompts.get(&params.name) else {
            return Err(JsonRpcError::invalid_params(format!(
                "Prompt '{}' not found",
                params.name
            )));
        };

        let args: HashMap<String, String> = match params.arguments {
            Value::Object(map) => map
                .into_iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k, s.to_string())))
                .collect(),
            _ => HashMap::new(),
        };

        let missing = prompt.missing_arguments(&args);
        if !missing.is_empty() {
            return Err(JsonRpcError::invalid_params(format!(
                "Missing required prompt arguments: {}",
                missing.join(", ")
            )));
        }

        to_result(&PromptGetResult {
            description: prompt.description.clone(),
            messages: vec![PromptMessage::user(prompt.render(&args))],
        })
    }

    /// Serve requests until the transport closes.
    ///
    /// # Errors
    ///
    /// Returns the transport error that ended the session, if any.
    pub async fn run<T: Transport>(&self, mut transport: T) -> crate::error::Result<()> {
        loop {
            match transport.receive().await {
                Ok(Some(request)) => {
                    if let Some(response) = self.handle_request(request).await {
                        transport.send(response).await?;
                    }
                }
                Ok(None) => {
                    tracing::info!("Transport closed");
                    break;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Transport error");
                    return Err(e);
                }
            }
        }
        Ok(())
    }
}

fn parse_params<T: DeserializeOwned>(params: Option<Value>, method: &str) -> Result<T, JsonRpcError> {
    let params = params
        .ok_or_else(|| JsonRpcError::invalid_params(format!("Missing {} params", method)))?;
    serde_json::from_value(params)
        .map_err(|e| JsonRpcError::invalid_params(format!("Invalid {} params: {}", method, e)))
}

fn to_result<T: Serialize>(result: &T) -> Result<Value, JsonRpcError> {
    serde_json::to_value(result).map_err(|e| JsonRpcError::internal_error(e.to_string()))
}

/// Builder for MCP Server
#[derive(Default)]
pub struct McpServerBuilder {
    config: McpServerConfig,
    tools: ToolRegistry,
    resources: Vec<Box<dyn ResourceProvider>>,
    prompts: BTreeMap<String, PromptTemplate>,
}

impl McpServerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: McpServerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.config.version = version.into();
        self
    }

    pub fn with_tools(mut self, registry: ToolRegistry) -> Self {
        self.tools = registry;
        self
    }

    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        if let Err(e) = self.tools.register(tool) {
            tracing::warn!(error = %e, "Skipping tool");
        }
        self
    }

    pub fn with_resource_provider(mut self, provider: Box<dyn ResourceProvider>) -> Self {
        self.resources.push(provider);
        self
    }

    pub fn with_prompt(mut self, prompt: PromptTemplate) -> Self {
        self.prompts.insert(prompt.name.clone(), prompt);
        self
    }

    pub fn with_tool_allowlist(mut self, tools: Vec<String>) -> Self {
        self.config.tool_allowlist = Some(tools);
        self
    }

    pub fn enable_tools(mut self, enable: bool) -> Self {
        self.config.enable_tools = enable;
        self
    }

    pub fn enable_resources(mut self, enable: bool) -> Self {
        self.config.enable_resources = enable;
        self
    }

    pub fn enable_prompts(mut self, enable: bool) -> Self {
        self.config.enable_prompts = enable;
        self
    }

    pub fn build(self) -> McpServer {
        McpServer {
            config: self.config,
            tools: self.tools,
            resources: self.resources,
            prompts: self.prompts,
        }
    }
}
