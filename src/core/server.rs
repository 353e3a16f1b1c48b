/// MCP Server Implementation
///
/// This module contains the core MCP server implementation including:
/// - JSON-RPC 2.0 request/response structures
/// - Tool registry for managing available tools
/// - Method dispatch shared by both transports
/// - HTTP server setup with Actix Web
/// - STDIO server implementation for line-based communication

use actix_web::{
    web, App, HttpServer, HttpResponse, Result,
    http::StatusCode,
    middleware::{Compress, Logger, DefaultHeaders},
};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, error, info, warn};

use crate::core::config::Config;
use crate::core::error::ToolError;
use crate::tools;
use crate::tools::current_time::Clock;

pub const JSONRPC_VERSION: &str = "2.0";
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// JSON-RPC error codes used by this server.
pub mod error_codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
}

/// Application state shared across all worker threads in HTTP mode.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Server name as reported in MCP initialize responses
    pub server_name: String,
    /// Server version string as reported in MCP initialize responses
    pub server_version: String,
}

impl AppState {
    pub fn from_config(config: &Config) -> Self {
        Self {
            server_name: config.server_name.clone(),
            server_version: config.server_version.clone(),
        }
    }
}

/// JSON-RPC 2.0 request structure for MCP protocol.
///
/// `id` is None only when the field is absent (a notification, which never
/// receives a response). An explicit `"id": null` is kept as `Some(Null)`.
#[derive(Deserialize, Debug)]
pub struct MCPRequest {
    #[allow(dead_code)]
    jsonrpc: String,
    #[serde(default, deserialize_with = "present_id")]
    id: Option<Value>,
    method: String,
    params: Option<Value>,
}

fn present_id<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// A request body that could not be parsed, with its `id` when recoverable.
#[derive(Debug)]
pub struct ParseFailure {
    pub id: Option<Value>,
    pub message: String,
}

impl ParseFailure {
    pub fn into_response(self) -> MCPResponse {
        MCPResponse::failure(
            self.id,
            error_codes::PARSE_ERROR,
            format!("Parse error: {}", self.message),
        )
    }
}

/// Parse one JSON-RPC request, salvaging the `id` from malformed requests
/// that are still valid JSON.
pub fn parse_request(raw: &[u8]) -> Result<MCPRequest, ParseFailure> {
    serde_json::from_slice::<MCPRequest>(raw).map_err(|e| ParseFailure {
        id: serde_json::from_slice::<Value>(raw)
            .ok()
            .and_then(|partial| partial.get("id").cloned()),
        message: e.to_string(),
    })
}

/// JSON-RPC 2.0 response structure for MCP protocol.
#[derive(Serialize, Debug)]
pub struct MCPResponse {
    jsonrpc: String,
    id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<MCPError>,
}

impl MCPResponse {
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: Option<Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(MCPError {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }
}

/// JSON-RPC 2.0 error structure.
#[derive(Serialize, Debug)]
pub struct MCPError {
    code: i32,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

/// Primitive JSON type of a tool parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    String,
    Integer,
}

impl ParamKind {
    fn schema_type(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
        }
    }
}

/// Description of one tool parameter. All parameters are required.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolParam {
    pub name: String,
    pub kind: ParamKind,
    pub description: String,
}

impl ToolParam {
    pub fn string(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: ParamKind::String,
            description: description.to_string(),
        }
    }

    pub fn integer(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: ParamKind::Integer,
            description: description.to_string(),
        }
    }
}

/// MCP tool definition structure.
///
/// Serialized as-is for tools/list. The JSON schema is derived from `params`
/// when the tool is built.
#[derive(Serialize, Debug, Clone)]
pub struct MCPTool {
    /// Unique tool identifier (e.g., "greet", "addNumbers")
    pub name: String,
    /// Human-readable description of what the tool does
    pub description: String,
    /// JSON Schema defining the tool's input parameters
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
    #[serde(skip)]
    pub params: Vec<ToolParam>,
}

impl MCPTool {
    pub fn new(name: &str, description: &str, params: Vec<ToolParam>) -> Self {
        let properties: serde_json::Map<String, Value> = params
            .iter()
            .map(|p| {
                (
                    p.name.clone(),
                    serde_json::json!({
                        "type": p.kind.schema_type(),
                        "description": p.description
                    }),
                )
            })
            .collect();
        let required: Vec<&str> = params.iter().map(|p| p.name.as_str()).collect();

        let input_schema = serde_json::json!({
            "type": "object",
            "properties": properties,
            "required": required
        });

        Self {
            name: name.to_string(),
            description: description.to_string(),
            input_schema,
            params,
        }
    }
}

/// Tool handler function type definition.
///
/// Handlers take the JSON `arguments` object and return the tool's single
/// result value. They must be Send + Sync to be shared across worker threads.
pub type ToolHandler = Box<dyn Fn(Value) -> Result<Value, ToolError> + Send + Sync>;

/// Registry of available MCP tools.
///
/// Keeps tool definitions in registration order for discovery and a map of
/// tool names to handlers for execution.
pub struct ToolRegistry {
    tools: Vec<MCPTool>,
    handlers: HashMap<String, ToolHandler>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: Vec::new(),
            handlers: HashMap::new(),
        }
    }

    /// Register a tool with the registry.
    ///
    /// Registering a name that already exists replaces its definition and
    /// handler in place, so the listing never holds duplicates.
    pub fn register(&mut self, tool: MCPTool, handler: ToolHandler) {
        let name = tool.name.clone();
        match self.tools.iter_mut().find(|t| t.name == name) {
            Some(existing) => *existing = tool,
            None => self.tools.push(tool),
        }
        self.handlers.insert(name, handler);
    }

    /// All registered tools, in registration order.
    pub fn tools(&self) -> &[MCPTool] {
        &self.tools
    }

    pub fn get(&self, name: &str) -> Option<&MCPTool> {
        self.tools.iter().find(|t| t.name == name)
    }

    /// Run a tool by name. Returns None when no such tool is registered.
    pub fn call(&self, name: &str, arguments: Value) -> Option<Result<Value, ToolError>> {
        self.handlers.get(name).map(|handler| handler(arguments))
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Initialize and register all tools.
///
/// Called once at startup; the returned registry is shared read-only by
/// every transport.
pub fn initialize_tools(clock: Arc<dyn Clock>) -> Arc<ToolRegistry> {
    let mut registry = ToolRegistry::new();
    tools::register_all(&mut registry, clock);
    info!(tools = registry.len(), "tool registry initialized");
    Arc::new(registry)
}

/// Render a tool result as the text of an MCP content block.
///
/// Strings are passed through unquoted; other values use their JSON form.
fn result_text(result: &Value) -> String {
    match result {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Route one JSON-RPC request to its method handler.
///
/// Returns None for notifications, which get no response.
pub fn dispatch(state: &AppState, registry: &ToolRegistry, req: MCPRequest) -> Option<MCPResponse> {
    let Some(id) = req.id else {
        debug!(method = %req.method, "notification received");
        return None;
    };
    let id = Some(id);

    let response = match req.method.as_str() {
        "initialize" => handle_initialize(state, id),
        "ping" => MCPResponse::success(id, serde_json::json!({})),
        "tools/list" => handle_tools_list(registry, id),
        "tools/call" => handle_tools_call(registry, id, req.params),
        other => {
            warn!(method = other, "method not found");
            MCPResponse::failure(
                id,
                error_codes::METHOD_NOT_FOUND,
                format!("Method not found: {}", other),
            )
        }
    };
    Some(response)
}

/// Handle MCP initialize method.
fn handle_initialize(state: &AppState, id: Option<Value>) -> MCPResponse {
    MCPResponse::success(
        id,
        serde_json::json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {
                "tools": {}
            },
            "serverInfo": {
                "name": state.server_name,
                "version": state.server_version
            }
        }),
    )
}

/// Handle MCP tools/list method.
fn handle_tools_list(registry: &ToolRegistry, id: Option<Value>) -> MCPResponse {
    MCPResponse::success(id, serde_json::json!({ "tools": registry.tools() }))
}

/// Handle MCP tools/call method.
///
/// Argument errors are reported inside the result with `isError: true`;
/// an unknown tool name is a JSON-RPC error.
fn handle_tools_call(registry: &ToolRegistry, id: Option<Value>, params: Option<Value>) -> MCPResponse {
    let Some(tool_params) = params else {
        return MCPResponse::failure(id, error_codes::INVALID_PARAMS, "Invalid params");
    };

    let Some(tool_name) = tool_params.get("name").and_then(|v| v.as_str()) else {
        return MCPResponse::failure(id, error_codes::INVALID_PARAMS, "Missing tool name");
    };
    let arguments = tool_params
        .get("arguments")
        .cloned()
        .unwrap_or_else(|| serde_json::json!({}));

    match registry.call(tool_name, arguments) {
        Some(Ok(result)) => {
            debug!(tool = tool_name, "tool call succeeded");
            MCPResponse::success(
                id,
                serde_json::json!({
                    "content": [{ "type": "text", "text": result_text(&result) }],
                    "isError": false
                }),
            )
        }
        Some(Err(e)) => {
            warn!(tool = tool_name, error = %e, "tool call rejected");
            MCPResponse::success(
                id,
                serde_json::json!({
                    "content": [{ "type": "text", "text": format!("Error: {}", e) }],
                    "isError": true
                }),
            )
        }
        None => MCPResponse::failure(
            id,
            error_codes::METHOD_NOT_FOUND,
            format!("Unknown tool: {}", tool_name),
        ),
    }
}

/// Plain invocation request for the `/invoke` endpoint.
#[derive(Deserialize, Debug)]
pub struct InvokeRequest {
    pub operation: String,
    #[serde(default)]
    pub arguments: Option<Value>,
}

/// Health check endpoint handler.
async fn health(state: web::Data<AppState>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "service": state.server_name
    })))
}

/// MCP JSON-RPC request handler.
///
/// Counts the request for the metrics endpoint and dispatches it.
/// Notifications are acknowledged with 202 and an empty body; unparsable
/// bodies get a JSON-RPC parse error with status 400.
async fn mcp_handler(
    state: web::Data<AppState>,
    registry: web::Data<ToolRegistry>,
    counter: web::Data<AtomicU64>,
    body: web::Bytes,
) -> Result<HttpResponse> {
    counter.fetch_add(1, Ordering::Relaxed);

    let req = match parse_request(&body) {
        Ok(req) => req,
        Err(failure) => {
            warn!(error = %failure.message, "parse error on HTTP request");
            return Ok(HttpResponse::BadRequest().json(failure.into_response()));
        }
    };

    match dispatch(&state, &registry, req) {
        Some(response) => Ok(HttpResponse::Ok().json(response)),
        None => Ok(HttpResponse::Accepted().finish()),
    }
}

/// Direct operation call: `{"operation", "arguments"}` in, `{"result"}` out.
async fn invoke_handler(
    registry: web::Data<ToolRegistry>,
    counter: web::Data<AtomicU64>,
    req: web::Json<InvokeRequest>,
) -> Result<HttpResponse> {
    counter.fetch_add(1, Ordering::Relaxed);

    let InvokeRequest { operation, arguments } = req.into_inner();
    let arguments = arguments.unwrap_or_else(|| serde_json::json!({}));

    let (status, body) = match registry.call(&operation, arguments) {
        Some(Ok(result)) => (StatusCode::OK, serde_json::json!({ "result": result })),
        Some(Err(e)) => (StatusCode::BAD_REQUEST, serde_json::json!({ "error": e.to_string() })),
        None => (
            StatusCode::NOT_FOUND,
            serde_json::json!({ "error": format!("Unknown operation: {}", operation) }),
        ),
    };
    Ok(HttpResponse::build(status).json(body))
}

/// Metrics endpoint handler: total MCP and invoke requests since start.
async fn metrics_handler(counter: web::Data<AtomicU64>) -> Result<HttpResponse> {
    let count = counter.load(Ordering::Relaxed);
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "requests_total": count,
        "status": "ok"
    })))
}

/// Server-Sent Events endpoint for tools discovery.
///
/// Emits a single event carrying every registered tool and the tool count.
async fn sse_tools_discovery(registry: web::Data<ToolRegistry>) -> Result<HttpResponse> {
    use actix_web::http::header;

    let tools_data = serde_json::json!({
        "tools": registry.tools(),
        "count": registry.len()
    });
    let sse_data = format!(
        "data: {}\n\n",
        serde_json::to_string(&tools_data).unwrap_or_else(|_| "{}".to_string())
    );

    Ok(HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header(header::CacheControl(vec![
            header::CacheDirective::NoCache,
            header::CacheDirective::NoStore,
            header::CacheDirective::MustRevalidate,
        ]))
        // Disable nginx buffering for real-time streaming
        .insert_header(("x-accel-buffering", "no"))
        .body(sse_data))
}

/// Route table shared by the server and the HTTP tests.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health))
        .route("/metrics", web::get().to(metrics_handler))
        .route("/sse", web::get().to(sse_tools_discovery))
        .route("/invoke", web::post().to(invoke_handler))
        .route("/mcp", web::post().to(mcp_handler))
        .route("/", web::post().to(mcp_handler))
        .route("/", web::get().to(health));
}

/// Run the MCP server in HTTP mode.
///
/// The server is configured with:
/// - Worker threads: from config (CPU count capped at 16 by default)
/// - Max connections: 10,000 concurrent connections
/// - Connection rate limit: 1,000 connections per second
/// - Keep-alive and request timeout: 30 seconds
/// - Disconnect timeout: 2 seconds
/// - Shutdown timeout: 10 seconds
pub async fn run_server_http(config: &Config, registry: Arc<ToolRegistry>) -> std::io::Result<()> {
    use std::time::Duration;

    let bind_addr = config.bind_addr();
    let app_state = web::Data::new(AppState::from_config(config));
    let tool_registry = web::Data::from(registry);
    let request_count = web::Data::new(AtomicU64::new(0));

    info!(
        name = %config.server_name,
        version = %config.server_version,
        bind = %bind_addr,
        workers = config.workers,
        "MCP server starting (HTTP mode)"
    );

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .app_data(tool_registry.clone())
            .app_data(request_count.clone())
            .wrap(Compress::default())
            .wrap(
                DefaultHeaders::new()
                    .add(("X-Content-Type-Options", "nosniff"))
                    .add(("X-Frame-Options", "DENY"))
                    .add(("X-XSS-Protection", "1; mode=block"))
            )
            // %r = request line, %s = status, %Dms = duration in milliseconds
            .wrap(Logger::new("%r %s %Dms"))
            .configure(configure_routes)
    })
    .workers(config.workers)
    .max_connections(10000)
    .max_connection_rate(1000)
    .keep_alive(Duration::from_secs(30))
    .client_request_timeout(Duration::from_secs(30))
    .client_disconnect_timeout(Duration::from_secs(2))
    .shutdown_timeout(10)
    .bind(&bind_addr)?
    .run()
    .await
}

/// Run the MCP server in STDIO mode on the process's stdin and stdout.
pub async fn run_server_stdio(config: &Config, registry: Arc<ToolRegistry>) -> std::io::Result<()> {
    use tokio::io::{BufReader, BufWriter};

    info!(
        name = %config.server_name,
        version = %config.server_version,
        "MCP server starting (STDIO mode)"
    );

    let state = AppState::from_config(config);
    let stdin = BufReader::with_capacity(8192, tokio::io::stdin());
    let stdout = BufWriter::with_capacity(8192, tokio::io::stdout());
    serve_lines(stdin, stdout, &state, &registry).await
}

/// Serve line-delimited JSON-RPC from `reader`, writing responses to `writer`.
///
/// Each response is written on its own line and flushed immediately. Lines
/// that fail to parse get a parse error only when an `id` can be recovered.
pub async fn serve_lines<R, W>(
    reader: R,
    mut writer: W,
    state: &AppState,
    registry: &ToolRegistry,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let response = match parse_request(line.as_bytes()) {
            Ok(req) => dispatch(state, registry, req),
            Err(failure) => {
                warn!(error = %failure.message, "parse error on stdin");
                if failure.id.is_some() {
                    Some(failure.into_response())
                } else {
                    None
                }
            }
        };

        let Some(response) = response else {
            continue;
        };

        let response_json = match serde_json::to_string(&response) {
            Ok(json) => json,
            Err(e) => {
                error!(error = %e, "failed to serialize response");
                continue;
            }
        };

        writer.write_all(response_json.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
    }

    debug!("stdin closed, STDIO server exiting");
    Ok(())
}
