/// Core Server Framework Module
///
/// This module contains the core server implementation including:
/// - config.rs: Environment-based server configuration
/// - error.rs: Error types for tools, configuration and startup
/// - server.rs: MCP server implementation with HTTP and STDIO transport
/// - utils.rs: Tool argument extraction helpers

pub mod config;
pub mod error;
pub mod server;
pub mod utils;
