/// MCP Server Entry Point
///
/// Reads configuration from the environment, builds the tool registry once,
/// and starts the selected transports. See `core::config` for the variables.
/// Logs go to stderr so they never mix with the STDIO protocol stream; set
/// RUST_LOG to adjust verbosity (default: info).

mod core;
mod tools;

use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::core::config::{Config, TransportMode};
use crate::core::error::ServerError;
use crate::core::server;
use crate::tools::current_time::SystemClock;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    init_tracing();

    let config = Config::from_env().inspect_err(|e| error!(error = %e, "invalid configuration"))?;
    let registry = server::initialize_tools(Arc::new(SystemClock));

    match config.transport {
        TransportMode::Stdio => server::run_server_stdio(&config, registry).await?,
        TransportMode::Http => server::run_server_http(&config, registry).await?,
        TransportMode::Both => {
            // STDIO serves the MCP Inspector while HTTP runs in the foreground
            let stdio_config = config.clone();
            let stdio_registry = Arc::clone(&registry);
            let stdio_handle = tokio::spawn(async move {
                if let Err(e) = server::run_server_stdio(&stdio_config, stdio_registry).await {
                    error!(error = %e, "STDIO server error");
                }
            });

            let http_result = server::run_server_http(&config, registry).await;

            // If HTTP server exits, abort STDIO task
            stdio_handle.abort();
            http_result?;
        }
    }

    info!("server stopped");
    Ok(())
}
