/// Server Configuration
///
/// Configuration is read from environment variables once at startup:
///
/// - SERVER_NAME: Name of the server (default: "mcp-demo-tools")
/// - SERVER_VERSION: Version string (default: the crate version)
/// - MCP_TRANSPORT_MODE: "stdio", "http", or "both" (default: "both")
/// - HOST: Bind address for HTTP mode (default: "0.0.0.0")
/// - PORT: Port number for HTTP mode (default: 3000)
/// - WORKER_THREADS: HTTP worker count (default: CPU count, capped at 16)

use std::str::FromStr;

use crate::core::error::ConfigError;

pub const DEFAULT_SERVER_NAME: &str = "mcp-demo-tools";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
const MAX_DEFAULT_WORKERS: usize = 16;

/// Which transports the server runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportMode {
    /// Line-delimited JSON-RPC on stdin/stdout only
    Stdio,
    /// Actix Web HTTP server only
    Http,
    /// STDIO in a background task alongside the HTTP server
    Both,
}

impl FromStr for TransportMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stdio" => Ok(Self::Stdio),
            "http" => Ok(Self::Http),
            "both" => Ok(Self::Both),
            other => Err(ConfigError::InvalidTransport(other.to_string())),
        }
    }
}

/// Resolved server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub server_name: String,
    pub server_version: String,
    pub transport: TransportMode,
    pub host: String,
    pub port: u16,
    pub workers: usize,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// Unset variables take their defaults; set but unparsable values are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let server_name = lookup("SERVER_NAME").unwrap_or_else(|| DEFAULT_SERVER_NAME.to_string());
        let server_version =
            lookup("SERVER_VERSION").unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string());

        let transport = match lookup("MCP_TRANSPORT_MODE") {
            Some(mode) => mode.trim().parse()?,
            None => TransportMode::Both,
        };

        let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw))?,
            None => DEFAULT_PORT,
        };

        let workers = match lookup("WORKER_THREADS") {
            Some(raw) => {
                let parsed = raw.trim().parse::<usize>();
                match parsed {
                    Ok(n) if n > 0 => n,
                    _ => return Err(ConfigError::InvalidWorkers(raw)),
                }
            }
            None => num_cpus::get().clamp(1, MAX_DEFAULT_WORKERS),
        };

        Ok(Self {
            server_name,
            server_version,
            transport,
            host,
            port,
            workers,
        })
    }

    /// `host:port` string passed to the HTTP listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(config.server_name, DEFAULT_SERVER_NAME);
        assert_eq!(config.server_version, env!("CARGO_PKG_VERSION"));
        assert_eq!(config.transport, TransportMode::Both);
        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
        assert!((1..=MAX_DEFAULT_WORKERS).contains(&config.workers));
    }

    #[test]
    fn reads_every_variable() {
        let config = Config::from_lookup(lookup_from(&[
            ("SERVER_NAME", "demo"),
            ("SERVER_VERSION", "9.9.9"),
            ("MCP_TRANSPORT_MODE", "stdio"),
            ("HOST", "127.0.0.1"),
            ("PORT", "8081"),
            ("WORKER_THREADS", "4"),
        ]))
        .unwrap();

        assert_eq!(config.server_name, "demo");
        assert_eq!(config.server_version, "9.9.9");
        assert_eq!(config.transport, TransportMode::Stdio);
        assert_eq!(config.bind_addr(), "127.0.0.1:8081");
        assert_eq!(config.workers, 4);
    }

    #[test]
    fn rejects_unknown_transport() {
        let err = Config::from_lookup(lookup_from(&[("MCP_TRANSPORT_MODE", "grpc")])).unwrap_err();
        assert_eq!(err, ConfigError::InvalidTransport("grpc".to_string()));
    }

    #[test]
    fn rejects_bad_port_and_workers() {
        assert_eq!(
            Config::from_lookup(lookup_from(&[("PORT", "70000")])).unwrap_err(),
            ConfigError::InvalidPort("70000".to_string())
        );
        assert_eq!(
            Config::from_lookup(lookup_from(&[("WORKER_THREADS", "0")])).unwrap_err(),
            ConfigError::InvalidWorkers("0".to_string())
        );
    }
}
