//! Configuration for the timeline server.
//!
//! Loaded from environment variables with sensible defaults; unset blob
//! store path selects the in-memory blob store.

use serde::{Deserialize, Serialize};
use std::env;
use std::net::SocketAddr;
use tracing::warn;

use crate::error::{ServerError, ServerResult};

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Host to bind to
    #[serde(default = "default_host")]
    pub bind_address: String,

    /// Directory for the file-backed blob store; `None` keeps blobs in memory
    #[serde(default)]
    pub blob_store_path: Option<String>,

    /// Bearer key granting the admin capability
    #[serde(default)]
    pub admin_api_key: Option<String>,

    /// Log level used when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_port() -> u16 {
    8080
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind_address: default_host(),
            blob_store_path: None,
            admin_api_key: None,
            log_level: default_log_level(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn load() -> ServerResult<Self> {
        let mut config = Self::default();

        if let Ok(port) = env::var("SERVER_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                config.port = port;
            } else {
                warn!("Invalid SERVER_PORT value: {}", port);
            }
        }
        if let Ok(host) = env::var("SERVER_HOST") {
            config.bind_address = host;
        }
        if let Ok(path) = env::var("BLOB_STORE_PATH") {
            if !path.is_empty() {
                config.blob_store_path = Some(path);
            }
        }
        match env::var("ADMIN_API_KEY") {
            Ok(key) if key.is_empty() => {
                warn!("ADMIN_API_KEY is set but empty; admin mutations are unreachable");
            }
            Ok(key) => config.admin_api_key = Some(key),
            Err(_) => {
                warn!("ADMIN_API_KEY is not configured; admin mutations are unreachable");
            }
        }
        if let Ok(level) = env::var("LOG_LEVEL") {
            config.log_level = level;
        }

        Ok(config)
    }

    /// Socket address to bind the listener to
    pub fn socket_addr(&self) -> ServerResult<SocketAddr> {
        format!("{}:{}", self.bind_address, self.port)
            .parse()
            .map_err(|_| {
                ServerError::ConfigError(format!(
                    "invalid bind address: {}:{}",
                    self.bind_address, self.port
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_bind_all_interfaces_on_8080() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.bind_address, "0.0.0.0");
        assert!(config.admin_api_key.is_none());
        assert!(config.blob_store_path.is_none());
        assert_eq!(config.socket_addr().unwrap().port(), 8080);
    }

    #[test]
    fn invalid_bind_address_is_a_config_error() {
        let config = ServerConfig {
            bind_address: "not an address".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.socket_addr(),
            Err(ServerError::ConfigError(_))
        ));
    }
}
