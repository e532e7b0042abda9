use std::{env, net::SocketAddr, time::Duration};

use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://www.wolframalpha.com/api/v1";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub base_url: String,
    pub query_timeout: Option<Duration>,
    pub port: Option<u16>,
    pub bind_addr: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("MCP_WOLFRAM_PORT/MCP_PORT must be a valid u16")]
    InvalidPort,
    #[error("WOLFRAM_TIMEOUT_SECS must be a positive integer")]
    InvalidTimeout,
    #[error("invalid bind address or port")]
    InvalidSocket,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let api_key = non_empty("WOLFRAM_API_KEY");
        let base_url = non_empty("WOLFRAM_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let query_timeout = non_empty("WOLFRAM_TIMEOUT_SECS")
            .map(|value| {
                value
                    .parse::<u64>()
                    .ok()
                    .filter(|secs| *secs > 0)
                    .map(Duration::from_secs)
                    .ok_or(ConfigError::InvalidTimeout)
            })
            .transpose()?;
        let port = non_empty("MCP_WOLFRAM_PORT")
            .or_else(|| non_empty("MCP_PORT"))
            .map(|value| value.parse::<u16>().map_err(|_| ConfigError::InvalidPort))
            .transpose()?;
        let bind_addr = non_empty("BIND_ADDR").unwrap_or_else(|| "0.0.0.0".to_string());

        let config = Self {
            api_key,
            base_url,
            query_timeout,
            port,
            bind_addr,
        };

        if config.port.is_some() {
            let _ = config.bind_socket()?;
        }
        Ok(config)
    }

    /// Socket the HTTP transport listens on. Only meaningful when a port is set.
    pub fn bind_socket(&self) -> Result<SocketAddr, ConfigError> {
        let port = self.port.ok_or(ConfigError::InvalidPort)?;
        format!("{}:{}", self.bind_addr, port)
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidSocket)
    }
}
