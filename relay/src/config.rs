use crate::errors::{Error, Result};
use std::env;
use std::net::SocketAddr;

pub const DEFAULT_UPSTREAM_URL: &str = "http://localhost:3000/api/webhook/tive";
pub const DEFAULT_HTTP_ADDR: &str = "0.0.0.0:8080";

/// Relay settings, resolved once at start-up.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub http_addr: SocketAddr,
    pub upstream_url: String,
}

impl RelayConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_vars(
            env::var("HTTP_ADDR").ok(),
            env::var("TIVE_WEBHOOK_URL").ok(),
        )
    }

    fn from_vars(http_addr: Option<String>, upstream_url: Option<String>) -> Result<Self> {
        let http_addr = http_addr.unwrap_or_else(|| DEFAULT_HTTP_ADDR.to_string());
        let http_addr = http_addr
            .parse()
            .map_err(|e| Error::Config(format!("invalid HTTP_ADDR {:?}: {}", http_addr, e)))?;

        Ok(Self {
            http_addr,
            upstream_url: upstream_url.unwrap_or_else(|| DEFAULT_UPSTREAM_URL.to_string()),
        })
    }
}
