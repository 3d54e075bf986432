//! Environment-driven configuration for the proxy
//!
//! The proxy takes no configuration file: every setting is an environment
//! variable, validated once at startup (`spec.md` §6).

use crate::error::{ProxyError, Result};

const DEFAULT_API_URL: &str = "https://api.vaiz.com/mcp";

/// Fully resolved, validated runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Bearer credential sent on every upstream request.
    pub token: String,
    /// Optional workspace selector sent as `Current-Space-Id`.
    pub space_id: Option<String>,
    /// Upstream MCP endpoint.
    pub api_url: String,
    /// Whether verbose stderr trace logging is enabled.
    pub debug: bool,
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ProxyError::Config`] if `VAIZ_API_TOKEN` is unset or empty.
    pub fn from_env() -> Result<Self> {
        let token = std::env::var("VAIZ_API_TOKEN")
            .ok()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ProxyError::Config("VAIZ_API_TOKEN is required".to_string()))?;

        let space_id = std::env::var("VAIZ_SPACE_ID")
            .ok()
            .filter(|v| !v.is_empty());

        let api_url = std::env::var("VAIZ_API_URL")
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let debug = std::env::var("VAIZ_DEBUG")
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Ok(Self {
            token,
            space_id,
            api_url,
            debug,
        })
    }
}
