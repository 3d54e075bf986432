//! vaiz-mcp-proxy - Resilient stdio-to-HTTP bridge for the Model Context Protocol
//!
//! This library provides the transport-and-resilience engine that bridges a
//! local stdio JSON-RPC peer and a remote MCP service reached over HTTPS:
//! session management, retry/backoff, response caching, and health probing.
//!
//! # Architecture
//!
//! - `cli`: command-line interface definition
//! - `config`: environment-variable configuration and validation
//! - `error`: error types and result alias
//! - `mcp`: the bridge itself (see `mcp` module docs for the component
//!   breakdown)

pub mod cli;
pub mod config;
pub mod error;
pub mod mcp;

pub use config::Config;
pub use error::{ProxyError, Result};
