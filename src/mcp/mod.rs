//! MCP bridge: transport-and-resilience engine
//!
//! Module layout mirrors the component boundaries the design is built
//! around, leaves first:
//!
//! - `types`       -- JSON-RPC wire primitives and inbound classification (A)
//! - `framer`      -- stdio line reader/writer (A)
//! - `transport`   -- HTTP POST + SSE reader (B, C)
//! - `session`     -- session id lifecycle and re-mint (D)
//! - `retry`       -- error classification and backoff schedule (E)
//! - `cache`       -- `initialize`/`tools/list` response memoization (F)
//! - `health`      -- up/down state and prober handle (G)
//! - `coordinator` -- ties A-G together per inbound message (H)

pub mod cache;
pub mod coordinator;
pub mod framer;
pub mod health;
pub mod retry;
pub mod session;
pub mod transport;
pub mod types;
