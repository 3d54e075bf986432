//! Upstream HTTP/SSE transport (`spec.md` §4.B/§4.C)
//!
//! Two pieces, split along the same boundary the teacher drew between
//! posting and stream-reading in its own `http.rs`, except here the SSE
//! reader is its own module since it now matches against an originating
//! request id rather than just forwarding a standalone notification stream.
//!
//! - [`http::HttpTransport`] issues one POST per message and returns either
//!   a parsed JSON body or a handle to the response's byte stream. It does
//!   no retrying or error classification of its own (`retry.rs` owns that).
//! - [`sse`] drains that byte stream, forwarding each parsed event downstream
//!   and detecting the terminal event that answers the original request.

pub mod http;
pub mod sse;
