//! SSE reader: drains `data:` events, matching against the request id
//! (`spec.md` §4.C)
//!
//! Line-oriented, not block-oriented: the wire format here is one `data: `
//! line per event rather than the blank-line-delimited multi-field events a
//! general SSE client would have to handle, so the reader buffers across
//! chunk boundaries and splits on a single `\n`, mirroring the simpler half
//! of the teacher's `parse_sse_stream` loop.

use crate::mcp::cache::Cache;
use crate::mcp::framer::OutputWriter;
use crate::mcp::types::{CACHEABLE_METHODS, JsonRpcResponse};
use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt};

const DONE_SENTINEL: &str = "[DONE]";

/// Pull complete `\n`-terminated lines out of `buf`, leaving any trailing
/// partial line in place for the next chunk.
fn drain_lines(buf: &mut BytesMut) -> Vec<String> {
    let mut lines = Vec::new();
    loop {
        let Some(pos) = buf.iter().position(|&b| b == b'\n') else {
            break;
        };
        let line = buf.split_to(pos);
        buf.advance(1); // drop the newline itself
        lines.push(String::from_utf8_lossy(&line).into_owned());
    }
    lines
}

/// Extract and parse the JSON payload of a `data: ` line, if any.
///
/// Returns `None` for lines that don't start with the prefix, the `[DONE]`
/// sentinel, or payloads that fail to parse as JSON — all three are
/// skipped silently per `spec.md` §4.C/§6.
fn parse_data_line(line: &str) -> Option<serde_json::Value> {
    let payload = line.strip_prefix("data: ")?.trim();
    if payload == DONE_SENTINEL || payload.is_empty() {
        return None;
    }
    serde_json::from_str(payload).ok()
}

/// Drain an SSE body for a live request: forward every parsed event
/// downstream immediately, cache the matching event if its method is
/// cacheable and carries a `result`, and return whether a match was found.
///
/// If no event's `id` matches `target_id` by stream end, synthesizes and
/// writes the `-32000` error response itself before returning `Ok(false)`.
pub async fn drain(
    mut stream: std::pin::Pin<Box<dyn Stream<Item = reqwest::Result<Bytes>> + Send>>,
    target_id: &serde_json::Value,
    method: &'static str,
    cache: &Cache,
    out: &OutputWriter,
) -> crate::error::Result<bool> {
    let mut buf = BytesMut::new();
    let mut matched = false;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        buf.extend_from_slice(&chunk);
        for line in drain_lines(&mut buf) {
            let Some(value) = parse_data_line(&line) else {
                continue;
            };
            let is_match = value.get("id") == Some(target_id);
            if is_match {
                matched = true;
                if CACHEABLE_METHODS.contains(&method) && value.get("result").is_some() {
                    if let Ok(response) = serde_json::from_value::<JsonRpcResponse>(value.clone())
                    {
                        cache.put(method, &response).await;
                    }
                }
            }
            out.write_message(&value).await?;
        }
    }

    if !matched {
        let err = JsonRpcResponse::synthesized_error(
            target_id.clone(),
            crate::error::ProxyError::SseNoMatch.to_string(),
        );
        out.write_message(&serde_json::to_value(&err)?).await?;
    }

    Ok(matched)
}

/// Drain an SSE body for the internal re-mint handshake: find the matching
/// event and return it, without writing anything downstream. Used only by
/// `session::SessionManager::reinit`, since that traffic is never visible
/// to the local peer.
pub async fn drain_silent(
    mut stream: std::pin::Pin<Box<dyn Stream<Item = reqwest::Result<Bytes>> + Send>>,
    target_id: &serde_json::Value,
) -> crate::error::Result<Option<serde_json::Value>> {
    let mut buf = BytesMut::new();
    let mut matched = None;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        buf.extend_from_slice(&chunk);
        for line in drain_lines(&mut buf) {
            let Some(value) = parse_data_line(&line) else {
                continue;
            };
            if value.get("id") == Some(target_id) {
                matched = Some(value);
            }
        }
    }

    Ok(matched)
}

use bytes::Buf;
