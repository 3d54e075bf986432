//! Line framer: read/write newline-delimited JSON on local stdio
//! (`spec.md` §4.A)
//!
//! The proxy is itself the child process from the editor's point of view,
//! so unlike the teacher's `StdioTransport` (which spawns a child and pipes
//! *its* stdin/stdout), this reads the proxy's own `stdin` and writes its
//! own `stdout`. The buffered-line-draining shape is the same idiom the
//! teacher uses for a child's stdout; what differs is which end of the
//! pipe is ours.

use crate::error::Result;
use serde_json::Value;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::Mutex;

/// The destination for outbound JSON-RPC objects. Serializes concurrent
/// writers behind one mutex so no two objects interleave on the wire,
/// matching §5's "one output mutex" requirement.
pub struct OutputWriter {
    sink: Sink,
}

enum Sink {
    Stdout(Mutex<tokio::io::Stdout>),
    Channel(tokio::sync::mpsc::UnboundedSender<Value>),
}

impl OutputWriter {
    pub fn new() -> Self {
        Self {
            sink: Sink::Stdout(Mutex::new(tokio::io::stdout())),
        }
    }

    /// Test double: writes are pushed to a channel instead of stdout so
    /// tests (including external integration tests) can assert on exactly
    /// what would have gone over the wire.
    pub fn for_test() -> (Self, tokio::sync::mpsc::UnboundedReceiver<Value>) {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        (
            Self {
                sink: Sink::Channel(tx),
            },
            rx,
        )
    }

    /// Write one JSON-RPC object as a single line, flushed immediately.
    pub async fn write_message(&self, value: &Value) -> Result<()> {
        match &self.sink {
            Sink::Stdout(stdout) => {
                let mut line = serde_json::to_string(value)?;
                line.push('\n');
                let mut guard = stdout.lock().await;
                guard.write_all(line.as_bytes()).await?;
                guard.flush().await?;
            }
            Sink::Channel(tx) => {
                let _ = tx.send(value.clone());
            }
        }
        Ok(())
    }
}

impl Default for OutputWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse one inbound line as a JSON-RPC object.
///
/// Blank lines are the caller's responsibility to skip before calling this;
/// a parse failure here should be logged with the raw line and dropped —
/// there is no `id` to reply against.
pub fn parse_line(line: &str) -> std::result::Result<Value, serde_json::Error> {
    serde_json::from_str(line)
}

/// Read newline-delimited JSON from `stdin` forever, invoking `on_message`
/// for each successfully parsed, non-blank line. Returns when stdin closes
/// (EOF) or the reader hits an I/O error.
///
/// Malformed lines are logged and skipped; they never stop the loop.
pub async fn read_loop<F>(stdin: tokio::io::Stdin, mut on_message: F) -> Result<()>
where
    F: FnMut(Value),
{
    let mut lines = BufReader::new(stdin).lines();
    while let Some(line) = lines.next_line().await? {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match parse_line(trimmed) {
            Ok(value) => on_message(value),
            Err(err) => {
                let error = crate::error::ProxyError::LocalParse(err.to_string());
                tracing::warn!(raw = %trimmed, error = %error, "failed to parse inbound line; ignoring");
            }
        }
    }
    Ok(())
}

/// Build the default output writer wrapped for shared ownership across
/// spawned request tasks.
pub fn shared_output() -> Arc<OutputWriter> {
    Arc::new(OutputWriter::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_line_rejects_malformed_json() {
        assert!(parse_line("{not json}").is_err());
    }

    #[test]
    fn parse_line_accepts_well_formed_object() {
        let v = parse_line("{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"tools/list\"}").unwrap();
        assert_eq!(v["method"], json!("tools/list"));
    }

    #[tokio::test]
    async fn write_message_round_trips_through_test_sink() {
        let (out, mut rx) = OutputWriter::for_test();
        out.write_message(&json!({"jsonrpc":"2.0","id":1,"result":{}}))
            .await
            .unwrap();
        let got = rx.recv().await.unwrap();
        assert_eq!(got["id"], json!(1));
    }
}
