//! Server-sent events decoding
//!
//! Streaming completions arrive as `text/event-stream`. [`SseDecoder`]
//! accumulates raw body bytes and yields the `data:` payload of every
//! complete event; [`parse_sse_stream`] drives it over a reqwest byte
//! stream and forwards payloads to a channel.

use bytes::Bytes;
use futures::{Stream, StreamExt};
use tokio::sync::mpsc;

use crate::error::{Result, SmartStudyError};

/// Incremental SSE event decoder
///
/// Bytes are buffered until a blank line closes an event, so multi-byte
/// UTF-8 sequences split across chunks are decoded intact.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    /// Creates an empty decoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and return the data payloads of events it completed
    ///
    /// # Examples
    ///
    /// ```
    /// use smartstudy::providers::sse::SseDecoder;
    ///
    /// let mut decoder = SseDecoder::new();
    /// assert!(decoder.push(b"data: {\"a\"").is_empty());
    /// assert_eq!(decoder.push(b":1}\n\n"), vec!["{\"a\":1}".to_string()]);
    /// ```
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend(chunk.iter().copied().filter(|b| *b != b'\r'));

        let mut events = Vec::new();
        while let Some(pos) = find_blank_line(&self.buffer) {
            let block: Vec<u8> = self.buffer.drain(..pos + 2).collect();
            if let Some(data) = event_data(&block[..pos]) {
                events.push(data);
            }
        }
        events
    }

    /// Flush a trailing event that was not closed by a blank line
    pub fn finish(&mut self) -> Option<String> {
        let block = std::mem::take(&mut self.buffer);
        event_data(&block)
    }
}

fn find_blank_line(buffer: &[u8]) -> Option<usize> {
    buffer.windows(2).position(|w| w == b"\n\n")
}

/// Extract the joined `data:` lines of one event block
///
/// Comment lines (`:`) and `event:`/`id:`/`retry:` fields are ignored, as
/// are events without data.
fn event_data(block: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(block);
    let data_lines: Vec<&str> = text
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|value| value.strip_prefix(' ').unwrap_or(value))
        .collect();

    if data_lines.is_empty() {
        return None;
    }

    let data = data_lines.join("\n");
    if data.trim().is_empty() {
        None
    } else {
        Some(data)
    }
}

/// Parse an SSE byte stream and forward complete `data:` payloads
///
/// Runs until the body ends, the receiver is dropped, or the transport
/// fails; a transport failure is forwarded as the error it converts to,
/// which is `Network` for timeouts and interrupted bodies.
pub async fn parse_sse_stream(
    byte_stream: impl Stream<Item = reqwest::Result<Bytes>>,
    payload_tx: mpsc::UnboundedSender<Result<String>>,
) {
    let mut decoder = SseDecoder::new();

    tokio::pin!(byte_stream);

    while let Some(chunk_result) = byte_stream.next().await {
        let chunk = match chunk_result {
            Ok(c) => c,
            Err(e) => {
                tracing::error!("SSE stream interrupted: {}", e);
                let _ = payload_tx.send(Err(SmartStudyError::from(e).into()));
                return;
            }
        };

        for payload in decoder.push(&chunk) {
            if payload_tx.send(Ok(payload)).is_err() {
                tracing::debug!("SSE consumer dropped, stopping parser");
                return;
            }
        }
    }

    if let Some(payload) = decoder.finish() {
        let _ = payload_tx.send(Ok(payload));
    }
}
