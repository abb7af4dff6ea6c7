//! Line-oriented `data:` event framing.
//!
//! Backends stream replies as SSE-style frames: one `data: <payload>` line
//! per event, blank lines between records, `data: [DONE]` at the end.
//! Network chunks do not align with line boundaries, so [`FrameDecoder`]
//! carries the trailing incomplete line between [`FrameDecoder::push`]
//! calls.
//!
//! [`extract_delta`] is the single source of truth for "what text does this
//! payload carry" — the relay's accumulation path and any client rendering
//! the same stream must agree on it.

use bytes::Bytes;

use tracing::trace;

/// Payload marking logical end of stream. Carries no text.
pub const DONE_SENTINEL: &str = "[DONE]";

/// Prefix of a significant line. Anything else on the wire is ignored by
/// the decoder (but still forwarded verbatim by the relay).
const DATA_PREFIX: &str = "data:";

/// Extract the text delta carried by one frame payload.
///
/// Field cascade, first match wins:
/// 1. top-level string `response`
/// 2. top-level string `delta`
/// 3. top-level string `output_text`
/// 4. `choices[0].delta.content`, else `choices[0].text`
///
/// A payload that is not JSON at all is returned as-is (plain-text
/// fallback). A JSON payload matching none of the fields yields `None`.
pub fn extract_delta(payload: &str) -> Option<String> {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(payload) else {
        return Some(payload.to_string());
    };

    for field in ["response", "delta", "output_text"] {
        if let Some(text) = value[field].as_str() {
            return Some(text.to_string());
        }
    }

    let choice = &value["choices"][0];
    if let Some(text) = choice["delta"]["content"]
        .as_str()
        .or_else(|| choice["text"].as_str())
    {
        return Some(text.to_string());
    }

    None
}

/// Incremental decoder over a chunked frame stream.
///
/// Chunks are buffered as raw bytes and lines are decoded only once their
/// terminating `\n` has arrived, so UTF-8 sequences split across chunk
/// boundaries survive intact. Both `\n` and `\r\n` line breaks are
/// accepted.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    carry: Vec<u8>,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk, returning the deltas of every line it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.carry.extend_from_slice(chunk);

        let mut deltas = Vec::new();
        while let Some(pos) = self.carry.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.carry.drain(..=pos).collect();
            let mut line = &line[..line.len() - 1];
            if line.last() == Some(&b'\r') {
                line = &line[..line.len() - 1];
            }
            if let Some(delta) = decode_line(&String::from_utf8_lossy(line)) {
                deltas.push(delta);
            }
        }
        deltas
    }

    /// Flush the carry-over as a final, unterminated line.
    ///
    /// Streams that end without a trailing newline still get their last
    /// frame decoded. Resets the decoder.
    pub fn finish(&mut self) -> Option<String> {
        if self.carry.is_empty() {
            return None;
        }
        let mut line = std::mem::take(&mut self.carry);
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        decode_line(&String::from_utf8_lossy(&line))
    }
}

/// Decode one complete line: only `data:` lines are significant, and the
/// end sentinel and empty payloads carry nothing.
fn decode_line(line: &str) -> Option<String> {
    let payload = line.strip_prefix(DATA_PREFIX)?.trim();
    if payload.is_empty() || payload == DONE_SENTINEL {
        return None;
    }
    let delta = extract_delta(payload);
    if delta.is_none() {
        trace!(payload, "frame payload carries no text, skipping");
    }
    delta
}

/// Encode one payload as a wire frame (`data: <payload>\n\n`).
pub fn data_frame(payload: &str) -> Bytes {
    Bytes::from(format!("{DATA_PREFIX} {payload}\n\n"))
}

/// The end-of-stream frame.
pub fn done_frame() -> Bytes {
    data_frame(DONE_SENTINEL)
}
