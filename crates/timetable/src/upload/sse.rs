//! Incremental server-sent event framing.
//!
//! Frames are separated by a blank line (`\n\n`). Chunks from the network
//! can split a frame anywhere, including inside a multi-byte character, so
//! bytes are buffered until a full frame is available.

use tracing::debug;

const FRAME_SEPARATOR: &[u8] = b"\n\n";

/// Splits a byte stream into the `data` payloads of complete SSE frames.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one chunk and returns the payloads of every frame it completed,
    /// in arrival order. Frames without a `data:` line yield nothing.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut payloads = Vec::new();
        while let Some(end) = find_separator(&self.buffer) {
            let frame: Vec<u8> = self.buffer.drain(..end + FRAME_SEPARATOR.len()).collect();
            let frame = String::from_utf8_lossy(&frame[..end]);
            if let Some(payload) = frame_data(&frame) {
                payloads.push(payload);
            }
        }
        payloads
    }

    /// Bytes of a trailing frame that has not been terminated yet.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Discards any unterminated trailing frame.
    pub fn finish(self) {
        if !self.buffer.is_empty() {
            debug!(bytes = self.buffer.len(), "Dropping unterminated SSE frame");
        }
    }
}

fn find_separator(buffer: &[u8]) -> Option<usize> {
    buffer
        .windows(FRAME_SEPARATOR.len())
        .position(|w| w == FRAME_SEPARATOR)
}

/// Joins the `data:` lines of one frame. Other fields and comments are
/// ignored.
fn frame_data(frame: &str) -> Option<String> {
    let lines: Vec<&str> = frame
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|rest| rest.strip_prefix(' ').unwrap_or(rest))
        .collect();
    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}
