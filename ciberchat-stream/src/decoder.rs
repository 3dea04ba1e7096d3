//! Incremental decoder for `data:`-framed event streams.
//!
//! The send endpoint answers with a body shaped like server-sent events,
//! one JSON event per `data:` line:
//!
//! ```text
//! data: {"type":"assistant_start","message_id":7}
//!
//! data: {"type":"chunk","content":"Hel"}
//!
//! data: [DONE]
//! ```
//!
//! Bytes arrive in arbitrary slices. The decoder buffers them and only turns
//! complete lines into text, so a read boundary never splits a line or a
//! UTF-8 sequence.

use ciberchat_types::StreamEvent;

use crate::config::AssemblerConfig;

/// Payload that ends the stream.
pub const DONE_SENTINEL: &str = "[DONE]";

/// One meaningful line of the stream.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// A decoded event.
    Event(StreamEvent),
    /// The `[DONE]` sentinel. Nothing after it is decoded.
    Done,
}

/// Buffers raw body bytes and yields [`Frame`]s for every complete line.
#[derive(Debug)]
pub struct FrameDecoder {
    buf: Vec<u8>,
    max_line_bytes: usize,
    /// Dropping an oversized line until its terminating newline.
    discarding: bool,
    done: bool,
    skipped: usize,
}

impl FrameDecoder {
    /// Create a decoder using the limits in `config`.
    #[must_use]
    pub fn new(config: &AssemblerConfig) -> Self {
        Self {
            buf: Vec::new(),
            max_line_bytes: config.max_line_bytes,
            discarding: false,
            done: false,
            skipped: 0,
        }
    }

    /// Whether the `[DONE]` sentinel has been seen.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Number of `data:` lines dropped because they were malformed or too long.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Bytes held back waiting for a newline.
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Append `bytes` and decode every line they complete.
    ///
    /// The trailing incomplete line stays buffered for the next call.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<Frame> {
        let mut frames = Vec::new();
        if self.done {
            return frames;
        }

        let mut rest = bytes;
        while let Some(pos) = rest.iter().position(|&b| b == b'\n') {
            let (head, tail) = rest.split_at(pos);
            rest = &tail[1..];

            if self.discarding {
                self.discarding = false;
                self.buf.clear();
                continue;
            }

            self.buf.extend_from_slice(head);
            let line = std::mem::take(&mut self.buf);
            if line.len() > self.max_line_bytes {
                tracing::warn!(
                    len = line.len(),
                    limit = self.max_line_bytes,
                    "dropping oversized stream line"
                );
                self.skipped += 1;
                continue;
            }
            if let Some(frame) = self.decode_line(&line) {
                let is_done = frame == Frame::Done;
                frames.push(frame);
                if is_done {
                    self.done = true;
                    return frames;
                }
            }
        }

        if !self.discarding {
            self.buf.extend_from_slice(rest);
            if self.buf.len() > self.max_line_bytes {
                tracing::warn!(
                    buffered = self.buf.len(),
                    limit = self.max_line_bytes,
                    "dropping oversized stream line"
                );
                self.buf.clear();
                self.discarding = true;
                self.skipped += 1;
            }
        }

        frames
    }

    /// Decode whatever is left once the body has ended.
    ///
    /// A final line without a trailing newline is still processed.
    pub fn finish(&mut self) -> Option<Frame> {
        if self.done || self.discarding {
            self.buf.clear();
            return None;
        }
        let line = std::mem::take(&mut self.buf);
        let frame = self.decode_line(&line);
        if frame == Some(Frame::Done) {
            self.done = true;
        }
        frame
    }

    fn decode_line(&mut self, line: &[u8]) -> Option<Frame> {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        if line.is_empty() {
            return None;
        }

        let line = match std::str::from_utf8(line) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(error = %e, "skipping stream line with invalid UTF-8");
                self.skipped += 1;
                return None;
            }
        };

        // Comments (`:`) and other fields (`event:`, `id:`, `retry:`) carry nothing.
        let data = line.strip_prefix("data:")?;
        let data = data.strip_prefix(' ').unwrap_or(data);

        if data.trim() == DONE_SENTINEL {
            return Some(Frame::Done);
        }

        match serde_json::from_str::<StreamEvent>(data) {
            Ok(event) => Some(Frame::Event(event)),
            Err(e) => {
                tracing::warn!(error = %e, data = %data, "skipping malformed stream event");
                self.skipped += 1;
                None
            }
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
