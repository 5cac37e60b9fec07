//! Server-sent event framing.
//!
//! Implements the line-oriented `text/event-stream` format as a
//! [`Decoder`], so a byte stream can be wrapped in a `FramedRead`.
//! One [`SseFrame`] is produced per blank-line terminated block that
//! carried at least one `data:` line.

use bytes::BytesMut;
use tokio_util::codec::Decoder;
use tracing::debug;

use notihub_core::error::AppError;

/// One dispatched server-sent event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SseFrame {
    /// Value of the `event:` field, if any.
    pub event: Option<String>,
    /// All `data:` lines joined with `\n`.
    pub data: String,
    /// Value of the `id:` field, if any.
    pub id: Option<String>,
    /// Reconnect hint from the `retry:` field, in milliseconds.
    pub retry: Option<u64>,
}

/// Fields collected for the frame currently being read.
#[derive(Debug, Default)]
struct PendingFrame {
    event: Option<String>,
    data: Vec<String>,
    id: Option<String>,
    retry: Option<u64>,
}

impl PendingFrame {
    fn is_empty(&self) -> bool {
        self.event.is_none() && self.data.is_empty() && self.id.is_none() && self.retry.is_none()
    }

    fn take(&mut self) -> Option<SseFrame> {
        let pending = std::mem::take(self);
        if pending.data.is_empty() {
            return None;
        }
        Some(SseFrame {
            event: pending.event,
            data: pending.data.join("\n"),
            id: pending.id,
            retry: pending.retry,
        })
    }
}

/// Decoder for `text/event-stream` bodies.
#[derive(Debug)]
pub struct SseCodec {
    max_line_bytes: usize,
    /// Bytes of the buffer already scanned for a newline.
    scanned: usize,
    pending: PendingFrame,
}

impl SseCodec {
    /// Create a codec that rejects lines longer than `max_line_bytes`.
    pub fn new(max_line_bytes: usize) -> Self {
        Self {
            max_line_bytes,
            scanned: 0,
            pending: PendingFrame::default(),
        }
    }

    fn apply_line(&mut self, line: &str) {
        if line.starts_with(':') {
            return;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "data" => self.pending.data.push(value.to_string()),
            "event" => self.pending.event = Some(value.to_string()),
            "id" if !value.contains('\0') => self.pending.id = Some(value.to_string()),
            "retry" => {
                if let Ok(ms) = value.parse::<u64>() {
                    self.pending.retry = Some(ms);
                }
            }
            _ => {}
        }
    }
}

impl Decoder for SseCodec {
    type Item = SseFrame;
    type Error = AppError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<SseFrame>, AppError> {
        loop {
            let newline = src[self.scanned..].iter().position(|b| *b == b'\n');
            let Some(offset) = newline else {
                self.scanned = src.len();
                if src.len() > self.max_line_bytes {
                    return Err(AppError::validation(format!(
                        "Event stream line exceeds {} bytes",
                        self.max_line_bytes
                    )));
                }
                return Ok(None);
            };

            let end = self.scanned + offset;
            self.scanned = 0;
            if end > self.max_line_bytes {
                return Err(AppError::validation(format!(
                    "Event stream line exceeds {} bytes",
                    self.max_line_bytes
                )));
            }

            let raw = src.split_to(end + 1);
            let mut line = &raw[..end];
            if let Some(stripped) = line.strip_suffix(b"\r") {
                line = stripped;
            }

            if line.is_empty() {
                if let Some(frame) = self.pending.take() {
                    return Ok(Some(frame));
                }
                continue;
            }

            let text = String::from_utf8_lossy(line);
            self.apply_line(&text);
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<SseFrame>, AppError> {
        if let Some(frame) = self.decode(src)? {
            return Ok(Some(frame));
        }
        if !src.is_empty() || !self.pending.is_empty() {
            debug!(
                trailing_bytes = src.len(),
                "Discarding incomplete event at end of stream"
            );
        }
        src.clear();
        self.scanned = 0;
        self.pending = PendingFrame::default();
        Ok(None)
    }
}
