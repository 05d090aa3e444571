//! Incremental NDJSON decoding for upstream response streams.
//!
//! The upstream emits one JSON event per `\n`-terminated line. Chunks can
//! split lines anywhere, including inside a multi-byte UTF-8 character, so
//! the decoder carries undecoded bytes across chunks and only interprets a
//! segment once its terminating newline has arrived.

use futures::{Stream, StreamExt};

use crate::client::error::ClientError;
use crate::client::types::StreamEvent;

/// Pull-based NDJSON frame decoder with a byte carry-over buffer.
///
/// Splitting on `\n` at the byte level is safe for UTF-8 input: a newline
/// byte never occurs inside a multi-byte sequence.
#[derive(Debug, Default)]
pub struct NdjsonDecoder {
    buf: Vec<u8>,
}

impl NdjsonDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk of raw bytes to the carry-over buffer.
    pub fn feed(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Decode the next complete frame, if one is buffered.
    ///
    /// Blank lines are skipped. Lines that fail to parse (bad JSON or
    /// invalid UTF-8) are logged and skipped; they never terminate the
    /// stream.
    pub fn next_event(&mut self) -> Option<StreamEvent> {
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buf.drain(..=pos).collect();
            // Drop the newline before interpreting the frame.
            let line = &line[..line.len() - 1];

            let Ok(text) = std::str::from_utf8(line) else {
                tracing::warn!("Skipping NDJSON line with invalid UTF-8");
                continue;
            };
            let text = text.trim();
            if text.is_empty() {
                continue;
            }

            tracing::trace!("NDJSON raw line: {}", text);

            match serde_json::from_str::<StreamEvent>(text) {
                Ok(event) => return Some(event),
                Err(e) => {
                    tracing::warn!("Failed to parse NDJSON line: {e}. Line: {text}");
                    // Continue processing - don't fail on a single bad frame
                }
            }
        }
        None
    }

    /// Called at end-of-stream. Any unterminated trailing segment is
    /// discarded, matching the upstream contract that every frame ends in
    /// a newline.
    pub fn finish(&mut self) {
        if !self.buf.iter().all(|b| b.is_ascii_whitespace()) {
            tracing::debug!(
                "Discarding {} trailing bytes without a newline",
                self.buf.len()
            );
        }
        self.buf.clear();
    }
}

struct DecodeState<S> {
    source: S,
    decoder: NdjsonDecoder,
    done: bool,
}

/// Adapt a byte-chunk stream into a stream of decoded [`StreamEvent`]s.
///
/// Events are yielded strictly in arrival order. The stream fuses after a
/// terminal event: remaining chunks are neither read nor decoded, and the
/// underlying source is released when the stream is dropped.
pub fn event_stream<S, B, E>(source: S) -> impl Stream<Item = Result<StreamEvent, ClientError>> + Send
where
    S: Stream<Item = Result<B, E>> + Send + Unpin + 'static,
    B: AsRef<[u8]>,
    E: Into<ClientError>,
{
    let state = DecodeState {
        source,
        decoder: NdjsonDecoder::new(),
        done: false,
    };

    futures::stream::unfold(state, |mut state| async move {
        if state.done {
            return None;
        }
        loop {
            if let Some(event) = state.decoder.next_event() {
                if event.is_terminal() {
                    state.done = true;
                }
                return Some((Ok(event), state));
            }

            match state.source.next().await {
                Some(Ok(chunk)) => state.decoder.feed(chunk.as_ref()),
                Some(Err(e)) => {
                    state.done = true;
                    return Some((Err(e.into()), state));
                }
                None => {
                    state.decoder.finish();
                    state.done = true;
                    return None;
                }
            }
        }
    })
}
