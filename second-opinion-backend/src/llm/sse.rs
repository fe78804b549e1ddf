//! Server-sent-event decoding for OpenAI-style chat completion streams.
//!
//! The body is a sequence of lines; `data: {json}` lines carry a
//! `chat.completion.chunk` and `data: [DONE]` ends the stream. Network chunks
//! can split a line (or a multi-byte character) anywhere, so raw bytes are
//! buffered until a full line is available.

use bytes::Bytes;
use futures_util::stream::{self, BoxStream, Stream, StreamExt};
use serde::Deserialize;
use std::collections::VecDeque;

use crate::error::GenerationError;

/// One meaningful SSE line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseEvent {
    Data(String),
    Done,
}

/// Incremental line splitter
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    /// Feed one network chunk, returning the events completed by it
    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<SseEvent>, GenerationError> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(event) = parse_line(&line[..line.len() - 1])? {
                events.push(event);
            }
        }

        Ok(events)
    }

    /// Flush a trailing line that was not newline-terminated
    pub fn finish(&mut self) -> Result<Option<SseEvent>, GenerationError> {
        let rest = std::mem::take(&mut self.buffer);
        parse_line(&rest)
    }
}

fn parse_line(raw: &[u8]) -> Result<Option<SseEvent>, GenerationError> {
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    let line = std::str::from_utf8(raw)
        .map_err(|e| GenerationError::Malformed(format!("invalid UTF-8 in stream: {}", e)))?;

    // Blank lines separate events; ':' starts a comment (keep-alives)
    if line.is_empty() || line.starts_with(':') {
        return Ok(None);
    }

    // event:, id:, retry: carry nothing we use
    let Some(payload) = line.strip_prefix("data:") else {
        return Ok(None);
    };
    let payload = payload.strip_prefix(' ').unwrap_or(payload);

    if payload.trim() == "[DONE]" {
        Ok(Some(SseEvent::Done))
    } else {
        Ok(Some(SseEvent::Data(payload.to_string())))
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: ChunkDelta,
}

#[derive(Debug, Default, Deserialize)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
}

/// Extract the text delta of one chunk. Role-only or usage-only chunks give "".
pub fn parse_delta(json: &str) -> Result<String, GenerationError> {
    let chunk: ChatCompletionChunk = serde_json::from_str(json)
        .map_err(|e| GenerationError::Malformed(format!("{}: {}", e, json)))?;

    Ok(chunk
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.delta.content)
        .unwrap_or_default())
}

struct DeltaState {
    bytes: BoxStream<'static, Result<Bytes, GenerationError>>,
    decoder: SseDecoder,
    pending: VecDeque<Result<String, GenerationError>>,
    finished: bool,
}

impl DeltaState {
    /// Queue deltas for decoded events. Stops at `[DONE]` or the first bad chunk.
    fn enqueue(&mut self, events: Vec<SseEvent>) {
        for event in events {
            match event {
                SseEvent::Done => {
                    self.finished = true;
                    return;
                }
                SseEvent::Data(json) => match parse_delta(&json) {
                    Ok(delta) => self.pending.push_back(Ok(delta)),
                    Err(e) => {
                        self.pending.push_back(Err(e));
                        self.finished = true;
                        return;
                    }
                },
            }
        }
    }
}

/// Turn a raw response body into a stream of text deltas.
///
/// The stream ends after `[DONE]`, at end of body, or right after the first
/// error it yields.
pub fn delta_stream<S>(bytes: S) -> impl Stream<Item = Result<String, GenerationError>> + Send + 'static
where
    S: Stream<Item = Result<Bytes, GenerationError>> + Send + 'static,
{
    let state = DeltaState {
        bytes: bytes.boxed(),
        decoder: SseDecoder::default(),
        pending: VecDeque::new(),
        finished: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(item) = state.pending.pop_front() {
                return Some((item, state));
            }
            if state.finished {
                return None;
            }

            match state.bytes.next().await {
                Some(Ok(chunk)) => match state.decoder.push(&chunk) {
                    Ok(events) => state.enqueue(events),
                    Err(e) => {
                        state.finished = true;
                        return Some((Err(e), state));
                    }
                },
                Some(Err(e)) => {
                    state.finished = true;
                    return Some((Err(e), state));
                }
                None => {
                    match state.decoder.finish() {
                        Ok(Some(event)) => state.enqueue(vec![event]),
                        Ok(None) => {}
                        Err(e) => state.pending.push_back(Err(e)),
                    }
                    state.finished = true;
                }
            }
        }
    })
}
