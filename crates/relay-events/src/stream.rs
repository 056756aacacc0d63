//! Async adapter from a transport byte stream to decoded chat events.

use futures::{Stream, StreamExt};
use relay_config::StreamConfig;

use crate::decode::decode_frame;
use crate::error::EventError;
use crate::event::ChatEvent;
use crate::sse::SseDecoder;

/// Decode a byte stream (e.g. a `reqwest` response body) into chat events.
///
/// Malformed frames are dropped inside the stream. A transport error is
/// yielded once as [`EventError::Transport`] and ends the stream; a clean end
/// of input flushes the last partial frame.
pub fn chat_events<S, B, E>(
    source: S,
    config: &StreamConfig,
) -> impl Stream<Item = Result<ChatEvent, EventError>> + use<S, B, E>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: std::fmt::Display,
{
    let max_buffer_bytes = config.max_buffer_bytes;
    async_stream::stream! {
        let mut decoder = SseDecoder::new(max_buffer_bytes);
        let mut source = std::pin::pin!(source);

        while let Some(chunk) = source.next().await {
            match chunk {
                Ok(bytes) => {
                    for frame in decoder.push(bytes.as_ref()) {
                        if let Some(event) = decode_frame(&frame) {
                            yield Ok(event);
                        }
                    }
                }
                Err(error) => {
                    tracing::warn!(%error, "event stream transport failed");
                    yield Err(EventError::Transport(error.to_string()));
                    return;
                }
            }
        }

        if decoder.has_remaining() {
            tracing::debug!("event stream ended mid-frame, flushing");
        }
        for frame in decoder.finish() {
            if let Some(event) = decode_frame(&frame) {
                yield Ok(event);
            }
        }
    }
}
