//! # relay-events
//!
//! Turns the agent pipeline's server-sent-event stream into typed
//! [`ChatEvent`]s.
//!
//! - [`sse`]: incremental `text/event-stream` framing with a bounded buffer
//! - [`decode`]: stateless per-event decoding; malformed payloads are logged
//!   and dropped, unknown event names become [`ChatEvent::Unknown`]
//! - [`stream`]: async adapter from a transport byte stream

pub mod decode;
pub mod error;
pub mod event;
pub mod sse;
pub mod stream;

pub use decode::{decode, decode_frame, decode_lossy, decode_transcript};
pub use error::{DecodeError, EventError};
pub use event::{
    ChatEvent, EventKind, InterruptEvent, MessageChunk, ThoughtsEvent, ToolArgs, ToolCallDelta,
    ToolCallResultEvent, ToolCallsEvent,
};
pub use sse::{SseDecoder, SseFrame};
pub use stream::chat_events;
