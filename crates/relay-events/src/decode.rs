//! Stateless per-event decoding from `(event name, data)` to [`ChatEvent`].

use crate::error::DecodeError;
use crate::event::{ChatEvent, EventKind};
use crate::sse::SseFrame;

/// Decode one event.
///
/// Returns `Ok(None)` for an empty or `null` payload, and
/// `ChatEvent::Unknown` for an unrecognized event name (its payload is not
/// inspected).
///
/// # Errors
///
/// Returns `DecodeError::Malformed` when the payload of a known event is not
/// valid JSON for that event.
pub fn decode(event: &str, data: &str) -> Result<Option<ChatEvent>, DecodeError> {
    let data = data.trim();
    if data.is_empty() || data == "null" {
        return Ok(None);
    }

    let Some(kind) = EventKind::from_name(event) else {
        return Ok(Some(ChatEvent::Unknown {
            name: event.to_string(),
        }));
    };

    let malformed = |source| DecodeError::Malformed {
        event: event.to_string(),
        source,
    };

    let decoded = match kind {
        EventKind::MessageChunk => ChatEvent::MessageChunk(serde_json::from_str(data).map_err(malformed)?),
        EventKind::ToolCalls => ChatEvent::ToolCalls(serde_json::from_str(data).map_err(malformed)?),
        EventKind::ToolCallChunks => {
            ChatEvent::ToolCallChunks(serde_json::from_str(data).map_err(malformed)?)
        }
        EventKind::ToolCallResult => {
            ChatEvent::ToolCallResult(serde_json::from_str(data).map_err(malformed)?)
        }
        EventKind::Thoughts => ChatEvent::Thoughts(serde_json::from_str(data).map_err(malformed)?),
        EventKind::Interrupt => ChatEvent::Interrupt(serde_json::from_str(data).map_err(malformed)?),
    };
    Ok(Some(decoded))
}

/// Decode one event, logging and dropping malformed payloads.
#[must_use]
pub fn decode_lossy(event: &str, data: &str) -> Option<ChatEvent> {
    match decode(event, data) {
        Ok(Some(ChatEvent::Unknown { name })) => {
            tracing::debug!(event = %name, "ignoring unknown event");
            Some(ChatEvent::Unknown { name })
        }
        Ok(decoded) => decoded,
        Err(error) => {
            tracing::warn!(%error, "dropping malformed event");
            None
        }
    }
}

/// Decode a framed SSE event.
#[must_use]
pub fn decode_frame(frame: &SseFrame) -> Option<ChatEvent> {
    let decoded = decode_lossy(&frame.event, &frame.data);
    if decoded.is_none() {
        tracing::debug!(event = %frame.event, data = frame.preview(), "frame produced no event");
    }
    decoded
}

/// Decode a complete SSE transcript (e.g. a recorded session).
#[must_use]
pub fn decode_transcript(text: &str) -> Vec<ChatEvent> {
    let mut decoder = crate::sse::SseDecoder::default();
    let mut frames = decoder.push_str(text);
    frames.extend(decoder.finish());
    frames.iter().filter_map(decode_frame).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("message_chunk", "")]
    #[case("message_chunk", "   ")]
    #[case("thoughts", "null")]
    fn empty_payloads_are_skipped(#[case] event: &str, #[case] data: &str) {
        assert!(decode(event, data).unwrap().is_none());
    }

    #[rstest]
    #[case("message_chunk", "{\"id\":")]
    #[case("tool_call_result", "{\"id\":\"t1\"}")]
    #[case("thoughts", "[1,2,3]")]
    fn malformed_payloads_are_errors(#[case] event: &str, #[case] data: &str) {
        let err = decode(event, data).unwrap_err();
        assert!(matches!(err, DecodeError::Malformed { .. }));
        assert!(decode_lossy(event, data).is_none());
    }

    #[test]
    fn unknown_event_is_forward_compatible() {
        let decoded = decode("podcast_audio", "{not even json").unwrap();
        assert_eq!(
            decoded,
            Some(ChatEvent::Unknown {
                name: "podcast_audio".into()
            })
        );
    }

    #[test]
    fn null_step_index_keeps_every_thought() {
        let decoded = decode(
            "thoughts",
            r#"{"id":"m1","react_thoughts":[{"thought":"Use list_sprints","step_index":null},{"thought":"Second","step_index":1}]}"#,
        )
        .unwrap()
        .unwrap();
        let ChatEvent::Thoughts(event) = decoded else {
            panic!("expected thoughts");
        };
        let steps = event
            .react_thoughts
            .iter()
            .map(|t| (t.thought.as_str(), t.step_index))
            .collect::<Vec<_>>();
        assert_eq!(steps, vec![("Use list_sprints", 0), ("Second", 1)]);
    }

    #[test]
    fn unknown_role_still_carries_content() {
        let decoded = decode(
            "message_chunk",
            r#"{"id":"t1","role":"tool","content":"3 open tasks"}"#,
        )
        .unwrap()
        .unwrap();
        let ChatEvent::MessageChunk(chunk) = decoded else {
            panic!("expected message chunk");
        };
        assert_eq!(chunk.role, Some(relay_core::enums::Role::Other));
        assert_eq!(chunk.content.as_deref(), Some("3 open tasks"));
    }

    #[test]
    fn message_chunk_decodes() {
        let decoded = decode(
            "message_chunk",
            r#"{"id":"1","role":"assistant","agent":"react_agent","content":"Sprint 5 has "}"#,
        )
        .unwrap()
        .unwrap();
        let ChatEvent::MessageChunk(chunk) = decoded else {
            panic!("expected message chunk");
        };
        assert_eq!(chunk.content.as_deref(), Some("Sprint 5 has "));
        assert_eq!(chunk.agent, Some(relay_core::enums::AgentKind::ReactAgent));
        assert!(chunk.finish_reason.is_none());
    }

    #[test]
    fn transcript_skips_bad_frames_and_keeps_order() {
        let transcript = concat!(
            "event: message_chunk\ndata: {\"id\":\"1\",\"content\":\"a\"}\n\n",
            "event: message_chunk\ndata: {broken\n\n",
            "event: heartbeat\ndata: {}\n\n",
            "event: message_chunk\ndata: {\"id\":\"1\",\"content\":\"b\"}",
        );
        let events = decode_transcript(transcript);
        let names: Vec<&str> = events.iter().map(ChatEvent::name).collect();
        assert_eq!(names, vec!["message_chunk", "heartbeat", "message_chunk"]);
    }
}
