//! Incremental `text/event-stream` framing.
//!
//! Bytes arrive in arbitrary network chunks; a frame is complete only once
//! its terminating blank line has been seen. The decoder buffers the partial
//! tail (including a split UTF-8 sequence) until the next push.

/// Event name used when a frame carries no `event:` field.
pub const DEFAULT_EVENT: &str = "message";

/// One dispatched SSE frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
    /// Value of the `event:` field, or [`DEFAULT_EVENT`].
    pub event: String,
    /// All `data:` lines of the frame joined with `\n`.
    pub data: String,
    /// Value of the last `id:` field, if any.
    pub id: Option<String>,
}

impl SseFrame {
    /// First 200 chars of the payload for log lines.
    #[must_use]
    pub fn preview(&self) -> &str {
        match self.data.char_indices().nth(200) {
            Some((end, _)) => &self.data[..end],
            None => &self.data,
        }
    }
}

/// SSE stream decoder with bounded buffering.
#[derive(Debug)]
pub struct SseDecoder {
    buffer: String,
    utf8_tail: Vec<u8>,
    max_buffer_bytes: usize,
    event: Option<String>,
    data: Vec<String>,
    id: Option<String>,
}

impl Default for SseDecoder {
    fn default() -> Self {
        Self::new(1024 * 1024)
    }
}

impl SseDecoder {
    #[must_use]
    pub fn new(max_buffer_bytes: usize) -> Self {
        Self {
            buffer: String::new(),
            utf8_tail: Vec::new(),
            max_buffer_bytes,
            event: None,
            data: Vec::new(),
            id: None,
        }
    }

    /// Push a chunk of bytes and return every frame it completes.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        self.append_utf8(chunk);

        let mut frames = Vec::new();
        let mut consumed = 0;
        while let Some(offset) = self.buffer[consumed..].find('\n') {
            let end = consumed + offset;
            let line = self.buffer[consumed..end].trim_end_matches('\r').to_string();
            consumed = end + 1;
            if let Some(frame) = self.process_line(&line) {
                frames.push(frame);
            }
        }
        self.buffer.drain(..consumed);
        self.enforce_bound();
        frames
    }

    /// Push a string directly (transcripts, tests).
    pub fn push_str(&mut self, text: &str) -> Vec<SseFrame> {
        self.push(text.as_bytes())
    }

    /// Flush at end of stream: an unterminated last line and an undispatched
    /// frame are emitted as if the stream had ended with a blank line.
    pub fn finish(&mut self) -> Vec<SseFrame> {
        if !self.utf8_tail.is_empty() {
            let tail = std::mem::take(&mut self.utf8_tail);
            self.buffer.push_str(&String::from_utf8_lossy(&tail));
        }

        let mut frames = Vec::new();
        if !self.buffer.is_empty() {
            let line = std::mem::take(&mut self.buffer);
            if let Some(frame) = self.process_line(line.trim_end_matches('\r')) {
                frames.push(frame);
            }
        }
        if let Some(frame) = self.dispatch() {
            frames.push(frame);
        }
        frames
    }

    /// Whether any partial line or undispatched field is buffered.
    #[must_use]
    pub fn has_remaining(&self) -> bool {
        !self.buffer.is_empty()
            || !self.utf8_tail.is_empty()
            || !self.data.is_empty()
            || self.event.is_some()
    }

    fn append_utf8(&mut self, chunk: &[u8]) {
        let mut bytes = std::mem::take(&mut self.utf8_tail);
        bytes.extend_from_slice(chunk);

        match std::str::from_utf8(&bytes) {
            Ok(text) => self.buffer.push_str(text),
            Err(error) => {
                let valid = error.valid_up_to();
                self.buffer
                    .push_str(&String::from_utf8_lossy(&bytes[..valid]));
                match error.error_len() {
                    // Incomplete sequence at the end: keep it for the next push.
                    None => self.utf8_tail = bytes[valid..].to_vec(),
                    Some(_) => self
                        .buffer
                        .push_str(&String::from_utf8_lossy(&bytes[valid..])),
                }
            }
        }
    }

    /// Only an unterminated line can outgrow the bound; complete lines are
    /// framed before this runs.
    fn enforce_bound(&mut self) {
        if self.buffer.len() <= self.max_buffer_bytes {
            return;
        }
        tracing::warn!(
            limit_kb = self.max_buffer_bytes / 1024,
            "SSE buffer exceeded limit, dropping oldest data"
        );
        let mut keep_from = self.buffer.len() - self.max_buffer_bytes / 2;
        while !self.buffer.is_char_boundary(keep_from) {
            keep_from += 1;
        }
        self.buffer.drain(..keep_from);
    }

    fn process_line(&mut self, line: &str) -> Option<SseFrame> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => self.data.push(value.to_string()),
            "id" => self.id = Some(value.to_string()),
            // `retry` and unknown fields carry nothing the chat stream uses.
            _ => {}
        }
        None
    }

    fn dispatch(&mut self) -> Option<SseFrame> {
        let event = self.event.take();
        if self.data.is_empty() {
            return None;
        }
        let data = std::mem::take(&mut self.data).join("\n");
        Some(SseFrame {
            event: event.unwrap_or_else(|| DEFAULT_EVENT.to_string()),
            data,
            id: self.id.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn frame(event: &str, data: &str) -> SseFrame {
        SseFrame {
            event: event.to_string(),
            data: data.to_string(),
            id: None,
        }
    }

    #[test]
    fn basic_named_frame() {
        let mut decoder = SseDecoder::default();
        let frames = decoder.push_str("event: message_chunk\ndata: {\"id\":\"1\"}\n\n");
        assert_eq!(frames, vec![frame("message_chunk", "{\"id\":\"1\"}")]);
        assert!(!decoder.has_remaining());
    }

    #[test]
    fn frame_without_event_uses_default_name() {
        let mut decoder = SseDecoder::default();
        let frames = decoder.push_str("data: hello\n\n");
        assert_eq!(frames, vec![frame(DEFAULT_EVENT, "hello")]);
    }

    #[test]
    fn partial_chunks_are_buffered() {
        let mut decoder = SseDecoder::default();
        assert!(decoder.push_str("event: thoughts\ndata: {\"id\":").is_empty());
        assert!(decoder.has_remaining());

        let frames = decoder.push_str("\"1\"}\n\n");
        assert_eq!(frames, vec![frame("thoughts", "{\"id\":\"1\"}")]);
    }

    #[test]
    fn multi_line_data_is_joined() {
        let mut decoder = SseDecoder::default();
        let frames = decoder.push_str("data: first\ndata: second\n\n");
        assert_eq!(frames, vec![frame(DEFAULT_EVENT, "first\nsecond")]);
    }

    #[test]
    fn comments_and_crlf_are_handled() {
        let mut decoder = SseDecoder::default();
        let frames = decoder.push_str(": keep-alive\r\nevent: interrupt\r\ndata: {}\r\n\r\n");
        assert_eq!(frames, vec![frame("interrupt", "{}")]);
    }

    #[test]
    fn id_field_is_recorded() {
        let mut decoder = SseDecoder::default();
        let frames = decoder.push_str("id: 7\nevent: thoughts\ndata: {}\n\n");
        assert_eq!(frames[0].id.as_deref(), Some("7"));
    }

    #[test]
    fn split_utf8_sequence_survives_chunk_boundary() {
        let mut decoder = SseDecoder::default();
        let text = "data: 92% ✓\n\n".as_bytes();
        let split = text.iter().position(|b| *b == 0xE2).unwrap() + 1;

        assert!(decoder.push(&text[..split]).is_empty());
        let frames = decoder.push(&text[split..]);
        assert_eq!(frames, vec![frame(DEFAULT_EVENT, "92% ✓")]);
    }

    #[test]
    fn finish_flushes_unterminated_frame() {
        let mut decoder = SseDecoder::default();
        assert!(decoder.push_str("event: message_chunk\ndata: tail").is_empty());
        assert_eq!(decoder.finish(), vec![frame("message_chunk", "tail")]);
        assert!(!decoder.has_remaining());
    }

    #[test]
    fn event_without_data_is_not_dispatched() {
        let mut decoder = SseDecoder::default();
        assert!(decoder.push_str("event: message_chunk\n\n").is_empty());
    }

    #[test]
    fn buffer_is_bounded() {
        let mut decoder = SseDecoder::new(1024);
        decoder.push(&vec![b'x'; 4096]);
        assert!(decoder.buffer.len() <= 1024);
    }

    #[test]
    fn large_push_of_complete_frames_loses_nothing() {
        let mut decoder = SseDecoder::new(64 * 1024);
        let text = (0..3000)
            .map(|i| format!("event: message_chunk\ndata: {{\"id\":\"m\",\"content\":\"chunk-{i:05}\"}}\n\n"))
            .collect::<String>();
        assert!(text.len() > 64 * 1024 * 2);

        let frames = decoder.push_str(&text);
        assert_eq!(frames.len(), 3000);
        assert!(frames[0].data.contains("chunk-00000"));
        assert!(frames[2999].data.contains("chunk-02999"));
        assert!(!decoder.has_remaining());
    }

    #[test]
    fn oversized_partial_line_is_still_bounded() {
        let mut decoder = SseDecoder::new(1024);
        let mut text = "data: ok\n\n".to_string();
        text.push_str(&"y".repeat(4096));
        let frames = decoder.push_str(&text);
        assert_eq!(frames, vec![frame(DEFAULT_EVENT, "ok")]);
        assert!(decoder.buffer.len() <= 1024);
    }

    #[test]
    fn preview_truncates_long_payloads() {
        let long = frame(DEFAULT_EVENT, &"a".repeat(500));
        assert_eq!(long.preview().len(), 200);
        assert_eq!(frame(DEFAULT_EVENT, "short").preview(), "short");
    }
}
