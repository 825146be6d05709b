/// Incremental decoder for the chat stream's server-sent events.
///
/// Frames are separated by a blank line; each frame carries an `event:` line
/// naming the event and a `data:` line with a JSON payload. Chunks arrive at
/// arbitrary byte boundaries, so the decoder buffers until a full frame is
/// available. Frames missing either line are skipped.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

/// One decoded event frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
    pub event: String,
    pub data: String,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk of bytes; returns every frame completed by it.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        self.buffer.extend_from_slice(chunk);

        let mut frames = Vec::new();
        while let Some(pos) = find_frame_end(&self.buffer) {
            let rest = self.buffer.split_off(pos + 2);
            let block = std::mem::replace(&mut self.buffer, rest);
            if let Some(frame) = parse_frame(&String::from_utf8_lossy(&block)) {
                frames.push(frame);
            }
        }
        frames
    }
}

fn find_frame_end(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == b"\n\n")
}

fn parse_frame(block: &str) -> Option<SseFrame> {
    let mut event = None;
    let mut data = None;
    for line in block.lines() {
        if let Some(rest) = line.strip_prefix("event:") {
            event = Some(rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix("data:") {
            data = Some(rest.strip_prefix(' ').unwrap_or(rest).to_string());
        }
    }
    Some(SseFrame {
        event: event?,
        data: data?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_a_complete_frame() {
        let mut dec = SseDecoder::new();
        let frames = dec.push(b"event: thinking_token\ndata: {\"text\":\"hi\"}\n\n");
        assert_eq!(
            frames,
            vec![SseFrame {
                event: "thinking_token".to_string(),
                data: "{\"text\":\"hi\"}".to_string(),
            }]
        );
    }

    #[test]
    fn buffers_across_chunk_boundaries() {
        let mut dec = SseDecoder::new();
        assert!(dec.push(b"event: final\nda").is_empty());
        let frames = dec.push(b"ta: {\"answer\":\"ok\"}\n\nevent: err");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].event, "final");
        assert_eq!(frames[0].data, "{\"answer\":\"ok\"}");

        // Remainder completes on the next chunk.
        let frames = dec.push(b"or\ndata: {}\n\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].event, "error");
    }

    #[test]
    fn multiple_frames_in_one_chunk() {
        let mut dec = SseDecoder::new();
        let frames = dec.push(b"event: a\ndata: 1\n\nevent: b\ndata: 2\n\n");
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1].event, "b");
        assert_eq!(frames[1].data, "2");
    }

    #[test]
    fn incomplete_frames_are_skipped() {
        let mut dec = SseDecoder::new();
        // Comment-only / partial frames produce nothing.
        assert!(dec.push(b": keepalive\n\n").is_empty());
        assert!(dec.push(b"data: orphan\n\n").is_empty());
    }
}
