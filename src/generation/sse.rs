//! Incremental decoder for the provider's SSE response body.

use serde_json::Value;

/// Buffers raw response bytes and yields the payload of every complete
/// `data:` line. Chunk boundaries may fall anywhere, including inside a
/// multi-byte character, so the buffer stays in bytes until a full line is
/// available.
pub(crate) struct SseLineDecoder {
    buf: Vec<u8>,
}

impl SseLineDecoder {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(chunk);

        let mut out = Vec::new();
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buf.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line);
            let line = line.trim_end_matches(['\r', '\n']);

            if let Some(payload) = line.strip_prefix("data:") {
                out.push(payload.trim_start().to_string());
            }
        }
        out
    }
}

/// Text delta carried by one decoded chunk, if any. Role-only and
/// usage-only chunks carry none.
pub(crate) fn delta_text(payload: &str) -> Option<String> {
    let value: Value = serde_json::from_str(payload).ok()?;
    value
        .get("choices")?
        .get(0)?
        .get("delta")?
        .get("content")?
        .as_str()
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_complete_data_lines() {
        let mut decoder = SseLineDecoder::new();
        let payloads = decoder.push(b"data: {\"a\":1}\n\ndata: [DONE]\n\n");
        assert_eq!(payloads, vec!["{\"a\":1}".to_string(), "[DONE]".to_string()]);
    }

    #[test]
    fn buffers_lines_split_across_chunks() {
        let mut decoder = SseLineDecoder::new();
        assert!(decoder.push(b"da").is_empty());
        assert!(decoder.push(b"ta: {\"a\":").is_empty());
        let payloads = decoder.push(b"1}\n");
        assert_eq!(payloads, vec!["{\"a\":1}".to_string()]);
    }

    #[test]
    fn survives_multibyte_split_inside_a_line() {
        let raw = "data: {\"text\":\"café\"}\n".as_bytes();
        let split = raw.len() - 4; // inside the encoded é
        let mut decoder = SseLineDecoder::new();
        assert!(decoder.push(&raw[..split]).is_empty());
        let payloads = decoder.push(&raw[split..]);
        assert_eq!(payloads, vec!["{\"text\":\"café\"}".to_string()]);
    }

    #[test]
    fn ignores_comments_and_other_fields() {
        let mut decoder = SseLineDecoder::new();
        let payloads = decoder.push(b": keep-alive\nevent: chunk\r\ndata: x\r\n");
        assert_eq!(payloads, vec!["x".to_string()]);
    }

    #[test]
    fn extracts_content_deltas_only() {
        assert_eq!(
            delta_text(r#"{"choices":[{"delta":{"content":"Hi"}}]}"#),
            Some("Hi".to_string())
        );
        assert_eq!(delta_text(r#"{"choices":[{"delta":{"role":"assistant"}}]}"#), None);
        assert_eq!(delta_text(r#"{"choices":[],"usage":{"total_tokens":3}}"#), None);
        assert_eq!(delta_text("not json"), None);
    }
}
