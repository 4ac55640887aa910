use crate::sse::*;

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(content: &str) -> StreamEvent {
        StreamEvent::Chunk {
            kind: CONTENT_CHUNK.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_parse_line_variants() {
        assert_eq!(
            parse_line(r#"data: {"content": {"type": "content_chunk", "content": "Hi"}}"#),
            Some(chunk("Hi"))
        );
        assert_eq!(parse_line(r#"data:{"content": "plain"}"#), Some(chunk("plain")));
        assert_eq!(parse_line("data: [DONE]"), Some(StreamEvent::Done));
        assert_eq!(parse_line(r#"data: {"content": "[DONE]"}"#), Some(StreamEvent::Done));
        assert_eq!(parse_line(": keep-alive"), None);
        assert_eq!(parse_line("data: {not json"), None);
        assert_eq!(parse_line(r#"data: {"content": ""}"#), None);
        assert_eq!(parse_line("data:"), None);
    }

    #[test]
    fn test_decoder_reassembles_split_frames() {
        let mut decoder = SseDecoder::new();
        let first = decoder.push(b"data: {\"content\": {\"type\": \"content_chunk\", \"con");
        assert!(first.is_empty());
        let rest = decoder.push(b"tent\": \"Hel\"}}\n\ndata: {\"content\": \"lo\"}\n");
        assert_eq!(rest, vec![chunk("Hel"), chunk("lo")]);
        assert!(!decoder.is_finished());
    }

    #[test]
    fn test_decoder_stops_at_done() {
        let mut decoder = SseDecoder::new();
        let events = decoder.push(b"data: {\"content\": \"a\"}\r\ndata: [DONE]\ndata: {\"content\": \"late\"}\n");
        assert_eq!(events, vec![chunk("a"), StreamEvent::Done]);
        assert!(decoder.is_finished());
        assert!(decoder.push(b"data: {\"content\": \"more\"}\n").is_empty());
    }

    #[test]
    fn test_thinking_chunks_are_tagged() {
        let event = parse_line(r#"data: {"content": {"type": "thinking_chunk", "content": "hmm"}}"#).unwrap();
        assert!(event.is_thinking());
        assert!(!chunk("answer").is_thinking());
    }

    #[test]
    fn test_finish_flushes_trailing_line() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"data: {\"content\": \"tail\"}").is_empty());
        assert_eq!(decoder.finish(), vec![chunk("tail")]);
        assert!(decoder.finish().is_empty());
    }
}
