//! Server-Sent Events decoding.
//!
//! Both ends of the relay speak SSE: the Anthropic streaming API upstream and
//! our own `/api/chat` + `/api/transform` routes downstream. Only `data:` fields
//! are meaningful to us; `event:`, `id:` and comment lines are skipped.

use bytes::Bytes;
use futures::stream::{self, BoxStream, Stream, StreamExt};

/// The sentinel frame that terminates our relay streams.
pub const DONE_SENTINEL: &str = "[DONE]";

/// Incremental decoder: feed raw byte chunks, get back complete event payloads.
///
/// Chunks may split anywhere, including inside a multi-byte UTF-8 sequence,
/// so bytes are buffered until a full line is available.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    data_lines: Vec<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes a chunk and returns every event payload completed by it.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line[..line.len() - 1]);
            let line = line.strip_suffix('\r').unwrap_or(&line);
            if let Some(event) = self.process_line(line) {
                events.push(event);
            }
        }
        events
    }

    /// Flushes a trailing event when the stream ends without a blank line.
    pub fn finish(&mut self) -> Option<String> {
        if !self.buffer.is_empty() {
            let rest = std::mem::take(&mut self.buffer);
            let line = String::from_utf8_lossy(&rest).into_owned();
            if let Some(event) = self.process_line(line.trim_end_matches('\r')) {
                return Some(event);
            }
        }
        self.dispatch()
    }

    fn process_line(&mut self, line: &str) -> Option<String> {
        if line.is_empty() {
            return self.dispatch();
        }
        if let Some(value) = line.strip_prefix("data:") {
            let value = value.strip_prefix(' ').unwrap_or(value);
            self.data_lines.push(value.to_string());
        }
        None
    }

    fn dispatch(&mut self) -> Option<String> {
        if self.data_lines.is_empty() {
            return None;
        }
        let data = self.data_lines.join("\n");
        self.data_lines.clear();
        Some(data)
    }
}

/// Turns a byte stream into a stream of event payloads.
pub fn data_payloads<S, E>(bytes: S) -> BoxStream<'static, Result<String, E>>
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Send + 'static,
{
    bytes
        .map(Some)
        .chain(stream::once(async { None }))
        .scan(SseDecoder::new(), |decoder, chunk| {
            let out: Vec<Result<String, E>> = match chunk {
                Some(Ok(bytes)) => decoder.feed(&bytes).into_iter().map(Ok).collect(),
                Some(Err(e)) => vec![Err(e)],
                None => decoder.finish().into_iter().map(Ok).collect(),
            };
            futures::future::ready(Some(stream::iter(out)))
        })
        .flatten()
        .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_single_event() {
        let mut decoder = SseDecoder::new();
        let events = decoder.feed(b"data: {\"text\":\"hi\"}\n\n");
        assert_eq!(events, vec!["{\"text\":\"hi\"}"]);
    }

    #[test]
    fn test_event_split_across_chunks() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(b"data: {\"te").is_empty());
        assert!(decoder.feed(b"xt\":\"a\"}\n").is_empty());
        assert_eq!(decoder.feed(b"\n"), vec!["{\"text\":\"a\"}"]);
    }

    #[test]
    fn test_multibyte_character_split_across_chunks() {
        let frame = "data: {\"text\":\"你好\"}\n\n".as_bytes();
        // Split inside the three-byte encoding of the first character.
        let (first, second) = frame.split_at(17);
        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(first).is_empty());
        assert_eq!(decoder.feed(second), vec!["{\"text\":\"你好\"}"]);
    }

    #[test]
    fn test_skips_event_and_comment_lines() {
        let mut decoder = SseDecoder::new();
        let events = decoder.feed(
            b": ping\nevent: content_block_delta\ndata: {\"type\":\"x\"}\n\nevent: ping\n\n",
        );
        assert_eq!(events, vec!["{\"type\":\"x\"}"]);
    }

    #[test]
    fn test_crlf_line_endings() {
        let mut decoder = SseDecoder::new();
        let events = decoder.feed(b"data: [DONE]\r\n\r\n");
        assert_eq!(events, vec![DONE_SENTINEL]);
    }

    #[test]
    fn test_multiline_data_is_joined() {
        let mut decoder = SseDecoder::new();
        let events = decoder.feed(b"data: line one\ndata: line two\n\n");
        assert_eq!(events, vec!["line one\nline two"]);
    }

    #[test]
    fn test_finish_flushes_unterminated_event() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(b"data: tail").is_empty());
        assert_eq!(decoder.finish(), Some("tail".to_string()));
        assert_eq!(decoder.finish(), None);
    }

    #[tokio::test]
    async fn test_data_payloads_over_arbitrary_chunking() {
        let body = "data: {\"text\":\"a\"}\n\ndata: {\"text\":\"b\"}\n\ndata: [DONE]\n\n";
        let chunks: Vec<Result<Bytes, std::io::Error>> = body
            .as_bytes()
            .chunks(3)
            .map(|c| Ok(Bytes::copy_from_slice(c)))
            .collect();

        let payloads: Vec<String> = data_payloads(stream::iter(chunks))
            .map(|r| r.unwrap())
            .collect()
            .await;

        assert_eq!(
            payloads,
            vec!["{\"text\":\"a\"}", "{\"text\":\"b\"}", DONE_SENTINEL]
        );
    }
}
