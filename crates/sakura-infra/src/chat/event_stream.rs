//! Event stream parser for streamed chat completions.
//!
//! The upstream body is a sequence of `data: <json>` lines separated by
//! blank lines and terminated by `data: [DONE]`. Bytes arrive in arbitrary
//! chunks, so chunks are accumulated into a frame until the buffered text
//! ends with a newline (or the source ends); the frame is then split into
//! lines and each `data:` payload is decoded.
//!
//! ```text
//! data: {"id":"c1","choices":[{"index":0,"delta":{"content":"Hel"}}]}
//!
//! data: {"id":"c1","choices":[{"index":0,"delta":{"content":"lo"}}]}
//!
//! data: [DONE]
//! ```
//!
//! The sentinel ends the stream immediately, even if more lines follow it.

use std::fmt::Display;

use bytes::Bytes;
use futures_util::{Stream, StreamExt};

use sakura_core::chat::ChatEventStream;
use sakura_types::chat::ChatDeltaEvent;
use sakura_types::error::ChatError;

/// Prefix of every payload-bearing line.
pub const DATA_PREFIX: &str = "data:";
/// Payload that marks the end of the stream.
pub const DONE_SENTINEL: &str = "[DONE]";

/// One meaningful line of a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
enum FrameLine {
    Payload(String),
    Done,
}

/// Split a complete frame into its payload lines.
///
/// Blank lines (keep-alives) and non-`data:` lines (comments, `event:` and
/// `id:` fields) carry no payload and are dropped. Lines after the sentinel
/// are not returned.
fn split_frame(frame: &str) -> Vec<FrameLine> {
    let mut lines = Vec::new();
    for raw in frame.split('\n') {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
            tracing::debug!(line = %line, "non-data event stream line, skipping");
            continue;
        };
        let payload = payload.trim();
        if payload == DONE_SENTINEL {
            lines.push(FrameLine::Done);
            break;
        }
        if !payload.is_empty() {
            lines.push(FrameLine::Payload(payload.to_string()));
        }
    }
    lines
}

/// Incremental UTF-8 decoder.
///
/// A multi-byte character split across two chunks is held back until the
/// rest of it arrives. Invalid sequences decode to U+FFFD.
#[derive(Debug, Default)]
struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    fn decode(&mut self, chunk: &[u8], out: &mut String) {
        self.pending.extend_from_slice(chunk);
        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(text) => {
                    out.push_str(text);
                    self.pending.clear();
                    return;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    // valid_up_to() guarantees this prefix is UTF-8.
                    out.push_str(&String::from_utf8_lossy(&self.pending[..valid]));
                    match e.error_len() {
                        Some(bad) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            self.pending.drain(..valid + bad);
                        }
                        None => {
                            // Incomplete tail: wait for the next chunk.
                            self.pending.drain(..valid);
                            return;
                        }
                    }
                }
            }
        }
    }

    fn finish(&mut self, out: &mut String) {
        if !self.pending.is_empty() {
            out.push_str(&String::from_utf8_lossy(&self.pending));
            self.pending.clear();
        }
    }
}

/// Turn a raw byte stream into a stream of decoded chat delta events.
///
/// Errors from the source become [`ChatError::Stream`]; a payload that is
/// not valid event JSON becomes [`ChatError::Deserialization`]. Either ends
/// the stream. Dropping the returned stream drops the source.
pub fn parse_event_stream<S, E>(source: S) -> ChatEventStream
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Display + Send + 'static,
{
    Box::pin(async_stream::try_stream! {
        let mut source = Box::pin(source);
        let mut decoder = Utf8Decoder::default();
        let mut buffer = String::new();
        let mut exhausted = false;

        'frames: while !exhausted {
            // Accumulate chunks until the buffered text ends on a line break.
            loop {
                match source.next().await {
                    Some(chunk) => {
                        let chunk = chunk
                            .map_err(|e| ChatError::Stream(format!("response body read: {e}")))?;
                        decoder.decode(&chunk, &mut buffer);
                        if buffer.ends_with('\n') {
                            break;
                        }
                    }
                    None => {
                        decoder.finish(&mut buffer);
                        exhausted = true;
                        break;
                    }
                }
            }

            for line in split_frame(&buffer) {
                match line {
                    FrameLine::Done => break 'frames,
                    FrameLine::Payload(payload) => {
                        let event: ChatDeltaEvent = serde_json::from_str(&payload)
                            .map_err(|e| ChatError::Deserialization(format!("{e}: {payload}")))?;
                        yield event;
                    }
                }
            }
            buffer.clear();
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn delta(content: &str) -> String {
        format!(
            "data: {{\"id\":\"c1\",\"model\":\"gpt-4o\",\"choices\":[{{\"index\":0,\"delta\":{{\"content\":{}}}}}]}}\n\n",
            serde_json::to_string(content).unwrap()
        )
    }

    fn source(chunks: Vec<Vec<u8>>) -> impl Stream<Item = Result<Bytes, std::io::Error>> + Send + 'static {
        futures_util::stream::iter(chunks.into_iter().map(|c| Ok(Bytes::from(c))))
    }

    async fn collect(chunks: Vec<Vec<u8>>) -> Vec<Result<ChatDeltaEvent, ChatError>> {
        parse_event_stream(source(chunks)).collect().await
    }

    async fn contents(chunks: Vec<Vec<u8>>) -> Vec<String> {
        collect(chunks)
            .await
            .into_iter()
            .map(|r| r.unwrap().primary_content().to_string())
            .collect()
    }

    // -------------------------------------------------------------------
    // split_frame
    // -------------------------------------------------------------------

    #[test]
    fn test_split_frame_skips_blank_and_comment_lines() {
        let frame = ": keep-alive\n\nevent: message\ndata: {\"a\":1}\n\n";
        assert_eq!(
            split_frame(frame),
            vec![FrameLine::Payload("{\"a\":1}".to_string())]
        );
    }

    #[test]
    fn test_split_frame_stops_at_sentinel() {
        let frame = "data: {\"a\":1}\ndata: [DONE]\ndata: {\"b\":2}\n";
        assert_eq!(
            split_frame(frame),
            vec![FrameLine::Payload("{\"a\":1}".to_string()), FrameLine::Done]
        );
    }

    #[test]
    fn test_split_frame_handles_crlf_and_no_space() {
        let frame = "data:{\"a\":1}\r\n\r\n";
        assert_eq!(
            split_frame(frame),
            vec![FrameLine::Payload("{\"a\":1}".to_string())]
        );
    }

    // -------------------------------------------------------------------
    // Utf8Decoder
    // -------------------------------------------------------------------

    #[test]
    fn test_decoder_holds_back_split_character() {
        let bytes = "héllo".as_bytes();
        let mut decoder = Utf8Decoder::default();
        let mut out = String::new();
        decoder.decode(&bytes[..2], &mut out);
        assert_eq!(out, "h");
        decoder.decode(&bytes[2..], &mut out);
        assert_eq!(out, "héllo");
    }

    #[test]
    fn test_decoder_replaces_invalid_bytes() {
        let mut decoder = Utf8Decoder::default();
        let mut out = String::new();
        decoder.decode(&[b'a', 0xff, b'b'], &mut out);
        assert_eq!(out, "a\u{fffd}b");
    }

    #[test]
    fn test_decoder_flushes_dangling_tail_on_finish() {
        let mut decoder = Utf8Decoder::default();
        let mut out = String::new();
        decoder.decode(&[b'a', 0xe2, 0x82], &mut out);
        assert_eq!(out, "a");
        decoder.finish(&mut out);
        assert_eq!(out, "a\u{fffd}");
    }

    // -------------------------------------------------------------------
    // parse_event_stream
    // -------------------------------------------------------------------

    #[tokio::test]
    async fn test_accumulates_fragments_in_order() {
        let body = format!("{}{}data: [DONE]\n\n", delta("Hel"), delta("lo"));
        let got = contents(vec![body.into_bytes()]).await;
        assert_eq!(got.concat(), "Hello");
        assert_eq!(got.len(), 2);
    }

    #[tokio::test]
    async fn test_chunk_boundaries_do_not_change_events() {
        let body = format!(
            "{}{}{}data: [DONE]\n\n",
            delta("Hel"),
            delta("lo, "),
            delta("wörld")
        )
        .into_bytes();
        let whole = contents(vec![body.clone()]).await;

        for size in [1, 2, 3, 5, 7, 13, 64] {
            let chunks: Vec<Vec<u8>> = body.chunks(size).map(|c| c.to_vec()).collect();
            assert_eq!(contents(chunks).await, whole, "chunk size {size}");
        }
    }

    #[tokio::test]
    async fn test_sentinel_ends_stream_even_with_trailing_lines() {
        let body = format!("{}data: [DONE]\n\n{}", delta("a"), delta("b"));
        assert_eq!(contents(vec![body.into_bytes()]).await, vec!["a"]);
    }

    #[tokio::test]
    async fn test_sentinel_stops_reading_the_source() {
        let head = futures_util::stream::iter(vec![
            Ok(Bytes::from(delta("a"))),
            Ok(Bytes::from_static(b"data: [DONE]\n\n")),
        ]);
        let poisoned = futures_util::stream::iter(vec![Err::<Bytes, _>("should not be read")]);

        let events: Vec<_> = parse_event_stream(head.chain(poisoned)).collect().await;
        assert_eq!(events.len(), 1);
        assert!(events[0].is_ok());
    }

    #[tokio::test]
    async fn test_keep_alive_blank_lines_are_ignored() {
        let body = format!("\n\n: ping\n\n{}\n\ndata: [DONE]\n", delta("x"));
        assert_eq!(contents(vec![body.into_bytes()]).await, vec!["x"]);
    }

    #[tokio::test]
    async fn test_final_frame_without_trailing_newline() {
        let body = "data: {\"choices\":[{\"index\":0,\"delta\":{\"content\":\"tail\"}}]}";
        assert_eq!(contents(vec![body.as_bytes().to_vec()]).await, vec!["tail"]);
    }

    #[tokio::test]
    async fn test_source_end_without_sentinel_is_clean() {
        let body = delta("only");
        assert_eq!(contents(vec![body.into_bytes()]).await, vec!["only"]);
    }

    #[tokio::test]
    async fn test_empty_source_yields_nothing() {
        assert!(collect(vec![]).await.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_json_is_deserialization_error() {
        let body = format!("{}data: {{not json\n\n{}", delta("a"), delta("b"));
        let events = collect(vec![body.into_bytes()]).await;
        assert_eq!(events.len(), 2);
        assert!(events[0].is_ok());
        assert!(matches!(&events[1], Err(ChatError::Deserialization(_))));
    }

    #[tokio::test]
    async fn test_source_error_is_stream_error() {
        let items = vec![
            Ok(Bytes::from(delta("a"))),
            Err::<Bytes, _>("connection reset"),
        ];
        let events: Vec<_> = parse_event_stream(futures_util::stream::iter(items)).collect().await;
        assert_eq!(events.len(), 2);
        match &events[1] {
            Err(ChatError::Stream(msg)) => assert!(msg.contains("connection reset")),
            other => panic!("expected Stream error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_multibyte_split_across_chunks() {
        let body = format!("{}data: [DONE]\n\n", delta("日本")).into_bytes();
        let pos = body.iter().position(|b| *b == 0xe6).unwrap() + 1;
        let chunks = vec![body[..pos].to_vec(), body[pos..].to_vec()];
        assert_eq!(contents(chunks).await, vec!["日本"]);
    }

    #[tokio::test]
    async fn test_dropping_stream_releases_source() {
        struct DropFlag(Arc<AtomicBool>);
        impl Drop for DropFlag {
            fn drop(&mut self) {
                self.0.store(true, Ordering::SeqCst);
            }
        }

        let dropped = Arc::new(AtomicBool::new(false));
        let guard = DropFlag(Arc::clone(&dropped));
        let chunks = vec![delta("a"), delta("b"), delta("c")];
        let src = futures_util::stream::iter(chunks).map(move |c| {
            let _held = &guard;
            Ok::<_, std::io::Error>(Bytes::from(c))
        });

        let mut events = parse_event_stream(src);
        let first = events.next().await.unwrap().unwrap();
        assert_eq!(first.primary_content(), "a");
        assert!(!dropped.load(Ordering::SeqCst));

        drop(events);
        assert!(dropped.load(Ordering::SeqCst));
    }
}
