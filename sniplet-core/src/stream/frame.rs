//! Parsing of single event-stream lines

use crate::protocol::StreamChunk;
use thiserror::Error;

/// Prefix every data record carries
pub const DATA_PREFIX: &str = "data: ";

/// Payload that marks the end of the stream
pub const DONE_SENTINEL: &str = "[DONE]";

/// A recognised data record
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// A parsed JSON record
    Chunk(StreamChunk),
    /// The terminal sentinel
    Done,
}

/// A data record whose payload is not valid JSON
///
/// Never surfaced to callers: the line is dropped and the stream continues.
#[derive(Debug, Error)]
#[error("malformed stream record: {source}")]
pub struct FrameParseError {
    #[source]
    pub source: serde_json::Error,
}

/// Parse one line of the stream
///
/// Returns `None` for lines that are not data records (blank lines,
/// keep-alive comments, `event:` fields). Surrounding whitespace, including a
/// trailing `\r\n`, is ignored.
pub fn parse_frame(line: &str) -> Option<Result<Frame, FrameParseError>> {
    let payload = line.trim().strip_prefix(DATA_PREFIX)?;

    if payload == DONE_SENTINEL {
        return Some(Ok(Frame::Done));
    }

    Some(
        serde_json::from_str::<StreamChunk>(payload)
            .map(Frame::Chunk)
            .map_err(|source| FrameParseError { source }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_record() {
        let frame = parse_frame("data: {\"choices\":[{\"delta\":{\"content\":\"Hi\"}}]}\n")
            .unwrap()
            .unwrap();
        match frame {
            Frame::Chunk(chunk) => assert_eq!(chunk.first_delta_text(), Some("Hi")),
            Frame::Done => panic!("expected a chunk"),
        }
    }

    #[test]
    fn test_done_sentinel() {
        assert!(matches!(parse_frame("data: [DONE]\r\n"), Some(Ok(Frame::Done))));
    }

    #[test]
    fn test_non_data_lines_ignored() {
        assert!(parse_frame("\n").is_none());
        assert!(parse_frame(": OPENROUTER PROCESSING\n").is_none());
        assert!(parse_frame("event: message\n").is_none());
        // the prefix requires the space after the colon
        assert!(parse_frame("data:[DONE]\n").is_none());
    }

    #[test]
    fn test_malformed_payload() {
        let result = parse_frame("data: {\"choices\":[{\"del").unwrap();
        assert!(result.is_err());
    }

    #[test]
    fn test_any_json_value_is_a_chunk() {
        for line in ["data: 42\n", "data: null\n", "data: {\"choices\":[{\"delta\":7}]}\n"] {
            match parse_frame(line) {
                Some(Ok(Frame::Chunk(chunk))) => assert_eq!(chunk.first_delta_text(), None),
                other => panic!("expected a chunk for {line:?}, got {other:?}"),
            }
        }
    }
}
