//! Line buffering and delta extraction for event streams

use super::decoder::Utf8Decoder;
use super::frame::{parse_frame, Frame};
use bytes::Bytes;
use futures::{Stream, StreamExt};

/// Turns raw stream bytes into text deltas
///
/// Chunks may split lines, JSON records and UTF-8 sequences anywhere; the
/// deltas produced for a given byte sequence do not depend on how it was
/// chunked. Once the terminal sentinel is seen the reassembler is finished and
/// ignores further input.
#[derive(Debug, Default)]
pub struct StreamReassembler {
    decoder: Utf8Decoder,
    buffer: String,
    finished: bool,
}

impl StreamReassembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk and return the deltas completed by it, in order
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut deltas = Vec::new();
        if self.finished {
            return deltas;
        }

        self.decoder.decode_into(chunk, &mut self.buffer);

        while let Some(newline) = self.buffer.find('\n') {
            let line: String = self.buffer.drain(..=newline).collect();

            match parse_frame(&line) {
                None => continue,
                Some(Ok(Frame::Done)) => {
                    self.finish();
                    break;
                }
                Some(Ok(Frame::Chunk(record))) => {
                    if let Some(text) = record.first_delta_text() {
                        deltas.push(text.to_string());
                    }
                }
                Some(Err(err)) => {
                    // Lossy by contract: drop the record, keep the stream
                    tracing::trace!(error = %err, "discarding stream record");
                }
            }
        }

        deltas
    }

    /// Whether the terminal sentinel has been seen (or `finish` was called)
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Stop consuming input, discarding any partial line and undecoded bytes
    pub fn finish(&mut self) {
        self.finished = true;
        self.buffer.clear();
        self.decoder.reset();
    }
}

/// Adapt a byte stream into a stream of text deltas
///
/// Ends after the terminal sentinel (dropping `source`, which releases the
/// underlying connection), when `source` ends, or after yielding the first
/// error from `source`. An unterminated trailing line is discarded.
pub fn text_deltas<S, E>(source: S) -> impl Stream<Item = Result<String, E>> + Send
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Send + 'static,
{
    async_stream::stream! {
        let mut source = Box::pin(source);
        let mut reassembler = StreamReassembler::new();

        while let Some(chunk) = source.next().await {
            match chunk {
                Ok(bytes) => {
                    for delta in reassembler.push(&bytes) {
                        yield Ok(delta);
                    }
                    if reassembler.is_finished() {
                        break;
                    }
                }
                Err(err) => {
                    yield Err(err);
                    break;
                }
            }
        }
    }
}
