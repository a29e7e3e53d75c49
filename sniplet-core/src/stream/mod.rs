//! Event-stream reassembly
//!
//! The completion endpoint answers with newline-delimited records:
//!
//! ```text
//! data: {"choices":[{"delta":{"content":"Hel"}}]}
//! data: {"choices":[{"delta":{"content":"lo"}}]}
//! data: [DONE]
//! ```
//!
//! [`StreamReassembler`] turns arbitrarily chunked bytes of such a stream into
//! the ordered sequence of `choices[0].delta.content` texts. Malformed records
//! are dropped without failing the stream.

mod decoder;
mod frame;
mod reassembler;

pub use decoder::Utf8Decoder;
pub use frame::{parse_frame, Frame, FrameParseError, DATA_PREFIX, DONE_SENTINEL};
pub use reassembler::{text_deltas, StreamReassembler};
