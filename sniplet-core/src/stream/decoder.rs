//! Incremental UTF-8 decoding across chunk boundaries

/// Decodes UTF-8 that arrives in arbitrarily split chunks
///
/// A multi-byte sequence cut by a chunk boundary is held back until the rest
/// arrives. Bytes that can never form valid UTF-8 decode to U+FFFD.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode `chunk` and append the text to `out`
    pub fn decode_into(&mut self, chunk: &[u8], out: &mut String) {
        self.pending.extend_from_slice(chunk);

        let mut consumed = 0;
        loop {
            match std::str::from_utf8(&self.pending[consumed..]) {
                Ok(text) => {
                    out.push_str(text);
                    consumed = self.pending.len();
                    break;
                }
                Err(err) => {
                    let valid_end = consumed + err.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&self.pending[consumed..valid_end]));
                    consumed = valid_end;

                    match err.error_len() {
                        Some(invalid_len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            consumed += invalid_len;
                        }
                        // Incomplete sequence at the end: wait for more bytes
                        None => break,
                    }
                }
            }
        }

        self.pending.drain(..consumed);
    }

    /// Bytes held back waiting for the rest of a character
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Drop any held-back bytes
    pub fn reset(&mut self) {
        self.pending.clear();
    }
}
