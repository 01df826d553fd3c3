//! Incremental UTF-8 decoding.
//!
//! A source makes no promise about fragment boundaries, so a multi-byte
//! character can arrive split across two reads. The decoder holds back an
//! incomplete trailing sequence and prepends it to the next fragment.
//! Invalid sequences decode to U+FFFD, one replacement per maximal invalid
//! subpart.

/// Stateful UTF-8 decoder with carry.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    /// Bytes of an incomplete sequence at the end of the last fragment.
    pending: Vec<u8>,
}

impl Utf8Decoder {
    /// Create a decoder with no carried bytes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode one fragment, carrying an incomplete trailing sequence.
    pub fn decode(&mut self, bytes: &[u8]) -> String {
        if self.pending.is_empty() {
            return self.decode_from(bytes);
        }
        let mut joined = std::mem::take(&mut self.pending);
        joined.extend_from_slice(bytes);
        self.decode_from(&joined)
    }

    /// Flush carried bytes at end of input.
    ///
    /// A dangling incomplete sequence decodes to a single U+FFFD.
    pub fn finish(&mut self) -> String {
        if self.pending.is_empty() {
            String::new()
        } else {
            self.pending.clear();
            String::from(char::REPLACEMENT_CHARACTER)
        }
    }

    /// Number of bytes held back from the last fragment.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    fn decode_from(&mut self, mut rest: &[u8]) -> String {
        let mut out = String::with_capacity(rest.len());
        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    out.push_str(valid);
                    return out;
                }
                Err(e) => {
                    let (valid, after) = rest.split_at(e.valid_up_to());
                    // `valid` is well-formed, so this borrows without replacing.
                    out.push_str(&String::from_utf8_lossy(valid));
                    match e.error_len() {
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            rest = &after[len..];
                        }
                        None => {
                            self.pending.extend_from_slice(after);
                            return out;
                        }
                    }
                }
            }
        }
    }
}
