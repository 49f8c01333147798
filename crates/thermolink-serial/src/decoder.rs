//! Incremental UTF-8 decoding for serial chunks.
//!
//! A serial read can end in the middle of a multi-byte sequence. The decoder
//! keeps the incomplete tail and prepends it to the next read, so text handed
//! upward is always whole characters. Invalid bytes become U+FFFD.

/// Streaming UTF-8 decoder with replacement-character error handling.
#[derive(Debug, Default)]
pub struct Utf8ChunkDecoder {
    pending: Vec<u8>,
}

impl Utf8ChunkDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the next run of bytes. Returns only complete characters; an
    /// unfinished trailing sequence is held back for the next call.
    pub fn decode(&mut self, bytes: &[u8]) -> String {
        let mut buf = std::mem::take(&mut self.pending);
        buf.extend_from_slice(bytes);

        let mut out = String::with_capacity(buf.len());
        let mut rest = buf.as_slice();

        while !rest.is_empty() {
            match std::str::from_utf8(rest) {
                Ok(text) => {
                    out.push_str(text);
                    rest = &[];
                }
                Err(err) => {
                    let valid = err.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&rest[..valid]));
                    match err.error_len() {
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            rest = &rest[valid + len..];
                        }
                        None => {
                            self.pending = rest[valid..].to_vec();
                            rest = &[];
                        }
                    }
                }
            }
        }

        out
    }

    /// Flush at end of stream. A dangling partial sequence decodes to a
    /// single replacement character.
    pub fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        self.pending.clear();
        Some(char::REPLACEMENT_CHARACTER.to_string())
    }

    /// Whether bytes are held back waiting for the rest of a character.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_passes_through() {
        let mut dec = Utf8ChunkDecoder::new();
        assert_eq!(dec.decode(b"24.50,60.20\n"), "24.50,60.20\n");
        assert!(!dec.has_pending());
    }

    #[test]
    fn multibyte_split_across_reads() {
        // "21.0°C" with the two-byte degree sign split in half
        let bytes = "21.0\u{b0}C".as_bytes();
        let split = 5;
        let mut dec = Utf8ChunkDecoder::new();

        assert_eq!(dec.decode(&bytes[..split]), "21.0");
        assert!(dec.has_pending());
        assert_eq!(dec.decode(&bytes[split..]), "\u{b0}C");
        assert!(!dec.has_pending());
    }

    #[test]
    fn three_byte_sequence_one_byte_at_a_time() {
        let mut dec = Utf8ChunkDecoder::new();
        let euro = "\u{20ac}".as_bytes();
        assert_eq!(dec.decode(&euro[..1]), "");
        assert_eq!(dec.decode(&euro[1..2]), "");
        assert_eq!(dec.decode(&euro[2..]), "\u{20ac}");
    }

    #[test]
    fn invalid_byte_is_replaced() {
        let mut dec = Utf8ChunkDecoder::new();
        assert_eq!(dec.decode(b"24.5\xff,60.2"), "24.5\u{fffd},60.2");
    }

    #[test]
    fn finish_flushes_dangling_sequence() {
        let mut dec = Utf8ChunkDecoder::new();
        assert_eq!(dec.decode(&[b'7', 0xe2, 0x82]), "7");
        assert_eq!(dec.finish().as_deref(), Some("\u{fffd}"));
        assert_eq!(dec.finish(), None);
    }
}
