//! Chunk-wise uppercase transform.
//!
//! Chunks are cut at arbitrary byte offsets, so a UTF-8 sequence may be
//! split across two of them. [`UppercaseTransform`] holds back an
//! incomplete trailing sequence (at most 3 bytes) and prepends it to the
//! next chunk. Invalid bytes become U+FFFD.

/// Stateful uppercase transform over a byte stream.
#[derive(Debug, Default)]
pub struct UppercaseTransform {
    carry: Vec<u8>,
}

impl UppercaseTransform {
    /// Creates a transform with nothing held back.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Transforms one chunk, returning the bytes ready to be written.
    ///
    /// An incomplete UTF-8 sequence at the end of `chunk` is retained
    /// until the next call (or [`UppercaseTransform::finish`]).
    pub fn transform(&mut self, chunk: &[u8]) -> Vec<u8> {
        let mut pending = std::mem::take(&mut self.carry);
        pending.extend_from_slice(chunk);

        let complete = pending
            .len()
            .saturating_sub(incomplete_suffix_len(&pending));
        self.carry = pending.split_off(complete);

        uppercase_lossy(&pending)
    }

    /// Flushes whatever is still held back at end of stream.
    pub fn finish(&mut self) -> Vec<u8> {
        let rest = std::mem::take(&mut self.carry);
        if rest.is_empty() {
            return rest;
        }
        uppercase_lossy(&rest)
    }

    /// Number of bytes currently held back.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.carry.len()
    }
}

fn uppercase_lossy(bytes: &[u8]) -> Vec<u8> {
    if bytes.is_ascii() {
        return bytes.to_ascii_uppercase();
    }
    String::from_utf8_lossy(bytes).to_uppercase().into_bytes()
}

/// Length of a truncated multi-byte sequence at the end of `bytes`, or 0.
fn incomplete_suffix_len(bytes: &[u8]) -> usize {
    let len = bytes.len();
    for back in 1..=len.min(4) {
        let Some(&byte) = bytes.get(len - back) else {
            break;
        };
        if byte & 0b1100_0000 == 0b1000_0000 {
            continue;
        }
        let width = match byte {
            0xC2..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF4 => 4,
            _ => 1,
        };
        return if width > back { back } else { 0 };
    }
    0
}
