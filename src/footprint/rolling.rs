// Karp-Rabin rolling footprint hash.
//
// The hash of a window b[0..d) is sum(b[i] << (d - 1 - i)), accumulated as
// h = (h << 1) + b. Sliding one byte right removes b[0] * 2^(d-1) and shifts
// in the next byte. All arithmetic wraps: only the low bits reach the bucket
// index, so overflow is expected.

use std::io;

use crate::source::{ByteSource, byte_in_bounds};

/// Hash of a complete window.
#[inline]
pub fn window_hash(window: &[u8]) -> u32 {
    window
        .iter()
        .fold(0u32, |h, &b| (h << 1).wrapping_add(b as u32))
}

/// Slide a window hash one byte to the right.
///
/// `outgoing` is the first byte of the old window, `incoming` the last byte
/// of the new one, `power_d` is `2^(d-1)`.
#[inline(always)]
pub fn roll(old: u32, outgoing: u8, incoming: u8, power_d: u32) -> u32 {
    (old.wrapping_sub((outgoing as u32).wrapping_mul(power_d)) << 1).wrapping_add(incoming as u32)
}

/// Rolling footprint state for one stream.
///
/// Hashing position `pos` right after `pos - 1` costs two byte reads;
/// any other jump recomputes the window from scratch.
#[derive(Debug, Clone, Default)]
pub struct Footprint {
    hash: u32,
    last_pos: Option<u64>,
}

impl Footprint {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hash of the `len`-byte window at `pos` in `src`.
    ///
    /// The caller guarantees `pos + len <= src.len()`.
    pub fn hash_at<S: ByteSource + ?Sized>(
        &mut self,
        src: &mut S,
        pos: u64,
        len: u32,
        power_d: u32,
    ) -> io::Result<u32> {
        let hash = match self.last_pos {
            Some(last) if pos == last + 1 => {
                let outgoing = byte_in_bounds(src, last)?;
                let incoming = byte_in_bounds(src, pos + len as u64 - 1)?;
                roll(self.hash, outgoing, incoming, power_d)
            }
            Some(last) if pos == last => self.hash,
            _ => {
                let mut h = 0u32;
                for i in 0..len as u64 {
                    h = (h << 1).wrapping_add(byte_in_bounds(src, pos + i)? as u32);
                }
                h
            }
        };
        self.hash = hash;
        self.last_pos = Some(pos);
        Ok(hash)
    }
}
