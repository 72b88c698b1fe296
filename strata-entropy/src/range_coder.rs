//! A carry-propagating binary range coder over 64-bit `low`/`high`
//! bounds, shared by ROLZ2's embedded arithmetic coder and the
//! byte-oriented `ANS0`/`ANS1` coder ROLZ1 drives through the
//! entropy-coder contract.
//!
//! # Mechanism
//!
//! Unlike LZMA's single-`range`-plus-`low` coder (which folds the upper
//! bound into a shrinking `range`), this coder tracks `low` and `high`
//! explicitly as 64-bit values. Renormalization emits a byte whenever
//! the top byte of `low` and `high` agree (`(low ^ high) >> 56 == 0`),
//! at which point that shared byte can never change again regardless of
//! future bits.

/// Probability scale: probabilities are integers in `[0, PSCALE]`.
pub const PSCALE: u32 = 1 << 16;

/// Initial probability (50%).
pub const PROB_INIT: u16 = (PSCALE / 2) as u16;

/// Default probability-update shift. Smaller adapts faster.
pub const ADAPT: u32 = 6;

/// Update `prob` after observing `bit`, using the spec's symmetric rule:
/// `p += (PSCALE - p) >> ADAPT` on a 0 bit, `p -= p >> ADAPT` on a 1 bit.
#[inline]
pub fn adapt(prob: &mut u16, bit: u32, shift: u32) {
    if bit == 0 {
        *prob = (*prob as u32 + ((PSCALE - *prob as u32) >> shift)) as u16;
    } else {
        *prob = (*prob as u32 - (*prob as u32 >> shift)) as u16;
    }
}

/// Range encoder writing to an owned output buffer.
#[derive(Debug)]
pub struct RangeEncoder {
    low: u64,
    high: u64,
    out: Vec<u8>,
}

impl RangeEncoder {
    /// Create a new encoder with an empty output buffer.
    pub fn new() -> Self {
        Self {
            low: 0,
            high: u64::MAX,
            out: Vec::new(),
        }
    }

    /// Encode one bit under probability `prob` (probability of a `0`
    /// bit, in `[0, PSCALE]`), then adapt `prob` toward the bit seen.
    #[inline]
    pub fn encode_bit(&mut self, prob: &mut u16, bit: u32) {
        let range = self.high - self.low;
        let mid = self.low + (range >> 16) * (*prob as u64);

        if bit == 0 {
            self.high = mid;
        } else {
            self.low = mid + 1;
        }

        adapt(prob, bit, ADAPT);
        self.normalize();
    }

    /// Encode `count` raw (uncoded, 50%-probability) bits of `value`,
    /// most-significant bit first. Used for ROLZ2's ring-distance field.
    pub fn encode_direct_bits(&mut self, value: u32, count: u32) {
        for i in (0..count).rev() {
            let bit = (value >> i) & 1;
            let mid = self.low + ((self.high - self.low) >> 1);
            if bit == 0 {
                self.high = mid;
            } else {
                self.low = mid + 1;
            }
            self.normalize();
        }
    }

    #[inline]
    fn normalize(&mut self) {
        while (self.low ^ self.high) >> 56 == 0 {
            self.out.push((self.low >> 56) as u8);
            self.low <<= 8;
            self.high = (self.high << 8) | 0xFF;
        }
    }

    /// Flush the remaining 8 bytes of `low` and return the encoded
    /// bytes, consuming the encoder (the spec's `dispose`).
    pub fn finish(mut self) -> Vec<u8> {
        for i in (0..8).rev() {
            self.out.push((self.low >> (i * 8)) as u8);
        }
        self.out
    }

    /// Bytes written so far (including pending flush bytes is not
    /// counted; call [`Self::finish`] for the final size).
    pub fn len(&self) -> usize {
        self.out.len()
    }

    /// True if nothing has been flushed yet.
    pub fn is_empty(&self) -> bool {
        self.out.is_empty()
    }
}

impl Default for RangeEncoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Range decoder reading from a borrowed input buffer.
#[derive(Debug)]
pub struct RangeDecoder<'a> {
    low: u64,
    high: u64,
    code: u64,
    input: &'a [u8],
    pos: usize,
}

impl<'a> RangeDecoder<'a> {
    /// Create a decoder over `input`, priming `code` from its first 8
    /// bytes (mirroring [`RangeEncoder::finish`]'s flush).
    pub fn new(input: &'a [u8]) -> Self {
        let mut code = 0u64;
        let mut pos = 0;
        for _ in 0..8 {
            code = (code << 8) | Self::next_byte(input, &mut pos) as u64;
        }
        Self {
            low: 0,
            high: u64::MAX,
            code,
            input,
            pos,
        }
    }

    #[inline]
    fn next_byte(input: &[u8], pos: &mut usize) -> u8 {
        let b = input.get(*pos).copied().unwrap_or(0);
        *pos += 1;
        b
    }

    /// Decode one bit under probability `prob`, adapting it in lockstep
    /// with the encoder.
    #[inline]
    pub fn decode_bit(&mut self, prob: &mut u16) -> u32 {
        let range = self.high - self.low;
        let mid = self.low + (range >> 16) * (*prob as u64);

        let bit = if self.code <= mid {
            self.high = mid;
            0
        } else {
            self.low = mid + 1;
            1
        };

        adapt(prob, bit, ADAPT);
        self.normalize();
        bit
    }

    /// Decode `count` raw 50%-probability bits, most-significant first.
    pub fn decode_direct_bits(&mut self, count: u32) -> u32 {
        let mut result = 0u32;
        for _ in 0..count {
            let mid = self.low + ((self.high - self.low) >> 1);
            let bit = if self.code <= mid {
                self.high = mid;
                0
            } else {
                self.low = mid + 1;
                1
            };
            result = (result << 1) | bit;
            self.normalize();
        }
        result
    }

    #[inline]
    fn normalize(&mut self) {
        while (self.low ^ self.high) >> 56 == 0 {
            self.low <<= 8;
            self.high = (self.high << 8) | 0xFF;
            self.code = (self.code << 8) | Self::next_byte(self.input, &mut self.pos) as u64;
        }
    }

    /// Number of input bytes consumed so far.
    pub fn bytes_consumed(&self) -> usize {
        self.pos.min(self.input.len())
    }
}
