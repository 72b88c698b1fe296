//! UTF-8 alias-remapping: detects UTF-8 text, ranks its distinct code
//! points by descending frequency, and replaces each occurrence with a
//! 1- or 2-byte alias equal to its rank. Declines unless the result is
//! at least 10% smaller than the input.
//!
//! Layout of an encoded block:
//!
//! ```text
//! byte 0:       start    — length of the literal lead-in (0..=4)
//! byte 1:       adjust   — signed i8, how far the last packed code
//!                          point's bytes reached past `count - 4`
//! bytes 2..4:   n         — number of distinct symbols, big-endian u16
//! bytes 4..:    n * 3-byte packed symbols, in descending-frequency
//!               (i.e. rank/alias) order
//! then:         `start` literal lead-in bytes
//! then:         one alias per code point (1 byte if rank < 128, else
//!               2 bytes: low byte `(rank & 0x7F) | 0x80`, high byte
//!               `rank >> 7`)
//! then:         the trailing literal bytes (`count - consumed`, where
//!               `consumed` is the lead-in plus every packed code
//!               point's byte length)
//! ```

use std::collections::HashMap;

use strata_core::error::{Result, StrataError};
use strata_core::transform::{BlockTransform, TransformOutcome};

const COMPONENT: &str = "utf8_alias_codec";

/// Largest number of distinct code points this codec's 16-bit symbol
/// count can address.
const MAX_SYMBOLS: usize = 32767;

/// Bytes always reserved as a literal tail so the alias stream never
/// has to describe a code point truncated at the block boundary.
const TAIL_RESERVE: usize = 4;

/// Leading bytes examined (and, if not a valid lead byte, skipped
/// literally) to tolerate a block boundary cutting a multi-byte
/// sequence in half.
const MAX_SKIP: usize = 4;

/// Lead-byte classification used both by the validator and by `pack`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LeadClass {
    /// Not a valid UTF-8 lead byte (continuation byte, or one of the
    /// bytes UTF-8 never uses as a lead: `0xC0`, `0xC1`, `0xF5..=0xFF`).
    Invalid,
    Ascii,
    Two,
    Three,
    Four,
}

fn classify_lead(b: u8) -> LeadClass {
    match b {
        0x00..=0x7F => LeadClass::Ascii,
        0xC2..=0xDF => LeadClass::Two,
        0xE0..=0xEF => LeadClass::Three,
        0xF0..=0xF4 => LeadClass::Four,
        _ => LeadClass::Invalid,
    }
}

fn is_continuation(b: u8) -> bool {
    (0x80..=0xBF).contains(&b)
}

/// Decode one code point starting at `buf[pos]`. Returns `(codepoint,
/// byte_len)`. Assumes `buf` has already passed [`looks_like_utf8`];
/// returns `None` only if the sequence runs past the end of `buf`
/// (tolerated — the caller treats it as the literal tail) or the
/// continuation bytes don't match the expected ranges.
fn decode_char(buf: &[u8], pos: usize) -> Option<(u32, usize)> {
    let b0 = buf[pos];
    match classify_lead(b0) {
        LeadClass::Invalid => None,
        LeadClass::Ascii => Some((b0 as u32, 1)),
        LeadClass::Two => {
            let b1 = *buf.get(pos + 1)?;
            if !is_continuation(b1) {
                return None;
            }
            let cp = ((b0 as u32 & 0x1F) << 6) | (b1 as u32 & 0x3F);
            Some((cp, 2))
        }
        LeadClass::Three => {
            let b1 = *buf.get(pos + 1)?;
            let b2 = *buf.get(pos + 2)?;
            let b1_ok = match b0 {
                0xE0 => (0xA0..=0xBF).contains(&b1),
                0xED => (0x80..=0x9F).contains(&b1),
                _ => is_continuation(b1),
            };
            if !b1_ok || !is_continuation(b2) {
                return None;
            }
            let cp = ((b0 as u32 & 0x0F) << 12) | ((b1 as u32 & 0x3F) << 6) | (b2 as u32 & 0x3F);
            Some((cp, 3))
        }
        LeadClass::Four => {
            let b1 = *buf.get(pos + 1)?;
            let b2 = *buf.get(pos + 2)?;
            let b3 = *buf.get(pos + 3)?;
            let b1_ok = match b0 {
                0xF0 => (0x90..=0xBF).contains(&b1),
                0xF4 => (0x80..=0x8F).contains(&b1),
                _ => is_continuation(b1),
            };
            if !b1_ok || !is_continuation(b2) || !is_continuation(b3) {
                return None;
            }
            let cp = ((b0 as u32 & 0x07) << 18)
                | ((b1 as u32 & 0x3F) << 12)
                | ((b2 as u32 & 0x3F) << 6)
                | (b3 as u32 & 0x3F);
            Some((cp, 4))
        }
    }
}

fn encode_char(cp: u32, len: usize, out: &mut [u8]) {
    match len {
        1 => out[0] = cp as u8,
        2 => {
            out[0] = 0xC0 | ((cp >> 6) as u8);
            out[1] = 0x80 | ((cp & 0x3F) as u8);
        }
        3 => {
            out[0] = 0xE0 | ((cp >> 12) as u8);
            out[1] = 0x80 | (((cp >> 6) & 0x3F) as u8);
            out[2] = 0x80 | ((cp & 0x3F) as u8);
        }
        4 => {
            out[0] = 0xF0 | ((cp >> 18) as u8);
            out[1] = 0x80 | (((cp >> 12) & 0x3F) as u8);
            out[2] = 0x80 | (((cp >> 6) & 0x3F) as u8);
            out[3] = 0x80 | ((cp & 0x3F) as u8);
        }
        _ => unreachable!("UTF-8 sequences are 1..=4 bytes"),
    }
}

/// Pack a decoded `(codepoint, byte_len)` pair into a 23-bit value: a
/// 2-bit length tag (`len - 1`) in the top bits, the codepoint in the
/// low 21. `unpack` is its exact inverse.
fn pack(cp: u32, len: usize) -> u32 {
    debug_assert!((1..=4).contains(&len));
    (((len - 1) as u32) << 21) | (cp & 0x1F_FFFF)
}

fn unpack(packed: u32) -> (u32, usize) {
    let len = ((packed >> 21) & 0x3) as usize + 1;
    (packed & 0x1F_FFFF, len)
}

/// Histogram-based validator: rejects forbidden lead bytes and
/// forbidden continuations for the overlong/surrogate-adjacent ranges,
/// and requires at least a quarter of all bytes to be continuation
/// bytes (plain ASCII text would otherwise "validate" as degenerate
/// single-byte UTF-8 and never pay for itself).
fn looks_like_utf8(buf: &[u8]) -> bool {
    if buf.len() < TAIL_RESERVE + 8 {
        return false;
    }
    let continuations = buf.iter().filter(|&&b| is_continuation(b)).count();
    if continuations * 4 < buf.len() {
        return false;
    }

    let skip = leading_skip(buf);
    let mut pos = skip;
    while pos < buf.len() {
        match decode_char(buf, pos) {
            Some((_, len)) => pos += len,
            None => {
                if pos + MAX_SKIP >= buf.len() {
                    // Tolerate a sequence truncated by the block
                    // boundary; the forward pass's trailing literal
                    // bytes absorb it.
                    break;
                }
                return false;
            }
        }
    }
    true
}

/// Number of leading bytes (at most [`MAX_SKIP`]) that are not a valid
/// UTF-8 lead byte, tolerating a block boundary that split a sequence
/// started in the previous block.
fn leading_skip(buf: &[u8]) -> usize {
    let mut skip = 0;
    while skip < MAX_SKIP.min(buf.len()) && classify_lead(buf[skip]) == LeadClass::Invalid {
        skip += 1;
    }
    skip
}

struct ParsedBlock {
    skip: usize,
    /// `(packed_codepoint, byte_len)` for every code point between the
    /// lead-in and the literal tail.
    chars: Vec<(u32, usize)>,
    consumed: usize,
}

fn parse_block(buf: &[u8]) -> ParsedBlock {
    let skip = leading_skip(buf);
    let tail_start = buf.len().saturating_sub(TAIL_RESERVE).max(skip);

    let mut pos = skip;
    let mut chars = Vec::new();
    while pos < tail_start {
        match decode_char(buf, pos) {
            Some((cp, len)) => {
                chars.push((pack(cp, len), len));
                pos += len;
            }
            None => break,
        }
    }
    ParsedBlock {
        skip,
        chars,
        consumed: pos,
    }
}

/// Frequency-ranked alias codec for UTF-8 text blocks.
#[derive(Debug, Default)]
pub struct Utf8AliasCodec {
    freq_scratch: HashMap<u32, u32>,
}

impl Utf8AliasCodec {
    /// Create a codec with no scratch allocated yet.
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlockTransform for Utf8AliasCodec {
    fn max_encoded_len(&self, n: usize) -> usize {
        // Header (4) + worst-case symbol table (3 bytes * MAX_SYMBOLS)
        // + up to 2 bytes of alias per input byte + the literal lead-in
        // and tail.
        4 + 3 * MAX_SYMBOLS + 2 * n + 2 * MAX_SKIP
    }

    fn forward(&mut self, input: &[u8], output: &mut [u8], n: usize) -> Result<TransformOutcome> {
        let src = &input[..n];
        if !looks_like_utf8(src) {
            tracing::debug!(component = COMPONENT, n, "declining: not UTF-8-shaped");
            return Ok(TransformOutcome::Declined { consumed: 0 });
        }

        let parsed = parse_block(src);

        self.freq_scratch.clear();
        for &(packed, _) in &parsed.chars {
            *self.freq_scratch.entry(packed).or_insert(0) += 1;
        }
        if self.freq_scratch.len() > MAX_SYMBOLS {
            tracing::debug!(
                component = COMPONENT,
                distinct = self.freq_scratch.len(),
                "declining: too many distinct code points"
            );
            return Ok(TransformOutcome::Declined { consumed: 0 });
        }

        let mut symbols: Vec<(u32, u32)> = self.freq_scratch.iter().map(|(&k, &v)| (k, v)).collect();
        symbols.sort_unstable_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        let mut rank_of: HashMap<u32, u16> = HashMap::with_capacity(symbols.len());
        for (rank, &(packed, _)) in symbols.iter().enumerate() {
            rank_of.insert(packed, rank as u16);
        }

        let tail_len = src.len() - parsed.consumed;
        let adjust = parsed.consumed as i64 - (src.len() as i64 - TAIL_RESERVE as i64);

        let header_len = 4 + 3 * symbols.len();
        let required = header_len + parsed.skip + 2 * parsed.chars.len() + tail_len;
        if output.len() < required {
            return Err(StrataError::invalid_argument(
                "output buffer smaller than max_encoded_len(n)",
            ));
        }

        let mut w = 0usize;
        output[w] = parsed.skip as u8;
        w += 1;
        output[w] = adjust as i8 as u8;
        w += 1;
        output[w..w + 2].copy_from_slice(&(symbols.len() as u16).to_be_bytes());
        w += 2;
        for &(packed, _) in &symbols {
            output[w] = (packed >> 16) as u8;
            output[w + 1] = (packed >> 8) as u8;
            output[w + 2] = packed as u8;
            w += 3;
        }

        output[w..w + parsed.skip].copy_from_slice(&src[..parsed.skip]);
        w += parsed.skip;

        for &(packed, _) in &parsed.chars {
            let alias = rank_of[&packed];
            if alias < 128 {
                output[w] = alias as u8;
                w += 1;
            } else {
                output[w] = ((alias & 0x7F) as u8) | 0x80;
                output[w + 1] = (alias >> 7) as u8;
                w += 2;
            }
        }

        output[w..w + tail_len].copy_from_slice(&src[parsed.consumed..]);
        w += tail_len;

        if w * 10 > n * 9 {
            tracing::debug!(
                component = COMPONENT,
                n,
                produced = w,
                "declining: under the 10% size-reduction floor"
            );
            return Ok(TransformOutcome::Declined { consumed: 0 });
        }

        Ok(TransformOutcome::Applied {
            consumed: n,
            produced: w,
        })
    }

    fn inverse(&mut self, input: &[u8], output: &mut [u8], n: usize) -> Result<TransformOutcome> {
        let src = &input[..n];
        if src.len() < 4 {
            return Err(StrataError::corrupted(
                COMPONENT,
                0,
                "input too short for a header",
            ));
        }
        let start = src[0] as usize;
        let adjust = src[1] as i8 as i64;
        let symbol_count = u16::from_be_bytes([src[2], src[3]]) as usize;
        if symbol_count >= 32768 {
            return Err(StrataError::corrupted(
                COMPONENT,
                2,
                "symbol count at or above 32768",
            ));
        }
        if 3 * symbol_count >= n {
            return Err(StrataError::corrupted(
                COMPONENT,
                2,
                "symbol table larger than the encoded block",
            ));
        }

        let mut r = 4usize;
        let mut table: Vec<(u32, usize)> = Vec::with_capacity(symbol_count);
        for _ in 0..symbol_count {
            let packed = ((src[r] as u32) << 16) | ((src[r + 1] as u32) << 8) | src[r + 2] as u32;
            table.push(unpack(packed));
            r += 3;
        }

        if r + start > n {
            return Err(StrataError::corrupted(COMPONENT, r, "lead-in runs past input"));
        }
        if output.len() < start {
            return Err(StrataError::invalid_argument("output buffer too small"));
        }
        output[..start].copy_from_slice(&src[r..r + start]);
        let mut w = start;
        r += start;

        let tail_len = (TAIL_RESERVE as i64 - adjust) as usize;
        if n < tail_len || r > n - tail_len {
            return Err(StrataError::corrupted(
                COMPONENT,
                r,
                "tail length inconsistent with adjust field",
            ));
        }
        let alias_end = n - tail_len;

        while r < alias_end {
            let b0 = src[r];
            let (alias, consumed): (u16, usize) = if b0 & 0x80 == 0 {
                (b0 as u16, 1)
            } else {
                let b1 = *src.get(r + 1).ok_or_else(|| {
                    StrataError::corrupted(COMPONENT, r, "truncated two-byte alias")
                })?;
                (((b0 & 0x7F) as u16) | ((b1 as u16) << 7), 2)
            };
            r += consumed;

            let &(cp, len) = table.get(alias as usize).ok_or_else(|| {
                StrataError::corrupted(COMPONENT, r, "alias out of range of the symbol table")
            })?;
            if output.len() < w + len {
                return Err(StrataError::invalid_argument("output buffer too small"));
            }
            encode_char(cp, len, &mut output[w..w + len]);
            w += len;
        }
        if r != alias_end {
            return Err(StrataError::corrupted(
                COMPONENT,
                r,
                "alias stream did not end exactly at the literal tail",
            ));
        }

        if output.len() < w + tail_len {
            return Err(StrataError::invalid_argument("output buffer too small"));
        }
        output[w..w + tail_len].copy_from_slice(&src[alias_end..n]);
        w += tail_len;

        Ok(TransformOutcome::Applied {
            consumed: n,
            produced: w,
        })
    }
}
