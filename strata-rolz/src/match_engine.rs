//! The rolling-context match engine shared by `Rolz1Codec` and
//! `Rolz2Codec`: a 16-bit key (hash of the two preceding bytes) indexes
//! a small ring of recently seen positions, each carrying an 8-bit
//! content-hash check so a lookup can reject most candidates without
//! touching `buf` at all.

/// Shortest match length either codec will emit as a match token.
pub const MIN_MATCH: usize = 3;

/// Longest match length representable in either codec's 8-bit length
/// field (`255 + MIN_MATCH`).
pub const MAX_MATCH: usize = 255 + MIN_MATCH;

/// `log2` of the ring size searched per key.
pub const LOG_POS_CHECKS: u32 = 5;

/// Number of recent registrations tracked per key.
pub const POS_CHECKS: usize = 1 << LOG_POS_CHECKS;

const MASK_CHECKS: usize = POS_CHECKS - 1;

/// Number of distinct 2-byte contexts (every value of the 16-bit key).
const KEY_SPACE: usize = 1 << 16;

const EMPTY_SLOT: u32 = u32::MAX;

/// A match candidate returned by [`MatchEngine::find`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    /// Offset the match copies from.
    pub reference: usize,
    /// Length of the match, in `[MIN_MATCH, MAX_MATCH]`.
    pub len: usize,
    /// Ring-index offset from the current counter, in `[0, POS_CHECKS)`.
    pub distance: usize,
}

/// The two-byte-context match table. Registration and lookup are
/// explicitly separate: callers decide whether a scanned position
/// should be registered (see `strata-rolz`'s codecs, which register
/// only positions that end up emitted as literals, keeping an
/// encoder's and a decoder's tables identical by construction).
pub struct MatchEngine {
    slots: Vec<u32>,
    counters: Vec<u8>,
}

impl MatchEngine {
    /// Create an engine with an empty table.
    pub fn new() -> Self {
        Self {
            slots: vec![EMPTY_SLOT; KEY_SPACE * POS_CHECKS],
            counters: vec![0u8; KEY_SPACE],
        }
    }

    /// Clear all registrations without reallocating, for reuse across
    /// independently-decodable chunks.
    pub fn reset(&mut self) {
        self.slots.fill(EMPTY_SLOT);
        self.counters.fill(0);
    }

    /// 16-bit context key: the two bytes immediately preceding `pos`.
    /// Every distinct 2-byte context maps to its own key, so this is a
    /// perfect hash rather than an approximate one.
    #[inline]
    pub fn key(buf: &[u8], pos: usize) -> u16 {
        debug_assert!(pos >= 2);
        ((buf[pos - 2] as u16) << 8) | buf[pos - 1] as u16
    }

    /// 8-bit verification hash of the 3 bytes starting at `pos`, used
    /// to reject most ring candidates before a byte-level compare.
    #[inline]
    fn content_hash(buf: &[u8], pos: usize) -> u8 {
        let a = buf[pos] as u32;
        let b = *buf.get(pos + 1).unwrap_or(&0) as u32;
        let c = *buf.get(pos + 2).unwrap_or(&0) as u32;
        let v = a | (b << 8) | (c << 16);
        (v.wrapping_mul(2_654_435_761) >> 24) as u8
    }

    /// Look up the best match for `buf[pos..end]` without registering
    /// `pos`. Returns `None` if nothing reaches [`MIN_MATCH`].
    pub fn find(&self, buf: &[u8], pos: usize, end: usize) -> Option<Match> {
        let key = Self::key(buf, pos) as usize;
        let top8 = Self::content_hash(buf, pos);
        let cursor = self.counters[key] as usize;
        let max_len = MAX_MATCH.min(end - pos);

        let mut best: Option<Match> = None;

        for d in 0..POS_CHECKS {
            let ring_idx = cursor.wrapping_sub(d) & MASK_CHECKS;
            let slot = self.slots[key * POS_CHECKS + ring_idx];
            if slot == EMPTY_SLOT {
                continue;
            }
            let stored_top8 = (slot >> 24) as u8;
            if stored_top8 != top8 {
                continue;
            }
            let reference = (slot & 0x00FF_FFFF) as usize;
            if reference >= pos {
                continue;
            }

            if let Some(current_best) = &best {
                let probe = reference + current_best.len;
                if probe >= pos || buf.get(probe) != buf.get(pos + current_best.len) {
                    continue;
                }
            }

            let mut len = 0usize;
            while len < max_len && buf[reference + len] == buf[pos + len] {
                len += 1;
            }

            let better = match &best {
                None => len >= MIN_MATCH,
                Some(b) => len > b.len,
            };
            if better {
                best = Some(Match {
                    reference,
                    len,
                    distance: d,
                });
            }
        }

        best.filter(|m| m.len >= MIN_MATCH)
    }

    /// Read back the position stored at ring-offset `distance` from the
    /// current counter for `pos`'s key, trusting the caller (a decoder
    /// replaying an encoder's token stream) rather than re-verifying
    /// the content hash.
    pub fn reference_at(&self, buf: &[u8], pos: usize, distance: usize) -> usize {
        let key = Self::key(buf, pos) as usize;
        let cursor = self.counters[key] as usize;
        let ring_idx = cursor.wrapping_sub(distance) & MASK_CHECKS;
        (self.slots[key * POS_CHECKS + ring_idx] & 0x00FF_FFFF) as usize
    }

    /// Register `pos` under its 2-byte context key, without performing
    /// a lookup.
    pub fn register(&mut self, buf: &[u8], pos: usize) {
        let key = Self::key(buf, pos) as usize;
        let top8 = Self::content_hash(buf, pos);
        let next = (self.counters[key] as usize + 1) & MASK_CHECKS;
        self.counters[key] = next as u8;
        self.slots[key * POS_CHECKS + next] = ((top8 as u32) << 24) | (pos as u32 & 0x00FF_FFFF);
    }
}

impl Default for MatchEngine {
    fn default() -> Self {
        Self::new()
    }
}
