//! ROLZ2: the same match engine as [`crate::rolz1`], but literals and
//! matches are coded as a single 9-bit symbol stream through one
//! embedded binary arithmetic coder instead of four separate
//! entropy-coded buffers. One continuous range-coder instance spans
//! the whole block; only the match table resets per chunk.

use strata_core::error::{Result, StrataError};
use strata_core::limits::{MAX_BLOCK_SIZE, MIN_BLOCK_SIZE};
use strata_core::transform::{BlockTransform, TransformOutcome};
use strata_entropy::range_coder::{PROB_INIT, RangeDecoder, RangeEncoder};

use crate::match_engine::{LOG_POS_CHECKS, MIN_MATCH, MatchEngine};
use crate::rolz1::CHUNK_SIZE;

const COMPONENT: &str = "rolz2";

const LITERAL_FLAG: u32 = 0;
const MATCH_FLAG: u32 = 1;

/// Depth of the symbol tree: 1 flag bit + 8 value bits.
const TREE_NODES: usize = 1 << 10;

/// One 9-bit bit-tree of adaptive probabilities per context row, rows
/// indexed by the previously decoded byte (`setContext` in the spec
/// text).
struct SymbolModel {
    trees: Vec<[u16; TREE_NODES]>,
}

impl SymbolModel {
    fn new() -> Self {
        Self {
            trees: vec![[PROB_INIT; TREE_NODES]; 256],
        }
    }

    fn encode(&mut self, enc: &mut RangeEncoder, context: u8, is_match: bool, value: u8) {
        let tree = &mut self.trees[context as usize];
        let mut node = 1usize;
        let flag_bit = is_match as u32;
        enc.encode_bit(&mut tree[node], flag_bit);
        node = (node << 1) | flag_bit as usize;
        for i in (0..8).rev() {
            let bit = ((value >> i) & 1) as u32;
            enc.encode_bit(&mut tree[node], bit);
            node = (node << 1) | bit as usize;
        }
    }

    fn decode(&mut self, dec: &mut RangeDecoder, context: u8) -> (bool, u8) {
        let tree = &mut self.trees[context as usize];
        let mut node = 1usize;
        let flag_bit = dec.decode_bit(&mut tree[node]);
        node = (node << 1) | flag_bit as usize;
        for _ in 0..8 {
            let bit = dec.decode_bit(&mut tree[node]);
            node = (node << 1) | bit as usize;
        }
        (flag_bit == MATCH_FLAG, (node & 0xFF) as u8)
    }
}

fn chunk_bounds(n: usize) -> Vec<(usize, usize)> {
    let mut bounds = Vec::new();
    let mut start = 0;
    while start < n {
        let end = (start + CHUNK_SIZE).min(n);
        bounds.push((start, end));
        start = end;
    }
    bounds
}

/// The ROLZ2 block transform.
#[derive(Debug, Default)]
pub struct Rolz2Codec {
    engine: MatchEngine,
}

impl Rolz2Codec {
    /// Create a codec with a fresh (empty) match table.
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlockTransform for Rolz2Codec {
    fn max_encoded_len(&self, n: usize) -> usize {
        n + n / 4 + 4096
    }

    fn forward(&mut self, input: &[u8], output: &mut [u8], n: usize) -> Result<TransformOutcome> {
        if n < MIN_BLOCK_SIZE {
            return Err(StrataError::invalid_argument(
                "ROLZ block smaller than MIN_BLOCK_SIZE",
            ));
        }
        if n > MAX_BLOCK_SIZE {
            return Err(StrataError::invalid_argument(
                "ROLZ block larger than MAX_BLOCK_SIZE",
            ));
        }

        let mut model = SymbolModel::new();
        let mut enc = RangeEncoder::new();

        for (start, end) in chunk_bounds(n) {
            self.engine.reset();
            let mut pos = start;

            while pos < end {
                let context = if pos == 0 { 0 } else { input[pos - 1] };
                let is_prefix = pos < start + 2;

                let found = if !is_prefix && pos + MIN_MATCH <= end {
                    self.engine.find(input, pos, end)
                } else {
                    None
                };

                match found {
                    Some(m) => {
                        model.encode(&mut enc, context, true, (m.len - MIN_MATCH) as u8);
                        enc.encode_direct_bits(m.distance as u32, LOG_POS_CHECKS);
                        pos += m.len;
                    }
                    None => {
                        model.encode(&mut enc, context, false, input[pos]);
                        if !is_prefix {
                            self.engine.register(input, pos);
                        }
                        pos += 1;
                    }
                }
            }
        }

        let payload = enc.finish();
        let total = 4 + payload.len();
        if total > output.len() {
            tracing::debug!(
                component = COMPONENT,
                n,
                produced = total,
                "declining: encoded block larger than the output buffer"
            );
            return Ok(TransformOutcome::Declined { consumed: 0 });
        }
        output[..4].copy_from_slice(&(n as u32).to_be_bytes());
        output[4..total].copy_from_slice(&payload);

        Ok(TransformOutcome::Applied {
            consumed: n,
            produced: total,
        })
    }

    fn inverse(&mut self, input: &[u8], output: &mut [u8], n: usize) -> Result<TransformOutcome> {
        if n < 4 {
            return Err(StrataError::corrupted(
                "rolz2_decode",
                0,
                "input too short for the length prologue",
            ));
        }
        let uncompressed_len = u32::from_be_bytes(input[0..4].try_into().unwrap()) as usize;
        if output.len() < uncompressed_len {
            return Err(StrataError::invalid_argument(
                "output buffer smaller than the recorded uncompressed length",
            ));
        }

        let mut model = SymbolModel::new();
        let mut dec = RangeDecoder::new(&input[4..n]);

        for (start, end) in chunk_bounds(uncompressed_len) {
            self.engine.reset();
            let mut pos = start;
            let mut symbol_idx = 0usize;

            while pos < end {
                let context = if pos == 0 { 0 } else { output[pos - 1] };
                let (is_match, value) = model.decode(&mut dec, context);

                if symbol_idx < 2 && is_match {
                    return Err(StrataError::corrupted(
                        "rolz2_decode",
                        pos,
                        "first two symbols of a chunk must be literals",
                    ));
                }

                if is_match {
                    let match_len = value as usize + MIN_MATCH;
                    let distance = dec.decode_direct_bits(LOG_POS_CHECKS) as usize;
                    if pos + match_len > end {
                        return Err(StrataError::corrupted(
                            "rolz2_decode",
                            pos,
                            "match copy would overrun the chunk",
                        ));
                    }
                    let reference = self.engine.reference_at(output, pos, distance);
                    for k in 0..match_len {
                        output[pos + k] = output[reference + k];
                    }
                    pos += match_len;
                } else {
                    output[pos] = value;
                    if symbol_idx >= 2 {
                        self.engine.register(output, pos);
                    }
                    pos += 1;
                }
                symbol_idx += 1;
            }
        }

        Ok(TransformOutcome::Applied {
            consumed: n,
            produced: uncompressed_len,
        })
    }
}
