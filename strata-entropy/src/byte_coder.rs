//! Byte-oriented adaptive entropy coder (`ANS0` order-0, `ANS1` order-1)
//! built on [`crate::range_coder`]'s binary coder via a bit tree, one
//! probability per tree node, mirroring how a real LZMA literal coder
//! drives its bit-tree from a single binary range coder.

use crate::range_coder::{PROB_INIT, RangeDecoder, RangeEncoder};

/// Coding order: how much preceding context conditions each byte's
/// probability tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    /// One shared tree for every byte (`ANS0`).
    Zero,
    /// One tree per possible previous byte, 256 trees total (`ANS1`).
    One,
}

impl Order {
    fn context_count(self) -> usize {
        match self {
            Order::Zero => 1,
            Order::One => 256,
        }
    }
}

/// One 255-node bit tree per context, each node an adaptive probability.
/// Node `i` (1..=255) covers bit `7 - floor(log2(i))` of the byte, the
/// same indexing a binary literal tree uses: start at node 1, before
/// each bit `node = node*2 + bit`.
pub struct ByteCoder {
    order: Order,
    trees: Vec<[u16; 256]>,
    /// Most recently coded byte, used as context under [`Order::One`].
    last_byte: u8,
}

impl ByteCoder {
    /// Create a coder with all probabilities at 50%.
    pub fn new(order: Order) -> Self {
        Self {
            order,
            trees: vec![[PROB_INIT; 256]; order.context_count()],
            last_byte: 0,
        }
    }

    /// Reset adaptive state (but not `order`) to the initial distribution.
    pub fn reset(&mut self) {
        for tree in &mut self.trees {
            *tree = [PROB_INIT; 256];
        }
        self.last_byte = 0;
    }

    fn context(&self) -> usize {
        match self.order {
            Order::Zero => 0,
            Order::One => self.last_byte as usize,
        }
    }

    /// Encode one byte, advancing the context for [`Order::One`].
    pub fn encode_byte(&mut self, enc: &mut RangeEncoder, byte: u8) {
        let tree = &mut self.trees[self.context()];
        let mut node: usize = 1;
        for i in (0..8).rev() {
            let bit = ((byte >> i) & 1) as u32;
            enc.encode_bit(&mut tree[node], bit);
            node = (node << 1) | bit as usize;
        }
        self.last_byte = byte;
    }

    /// Decode one byte, advancing the context for [`Order::One`].
    pub fn decode_byte(&mut self, dec: &mut RangeDecoder) -> u8 {
        let tree = &mut self.trees[self.context()];
        let mut node: usize = 1;
        for _ in 0..8 {
            let bit = dec.decode_bit(&mut tree[node]);
            node = (node << 1) | bit as usize;
        }
        let byte = (node & 0xFF) as u8;
        self.last_byte = byte;
        byte
    }

    /// Encode a whole buffer into a freshly allocated byte stream. This
    /// is the entropy-coder contract's `encode`: callers needing
    /// streaming output should drive [`Self::encode_byte`] directly.
    pub fn encode(&mut self, data: &[u8]) -> Vec<u8> {
        self.reset();
        let mut enc = RangeEncoder::new();
        for &byte in data {
            self.encode_byte(&mut enc, byte);
        }
        enc.finish()
    }

    /// Decode exactly `len` bytes from a stream produced by
    /// [`Self::encode`] (the entropy-coder contract's `decode`).
    pub fn decode(&mut self, bytes: &[u8], len: usize) -> Vec<u8> {
        self.reset();
        let mut dec = RangeDecoder::new(bytes);
        let mut out = Vec::with_capacity(len);
        for _ in 0..len {
            out.push(self.decode_byte(&mut dec));
        }
        out
    }
}
