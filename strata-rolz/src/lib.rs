//! Reduced-Offset Lempel-Ziv match engine and the two ROLZ block
//! codecs built on top of it.
//!
//! ```text
//! MatchEngine (2-byte context, 32-deep position ring)
//!   │
//!   ├── Rolz1Codec  — token/length/literal streams, byte-oriented entropy coder
//!   └── Rolz2Codec  — 9-bit symbol stream, embedded binary range coder
//! ```
//!
//! Both codecs reset the match table every [`rolz1::CHUNK_SIZE`] bytes
//! so a chunk can be decoded without the ones before it, and both
//! register a position in the table only once it has been emitted as
//! a literal, keeping encoder and decoder table state identical by
//! construction.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod match_engine;
pub mod rolz1;
pub mod rolz2;

pub use match_engine::{MAX_MATCH, MIN_MATCH, Match, MatchEngine};
pub use rolz1::Rolz1Codec;
pub use rolz2::Rolz2Codec;
