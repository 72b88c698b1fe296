//! # Strata Core
//!
//! Shared foundation for the Strata block-transform compression engine.
//!
//! This crate provides the fundamentals every codec crate in the
//! workspace builds on:
//!
//! - [`bitstream`]: bit-level I/O with byte-aligned close and a
//!   bit-position tell, used by the entropy coder and by BWTBlockCodec's
//!   header framing.
//! - [`transform`]: the [`transform::BlockTransform`] contract
//!   (`forward`/`inverse`/`max_encoded_len`) and its
//!   [`transform::TransformOutcome`] (applied vs. declined).
//! - [`context`]: the pipeline [`context::Context`] object each
//!   transform reads its configuration from.
//! - [`limits`]: block-size bounds and the BWT chunk-count rule shared
//!   by the engine and its tests.
//! - [`error`]: the crate-wide error type.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ Pipeline (out of scope)                                 │
//! │     block I/O, container format, CLI                    │
//! ├─────────────────────────────────────────────────────────┤
//! │ Transforms                                               │
//! │     strata-bwt, strata-rolz, strata-filters              │
//! ├─────────────────────────────────────────────────────────┤
//! │ Entropy coding                                            │
//! │     strata-entropy                                       │
//! ├─────────────────────────────────────────────────────────┤
//! │ strata-core (this crate)                                 │
//! │     BlockTransform, Context, BitReader/BitWriter, errors │
//! └─────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod bitstream;
pub mod context;
pub mod error;
pub mod limits;
pub mod transform;

pub use bitstream::{BitReader, BitWriter};
pub use context::{Context, DataType};
pub use error::{Result, StrataError};
pub use limits::{MAX_BLOCK_SIZE, MIN_BLOCK_SIZE, bwt_chunk_count};
pub use transform::{BlockTransform, TransformOutcome};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::bitstream::{BitReader, BitWriter};
    pub use crate::context::{Context, DataType};
    pub use crate::error::{Result, StrataError};
    pub use crate::transform::{BlockTransform, TransformOutcome};
}
