//! The Burrows-Wheeler block transform: `BwtBlockCodec` frames a
//! variable-width primary-index header around the permuted block; the
//! BWT engine underneath runs a suffix-array forward pass and picks
//! between two inverse strategies by block size.
//!
//! ```text
//! BwtBlockCodec::forward
//!     -> suffix_array::compute_bwt   (suffix-array oracle)
//!     -> header framing              (codec.rs)
//!
//! BwtBlockCodec::inverse
//!     -> header framing              (codec.rs)
//!     -> inverse::merge_tpsi | bi_psi_v2   (size-selected)
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
pub mod inverse;
pub mod suffix_array;

pub use codec::BwtBlockCodec;

/// Maximum number of chunks a block is ever divided into for BWT
/// inverse parallelism.
pub const MAX_CHUNKS: usize = 8;
