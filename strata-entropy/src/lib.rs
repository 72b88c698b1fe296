//! Entropy coding backend shared by Strata's block transforms.
//!
//! [`range_coder`] is the primitive: a carry-propagating binary range
//! coder over 64-bit bounds. [`byte_coder`] wraps it in a bit tree to
//! code whole bytes under order-0 (`ANS0`) or order-1 (`ANS1`) context,
//! the two entropy modes the `Context` "entropy" key names.
//!
//! ROLZ2 drives [`range_coder`] directly for its embedded match/literal
//! coder; ROLZ1 and the BWT pipeline drive [`byte_coder`] for their
//! output streams.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod byte_coder;
pub mod range_coder;

pub use byte_coder::{ByteCoder, Order};
pub use range_coder::{ADAPT, PSCALE, RangeDecoder, RangeEncoder};
