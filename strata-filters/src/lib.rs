//! Byte-level filters that share the block-transform harness with
//! `strata-bwt` and `strata-rolz` but carry no entropy coding of their
//! own: [`utf8`]'s frequency-ranked code-point aliasing, and [`exe`]'s
//! relative-to-absolute branch-target rewrite for ELF/PE/Mach-O code.
//!
//! ```text
//! Utf8AliasCodec::forward  -> validate -> rank code points -> alias stream
//! ExeFilter::forward       -> detect header/heuristic -> rewrite branches
//! ```
//!
//! Both decline rather than error when they can't improve the block
//! (non-UTF-8 input, too few branch instructions, insufficient size
//! reduction) per the `Decline` outcome in `strata_core::transform`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod exe;
pub mod utf8;

pub use exe::ExeFilter;
pub use utf8::Utf8AliasCodec;
