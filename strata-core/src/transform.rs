//! The block-transform contract shared by every codec in this workspace.
//!
//! A transform is a pure, block-scoped, byte-to-byte function: given an
//! input view and a count, it writes to an output view and reports how
//! many bytes it consumed and produced, or it declines (§7 of the
//! design doc: decline is a successful no-op, not an error). No
//! transform carries state across blocks or across calls beyond the
//! scratch it privately owns.

use crate::error::Result;

/// Result of a single `forward`/`inverse` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformOutcome {
    /// The transform succeeded.
    Applied {
        /// Bytes consumed from the input view.
        consumed: usize,
        /// Bytes written to the output view.
        produced: usize,
    },
    /// The transform declined to run (forward could not beat the input,
    /// not enough matches were found, or the output buffer was too
    /// small). `consumed` reports how many input bytes the caller
    /// should treat as not-transformed so it can bypass this stage.
    Declined {
        /// Bytes of input examined before declining.
        consumed: usize,
    },
}

impl TransformOutcome {
    /// True if this outcome represents a successful application.
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }

    /// True if this outcome represents a decline.
    pub fn is_declined(&self) -> bool {
        matches!(self, Self::Declined { .. })
    }

    /// Bytes consumed from the input view, regardless of outcome.
    pub fn consumed(&self) -> usize {
        match *self {
            Self::Applied { consumed, .. } => consumed,
            Self::Declined { consumed } => consumed,
        }
    }

    /// Bytes produced in the output view, or zero if declined.
    pub fn produced(&self) -> usize {
        match *self {
            Self::Applied { produced, .. } => produced,
            Self::Declined { .. } => 0,
        }
    }
}

/// A reversible byte-block transform.
///
/// Implementors: [`strata_bwt`](https://docs.rs/strata-bwt)'s
/// `BwtBlockCodec`, [`strata_rolz`](https://docs.rs/strata-rolz)'s
/// `Rolz1Codec`/`Rolz2Codec`, and
/// [`strata_filters`](https://docs.rs/strata-filters)'s `Utf8AliasCodec`
/// and `ExeFilter`.
pub trait BlockTransform {
    /// Upper bound on the encoded size of an `n`-byte block. Callers use
    /// this to size the output buffer before calling `forward`.
    fn max_encoded_len(&self, n: usize) -> usize;

    /// Run the forward transform: `input[..n]` to `output`.
    ///
    /// Returns `Err` only for malformed arguments (`n` outside
    /// `[0, MAX_BLOCK_SIZE]`, views shorter than `n`); a transform that
    /// simply isn't profitable on this input returns
    /// `Ok(TransformOutcome::Declined { .. })`.
    fn forward(&mut self, input: &[u8], output: &mut [u8], n: usize) -> Result<TransformOutcome>;

    /// Run the inverse transform: `input` to `output`, reconstructing
    /// the original block.
    ///
    /// Returns `Err(StrataError::DataCorruption { .. })` if the encoded
    /// header or stream is malformed; never declines.
    fn inverse(&mut self, input: &[u8], output: &mut [u8], n: usize) -> Result<TransformOutcome>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applied_reports_consumed_and_produced() {
        let outcome = TransformOutcome::Applied {
            consumed: 10,
            produced: 7,
        };
        assert!(outcome.is_applied());
        assert_eq!(outcome.consumed(), 10);
        assert_eq!(outcome.produced(), 7);
    }

    #[test]
    fn declined_has_zero_produced() {
        let outcome = TransformOutcome::Declined { consumed: 4 };
        assert!(outcome.is_declined());
        assert_eq!(outcome.produced(), 0);
        assert_eq!(outcome.consumed(), 4);
    }
}
