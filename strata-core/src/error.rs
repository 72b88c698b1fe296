//! Error types for the Strata block-transform engine.
//!
//! Every transform in this workspace reports failure through
//! [`StrataError`]. A transform's *decline* to process a block (the
//! block didn't compress, too few matches were found, the output buffer
//! was too small, ...) is **not** an error — it is a successful
//! [`crate::transform::TransformOutcome::Declined`] — so this enum only
//! ever carries the two error kinds that actually abort a block:
//! malformed caller arguments and corrupted/invalid encoded data.

use thiserror::Error;

/// The error type for Strata transform operations.
#[derive(Debug, Error)]
pub enum StrataError {
    /// A caller-supplied argument was out of the contractual range: a
    /// negative or over-`MAX_BLOCK_SIZE` count, a malformed slice view,
    /// or a configuration value outside its documented domain (e.g.
    /// `logPosChecks` outside `[2, 8]`).
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Description of which argument was invalid and why.
        message: String,
    },

    /// A decoded header field, primary index, match pointer, or map size
    /// was outside the range the format guarantees. Always produced by
    /// an `inverse()` call; the transform never generates corruption in
    /// its own `forward()` output.
    #[error("corrupted data at {component} offset {offset}: {message}")]
    DataCorruption {
        /// Name of the component that detected the corruption (e.g.
        /// `"BWTBlockCodec"`, `"ROLZ1"`, `"UTF8"`).
        component: &'static str,
        /// Byte offset (within the transform's input view) where the
        /// corruption was detected.
        offset: usize,
        /// Human-readable description of the violated invariant.
        message: String,
    },

    /// Underlying I/O failure from a bitstream's backing reader/writer.
    #[error("bitstream I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias used throughout the Strata workspace.
pub type Result<T> = std::result::Result<T, StrataError>;

impl StrataError {
    /// Build an [`StrataError::InvalidArgument`].
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Build an [`StrataError::DataCorruption`].
    pub fn corrupted(component: &'static str, offset: usize, message: impl Into<String>) -> Self {
        Self::DataCorruption {
            component,
            offset,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_argument_message_round_trips() {
        let err = StrataError::invalid_argument("count exceeds MAX_BLOCK_SIZE");
        assert!(err.to_string().contains("count exceeds"));
    }

    #[test]
    fn corruption_carries_component_and_offset() {
        let err = StrataError::corrupted("BWTBlockCodec", 3, "primary index out of range");
        let msg = err.to_string();
        assert!(msg.contains("BWTBlockCodec"));
        assert!(msg.contains('3'));
    }
}
