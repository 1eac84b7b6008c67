//! Error types for the event-provider crate.

use crate::provider::BlockHandle;

/// Errors raised by an event provider or while decoding a notification buffer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// The provider could not open a block for the requested event class
    #[error("Provider unavailable: {0}")]
    Unavailable(String),

    /// The provider refused to install a notification callback
    #[error("Callback rejected: {0}")]
    CallbackRejected(String),

    /// The block handle does not refer to an open block
    #[error("Unknown block: {0}")]
    UnknownBlock(BlockHandle),

    /// The buffer is too short to contain a notification header
    #[error("Notification buffer truncated: {len} bytes")]
    Truncated {
        /// Number of bytes actually present
        len: usize,
    },

    /// The header's declared size disagrees with the buffer
    #[error("Notification size mismatch: header declares {declared} bytes, buffer holds {actual}")]
    SizeMismatch {
        /// Size declared by the header
        declared: usize,
        /// Size of the buffer handed to the parser
        actual: usize,
    },
}

/// Convenience type alias for Results using ProviderError.
pub type Result<T> = std::result::Result<T, ProviderError>;
