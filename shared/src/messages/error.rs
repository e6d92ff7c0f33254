use thiserror::Error;

/// Errors that can occur while encoding or decoding peer messages
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireError {
    /// Message could not be serialized
    #[error("Failed to encode peer message: {reason}")]
    EncodeFailed { reason: String },

    /// Bytes were not a valid peer message
    #[error("Failed to decode peer message: {reason}. The sender may be running an incompatible version")]
    DecodeFailed { reason: String },

    /// Frame length prefix exceeds the configured limit
    #[error("Frame of {length} bytes exceeds the limit of {limit} bytes. The stream is corrupt or the peer is misbehaving")]
    FrameTooLarge { length: usize, limit: usize },
}
