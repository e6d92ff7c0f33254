use thiserror::Error;

/// Errors that can occur while setting up a transport
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Listen address could not be parsed
    #[error("Invalid listen address `{address}`: {reason}")]
    InvalidAddress { address: String, reason: String },
}
