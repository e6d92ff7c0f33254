use thiserror::Error;

use thengill_shared::WireError;

use crate::transport::LinkId;

/// Errors that can occur while running a NetworkSession. They are queued and
/// logged; none of them stops the session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Message addressed to a peer with no open link
    #[error("No open link to peer {address}. The peer never completed a handshake or has left")]
    UnknownPeer { address: String },

    /// Transport refused a message
    #[error("Failed to send {message_type} message on {link:?}. The link is closed")]
    SendFailed {
        link: LinkId,
        message_type: &'static str,
    },

    /// Message could not be encoded or decoded
    #[error("Wire error on {link:?}: {error}")]
    Wire { link: LinkId, error: WireError },

    /// Peer sent something other than `hello` before introducing itself
    #[error("Received {message_type} message on {link:?} before its hello. Message dropped")]
    MessageBeforeHello {
        link: LinkId,
        message_type: &'static str,
    },

    /// Dialing a peer failed
    #[error("Failed to connect to peer {address}")]
    ConnectFailed { address: String },

    /// Transport receive queue is gone
    #[error("Transport receive queue is unavailable. The I/O thread has stopped")]
    ReceiveFailed,
}
