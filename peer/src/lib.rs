//! # Thengill Peer
//! Peer-to-peer sessions for Thengill scenes: transports, roster and master
//! election, entity replication, and the system that plugs them into a Scene.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

#[macro_use]
extern crate cfg_if;

mod network_system;
pub mod session;
pub mod sync;
pub mod transport;

pub use network_system::{NetworkSystem, SharedSession};
pub use session::{elect_master, NetworkSession, SessionConfig, SessionError, SessionEvent};
pub use sync::{ApplyOutcome, ObjectSyncService, SyncConfig, SyncError, SyncMap};
pub use transport::{
    local::{LocalHub, LocalSocket},
    LinkEvent, LinkId, LinkReceiver, LinkSender, PeerSocket, RecvError, SendError,
    TransportError,
};

cfg_if! {
    if #[cfg(feature = "transport_tcp")] {
        pub use transport::tcp::TcpSocket;
    }
}
