cfg_if! {
    if #[cfg(feature = "transport_tcp")] {
        pub mod tcp;
    } else {}
}

mod error;
pub mod local;

pub use error::TransportError;

pub use inner::{LinkEvent, LinkId, LinkReceiver, LinkSender, PeerSocket, RecvError, SendError};

mod inner {
    use std::fmt;

    /// Identifies one connection as seen by the local endpoint. Both ends of
    /// a link may use different ids for it.
    #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct LinkId(pub u64);

    impl fmt::Debug for LinkId {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "Link({})", self.0)
        }
    }

    #[derive(Debug, PartialEq, Eq)]
    pub struct SendError;

    #[derive(Debug, PartialEq, Eq)]
    pub struct RecvError;

    #[derive(Clone, Debug, PartialEq, Eq)]
    pub enum LinkEvent {
        /// A link is up, either accepted or dialed by us.
        Connected(LinkId),
        /// One complete message arrived on a link, in send order.
        Received(LinkId, Vec<u8>),
        Disconnected(LinkId),
        /// A dial to `address` never produced a link.
        ConnectFailed(String),
    }

    pub trait PeerSocket {
        /// Starts accepting links and hands back both halves of the socket.
        fn open(self: Box<Self>) -> (Box<dyn LinkSender>, Box<dyn LinkReceiver>);
    }

    pub trait LinkSender: Send + Sync {
        /// Queues `payload` on `link`. Never blocks.
        fn send(&self, link: &LinkId, payload: &[u8]) -> Result<(), SendError>;
        /// Starts dialing `address`. The outcome arrives as a `LinkEvent`.
        fn connect(&self, address: &str) -> Result<(), SendError>;
        fn disconnect(&self, link: &LinkId);
        /// Address other peers can dial to reach this one.
        fn local_address(&self) -> String;
    }

    pub trait LinkReceiver: Send + Sync {
        fn receive(&mut self) -> Result<Option<LinkEvent>, RecvError>;
    }
}
