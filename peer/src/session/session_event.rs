use thengill_shared::{NetworkPeer, PeerMessage};

#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    /// The roster or the elected master changed. Peers are in join order.
    RosterChanged(Vec<NetworkPeer>),
    /// A peer completed its handshake.
    PeerJoined(String),
    /// A peer's last link went down.
    PeerLeft(String),
    /// The master's link went down. There is no re-election.
    MasterLost(String),
    /// Game message from a peer, in arrival order.
    Message { from: String, message: PeerMessage },
}
