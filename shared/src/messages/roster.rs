use serde::{Deserialize, Serialize};

/// One participant as carried on the wire.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    pub address: String,
    /// Milliseconds since the UNIX epoch at which the peer started its session.
    pub joined_at: u64,
    /// Only meaningful in rosters built for one specific peer.
    #[serde(default)]
    pub is_local: bool,
}

impl RosterEntry {
    pub fn new(address: impl Into<String>, joined_at: u64) -> Self {
        Self {
            address: address.into(),
            joined_at,
            is_local: false,
        }
    }

    /// Election key: earliest join wins, address breaks ties.
    pub fn election_key(&self) -> (u64, &str) {
        (self.joined_at, self.address.as_str())
    }
}

/// A participant as seen by the local peer, delivered with `update_peers`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetworkPeer {
    pub address: String,
    pub joined_at: u64,
    pub is_local: bool,
    pub alive: bool,
    pub is_master: bool,
}
