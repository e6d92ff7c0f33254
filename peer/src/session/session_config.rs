use serde::Deserialize;

/// Contains Config properties which will be used by a NetworkSession
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Address this peer listens on and announces to others
    pub address: String,
    /// Overrides the join timestamp (milliseconds since the UNIX epoch). Left
    /// empty, the time the session starts is used.
    pub joined_at: Option<u64>,
    /// Peers dialed when the session starts. Any member of an existing
    /// session will do; the rest of the mesh is learned from its roster.
    pub peers: Vec<String>,
    /// Maximum number of messages flushed per frame. Whatever is left waits
    /// for the next frame.
    pub outbound_budget: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:14191".to_string(),
            joined_at: None,
            peers: Vec::new(),
            outbound_budget: 256,
        }
    }
}

impl SessionConfig {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Self::default()
        }
    }

    pub fn joined_at(mut self, joined_at: u64) -> Self {
        self.joined_at = Some(joined_at);
        self
    }

    pub fn peer(mut self, address: impl Into<String>) -> Self {
        self.peers.push(address.into());
        self
    }
}
